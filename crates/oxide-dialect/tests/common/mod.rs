#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use oxide_dialect::prelude::*;

/// A statement or query seen by [`RecordingConnection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub sql: String,
    pub args: Vec<String>,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    responses: HashMap<String, Scalar>,
    generators: HashSet<String>,
    failing: bool,
}

/// In-memory `SqlCommon` that records everything and answers from a script.
///
/// Queries are matched on the SQL prefix up to the first `WHERE`; with no
/// scripted answer they return no row. `CREATE GENERATOR` and
/// `DROP GENERATOR` maintain a generator set that `RDB$GENERATORS` lookups
/// read from.
#[derive(Default)]
pub struct RecordingConnection {
    state: Mutex<State>,
}

impl RecordingConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A connection on which every call fails.
    pub fn failing() -> Arc<Self> {
        let connection = Self::default();
        connection.state.lock().unwrap().failing = true;
        Arc::new(connection)
    }

    /// Answers any query starting with `prefix` with `value`.
    pub fn respond(&self, prefix: &str, value: Scalar) {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(prefix.to_string(), value);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.sql).collect()
    }

    /// Statements that change the catalog, in order.
    pub fn ddl(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|sql| !sql.starts_with("SELECT"))
            .collect()
    }

    fn record(&self, sql: &str, args: &[&str]) -> std::sync::MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            sql: sql.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        });
        state
    }
}

impl SqlCommon for RecordingConnection {
    fn query_row(&self, sql: &str, args: &[&str]) -> Result<Option<Scalar>> {
        let state = self.record(sql, args);
        if state.failing {
            return Err(DialectError::Connection("connection refused".to_string()));
        }

        if sql.contains("RDB$GENERATORS") {
            let known = args.first().is_some_and(|name| state.generators.contains(*name));
            return Ok(Some(Scalar::Integer(i64::from(known))));
        }

        Ok(state
            .responses
            .iter()
            .find(|(prefix, _)| sql.starts_with(prefix.as_str()))
            .map(|(_, value)| value.clone()))
    }

    fn exec(&self, sql: &str, args: &[&str]) -> Result<u64> {
        let mut state = self.record(sql, args);
        if state.failing {
            return Err(DialectError::Connection("connection refused".to_string()));
        }

        if let Some(name) = sql.strip_prefix("CREATE GENERATOR ") {
            state.generators.insert(name.to_string());
        } else if let Some(name) = sql.strip_prefix("DROP GENERATOR ") {
            state.generators.remove(name);
        }
        Ok(0)
    }
}

/// Binds a fresh dialect from the global registry to the connection.
pub fn open(name: &str, connection: &Arc<RecordingConnection>) -> Arc<dyn Dialect> {
    DialectRegistry::global()
        .open(name, connection.clone())
        .unwrap_or_else(|e| panic!("Failed to open {name}: {e}"))
}
