//! Dialect registry.
//!
//! Registration happens on a [`RegistryBuilder`]; [`RegistryBuilder::build`]
//! freezes it into a [`DialectRegistry`] that only supports lookups and can be
//! shared freely between threads. The registry stores prototypes: every
//! lookup hands out a fresh, unbound dialect for the caller to bind.
//!
//! ```rust
//! use oxide_dialect::prelude::*;
//!
//! let registry = RegistryBuilder::with_builtins().build();
//! let dialect = registry.lookup("firebirdsql").unwrap();
//! assert_eq!(dialect.quote_identifier("users"), "USERS");
//! assert!(registry.lookup("oracle").is_err());
//! ```

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::connection::SqlCommon;
use crate::dialect::{CommonDialect, Dialect, FirebirdDialect};
use crate::error::{DialectError, Result};

type Prototype = Box<dyn Fn() -> Box<dyn Dialect> + Send + Sync>;

/// Collects dialects during initialisation.
#[derive(Default)]
pub struct RegistryBuilder {
    prototypes: HashMap<String, Prototype>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with the built-in dialects registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut builder = Self::new();
        builder.register("common", CommonDialect::new());
        builder.register("firebirdsql", FirebirdDialect::new());
        builder
    }

    /// Registers a dialect under a name. Lookups return clones of it.
    ///
    /// Registering the same name twice replaces the earlier entry.
    pub fn register<D>(&mut self, name: impl Into<String>, dialect: D) -> &mut Self
    where
        D: Dialect + Clone + 'static,
    {
        let name = name.into();
        let prototype: Prototype = Box::new(move || Box::new(dialect.clone()));
        if self.prototypes.insert(name.clone(), prototype).is_some() {
            warn!(dialect = %name, "Replacing registered dialect");
        } else {
            debug!(dialect = %name, "Registered dialect");
        }
        self
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> DialectRegistry {
        DialectRegistry {
            prototypes: self.prototypes,
        }
    }
}

/// A read-only name → dialect registry.
pub struct DialectRegistry {
    prototypes: HashMap<String, Prototype>,
}

impl DialectRegistry {
    /// The process-wide registry with the built-in dialects.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<DialectRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| RegistryBuilder::with_builtins().build())
    }

    /// Returns a fresh, unbound instance of the named dialect.
    pub fn lookup(&self, name: &str) -> Result<Box<dyn Dialect>> {
        self.prototypes
            .get(name)
            .map(|prototype| prototype())
            .ok_or_else(|| DialectError::UnknownDialect(name.to_string()))
    }

    /// Looks up a dialect, binds it to the connection, and makes it shareable.
    pub fn open(&self, name: &str, connection: Arc<dyn SqlCommon>) -> Result<Arc<dyn Dialect>> {
        let mut dialect = self.lookup(name)?;
        dialect.bind(connection);
        Ok(Arc::from(dialect))
    }

    /// Returns true if a dialect is registered under the name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.prototypes.contains_key(name)
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.prototypes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("dialects", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let registry = RegistryBuilder::with_builtins().build();
        assert_eq!(registry.names(), vec!["common", "firebirdsql"]);
        assert_eq!(registry.lookup("common").unwrap().name(), "common");
        assert_eq!(registry.lookup("firebirdsql").unwrap().name(), "firebirdsql");
    }

    #[test]
    fn test_unknown_dialect() {
        let registry = RegistryBuilder::new().build();
        let err = registry.lookup("mssql").err().unwrap();
        assert!(matches!(err, DialectError::UnknownDialect(ref name) if name == "mssql"));
        assert_eq!(err.to_string(), "Unknown dialect: mssql");
    }

    #[test]
    fn test_register_under_alias() {
        let mut builder = RegistryBuilder::new();
        builder
            .register("firebird", FirebirdDialect::new())
            .register("firebird", FirebirdDialect::new())
            .register("generic", CommonDialect::new());
        let registry = builder.build();

        assert!(registry.contains("firebird"));
        assert!(!registry.contains("firebirdsql"));
        // The instance keeps its own identity regardless of the alias.
        assert_eq!(registry.lookup("firebird").unwrap().name(), "firebirdsql");
    }

    #[test]
    fn test_global_is_shared() {
        let first = DialectRegistry::global();
        let second = DialectRegistry::global();
        assert!(std::ptr::eq(first, second));
        assert!(first.contains("common"));
    }
}
