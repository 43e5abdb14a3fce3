//! Generic baseline dialect.
//!
//! Assumes ANSI-ish SQL and an `INFORMATION_SCHEMA` catalog. Other dialects
//! hold one of these and forward to it wherever they do not diverge.

use std::sync::Arc;

use tracing::{debug, info};

use super::{AutoIncrementEmulation, Dialect, count_rows};
use crate::connection::SqlCommon;
use crate::error::{DialectError, Result};
use crate::field::{FieldDescriptor, ValueKind};
use crate::key_name::KeyName;
use crate::pagination::RowBound;

/// Largest string/binary size that still gets a bounded type.
pub const COMMON_SIZE_CEILING: i64 = 65532;

/// The baseline dialect.
#[derive(Clone, Default)]
pub struct CommonDialect {
    connection: Option<Arc<dyn SqlCommon>>,
}

impl CommonDialect {
    /// Creates an unbound dialect.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bound connection, or `NotBound` naming the given dialect.
    pub(crate) fn connection_for(&self, dialect: &'static str) -> Result<&dyn SqlCommon> {
        self.connection
            .as_deref()
            .ok_or(DialectError::NotBound(dialect))
    }

    fn connection(&self) -> Result<&dyn SqlCommon> {
        self.connection_for(self.name())
    }

    /// Splits `schema.table`, falling back to the current database.
    fn database_and_table<'a>(&self, table: &'a str) -> Result<(String, &'a str)> {
        match table.split_once('.') {
            Some((schema, table)) => Ok((schema.to_string(), table)),
            None => Ok((self.query_current_database()?, table)),
        }
    }

    /// Executes a statement, returning the execution error unchanged.
    pub(crate) fn exec_for(&self, dialect: &'static str, sql: &str) -> Result<()> {
        debug!(dialect, sql = %sql, "Executing SQL");
        self.connection_for(dialect)?.exec(sql, &[])?;
        Ok(())
    }
}

impl Dialect for CommonDialect {
    fn name(&self) -> &'static str {
        "common"
    }

    fn bind(&mut self, connection: Arc<dyn SqlCommon>) {
        if self.connection.is_some() {
            debug!(dialect = self.name(), "Rebinding dialect connection");
        }
        self.connection = Some(connection);
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name)
    }

    /// Always returns the `$$$` sentinel. Concrete backends must provide
    /// their real placeholder syntax.
    fn placeholder(&self, _position: usize) -> String {
        "$$$".to_string()
    }

    fn column_type(&self, field: &FieldDescriptor) -> String {
        let size = field.effective_size();
        let sql_type = match field.effective_sql_type() {
            Some(explicit) => explicit.to_string(),
            None => match &field.kind {
                ValueKind::Bool => "BOOLEAN".to_string(),
                kind if kind.is_narrow_integer() => {
                    if field.can_auto_increment() {
                        "INTEGER AUTO_INCREMENT".to_string()
                    } else {
                        "INTEGER".to_string()
                    }
                }
                kind if kind.is_wide_integer() => {
                    if field.can_auto_increment() {
                        "BIGINT AUTO_INCREMENT".to_string()
                    } else {
                        "BIGINT".to_string()
                    }
                }
                ValueKind::Float32 | ValueKind::Float64 => "FLOAT".to_string(),
                ValueKind::String => {
                    if size > 0 && size < COMMON_SIZE_CEILING {
                        format!("VARCHAR({})", size)
                    } else {
                        format!("VARCHAR({})", COMMON_SIZE_CEILING)
                    }
                }
                ValueKind::Bytes => {
                    if size > 0 && size < COMMON_SIZE_CEILING {
                        format!("BINARY({})", size)
                    } else {
                        format!("BINARY({})", COMMON_SIZE_CEILING)
                    }
                }
                ValueKind::Time => "TIMESTAMP".to_string(),
                other => panic!(
                    "invalid sql type {} for field {} in {} dialect",
                    other.type_name(),
                    field.name,
                    self.name()
                ),
            },
        };

        with_additional_type(sql_type, field)
    }

    fn probe_table(&self, table: &str) -> Result<bool> {
        let (database, table) = self.database_and_table(table)?;
        count_rows(
            self.connection()?,
            "SELECT count(*) FROM INFORMATION_SCHEMA.TABLES WHERE table_schema = ? AND table_name = ?",
            &[database.as_str(), table],
        )
    }

    fn probe_column(&self, table: &str, column: &str) -> Result<bool> {
        let (database, table) = self.database_and_table(table)?;
        count_rows(
            self.connection()?,
            "SELECT count(*) FROM INFORMATION_SCHEMA.COLUMNS WHERE table_schema = ? AND table_name = ? AND column_name = ?",
            &[database.as_str(), table, column],
        )
    }

    fn probe_index(&self, table: &str, index: &str) -> Result<bool> {
        let (database, table) = self.database_and_table(table)?;
        count_rows(
            self.connection()?,
            "SELECT count(*) FROM INFORMATION_SCHEMA.STATISTICS WHERE table_schema = ? AND table_name = ? AND index_name = ?",
            &[database.as_str(), table, index],
        )
    }

    fn probe_foreign_key(&self, table: &str, foreign_key: &str) -> Result<bool> {
        let (database, table) = self.database_and_table(table)?;
        count_rows(
            self.connection()?,
            "SELECT count(*) FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS WHERE constraint_schema = ? AND table_name = ? AND constraint_name = ? AND constraint_type = 'FOREIGN KEY'",
            &[database.as_str(), table, foreign_key],
        )
    }

    fn modify_column_type(&self, table: &str, column: &str, sql_type: &str) -> Result<()> {
        info!(dialect = self.name(), table, column, sql_type, "Modifying column type");
        self.exec_for(
            self.name(),
            &format!("ALTER TABLE {table} ALTER COLUMN {column} TYPE {sql_type}"),
        )
    }

    fn remove_index(&self, table: &str, index: &str) -> Result<()> {
        info!(dialect = self.name(), table, index, "Removing index");
        self.exec_for(self.name(), &format!("DROP INDEX {index}"))
    }

    fn query_current_database(&self) -> Result<String> {
        Ok(self
            .connection()?
            .query_row("SELECT DATABASE()", &[])?
            .map(|value| value.into_text())
            .unwrap_or_default())
    }

    fn limit_offset_sql(&self, limit: RowBound, offset: RowBound) -> String {
        let mut sql = String::new();
        if let Some(limit) = limit.non_negative() {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = offset.non_negative() {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        sql
    }

    fn select_from_dummy_table(&self) -> &'static str {
        ""
    }

    fn default_values_sql(&self) -> &'static str {
        "DEFAULT VALUES"
    }

    fn build_key_name(&self, kind: &str, table: &str, fields: &[&str]) -> KeyName {
        let mut parts = vec![kind, table];
        parts.extend_from_slice(fields);
        KeyName::sanitize(&parts)
    }

    fn normalize_index_and_column(&self, index: &str, column: &str) -> (String, String) {
        (index.to_string(), column.to_string())
    }

    fn last_insert_id_output_interstitial(
        &self,
        _table: &str,
        _column: &str,
        _columns: &[&str],
    ) -> String {
        String::new()
    }

    fn last_insert_id_returning_suffix(&self, _table: &str, _column: &str) -> String {
        String::new()
    }

    fn auto_increment_emulation(&self) -> Option<&dyn AutoIncrementEmulation> {
        None
    }
}

/// Appends the field's additional type, if any, after a single space.
pub(crate) fn with_additional_type(sql_type: String, field: &FieldDescriptor) -> String {
    let additional = field.effective_additional_type();
    if additional.is_empty() {
        sql_type
    } else {
        format!("{} {}", sql_type, additional)
    }
}

impl std::fmt::Debug for CommonDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommonDialect")
            .field("bound", &self.connection.is_some())
            .finish()
    }
}
