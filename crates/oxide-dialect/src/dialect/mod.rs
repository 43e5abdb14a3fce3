//! Database dialect implementations.
//!
//! A dialect is the policy oracle the query engine consults for every
//! backend-specific decision: column types, quoting, pagination, key names and
//! catalog lookups. [`CommonDialect`] is the baseline. Specialized dialects
//! hold a baseline by value and forward to it explicitly wherever the backend
//! does not diverge.
//!
//! [`Dialect`] deliberately has no provided methods. Adding a capability forces
//! every dialect to decide, at compile time, whether it forwards or overrides.

mod common;
mod firebird;

pub use common::CommonDialect;
pub use firebird::FirebirdDialect;

use std::sync::Arc;

use tracing::warn;

use crate::connection::SqlCommon;
use crate::error::Result;
use crate::field::FieldDescriptor;
use crate::key_name::KeyName;
use crate::pagination::RowBound;

/// Backend-specific SQL policy.
pub trait Dialect: Send + Sync {
    /// Returns the name this dialect is registered under.
    fn name(&self) -> &'static str;

    /// Attaches the connection used for catalog queries and DDL.
    ///
    /// Must happen before the dialect is shared or used for anything that
    /// talks to the database.
    fn bind(&mut self, connection: Arc<dyn SqlCommon>);

    /// Quotes (or case-folds) a raw identifier.
    fn quote_identifier(&self, name: &str) -> String;

    /// Returns the bind parameter token for a 1-based position.
    fn placeholder(&self, position: usize) -> String;

    /// Infers the column type for a field.
    ///
    /// # Panics
    ///
    /// Panics when the field has neither an explicit SQL type nor a value kind
    /// this dialect can map. Guessing a type here would corrupt data silently.
    fn column_type(&self, field: &FieldDescriptor) -> String;

    /// Checks the catalog for a table.
    fn probe_table(&self, table: &str) -> Result<bool>;

    /// Checks the catalog for a column.
    fn probe_column(&self, table: &str, column: &str) -> Result<bool>;

    /// Checks the catalog for an index.
    fn probe_index(&self, table: &str, index: &str) -> Result<bool>;

    /// Checks the catalog for a foreign key constraint.
    fn probe_foreign_key(&self, table: &str, foreign_key: &str) -> Result<bool>;

    /// Changes a column's type. Execution errors are returned unchanged.
    fn modify_column_type(&self, table: &str, column: &str, sql_type: &str) -> Result<()>;

    /// Drops an index. Execution errors are returned unchanged.
    fn remove_index(&self, table: &str, index: &str) -> Result<()>;

    /// Looks up the name of the connected database.
    fn query_current_database(&self) -> Result<String>;

    /// Renders the pagination fragment, with a leading space, or an empty
    /// string when nothing applies.
    fn limit_offset_sql(&self, limit: RowBound, offset: RowBound) -> String;

    /// The `FROM` clause needed to select a constant, if the backend needs one.
    fn select_from_dummy_table(&self) -> &'static str;

    /// The syntax for inserting a row made only of default values.
    fn default_values_sql(&self) -> &'static str;

    /// Builds a sanitized name for a derived object.
    fn build_key_name(&self, kind: &str, table: &str, fields: &[&str]) -> KeyName;

    /// Splits size or expression information out of catalog index/column
    /// names, for backends that encode it there.
    fn normalize_index_and_column(&self, index: &str, column: &str) -> (String, String);

    /// SQL placed between the column list and `VALUES` to return the new id.
    fn last_insert_id_output_interstitial(
        &self,
        table: &str,
        column: &str,
        columns: &[&str],
    ) -> String;

    /// SQL appended to an `INSERT` to return the new id.
    fn last_insert_id_returning_suffix(&self, table: &str, column: &str) -> String;

    /// Returns the trigger/generator lifecycle, for backends that emulate
    /// auto-increment.
    fn auto_increment_emulation(&self) -> Option<&dyn AutoIncrementEmulation>;
}

/// Auto-increment emulation for backends without native syntax.
///
/// Every column gets a generator (a named sequence) and a `BEFORE INSERT`
/// trigger that fills the column from it when the inserted value is NULL.
/// All lifecycle operations are best-effort: failures are logged, not
/// returned.
pub trait AutoIncrementEmulation: Send + Sync {
    /// Name of the insert trigger for a column.
    fn trigger_name(&self, table: &str, column: &str) -> KeyName;

    /// Name of the generator for a column.
    fn generator_name(&self, table: &str, column: &str) -> KeyName;

    /// Checks whether a generator exists. Errors count as "absent".
    fn has_generator(&self, generator: &KeyName) -> bool;

    /// Creates a generator unless it already exists.
    fn create_generator(&self, generator: &KeyName);

    /// Drops a generator.
    fn remove_generator(&self, generator: &KeyName);

    /// Creates the generator and trigger for a column.
    ///
    /// Returns `false` without touching the catalog when the generator already
    /// exists. The trigger is not re-checked in that case.
    fn ensure_auto_increment(&self, table: &str, column: &str) -> bool;

    /// Drops the generator, then the trigger.
    fn remove_auto_increment(&self, table: &str, column: &str);
}

/// Best-effort catalog lookups.
///
/// These are the probes the engine uses optimistically: any error, including
/// a dead connection, reads as "not there". The error is logged at `warn`
/// level. Call the `probe_*` methods directly to tell the two apart.
pub trait DialectExt: Dialect {
    /// Returns true if the table exists.
    fn has_table(&self, table: &str) -> bool {
        self.probe_table(table).unwrap_or_else(|e| {
            warn!(dialect = self.name(), table, error = %e, "Table lookup failed");
            false
        })
    }

    /// Returns true if the column exists.
    fn has_column(&self, table: &str, column: &str) -> bool {
        self.probe_column(table, column).unwrap_or_else(|e| {
            warn!(dialect = self.name(), table, column, error = %e, "Column lookup failed");
            false
        })
    }

    /// Returns true if the index exists.
    fn has_index(&self, table: &str, index: &str) -> bool {
        self.probe_index(table, index).unwrap_or_else(|e| {
            warn!(dialect = self.name(), table, index, error = %e, "Index lookup failed");
            false
        })
    }

    /// Returns true if the foreign key exists.
    fn has_foreign_key(&self, table: &str, foreign_key: &str) -> bool {
        self.probe_foreign_key(table, foreign_key)
            .unwrap_or_else(|e| {
                warn!(
                    dialect = self.name(),
                    table,
                    foreign_key,
                    error = %e,
                    "Foreign key lookup failed"
                );
                false
            })
    }

    /// Returns the current database name, or an empty string.
    fn current_database(&self) -> String {
        self.query_current_database().unwrap_or_else(|e| {
            warn!(dialect = self.name(), error = %e, "Current database lookup failed");
            String::new()
        })
    }
}

impl<D: Dialect + ?Sized> DialectExt for D {}

/// Counts rows with a catalog query. No row counts as zero.
pub(crate) fn count_rows(connection: &dyn SqlCommon, sql: &str, args: &[&str]) -> Result<bool> {
    Ok(connection
        .query_row(sql, args)?
        .is_some_and(|value| value.as_count() > 0))
}
