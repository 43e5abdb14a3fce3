//! Firebird dialect.
//!
//! Firebird differs from the baseline in a handful of places:
//! - The catalog lives in `RDB$` system tables and stores names upper-case.
//! - Unquoted identifiers are folded to upper case, so quoting upper-cases.
//! - Pagination uses `ROWS m TO n` instead of `LIMIT`/`OFFSET`.
//! - There is no `AUTO_INCREMENT`; generators and `BEFORE INSERT` triggers
//!   stand in for it.
//!
//! Everything else forwards to [`CommonDialect`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::common::with_additional_type;
use super::{AutoIncrementEmulation, CommonDialect, Dialect, count_rows};
use crate::connection::SqlCommon;
use crate::error::Result;
use crate::field::{FieldDescriptor, ValueKind};
use crate::key_name::KeyName;
use crate::pagination::RowBound;

const NAME: &str = "firebirdsql";

/// Largest string/binary size that still gets a bounded type.
pub const FIREBIRD_SIZE_CEILING: i64 = 32765;

/// Upper row bound used when only an offset is given.
pub const FIREBIRD_DEFAULT_ROW_CEILING: i64 = 10000;

/// Firebird dialect.
#[derive(Debug, Clone, Default)]
pub struct FirebirdDialect {
    common: CommonDialect,
}

impl FirebirdDialect {
    /// Creates an unbound dialect.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn connection(&self) -> Result<&dyn SqlCommon> {
        self.common.connection_for(NAME)
    }

    /// Runs a lifecycle statement, logging instead of returning failures.
    fn exec_best_effort(&self, sql: &str) -> bool {
        match self.common.exec_for(NAME, sql) {
            Ok(()) => true,
            Err(e) => {
                warn!(dialect = NAME, sql = %sql, error = %e, "Best-effort statement failed");
                false
            }
        }
    }
}

impl Dialect for FirebirdDialect {
    fn name(&self) -> &'static str {
        NAME
    }

    fn bind(&mut self, connection: Arc<dyn SqlCommon>) {
        self.common.bind(connection);
    }

    fn quote_identifier(&self, name: &str) -> String {
        name.to_uppercase()
    }

    fn placeholder(&self, _position: usize) -> String {
        "?".to_string()
    }

    fn column_type(&self, field: &FieldDescriptor) -> String {
        let size = field.effective_size();
        let sql_type = match field.effective_sql_type() {
            Some(explicit) => explicit.to_string(),
            None => match &field.kind {
                ValueKind::Bool | ValueKind::Int8 | ValueKind::Uint8 => "SMALLINT".to_string(),
                kind if kind.is_narrow_integer() => "INTEGER".to_string(),
                kind if kind.is_wide_integer() => "BIGINT".to_string(),
                ValueKind::Float32 => "FLOAT".to_string(),
                ValueKind::Float64 => "DOUBLE PRECISION".to_string(),
                ValueKind::String => {
                    if size > 0 && size < FIREBIRD_SIZE_CEILING {
                        format!("VARCHAR({})", size)
                    } else {
                        "BLOB SUB_TYPE TEXT".to_string()
                    }
                }
                ValueKind::Bytes => {
                    if size > 0 && size < FIREBIRD_SIZE_CEILING {
                        format!("VARCHAR({}) CHARACTER SET OCTETS", size)
                    } else {
                        "BLOB SUB_TYPE BINARY".to_string()
                    }
                }
                ValueKind::Time => {
                    if field.primary_key || field.has_tag("NOT NULL") {
                        "TIMESTAMP NOT NULL".to_string()
                    } else {
                        "TIMESTAMP".to_string()
                    }
                }
                other => panic!(
                    "invalid sql type {} for field {} in {} dialect",
                    other.type_name(),
                    field.name,
                    NAME
                ),
            },
        };

        with_additional_type(sql_type, field)
    }

    fn probe_table(&self, table: &str) -> Result<bool> {
        count_rows(
            self.connection()?,
            "SELECT COUNT(*) FROM RDB$RELATIONS WHERE RDB$RELATION_NAME=?",
            &[table.to_uppercase().as_str()],
        )
    }

    fn probe_column(&self, table: &str, column: &str) -> Result<bool> {
        count_rows(
            self.connection()?,
            "SELECT COUNT(*) FROM RDB$RELATION_FIELDS WHERE RDB$RELATION_NAME=? AND RDB$FIELD_NAME=?",
            &[
                table.to_uppercase().as_str(),
                column.to_uppercase().as_str(),
            ],
        )
    }

    fn probe_index(&self, table: &str, index: &str) -> Result<bool> {
        count_rows(
            self.connection()?,
            "SELECT COUNT(*) FROM RDB$INDICES WHERE RDB$RELATION_NAME=? AND RDB$INDEX_NAME=?",
            &[
                table.to_uppercase().as_str(),
                index.to_uppercase().as_str(),
            ],
        )
    }

    fn probe_foreign_key(&self, table: &str, foreign_key: &str) -> Result<bool> {
        count_rows(
            self.connection()?,
            "SELECT COUNT(*) FROM RDB$RELATION_CONSTRAINTS WHERE RDB$RELATION_NAME=? AND RDB$CONSTRAINT_NAME=? AND RDB$CONSTRAINT_TYPE='FOREIGN KEY'",
            &[
                table.to_uppercase().as_str(),
                foreign_key.to_uppercase().as_str(),
            ],
        )
    }

    fn modify_column_type(&self, table: &str, column: &str, sql_type: &str) -> Result<()> {
        info!(dialect = NAME, table, column, sql_type, "Modifying column type");
        self.common.exec_for(
            NAME,
            &format!("ALTER TABLE {table} ALTER COLUMN {column} TYPE {sql_type}"),
        )
    }

    fn remove_index(&self, table: &str, index: &str) -> Result<()> {
        info!(dialect = NAME, table, index, "Removing index");
        self.common.exec_for(NAME, &format!("DROP INDEX {index}"))
    }

    /// Returns the full path of the database file, e.g. `/data/app.fdb`.
    fn query_current_database(&self) -> Result<String> {
        Ok(self
            .connection()?
            .query_row("SELECT MON$DATABASE_NAME FROM MON$DATABASE", &[])?
            .map(|value| value.into_text().trim_end().to_string())
            .unwrap_or_default())
    }

    fn limit_offset_sql(&self, limit: RowBound, offset: RowBound) -> String {
        if limit.is_absent() && offset.is_absent() {
            return String::new();
        }

        // ROWS is 1-based and inclusive on both ends.
        let start = offset.positive().map_or(0, |offset| offset.saturating_add(1));
        match limit.positive() {
            Some(limit) if start > 0 => {
                format!(" ROWS {} TO {}", start, limit.saturating_add(start - 1))
            }
            _ if start > 0 => format!(" ROWS {} TO {}", start, FIREBIRD_DEFAULT_ROW_CEILING),
            _ => limit
                .non_negative()
                .map(|limit| format!(" ROWS {}", limit))
                .unwrap_or_default(),
        }
    }

    fn select_from_dummy_table(&self) -> &'static str {
        "FROM RDB$DATABASE"
    }

    fn default_values_sql(&self) -> &'static str {
        self.common.default_values_sql()
    }

    fn build_key_name(&self, kind: &str, table: &str, fields: &[&str]) -> KeyName {
        self.common
            .build_key_name(kind, table, fields)
            .to_uppercase()
    }

    fn normalize_index_and_column(&self, index: &str, column: &str) -> (String, String) {
        self.common.normalize_index_and_column(index, column)
    }

    fn last_insert_id_output_interstitial(
        &self,
        table: &str,
        column: &str,
        columns: &[&str],
    ) -> String {
        self.common
            .last_insert_id_output_interstitial(table, column, columns)
    }

    fn last_insert_id_returning_suffix(&self, table: &str, column: &str) -> String {
        self.common.last_insert_id_returning_suffix(table, column)
    }

    fn auto_increment_emulation(&self) -> Option<&dyn AutoIncrementEmulation> {
        Some(self)
    }
}

impl AutoIncrementEmulation for FirebirdDialect {
    fn trigger_name(&self, table: &str, column: &str) -> KeyName {
        self.build_key_name(table, column, &["BI"])
    }

    fn generator_name(&self, table: &str, column: &str) -> KeyName {
        self.build_key_name("GEN", table, &[column])
    }

    fn has_generator(&self, generator: &KeyName) -> bool {
        let result = self.connection().and_then(|connection| {
            count_rows(
                connection,
                "SELECT COUNT(*) FROM RDB$GENERATORS WHERE RDB$GENERATOR_NAME=?",
                &[generator.as_str().to_uppercase().as_str()],
            )
        });
        result.unwrap_or_else(|e| {
            warn!(dialect = NAME, generator = %generator, error = %e, "Generator lookup failed");
            false
        })
    }

    fn create_generator(&self, generator: &KeyName) {
        if self.has_generator(generator) {
            debug!(generator = %generator, "Generator already exists");
            return;
        }
        if self.exec_best_effort(&format!("CREATE GENERATOR {generator}")) {
            info!(generator = %generator, "Created generator");
        }
    }

    fn remove_generator(&self, generator: &KeyName) {
        if self.exec_best_effort(&format!("DROP GENERATOR {generator}")) {
            info!(generator = %generator, "Dropped generator");
        }
    }

    fn ensure_auto_increment(&self, table: &str, column: &str) -> bool {
        let generator = self.generator_name(table, column);
        if self.has_generator(&generator) {
            debug!(table, column, generator = %generator, "Auto-increment already in place");
            return false;
        }

        let trigger = self.trigger_name(table, column);
        self.create_generator(&generator);
        if self.exec_best_effort(&format!(
            "CREATE TRIGGER {trigger} FOR {table} ACTIVE BEFORE INSERT POSITION 0 AS BEGIN IF (NEW.{column} IS NULL) THEN NEW.{column} = GEN_ID({generator}, 1); END"
        )) {
            info!(table, column, trigger = %trigger, "Created auto-increment trigger");
        }
        true
    }

    fn remove_auto_increment(&self, table: &str, column: &str) {
        let generator = self.generator_name(table, column);
        let trigger = self.trigger_name(table, column);
        self.remove_generator(&generator);
        if self.exec_best_effort(&format!("DROP TRIGGER {trigger}")) {
            info!(table, column, trigger = %trigger, "Dropped auto-increment trigger");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialect() -> FirebirdDialect {
        FirebirdDialect::new()
    }

    fn rows(limit: impl Into<RowBound>, offset: impl Into<RowBound>) -> String {
        dialect().limit_offset_sql(limit.into(), offset.into())
    }

    #[test]
    fn test_identity_and_quoting() {
        let d = dialect();
        assert_eq!(d.name(), "firebirdsql");
        assert_eq!(d.quote_identifier("users"), "USERS");
        assert_eq!(d.placeholder(3), "?");
        assert_eq!(d.select_from_dummy_table(), "FROM RDB$DATABASE");
        assert_eq!(d.default_values_sql(), "DEFAULT VALUES");
    }

    #[test]
    fn test_column_types() {
        let d = dialect();
        assert_eq!(
            d.column_type(&FieldDescriptor::new("active", ValueKind::Bool)),
            "SMALLINT"
        );
        assert_eq!(
            d.column_type(&FieldDescriptor::new("flags", ValueKind::Uint8)),
            "SMALLINT"
        );
        assert_eq!(
            d.column_type(&FieldDescriptor::new("id", ValueKind::Int32).primary_key()),
            "INTEGER"
        );
        assert_eq!(
            d.column_type(&FieldDescriptor::new("id", ValueKind::Int64).primary_key()),
            "BIGINT"
        );
        assert_eq!(
            d.column_type(&FieldDescriptor::new("ratio", ValueKind::Float32)),
            "FLOAT"
        );
        assert_eq!(
            d.column_type(&FieldDescriptor::new("score", ValueKind::Float64)),
            "DOUBLE PRECISION"
        );
    }

    #[test]
    fn test_string_and_binary_sizes() {
        let d = dialect();
        let name = FieldDescriptor::new("name", ValueKind::String);
        assert_eq!(d.column_type(&name), "VARCHAR(255)");
        assert_eq!(d.column_type(&name.clone().size(32764)), "VARCHAR(32764)");
        assert_eq!(d.column_type(&name.clone().size(32765)), "BLOB SUB_TYPE TEXT");
        assert_eq!(d.column_type(&name.clone().size(0)), "BLOB SUB_TYPE TEXT");
        assert_eq!(d.column_type(&name.size(-8)), "BLOB SUB_TYPE TEXT");

        let data = FieldDescriptor::new("data", ValueKind::Bytes);
        assert_eq!(
            d.column_type(&data.clone().size(16)),
            "VARCHAR(16) CHARACTER SET OCTETS"
        );
        assert_eq!(
            d.column_type(&data.clone().size(32764)),
            "VARCHAR(32764) CHARACTER SET OCTETS"
        );
        assert_eq!(
            d.column_type(&data.clone().size(32765)),
            "BLOB SUB_TYPE BINARY"
        );
        assert_eq!(d.column_type(&data.clone().size(0)), "BLOB SUB_TYPE BINARY");
        assert_eq!(d.column_type(&data.clone().size(-1)), "BLOB SUB_TYPE BINARY");
        assert_eq!(d.column_type(&data.size(40000)), "BLOB SUB_TYPE BINARY");
    }

    #[test]
    fn test_timestamp_not_null() {
        let d = dialect();
        assert_eq!(
            d.column_type(&FieldDescriptor::new("at", ValueKind::Time)),
            "TIMESTAMP"
        );
        assert_eq!(
            d.column_type(&FieldDescriptor::new("at", ValueKind::Time).primary_key()),
            "TIMESTAMP NOT NULL"
        );
        assert_eq!(
            d.column_type(
                &FieldDescriptor::new("at", ValueKind::Time)
                    .tag("NOT NULL", "")
                    .tag("DEFAULT", "CURRENT_TIMESTAMP")
            ),
            "TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP"
        );
    }

    #[test]
    #[should_panic(expected = "in firebirdsql dialect")]
    fn test_unmappable_type_panics() {
        let field = FieldDescriptor::new("tags", ValueKind::Other("map".to_string()));
        let _ = dialect().column_type(&field);
    }

    #[test]
    fn test_rows_pagination() {
        assert_eq!(rows(RowBound::Absent, RowBound::Absent), "");
        assert_eq!(rows(5, 10), " ROWS 11 TO 15");
        assert_eq!(rows(RowBound::Absent, 10), " ROWS 11 TO 10000");
        assert_eq!(rows(5, RowBound::Absent), " ROWS 5");
        assert_eq!(rows(5, 0), " ROWS 5");
        assert_eq!(rows(0, 10), " ROWS 11 TO 10000");
        assert_eq!(rows(-1, RowBound::Absent), "");
        assert_eq!(rows(RowBound::Absent, 0), "");
        assert_eq!(rows("5", "x"), " ROWS 5");
        assert_eq!(rows(1, 1), " ROWS 2 TO 2");
    }

    #[test]
    fn test_build_key_name_upper_case() {
        let d = dialect();
        assert_eq!(d.build_key_name("fk", "users", &["role_id"]), "FK_USERS_ROLE_ID");
        assert_eq!(d.trigger_name("users", "id"), "USERS_ID_BI");
        assert_eq!(d.generator_name("users", "id"), "GEN_USERS_ID");
        assert_eq!(d.generator_name("orders", "id"), "GEN_ORDERS_ID");
    }

    #[test]
    fn test_forwarded_hooks() {
        let d = dialect();
        assert_eq!(
            d.normalize_index_and_column("IDX", "NAME"),
            ("IDX".to_string(), "NAME".to_string())
        );
        assert_eq!(d.last_insert_id_returning_suffix("users", "id"), "");
        assert!(d.auto_increment_emulation().is_some());
    }
}
