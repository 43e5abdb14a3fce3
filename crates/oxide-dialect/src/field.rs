//! Field metadata consumed by type inference.
//!
//! A `FieldDescriptor` is produced per mapped struct field by the reflection
//! layer and only read by dialects. Tag settings keep the conventions of that
//! layer: keys are upper-case (`SIZE`, `TYPE`, `NOT NULL`, `AUTO_INCREMENT`,
//! ...), values are raw strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Size hint used when a field declares none.
pub const DEFAULT_SIZE: i64 = 255;

/// The underlying value kind of a mapped field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Boolean.
    Bool,
    /// Platform-width signed integer.
    Int,
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// Platform-width unsigned integer.
    Uint,
    /// 8-bit unsigned integer.
    Uint8,
    /// 16-bit unsigned integer.
    Uint16,
    /// 32-bit unsigned integer.
    Uint32,
    /// 64-bit unsigned integer.
    Uint64,
    /// Pointer-sized unsigned integer.
    Uintptr,
    /// Single precision float.
    Float32,
    /// Double precision float.
    Float64,
    /// Text.
    String,
    /// Byte sequence.
    Bytes,
    /// A recognized date/time value.
    Time,
    /// Any other struct, by type name.
    Struct(String),
    /// Anything else, by type name.
    Other(String),
}

impl ValueKind {
    /// Returns true for integer kinds that fit in 32 bits or the platform width.
    #[must_use]
    pub fn is_narrow_integer(&self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Uint
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uintptr
        )
    }

    /// Returns true for 64-bit integer kinds.
    #[must_use]
    pub fn is_wide_integer(&self) -> bool {
        matches!(self, Self::Int64 | Self::Uint64)
    }

    /// Returns a short type name, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Time => "time",
            Self::Struct(name) | Self::Other(name) => name,
        }
    }
}

/// Describes one mapped struct field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Underlying value kind.
    pub kind: ValueKind,
    /// Declared size/length hint.
    #[serde(default)]
    pub size: Option<i64>,
    /// Raw SQL type that bypasses inference.
    #[serde(default)]
    pub sql_type: Option<String>,
    /// Suffix appended after the inferred type (e.g. `NOT NULL`).
    #[serde(default)]
    pub additional_type: Option<String>,
    /// Whether the field is (part of) the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Raw tag settings, keyed by upper-case name.
    #[serde(default)]
    pub tag_settings: BTreeMap<String, String>,
}

impl FieldDescriptor {
    /// Creates a new descriptor with no size, override or tags.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            size: None,
            sql_type: None,
            additional_type: None,
            primary_key: false,
            tag_settings: BTreeMap::new(),
        }
    }

    /// Sets the size hint.
    #[must_use]
    pub fn size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets an explicit SQL type.
    #[must_use]
    pub fn sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = Some(sql_type.into());
        self
    }

    /// Sets the additional type suffix.
    #[must_use]
    pub fn additional_type(mut self, additional: impl Into<String>) -> Self {
        self.additional_type = Some(additional.into());
        self
    }

    /// Marks the field as primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Adds a tag setting. The key is upper-cased.
    #[must_use]
    pub fn tag(mut self, key: &str, value: impl Into<String>) -> Self {
        self.tag_settings
            .insert(key.trim().to_uppercase(), value.into());
        self
    }

    /// Looks up a tag setting (case-insensitive key).
    #[must_use]
    pub fn tag_setting(&self, key: &str) -> Option<&str> {
        self.tag_settings
            .get(&key.to_uppercase())
            .map(String::as_str)
    }

    /// Returns true when the tag is present, whatever its value.
    #[must_use]
    pub fn has_tag(&self, key: &str) -> bool {
        self.tag_setting(key).is_some()
    }

    /// The raw SQL type, from the descriptor or the `TYPE` tag.
    #[must_use]
    pub fn effective_sql_type(&self) -> Option<&str> {
        self.sql_type
            .as_deref()
            .or_else(|| self.tag_setting("TYPE"))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// The size hint, from the descriptor, the `SIZE` tag, or the default.
    ///
    /// An unparsable `SIZE` tag yields zero, which dialects treat as "no size".
    #[must_use]
    pub fn effective_size(&self) -> i64 {
        match (self.size, self.tag_setting("SIZE")) {
            (Some(size), _) => size,
            (None, Some(raw)) => raw.trim().parse().unwrap_or(0),
            (None, None) => DEFAULT_SIZE,
        }
    }

    /// The suffix appended after the inferred type, trimmed.
    #[must_use]
    pub fn effective_additional_type(&self) -> String {
        if let Some(additional) = &self.additional_type {
            return additional.trim().to_string();
        }

        let mut additional = format!(
            "{} {}",
            self.tag_setting("NOT NULL").unwrap_or_default(),
            self.tag_setting("UNIQUE").unwrap_or_default()
        );
        if let Some(default) = self.tag_setting("DEFAULT") {
            additional.push_str(" DEFAULT ");
            additional.push_str(default);
        }
        if let Some(comment) = self.tag_setting("COMMENT") {
            additional.push_str(" COMMENT ");
            additional.push_str(comment);
        }
        additional.trim().to_string()
    }

    /// Whether the column should use the backend's auto-increment variant.
    #[must_use]
    pub fn can_auto_increment(&self) -> bool {
        match self.tag_setting("AUTO_INCREMENT") {
            Some(value) => !value.eq_ignore_ascii_case("false"),
            None => self.primary_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_defaults() {
        let field = FieldDescriptor::new("name", ValueKind::String);
        assert_eq!(field.effective_size(), DEFAULT_SIZE);

        let field = FieldDescriptor::new("name", ValueKind::String).tag("size", "64");
        assert_eq!(field.effective_size(), 64);

        let field = FieldDescriptor::new("name", ValueKind::String).tag("SIZE", "big");
        assert_eq!(field.effective_size(), 0);

        let field = FieldDescriptor::new("name", ValueKind::String)
            .tag("SIZE", "64")
            .size(12);
        assert_eq!(field.effective_size(), 12);
    }

    #[test]
    fn test_sql_type_from_tag() {
        let field = FieldDescriptor::new("payload", ValueKind::Bytes).tag("TYPE", "bytea");
        assert_eq!(field.effective_sql_type(), Some("bytea"));

        let field = FieldDescriptor::new("payload", ValueKind::Bytes)
            .tag("TYPE", "bytea")
            .sql_type("BLOB");
        assert_eq!(field.effective_sql_type(), Some("BLOB"));

        let field = FieldDescriptor::new("payload", ValueKind::Bytes).tag("TYPE", "  ");
        assert_eq!(field.effective_sql_type(), None);
    }

    #[test]
    fn test_additional_type_from_tags() {
        let field = FieldDescriptor::new("email", ValueKind::String)
            .tag("NOT NULL", "NOT NULL")
            .tag("UNIQUE", "UNIQUE")
            .tag("DEFAULT", "'x'");
        assert_eq!(
            field.effective_additional_type(),
            "NOT NULL UNIQUE DEFAULT 'x'"
        );

        let field = FieldDescriptor::new("email", ValueKind::String);
        assert_eq!(field.effective_additional_type(), "");

        let field = FieldDescriptor::new("email", ValueKind::String)
            .tag("UNIQUE", "UNIQUE")
            .additional_type("  CHECK (email <> '')  ");
        assert_eq!(field.effective_additional_type(), "CHECK (email <> '')");
    }

    #[test]
    fn test_can_auto_increment() {
        let field = FieldDescriptor::new("id", ValueKind::Int64);
        assert!(!field.can_auto_increment());

        let field = FieldDescriptor::new("id", ValueKind::Int64).primary_key();
        assert!(field.can_auto_increment());

        let field = FieldDescriptor::new("id", ValueKind::Int64)
            .primary_key()
            .tag("AUTO_INCREMENT", "FALSE");
        assert!(!field.can_auto_increment());

        let field = FieldDescriptor::new("seq", ValueKind::Int32).tag("AUTO_INCREMENT", "");
        assert!(field.can_auto_increment());
    }

    #[test]
    fn test_deserialize_minimal() {
        let field: FieldDescriptor =
            serde_json::from_str(r#"{"name": "id", "kind": "int64", "primary_key": true}"#)
                .unwrap();
        assert_eq!(field.kind, ValueKind::Int64);
        assert!(field.primary_key);
        assert!(field.tag_settings.is_empty());

        let field: FieldDescriptor =
            serde_json::from_str(r#"{"name": "at", "kind": {"struct": "Money"}}"#).unwrap();
        assert_eq!(field.kind, ValueKind::Struct("Money".to_string()));
    }
}
