//! Backend-specific SQL dialects for the oxide ORM.
//!
//! `oxide-dialect` is the policy layer the query engine consults whenever it
//! has to produce SQL that differs between databases:
//! - column types inferred from field metadata
//! - identifier quoting and bind parameter syntax
//! - pagination fragments
//! - names for indexes, foreign keys, triggers and generators
//! - catalog lookups (does this table/column/index/foreign key exist?)
//!
//! # Architecture
//!
//! - **Dialect** - The [`Dialect`](dialect::Dialect) trait and its implementations.
//!   [`CommonDialect`](dialect::CommonDialect) is the baseline;
//!   [`FirebirdDialect`](dialect::FirebirdDialect) wraps it and overrides what
//!   Firebird does differently, including auto-increment emulation.
//! - **Connection** - [`SqlCommon`](connection::SqlCommon), the blocking seam
//!   dialects run catalog queries and DDL through.
//! - **Registry** - Name → dialect lookup, frozen after initialisation.
//! - **Field / Pagination / KeyName** - The values dialects reason about.
//!
//! # Example
//!
//! ```rust
//! use oxide_dialect::prelude::*;
//!
//! let dialect = DialectRegistry::global().lookup("firebirdsql").unwrap();
//!
//! let id = FieldDescriptor::new("id", ValueKind::Int64).primary_key();
//! assert_eq!(dialect.column_type(&id), "BIGINT");
//!
//! let page = dialect.limit_offset_sql(RowBound::from(5), RowBound::from("10"));
//! assert_eq!(page, " ROWS 11 TO 15");
//! ```
//!
//! # Error handling
//!
//! Three policies apply, depending on the operation:
//!
//! - A field type no dialect can map panics. There is no safe default.
//! - DDL the caller asked for (`modify_column_type`, `remove_index`) and the
//!   `probe_*` lookups return [`DialectError`](error::DialectError).
//! - The [`DialectExt`](dialect::DialectExt) lookups and the trigger/generator
//!   lifecycle swallow errors, logging them, and report "not found".

pub mod connection;
pub mod dialect;
pub mod error;
pub mod field;
pub mod key_name;
pub mod pagination;
pub mod registry;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::connection::{BlockingPool, Scalar, SqlCommon};
    pub use crate::dialect::{
        AutoIncrementEmulation, CommonDialect, Dialect, DialectExt, FirebirdDialect,
    };
    pub use crate::error::{DialectError, Result};
    pub use crate::field::{FieldDescriptor, ValueKind};
    pub use crate::key_name::KeyName;
    pub use crate::pagination::RowBound;
    pub use crate::registry::{DialectRegistry, RegistryBuilder};
}
