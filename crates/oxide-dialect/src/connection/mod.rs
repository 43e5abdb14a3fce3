//! The execution seam between a dialect and the database.
//!
//! Dialects never own a driver. They are handed something that can run a
//! single-value catalog query and a fire-and-forget statement, and that is all
//! they ever ask of it.

mod pool;

pub use pool::BlockingPool;

use crate::error::Result;

/// A single value read from the first column of the first row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// SQL NULL.
    Null,
    /// An integer value.
    Integer(i64),
    /// A text value.
    Text(String),
}

impl Scalar {
    /// Interprets the value as a row count.
    ///
    /// Text that holds a number is accepted, anything else counts as zero.
    #[must_use]
    pub fn as_count(&self) -> i64 {
        match self {
            Self::Integer(n) => *n,
            Self::Text(s) => s.trim().parse().unwrap_or(0),
            Self::Null => 0,
        }
    }

    /// Converts the value to text, with NULL becoming the empty string.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Integer(n) => n.to_string(),
            Self::Null => String::new(),
        }
    }
}

/// Blocking access to a database, shared by every dialect bound to it.
///
/// Implementations must be safe to call from many threads at once; pooled
/// connections are the expected shape. Arguments are positional and bound
/// in order.
pub trait SqlCommon: Send + Sync {
    /// Runs a query and returns the first column of the first row, or `None`
    /// when the query produced no rows.
    fn query_row(&self, sql: &str, args: &[&str]) -> Result<Option<Scalar>>;

    /// Executes a statement and returns the number of affected rows.
    fn exec(&self, sql: &str, args: &[&str]) -> Result<u64>;
}
