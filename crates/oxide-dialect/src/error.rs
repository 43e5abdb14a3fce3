//! Error types for dialect operations.

/// Errors that can occur while a dialect talks to its connection or registry.
#[derive(Debug, thiserror::Error)]
pub enum DialectError {
    /// The dialect was used before a connection was bound to it.
    #[error("Dialect '{0}' has no bound connection")]
    NotBound(&'static str),

    /// No dialect is registered under the requested name.
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    /// Database error reported by the sqlx pool.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failed to start the runtime that drives the pool.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by a foreign `SqlCommon` implementation.
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Result type for dialect operations.
pub type Result<T> = std::result::Result<T, DialectError>;
