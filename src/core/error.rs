/// microdao Error Module
///
/// This module defines the error taxonomy of the access layer. Every failure
/// in the statement pipeline is tagged with the stage it happened in, so
/// callers can tell a pool problem from a bad parameter or a rejected
/// statement without parsing messages.
use std::fmt;
use thiserror::Error;

/// Boxed error produced by a driver implementation (rusqlite, r2d2, or a
/// test double).
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for driver-level calls.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// The kinds of resource acquired during one statement call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Result cursor of a query
    Cursor,
    /// Prepared statement
    Statement,
    /// Pooled connection
    Connection,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Cursor => "cursor",
            ResourceKind::Statement => "statement",
            ResourceKind::Connection => "connection",
        };
        f.write_str(name)
    }
}

/// Error type for the microdao access layer.
///
/// The first four variants cover the statement pipeline:
/// - acquiring a connection from the pool
/// - binding parameters into a prepared statement
/// - preparing, executing, or reading the results of a statement
/// - releasing a resource (reported, never returned by the executor)
///
/// The remaining variants belong to the configuration layer and to
/// rendering results.
#[derive(Error, Debug)]
pub enum DaoError {
    /// The named pool could not produce a connection
    #[error("Connection acquisition error on data source '{data_source}': {source}")]
    ConnectionAcquisition {
        data_source: String,
        source: DriverError,
    },

    /// A parameter could not be bound at its 1-indexed position
    #[error("Binding error at parameter {position}: {source}")]
    Binding { position: usize, source: DriverError },

    /// The driver rejected or failed the statement
    #[error("Execution error for `{sql}`: {source}")]
    Execution { sql: String, source: DriverError },

    /// Closing a resource failed
    #[error("Release error while closing {resource}: {source}")]
    Release {
        resource: ResourceKind,
        source: DriverError,
    },

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Rendering results as JSON failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Tag identifying the class of a [`DaoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConnectionAcquisition,
    Binding,
    Execution,
    Release,
    Config,
    Serialization,
}

impl DaoError {
    /// Returns the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DaoError::ConnectionAcquisition { .. } => ErrorKind::ConnectionAcquisition,
            DaoError::Binding { .. } => ErrorKind::Binding,
            DaoError::Execution { .. } => ErrorKind::Execution,
            DaoError::Release { .. } => ErrorKind::Release,
            DaoError::Config(_) | DaoError::Io(_) | DaoError::Toml(_) => ErrorKind::Config,
            DaoError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    pub(crate) fn execution(sql: &str, source: impl Into<DriverError>) -> Self {
        DaoError::Execution {
            sql: sql.to_string(),
            source: source.into(),
        }
    }
}

/// Type alias for Result to use DaoError as the error type.
pub type Result<T> = std::result::Result<T, DaoError>;
