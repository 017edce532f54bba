// Core infrastructure modules
pub mod core;

// Configuration and logging
pub mod config;
pub mod logging;

// Statement pipeline
pub mod db;

pub use crate::core::{DaoError, ErrorKind, Result, Row, RowSet, Value};
pub use crate::db::{ConnectionProvider, DataSourceRegistry, SqlitePoolProvider, StatementExecutor};
