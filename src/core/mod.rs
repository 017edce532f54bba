/// Core Module for microdao
///
/// This module holds the types every other layer shares: the error taxonomy
/// and the value/row model that flows between callers and the driver.

pub mod error;
pub mod value;

// Re-export commonly used types for convenience
pub use error::{DaoError, DriverError, DriverResult, ErrorKind, ResourceKind, Result};
pub use value::{parse_params, Row, RowSet, Value};
