/// Parameter Binding Module
///
/// Binds an ordered parameter list into a prepared statement's positional
/// placeholders.

use crate::core::{DaoError, Result, Value};
use crate::db::driver::DbStatement;
use tracing::{error, trace};

pub struct ParameterBinder;

impl ParameterBinder {
    /// Binds `params[i]` at position `i + 1`.
    ///
    /// The list length must match the statement's placeholder count; an
    /// empty list on a statement without placeholders binds nothing. The
    /// first value the driver rejects aborts the pass.
    ///
    /// # Errors
    ///
    /// Returns `DaoError::Binding` carrying the 1-indexed position that
    /// failed.
    pub fn bind<S: DbStatement>(statement: &mut S, params: &[Value]) -> Result<()> {
        let expected = statement.parameter_count();
        if params.len() != expected {
            let position = params.len().min(expected) + 1;
            let err = DaoError::Binding {
                position,
                source: format!(
                    "statement has {} placeholder(s) but {} value(s) were supplied",
                    expected,
                    params.len()
                )
                .into(),
            };
            error!(error = %err, "parameter count mismatch");
            return Err(err);
        }

        for (index, value) in params.iter().enumerate() {
            let position = index + 1;
            trace!(position, kind = value.kind_name(), "binding parameter");
            if let Err(source) = statement.bind(position, value) {
                let err = DaoError::Binding { position, source };
                error!(error = %err, "failed to bind parameter");
                return Err(err);
            }
        }
        Ok(())
    }
}
