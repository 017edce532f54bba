/// Statement Execution Module
///
/// The four entry points of the access layer. Each call acquires its own
/// connection, prepares, binds and runs one statement, and releases every
/// resource before returning, whatever the outcome.

use crate::core::{DaoError, DriverError, ResourceKind, Result, RowSet, Value};
use crate::db::binder::ParameterBinder;
use crate::db::closer::ResourceCloser;
use crate::db::driver::{DbConnection, DbStatement};
use crate::db::mapper::RowMapper;
use crate::db::provider::ConnectionProvider;
use tracing::{debug, error, info_span};
use uuid::Uuid;

/// What to do with a bound statement.
trait Work {
    type Output;
    const NAME: &'static str;

    fn run<S: DbStatement>(
        self,
        statement: &mut S,
        sql: &str,
        closer: &mut ResourceCloser,
    ) -> Result<Self::Output>;
}

struct Update;

struct Query;

impl Work for Update {
    type Output = usize;
    const NAME: &'static str = "update";

    fn run<S: DbStatement>(self, statement: &mut S, sql: &str, _: &mut ResourceCloser) -> Result<usize> {
        match statement.execute() {
            Ok(count) => {
                debug!(affected = count, "statement executed");
                Ok(count)
            }
            Err(source) => Err(failed(sql, source, "failed to execute statement")),
        }
    }
}

impl Work for Query {
    type Output = Option<RowSet>;
    const NAME: &'static str = "query";

    fn run<S: DbStatement>(
        self,
        statement: &mut S,
        sql: &str,
        closer: &mut ResourceCloser,
    ) -> Result<Option<RowSet>> {
        let mut cursor = match statement.query() {
            Ok(Some(cursor)) => cursor,
            Ok(None) => {
                debug!("statement produced no result");
                return Ok(None);
            }
            Err(source) => return Err(failed(sql, source, "failed to execute query")),
        };
        let rows = RowMapper::map(&mut cursor);
        closer.release(ResourceKind::Cursor, cursor);
        rows.map(Some)
            .map_err(|source| failed(sql, source, "failed to read query results"))
    }
}

fn failed(sql: &str, source: DriverError, message: &str) -> DaoError {
    let err = DaoError::execution(sql, source);
    error!(error = %err, "{}", message);
    err
}

/// Runs statements against connections from an injected provider.
///
/// The executor holds no state besides the provider, so one value can be
/// shared by any number of threads.
#[derive(Debug, Clone)]
pub struct StatementExecutor<P> {
    provider: P,
}

impl<P: ConnectionProvider> StatementExecutor<P> {
    pub fn new(provider: P) -> Self {
        StatementExecutor { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Executes a statement without parameters and returns the number of
    /// affected rows, which may be zero.
    pub fn execute(&self, sql: &str) -> Result<usize> {
        self.execute_with(sql, &[])
    }

    /// Executes a statement, binding `params` at positions 1..=N.
    ///
    /// # Errors
    ///
    /// `ConnectionAcquisition`, `Binding` or `Execution`, tagged with the
    /// stage that failed. A failure to release a resource is logged and does
    /// not change the result.
    pub fn execute_with(&self, sql: &str, params: &[Value]) -> Result<usize> {
        self.run(sql, params, Update)
    }

    /// Runs a query without parameters.
    pub fn fetch(&self, sql: &str) -> Result<Option<RowSet>> {
        self.fetch_with(sql, &[])
    }

    /// Runs a query, binding `params` at positions 1..=N.
    ///
    /// Returns `Ok(Some(rows))` with every record in cursor order (possibly
    /// none), or `Ok(None)` when the driver produced no result object.
    pub fn fetch_with(&self, sql: &str, params: &[Value]) -> Result<Option<RowSet>> {
        self.run(sql, params, Query)
    }

    fn run<W: Work>(&self, sql: &str, params: &[Value], work: W) -> Result<W::Output> {
        let span = info_span!(
            "statement",
            id = %Uuid::new_v4(),
            data_source = %self.provider.data_source(),
            kind = W::NAME,
        );
        let _guard = span.enter();
        debug!(sql, params = params.len(), "running statement");

        let connection = self.provider.acquire()?;
        let mut closer = ResourceCloser::new();

        let outcome = match connection.prepare(sql) {
            Ok(mut statement) => {
                let outcome = ParameterBinder::bind(&mut statement, params)
                    .and_then(|()| work.run(&mut statement, sql, &mut closer));
                closer.release(ResourceKind::Statement, statement);
                outcome
            }
            Err(source) => Err(failed(sql, source, "failed to prepare statement")),
        };
        closer.release(ResourceKind::Connection, connection);

        outcome
    }
}
