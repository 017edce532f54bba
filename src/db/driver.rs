/// Driver Seam
///
/// The statement pipeline only talks to the database through these traits.
/// `db::sqlite` implements them for pooled rusqlite connections; tests plug
/// in scripted doubles to force failures at a chosen stage.
///
/// Lifetimes mirror the acquisition chain: a statement borrows its
/// connection and a cursor borrows its statement, so a resource can only be
/// released after everything acquired from it.

use crate::core::{DriverResult, Value};

/// A resource that must be given back exactly once.
pub trait Release {
    /// Closes the resource. Consuming `self` makes a second release
    /// impossible.
    fn release(self) -> DriverResult<()>;
}

/// A live connection handle obtained from a pool.
pub trait DbConnection: Release {
    type Statement<'c>: DbStatement
    where
        Self: 'c;

    /// Prepares `sql` as a parameterized statement.
    fn prepare(&self, sql: &str) -> DriverResult<Self::Statement<'_>>;
}

/// A prepared statement with positional placeholders.
pub trait DbStatement: Release {
    type Cursor<'s>: DbCursor
    where
        Self: 's;

    /// Number of placeholders in the statement.
    fn parameter_count(&self) -> usize;

    /// Binds `value` at the 1-indexed `position`.
    fn bind(&mut self, position: usize, value: &Value) -> DriverResult<()>;

    /// Runs a mutating statement and returns the affected-row count.
    fn execute(&mut self) -> DriverResult<usize>;

    /// Runs a query. `None` means the driver produced no result object.
    fn query(&mut self) -> DriverResult<Option<Self::Cursor<'_>>>;
}

/// A forward-only cursor over query records.
pub trait DbCursor: Release {
    /// Column names in result order. Names need not be unique.
    fn column_names(&self) -> Vec<String>;

    /// Advances to the next record and returns its values in column order,
    /// or `None` once the cursor is exhausted.
    fn next_record(&mut self) -> DriverResult<Option<Vec<Value>>>;
}
