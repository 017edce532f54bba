/// SQLite driver binding
///
/// Implements the driver seam for connections checked out of an r2d2 pool
/// of rusqlite connections.

use crate::core::{DriverResult, Value};
use crate::db::driver::{DbConnection, DbCursor, DbStatement, Release};
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Batch, Connection, Rows, Statement};

/// A connection checked out of a SQLite pool.
pub type SqliteConnection = PooledConnection<SqliteConnectionManager>;

impl Release for SqliteConnection {
    /// Returns the connection to its pool.
    fn release(self) -> DriverResult<()> {
        drop(self);
        Ok(())
    }
}

impl DbConnection for SqliteConnection {
    type Statement<'c> = SqliteStatement<'c>
    where
        Self: 'c;

    /// Prepares exactly one statement. Text holding a second statement is
    /// rejected rather than silently ignored; trailing whitespace, comments
    /// and semicolons are allowed.
    fn prepare(&self, sql: &str) -> DriverResult<SqliteStatement<'_>> {
        let conn: &Connection = self;
        let mut batch = Batch::new(conn, sql);
        let Some(inner) = batch.next()? else {
            return Err("no SQL statement to prepare".into());
        };
        if !matches!(batch.next(), Ok(None)) {
            return Err("SQL text holds more than one statement".into());
        }
        Ok(SqliteStatement { conn, inner })
    }
}

/// A prepared rusqlite statement together with its connection.
pub struct SqliteStatement<'c> {
    conn: &'c Connection,
    inner: Statement<'c>,
}

/// Rows changed by INSERT, UPDATE and DELETE since the connection opened.
/// Other statements leave it untouched, unlike `sqlite3_changes`, which
/// keeps reporting the last DML count.
fn total_changes(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT total_changes()", [], |row| row.get(0))
}

impl Release for SqliteStatement<'_> {
    fn release(self) -> DriverResult<()> {
        Ok(self.inner.finalize()?)
    }
}

impl<'c> DbStatement for SqliteStatement<'c> {
    type Cursor<'s> = SqliteCursor<'s>
    where
        Self: 's;

    fn parameter_count(&self) -> usize {
        self.inner.parameter_count()
    }

    fn bind(&mut self, position: usize, value: &Value) -> DriverResult<()> {
        Ok(self.inner.raw_bind_parameter(position, value)?)
    }

    fn execute(&mut self) -> DriverResult<usize> {
        let before = total_changes(self.conn)?;
        let changed = self.inner.raw_execute()?;
        if total_changes(self.conn)? == before {
            Ok(0)
        } else {
            Ok(changed)
        }
    }

    /// A statement without result columns is run to completion and reported
    /// as having no result object.
    fn query(&mut self) -> DriverResult<Option<SqliteCursor<'_>>> {
        if self.inner.column_count() == 0 {
            self.inner.raw_execute()?;
            return Ok(None);
        }
        let columns = self.inner.column_names().into_iter().map(String::from).collect();
        Ok(Some(SqliteCursor {
            columns,
            rows: self.inner.raw_query(),
        }))
    }
}

/// Cursor over the rows of a SQLite query.
pub struct SqliteCursor<'s> {
    columns: Vec<String>,
    rows: Rows<'s>,
}

impl Release for SqliteCursor<'_> {
    /// Dropping the rows resets the underlying statement.
    fn release(self) -> DriverResult<()> {
        drop(self.rows);
        Ok(())
    }
}

impl DbCursor for SqliteCursor<'_> {
    fn column_names(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn next_record(&mut self) -> DriverResult<Option<Vec<Value>>> {
        let Some(row) = self.rows.next()? else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(self.columns.len());
        for index in 0..self.columns.len() {
            values.push(Value::from_sqlite(row.get_ref(index)?));
        }
        Ok(Some(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pooled() -> SqliteConnection {
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())
            .unwrap();
        pool.get().unwrap()
    }

    #[test]
    fn test_statement_round_trip() {
        let conn = pooled();
        conn.execute_batch("CREATE TABLE t (id INTEGER, name TEXT)").unwrap();

        let mut stmt = DbConnection::prepare(&conn, "INSERT INTO t VALUES (?, ?)").unwrap();
        assert_eq!(DbStatement::parameter_count(&stmt), 2);
        stmt.bind(1, &Value::Integer(1)).unwrap();
        stmt.bind(2, &Value::from("Alice")).unwrap();
        assert_eq!(DbStatement::execute(&mut stmt).unwrap(), 1);
        stmt.release().unwrap();

        let mut stmt = DbConnection::prepare(&conn, "SELECT id, name FROM t").unwrap();
        let mut cursor = DbStatement::query(&mut stmt).unwrap().expect("cursor");
        assert_eq!(cursor.column_names(), vec!["id", "name"]);
        assert_eq!(
            cursor.next_record().unwrap(),
            Some(vec![Value::Integer(1), Value::from("Alice")])
        );
        assert_eq!(cursor.next_record().unwrap(), None);
        cursor.release().unwrap();
        stmt.release().unwrap();
        conn.release().unwrap();
    }

    #[test]
    fn test_query_without_columns_has_no_cursor() {
        let conn = pooled();
        conn.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();

        let mut stmt = DbConnection::prepare(&conn, "INSERT INTO t VALUES (5)").unwrap();
        assert!(DbStatement::query(&mut stmt).unwrap().is_none());
        stmt.release().unwrap();

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_ddl_reports_zero_after_dml() {
        let conn = pooled();
        conn.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();

        let mut stmt = DbConnection::prepare(&conn, "INSERT INTO t VALUES (1), (2)").unwrap();
        assert_eq!(DbStatement::execute(&mut stmt).unwrap(), 2);
        stmt.release().unwrap();

        let mut stmt = DbConnection::prepare(&conn, "CREATE TABLE u (id INTEGER)").unwrap();
        assert_eq!(DbStatement::execute(&mut stmt).unwrap(), 0);
        stmt.release().unwrap();

        let mut stmt = DbConnection::prepare(&conn, "DELETE FROM u").unwrap();
        assert_eq!(DbStatement::execute(&mut stmt).unwrap(), 0);
    }

    #[test]
    fn test_prepare_accepts_exactly_one_statement() {
        let conn = pooled();
        assert!(DbConnection::prepare(&conn, "SELECT 1;  -- trailing\n;").is_ok());
        assert!(DbConnection::prepare(&conn, "SELECT 1; SELECT 2").is_err());
        assert!(DbConnection::prepare(&conn, "  ;  ").is_err());
    }

    #[test]
    fn test_bind_out_of_range_fails() {
        let conn = pooled();
        let mut stmt = DbConnection::prepare(&conn, "SELECT ?").unwrap();
        assert!(stmt.bind(2, &Value::Integer(1)).is_err());
    }
}
