/// Row Mapping Module
///
/// Drains a cursor into owned rows keyed by column name.

use crate::core::{DriverResult, Row, RowSet};
use crate::db::driver::DbCursor;
use tracing::debug;

pub struct RowMapper;

impl RowMapper {
    /// Reads every remaining record of `cursor`, in cursor order.
    ///
    /// Column names are read once, before the first record. Within a row,
    /// columns are inserted by ascending index, so a repeated name keeps the
    /// value of its last column.
    pub fn map<C: DbCursor>(cursor: &mut C) -> DriverResult<RowSet> {
        let columns = cursor.column_names();
        let mut rows = RowSet::new();

        while let Some(values) = cursor.next_record()? {
            if values.len() != columns.len() {
                return Err(format!(
                    "record has {} value(s) for {} column(s)",
                    values.len(),
                    columns.len()
                )
                .into());
            }
            let mut row = Row::with_capacity(columns.len());
            for (name, value) in columns.iter().zip(values) {
                row.insert(name.as_str(), value);
            }
            rows.push(row);
        }

        debug!(columns = columns.len(), rows = rows.len(), "mapped result");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::db::driver::Release;
    use std::collections::VecDeque;

    struct Scripted {
        columns: Vec<&'static str>,
        records: VecDeque<Vec<Value>>,
        fail_after: Option<usize>,
        served: usize,
    }

    impl Scripted {
        fn new(columns: Vec<&'static str>, records: Vec<Vec<Value>>) -> Self {
            Scripted {
                columns,
                records: records.into(),
                fail_after: None,
                served: 0,
            }
        }
    }

    impl Release for Scripted {
        fn release(self) -> DriverResult<()> {
            Ok(())
        }
    }

    impl DbCursor for Scripted {
        fn column_names(&self) -> Vec<String> {
            self.columns.iter().map(|c| c.to_string()).collect()
        }

        fn next_record(&mut self) -> DriverResult<Option<Vec<Value>>> {
            if self.fail_after == Some(self.served) {
                return Err("disk I/O error".into());
            }
            self.served += 1;
            Ok(self.records.pop_front())
        }
    }

    #[test]
    fn test_maps_rows_in_cursor_order() {
        let mut cursor = Scripted::new(
            vec!["id", "name"],
            vec![
                vec![Value::Integer(2), Value::from("Bob")],
                vec![Value::Integer(1), Value::from("Alice")],
            ],
        );
        let rows = RowMapper::map(&mut cursor).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some(&Value::from("Bob")));
        assert_eq!(rows[1].get("id"), Some(&Value::Integer(1)));
        assert_eq!(rows[1].columns().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[test]
    fn test_empty_cursor_yields_empty_rowset() {
        let mut cursor = Scripted::new(vec!["id"], Vec::new());
        assert!(RowMapper::map(&mut cursor).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_column_later_index_wins() {
        let mut cursor = Scripted::new(
            vec!["x", "y", "x"],
            vec![vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]],
        );
        let rows = RowMapper::map(&mut cursor).unwrap();

        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0].get("x"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_read_failure_propagates() {
        let mut cursor = Scripted::new(vec!["id"], vec![vec![Value::Integer(1)], vec![Value::Integer(2)]]);
        cursor.fail_after = Some(1);
        assert!(RowMapper::map(&mut cursor).is_err());
    }

    #[test]
    fn test_short_record_is_rejected() {
        let mut cursor = Scripted::new(vec!["a", "b"], vec![vec![Value::Integer(1)]]);
        assert!(RowMapper::map(&mut cursor).is_err());
    }
}
