//! Value and row types shared by the binder, the mapper and callers.

use crate::core::{DaoError, Result};
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::Serialize;

/// A single parameter or column value.
///
/// These are the only kinds the layer binds or returns. Anything else must
/// be converted by the caller first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Boolean(bool),
    Timestamp(NaiveDateTime),
    Blob(Vec<u8>),
}

impl Value {
    /// Name of the value kind, used in logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Timestamp(_) => "timestamp",
            Value::Blob(_) => "blob",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts a SQLite column value as reported by the driver.
    ///
    /// SQLite has no boolean or temporal storage class, so those come back
    /// as integers and text respectively. Text that is not valid UTF-8 is
    /// returned unchanged as a `Blob`.
    pub fn from_sqlite(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => Value::Text(text.to_string()),
                Err(_) => Value::Blob(bytes.to_vec()),
            },
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::Null => Ok(ToSqlOutput::Borrowed(ValueRef::Null)),
            Value::Integer(i) => Ok(ToSqlOutput::Borrowed(ValueRef::Integer(*i))),
            Value::Real(f) => Ok(ToSqlOutput::Borrowed(ValueRef::Real(*f))),
            Value::Text(s) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes()))),
            Value::Boolean(b) => Ok(ToSqlOutput::Borrowed(ValueRef::Integer(i64::from(*b)))),
            Value::Timestamp(ts) => ts.to_sql(),
            Value::Blob(b) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(b))),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = DaoError;

    /// Converts a JSON scalar. Arrays, objects and integers that do not fit
    /// in an `i64` have no positional binding and are rejected.
    fn try_from(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
            serde_json::Value::String(s) => Ok(Value::Text(s)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Integer(i))
                } else if n.is_u64() {
                    Err(unsupported(format!("integer {} is out of range", n)))
                } else {
                    n.as_f64()
                        .map(Value::Real)
                        .ok_or_else(|| unsupported(format!("number {} is not representable", n)))
                }
            }
            serde_json::Value::Array(_) => Err(unsupported("arrays cannot be bound".to_string())),
            serde_json::Value::Object(_) => Err(unsupported("objects cannot be bound".to_string())),
        }
    }
}

fn unsupported(message: String) -> DaoError {
    // The list position is unknown here; `parse_params` fixes it up.
    DaoError::Binding {
        position: 0,
        source: message.into(),
    }
}

/// Parses a JSON array into a parameter list.
///
/// Errors report the 1-indexed position of the offending element.
pub fn parse_params(json: &str) -> Result<Vec<Value>> {
    let parsed: serde_json::Value = serde_json::from_str(json).map_err(|e| DaoError::Binding {
        position: 0,
        source: e.into(),
    })?;
    let serde_json::Value::Array(items) = parsed else {
        return Err(DaoError::Binding {
            position: 0,
            source: "parameters must be a JSON array".into(),
        });
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            Value::try_from(item).map_err(|err| match err {
                DaoError::Binding { source, .. } => DaoError::Binding {
                    position: index + 1,
                    source,
                },
                other => other,
            })
        })
        .collect()
}

/// One result record: column name to value, in column order.
///
/// When two columns share a name the later column's value wins and the key
/// keeps the position of its first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row(IndexMap<String, Value>);

impl Row {
    pub fn with_capacity(capacity: usize) -> Self {
        Row(IndexMap::with_capacity(capacity))
    }

    /// Inserts a column value, replacing any earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut row = Row::default();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

/// Records of one query, in cursor order.
pub type RowSet = Vec<Row>;
