//! SQLite connections backed by `rusqlite`.

use std::path::{Path, PathBuf};

use rusqlite::params_from_iter;
use rusqlite::types::{Value as SqliteValue, ValueRef};

use super::{Connection, ConnectionProvider, PreparedStatement};
use crate::core::{Error, Result, Value};
use crate::result::QueryResult;

/// Opens a fresh connection to a SQLite database file for every operation.
#[derive(Debug, Clone)]
pub struct SqliteProvider {
    path: PathBuf,
}

impl SqliteProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionProvider for SqliteProvider {
    fn connection(&self) -> Result<Box<dyn Connection>> {
        let conn = rusqlite::Connection::open(&self.path)?;
        Ok(Box::new(SqliteConnection::new(conn)))
    }
}

pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    pub fn new(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    pub fn into_inner(self) -> rusqlite::Connection {
        self.conn
    }
}

impl Connection for SqliteConnection {
    fn product_name(&mut self) -> Result<String> {
        Ok("SQLite".to_string())
    }

    fn execute(&mut self, statement: &PreparedStatement) -> Result<u64> {
        let mut stmt = self.conn.prepare(statement.sql())?;
        let changed = stmt.execute(params_from_iter(
            statement.params().iter().map(to_sqlite),
        ))?;
        Ok(changed as u64)
    }

    fn query(&mut self, statement: &PreparedStatement) -> Result<QueryResult> {
        let mut stmt = self.conn.prepare(statement.sql())?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let width = columns.len();

        let mut rows = stmt.query(params_from_iter(
            statement.params().iter().map(to_sqlite),
        ))?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(from_sqlite(row.get_ref(idx)?)?);
            }
            collected.push(values);
        }

        Ok(QueryResult::new(columns, collected))
    }
}

fn to_sqlite(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Boolean(b) => SqliteValue::Integer(*b as i64),
        Value::Integer(i) => SqliteValue::Integer(*i),
        Value::Float(f) => SqliteValue::Real(*f),
        Value::Text(text) => SqliteValue::Text(text.clone()),
        Value::Blob(bytes) => SqliteValue::Blob(bytes.clone()),
        // SQLite has no native temporal or uuid storage class.
        other => SqliteValue::Text(other.to_string()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|text| Value::Text(text.to_string()))
            .map_err(|e| Error::Binding(format!("Invalid UTF-8 in text column: {}", e)))?,
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn memory() -> SqliteConnection {
        SqliteConnection::new(rusqlite::Connection::open_in_memory().unwrap())
    }

    #[test]
    fn query_reports_columns_and_rows() {
        let mut conn = memory();
        conn.execute(&PreparedStatement::new("CREATE TABLE t (id INTEGER, label TEXT)"))
            .unwrap();

        let mut insert = PreparedStatement::new("INSERT INTO t (id, label) VALUES (?, ?)");
        insert.bind(1, 7).unwrap();
        insert.bind(2, "seven").unwrap();
        assert_eq!(conn.execute(&insert).unwrap(), 1);

        let result = conn
            .query(&PreparedStatement::new("SELECT id, label FROM t"))
            .unwrap();
        assert_eq!(result.columns, vec!["id", "label"]);
        assert_eq!(
            result.rows,
            vec![vec![Value::Integer(7), Value::Text("seven".into())]]
        );
    }

    #[test]
    fn temporal_values_are_stored_as_text() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        assert_eq!(
            to_sqlite(&Value::Date(date)),
            SqliteValue::Text("2021-03-04".into())
        );
        assert_eq!(to_sqlite(&Value::Boolean(true)), SqliteValue::Integer(1));
    }

    #[test]
    fn invalid_utf8_text_is_binding_error() {
        let mut conn = memory();
        let err = conn
            .query(&PreparedStatement::new("SELECT CAST(X'C328' AS TEXT) AS label"))
            .unwrap_err();
        assert!(err.is_binding());

        assert_eq!(
            from_sqlite(ValueRef::Text(b"ok")).unwrap(),
            Value::Text("ok".into())
        );
    }

    #[test]
    fn driver_errors_become_storage_errors() {
        let mut conn = memory();
        let err = conn
            .query(&PreparedStatement::new("SELECT * FROM missing"))
            .unwrap_err();
        assert!(err.is_storage());
    }
}
