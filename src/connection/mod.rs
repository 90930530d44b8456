pub mod config;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::DatabaseConfig;
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConnection, SqliteProvider};

use crate::core::{ColumnValue, Error, Result, Value};
use crate::result::QueryResult;

/// Hands out connections to the mapper.
///
/// Pooling, transactions and timeouts belong to the provider. Every
/// connection it returns is used by exactly one operation and released by
/// dropping it.
pub trait ConnectionProvider: Send + Sync {
    fn connection(&self) -> Result<Box<dyn Connection>>;
}

impl<F> ConnectionProvider for F
where
    F: Fn() -> Result<Box<dyn Connection>> + Send + Sync,
{
    fn connection(&self) -> Result<Box<dyn Connection>> {
        self()
    }
}

/// A live database connection.
pub trait Connection {
    /// Product name reported by the server, e.g. `PostgreSQL` or `SQLite`.
    fn product_name(&mut self) -> Result<String>;

    /// Runs a statement that does not produce rows and returns the affected row count.
    fn execute(&mut self, statement: &PreparedStatement) -> Result<u64>;

    /// Runs a statement producing rows.
    fn query(&mut self, statement: &PreparedStatement) -> Result<QueryResult>;
}

/// SQL text with positionally bound parameters.
///
/// Parameter indices are 1-based, matching the `?` placeholders from left to
/// right.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedStatement {
    sql: String,
    params: Vec<Value>,
}

impl PreparedStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Binds `value` at `index`; skipped positions are filled with `NULL`.
    pub fn bind(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        if index == 0 {
            return Err(Error::Binding(
                "Parameter indices start at 1".to_string(),
            ));
        }
        if self.params.len() < index {
            self.params.resize(index, Value::Null);
        }
        self.params[index - 1] = value.into();
        Ok(())
    }

    /// Binds any mapped Rust value through its column conversion.
    pub fn bind_column<T: ColumnValue>(&mut self, index: usize, value: &T) -> Result<()> {
        self.bind(index, value.to_value())
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.params.push(value.into());
    }

    pub fn clear_params(&mut self) {
        self.params.clear();
    }
}

/// Binder that leaves the statement untouched.
pub fn no_binding(_: &mut PreparedStatement) -> Result<()> {
    Ok(())
}
