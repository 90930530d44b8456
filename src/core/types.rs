use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use super::{Error, Result, Value};

/// The Rust-side kind of a mapped member, independent of any dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Text,
    Bytes,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::TinyInt => "tinyint",
            Self::SmallInt => "smallint",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Real => "real",
            Self::Double => "double",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamp with time zone",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// A Rust type that can be stored in a single column.
///
/// `from_value` receives whatever the driver produced; implementations run it
/// through [`Value::coerce`] first. A SQL `NULL` read into a non-optional type
/// yields that type's default, the same value a default-constructed entity
/// holds before the row is applied.
pub trait ColumnValue: Sized {
    const SEMANTIC_TYPE: SemanticType;
    const NULLABLE: bool = false;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self>;

    /// Value handed to a constructor parameter whose column is missing from a row.
    fn absent_value() -> Value {
        Value::Null
    }
}

fn unexpected<T>(value: Value, rust_type: &str) -> Result<T> {
    Err(Error::Binding(format!(
        "Cannot read {} value into {}",
        value.type_name(),
        rust_type
    )))
}

macro_rules! integer_column {
    ($($ty:ty => $semantic:ident),* $(,)?) => {
        $(
            impl ColumnValue for $ty {
                const SEMANTIC_TYPE: SemanticType = SemanticType::$semantic;

                fn to_value(&self) -> Value {
                    Value::Integer(*self as i64)
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value.coerce(Self::SEMANTIC_TYPE)? {
                        Value::Null => Ok(0),
                        Value::Integer(i) => Ok(i as $ty),
                        other => unexpected(other, stringify!($ty)),
                    }
                }

                fn absent_value() -> Value {
                    Value::Integer(0)
                }
            }
        )*
    };
}

integer_column!(i8 => TinyInt, i16 => SmallInt, i32 => Integer, i64 => BigInt);

impl ColumnValue for f32 {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Real;

    fn to_value(&self) -> Value {
        Value::Float(*self as f64)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value.coerce(Self::SEMANTIC_TYPE)? {
            Value::Null => Ok(0.0),
            Value::Float(f) => Ok(f as f32),
            other => unexpected(other, "f32"),
        }
    }

    fn absent_value() -> Value {
        Value::Float(0.0)
    }
}

impl ColumnValue for f64 {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Double;

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value.coerce(Self::SEMANTIC_TYPE)? {
            Value::Null => Ok(0.0),
            Value::Float(f) => Ok(f),
            other => unexpected(other, "f64"),
        }
    }

    fn absent_value() -> Value {
        Value::Float(0.0)
    }
}

impl ColumnValue for bool {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Boolean;

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value.coerce(Self::SEMANTIC_TYPE)? {
            Value::Null => Ok(false),
            Value::Boolean(b) => Ok(b),
            other => unexpected(other, "bool"),
        }
    }

    fn absent_value() -> Value {
        Value::Boolean(false)
    }
}

impl ColumnValue for String {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value.coerce(Self::SEMANTIC_TYPE)? {
            Value::Null => Ok(String::new()),
            Value::Text(text) => Ok(text),
            other => unexpected(other, "String"),
        }
    }
}

impl ColumnValue for Vec<u8> {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Bytes;

    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value.coerce(Self::SEMANTIC_TYPE)? {
            Value::Null => Ok(Vec::new()),
            Value::Blob(bytes) => Ok(bytes),
            other => unexpected(other, "Vec<u8>"),
        }
    }
}

impl ColumnValue for Uuid {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Uuid;

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value.coerce(Self::SEMANTIC_TYPE)? {
            Value::Null => Ok(Uuid::nil()),
            Value::Uuid(id) => Ok(id),
            other => unexpected(other, "Uuid"),
        }
    }
}

impl ColumnValue for NaiveDate {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Date;

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value.coerce(Self::SEMANTIC_TYPE)? {
            Value::Null => Ok(NaiveDate::default()),
            Value::Date(date) => Ok(date),
            other => unexpected(other, "NaiveDate"),
        }
    }
}

impl ColumnValue for NaiveTime {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Time;

    fn to_value(&self) -> Value {
        Value::Time(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value.coerce(Self::SEMANTIC_TYPE)? {
            Value::Null => Ok(NaiveTime::MIN),
            Value::Time(time) => Ok(time),
            other => unexpected(other, "NaiveTime"),
        }
    }
}

impl ColumnValue for NaiveDateTime {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Timestamp;

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value.coerce(Self::SEMANTIC_TYPE)? {
            Value::Null => Ok(NaiveDateTime::default()),
            Value::Timestamp(ts) => Ok(ts),
            other => unexpected(other, "NaiveDateTime"),
        }
    }
}

impl ColumnValue for DateTime<Utc> {
    const SEMANTIC_TYPE: SemanticType = SemanticType::TimestampTz;

    // Stored as UTC wall-clock time.
    fn to_value(&self) -> Value {
        Value::Timestamp(self.naive_utc())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value.coerce(Self::SEMANTIC_TYPE)? {
            Value::Null => Ok(DateTime::<Utc>::default()),
            Value::Timestamp(ts) => Ok(ts.and_utc()),
            other => unexpected(other, "DateTime<Utc>"),
        }
    }
}

impl ColumnValue for serde_json::Value {
    const SEMANTIC_TYPE: SemanticType = SemanticType::Json;

    // A `null` document is the text "null", so SQL NULL only ever means `None`.
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value.coerce(Self::SEMANTIC_TYPE)? {
            Value::Null => Ok(serde_json::Value::Null),
            Value::Text(text) => serde_json::from_str(&text)
                .map_err(|e| Error::Binding(format!("Invalid JSON document: {}", e))),
            other => unexpected(other, "serde_json::Value"),
        }
    }
}

impl<T: ColumnValue> ColumnValue for Option<T> {
    const SEMANTIC_TYPE: SemanticType = T::SEMANTIC_TYPE;
    const NULLABLE: bool = true;

    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value).map(Some)
    }
}
