use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::core::{Error, Result, SemanticType};

/// A single cell as it travels between the mapper and the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Boolean(_) => "BOOLEAN",
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Blob(_) => "BLOB",
            Self::Uuid(_) => "UUID",
            Self::Date(_) => "DATE",
            Self::Time(_) => "TIME",
            Self::Timestamp(_) => "TIMESTAMP",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts a value into the wire representation of `target`.
    ///
    /// Reads and writes both go through this table so that whatever a driver
    /// hands back for a column can be turned into the field's type and the
    /// other way around. `NULL` is always preserved.
    pub fn coerce(self, target: SemanticType) -> Result<Value> {
        if self.is_null() {
            return Ok(Value::Null);
        }

        match target {
            SemanticType::Boolean => self.coerce_bool(),
            SemanticType::TinyInt => self.coerce_integer(target, i8::MIN as i64, i8::MAX as i64),
            SemanticType::SmallInt => {
                self.coerce_integer(target, i16::MIN as i64, i16::MAX as i64)
            }
            SemanticType::Integer => {
                self.coerce_integer(target, i32::MIN as i64, i32::MAX as i64)
            }
            SemanticType::BigInt => self.coerce_integer(target, i64::MIN, i64::MAX),
            SemanticType::Real | SemanticType::Double => self.coerce_float(target),
            SemanticType::Text | SemanticType::Json => self.coerce_text(target),
            SemanticType::Bytes => match self {
                Value::Blob(bytes) => Ok(Value::Blob(bytes)),
                Value::Text(text) => Ok(Value::Blob(text.into_bytes())),
                other => Err(mismatch(&other, target)),
            },
            SemanticType::Uuid => match self {
                Value::Uuid(id) => Ok(Value::Uuid(id)),
                Value::Text(text) => Uuid::parse_str(text.trim())
                    .map(Value::Uuid)
                    .map_err(|e| Error::Binding(format!("Invalid UUID '{}': {}", text, e))),
                Value::Blob(bytes) => Uuid::from_slice(&bytes)
                    .map(Value::Uuid)
                    .map_err(|e| Error::Binding(format!("Invalid UUID bytes: {}", e))),
                other => Err(mismatch(&other, target)),
            },
            SemanticType::Date => match self {
                Value::Date(date) => Ok(Value::Date(date)),
                Value::Timestamp(ts) => Ok(Value::Date(ts.date())),
                Value::Text(text) => NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
                    .map(Value::Date)
                    .or_else(|_| parse_timestamp(&text).map(|ts| Value::Date(ts.date()))),
                other => Err(mismatch(&other, target)),
            },
            SemanticType::Time => match self {
                Value::Time(time) => Ok(Value::Time(time)),
                Value::Timestamp(ts) => Ok(Value::Time(ts.time())),
                Value::Text(text) => NaiveTime::parse_from_str(text.trim(), TIME_FORMAT)
                    .map(Value::Time)
                    .map_err(|e| Error::Binding(format!("Invalid time '{}': {}", text, e))),
                other => Err(mismatch(&other, target)),
            },
            SemanticType::Timestamp | SemanticType::TimestampTz => match self {
                Value::Timestamp(ts) => Ok(Value::Timestamp(ts)),
                Value::Date(date) => Ok(Value::Timestamp(date.and_time(NaiveTime::MIN))),
                Value::Text(text) => parse_timestamp(&text).map(Value::Timestamp),
                other => Err(mismatch(&other, target)),
            },
        }
    }

    fn coerce_bool(self) -> Result<Value> {
        match self {
            Value::Boolean(b) => Ok(Value::Boolean(b)),
            Value::Integer(i) => Ok(Value::Boolean(i != 0)),
            Value::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "y" | "yes" => Ok(Value::Boolean(true)),
                "false" | "f" | "0" | "n" | "no" => Ok(Value::Boolean(false)),
                _ => Err(Error::Binding(format!("Invalid boolean '{}'", text))),
            },
            other => Err(mismatch(&other, SemanticType::Boolean)),
        }
    }

    fn coerce_integer(self, target: SemanticType, min: i64, max: i64) -> Result<Value> {
        let raw = match self {
            Value::Integer(i) => i,
            Value::Boolean(b) => b as i64,
            Value::Float(f) => {
                if f.fract() != 0.0
                    || !f.is_finite()
                    || f < i64::MIN as f64
                    || f >= i64::MAX as f64
                {
                    return Err(Error::Binding(format!(
                        "Float {} cannot be stored as {}",
                        f, target
                    )));
                }
                f as i64
            }
            Value::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|e| Error::Binding(format!("Invalid integer '{}': {}", text, e)))?,
            other => return Err(mismatch(&other, target)),
        };

        if raw < min || raw > max {
            return Err(Error::Binding(format!(
                "Integer {} is out of range for {}",
                raw, target
            )));
        }
        Ok(Value::Integer(raw))
    }

    fn coerce_float(self, target: SemanticType) -> Result<Value> {
        match self {
            Value::Float(f) => Ok(Value::Float(f)),
            Value::Integer(i) => Ok(Value::Float(i as f64)),
            Value::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| Error::Binding(format!("Invalid number '{}': {}", text, e))),
            other => Err(mismatch(&other, target)),
        }
    }

    fn coerce_text(self, target: SemanticType) -> Result<Value> {
        match self {
            Value::Text(text) => Ok(Value::Text(text)),
            Value::Blob(bytes) => String::from_utf8(bytes)
                .map(Value::Text)
                .map_err(|e| Error::Binding(format!("Blob is not valid UTF-8: {}", e))),
            other if target == SemanticType::Text => Ok(Value::Text(other.to_string())),
            other => Err(mismatch(&other, target)),
        }
    }
}

fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(ts);
        }
    }
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.naive_utc())
        .map_err(|e| Error::Binding(format!("Invalid timestamp '{}': {}", text, e)))
}

fn mismatch(value: &Value, target: SemanticType) -> Error {
    Error::Binding(format!(
        "Cannot convert {} value into {}",
        value.type_name(),
        target
    ))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{}", s),
            Self::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::Uuid(id) => write!(f, "{}", id),
            Self::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Self::Time(time) => write!(f, "{}", time.format(TIME_FORMAT)),
            Self::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMATS[0])),
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
        Value::Integer(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
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

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
