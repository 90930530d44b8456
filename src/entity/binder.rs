use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::connection::PreparedStatement;
use crate::core::{Error, Result, Value};

use super::metadata::EntityMetadata;

/// Primary key value(s) of one row, in identifier order.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    Single(Value),
    Composite(Vec<Value>),
}

impl Identifier {
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Composite(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_values(self) -> Vec<Value> {
        match self {
            Self::Single(value) => vec![value],
            Self::Composite(values) => values,
        }
    }
}

macro_rules! single_identifier {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Identifier {
                fn from(value: $ty) -> Self {
                    Identifier::Single(value.into())
                }
            }
        )*
    };
}

single_identifier!(Value, i64, i32, bool, f64, &str, String, Uuid, NaiveDate, NaiveDateTime);

impl From<Vec<Value>> for Identifier {
    fn from(values: Vec<Value>) -> Self {
        Identifier::Composite(values)
    }
}

impl<A, B> From<(A, B)> for Identifier
where
    A: Into<Value>,
    B: Into<Value>,
{
    fn from((a, b): (A, B)) -> Self {
        Identifier::Composite(vec![a.into(), b.into()])
    }
}

impl<A, B, C> From<(A, B, C)> for Identifier
where
    A: Into<Value>,
    B: Into<Value>,
    C: Into<Value>,
{
    fn from((a, b, c): (A, B, C)) -> Self {
        Identifier::Composite(vec![a.into(), b.into(), c.into()])
    }
}

/// Binds every column in declaration order, matching the INSERT statement.
pub fn bind_insert<E>(
    metadata: &EntityMetadata<E>,
    entity: &E,
    statement: &mut PreparedStatement,
) -> Result<()> {
    bind_columns(metadata, entity, statement)?;
    Ok(())
}

/// Binds every column, then the current identifier values for the WHERE clause.
pub fn bind_update<E>(
    metadata: &EntityMetadata<E>,
    entity: &E,
    statement: &mut PreparedStatement,
) -> Result<()> {
    require_ids(metadata, "update")?;
    let next = bind_columns(metadata, entity, statement)?;
    bind_entity_ids(metadata, entity, statement, next)
}

pub fn bind_delete<E>(
    metadata: &EntityMetadata<E>,
    entity: &E,
    statement: &mut PreparedStatement,
) -> Result<()> {
    require_ids(metadata, "delete")?;
    bind_entity_ids(metadata, entity, statement, 1)
}

/// Binds a caller-supplied identifier, coerced to each identifier column's type.
pub fn bind_identifier<E>(
    metadata: &EntityMetadata<E>,
    identifier: Identifier,
    statement: &mut PreparedStatement,
) -> Result<()> {
    require_ids(metadata, "find by id")?;
    let values = identifier.into_values();
    if values.len() != metadata.id_count() {
        return Err(Error::Binding(format!(
            "{} has {} identifier column(s) but {} value(s) were supplied",
            metadata.type_name(),
            metadata.id_count(),
            values.len()
        )));
    }
    for (index, (field, value)) in metadata.id_fields().zip(values).enumerate() {
        statement.bind(index + 1, value.coerce(field.semantic())?)?;
    }
    Ok(())
}

fn bind_columns<E>(
    metadata: &EntityMetadata<E>,
    entity: &E,
    statement: &mut PreparedStatement,
) -> Result<usize> {
    let mut index = 1;
    for field in metadata.fields().values() {
        statement.bind(index, field.read(entity))?;
        index += 1;
    }
    Ok(index)
}

fn bind_entity_ids<E>(
    metadata: &EntityMetadata<E>,
    entity: &E,
    statement: &mut PreparedStatement,
    start: usize,
) -> Result<()> {
    for (offset, field) in metadata.id_fields().enumerate() {
        statement.bind(start + offset, field.read(entity))?;
    }
    Ok(())
}

fn require_ids<E>(metadata: &EntityMetadata<E>, operation: &str) -> Result<()> {
    if metadata.id_count() == 0 {
        return Err(Error::Binding(format!(
            "Cannot {} {}: no identifier declared",
            operation,
            metadata.type_name()
        )));
    }
    Ok(())
}
