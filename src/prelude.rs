//! Glob-importable surface for application code.
//!
//! `use relmap::prelude::*;` brings in the handle, the derive and the
//! builder types needed to describe entities by hand.

pub use crate::{
    Arguments, ColumnValue, Database, DatabaseConfig, Entity, EntityDescription, FieldSpec,
    Identifier, IntoCallbackResult, PreparedStatement, Value, no_binding,
};

#[cfg(feature = "sqlite")]
pub use crate::SqliteProvider;
