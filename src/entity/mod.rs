//! Entity mapping: descriptions, the metadata built from them, generated SQL
//! and the row/parameter plumbing used by [`Database`](crate::Database).

pub mod binder;
pub mod column_map;
pub mod description;
pub mod lifecycle;
pub mod mapper;
pub mod metadata;
pub mod sql;

pub use binder::Identifier;
pub use column_map::ColumnMap;
pub use description::{Arguments, Constructor, EntityDescription, FieldSpec, Strategy};
pub use lifecycle::{Callback, IntoCallbackResult, LifecycleCallbacks, Phase};
pub use mapper::{MappedRows, RowMapper};
pub use metadata::{EntityMetadata, FieldDescriptor, ParameterDescriptor};
pub use sql::{GeneratedSql, SqlGenerator};

/// A Rust type mapped to a table.
///
/// Usually derived with `#[derive(Entity)]`; hand-written implementations
/// return the same builder.
pub trait Entity: Sized + Send + Sync + 'static {
    fn describe() -> EntityDescription<Self>;
}
