// ============================================================================
// relmap: lightweight object-relational mapping
// ============================================================================

//! Maps plain Rust structs to relational tables.
//!
//! A type describes its columns once (by hand or with `#[derive(Entity)]`);
//! [`Database`] turns that description into SQL for the connected dialect,
//! caches it, binds instance values and rebuilds instances from result rows.
//!
//! ```no_run
//! use relmap::{Database, Entity, SqliteProvider};
//!
//! #[derive(Debug, Default, Entity)]
//! #[entity(table = "PEOPLE")]
//! struct Person {
//!     #[id]
//!     id: String,
//!     #[column]
//!     name: String,
//!     #[column]
//!     age: i32,
//! }
//!
//! # fn main() -> relmap::Result<()> {
//! let db = Database::new(SqliteProvider::new("people.db"));
//! db.create_table::<Person>()?;
//!
//! let mut ada = Person { id: "p1".into(), name: "Ada".into(), age: 36 };
//! db.insert(&mut ada)?;
//! let found: Option<Person> = db.find_by_id("p1")?;
//! assert_eq!(found.map(|p| p.age), Some(36));
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod core;
pub mod entity;
pub mod facade;
pub mod prelude;
pub mod result;
pub mod translation;

pub use connection::{Connection, ConnectionProvider, DatabaseConfig, PreparedStatement, no_binding};
#[cfg(feature = "sqlite")]
pub use connection::{SqliteConnection, SqliteProvider};
pub use self::core::{ColumnValue, Error, Result, SemanticType, Value};
pub use entity::{
    Arguments, Entity, EntityDescription, EntityMetadata, FieldSpec, Identifier,
    IntoCallbackResult,
};
pub use facade::Database;
pub use result::{QueryResult, Row};
pub use translation::DatabaseTranslation;

pub use relmap_derive::Entity;
