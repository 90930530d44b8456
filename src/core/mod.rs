pub mod error;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use types::{ColumnValue, SemanticType};
pub use value::Value;
