mod result;

pub use result::{QueryResult, Row};
