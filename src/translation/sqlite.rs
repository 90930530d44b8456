use super::{ColumnAttributes, DatabaseTranslation};
use crate::core::SemanticType;

/// Storage-class oriented types; temporal values and uuids live in TEXT.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteTranslation;

impl DatabaseTranslation for SqliteTranslation {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn to_database_type(&self, semantic: SemanticType, _column: &ColumnAttributes) -> String {
        match semantic {
            SemanticType::Boolean
            | SemanticType::TinyInt
            | SemanticType::SmallInt
            | SemanticType::Integer
            | SemanticType::BigInt => "INTEGER",
            SemanticType::Real | SemanticType::Double => "REAL",
            SemanticType::Bytes => "BLOB",
            SemanticType::Text
            | SemanticType::Uuid
            | SemanticType::Date
            | SemanticType::Time
            | SemanticType::Timestamp
            | SemanticType::TimestampTz
            | SemanticType::Json => "TEXT",
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::column;

    #[test]
    fn collapses_to_storage_classes() {
        let t = SqliteTranslation;
        let c = column("x", SemanticType::Boolean);
        assert_eq!(t.to_database_type(SemanticType::Boolean, &c), "INTEGER");
        assert_eq!(t.to_database_type(SemanticType::Timestamp, &c), "TEXT");
        assert_eq!(t.to_database_type(SemanticType::Real, &c), "REAL");
    }
}
