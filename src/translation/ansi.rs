use super::{ColumnAttributes, DatabaseTranslation};
use crate::core::SemanticType;

/// Standard SQL types; used when no product-specific translation matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiTranslation;

impl DatabaseTranslation for AnsiTranslation {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn to_database_type(&self, semantic: SemanticType, _column: &ColumnAttributes) -> String {
        match semantic {
            SemanticType::Boolean => "BOOLEAN",
            SemanticType::TinyInt | SemanticType::SmallInt => "SMALLINT",
            SemanticType::Integer => "INTEGER",
            SemanticType::BigInt => "BIGINT",
            SemanticType::Real => "REAL",
            SemanticType::Double => "DOUBLE PRECISION",
            SemanticType::Text => "VARCHAR(255)",
            SemanticType::Bytes => "BLOB",
            SemanticType::Uuid => "VARCHAR(36)",
            SemanticType::Date => "DATE",
            SemanticType::Time => "TIME",
            SemanticType::Timestamp => "TIMESTAMP",
            SemanticType::TimestampTz => "TIMESTAMP WITH TIME ZONE",
            SemanticType::Json => "CLOB",
        }
        .to_string()
    }
}
