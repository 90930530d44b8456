use super::{ColumnAttributes, DatabaseTranslation};
use crate::core::SemanticType;

#[derive(Debug, Clone, Copy, Default)]
pub struct OracleTranslation;

impl DatabaseTranslation for OracleTranslation {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn to_database_type(&self, semantic: SemanticType, _column: &ColumnAttributes) -> String {
        match semantic {
            SemanticType::Boolean => "NUMBER(1)",
            SemanticType::TinyInt => "NUMBER(3)",
            SemanticType::SmallInt => "NUMBER(5)",
            SemanticType::Integer => "NUMBER(10)",
            SemanticType::BigInt => "NUMBER(19)",
            SemanticType::Real => "BINARY_FLOAT",
            SemanticType::Double => "BINARY_DOUBLE",
            SemanticType::Text => "VARCHAR2(255)",
            SemanticType::Bytes => "BLOB",
            SemanticType::Uuid => "VARCHAR2(36)",
            SemanticType::Date => "DATE",
            // No TIME type: stored as HH:MM:SS.fffffffff text.
            SemanticType::Time => "VARCHAR2(18)",
            SemanticType::Timestamp => "TIMESTAMP",
            SemanticType::TimestampTz => "TIMESTAMP WITH TIME ZONE",
            SemanticType::Json => "CLOB",
        }
        .to_string()
    }
}
