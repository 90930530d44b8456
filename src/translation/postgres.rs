use super::{ColumnAttributes, DatabaseTranslation};
use crate::core::SemanticType;

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresTranslation;

impl DatabaseTranslation for PostgresTranslation {
    fn name(&self) -> &'static str {
        "postgres"
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
            SemanticType::Bytes => "BYTEA",
            SemanticType::Uuid => "UUID",
            SemanticType::Date => "DATE",
            SemanticType::Time => "TIME",
            SemanticType::Timestamp => "TIMESTAMP",
            SemanticType::TimestampTz => "TIMESTAMPTZ",
            // Bound as text, so no implicit cast into jsonb is needed.
            SemanticType::Json => "TEXT",
        }
        .to_string()
    }
}
