use super::{ColumnAttributes, DatabaseTranslation};
use crate::core::SemanticType;

#[derive(Debug, Clone, Copy, Default)]
pub struct H2Translation;

impl DatabaseTranslation for H2Translation {
    fn name(&self) -> &'static str {
        "h2"
    }

    fn to_database_type(&self, semantic: SemanticType, _column: &ColumnAttributes) -> String {
        match semantic {
            SemanticType::Boolean => "BOOLEAN",
            SemanticType::TinyInt => "TINYINT",
            SemanticType::SmallInt => "SMALLINT",
            SemanticType::Integer => "INTEGER",
            SemanticType::BigInt => "BIGINT",
            SemanticType::Real => "REAL",
            SemanticType::Double => "DOUBLE",
            SemanticType::Text => "VARCHAR(255)",
            SemanticType::Bytes => "VARBINARY",
            SemanticType::Uuid => "UUID",
            SemanticType::Date => "DATE",
            SemanticType::Time => "TIME",
            SemanticType::Timestamp => "TIMESTAMP",
            SemanticType::TimestampTz => "TIMESTAMP WITH TIME ZONE",
            SemanticType::Json => "CLOB",
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::column;

    #[test]
    fn uses_native_uuid_and_double() {
        let t = H2Translation;
        let c = column("x", SemanticType::Uuid);
        assert_eq!(t.to_database_type(SemanticType::Uuid, &c), "UUID");
        assert_eq!(t.to_database_type(SemanticType::Double, &c), "DOUBLE");
        assert_eq!(t.wrap_table_name("FLAT_ENTITY"), "FLAT_ENTITY");
    }
}
