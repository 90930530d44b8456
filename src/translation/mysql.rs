use std::collections::HashSet;

use lazy_static::lazy_static;

use super::{ANSI_RESERVED, ColumnAttributes, DatabaseTranslation, quote_if_needed};
use crate::core::SemanticType;

lazy_static! {
    static ref MYSQL_RESERVED: HashSet<&'static str> = ANSI_RESERVED
        .iter()
        .copied()
        .chain(["KEY", "KEYS", "INDEX", "LIMIT", "RANGE", "READ", "WRITE", "RANK"])
        .collect();
}

/// MySQL and MariaDB share types and backtick quoting.
#[derive(Debug, Clone, Copy)]
pub struct MySqlTranslation {
    mariadb: bool,
}

impl MySqlTranslation {
    pub fn mysql() -> Self {
        Self { mariadb: false }
    }

    pub fn mariadb() -> Self {
        Self { mariadb: true }
    }
}

impl DatabaseTranslation for MySqlTranslation {
    fn name(&self) -> &'static str {
        if self.mariadb { "mariadb" } else { "mysql" }
    }

    fn to_database_type(&self, semantic: SemanticType, _column: &ColumnAttributes) -> String {
        match semantic {
            SemanticType::Boolean => "BOOLEAN",
            SemanticType::TinyInt => "TINYINT",
            SemanticType::SmallInt => "SMALLINT",
            SemanticType::Integer => "INT",
            SemanticType::BigInt => "BIGINT",
            SemanticType::Real => "FLOAT",
            SemanticType::Double => "DOUBLE",
            SemanticType::Text => "VARCHAR(255)",
            SemanticType::Bytes => "LONGBLOB",
            SemanticType::Uuid => "CHAR(36)",
            SemanticType::Date => "DATE",
            SemanticType::Time => "TIME(6)",
            SemanticType::Timestamp => "DATETIME(6)",
            SemanticType::TimestampTz => "TIMESTAMP(6)",
            SemanticType::Json => "JSON",
        }
        .to_string()
    }

    fn wrap_table_name(&self, name: &str) -> String {
        quote_if_needed(name, '`', '`', &MYSQL_RESERVED)
    }

    fn wrap_field_name(&self, name: &str) -> String {
        quote_if_needed(name, '`', '`', &MYSQL_RESERVED)
    }
}
