//! Dialect translations: column types, identifier quoting and primary key DDL.
//!
//! The mapper never escapes identifiers on its own. Every table and column
//! token goes through [`DatabaseTranslation::wrap_table_name`] or
//! [`DatabaseTranslation::wrap_field_name`] before it is concatenated into SQL.

mod ansi;
mod h2;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;

pub use ansi::AnsiTranslation;
pub use h2::H2Translation;
pub use mysql::MySqlTranslation;
pub use oracle::OracleTranslation;
pub use postgres::PostgresTranslation;
pub use sqlite::SqliteTranslation;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::SemanticType;

/// Everything known about a mapped column when its DDL is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAttributes {
    /// Resolved column name (override or declared name), not yet wrapped.
    pub name: String,
    /// Name of the Rust member.
    pub declared_name: String,
    pub semantic: SemanticType,
    /// Explicit database type; never blank when set.
    pub sql_type: Option<String>,
    pub id_order: Option<u32>,
    pub nullable: bool,
}

impl ColumnAttributes {
    pub fn is_id(&self) -> bool {
        self.id_order.is_some()
    }
}

pub trait DatabaseTranslation: Send + Sync + fmt::Debug {
    /// Short lower-case name, as accepted by [`by_name`].
    fn name(&self) -> &'static str;

    fn to_database_type(&self, semantic: SemanticType, column: &ColumnAttributes) -> String;

    fn wrap_table_name(&self, name: &str) -> String {
        quote_if_needed(name, '"', '"', &ANSI_RESERVED)
    }

    fn wrap_field_name(&self, name: &str) -> String {
        quote_if_needed(name, '"', '"', &ANSI_RESERVED)
    }

    /// Trailing DDL fragment declaring the primary key; `ids` holds the
    /// already wrapped identifier column names in identifier order.
    fn to_create_table_primary_key_suffix(&self, ids: &[(String, ColumnAttributes)]) -> String {
        let names: Vec<&str> = ids.iter().map(|(name, _)| name.as_str()).collect();
        format!(", PRIMARY KEY ({})", names.join(", "))
    }
}

lazy_static! {
    static ref PLAIN_IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();

    pub(crate) static ref ANSI_RESERVED: HashSet<&'static str> = [
        "ALL", "AND", "AS", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN", "CONSTRAINT", "CREATE",
        "CROSS", "DEFAULT", "DELETE", "DISTINCT", "DROP", "ELSE", "END", "EXISTS", "FALSE",
        "FOR", "FOREIGN", "FROM", "FULL", "GROUP", "HAVING", "IN", "INNER", "INSERT", "INTO",
        "IS", "JOIN", "LEFT", "LIKE", "NOT", "NULL", "ON", "OR", "ORDER", "OUTER", "PRIMARY",
        "REFERENCES", "RIGHT", "SELECT", "SET", "TABLE", "THEN", "TO", "TRUE", "UNION",
        "UNIQUE", "UPDATE", "USER", "USING", "VALUES", "WHEN", "WHERE", "WITH",
    ]
    .into_iter()
    .collect();

    static ref PRODUCT_PATTERNS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)^h2\b").unwrap(), "h2"),
        (Regex::new(r"(?i)postgres").unwrap(), "postgres"),
        (Regex::new(r"(?i)mariadb").unwrap(), "mariadb"),
        (Regex::new(r"(?i)mysql").unwrap(), "mysql"),
        (Regex::new(r"(?i)oracle").unwrap(), "oracle"),
        (Regex::new(r"(?i)sqlite").unwrap(), "sqlite"),
    ];
}

/// Returns `name` untouched when it is a plain identifier that is not a
/// reserved word, otherwise wraps it in `open`/`close`, doubling any embedded
/// `close` character.
pub fn quote_if_needed(name: &str, open: char, close: char, reserved: &HashSet<&str>) -> String {
    if PLAIN_IDENTIFIER.is_match(name) && !reserved.contains(name.to_ascii_uppercase().as_str()) {
        return name.to_string();
    }
    let escaped = name.replace(close, &format!("{close}{close}"));
    format!("{open}{escaped}{close}")
}

/// Looks a translation up by its configured name.
pub fn by_name(name: &str) -> Option<Arc<dyn DatabaseTranslation>> {
    let translation: Arc<dyn DatabaseTranslation> = match name.trim().to_ascii_lowercase().as_str()
    {
        "ansi" | "generic" => Arc::new(AnsiTranslation),
        "h2" => Arc::new(H2Translation),
        "postgres" | "postgresql" => Arc::new(PostgresTranslation),
        "mysql" => Arc::new(MySqlTranslation::mysql()),
        "mariadb" => Arc::new(MySqlTranslation::mariadb()),
        "oracle" => Arc::new(OracleTranslation),
        "sqlite" => Arc::new(SqliteTranslation),
        _ => return None,
    };
    Some(translation)
}

/// Picks the translation matching a connection's product name, falling back
/// to [`AnsiTranslation`].
pub fn for_product(product_name: &str) -> Arc<dyn DatabaseTranslation> {
    PRODUCT_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(product_name))
        .and_then(|(_, name)| by_name(name))
        .unwrap_or_else(|| Arc::new(AnsiTranslation))
}

#[cfg(test)]
pub(crate) fn column(name: &str, semantic: SemanticType) -> ColumnAttributes {
    ColumnAttributes {
        name: name.to_string(),
        declared_name: name.to_string(),
        semantic,
        sql_type: None,
        id_order: None,
        nullable: false,
    }
}
