use serde::Deserialize;

/// Settings of a [`Database`](crate::Database) handle.
///
/// Everything here is optional; the defaults probe the connection for its
/// dialect and stay quiet about executed SQL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatabaseConfig {
    /// Forces a translation by name (`ansi`, `h2`, `postgres`, `mysql`,
    /// `mariadb`, `oracle`, `sqlite`) instead of probing the connection.
    pub translation: Option<String>,

    /// Logs each executed statement at debug level.
    pub log_statements: bool,
}

impl DatabaseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the translation name
    pub fn translation(mut self, name: &str) -> Self {
        self.translation = Some(name.to_string());
        self
    }

    /// Enable or disable statement logging
    pub fn log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    /// Parse from a JSON document
    ///
    /// ```
    /// # use relmap::DatabaseConfig;
    /// let config = DatabaseConfig::from_json(r#"{"translation": "postgres", "logStatements": true}"#)?;
    /// assert_eq!(config.translation.as_deref(), Some("postgres"));
    /// # Ok::<(), serde_json::Error>(())
    /// ```
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let config = DatabaseConfig::new().translation("h2").log_statements(true);
        assert_eq!(config.translation.as_deref(), Some("h2"));
        assert!(config.log_statements);
    }

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(DatabaseConfig::from_json("{}").unwrap(), DatabaseConfig::default());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(DatabaseConfig::from_json("{\"logStatements\": 3}").is_err());
    }
}
