use crate::entity::column_map::normalize;
use crate::translation::{ColumnAttributes, DatabaseTranslation};

/// Statements derived once per entity type.
///
/// Identifier-based statements are `None` for types without identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSql {
    pub ddl: String,
    pub find_by_id: Option<String>,
    pub insert: String,
    pub update: Option<String>,
    pub delete: Option<String>,
    pub find_all: String,
}

pub struct SqlGenerator<'a> {
    translation: &'a dyn DatabaseTranslation,
}

impl<'a> SqlGenerator<'a> {
    pub fn new(translation: &'a dyn DatabaseTranslation) -> Self {
        Self { translation }
    }

    /// `table` must already be wrapped; `columns` are in declaration order
    /// and `ids` indexes into them in identifier order.
    pub fn generate(&self, table: &str, columns: &[ColumnAttributes], ids: &[usize]) -> GeneratedSql {
        let column_list = columns
            .iter()
            .map(|column| self.translation.wrap_field_name(&column.name))
            .collect::<Vec<_>>()
            .join(", ");
        let by_id = self.where_clause(columns, ids);

        let find_all = format!("SELECT {} FROM {}", column_list, table);
        let placeholders = vec!["?"; columns.len()].join(", ");
        let insert = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table, column_list, placeholders
        );
        let assignments = columns
            .iter()
            .map(|column| format!("{} = ?", self.translation.wrap_field_name(&column.name)))
            .collect::<Vec<_>>()
            .join(", ");

        GeneratedSql {
            ddl: self.create_table(table, columns, ids),
            find_by_id: by_id.as_ref().map(|clause| format!("{}{}", find_all, clause)),
            insert,
            update: by_id
                .as_ref()
                .map(|clause| format!("UPDATE {} SET {}{}", table, assignments, clause)),
            delete: by_id
                .as_ref()
                .map(|clause| format!("DELETE FROM {}{}", table, clause)),
            find_all,
        }
    }

    /// Identifier columns first in identifier order, the rest sorted by
    /// lower-cased name.
    pub fn create_table(&self, table: &str, columns: &[ColumnAttributes], ids: &[usize]) -> String {
        let mut rest: Vec<&ColumnAttributes> = columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| !ids.contains(idx))
            .map(|(_, column)| column)
            .collect();
        rest.sort_by(|a, b| {
            normalize(&a.name)
                .cmp(&normalize(&b.name))
                .then_with(|| a.name.cmp(&b.name))
        });

        let ordered = ids.iter().map(|idx| &columns[*idx]).chain(rest);
        let definitions = ordered
            .map(|column| {
                let sql_type = column.sql_type.clone().unwrap_or_else(|| {
                    self.translation.to_database_type(column.semantic, column)
                });
                format!("{} {}", self.translation.wrap_field_name(&column.name), sql_type)
            })
            .collect::<Vec<_>>()
            .join(", ");

        let primary_key = if ids.is_empty() {
            String::new()
        } else {
            let id_columns: Vec<(String, ColumnAttributes)> = ids
                .iter()
                .map(|idx| {
                    let column = &columns[*idx];
                    (self.translation.wrap_field_name(&column.name), column.clone())
                })
                .collect();
            self.translation.to_create_table_primary_key_suffix(&id_columns)
        };

        format!("CREATE TABLE {} ({}{})", table, definitions, primary_key)
    }

    fn where_clause(&self, columns: &[ColumnAttributes], ids: &[usize]) -> Option<String> {
        if ids.is_empty() {
            return None;
        }
        let predicates = ids
            .iter()
            .map(|idx| format!("{} = ?", self.translation.wrap_field_name(&columns[*idx].name)))
            .collect::<Vec<_>>()
            .join(" AND ");
        Some(format!(" WHERE {}", predicates))
    }
}
