use std::collections::HashMap;

/// Insertion-ordered map whose lookups ignore case.
///
/// Keys keep their original spelling for iteration and SQL generation; the
/// lower-cased form is only used to resolve names coming back from a result
/// set.
#[derive(Debug, Clone)]
pub struct ColumnMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for ColumnMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> ColumnMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new entry. When another key already normalizes to the same
    /// name the map is left untouched and that key is returned.
    pub fn try_insert(&mut self, key: impl Into<String>, value: V) -> Result<usize, String> {
        let key = key.into();
        let normalized = normalize(&key);
        if let Some(existing) = self.index.get(&normalized) {
            return Err(self.entries[*existing].0.clone());
        }

        let position = self.entries.len();
        self.index.insert(normalized, position);
        self.entries.push((key, value));
        Ok(position)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(&normalize(key)).copied()
    }

    pub fn get_index(&self, position: usize) -> Option<(&str, &V)> {
        self.entries
            .get(position)
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&normalize(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub(crate) fn normalize(name: &str) -> String {
    name.to_lowercase()
}
