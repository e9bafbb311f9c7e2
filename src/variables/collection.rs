//! Collection trait and implementations.

use regex::Regex;

/// A multi-valued, ordered collection of key-value pairs.
pub trait Collection: Send + Sync {
    /// Get all key-value pairs in insertion order.
    fn all(&self) -> Vec<(&str, &str)>;

    /// Get values by key.
    fn get(&self, key: &str) -> Option<Vec<&str>>;

    /// Get pairs whose key matches a regex pattern.
    fn get_regex(&self, pattern: &Regex) -> Vec<(&str, &str)>;

    /// Count items.
    fn count(&self) -> usize;

    /// Count items with specific key.
    fn count_key(&self, key: &str) -> usize;
}

/// A mutable collection (TX).
pub trait MutableCollection: Collection {
    /// Replace all values of a key with a single value.
    fn set(&mut self, key: String, value: String);

    /// Delete a key.
    fn delete(&mut self, key: &str);

    /// Increment a numeric value (missing or non-numeric counts as 0).
    fn increment(&mut self, key: &str, amount: i64);

    /// Decrement a numeric value.
    fn decrement(&mut self, key: &str, amount: i64);
}

/// Insertion-ordered collection with case-insensitive keys.
///
/// Keys are stored lowercased so header and TX lookups behave the same way.
#[derive(Debug, Clone, Default)]
pub struct KeyValueCollection {
    entries: Vec<(String, String)>,
}

impl KeyValueCollection {
    /// Create a new empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value to a key, keeping existing values.
    pub fn add(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .push((key.as_ref().to_ascii_lowercase(), value.into()));
    }

    /// Clear all data.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether the collection has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Collection for KeyValueCollection {
    fn all(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    fn get(&self, key: &str) -> Option<Vec<&str>> {
        let key = key.to_ascii_lowercase();
        let values: Vec<&str> = self
            .entries
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }

    fn get_regex(&self, pattern: &Regex) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter(|(k, _)| pattern.is_match(k))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    fn count(&self) -> usize {
        self.entries.len()
    }

    fn count_key(&self, key: &str) -> usize {
        let key = key.to_ascii_lowercase();
        self.entries.iter().filter(|(k, _)| *k == key).count()
    }
}

impl MutableCollection for KeyValueCollection {
    fn set(&mut self, key: String, value: String) {
        let key = key.to_ascii_lowercase();
        match self.entries.iter().position(|(k, _)| *k == key) {
            Some(first) => {
                self.entries[first].1 = value;
                let mut idx = 0;
                self.entries.retain(|(k, _)| {
                    let keep = idx <= first || *k != key;
                    idx += 1;
                    keep
                });
            }
            None => self.entries.push((key, value)),
        }
    }

    fn delete(&mut self, key: &str) {
        let key = key.to_ascii_lowercase();
        self.entries.retain(|(k, _)| *k != key);
    }

    fn increment(&mut self, key: &str, amount: i64) {
        let current: i64 = self
            .get(key)
            .and_then(|v| v.first().and_then(|s| s.parse().ok()))
            .unwrap_or(0);
        self.set(key.to_string(), current.saturating_add(amount).to_string());
    }

    fn decrement(&mut self, key: &str, amount: i64) {
        self.increment(key, amount.saturating_neg());
    }
}

/// TX collection for values rules share within one transaction.
pub type TxCollection = KeyValueCollection;
