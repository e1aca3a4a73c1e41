//! Ordered field maps and external→storage name mappings.

use crate::error::{JoblyError, JoblyResult};
use crate::value::Value;

/// A sparse, ordered set of `(external field name, value)` pairs.
///
/// Iteration order is insertion order and decides placeholder numbering in the builders:
/// the N-th field binds to `$N`. Inserting a key that is already present replaces its value
/// in place.
///
/// # Example
/// ```ignore
/// let fields = FieldMap::new().with("firstName", "Aliya").with("age", 32);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, Value)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Insert or replace a field (consuming version).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build a field map from a decoded JSON body or query object.
    ///
    /// Anything other than a JSON object fails with [`JoblyError::InvalidInput`]; so does a
    /// member whose value is an array or object. Member order is preserved.
    pub fn from_json(json: &serde_json::Value) -> JoblyResult<Self> {
        let Some(object) = json.as_object() else {
            return Err(JoblyError::invalid_input("not an object"));
        };

        let mut fields = Self::new();
        for (key, value) in object {
            fields.insert(key.as_str(), Value::from_json(key, value)?);
        }
        Ok(fields)
    }
}

impl TryFrom<serde_json::Value> for FieldMap {
    type Error = JoblyError;

    fn try_from(json: serde_json::Value) -> JoblyResult<Self> {
        Self::from_json(&json)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

/// A fixed translation table from external field names to storage column names.
///
/// Fields without an entry map to themselves.
#[derive(Debug, Clone, Copy)]
pub struct NameMapping {
    pairs: &'static [(&'static str, &'static str)],
}

impl NameMapping {
    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self { pairs }
    }

    /// The mapping that renames nothing.
    pub const fn identity() -> Self {
        Self { pairs: &[] }
    }

    /// Storage column for `field`.
    pub fn column<'a>(&self, field: &'a str) -> &'a str {
        self.pairs
            .iter()
            .find(|(external, _)| *external == field)
            .map_or(field, |(_, column)| *column)
    }
}

impl Default for NameMapping {
    fn default() -> Self {
        Self::identity()
    }
}
