//! Ordered field/value mappings.
//!
//! A [`Record`] is both the data written by `INSERT`/`UPDATE` and the
//! equality condition of `UPDATE`/`DELETE`/`SELECT`. Field order is
//! insertion order and is preserved into the generated SQL.
//!
//! Field names are copied into SQL text as raw identifiers. They are never
//! quoted or validated, so callers must only use names they control.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;

use crate::error::{Result, StatementError};
use crate::value::Value;

/// Ordered mapping from field name to [`Value`].
///
/// # Examples
///
/// ```
/// use recordsql_core::{Record, Value};
///
/// let record = Record::new().with("Name", "O'Brien").with("Age", 30);
/// let keys: Vec<&str> = record.keys().collect();
/// assert_eq!(keys, ["Name", "Age"]);
/// assert_eq!(record.get("Age"), Some(&Value::Int(30)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, returning the record for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field. An existing field keeps its position and gets the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a copy with every NaN replaced by `Null`.
    pub fn normalized(&self) -> Self {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.clone().normalized()))
            .collect()
    }

    /// Merges `other` into a copy of `self`.
    ///
    /// Fields of `self` come first. A field present in both keeps the value
    /// from `self`; fields only in `other` are appended in their order.
    pub fn merged_with(&self, other: &Record) -> Self {
        let mut merged = self.clone();
        for (name, value) in other.iter() {
            if let Entry::Vacant(slot) = merged.fields.entry(name.to_string()) {
                slot.insert(value.clone());
            }
        }
        merged
    }

    /// Builds a record from a JSON object, keeping the document's key order.
    ///
    /// # Errors
    ///
    /// Returns [`StatementError::UnsupportedValue`] if `json` is not an
    /// object or any field holds an array or object.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(StatementError::UnsupportedValue(format!(
                "expected a JSON object, got {json}"
            )));
        };
        let mut record = Self::new();
        for (name, value) in map {
            record.insert(name, Value::try_from(value)?);
        }
        Ok(record)
    }

    /// Parses `name=value` assignments, inferring each value's type.
    ///
    /// # Errors
    ///
    /// Returns [`StatementError::UnsupportedValue`] for an assignment
    /// without `=` or with an empty name.
    ///
    /// # Examples
    ///
    /// ```
    /// use recordsql_core::{Record, Value};
    ///
    /// let record = Record::from_assignments(["Id=5", "Name=Ann"]).unwrap();
    /// assert_eq!(record.get("Id"), Some(&Value::Int(5)));
    /// ```
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut record = Self::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let Some((name, raw)) = assignment.split_once('=') else {
                return Err(StatementError::UnsupportedValue(format!(
                    "'{assignment}' is not of the form name=value"
                )));
            };
            let name = name.trim();
            if name.is_empty() {
                return Err(StatementError::UnsupportedValue(format!(
                    "'{assignment}' has an empty field name"
                )));
            }
            record.insert(name, Value::infer(raw));
        }
        Ok(record)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
