//! Extraction records and their stored forms.

use crate::schema::{Domain, NOT_FOUND, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A key/value mapping conforming to a domain schema.
///
/// Keys keep insertion order, which for records produced by the pipeline is
/// schema order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionRecord(Map<String, Value>);

impl ExtractionRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// True when exactly the schema's top-level keys are present.
    pub fn is_complete_for(&self, schema: &Schema) -> bool {
        self.0.len() == schema.fields().len()
            && schema.fields().iter().all(|f| self.0.contains_key(f.name))
    }

    /// True when every leaf value is the sentinel.
    pub fn is_all_sentinel(&self) -> bool {
        self.0.values().all(is_sentinel_leaf)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ExtractionRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn is_sentinel_leaf(value: &Value) -> bool {
    match value {
        Value::String(s) => s == NOT_FOUND,
        Value::Object(map) => map.values().all(is_sentinel_leaf),
        _ => false,
    }
}

/// A record plus the metadata the store keeps beside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub entity_name: String,
    pub domain: Domain,
    pub record: ExtractionRecord,
    pub last_updated: DateTime<Utc>,
}

/// One flattened row for tabular export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRow {
    pub entity_name: String,
    pub domain: Domain,
    /// The record serialized as a JSON string.
    pub value: String,
    pub last_updated: DateTime<Utc>,
}

impl From<&StoredEntry> for StoreRow {
    fn from(entry: &StoredEntry) -> Self {
        Self {
            entity_name: entry.entity_name.clone(),
            domain: entry.domain,
            value: serde_json::to_string(&entry.record).unwrap_or_default(),
            last_updated: entry.last_updated,
        }
    }
}
