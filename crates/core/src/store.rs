//! ResultStore trait — persistence of extraction records.
//!
//! The store is keyed by entity name, then by domain. Writing a record for an
//! existing (entity, domain) pair replaces it; records for other domains of the
//! same entity are untouched.

use crate::error::StoreError;
use crate::record::{ExtractionRecord, StoreRow, StoredEntry};
use crate::schema::Domain;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The core ResultStore trait.
///
/// Implementations: JSON file (default), in-memory (for testing).
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// The backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Insert or replace the record for (entity, domain), stamping it with the
    /// current UTC time.
    async fn put(
        &self,
        entity: &str,
        domain: Domain,
        record: ExtractionRecord,
    ) -> std::result::Result<StoredEntry, StoreError>;

    /// Fetch one record.
    async fn get(
        &self,
        entity: &str,
        domain: Domain,
    ) -> std::result::Result<Option<StoredEntry>, StoreError>;

    /// Fetch every domain stored for an entity.
    async fn get_all(
        &self,
        entity: &str,
    ) -> std::result::Result<Option<BTreeMap<Domain, StoredEntry>>, StoreError>;

    /// Entity names, sorted.
    async fn list_entities(&self) -> std::result::Result<Vec<String>, StoreError>;

    /// Remove an entity and all its domains. Returns whether anything was removed.
    async fn delete(&self, entity: &str) -> std::result::Result<bool, StoreError>;

    /// Flattened rows, optionally restricted to one domain.
    async fn rows(&self, domain: Option<Domain>) -> std::result::Result<Vec<StoreRow>, StoreError> {
        let mut rows = Vec::new();
        for entity in self.list_entities().await? {
            if let Some(entries) = self.get_all(&entity).await? {
                rows.extend(
                    entries
                        .values()
                        .filter(|e| domain.is_none_or(|d| e.domain == d))
                        .map(StoreRow::from),
                );
            }
        }
        Ok(rows)
    }

    /// The whole store as nested JSON: `entity → domain → {data, last_updated}`.
    async fn snapshot(&self) -> std::result::Result<Value, StoreError> {
        let mut root = Map::new();
        for entity in self.list_entities().await? {
            let Some(entries) = self.get_all(&entity).await? else {
                continue;
            };
            let mut domains = Map::new();
            for (domain, entry) in entries {
                let mut slot = Map::new();
                slot.insert("data".into(), Value::Object(entry.record.into_map()));
                slot.insert(
                    "last_updated".into(),
                    Value::String(entry.last_updated.to_rfc3339()),
                );
                domains.insert(domain.as_str().to_string(), Value::Object(slot));
            }
            root.insert(entity, Value::Object(domains));
        }
        Ok(Value::Object(root))
    }
}
