//! The nested `entity → domain → slot` map shared by every backend.
//!
//! Serializes to the persisted layout directly:
//!
//! ```json
//! {
//!     "INSAT-3D": {
//!         "basic_info": {
//!             "data": { "altitude": "35786 km" },
//!             "last_updated": "2026-01-01T00:00:00Z"
//!         }
//!     }
//! }
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use satscout_core::record::{ExtractionRecord, StoredEntry};
use satscout_core::schema::Domain;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Slot {
    data: ExtractionRecord,
    #[serde(deserialize_with = "deserialize_timestamp")]
    last_updated: DateTime<Utc>,
}

/// RFC 3339, or a naive ISO-8601 timestamp read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{raw}': {e}")))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(BTreeMap<String, BTreeMap<Domain, Slot>>);

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot for (entity, domain), leaving other domains alone.
    pub fn put(&mut self, entity: &str, domain: Domain, record: ExtractionRecord) -> StoredEntry {
        let slot = Slot {
            data: record,
            last_updated: Utc::now(),
        };
        let entry = to_entry(entity, domain, &slot);
        self.0.entry(entity.to_string()).or_default().insert(domain, slot);
        entry
    }

    pub fn get(&self, entity: &str, domain: Domain) -> Option<StoredEntry> {
        self.0
            .get(entity)
            .and_then(|domains| domains.get(&domain))
            .map(|slot| to_entry(entity, domain, slot))
    }

    pub fn get_all(&self, entity: &str) -> Option<BTreeMap<Domain, StoredEntry>> {
        self.0.get(entity).map(|domains| {
            domains
                .iter()
                .map(|(domain, slot)| (*domain, to_entry(entity, *domain, slot)))
                .collect()
        })
    }

    pub fn entities(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn remove(&mut self, entity: &str) -> bool {
        self.0.remove(entity).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn to_entry(entity: &str, domain: Domain, slot: &Slot) -> StoredEntry {
    StoredEntry {
        entity_name: entity.to_string(),
        domain,
        record: slot.data.clone(),
        last_updated: slot.last_updated,
    }
}
