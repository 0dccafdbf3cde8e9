//! In-memory store — useful for testing and ephemeral runs.

use crate::catalog::Catalog;
use async_trait::async_trait;
use satscout_core::error::StoreError;
use satscout_core::record::{ExtractionRecord, StoredEntry};
use satscout_core::schema::Domain;
use satscout_core::store::ResultStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A store that keeps its catalog in memory only.
pub struct InMemoryStore {
    catalog: Arc<RwLock<Catalog>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(RwLock::new(Catalog::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn put(
        &self,
        entity: &str,
        domain: Domain,
        record: ExtractionRecord,
    ) -> Result<StoredEntry, StoreError> {
        Ok(self.catalog.write().await.put(entity, domain, record))
    }

    async fn get(&self, entity: &str, domain: Domain) -> Result<Option<StoredEntry>, StoreError> {
        Ok(self.catalog.read().await.get(entity, domain))
    }

    async fn get_all(
        &self,
        entity: &str,
    ) -> Result<Option<BTreeMap<Domain, StoredEntry>>, StoreError> {
        Ok(self.catalog.read().await.get_all(entity))
    }

    async fn list_entities(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.catalog.read().await.entities())
    }

    async fn delete(&self, entity: &str) -> Result<bool, StoreError> {
        Ok(self.catalog.write().await.remove(entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use satscout_core::schema::define_schema;
    use serde_json::json;

    #[tokio::test]
    async fn put_then_get_stamps_time() {
        let store = InMemoryStore::new();
        let before = Utc::now();
        let mut record = define_schema(Domain::BasicInfo).sentinel_record();
        record.insert("altitude", json!("820"));

        store.put("INSAT-3D", Domain::BasicInfo, record.clone()).await.unwrap();
        let entry = store.get("INSAT-3D", Domain::BasicInfo).await.unwrap().unwrap();
        assert_eq!(entry.record, record);
        assert!(entry.last_updated >= before);
    }

    #[tokio::test]
    async fn delete_removes_all_domains() {
        let store = InMemoryStore::new();
        for domain in Domain::ALL {
            store
                .put("INSAT-3D", domain, define_schema(domain).sentinel_record())
                .await
                .unwrap();
        }
        assert!(store.delete("INSAT-3D").await.unwrap());
        for domain in Domain::ALL {
            assert!(store.get("INSAT-3D", domain).await.unwrap().is_none());
        }
        assert!(store.get_all("INSAT-3D").await.unwrap().is_none());
        assert!(!store.delete("INSAT-3D").await.unwrap());
    }

    #[tokio::test]
    async fn list_entities_is_sorted() {
        let store = InMemoryStore::new();
        let record = define_schema(Domain::BasicInfo).sentinel_record();
        store.put("RISAT-2B", Domain::BasicInfo, record.clone()).await.unwrap();
        store.put("Cartosat-3", Domain::BasicInfo, record).await.unwrap();
        assert_eq!(store.list_entities().await.unwrap(), vec!["Cartosat-3", "RISAT-2B"]);
    }

    #[tokio::test]
    async fn rows_filter_by_domain() {
        let store = InMemoryStore::new();
        store
            .put("INSAT-3D", Domain::BasicInfo, define_schema(Domain::BasicInfo).sentinel_record())
            .await
            .unwrap();
        store
            .put("INSAT-3D", Domain::LaunchCost, define_schema(Domain::LaunchCost).sentinel_record())
            .await
            .unwrap();

        assert_eq!(store.rows(None).await.unwrap().len(), 2);
        let rows = store.rows(Some(Domain::LaunchCost)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].domain, Domain::LaunchCost);
        assert!(rows[0].value.contains("mission_cost"));
    }

    #[tokio::test]
    async fn snapshot_has_nested_layout() {
        let store = InMemoryStore::new();
        let mut record = ExtractionRecord::new();
        record.insert("launch_vehicle", json!("GSLV-F14"));
        store.put("INSAT-3DS", Domain::LaunchCost, record).await.unwrap();

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot["INSAT-3DS"]["launch_cost"]["data"]["launch_vehicle"], "GSLV-F14");
    }
}
