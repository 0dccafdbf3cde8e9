//! File-based store — one pretty-printed JSON document.
//!
//! The catalog is loaded into memory on open and rewritten on every mutation
//! (put, delete). Each rewrite goes to a sibling temp file which is then
//! renamed over the original, so a crash mid-write leaves the previous
//! contents intact.
//!
//! Default location: `~/.satscout/satellite_data.json`

use crate::catalog::Catalog;
use async_trait::async_trait;
use satscout_core::error::StoreError;
use satscout_core::record::{ExtractionRecord, StoredEntry};
use satscout_core::schema::Domain;
use satscout_core::store::ResultStore;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// A file-backed result store.
pub struct FileStore {
    path: PathBuf,
    catalog: Arc<RwLock<Catalog>>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// A missing file starts an empty store; the file is created on first
    /// write. A file that exists but cannot be parsed is an error, so a bad
    /// edit never gets silently overwritten.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let catalog = Self::load_from_disk(&path).await?;
        debug!(path = %path.display(), entities = catalog.len(), "File store loaded");
        Ok(Self {
            path,
            catalog: Arc::new(RwLock::new(catalog)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_from_disk(path: &Path) -> Result<Catalog, StoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No store file yet, starting empty");
                return Ok(Catalog::new());
            }
            Err(e) => return Err(StoreError::Io(format!("Failed to read {}: {e}", path.display()))),
        };

        if content.trim().is_empty() {
            return Ok(Catalog::new());
        }

        serde_json::from_str(&content).map_err(|e| StoreError::Corrupted {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Write the catalog to disk. Callers hold the write lock, which keeps
    /// flushes from interleaving.
    async fn flush(&self, catalog: &Catalog) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(format!("Failed to create store directory: {e}")))?;
        }

        let content = to_pretty_json(catalog)?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".into());
        let tmp = self.path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| StoreError::Io(format!("Failed to write {}: {e}", tmp.display())))?;

        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::Io(format!(
                "Failed to replace {}: {e}",
                self.path.display()
            )));
        }

        Ok(())
    }
}

/// Four-space indented JSON.
fn to_pretty_json(catalog: &Catalog) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    catalog
        .serialize(&mut ser)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

#[async_trait]
impl ResultStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn put(
        &self,
        entity: &str,
        domain: Domain,
        record: ExtractionRecord,
    ) -> Result<StoredEntry, StoreError> {
        let mut catalog = self.catalog.write().await;
        let mut next = catalog.clone();
        let entry = next.put(entity, domain, record);
        self.flush(&next).await?;
        *catalog = next;
        debug!(entity, domain = %domain, "Record stored");
        Ok(entry)
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
        let mut catalog = self.catalog.write().await;
        let mut next = catalog.clone();
        if !next.remove(entity) {
            return Ok(false);
        }
        self.flush(&next).await?;
        *catalog = next;
        debug!(entity, "Entity deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satscout_core::schema::define_schema;
    use serde_json::json;

    fn basic_record(altitude: &str) -> ExtractionRecord {
        let mut record = define_schema(Domain::BasicInfo).sentinel_record();
        record.insert("altitude", json!(altitude));
        record
    }

    #[tokio::test]
    async fn put_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("satellite_data.json");

        let store = FileStore::open(&path).await.unwrap();
        store.put("INSAT-3D", Domain::BasicInfo, basic_record("820")).await.unwrap();

        let reopened = FileStore::open(&path).await.unwrap();
        let entry = reopened.get("INSAT-3D", Domain::BasicInfo).await.unwrap().unwrap();
        assert_eq!(entry.record.get("altitude"), Some(&json!("820")));
    }

    #[tokio::test]
    async fn file_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("satellite_data.json");

        let store = FileStore::open(&path).await.unwrap();
        store.put("INSAT-3D", Domain::BasicInfo, basic_record("820")).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("{\n    \"INSAT-3D\": {\n        \"basic_info\""));
    }

    #[tokio::test]
    async fn delete_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("satellite_data.json");

        let store = FileStore::open(&path).await.unwrap();
        store.put("INSAT-3D", Domain::BasicInfo, basic_record("820")).await.unwrap();
        store.put("INSAT-3D", Domain::TechnicalSpecs, define_schema(Domain::TechnicalSpecs).sentinel_record()).await.unwrap();
        assert!(store.delete("INSAT-3D").await.unwrap());

        let reopened = FileStore::open(&path).await.unwrap();
        assert!(reopened.get_all("INSAT-3D").await.unwrap().is_none());
        assert!(reopened.list_entities().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested/dir/data.json")).await.unwrap();
        assert!(store.list_entities().await.unwrap().is_empty());

        store.put("GSAT-30", Domain::BasicInfo, basic_record("35786 km")).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn corrupted_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("satellite_data.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = FileStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Corrupted { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn opens_file_with_naive_timestamps_and_legacy_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("satellite_data.json");
        std::fs::write(
            &path,
            r#"{
    "GSAT-11": {
        "launch_cost_info": {
            "data": {"launch_vehicle": "Ariane 5"},
            "last_updated": "2025-03-01T10:00:00.123456"
        }
    }
}"#,
        )
        .unwrap();

        let store = FileStore::open(&path).await.unwrap();
        let entry = store.get("GSAT-11", Domain::LaunchCost).await.unwrap().unwrap();
        assert_eq!(entry.record.get("launch_vehicle"), Some(&json!("Ariane 5")));
        assert_eq!(entry.last_updated.to_rfc3339(), "2025-03-01T10:00:00.123456+00:00");

        // The next write rewrites the file with current keys and RFC 3339.
        store.put("GSAT-11", Domain::BasicInfo, basic_record("35786 km")).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"launch_cost\""));
        assert!(!content.contains("launch_cost_info"));
        assert!(content.contains("2025-03-01T10:00:00.123456Z"));
    }

    #[tokio::test]
    async fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("satellite_data.json");
        let store = FileStore::open(&path).await.unwrap();
        store.put("INSAT-3D", Domain::BasicInfo, basic_record("820")).await.unwrap();
        store.put("INSAT-3D", Domain::BasicInfo, basic_record("830")).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["satellite_data.json"]);
    }

    #[tokio::test]
    async fn concurrent_puts_for_different_domains_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("satellite_data.json");
        let store = Arc::new(FileStore::open(&path).await.unwrap());

        let handles: Vec<_> = Domain::ALL
            .into_iter()
            .map(|domain| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .put("INSAT-3D", domain, define_schema(domain).sentinel_record())
                        .await
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get_all("INSAT-3D").await.unwrap().unwrap().len(), 3);
    }
}
