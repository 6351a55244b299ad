// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The storage collaborator used by the access-control core, and its disk
//! implementation.

use std::future::Future;
use std::sync::{Arc, Mutex};

use super::{
    AuditEntry, AuditQuery, AuditRepository, DiskStorage, EncryptedRecord, FileRepository,
    RecordMetadata, StorageError, StorageResult, StoragePaths, ZoneRepository,
};
use crate::geo::Zone;

/// Storage operations the access-control core depends on.
///
/// Implementations must make each single-record write atomic. No
/// cross-record transactions are required.
pub trait VaultStore: Send + Sync {
    /// Look up an encrypted record.
    fn get_record(
        &self,
        file_id: &str,
    ) -> impl Future<Output = StorageResult<Option<EncryptedRecord>>> + Send;

    /// Look up a zone.
    fn get_zone(&self, zone_id: &str) -> impl Future<Output = StorageResult<Option<Zone>>> + Send;

    /// Persist a newly encrypted record.
    fn put_record(&self, record: EncryptedRecord) -> impl Future<Output = StorageResult<()>> + Send;

    /// Append an audit entry. Must not return `Ok` unless the entry is durable.
    fn append_audit(&self, entry: AuditEntry) -> impl Future<Output = StorageResult<()>> + Send;

    /// All zones.
    fn list_zones(&self) -> impl Future<Output = StorageResult<Vec<Zone>>> + Send;

    /// Metadata of all records.
    fn list_records(&self) -> impl Future<Output = StorageResult<Vec<RecordMetadata>>> + Send;
}

/// Disk-backed vault.
///
/// Filesystem work runs on the blocking pool. A spawned blocking task runs
/// to completion even if the awaiting future is dropped, so an audit append
/// that has started is always finished.
#[derive(Debug, Clone)]
pub struct DiskVault {
    storage: Arc<DiskStorage>,
    audit_lock: Arc<Mutex<()>>,
}

impl DiskVault {
    /// Open (and create if needed) the storage layout under `paths`.
    pub fn open(paths: StoragePaths) -> StorageResult<Self> {
        let mut storage = DiskStorage::new(paths);
        storage.initialize()?;
        Ok(Self {
            storage: Arc::new(storage),
            audit_lock: Arc::new(Mutex::new(())),
        })
    }

    async fn blocking<T, F>(&self, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&DiskStorage) -> StorageResult<T> + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || op(&storage))
            .await
            .map_err(|e| StorageError::Unavailable(format!("storage task failed: {e}")))?
    }

    // ========== Management Operations ==========

    /// Write-read-delete probe.
    pub async fn health_check(&self) -> StorageResult<()> {
        self.blocking(|storage| storage.health_check()).await
    }

    /// Store a new zone.
    pub async fn create_zone(&self, zone: Zone) -> StorageResult<()> {
        self.blocking(move |storage| ZoneRepository::new(storage).create(&zone))
            .await
    }

    /// Delete a zone and every record bound to it. Returns the number of
    /// records removed.
    pub async fn delete_zone(&self, zone_id: &str) -> StorageResult<usize> {
        let zone_id = zone_id.to_string();
        self.blocking(move |storage| {
            let zones = ZoneRepository::new(storage);
            if !zones.exists(&zone_id) {
                return Err(StorageError::NotFound(format!("Zone {zone_id}")));
            }
            // Records first: a crash in between leaves no record pointing
            // at a missing zone.
            let removed = FileRepository::new(storage).delete_by_zone(&zone_id)?;
            zones.delete(&zone_id)?;
            Ok(removed)
        })
        .await
    }

    /// Delete a single record.
    pub async fn delete_record(&self, file_id: &str) -> StorageResult<()> {
        let file_id = file_id.to_string();
        self.blocking(move |storage| FileRepository::new(storage).delete(&file_id))
            .await
    }

    /// Read audit entries back.
    pub async fn read_audit(&self, query: AuditQuery) -> StorageResult<Vec<AuditEntry>> {
        self.blocking(move |storage| AuditRepository::new(storage).query(&query))
            .await
    }
}

impl VaultStore for DiskVault {
    async fn get_record(&self, file_id: &str) -> StorageResult<Option<EncryptedRecord>> {
        let file_id = file_id.to_string();
        self.blocking(move |storage| FileRepository::new(storage).find(&file_id))
            .await
    }

    async fn get_zone(&self, zone_id: &str) -> StorageResult<Option<Zone>> {
        let zone_id = zone_id.to_string();
        self.blocking(move |storage| ZoneRepository::new(storage).find(&zone_id))
            .await
    }

    async fn put_record(&self, record: EncryptedRecord) -> StorageResult<()> {
        self.blocking(move |storage| FileRepository::new(storage).create(&record))
            .await
    }

    async fn append_audit(&self, entry: AuditEntry) -> StorageResult<()> {
        let lock = Arc::clone(&self.audit_lock);
        self.blocking(move |storage| {
            let _guard = lock
                .lock()
                .map_err(|_| StorageError::Unavailable("audit lock poisoned".to_string()))?;
            AuditRepository::new(storage).log(&entry)
        })
        .await
    }

    async fn list_zones(&self) -> StorageResult<Vec<Zone>> {
        self.blocking(|storage| ZoneRepository::new(storage).list_all())
            .await
    }

    async fn list_records(&self) -> StorageResult<Vec<RecordMetadata>> {
        self.blocking(|storage| FileRepository::new(storage).list_metadata())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::storage::RECORD_FORMAT_V1;
    use chrono::Utc;
    use tempfile::TempDir;

    fn open_vault() -> (TempDir, DiskVault) {
        let temp = TempDir::new().unwrap();
        let vault = DiskVault::open(StoragePaths::new(temp.path())).unwrap();
        (temp, vault)
    }

    fn zone() -> Zone {
        Zone::new("HQ", None, Coordinate::new(1.0, 2.0).unwrap(), 100.0, "admin").unwrap()
    }

    fn record(id: &str, zone_id: &str) -> EncryptedRecord {
        EncryptedRecord {
            id: id.to_string(),
            zone_id: zone_id.to_string(),
            format_version: RECORD_FORMAT_V1,
            ciphertext: EncryptedRecord::encode_ciphertext(&[9; 40]),
            mime_type: "application/pdf".to_string(),
            original_name: "plan.pdf".to_string(),
            size: 12,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn records_and_zones_round_trip() {
        let (_temp, vault) = open_vault();
        let zone = zone();
        vault.create_zone(zone.clone()).await.unwrap();
        let stored = record("f-1", &zone.id);
        vault.put_record(stored.clone()).await.unwrap();

        assert_eq!(vault.get_zone(&zone.id).await.unwrap(), Some(zone));
        assert_eq!(vault.get_record("f-1").await.unwrap(), Some(stored));
        assert!(vault.get_record("nope").await.unwrap().is_none());
        assert!(vault.get_zone("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_zone_cascades_to_records() {
        let (_temp, vault) = open_vault();
        let kept = zone();
        let doomed = zone();
        vault.create_zone(kept.clone()).await.unwrap();
        vault.create_zone(doomed.clone()).await.unwrap();
        vault.put_record(record("f-1", &doomed.id)).await.unwrap();
        vault.put_record(record("f-2", &doomed.id)).await.unwrap();
        vault.put_record(record("f-3", &kept.id)).await.unwrap();

        assert_eq!(vault.delete_zone(&doomed.id).await.unwrap(), 2);
        assert!(vault.get_zone(&doomed.id).await.unwrap().is_none());
        assert!(vault.get_record("f-1").await.unwrap().is_none());
        assert!(vault.get_record("f-3").await.unwrap().is_some());
        assert!(matches!(
            vault.delete_zone(&doomed.id).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_audit_appends_are_all_kept() {
        let (_temp, vault) = open_vault();
        let point = Coordinate::new(0.0, 0.0).unwrap();

        let mut handles = Vec::new();
        for i in 0..32 {
            let vault = vault.clone();
            handles.push(tokio::spawn(async move {
                let entry = AuditEntry::new(format!("user-{i}"), "f-1", point, i % 2 == 0);
                vault.append_audit(entry).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let entries = vault.read_audit(AuditQuery::default()).await.unwrap();
        assert_eq!(entries.len(), 32);
        assert_eq!(entries.iter().filter(|e| e.granted).count(), 16);
    }

    #[tokio::test]
    async fn list_records_returns_metadata() {
        let (_temp, vault) = open_vault();
        vault.put_record(record("f-1", "z")).await.unwrap();
        let listed = vault.list_records().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].original_name, "plan.pdf");
    }

    #[tokio::test]
    async fn health_check_passes() {
        let (_temp, vault) = open_vault();
        vault.health_check().await.unwrap();
    }
}
