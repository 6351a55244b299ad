// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory vault for tests.
//!
//! Keeps everything in hash maps behind a `RwLock` and can be told to fail
//! audit appends, which the disk vault has no reliable way to simulate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use super::{AuditEntry, EncryptedRecord, RecordMetadata, StorageError, StorageResult, VaultStore};
use crate::geo::Zone;

#[derive(Default)]
struct Inner {
    zones: HashMap<String, Zone>,
    records: HashMap<String, EncryptedRecord>,
    audit: Vec<AuditEntry>,
}

#[derive(Default)]
pub struct InMemoryVault {
    inner: RwLock<Inner>,
    fail_audit: AtomicBool,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_zone(&self, zone: Zone) {
        self.inner.write().await.zones.insert(zone.id.clone(), zone);
    }

    pub async fn remove_zone(&self, zone_id: &str) {
        self.inner.write().await.zones.remove(zone_id);
    }

    /// Replace a stored record, bypassing the write-once rule.
    pub async fn overwrite_record(&self, record: EncryptedRecord) {
        self.inner
            .write()
            .await
            .records
            .insert(record.id.clone(), record);
    }

    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        self.inner.read().await.audit.clone()
    }

    /// Make subsequent `append_audit` calls fail.
    pub fn set_audit_failure(&self, fail: bool) {
        self.fail_audit.store(fail, Ordering::SeqCst);
    }
}

impl VaultStore for InMemoryVault {
    async fn get_record(&self, file_id: &str) -> StorageResult<Option<EncryptedRecord>> {
        Ok(self.inner.read().await.records.get(file_id).cloned())
    }

    async fn get_zone(&self, zone_id: &str) -> StorageResult<Option<Zone>> {
        Ok(self.inner.read().await.zones.get(zone_id).cloned())
    }

    async fn put_record(&self, record: EncryptedRecord) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        if inner.records.contains_key(&record.id) {
            return Err(StorageError::AlreadyExists(format!("File {}", record.id)));
        }
        inner.records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn append_audit(&self, entry: AuditEntry) -> StorageResult<()> {
        if self.fail_audit.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("audit store offline".to_string()));
        }
        self.inner.write().await.audit.push(entry);
        Ok(())
    }

    async fn list_zones(&self) -> StorageResult<Vec<Zone>> {
        Ok(self.inner.read().await.zones.values().cloned().collect())
    }

    async fn list_records(&self) -> StorageResult<Vec<RecordMetadata>> {
        Ok(self
            .inner
            .read()
            .await
            .records
            .values()
            .map(EncryptedRecord::metadata)
            .collect())
    }
}
