// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Listing the files whose zone contains a position.

use std::collections::HashMap;

use crate::geo::{self, Coordinate, Zone};
use crate::storage::{RecordMetadata, StorageResult, VaultStore};

/// A record whose zone contains the queried position.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessibleFile {
    pub record: RecordMetadata,
    pub zone: Zone,
}

/// Every record whose zone contains `point`, newest first.
///
/// Read-only: nothing is decrypted and nothing is audited. Records whose
/// zone is gone are skipped.
pub async fn accessible_files<S: VaultStore>(
    store: &S,
    point: &Coordinate,
) -> StorageResult<Vec<AccessibleFile>> {
    let zones: HashMap<String, Zone> = store
        .list_zones()
        .await?
        .into_iter()
        .filter(|zone| geo::contains(zone, point))
        .map(|zone| (zone.id.clone(), zone))
        .collect();

    if zones.is_empty() {
        return Ok(Vec::new());
    }

    let mut files: Vec<AccessibleFile> = store
        .list_records()
        .await?
        .into_iter()
        .filter_map(|record| {
            let zone = zones.get(&record.zone_id)?.clone();
            Some(AccessibleFile { record, zone })
        })
        .collect();
    files.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryVault;
    use crate::storage::{EncryptedRecord, RECORD_FORMAT_V1};
    use chrono::{Duration, Utc};

    fn record(id: &str, zone_id: &str, age_secs: i64) -> EncryptedRecord {
        EncryptedRecord {
            id: id.to_string(),
            zone_id: zone_id.to_string(),
            format_version: RECORD_FORMAT_V1,
            ciphertext: EncryptedRecord::encode_ciphertext(&[0; 30]),
            mime_type: "text/plain".to_string(),
            original_name: format!("{id}.txt"),
            size: 2,
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn lists_only_files_in_containing_zones() {
        let store = InMemoryVault::new();
        let here = Zone::new("Here", None, Coordinate::new(48.8584, 2.2945).unwrap(), 200.0, "a")
            .unwrap();
        let there = Zone::new("There", None, Coordinate::new(40.6892, -74.0445).unwrap(), 200.0, "a")
            .unwrap();
        store.insert_zone(here.clone()).await;
        store.insert_zone(there.clone()).await;

        store.put_record(record("old", &here.id, 60)).await.unwrap();
        store.put_record(record("new", &here.id, 0)).await.unwrap();
        store.put_record(record("far", &there.id, 0)).await.unwrap();
        store.put_record(record("orphan", "gone", 0)).await.unwrap();

        let point = Coordinate::new(48.8585, 2.2946).unwrap();
        let files = accessible_files(&store, &point).await.unwrap();

        let ids: Vec<_> = files.iter().map(|f| f.record.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert!(files.iter().all(|f| f.zone.id == here.id));
        assert!(store.audit_entries().await.is_empty());
    }

    #[tokio::test]
    async fn nothing_nearby_is_empty() {
        let store = InMemoryVault::new();
        let point = Coordinate::new(0.0, 0.0).unwrap();
        assert!(accessible_files(&store, &point).await.unwrap().is_empty());
    }
}
