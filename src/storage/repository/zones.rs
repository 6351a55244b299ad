// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Zone repository.
//!
//! Each zone is stored as a separate JSON file under `/data/zones/`.
//! Zones are immutable once written; the only mutation is deletion.

use super::super::{is_valid_id, DiskStorage, StorageError, StorageResult};
use crate::geo::Zone;

/// Repository for zone operations on disk storage.
pub struct ZoneRepository<'a> {
    storage: &'a DiskStorage,
}

impl<'a> ZoneRepository<'a> {
    /// Create a new ZoneRepository.
    pub fn new(storage: &'a DiskStorage) -> Self {
        Self { storage }
    }

    /// Check if a zone exists.
    pub fn exists(&self, zone_id: &str) -> bool {
        is_valid_id(zone_id) && self.storage.exists(self.storage.paths().zone(zone_id))
    }

    /// Get a zone by ID, `None` if absent or not a valid id.
    pub fn find(&self, zone_id: &str) -> StorageResult<Option<Zone>> {
        if !is_valid_id(zone_id) {
            return Ok(None);
        }
        self.storage.read_json_opt(self.storage.paths().zone(zone_id))
    }

    /// Create a new zone.
    pub fn create(&self, zone: &Zone) -> StorageResult<()> {
        if !is_valid_id(&zone.id) {
            return Err(StorageError::InvalidId(zone.id.clone()));
        }
        if self.exists(&zone.id) {
            return Err(StorageError::AlreadyExists(format!("Zone {}", zone.id)));
        }

        self.storage
            .write_json(self.storage.paths().zone(&zone.id), zone)
    }

    /// Delete a zone. Records referencing it must be removed by the caller.
    pub fn delete(&self, zone_id: &str) -> StorageResult<()> {
        if !self.exists(zone_id) {
            return Err(StorageError::NotFound(format!("Zone {zone_id}")));
        }

        self.storage.delete(self.storage.paths().zone(zone_id))
    }

    /// List all zones, newest first.
    pub fn list_all(&self) -> StorageResult<Vec<Zone>> {
        let zone_ids = self
            .storage
            .list_files(self.storage.paths().zones_dir(), "json")?;

        let mut zones = Vec::with_capacity(zone_ids.len());
        for id in zone_ids {
            match self.find(&id) {
                Ok(Some(zone)) => zones.push(zone),
                Ok(None) => {}
                Err(e) => tracing::warn!(zone_id = %id, error = %e, "Skipping unreadable zone"),
            }
        }

        zones.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(zones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn test_storage() -> (TempDir, DiskStorage) {
        let temp = TempDir::new().unwrap();
        let mut storage = DiskStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().expect("Failed to initialize");
        (temp, storage)
    }

    fn test_zone(name: &str) -> Zone {
        Zone::new(
            name,
            Some("test zone".to_string()),
            Coordinate::new(51.505, -0.09).unwrap(),
            50.0,
            "admin-1",
        )
        .unwrap()
    }

    #[test]
    fn create_and_find_zone() {
        let (_temp, storage) = test_storage();
        let repo = ZoneRepository::new(&storage);

        let zone = test_zone("HQ");
        repo.create(&zone).unwrap();

        let loaded = repo.find(&zone.id).unwrap().unwrap();
        assert_eq!(loaded, zone);
        assert!(repo.find("missing").unwrap().is_none());
    }

    #[test]
    fn create_rejects_duplicates() {
        let (_temp, storage) = test_storage();
        let repo = ZoneRepository::new(&storage);

        let zone = test_zone("HQ");
        repo.create(&zone).unwrap();
        assert!(matches!(
            repo.create(&zone),
            Err(StorageError::AlreadyExists(_))
        ));
    }

    #[test]
    fn delete_missing_zone_is_not_found() {
        let (_temp, storage) = test_storage();
        let repo = ZoneRepository::new(&storage);
        assert!(matches!(repo.delete("nope"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn traversal_ids_resolve_to_nothing() {
        let (_temp, storage) = test_storage();
        let repo = ZoneRepository::new(&storage);

        let zone = test_zone("HQ");
        repo.create(&zone).unwrap();
        let sneaky = format!("../zones/{}", zone.id);

        assert!(repo.find(&sneaky).unwrap().is_none());
        assert!(matches!(repo.delete(&sneaky), Err(StorageError::NotFound(_))));
        assert!(repo.exists(&zone.id));
    }

    #[test]
    fn list_all_returns_every_zone() {
        let (_temp, storage) = test_storage();
        let repo = ZoneRepository::new(&storage);

        for name in ["a", "b", "c"] {
            repo.create(&test_zone(name)).unwrap();
        }

        let zones = repo.list_all().unwrap();
        assert_eq!(zones.len(), 3);
        assert!(zones.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
