// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Append-only access audit log.
//!
//! Every geofence decision is written as one JSON line to a daily file
//! under `/data/audit/{date}/access.jsonl`. Entries are never rewritten or
//! removed by the service.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DiskStorage, StorageError, StorageResult};
use crate::geo::Coordinate;

/// Date format used for daily log directories.
pub const AUDIT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Longest date window a single query may cover, in days (inclusive).
pub const MAX_AUDIT_WINDOW_DAYS: i64 = 366;

/// One access evaluation outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AuditEntry {
    /// Unique entry ID.
    pub entry_id: String,
    /// Who asked.
    pub requester_id: String,
    /// Which file was requested.
    pub file_id: String,
    /// Claimed latitude.
    pub claimed_latitude: f64,
    /// Claimed longitude.
    pub claimed_longitude: f64,
    /// Geofence outcome.
    pub granted: bool,
    /// When the decision was made.
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        requester_id: impl Into<String>,
        file_id: impl Into<String>,
        claimed: Coordinate,
        granted: bool,
    ) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            requester_id: requester_id.into(),
            file_id: file_id.into(),
            claimed_latitude: claimed.latitude,
            claimed_longitude: claimed.longitude,
            granted,
            timestamp: Utc::now(),
        }
    }

    /// Daily log key for this entry.
    pub fn date_key(&self) -> String {
        self.timestamp.format(AUDIT_DATE_FORMAT).to_string()
    }
}

/// Filter for reading audit entries back.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// First day, inclusive (`YYYY-MM-DD`).
    pub from: Option<String>,
    /// Last day, inclusive (`YYYY-MM-DD`).
    pub to: Option<String>,
    pub file_id: Option<String>,
    pub requester_id: Option<String>,
}

impl AuditQuery {
    fn matches(&self, entry: &AuditEntry) -> bool {
        self.file_id.as_deref().map_or(true, |id| id == entry.file_id)
            && self
                .requester_id
                .as_deref()
                .map_or(true, |id| id == entry.requester_id)
    }

    /// Resolve the date window, defaulting both ends to today (UTC).
    ///
    /// Windows longer than [`MAX_AUDIT_WINDOW_DAYS`] are rejected.
    pub fn date_range(&self) -> StorageResult<(NaiveDate, NaiveDate)> {
        let today = Utc::now().date_naive();
        let parse = |value: Option<&str>, label: &str| -> StorageResult<NaiveDate> {
            match value {
                Some(s) => NaiveDate::parse_from_str(s, AUDIT_DATE_FORMAT).map_err(|e| {
                    StorageError::SerializationError(format!("Invalid {label} date: {e}"))
                }),
                None => Ok(today),
            }
        };

        let start = parse(self.from.as_deref(), "start")?;
        let end = parse(self.to.as_deref(), "end")?;
        if start > end {
            return Err(StorageError::SerializationError(format!(
                "Start date {start} is after end date {end}"
            )));
        }
        if (end - start).num_days() >= MAX_AUDIT_WINDOW_DAYS {
            return Err(StorageError::SerializationError(format!(
                "Date window {start}..={end} exceeds {MAX_AUDIT_WINDOW_DAYS} days"
            )));
        }
        Ok((start, end))
    }
}

/// Repository for audit entries.
pub struct AuditRepository<'a> {
    storage: &'a DiskStorage,
}

impl<'a> AuditRepository<'a> {
    /// Create a new audit repository.
    pub fn new(storage: &'a DiskStorage) -> Self {
        Self { storage }
    }

    /// Append an entry to its daily log.
    pub fn log(&self, entry: &AuditEntry) -> StorageResult<()> {
        let path = self.storage.paths().audit_access_file(&entry.date_key());

        let line = serde_json::to_vec(entry).map_err(|e| {
            StorageError::SerializationError(format!("Failed to serialize audit entry: {e}"))
        })?;

        self.storage.append_line(&path, &line)
    }

    /// Read entries for a specific date. A missing log means no entries.
    pub fn read_entries(&self, date: &str) -> StorageResult<Vec<AuditEntry>> {
        let path = self.storage.paths().audit_access_file(date);
        let content = match self.storage.read_raw(&path) {
            Ok(content) => content,
            Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new())
            }
            Err(e) => return Err(e),
        };

        let content_str = String::from_utf8(content).map_err(|e| {
            StorageError::SerializationError(format!("Invalid UTF-8 in audit log: {e}"))
        })?;

        let mut entries = Vec::new();
        for line in content_str.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: AuditEntry = serde_json::from_str(line).map_err(|e| {
                StorageError::SerializationError(format!("Failed to deserialize audit entry: {e}"))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Read entries matching `query`, oldest first.
    pub fn query(&self, query: &AuditQuery) -> StorageResult<Vec<AuditEntry>> {
        let (start, end) = query.date_range()?;

        let mut all_entries = Vec::new();
        let mut current = start;
        while current <= end {
            let date = current.format(AUDIT_DATE_FORMAT).to_string();
            all_entries.extend(
                self.read_entries(&date)?
                    .into_iter()
                    .filter(|e| query.matches(e)),
            );
            current = current
                .succ_opt()
                .ok_or_else(|| StorageError::SerializationError("Date overflow".to_string()))?;
        }

        Ok(all_entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DiskStorage) {
        let temp = TempDir::new().unwrap();
        let mut storage = DiskStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (temp, storage)
    }

    fn entry(requester: &str, file: &str, granted: bool) -> AuditEntry {
        AuditEntry::new(
            requester,
            file,
            Coordinate::new(51.505, -0.09).unwrap(),
            granted,
        )
    }

    #[test]
    fn new_entry_copies_claim() {
        let e = entry("user_1", "file_1", false);
        assert_eq!(e.requester_id, "user_1");
        assert_eq!(e.file_id, "file_1");
        assert_eq!(e.claimed_latitude, 51.505);
        assert_eq!(e.claimed_longitude, -0.09);
        assert!(!e.granted);
        assert!(!e.entry_id.is_empty());
    }

    #[test]
    fn log_and_read_entries() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);

        let first = entry("user_1", "f1", true);
        let second = entry("user_2", "f2", false);
        repo.log(&first).unwrap();
        repo.log(&second).unwrap();

        let entries = repo.read_entries(&first.date_key()).unwrap();
        assert_eq!(entries, vec![first, second]);
    }

    #[test]
    fn missing_day_reads_as_empty() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);
        assert!(repo.read_entries("1999-01-01").unwrap().is_empty());
    }

    #[test]
    fn query_filters_by_file_and_requester() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);

        repo.log(&entry("user_1", "target", true)).unwrap();
        repo.log(&entry("user_2", "target", false)).unwrap();
        repo.log(&entry("user_1", "other", false)).unwrap();

        let by_file = repo
            .query(&AuditQuery {
                file_id: Some("target".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_file.len(), 2);

        let by_both = repo
            .query(&AuditQuery {
                file_id: Some("target".to_string()),
                requester_id: Some("user_2".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_both.len(), 1);
        assert!(!by_both[0].granted);
    }

    #[test]
    fn query_spans_a_date_range() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);

        let mut old = entry("user_1", "f1", true);
        old.timestamp = "2026-01-10T12:00:00Z".parse().unwrap();
        let mut newer = entry("user_1", "f1", false);
        newer.timestamp = "2026-01-12T08:30:00Z".parse().unwrap();
        repo.log(&old).unwrap();
        repo.log(&newer).unwrap();

        let window = AuditQuery {
            from: Some("2026-01-09".to_string()),
            to: Some("2026-01-12".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.query(&window).unwrap(), vec![old, newer]);
    }

    #[test]
    fn query_rejects_bad_dates() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);

        let bad = AuditQuery {
            from: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            repo.query(&bad),
            Err(StorageError::SerializationError(_))
        ));

        let inverted = AuditQuery {
            from: Some("2026-02-01".to_string()),
            to: Some("2026-01-01".to_string()),
            ..Default::default()
        };
        assert!(repo.query(&inverted).is_err());
    }

    #[test]
    fn date_window_is_capped() {
        let full_year = AuditQuery {
            from: Some("2024-01-01".to_string()),
            to: Some("2024-12-31".to_string()),
            ..Default::default()
        };
        assert!(full_year.date_range().is_ok());

        let one_day_more = AuditQuery {
            from: Some("2024-01-01".to_string()),
            to: Some("2025-01-01".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            one_day_more.date_range(),
            Err(StorageError::SerializationError(_))
        ));

        let everything = AuditQuery {
            from: Some("0001-01-01".to_string()),
            to: Some("9999-12-31".to_string()),
            ..Default::default()
        };
        assert!(everything.date_range().is_err());
    }
}
