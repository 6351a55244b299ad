// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the on-disk storage layout.

use std::path::{Path, PathBuf};

/// Default base directory for all persistent storage.
pub const DATA_ROOT: &str = "/data";

/// Longest identifier accepted as a file name stem.
pub const MAX_ID_LEN: usize = 64;

/// Whether `id` can be used as a file name stem under the data root.
///
/// Only ASCII alphanumerics, `-` and `_` are allowed, so an id can never
/// name a parent directory or a path separator.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Storage path utilities.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Zone Paths ==========

    /// Directory containing all zones.
    pub fn zones_dir(&self) -> PathBuf {
        self.root.join("zones")
    }

    /// Path to a specific zone file.
    pub fn zone(&self, zone_id: &str) -> PathBuf {
        self.zones_dir().join(format!("{zone_id}.json"))
    }

    // ========== File Record Paths ==========

    /// Directory containing all encrypted file records.
    pub fn files_dir(&self) -> PathBuf {
        self.root.join("files")
    }

    /// Path to a specific encrypted file record.
    pub fn file_record(&self, file_id: &str) -> PathBuf {
        self.files_dir().join(format!("{file_id}.json"))
    }

    // ========== Audit Log Paths ==========

    /// Directory containing audit logs.
    pub fn audit_dir(&self) -> PathBuf {
        self.root.join("audit")
    }

    /// Directory for a specific date's audit logs.
    pub fn audit_date_dir(&self, date: &str) -> PathBuf {
        self.audit_dir().join(date)
    }

    /// Path to a daily access log (JSONL format).
    pub fn audit_access_file(&self, date: &str) -> PathBuf {
        self.audit_date_dir(date).join("access.jsonl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_use_data_root() {
        let paths = StoragePaths::default();
        assert_eq!(paths.root(), Path::new("/data"));
    }

    #[test]
    fn custom_root_for_testing() {
        let paths = StoragePaths::new("/tmp/test-data");
        assert_eq!(
            paths.file_record("f-1"),
            PathBuf::from("/tmp/test-data/files/f-1.json")
        );
    }

    #[test]
    fn zone_paths_are_correct() {
        let paths = StoragePaths::default();
        assert_eq!(paths.zones_dir(), PathBuf::from("/data/zones"));
        assert_eq!(paths.zone("z-9"), PathBuf::from("/data/zones/z-9.json"));
    }

    #[test]
    fn ids_that_could_escape_are_invalid() {
        assert!(is_valid_id("6f1c2a9e-8d3b-4b7a-9c1e-2f4d5a6b7c8d"));
        assert!(is_valid_id("f-1"));
        assert!(is_valid_id("zone_2"));

        for bad in [
            "",
            "..",
            "../zones/abc",
            "..%2Fzones",
            "a/b",
            "a\\b",
            "name.json",
            "with space",
            "caf\u{e9}",
        ] {
            assert!(!is_valid_id(bad), "{bad:?} should be rejected");
        }
        assert!(!is_valid_id(&"a".repeat(MAX_ID_LEN + 1)));
    }

    #[test]
    fn audit_paths_are_correct() {
        let paths = StoragePaths::default();
        assert_eq!(paths.audit_dir(), PathBuf::from("/data/audit"));
        assert_eq!(
            paths.audit_access_file("2026-01-28"),
            PathBuf::from("/data/audit/2026-01-28/access.jsonl")
        );
    }
}
