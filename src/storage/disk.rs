// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Plain filesystem operations under the data root.
//!
//! File contents are already encrypted by the crypto engine before they get
//! here; this layer only deals with JSON documents and append-only logs.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use super::StoragePaths;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// Entity already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Identifier is not usable as a storage key
    #[error("Invalid identifier: {0}")]
    InvalidId(String),
    /// Storage not initialized
    #[error("Storage not initialized")]
    NotInitialized,
    /// Stored data failed a consistency check
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),
    /// Generic serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Storage backend unreachable (blocking pool gone, injected failure)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Filesystem storage rooted at [`StoragePaths::root`].
#[derive(Debug, Clone)]
pub struct DiskStorage {
    paths: StoragePaths,
    initialized: bool,
}

impl DiskStorage {
    /// Create a new DiskStorage instance.
    ///
    /// Does NOT initialize the directory structure. Call `initialize()` first.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            initialized: false,
        }
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// Initialize the directory structure. Idempotent.
    pub fn initialize(&mut self) -> StorageResult<()> {
        let dirs = [
            self.paths.zones_dir(),
            self.paths.files_dir(),
            self.paths.audit_dir(),
        ];

        for dir in dirs {
            fs::create_dir_all(&dir)?;
        }

        self.initialized = true;
        Ok(())
    }

    fn ensure_initialized(&self) -> StorageResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(StorageError::NotInitialized)
        }
    }

    /// Write-read-delete probe on the data root.
    pub fn health_check(&self) -> StorageResult<()> {
        self.ensure_initialized()?;

        let test_file = self.paths.root().join(".health_check");
        let test_data = b"health_check_data";

        fs::write(&test_file, test_data)?;
        let read_data = fs::read(&test_file)?;
        fs::remove_file(&test_file)?;

        if read_data != test_data {
            return Err(StorageError::IntegrityViolation(
                "Health check data mismatch".to_string(),
            ));
        }

        Ok(())
    }

    // ========== Generic JSON Operations ==========

    /// Read a JSON file and deserialize it.
    pub fn read_json<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> StorageResult<T> {
        self.ensure_initialized()?;

        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let value = serde_json::from_reader(reader)?;
        Ok(value)
    }

    /// Read a JSON file, mapping a missing file to `None`.
    pub fn read_json_opt<T: DeserializeOwned>(
        &self,
        path: impl AsRef<Path>,
    ) -> StorageResult<Option<T>> {
        match self.read_json(path) {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write a JSON file (atomic write via rename).
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> StorageResult<()> {
        self.ensure_initialized()?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, value)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Check if a file exists.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        File::open(path.as_ref()).is_ok()
    }

    /// Delete a file.
    pub fn delete(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        self.ensure_initialized()?;
        fs::remove_file(path.as_ref())?;
        Ok(())
    }

    /// List the stems of all files in `dir` with the given extension.
    pub fn list_files(&self, dir: impl AsRef<Path>, extension: &str) -> StorageResult<Vec<String>> {
        self.ensure_initialized()?;

        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().map_or(true, |ext| ext != extension) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    // ========== Append-only Logs ==========

    /// Append one line to a log file and flush it to disk.
    ///
    /// The line and its terminator go out in a single `write_all` on an
    /// `O_APPEND` handle.
    pub fn append_line(&self, path: impl AsRef<Path>, line: &[u8]) -> StorageResult<()> {
        self.ensure_initialized()?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line);
        buf.push(b'\n');

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(&buf)?;
        file.sync_data()?;
        Ok(())
    }

    /// Read raw bytes from a file.
    pub fn read_raw(&self, path: impl AsRef<Path>) -> StorageResult<Vec<u8>> {
        self.ensure_initialized()?;

        let mut file = File::open(path.as_ref())?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }
}
