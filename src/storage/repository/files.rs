// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encrypted file record repository.
//!
//! Each record is one JSON document under `/data/files/`. The ciphertext is
//! kept base64-encoded so the document stays text-safe; the decoded bytes
//! are exactly the `nonce ‖ tag ‖ ciphertext` payload produced by the
//! crypto engine.
//!
//! The encoded text is kept as-is when a record is loaded. Decoding happens
//! only when the payload is about to be decrypted, so a damaged document
//! still loads and its failure surfaces on the decrypt path.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{is_valid_id, DiskStorage, StorageError, StorageResult};

/// Current payload format: AES-256-GCM, `nonce(12) ‖ tag(16) ‖ ciphertext`.
pub const RECORD_FORMAT_V1: u8 = 1;

/// A file's persisted form. Immutable once written.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedRecord {
    /// Unique file identifier (UUID)
    pub id: String,
    /// Zone that governs access to this file
    pub zone_id: String,
    /// Payload format tag, see [`RECORD_FORMAT_V1`]
    pub format_version: u8,
    /// Encrypted payload, standard base64
    pub ciphertext: String,
    /// MIME type reported at upload
    pub mime_type: String,
    /// File name reported at upload
    pub original_name: String,
    /// Plaintext size in bytes
    pub size: u64,
    /// When the file was uploaded
    pub created_at: DateTime<Utc>,
}

impl EncryptedRecord {
    /// Encode a sealed payload for storage.
    pub fn encode_ciphertext(payload: &[u8]) -> String {
        STANDARD.encode(payload)
    }

    /// Decode the stored payload.
    pub fn ciphertext_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.ciphertext)
    }

    /// Everything except the ciphertext.
    pub fn metadata(&self) -> RecordMetadata {
        RecordMetadata {
            id: self.id.clone(),
            zone_id: self.zone_id.clone(),
            format_version: self.format_version,
            mime_type: self.mime_type.clone(),
            original_name: self.original_name.clone(),
            size: self.size,
            created_at: self.created_at,
        }
    }
}

impl std::fmt::Debug for EncryptedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedRecord")
            .field("id", &self.id)
            .field("zone_id", &self.zone_id)
            .field("format_version", &self.format_version)
            .field("encoded_len", &self.ciphertext.len())
            .field("mime_type", &self.mime_type)
            .field("original_name", &self.original_name)
            .field("size", &self.size)
            .finish()
    }
}

/// Record metadata. Deserializes from a full record document, skipping the
/// ciphertext, so listings never hold file contents in memory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct RecordMetadata {
    pub id: String,
    pub zone_id: String,
    pub format_version: u8,
    pub mime_type: String,
    pub original_name: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// Repository for encrypted file records on disk storage.
pub struct FileRepository<'a> {
    storage: &'a DiskStorage,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository.
    pub fn new(storage: &'a DiskStorage) -> Self {
        Self { storage }
    }

    /// Check if a record exists.
    pub fn exists(&self, file_id: &str) -> bool {
        is_valid_id(file_id) && self.storage.exists(self.storage.paths().file_record(file_id))
    }

    /// Get a record by ID, `None` if absent or not a valid id.
    pub fn find(&self, file_id: &str) -> StorageResult<Option<EncryptedRecord>> {
        if !is_valid_id(file_id) {
            return Ok(None);
        }
        self.storage
            .read_json_opt(self.storage.paths().file_record(file_id))
    }

    /// Persist a new record. Records are never overwritten.
    pub fn create(&self, record: &EncryptedRecord) -> StorageResult<()> {
        if !is_valid_id(&record.id) {
            return Err(StorageError::InvalidId(record.id.clone()));
        }
        if self.exists(&record.id) {
            return Err(StorageError::AlreadyExists(format!("File {}", record.id)));
        }

        self.storage
            .write_json(self.storage.paths().file_record(&record.id), record)
    }

    /// Delete a record.
    pub fn delete(&self, file_id: &str) -> StorageResult<()> {
        if !self.exists(file_id) {
            return Err(StorageError::NotFound(format!("File {file_id}")));
        }

        self.storage.delete(self.storage.paths().file_record(file_id))
    }

    /// Metadata of every record, newest first.
    pub fn list_metadata(&self) -> StorageResult<Vec<RecordMetadata>> {
        let file_ids = self
            .storage
            .list_files(self.storage.paths().files_dir(), "json")?;

        let mut records = Vec::with_capacity(file_ids.len());
        for id in file_ids {
            let path = self.storage.paths().file_record(&id);
            match self.storage.read_json_opt::<RecordMetadata>(&path) {
                Ok(Some(meta)) => records.push(meta),
                Ok(None) => {}
                Err(e) => tracing::warn!(file_id = %id, error = %e, "Skipping unreadable record"),
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// Delete every record bound to `zone_id`. Returns the number removed.
    ///
    /// Every record is read before anything is deleted. An unreadable record
    /// fails the whole call, since it may belong to `zone_id`.
    pub fn delete_by_zone(&self, zone_id: &str) -> StorageResult<usize> {
        let file_ids = self
            .storage
            .list_files(self.storage.paths().files_dir(), "json")?;

        let mut doomed = Vec::new();
        for id in file_ids {
            let path = self.storage.paths().file_record(&id);
            match self.storage.read_json_opt::<RecordMetadata>(&path) {
                Ok(Some(meta)) if meta.zone_id == zone_id => doomed.push(path),
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(
                        file_id = %id,
                        zone_id = %zone_id,
                        error = %e,
                        "Unreadable record blocks zone cascade"
                    );
                    return Err(StorageError::IntegrityViolation(format!(
                        "Record {id} is unreadable: {e}"
                    )));
                }
            }
        }

        for path in &doomed {
            self.storage.delete(path)?;
        }
        Ok(doomed.len())
    }
}
