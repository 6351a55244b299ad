// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage for zones, encrypted file records and the access
//! audit log. All data lives under a single data directory (`/data` by
//! default) as plain files; file contents are encrypted by
//! [`crate::crypto`] before they ever reach this layer.
//!
//! ## Storage Layout
//!
//! ```text
//! /data/
//!   zones/
//!     {zone_id}.json
//!   files/
//!     {file_id}.json         # record metadata + base64 ciphertext
//!   audit/
//!     {date}/access.jsonl    # one line per access decision
//! ```
//!
//! The access-control core only sees the [`VaultStore`] trait.

pub mod audit;
pub mod disk;
#[cfg(test)]
pub mod memory;
pub mod paths;
pub mod repository;
pub mod vault;

pub use audit::{AuditEntry, AuditQuery, AuditRepository};
pub use disk::{DiskStorage, StorageError, StorageResult};
pub use paths::{is_valid_id, StoragePaths};
pub use repository::{
    EncryptedRecord, FileRepository, RecordMetadata, ZoneRepository, RECORD_FORMAT_V1,
};
pub use vault::{DiskVault, VaultStore};
