// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to disk storage.
//!
//! Each repository provides operations for a specific entity type,
//! using [`DiskStorage`](super::DiskStorage) for all file operations.

pub mod files;
pub mod zones;

pub use files::{EncryptedRecord, FileRepository, RecordMetadata, RECORD_FORMAT_V1};
pub use zones::ZoneRepository;
