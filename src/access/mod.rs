// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Access Control
//!
//! Ties the geofence test, the crypto engine and the audit log together
//! into a single evaluate-then-reveal operation.
//!
//! ## Evaluation Order
//!
//! ```text
//! LookupRecord -> ResolveZone -> ValidateInput -> GeoCheck -> Audit
//!     -> Denied
//!     -> Decrypt -> Granted | DecryptionFailure
//! ```
//!
//! Plaintext only ever leaves [`AccessDecider::evaluate`], and only after
//! the audit entry for that evaluation has been persisted.

pub mod decider;
pub mod discovery;
pub mod recorder;
pub mod upload;

pub use decider::AccessDecider;
pub use discovery::{accessible_files, AccessibleFile};
pub use recorder::AuditRecorder;
pub use upload::{seal_upload, FileUpload, UploadError};

use crate::geo::{Coordinate, GeoError};
use crate::storage::StorageError;

/// One request to read a file from a claimed position. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessClaim {
    pub requester_id: String,
    pub file_id: String,
    pub claimed_latitude: f64,
    pub claimed_longitude: f64,
}

impl AccessClaim {
    pub fn new(
        requester_id: impl Into<String>,
        file_id: impl Into<String>,
        claimed_latitude: f64,
        claimed_longitude: f64,
    ) -> Self {
        Self {
            requester_id: requester_id.into(),
            file_id: file_id.into(),
            claimed_latitude,
            claimed_longitude,
        }
    }

    /// The claimed position, range-checked.
    pub fn location(&self) -> Result<Coordinate, GeoError> {
        Coordinate::new(self.claimed_latitude, self.claimed_longitude)
    }
}

/// Decrypted file handed back on a successful evaluation.
#[derive(Clone, PartialEq, Eq)]
pub struct GrantedFile {
    pub file_id: String,
    pub original_name: String,
    pub mime_type: String,
    pub plaintext: Vec<u8>,
}

impl std::fmt::Debug for GrantedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrantedFile")
            .field("file_id", &self.file_id)
            .field("original_name", &self.original_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.plaintext.len())
            .finish()
    }
}

/// Policy outcome of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessResult {
    Granted(GrantedFile),
    Denied,
}

impl AccessResult {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessResult::Granted(_))
    }
}

/// Non-policy outcomes of an evaluation. Each one is distinct so the HTTP
/// layer can map it to its own status.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// No such file, or its zone no longer exists. Not audited.
    #[error("file not found: {0}")]
    RecordNotFound(String),

    /// Claimed position out of range. Not audited.
    #[error(transparent)]
    InvalidCoordinate(#[from] GeoError),

    /// Geofence passed but the stored payload could not be authenticated.
    /// Audited as granted.
    #[error("stored payload for file {file_id} failed authentication")]
    DecryptionFailure { file_id: String },

    /// The audit entry could not be written; the decision is void.
    #[error("audit trail unavailable: {0}")]
    AuditPersistenceFailure(#[source] StorageError),

    /// Record or zone lookup failed before any decision was made.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
