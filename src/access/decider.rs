// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The evaluate-then-reveal operation.

use std::sync::Arc;

use super::{AccessClaim, AccessError, AccessResult, AuditRecorder, GrantedFile};
use crate::crypto::{CryptoEngine, EncryptedPayload};
use crate::geo;
use crate::storage::{AuditEntry, VaultStore, RECORD_FORMAT_V1};

/// Decides whether a claim may read a file, records the decision, and
/// decrypts on grant.
///
/// Holds no per-request state, so one instance serves any number of
/// concurrent evaluations.
pub struct AccessDecider<S> {
    store: Arc<S>,
    crypto: CryptoEngine,
}

impl<S> Clone for AccessDecider<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            crypto: self.crypto.clone(),
        }
    }
}

impl<S: VaultStore> AccessDecider<S> {
    pub fn new(store: Arc<S>, crypto: CryptoEngine) -> Self {
        Self { store, crypto }
    }

    /// Evaluate one access claim.
    ///
    /// Returns `Ok(Denied)` when the claimed position is outside the zone.
    /// Every evaluation that reaches the geofence test leaves exactly one
    /// audit entry behind, written before any plaintext is produced.
    pub async fn evaluate(&self, claim: &AccessClaim) -> Result<AccessResult, AccessError> {
        let record = self
            .store
            .get_record(&claim.file_id)
            .await?
            .ok_or_else(|| AccessError::RecordNotFound(claim.file_id.clone()))?;

        let Some(zone) = self.store.get_zone(&record.zone_id).await? else {
            tracing::warn!(
                file_id = %record.id,
                zone_id = %record.zone_id,
                "Record references a missing zone"
            );
            return Err(AccessError::RecordNotFound(claim.file_id.clone()));
        };

        let location = claim.location()?;
        let inside = geo::contains(&zone, &location);

        AuditRecorder::new(self.store.as_ref())
            .record(AuditEntry::new(
                claim.requester_id.clone(),
                claim.file_id.clone(),
                location,
                inside,
            ))
            .await?;

        if !inside {
            tracing::info!(
                requester_id = %claim.requester_id,
                file_id = %claim.file_id,
                zone_id = %zone.id,
                "Access denied: claimed position outside zone"
            );
            return Ok(AccessResult::Denied);
        }

        if record.format_version != RECORD_FORMAT_V1 {
            tracing::error!(
                file_id = %record.id,
                format_version = record.format_version,
                alert = true,
                "Unsupported record format"
            );
            return Err(AccessError::DecryptionFailure {
                file_id: record.id,
            });
        }

        let sealed = match record.ciphertext_bytes() {
            Ok(sealed) => sealed,
            Err(e) => {
                tracing::error!(
                    file_id = %record.id,
                    requester_id = %claim.requester_id,
                    error = %e,
                    alert = true,
                    "Stored payload is not valid base64"
                );
                return Err(AccessError::DecryptionFailure {
                    file_id: record.id,
                });
            }
        };

        let payload = EncryptedPayload::from_bytes(sealed);
        let plaintext = match self.crypto.decrypt(&payload) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                tracing::error!(
                    file_id = %record.id,
                    requester_id = %claim.requester_id,
                    error = %e,
                    alert = true,
                    "Stored payload failed authentication"
                );
                return Err(AccessError::DecryptionFailure {
                    file_id: record.id,
                });
            }
        };

        tracing::info!(
            requester_id = %claim.requester_id,
            file_id = %record.id,
            bytes = plaintext.len(),
            "Access granted"
        );

        Ok(AccessResult::Granted(GrantedFile {
            file_id: record.id,
            original_name: record.original_name,
            mime_type: record.mime_type,
            plaintext,
        }))
    }
}
