// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit recording for access decisions.

use super::AccessError;
use crate::storage::{AuditEntry, VaultStore};

/// Writes one audit entry per access decision.
///
/// Failures are never swallowed: a decision whose trail cannot be persisted
/// surfaces as [`AccessError::AuditPersistenceFailure`].
pub struct AuditRecorder<'a, S> {
    store: &'a S,
}

impl<'a, S: VaultStore> AuditRecorder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn record(&self, entry: AuditEntry) -> Result<(), AccessError> {
        let entry_id = entry.entry_id.clone();
        self.store.append_audit(entry).await.map_err(|e| {
            tracing::error!(entry_id = %entry_id, error = %e, "Failed to persist audit entry");
            AccessError::AuditPersistenceFailure(e)
        })
    }
}
