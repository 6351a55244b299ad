// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::access::AccessDecider;
use crate::auth::AuthConfig;
use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::crypto::CryptoEngine;
use crate::storage::DiskVault;

#[derive(Clone)]
pub struct AppState {
    pub vault: Arc<DiskVault>,
    pub decider: AccessDecider<DiskVault>,
    pub crypto: CryptoEngine,
    pub auth_config: AuthConfig,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(vault: DiskVault, crypto: CryptoEngine) -> Self {
        let vault = Arc::new(vault);
        Self {
            decider: AccessDecider::new(Arc::clone(&vault), crypto.clone()),
            vault,
            crypto,
            auth_config: AuthConfig::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = auth_config;
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Development-mode state over a fresh temporary data directory.
#[cfg(test)]
pub(crate) fn test_state() -> (AppState, tempfile::TempDir) {
    use crate::crypto::EncryptionKey;
    use crate::storage::StoragePaths;

    let temp = tempfile::TempDir::new().expect("Failed to create temp dir");
    let vault = DiskVault::open(StoragePaths::new(temp.path())).expect("Failed to open vault");
    let crypto = CryptoEngine::new(&EncryptionKey::from_bytes([42u8; 32]));
    (AppState::new(vault, crypto), temp)
}
