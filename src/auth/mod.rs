// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer JWT authentication for the vault API.
//!
//! ## Auth Flow
//!
//! 1. An identity provider issues an HS256 JWT carrying `sub`, `exp`,
//!    optional `iss` and a `role` claim
//! 2. The client sends `Authorization: Bearer <JWT>`
//! 3. The server:
//!    - Verifies the signature against `AUTH_JWT_SECRET`
//!    - Checks expiry (60 seconds leeway) and issuer when configured
//!    - Extracts `sub` as the requester identifier and `role`
//!
//! ## Development Mode
//!
//! Without `AUTH_JWT_SECRET` the token structure and expiry are still
//! checked but the signature is not. Never run production like this.
//!
//! ## Roles
//!
//! | Role      | Can do                                         |
//! |-----------|------------------------------------------------|
//! | `admin`   | Manage zones and files, read audit, access     |
//! | `client`  | List and access files                          |
//! | `auditor` | Read the audit trail                           |

pub mod claims;
pub mod error;
pub mod extractor;
pub mod roles;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::{AdminOnly, AuditReader, Auth};
pub use roles::Role;

/// How bearer tokens are verified.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// HS256 shared secret. `None` enables development mode.
    pub jwt_secret: Option<String>,
    /// Required `iss` claim, if any.
    pub issuer: Option<String>,
}

impl AuthConfig {
    pub fn is_production(&self) -> bool {
        self.jwt_secret.is_some()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("issuer", &self.issuer)
            .finish()
    }
}
