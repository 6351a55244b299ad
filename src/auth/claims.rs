// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims the server reads from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject, used as the requester identifier.
    pub sub: String,
    /// Expiration timestamp.
    #[serde(default)]
    pub exp: i64,
    /// Issuer.
    #[serde(default)]
    pub iss: String,
    /// Role name, defaults to `client` when absent or unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// The caller behind a request, as established by the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user ID (`sub` claim)
    pub user_id: String,

    pub role: Role,

    #[serde(skip)]
    pub issuer: String,

    /// Token expiration (Unix timestamp)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Self {
        let role = claims
            .role
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or_default();

        Self {
            user_id: claims.sub,
            role,
            issuer: claims.iss,
            expires_at: claims.exp,
        }
    }

    /// Check if the user has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
