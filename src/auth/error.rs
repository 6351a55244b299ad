// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Rejections produced by the bearer-token extractors.
//!
//! A 401 carries a `WWW-Authenticate: Bearer` challenge; a 403 means the
//! caller is known but their role cannot perform the operation.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Bearer token required to use the vault")]
    MissingAuthHeader,

    #[error("Authorization header must be 'Bearer <token>'")]
    InvalidAuthHeader,

    #[error("Bearer token could not be decoded")]
    MalformedToken,

    #[error("Bearer token signature does not match the vault secret")]
    InvalidSignature,

    #[error("Bearer token has expired")]
    TokenExpired,

    #[error("Bearer token was issued by an unexpected issuer")]
    InvalidIssuer,

    #[error("Bearer token is not valid yet")]
    TokenNotYetValid,

    #[error("Your role does not allow this vault operation")]
    InsufficientPermissions,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: &'static str,
}

impl AuthError {
    /// Stable machine-readable code, returned alongside the message.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::InsufficientPermissions => "insufficient_permissions",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code(),
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"safezone-vault\""),
            );
        }
        response
    }
}
