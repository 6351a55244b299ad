// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::access::{AccessError, UploadError};
use crate::storage::StorageError;

/// Message returned with every policy denial.
pub const ACCESS_DENIED_MESSAGE: &str =
    "Access denied. You must be within the safe zone to access this file.";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Set only on policy denials, rendered as `"granted": false`.
    pub denied: bool,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    granted: Option<bool>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            denied: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// 403 for a claim outside the zone.
    pub fn access_denied() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: ACCESS_DENIED_MESSAGE.to_string(),
            denied: true,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            granted: self.denied.then_some(false),
        });
        (self.status, body).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
            StorageError::AlreadyExists(what) => ApiError::conflict(format!("{what} already exists")),
            StorageError::InvalidId(id) => ApiError::bad_request(format!("Invalid identifier: {id}")),
            StorageError::Unavailable(_) => {
                tracing::error!(error = %err, "Storage unavailable");
                ApiError::service_unavailable("Storage unavailable")
            }
            other => {
                tracing::error!(error = %other, "Storage error");
                ApiError::internal("Storage error")
            }
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::RecordNotFound(_) => ApiError::not_found("File not found"),
            AccessError::InvalidCoordinate(e) => ApiError::bad_request(e.to_string()),
            AccessError::DecryptionFailure { .. } => ApiError::internal("Failed to decrypt file"),
            AccessError::AuditPersistenceFailure(_) => {
                ApiError::service_unavailable("Audit trail unavailable, access not decided")
            }
            AccessError::Storage(e) => e.into(),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::ZoneNotFound(_) => ApiError::not_found("Zone not found"),
            UploadError::Encryption(e) => {
                tracing::error!(error = %e, "Failed to encrypt upload");
                ApiError::internal("Failed to encrypt file")
            }
            UploadError::Storage(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoError;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let big = ApiError::payload_too_large("big");
        assert_eq!(big.status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }

    #[tokio::test]
    async fn denial_carries_granted_false() {
        let (status, body) = body_json(ApiError::access_denied()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["granted"], false);
        assert_eq!(body["error"], ACCESS_DENIED_MESSAGE);
    }

    #[tokio::test]
    async fn access_errors_map_to_distinct_statuses() {
        let cases = [
            (AccessError::RecordNotFound("f".into()), StatusCode::NOT_FOUND),
            (
                AccessError::InvalidCoordinate(GeoError::InvalidCoordinate {
                    latitude: 91.0,
                    longitude: 0.0,
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                AccessError::DecryptionFailure { file_id: "f".into() },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AccessError::AuditPersistenceFailure(StorageError::Unavailable("x".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            let (status, body) = body_json(err.into()).await;
            assert_eq!(status, expected);
            assert!(body.get("granted").is_none());
        }
    }

    #[test]
    fn upload_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(UploadError::ZoneNotFound("z".into())).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StorageError::AlreadyExists("Zone z".into())).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StorageError::InvalidId("../x".into())).status,
            StatusCode::BAD_REQUEST
        );
    }
}
