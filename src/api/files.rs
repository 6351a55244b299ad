// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File endpoints: upload, listing, discovery and the location-gated
//! access request.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use utoipa::ToSchema;

use crate::{
    access::{self, AccessClaim, AccessResult, FileUpload, GrantedFile},
    auth::{AdminOnly, Auth},
    error::ApiError,
    geo::Coordinate,
    models::{AccessibleFileResponse, AccessibleFilesResponse, FileListResponse, LocationRequest},
    state::AppState,
    storage::{RecordMetadata, VaultStore},
};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Multipart form accepted by `POST /v1/files`.
#[derive(ToSchema)]
pub struct UploadForm {
    /// The file contents.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Zone that will govern access to the file.
    pub zone_id: String,
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Upload exceeds the configured size limit")
    } else {
        ApiError::bad_request(format!("Multipart error: {}", e.body_text()))
    }
}

/// Upload a file and bind it to a zone. The contents are encrypted before
/// they reach the disk.
#[utoipa::path(
    post,
    path = "/v1/files",
    tag = "Files",
    security(("bearer_auth" = [])),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = RecordMetadata),
        (status = 400, description = "Missing file or zone_id"),
        (status = 404, description = "Zone not found"),
        (status = 413, description = "File too large")
    )
)]
pub async fn upload_file(
    AdminOnly(user): AdminOnly,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<RecordMetadata>), ApiError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut zone_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name().unwrap_or("") {
            "file" => {
                let name = field.file_name().unwrap_or("file").to_string();
                let mime = field
                    .content_type()
                    .filter(|m| !m.is_empty())
                    .unwrap_or(DEFAULT_MIME_TYPE)
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.len() > state.max_upload_bytes {
                    return Err(ApiError::payload_too_large(format!(
                        "File exceeds the {} byte limit",
                        state.max_upload_bytes
                    )));
                }
                file = Some((name, mime, bytes.to_vec()));
            }
            "zone_id" => {
                let text = field.text().await.map_err(multipart_error)?;
                zone_id = Some(text.trim().to_string());
            }
            _ => {}
        }
    }

    let (original_name, mime_type, bytes) =
        file.ok_or_else(|| ApiError::bad_request("Missing 'file' field in multipart form"))?;
    let zone_id = zone_id
        .filter(|z| !z.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing 'zone_id' field in multipart form"))?;

    let upload = FileUpload {
        zone_id,
        original_name,
        mime_type,
        bytes,
    };
    let metadata = access::seal_upload(state.vault.as_ref(), &state.crypto, upload).await?;

    tracing::info!(
        file_id = %metadata.id,
        uploaded_by = %user.user_id,
        "File uploaded"
    );

    Ok((StatusCode::CREATED, Json(metadata)))
}

/// List metadata of every stored file. Never returns contents.
#[utoipa::path(
    get,
    path = "/v1/files",
    tag = "Files",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "File metadata", body = FileListResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_files(
    Auth(_user): Auth,
    State(state): State<AppState>,
) -> Result<Json<FileListResponse>, ApiError> {
    let mut files = state.vault.list_records().await?;
    files.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(FileListResponse {
        total: files.len(),
        files,
    }))
}

/// Delete a single file.
#[utoipa::path(
    delete,
    path = "/v1/files/{file_id}",
    tag = "Files",
    security(("bearer_auth" = [])),
    params(("file_id" = String, Path, description = "File identifier")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(
    AdminOnly(user): AdminOnly,
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.vault.delete_record(&file_id).await?;

    tracing::info!(file_id = %file_id, deleted_by = %user.user_id, "File deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Files whose zone contains the given position. Nothing is decrypted or
/// audited.
#[utoipa::path(
    post,
    path = "/v1/files/accessible",
    tag = "Files",
    security(("bearer_auth" = [])),
    request_body = LocationRequest,
    responses(
        (status = 200, description = "Files reachable from here", body = AccessibleFilesResponse),
        (status = 400, description = "Invalid coordinates")
    )
)]
pub async fn accessible_files(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Json(location): Json<LocationRequest>,
) -> Result<Json<AccessibleFilesResponse>, ApiError> {
    let point = Coordinate::new(location.latitude, location.longitude)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let files: Vec<AccessibleFileResponse> = access::accessible_files(state.vault.as_ref(), &point)
        .await?
        .into_iter()
        .map(AccessibleFileResponse::from)
        .collect();

    Ok(Json(AccessibleFilesResponse {
        total: files.len(),
        files,
    }))
}

/// Request a file's contents from a claimed position.
///
/// Every request that reaches the geofence test is audited, granted or not.
#[utoipa::path(
    post,
    path = "/v1/files/{file_id}/access",
    tag = "Files",
    security(("bearer_auth" = [])),
    params(("file_id" = String, Path, description = "File identifier")),
    request_body = LocationRequest,
    responses(
        (status = 200, description = "Decrypted file contents", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Invalid coordinates"),
        (status = 403, description = "Outside the file's zone"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Stored file failed authentication"),
        (status = 503, description = "Audit trail unavailable")
    )
)]
pub async fn access_file(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    Json(location): Json<LocationRequest>,
) -> Result<Response, ApiError> {
    let claim = AccessClaim::new(user.user_id, file_id, location.latitude, location.longitude);

    match state.decider.evaluate(&claim).await? {
        AccessResult::Granted(file) => Ok(file_response(file)),
        AccessResult::Denied => Err(ApiError::access_denied()),
    }
}

/// Quote-safe ASCII rendition of a file name for `Content-Disposition`.
fn disposition_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim().is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

fn file_response(file: GrantedFile) -> Response {
    let content_type = HeaderValue::from_str(&file.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_MIME_TYPE));
    let disposition = format!(
        "attachment; filename=\"{}\"",
        disposition_filename(&file.original_name)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let length = HeaderValue::from(file.plaintext.len());

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, length),
        ],
        Body::from(file.plaintext),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_filename_strips_unsafe_characters() {
        assert_eq!(disposition_filename("report 2026.pdf"), "report 2026.pdf");
        assert_eq!(disposition_filename("a\"b\\c.txt"), "a_b_c.txt");
        assert_eq!(disposition_filename("naïve\r\n.txt"), "na_ve__.txt");
        assert_eq!(disposition_filename(""), "file");
    }
}
