// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    auth::AuditReader,
    error::ApiError,
    models::{AuditListQuery, AuditListResponse},
    state::AppState,
    storage::AuditQuery,
};

/// Read access decisions back from the audit trail.
///
/// Entries come back in the order they were written. The date window
/// defaults to today (UTC).
#[utoipa::path(
    get,
    path = "/v1/audit",
    tag = "Audit",
    security(("bearer_auth" = [])),
    params(AuditListQuery),
    responses(
        (status = 200, description = "Matching audit entries", body = AuditListResponse),
        (status = 400, description = "Malformed date window"),
        (status = 403, description = "Admin or auditor role required")
    )
)]
pub async fn list_audit(
    AuditReader(_user): AuditReader,
    State(state): State<AppState>,
    Query(params): Query<AuditListQuery>,
) -> Result<Json<AuditListResponse>, ApiError> {
    let query = AuditQuery::from(params);
    query
        .date_range()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let entries = state.vault.read_audit(query).await?;
    Ok(Json(AuditListResponse {
        total: entries.len(),
        entries,
    }))
}
