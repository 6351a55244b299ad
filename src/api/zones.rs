// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Zone administration endpoints. Admin only.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::AdminOnly,
    error::ApiError,
    geo::{Coordinate, Zone},
    models::{CreateZoneRequest, DeleteZoneResponse, ZoneListResponse, ZoneSummary},
    state::AppState,
    storage::VaultStore,
};

/// Create a zone.
#[utoipa::path(
    post,
    path = "/v1/zones",
    tag = "Zones",
    security(("bearer_auth" = [])),
    request_body = CreateZoneRequest,
    responses(
        (status = 201, description = "Zone created", body = Zone),
        (status = 400, description = "Invalid center or radius"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn create_zone(
    AdminOnly(user): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<CreateZoneRequest>,
) -> Result<(StatusCode, Json<Zone>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Zone name is required"));
    }

    let center = Coordinate {
        latitude: request.latitude,
        longitude: request.longitude,
    };
    let zone = Zone::new(
        request.name.trim(),
        request.description,
        center,
        request.radius_meters,
        user.user_id.clone(),
    )
    .map_err(|e| ApiError::bad_request(e.to_string()))?;

    state.vault.create_zone(zone.clone()).await?;

    tracing::info!(
        zone_id = %zone.id,
        radius_meters = zone.radius_meters,
        created_by = %user.user_id,
        "Zone created"
    );

    Ok((StatusCode::CREATED, Json(zone)))
}

async fn file_counts(state: &AppState) -> Result<HashMap<String, usize>, ApiError> {
    let mut counts = HashMap::new();
    for record in state.vault.list_records().await? {
        *counts.entry(record.zone_id).or_insert(0) += 1;
    }
    Ok(counts)
}

/// List all zones with their file counts, newest first.
#[utoipa::path(
    get,
    path = "/v1/zones",
    tag = "Zones",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All zones", body = ZoneListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_zones(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<ZoneListResponse>, ApiError> {
    let counts = file_counts(&state).await?;
    let zones: Vec<ZoneSummary> = state
        .vault
        .list_zones()
        .await?
        .into_iter()
        .map(|zone| ZoneSummary {
            file_count: counts.get(&zone.id).copied().unwrap_or(0),
            zone,
        })
        .collect();

    Ok(Json(ZoneListResponse {
        total: zones.len(),
        zones,
    }))
}

/// Get a single zone.
#[utoipa::path(
    get,
    path = "/v1/zones/{zone_id}",
    tag = "Zones",
    security(("bearer_auth" = [])),
    params(("zone_id" = String, Path, description = "Zone identifier")),
    responses(
        (status = 200, description = "The zone", body = ZoneSummary),
        (status = 404, description = "Zone not found")
    )
)]
pub async fn get_zone(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
) -> Result<Json<ZoneSummary>, ApiError> {
    let zone = state
        .vault
        .get_zone(&zone_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Zone not found"))?;
    let file_count = file_counts(&state).await?.remove(&zone.id).unwrap_or(0);

    Ok(Json(ZoneSummary { zone, file_count }))
}

/// Delete a zone and every file bound to it.
#[utoipa::path(
    delete,
    path = "/v1/zones/{zone_id}",
    tag = "Zones",
    security(("bearer_auth" = [])),
    params(("zone_id" = String, Path, description = "Zone identifier")),
    responses(
        (status = 200, description = "Zone and its files deleted", body = DeleteZoneResponse),
        (status = 404, description = "Zone not found")
    )
)]
pub async fn delete_zone(
    AdminOnly(user): AdminOnly,
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
) -> Result<Json<DeleteZoneResponse>, ApiError> {
    let files_deleted = state.vault.delete_zone(&zone_id).await?;

    tracing::info!(
        zone_id = %zone_id,
        files_deleted,
        deleted_by = %user.user_id,
        "Zone deleted"
    );

    Ok(Json(DeleteZoneResponse {
        zone_id,
        files_deleted,
    }))
}
