// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Role,
    geo::{Coordinate, Zone},
    models::{
        AccessibleFileResponse, AccessibleFilesResponse, AuditListResponse, CreateZoneRequest,
        DeleteZoneResponse, FileListResponse, LocationRequest, ZoneListResponse, ZoneRef,
        ZoneSummary,
    },
    state::AppState,
    storage::{AuditEntry, RecordMetadata},
};

pub mod audit;
pub mod files;
pub mod health;
pub mod zones;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);

    let v1_routes = Router::new()
        .route("/zones", get(zones::list_zones).post(zones::create_zone))
        .route(
            "/zones/{zone_id}",
            get(zones::get_zone).delete(zones::delete_zone),
        )
        .route("/files", get(files::list_files).post(files::upload_file))
        .route("/files/accessible", post(files::accessible_files))
        .route("/files/{file_id}", delete(files::delete_file))
        .route("/files/{file_id}/access", post(files::access_file))
        .route("/audit", get(audit::list_audit))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        zones::create_zone,
        zones::list_zones,
        zones::get_zone,
        zones::delete_zone,
        files::upload_file,
        files::list_files,
        files::delete_file,
        files::accessible_files,
        files::access_file,
        audit::list_audit
    ),
    components(
        schemas(
            Coordinate,
            Zone,
            ZoneSummary,
            ZoneListResponse,
            ZoneRef,
            CreateZoneRequest,
            DeleteZoneResponse,
            RecordMetadata,
            FileListResponse,
            LocationRequest,
            AccessibleFileResponse,
            AccessibleFilesResponse,
            AuditEntry,
            AuditListResponse,
            Role,
            files::UploadForm,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Zones", description = "Geofence administration"),
        (name = "Files", description = "Encrypted files and location-gated access"),
        (name = "Audit", description = "Access decision trail")
    )
)]
struct ApiDoc;
