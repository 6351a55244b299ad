// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. Stored types ([`Zone`],
//! [`RecordMetadata`], [`AuditEntry`]) are serialized as they are; the types
//! here add the views clients need on top of them.
//!
//! ## Model Categories
//!
//! - **Zones**: geofence administration
//! - **Files**: uploads, listings and access requests
//! - **Audit**: access log queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::access::AccessibleFile;
use crate::geo::Zone;
use crate::storage::{AuditEntry, AuditQuery, RecordMetadata};

// =============================================================================
// Zone Models
// =============================================================================

/// Request body for creating a zone.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateZoneRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Center latitude in decimal degrees.
    pub latitude: f64,
    /// Center longitude in decimal degrees.
    pub longitude: f64,
    /// Radius in meters, must be positive.
    pub radius_meters: f64,
}

/// A zone together with how many files it governs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ZoneSummary {
    #[serde(flatten)]
    pub zone: Zone,
    pub file_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ZoneListResponse {
    pub zones: Vec<ZoneSummary>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteZoneResponse {
    pub zone_id: String,
    /// Records removed along with the zone.
    pub files_deleted: usize,
}

// =============================================================================
// File Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileListResponse {
    pub files: Vec<RecordMetadata>,
    pub total: usize,
}

/// A claimed position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct LocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// The zone fields shown next to an accessible file.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ZoneRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A file the caller could open from the queried position.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessibleFileResponse {
    pub id: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub zone: ZoneRef,
}

impl From<AccessibleFile> for AccessibleFileResponse {
    fn from(file: AccessibleFile) -> Self {
        Self {
            id: file.record.id,
            original_name: file.record.original_name,
            mime_type: file.record.mime_type,
            size: file.record.size,
            created_at: file.record.created_at,
            zone: ZoneRef {
                id: file.zone.id,
                name: file.zone.name,
                description: file.zone.description,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessibleFilesResponse {
    pub files: Vec<AccessibleFileResponse>,
    pub total: usize,
}

// =============================================================================
// Audit Models
// =============================================================================

/// Query string for `GET /v1/audit`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditListQuery {
    /// First day (`YYYY-MM-DD`, inclusive). Defaults to today.
    pub from: Option<String>,
    /// Last day (`YYYY-MM-DD`, inclusive). Defaults to today.
    pub to: Option<String>,
    pub file_id: Option<String>,
    pub requester_id: Option<String>,
}

impl From<AuditListQuery> for AuditQuery {
    fn from(q: AuditListQuery) -> Self {
        AuditQuery {
            from: q.from,
            to: q.to,
            file_id: q.file_id,
            requester_id: q.requester_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditListResponse {
    pub entries: Vec<AuditEntry>,
    pub total: usize,
}
