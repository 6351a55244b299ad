// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Safezone Vault - Location-Gated Encrypted File Service
//!
//! Files are encrypted at rest and bound to a circular geofence. A requester
//! receives the plaintext only when their claimed position lies inside the
//! file's zone, and every decision is written to an append-only audit trail
//! before any plaintext leaves the service.
//!
//! ## Modules
//!
//! - `geo` - Haversine distance and inclusive zone containment
//! - `crypto` - AES-256-GCM payload sealing
//! - `access` - The evaluate-then-reveal decision and audit recording
//! - `storage` - Zones, encrypted records and audit logs on disk
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer JWT authentication and roles

pub mod access;
pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod geo;
pub mod models;
pub mod state;
pub mod storage;
