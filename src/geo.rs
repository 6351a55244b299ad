// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Geofence Evaluation
//!
//! Circular zones on a spherical Earth. Containment uses the haversine
//! great-circle distance between the zone center and the claimed point,
//! with an inclusive boundary (`distance <= radius`) and no added tolerance.
//!
//! Everything here is pure and allocation-free, so it is safe to call from
//! any number of concurrent requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean Earth radius in meters (spherical model).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Errors raised while validating geographic input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("invalid zone radius: {0} (must be a positive number of meters)")]
    InvalidRadius(f64),
}

/// A WGS-84 position in decimal degrees.
///
/// Construct through [`Coordinate::new`] to get range checking; the fields
/// stay public so storage can round-trip them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    /// Latitude in [-90, 90].
    pub latitude: f64,
    /// Longitude in [-180, 180].
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting NaN, infinities and out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check the coordinate is well-formed.
    pub fn validate(&self) -> Result<(), GeoError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);

        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(GeoError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// Circular access-policy region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Zone {
    /// Unique zone identifier (UUID).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Zone center.
    pub center: Coordinate,
    /// Radius in meters, always positive.
    pub radius_meters: f64,
    /// Administrator who created the zone.
    pub created_by: String,
    /// When the zone was created.
    pub created_at: DateTime<Utc>,
}

impl Zone {
    /// Create a zone with a fresh identifier.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        center: Coordinate,
        radius_meters: f64,
        created_by: impl Into<String>,
    ) -> Result<Self, GeoError> {
        center.validate()?;
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(GeoError::InvalidRadius(radius_meters));
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description,
            center,
            radius_meters,
            created_by: created_by.into(),
            created_at: Utc::now(),
        })
    }

    /// Whether `point` lies inside this zone. See [`contains`].
    pub fn contains(&self, point: &Coordinate) -> bool {
        contains(self, point)
    }
}

/// Great-circle distance in meters between two points.
pub fn haversine_distance_m(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h marginally above 1 for antipodal points.
    let c = 2.0 * h.min(1.0).sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Inclusive geofence test: `haversine(center, point) <= radius_meters`.
///
/// Callers validate `point` beforehand; a zero radius only admits a point
/// whose computed distance is exactly `0.0`.
pub fn contains(zone: &Zone, point: &Coordinate) -> bool {
    haversine_distance_m(&zone.center, point) <= zone.radius_meters
}
