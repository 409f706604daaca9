//! Camera pose and vehicle fix types.
//!
//! `ViewState` is the full camera pose handed to the renderer. It has
//! exactly one writer — the animator's current tick — and is always
//! written in full, never field-by-field.

use serde::{Deserialize, Serialize};

use crate::geo::LonLat;

/// The virtual camera pose.
///
/// Latitude/longitude in degrees, bearing in degrees `[0, 360)`, pitch in
/// degrees from vertical, zoom in the host map widget's zoom units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Map zoom level.
    pub zoom: f64,
    /// Camera bearing in degrees.
    pub bearing: f64,
    /// Camera pitch in degrees.
    pub pitch: f64,
}

impl ViewState {
    /// Create a pose at the given position with the given zoom, bearing
    /// and pitch.
    pub fn new(latitude: f64, longitude: f64, zoom: f64, bearing: f64, pitch: f64) -> Self {
        Self {
            latitude,
            longitude,
            zoom,
            bearing,
            pitch,
        }
    }

    /// The camera position as `[lon, lat]`.
    pub fn position(&self) -> LonLat {
        [self.longitude, self.latitude]
    }

    /// Return a copy of this pose moved to `position`.
    pub fn at_position(mut self, position: LonLat) -> Self {
        self.longitude = position[0];
        self.latitude = position[1];
        self
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            zoom: 12.0,
            bearing: 0.0,
            pitch: 0.0,
        }
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.5}, {:.5}) z{:.2} b{:.1}° p{:.1}°",
            self.latitude, self.longitude, self.zoom, self.bearing, self.pitch
        )
    }
}

/// A live vehicle fix from the host's telemetry feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Stable identifier within the feed.
    pub id: String,
    /// Current position as `[lon, lat]` in degrees.
    pub position: LonLat,
}

impl Vehicle {
    /// Create a vehicle fix.
    pub fn new(id: impl Into<String>, position: LonLat) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}
