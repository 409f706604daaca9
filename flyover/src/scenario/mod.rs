//! Scenario files and headless playback.
//!
//! A scenario is a small JSON document describing a synthetic world: the
//! tour waypoints, scripted vehicles moving along polyline paths at fixed
//! speeds, and optionally the flyover options to run with. The CLI demo
//! and integration tests drive the controller against a [`ScenarioHost`]
//! built from one.
//!
//! # Example
//!
//! ```ignore
//! use flyover::scenario::{Scenario, ScenarioHost};
//!
//! let scenario = Scenario::from_path(Path::new("demo.json"))?;
//! let host = Arc::new(ScenarioHost::new(scenario));
//! let mut service = FlyoverService::new(host, options);
//! ```

use std::path::Path;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::{FlyoverOptions, Vehicle, ViewState};
use crate::geo::{haversine_meters, lerp_point, LonLat};
use crate::host::CameraHost;

/// Scenario loading/validation failures.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),

    /// The scenario file is not valid JSON for the scenario schema.
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    /// A scenario needs at least one waypoint to tour.
    #[error("scenario has no waypoints")]
    NoWaypoints,

    /// Every vehicle needs at least one path point.
    #[error("vehicle {0} has an empty path")]
    EmptyVehiclePath(String),

    /// Scripted speeds must be positive.
    #[error("vehicle {0} has non-positive speed")]
    InvalidSpeed(String),
}

/// A scripted vehicle: a polyline path travelled at constant speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTrack {
    /// Feed id.
    pub id: String,
    /// Path points as `[lon, lat]` pairs. The vehicle wraps back to the
    /// start after the last point.
    pub path: Vec<LonLat>,
    /// Travel speed in meters/second.
    pub speed_mps: f64,
}

impl VehicleTrack {
    /// Total path length in meters.
    pub fn path_meters(&self) -> f64 {
        self.path
            .windows(2)
            .map(|leg| haversine_meters(leg[0], leg[1]))
            .sum()
    }

    /// Position after travelling for `elapsed` at the scripted speed.
    ///
    /// Single-point paths and zero-length paths pin the vehicle to the
    /// first point; otherwise distance wraps around the path total.
    pub fn position_at(&self, elapsed: Duration) -> LonLat {
        let first = self.path[0];
        if self.path.len() < 2 || self.speed_mps <= 0.0 {
            return first;
        }
        let total = self.path_meters();
        if total <= 0.0 {
            return first;
        }

        let mut travelled = (self.speed_mps * elapsed.as_secs_f64()) % total;
        for leg in self.path.windows(2) {
            let length = haversine_meters(leg[0], leg[1]);
            if travelled <= length && length > 0.0 {
                return lerp_point(leg[0], leg[1], travelled / length);
            }
            travelled -= length;
        }
        self.path[self.path.len() - 1]
    }
}

/// A synthetic world for headless flyover runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Display name.
    pub name: String,
    /// Tour waypoints as `[lon, lat]` pairs.
    pub waypoints: Vec<LonLat>,
    /// Scripted vehicles. Empty means the host exposes no vehicle feed.
    #[serde(default)]
    pub vehicles: Vec<VehicleTrack>,
    /// Flyover options to run the scenario with.
    #[serde(default)]
    pub options: FlyoverOptions,
}

impl Scenario {
    /// Load and validate a scenario from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate a scenario from a JSON string.
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.waypoints.is_empty() {
            return Err(ScenarioError::NoWaypoints);
        }
        for vehicle in &self.vehicles {
            if vehicle.path.is_empty() {
                return Err(ScenarioError::EmptyVehiclePath(vehicle.id.clone()));
            }
            if vehicle.speed_mps <= 0.0 {
                return Err(ScenarioError::InvalidSpeed(vehicle.id.clone()));
            }
        }
        Ok(())
    }
}

/// A [`CameraHost`] that plays a scenario forward in real time.
///
/// Vehicles advance along their scripted paths from the moment the host
/// is created; the camera pose starts at the first waypoint.
pub struct ScenarioHost {
    scenario: Scenario,
    epoch: Instant,
    view: Mutex<ViewState>,
}

impl ScenarioHost {
    /// Create a host with the epoch set to now.
    pub fn new(scenario: Scenario) -> Self {
        Self::with_epoch(scenario, Instant::now())
    }

    /// Create a host with an explicit epoch (for testing).
    pub fn with_epoch(scenario: Scenario, epoch: Instant) -> Self {
        let initial = match scenario.waypoints.first() {
            Some(wp) => ViewState::new(
                wp[1],
                wp[0],
                scenario.options.base_zoom,
                0.0,
                scenario.options.base_pitch,
            ),
            None => ViewState::default(),
        };
        Self {
            scenario,
            epoch,
            view: Mutex::new(initial),
        }
    }

    /// The scenario being played.
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Vehicle fixes at a given elapsed time since the epoch.
    pub fn vehicles_at(&self, elapsed: Duration) -> Option<Vec<Vehicle>> {
        if self.scenario.vehicles.is_empty() {
            return None;
        }
        Some(
            self.scenario
                .vehicles
                .iter()
                .map(|track| Vehicle::new(track.id.clone(), track.position_at(elapsed)))
                .collect(),
        )
    }
}

impl CameraHost for ScenarioHost {
    fn waypoints(&self) -> Vec<LonLat> {
        self.scenario.waypoints.clone()
    }

    fn view_state(&self) -> ViewState {
        *self.view.lock()
    }

    fn set_view_state(&self, view: ViewState) {
        *self.view.lock() = view;
    }

    fn vehicles(&self) -> Option<Vec<Vehicle>> {
        self.vehicles_at(self.epoch.elapsed())
    }
}
