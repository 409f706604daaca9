//! Camera mode arbitration types.
//!
//! The three behaviors competing for the camera are represented as one
//! tagged union, so exactly one is authoritative for any tick and the
//! precedence rule (Chase > Follow > Segment) is enforced by construction
//! rather than by scattered boolean flags.
//!
//! # State machine
//!
//! ```text
//! Segment --follow()----------------> Follow   (timed)
//! Segment --set_chase_vehicle(id)---> Chase    (persistent)
//! Follow  --deadline reached--------> Segment  (same waypoint index)
//! Follow  --set_chase_vehicle(id)---> Chase    (follow timer dies)
//! Chase   --follow()----------------> Follow   (chase cleared)
//! Chase   --set_chase_vehicle(None)-> Segment
//! Chase   --cycle past last---------> Segment  (escape hatch)
//! ```

use std::time::Instant;

use crate::geo::LonLat;

/// Resolves the position a follow episode tracks.
///
/// Either a caller-supplied getter (external override) or a vehicle id
/// resolved against the host's feed every tick (auto-follow and
/// follow-by-id). A `None` from either source means "target unknown this
/// tick" and holds the camera in place.
pub enum FollowTarget {
    /// Caller-supplied position getter, re-read every tick.
    Position(Box<dyn Fn() -> Option<LonLat> + Send + Sync>),
    /// A vehicle id looked up in the host's feed every tick.
    Vehicle(String),
}

impl FollowTarget {
    /// Build a target from a position getter closure.
    pub fn position<F>(getter: F) -> Self
    where
        F: Fn() -> Option<LonLat> + Send + Sync + 'static,
    {
        Self::Position(Box::new(getter))
    }

    /// Build a target tracking a vehicle id.
    pub fn vehicle(id: impl Into<String>) -> Self {
        Self::Vehicle(id.into())
    }
}

impl std::fmt::Debug for FollowTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FollowTarget::Position(_) => f.write_str("FollowTarget::Position(..)"),
            FollowTarget::Vehicle(id) => write!(f, "FollowTarget::Vehicle({id})"),
        }
    }
}

/// Active state of a timed follow override.
#[derive(Debug)]
pub struct FollowState {
    /// What the camera is tracking.
    pub target: FollowTarget,
    /// Wall-clock deadline; the override expires at this instant.
    pub ends_at: Instant,
    /// Zoom override for the episode.
    pub zoom: Option<f64>,
    /// Pitch override for the episode.
    pub pitch: Option<f64>,
}

/// Active state of a persistent chase.
#[derive(Debug, Clone)]
pub struct ChaseState {
    /// The chased vehicle's feed id.
    pub vehicle_id: String,
}

/// The single authoritative camera behavior.
#[derive(Debug, Default)]
pub enum CameraMode {
    /// Default waypoint touring.
    #[default]
    Segment,
    /// Timed follow override.
    Follow(FollowState),
    /// Persistent chase of a selected vehicle.
    Chase(ChaseState),
}

impl CameraMode {
    /// The discriminant, for status reporting and logging.
    pub fn kind(&self) -> ModeKind {
        match self {
            CameraMode::Segment => ModeKind::Segment,
            CameraMode::Follow(_) => ModeKind::Follow,
            CameraMode::Chase(_) => ModeKind::Chase,
        }
    }

    /// Whether the default touring behavior is active.
    pub fn is_segment(&self) -> bool {
        matches!(self, CameraMode::Segment)
    }
}

/// Mode discriminant without the per-mode payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeKind {
    /// Waypoint touring.
    #[default]
    Segment,
    /// Timed follow override.
    Follow,
    /// Persistent chase.
    Chase,
}

impl ModeKind {
    /// Short name for logging/UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeKind::Segment => "segment",
            ModeKind::Follow => "follow",
            ModeKind::Chase => "chase",
        }
    }
}

impl std::fmt::Display for ModeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
