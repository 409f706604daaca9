//! Host collaborator seam.
//!
//! The controller owns no map widget, renderer, or telemetry feed — the
//! surrounding map component supplies all three through this trait. The
//! controller is the sole writer of the view state; hosts expose it
//! through interior mutability and treat it as read-only everywhere else.

use crate::camera::{Vehicle, ViewState};
use crate::geo::LonLat;

/// Collaborators supplied by the surrounding map component.
///
/// Implementations must be cheap to query: every method is called from
/// the frame loop. The waypoint list is re-fetched at the start of every
/// segment, so external updates (partitions changing, clusters moving)
/// are picked up without restarting the controller.
pub trait CameraHost: Send + Sync {
    /// Ordered tour waypoints as `[lon, lat]` pairs.
    fn waypoints(&self) -> Vec<LonLat>;

    /// The camera pose currently shown by the renderer.
    fn view_state(&self) -> ViewState;

    /// Hand the renderer a new camera pose. Called at most once per tick,
    /// always with a complete pose.
    fn set_view_state(&self, view: ViewState);

    /// Live vehicle fixes, if the host has a telemetry feed.
    ///
    /// Returning `None` gracefully disables follow-by-id, chase, and the
    /// auto-follow heuristic.
    fn vehicles(&self) -> Option<Vec<Vehicle>> {
        None
    }
}
