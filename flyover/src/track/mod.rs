//! Vehicle movement estimation for the auto-follow heuristic.
//!
//! Runs on a coarse sampling interval, independent of the frame rate:
//! instantaneous speed is derived from successive position fixes, which
//! tolerates noisy telemetry far better than per-frame deltas would.

mod sampler;

pub use sampler::{MovementSampler, MovingVehicle};
