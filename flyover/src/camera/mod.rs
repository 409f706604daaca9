//! Camera flyover core: pose types, options, mode arbitration, animation.
//!
//! # Architecture
//!
//! ```text
//! CameraHost ──waypoints/vehicles──► FlyoverCamera ──tick(now)──► ViewState
//!                                        │
//!                    CameraMode (Segment | Follow | Chase)
//!                                        │
//!                        animator (pose math, pure in time)
//! ```
//!
//! `FlyoverCamera` is synchronous and clock-agnostic; the tokio driver in
//! [`crate::service`] supplies real time, tests supply synthetic time.

mod animator;
mod controller;
mod mode;
mod options;
mod view;

pub use animator::{chase_pose, follow_pose, SegmentAnim, CHASE_SMOOTHING};
pub use controller::{FlyoverCamera, FlyoverStatus};
pub use mode::{CameraMode, ChaseState, FollowState, FollowTarget, ModeKind};
pub use options::{FlyoverOptions, FollowRequest};
pub use view::{Vehicle, ViewState};
