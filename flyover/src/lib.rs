//! Flyover - cinematic camera control for live map dashboards
//!
//! This library drives a virtual camera's geographic position, zoom,
//! bearing and pitch over time: touring a set of waypoints, temporarily
//! following externally supplied positions, chasing selected vehicles,
//! and autonomously deciding when a moving vehicle deserves the
//! spotlight. The renderer, waypoint source and vehicle feed are
//! collaborators supplied by the embedding map component.

pub mod camera;
pub mod geo;
pub mod host;
pub mod scenario;
pub mod service;
pub mod track;

pub use camera::{
    FlyoverCamera, FlyoverOptions, FlyoverStatus, FollowRequest, FollowTarget, ModeKind, Vehicle,
    ViewState,
};
pub use host::CameraHost;
pub use service::FlyoverService;
