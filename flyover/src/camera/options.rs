//! Flyover configuration.
//!
//! Options are fixed at construction and never mutated by the controller.
//! Durations are plain milliseconds so the struct deserializes cleanly
//! from config files; accessors expose them as [`Duration`].
//!
//! Degenerate values are clamped, not rejected: a zero hop duration would
//! divide by zero in progress calculations, so [`FlyoverOptions::sanitized`]
//! floors every duration and clamps probabilities before the controller
//! stores the options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default per-segment flight time.
const DEFAULT_HOP_DURATION_MS: u64 = 4_000;

/// Default pause at each waypoint.
const DEFAULT_DWELL_MS: u64 = 800;

/// Default touring zoom level.
const DEFAULT_BASE_ZOOM: f64 = 13.0;

/// Default camera pitch in degrees.
const DEFAULT_BASE_PITCH: f64 = 45.0;

/// Default zoom-in pulse amplitude across a hop.
const DEFAULT_ZOOM_PULSE: f64 = 1.2;

/// Default per-segment duration jitter (±fraction).
const DEFAULT_DURATION_JITTER: f64 = 0.2;

/// Default probability of a speed burst on a segment.
const DEFAULT_BURST_PROBABILITY: f64 = 0.15;

/// Default speed multiplier applied during a burst.
const DEFAULT_BURST_FACTOR: f64 = 1.8;

/// Default auto-follow sampling interval.
const DEFAULT_AUTO_FOLLOW_INTERVAL_MS: u64 = 5_000;

/// Default length of an auto-triggered follow episode.
const DEFAULT_AUTO_FOLLOW_DURATION_MS: u64 = 8_000;

/// Default minimum speed for a vehicle to qualify for auto-follow.
const DEFAULT_MIN_FOLLOW_SPEED_MPS: f64 = 2.0;

/// Default frame interval for the service driver (~60 fps).
const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Floor applied to every animated duration. One frame: anything shorter
/// would complete before its first tick and break progress math.
const MIN_DURATION_MS: u64 = 16;

/// Floor for the sampler interval; sampling faster than this is frame-rate
/// territory, which the heuristic is explicitly not.
const MIN_SAMPLE_INTERVAL_MS: u64 = 250;

/// Immutable flyover configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyoverOptions {
    /// Base duration of one waypoint hop, milliseconds.
    pub hop_duration_ms: u64,
    /// Pause at each waypoint before starting the next hop, milliseconds.
    /// Zero disables dwelling.
    pub dwell_ms: u64,
    /// Zoom level the tour flies at.
    pub base_zoom: f64,
    /// Camera pitch in degrees.
    pub base_pitch: f64,
    /// Rotate the camera toward each hop's direction of travel.
    pub bearing_follow: bool,
    /// Restart from waypoint 0 after the last waypoint.
    pub loop_tour: bool,
    /// Amplitude of the zoom-in pulse peaking mid-hop. Zero disables it.
    pub zoom_pulse: f64,
    /// Per-segment duration jitter as a ±fraction of the hop duration.
    pub duration_jitter: f64,
    /// Probability that a segment flies at burst speed.
    pub burst_probability: f64,
    /// Speed multiplier for burst segments (shortens the hop).
    pub burst_factor: f64,
    /// Enable the auto-follow heuristic.
    pub auto_follow: bool,
    /// Auto-follow sampling interval, milliseconds.
    pub auto_follow_interval_ms: u64,
    /// Length of an auto-triggered follow episode, milliseconds.
    pub auto_follow_duration_ms: u64,
    /// Minimum estimated speed for auto-follow candidacy, meters/second.
    pub min_follow_speed_mps: f64,
    /// Zoom override while following; `None` keeps the base zoom.
    pub follow_zoom: Option<f64>,
    /// Pitch override while following; `None` keeps the base pitch.
    pub follow_pitch: Option<f64>,
    /// Frame interval for the service driver, milliseconds.
    pub frame_interval_ms: u64,
}

impl Default for FlyoverOptions {
    fn default() -> Self {
        Self {
            hop_duration_ms: DEFAULT_HOP_DURATION_MS,
            dwell_ms: DEFAULT_DWELL_MS,
            base_zoom: DEFAULT_BASE_ZOOM,
            base_pitch: DEFAULT_BASE_PITCH,
            bearing_follow: true,
            loop_tour: true,
            zoom_pulse: DEFAULT_ZOOM_PULSE,
            duration_jitter: DEFAULT_DURATION_JITTER,
            burst_probability: DEFAULT_BURST_PROBABILITY,
            burst_factor: DEFAULT_BURST_FACTOR,
            auto_follow: true,
            auto_follow_interval_ms: DEFAULT_AUTO_FOLLOW_INTERVAL_MS,
            auto_follow_duration_ms: DEFAULT_AUTO_FOLLOW_DURATION_MS,
            min_follow_speed_mps: DEFAULT_MIN_FOLLOW_SPEED_MPS,
            follow_zoom: None,
            follow_pitch: None,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl FlyoverOptions {
    /// Return a copy with degenerate values clamped into safe ranges.
    ///
    /// Durations are floored (never zero), jitter is kept below 1 so a
    /// jittered duration stays positive, probabilities are clamped to
    /// `[0, 1]`, and the burst factor never slows a segment down.
    pub fn sanitized(&self) -> Self {
        let mut opts = self.clone();
        opts.hop_duration_ms = opts.hop_duration_ms.max(MIN_DURATION_MS);
        opts.auto_follow_duration_ms = opts.auto_follow_duration_ms.max(MIN_DURATION_MS);
        opts.auto_follow_interval_ms = opts.auto_follow_interval_ms.max(MIN_SAMPLE_INTERVAL_MS);
        opts.frame_interval_ms = opts.frame_interval_ms.max(1);
        opts.duration_jitter = opts.duration_jitter.clamp(0.0, 0.9);
        opts.burst_probability = opts.burst_probability.clamp(0.0, 1.0);
        opts.burst_factor = opts.burst_factor.max(1.0);
        opts.zoom_pulse = opts.zoom_pulse.max(0.0);
        opts.min_follow_speed_mps = opts.min_follow_speed_mps.max(0.0);
        opts
    }

    /// Base hop duration.
    pub fn hop_duration(&self) -> Duration {
        Duration::from_millis(self.hop_duration_ms)
    }

    /// Dwell pause at each waypoint.
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    /// Auto-follow sampling interval.
    pub fn auto_follow_interval(&self) -> Duration {
        Duration::from_millis(self.auto_follow_interval_ms)
    }

    /// Auto-follow episode length.
    pub fn auto_follow_duration(&self) -> Duration {
        Duration::from_millis(self.auto_follow_duration_ms)
    }

    /// Service driver frame interval.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Per-episode follow override, supplied with [`follow`] calls.
///
/// [`follow`]: crate::camera::FlyoverCamera::follow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowRequest {
    /// Episode length, milliseconds.
    pub duration_ms: u64,
    /// Zoom override; `None` falls back to the options' follow zoom,
    /// then the base zoom.
    pub zoom: Option<f64>,
    /// Pitch override; `None` falls back like zoom.
    pub pitch: Option<f64>,
}

impl FollowRequest {
    /// A follow request of the given length with no pose overrides.
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            zoom: None,
            pitch: None,
        }
    }

    /// Set the zoom override.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// Set the pitch override.
    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = Some(pitch);
        self
    }

    /// Episode duration, floored to the minimum animated duration.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms.max(MIN_DURATION_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_already_sane() {
        let opts = FlyoverOptions::default();
        assert_eq!(opts, opts.sanitized());
    }

    #[test]
    fn test_sanitized_floors_zero_durations() {
        let opts = FlyoverOptions {
            hop_duration_ms: 0,
            auto_follow_duration_ms: 0,
            auto_follow_interval_ms: 0,
            frame_interval_ms: 0,
            ..Default::default()
        }
        .sanitized();

        assert!(opts.hop_duration_ms >= MIN_DURATION_MS);
        assert!(opts.auto_follow_duration_ms >= MIN_DURATION_MS);
        assert!(opts.auto_follow_interval_ms >= MIN_SAMPLE_INTERVAL_MS);
        assert!(opts.frame_interval_ms >= 1);
    }

    #[test]
    fn test_sanitized_clamps_jitter_and_probability() {
        let opts = FlyoverOptions {
            duration_jitter: 3.0,
            burst_probability: -0.5,
            burst_factor: 0.2,
            zoom_pulse: -1.0,
            min_follow_speed_mps: -4.0,
            ..Default::default()
        }
        .sanitized();

        assert!(opts.duration_jitter <= 0.9);
        assert_eq!(opts.burst_probability, 0.0);
        assert!(opts.burst_factor >= 1.0);
        assert_eq!(opts.zoom_pulse, 0.0);
        assert_eq!(opts.min_follow_speed_mps, 0.0);
    }

    #[test]
    fn test_deserializes_from_partial_json() {
        let opts: FlyoverOptions =
            serde_json::from_str(r#"{"hop_duration_ms": 2500, "loop_tour": false}"#).unwrap();
        assert_eq!(opts.hop_duration_ms, 2_500);
        assert!(!opts.loop_tour);
        // Unspecified fields fall back to defaults
        assert_eq!(opts.base_zoom, DEFAULT_BASE_ZOOM);
    }

    #[test]
    fn test_follow_request_builder() {
        let request = FollowRequest::new(4_000).with_zoom(15.0).with_pitch(60.0);
        assert_eq!(request.duration(), Duration::from_millis(4_000));
        assert_eq!(request.zoom, Some(15.0));
        assert_eq!(request.pitch, Some(60.0));
    }

    #[test]
    fn test_follow_request_duration_floor() {
        let request = FollowRequest::new(0);
        assert!(request.duration() >= Duration::from_millis(MIN_DURATION_MS));
    }
}
