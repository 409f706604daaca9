//! Per-mode pose computation.
//!
//! All functions here are pure with respect to time: the caller passes
//! `now` explicitly, so the math is testable against synthetic clocks.
//! Randomness (duration jitter, speed bursts) is sampled exactly once per
//! segment from the caller's RNG, never per frame, so a hop's speed is
//! fixed for its whole flight.

use std::f64::consts::PI;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::camera::options::FlyoverOptions;
use crate::camera::view::ViewState;
use crate::geo::{
    bearing_between, ease_in_out, lerp_point, normalize_bearing, shortest_angle_diff, LonLat,
};

/// Floor for a jittered/burst segment duration. Anything shorter would
/// complete before its first frame.
const MIN_SEGMENT_MS: u64 = 16;

/// Per-frame smoothing constant for chase mode.
///
/// One-pole low-pass, not time-corrected: the camera covers this fraction
/// of the remaining distance each frame regardless of frame rate.
pub const CHASE_SMOOTHING: f64 = 0.15;

/// One animated hop from the camera's position toward a waypoint.
///
/// Captured once at segment start: the origin (live camera position at
/// that instant), the destination waypoint, the bearing sweep, and a
/// duration with jitter and an optional speed burst already applied.
#[derive(Debug, Clone)]
pub struct SegmentAnim {
    /// Origin position, the live camera position at segment start.
    pub from: LonLat,
    /// Destination waypoint.
    pub to: LonLat,
    /// Bearing at segment start.
    pub start_bearing: f64,
    /// Bearing to sweep toward across the hop.
    pub target_bearing: f64,
    /// When the hop started.
    pub started_at: Instant,
    /// Total flight time for this hop.
    pub duration: Duration,
    /// End of the dwell pause at the destination, once the hop completes.
    pub dwell_until: Option<Instant>,
}

impl SegmentAnim {
    /// Begin a hop from the current camera pose toward `to`.
    ///
    /// Duration is `hop × (1 ± jitter)`, divided by the burst factor with
    /// `burst_probability`, floored at one frame. Both random draws happen
    /// here, once, so the hop's speed never changes mid-flight.
    pub fn begin(
        view: &ViewState,
        to: LonLat,
        opts: &FlyoverOptions,
        rng: &mut impl Rng,
        now: Instant,
    ) -> Self {
        let from = view.position();

        let jitter = if opts.duration_jitter > 0.0 {
            rng.random_range(-opts.duration_jitter..=opts.duration_jitter)
        } else {
            0.0
        };
        let mut duration_ms = opts.hop_duration_ms as f64 * (1.0 + jitter);
        if opts.burst_probability > 0.0 && rng.random::<f64>() < opts.burst_probability {
            duration_ms /= opts.burst_factor;
        }
        let duration = Duration::from_millis((duration_ms as u64).max(MIN_SEGMENT_MS));

        let start_bearing = normalize_bearing(view.bearing);
        let target_bearing = if opts.bearing_follow && from != to {
            bearing_between(from, to)
        } else {
            start_bearing
        };

        Self {
            from,
            to,
            start_bearing,
            target_bearing,
            started_at: now,
            duration,
            dwell_until: None,
        }
    }

    /// Raw progress `t ∈ [0, 1]` at `now`.
    pub fn progress(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Whether the hop has reached its destination.
    pub fn is_complete(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// The camera pose at `now`.
    ///
    /// Position and bearing follow eased progress; zoom rides a sine
    /// pulse peaking at the hop's midpoint; pitch stays at base.
    pub fn pose_at(&self, now: Instant, opts: &FlyoverOptions) -> ViewState {
        let k = ease_in_out(self.progress(now));
        let position = lerp_point(self.from, self.to, k);
        let bearing = normalize_bearing(
            self.start_bearing + shortest_angle_diff(self.start_bearing, self.target_bearing) * k,
        );
        let zoom = opts.base_zoom + opts.zoom_pulse * (PI * k).sin();

        ViewState {
            latitude: position[1],
            longitude: position[0],
            zoom,
            bearing,
            pitch: opts.base_pitch,
        }
    }
}

/// Follow-mode pose: track the target position directly.
///
/// Bearing points from the previous camera position to the new target
/// position, so it reflects the override's actual direction of travel.
/// A target coincident with the camera keeps the previous bearing.
pub fn follow_pose(current: &ViewState, target: LonLat, zoom: f64, pitch: f64) -> ViewState {
    let bearing = if current.position() == target {
        normalize_bearing(current.bearing)
    } else {
        bearing_between(current.position(), target)
    };

    ViewState {
        latitude: target[1],
        longitude: target[0],
        zoom,
        bearing,
        pitch,
    }
}

/// Chase-mode pose: exponentially approach the target.
///
/// Position covers [`CHASE_SMOOTHING`] of the remaining distance this
/// frame; bearing is low-passed toward the instantaneous travel bearing
/// through the shortest angular path.
pub fn chase_pose(current: &ViewState, target: LonLat, zoom: f64, pitch: f64) -> ViewState {
    let position = lerp_point(current.position(), target, CHASE_SMOOTHING);
    let travel_bearing = if current.position() == target {
        normalize_bearing(current.bearing)
    } else {
        bearing_between(current.position(), target)
    };
    let bearing = normalize_bearing(
        current.bearing + CHASE_SMOOTHING * shortest_angle_diff(current.bearing, travel_bearing),
    );

    ViewState {
        latitude: position[1],
        longitude: position[0],
        zoom,
        bearing,
        pitch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn deterministic_opts() -> FlyoverOptions {
        FlyoverOptions {
            hop_duration_ms: 1_000,
            duration_jitter: 0.0,
            burst_probability: 0.0,
            dwell_ms: 0,
            zoom_pulse: 2.0,
            base_zoom: 13.0,
            base_pitch: 45.0,
            ..Default::default()
        }
        .sanitized()
    }

    fn view_at(position: LonLat, bearing: f64) -> ViewState {
        ViewState::new(position[1], position[0], 13.0, bearing, 45.0)
    }

    mod segment {
        use super::*;

        #[test]
        fn test_begin_targets_waypoint() {
            let opts = deterministic_opts();
            let mut rng = SmallRng::seed_from_u64(7);
            let now = Instant::now();

            let seg = SegmentAnim::begin(&view_at([10.0, 60.0], 0.0), [11.0, 60.0], &opts, &mut rng, now);
            assert_eq!(seg.from, [10.0, 60.0]);
            assert_eq!(seg.to, [11.0, 60.0]);
            assert_eq!(seg.duration, Duration::from_millis(1_000));
        }

        #[test]
        fn test_pose_reaches_destination_exactly() {
            let opts = deterministic_opts();
            let mut rng = SmallRng::seed_from_u64(7);
            let now = Instant::now();

            let seg = SegmentAnim::begin(&view_at([10.0, 60.0], 0.0), [11.0, 61.0], &opts, &mut rng, now);
            let end = seg.pose_at(now + Duration::from_millis(1_000), &opts);
            assert!((end.longitude - 11.0).abs() < 1e-12);
            assert!((end.latitude - 61.0).abs() < 1e-12);
            assert!(seg.is_complete(now + Duration::from_millis(1_000)));
        }

        #[test]
        fn test_progress_clamped_past_duration() {
            let opts = deterministic_opts();
            let mut rng = SmallRng::seed_from_u64(7);
            let now = Instant::now();

            let seg = SegmentAnim::begin(&view_at([10.0, 60.0], 0.0), [11.0, 60.0], &opts, &mut rng, now);
            assert_eq!(seg.progress(now + Duration::from_secs(10)), 1.0);
            // Before start (scheduler jitter) clamps to zero, not negative
            assert_eq!(seg.progress(now), 0.0);
        }

        #[test]
        fn test_zoom_pulse_peaks_mid_hop() {
            let opts = deterministic_opts();
            let mut rng = SmallRng::seed_from_u64(7);
            let now = Instant::now();

            let seg = SegmentAnim::begin(&view_at([10.0, 60.0], 0.0), [11.0, 60.0], &opts, &mut rng, now);
            let start = seg.pose_at(now, &opts).zoom;
            let mid = seg.pose_at(now + Duration::from_millis(500), &opts).zoom;
            let end = seg.pose_at(now + Duration::from_millis(1_000), &opts).zoom;

            assert!((start - opts.base_zoom).abs() < 1e-9);
            assert!((end - opts.base_zoom).abs() < 1e-9);
            assert!((mid - (opts.base_zoom + opts.zoom_pulse)).abs() < 1e-9);
        }

        #[test]
        fn test_bearing_sweeps_short_way_across_north() {
            let opts = deterministic_opts();
            let mut rng = SmallRng::seed_from_u64(7);
            let now = Instant::now();

            // Start bearing 350°, destination north-east of origin (~45°):
            // the sweep should pass through 0°, never near 180°.
            let mut seg =
                SegmentAnim::begin(&view_at([10.0, 60.0], 350.0), [10.1, 60.1], &opts, &mut rng, now);
            seg.target_bearing = 10.0;

            let mid = seg.pose_at(now + Duration::from_millis(500), &opts).bearing;
            let dist_from_north = shortest_angle_diff(mid, 0.0).abs();
            assert!(
                dist_from_north < 15.0,
                "mid-sweep bearing {} strayed from the short path",
                mid
            );
        }

        #[test]
        fn test_bearing_held_when_bearing_follow_disabled() {
            let opts = FlyoverOptions {
                bearing_follow: false,
                ..deterministic_opts()
            };
            let mut rng = SmallRng::seed_from_u64(7);
            let now = Instant::now();

            let seg = SegmentAnim::begin(&view_at([10.0, 60.0], 42.0), [11.0, 61.0], &opts, &mut rng, now);
            assert_eq!(seg.target_bearing, 42.0);
            let mid = seg.pose_at(now + Duration::from_millis(500), &opts);
            assert!((mid.bearing - 42.0).abs() < 1e-9);
        }

        #[test]
        fn test_burst_shortens_duration() {
            let opts = FlyoverOptions {
                burst_probability: 1.0,
                burst_factor: 2.0,
                ..deterministic_opts()
            };
            let mut rng = SmallRng::seed_from_u64(7);
            let now = Instant::now();

            let seg = SegmentAnim::begin(&view_at([10.0, 60.0], 0.0), [11.0, 60.0], &opts, &mut rng, now);
            assert_eq!(seg.duration, Duration::from_millis(500));
        }

        #[test]
        fn test_duration_jitter_stays_in_band() {
            let opts = FlyoverOptions {
                duration_jitter: 0.25,
                ..deterministic_opts()
            };
            let now = Instant::now();

            for seed in 0..50 {
                let mut rng = SmallRng::seed_from_u64(seed);
                let seg =
                    SegmentAnim::begin(&view_at([10.0, 60.0], 0.0), [11.0, 60.0], &opts, &mut rng, now);
                let ms = seg.duration.as_millis() as f64;
                assert!(
                    (750.0..=1250.0).contains(&ms),
                    "seed {}: duration {}ms outside jitter band",
                    seed,
                    ms
                );
            }
        }

        #[test]
        fn test_degenerate_duration_floored() {
            let opts = FlyoverOptions {
                hop_duration_ms: 16,
                burst_probability: 1.0,
                burst_factor: 100.0,
                duration_jitter: 0.0,
                ..Default::default()
            }
            .sanitized();
            let mut rng = SmallRng::seed_from_u64(7);

            let seg = SegmentAnim::begin(
                &view_at([10.0, 60.0], 0.0),
                [11.0, 60.0],
                &opts,
                &mut rng,
                Instant::now(),
            );
            assert!(seg.duration >= Duration::from_millis(MIN_SEGMENT_MS));
        }
    }

    mod follow {
        use super::*;

        #[test]
        fn test_tracks_target_directly() {
            let current = view_at([10.0, 60.0], 0.0);
            let pose = follow_pose(&current, [10.5, 60.5], 15.0, 60.0);
            assert_eq!(pose.longitude, 10.5);
            assert_eq!(pose.latitude, 60.5);
            assert_eq!(pose.zoom, 15.0);
            assert_eq!(pose.pitch, 60.0);
        }

        #[test]
        fn test_bearing_reflects_travel_direction() {
            let current = view_at([10.0, 60.0], 0.0);
            // Target due north of the camera: travel bearing 90° in the
            // planar convention.
            let pose = follow_pose(&current, [10.0, 60.5], 13.0, 45.0);
            assert!((pose.bearing - 90.0).abs() < 1e-9);
        }

        #[test]
        fn test_coincident_target_keeps_bearing() {
            let current = view_at([10.0, 60.0], 123.0);
            let pose = follow_pose(&current, [10.0, 60.0], 13.0, 45.0);
            assert_eq!(pose.bearing, 123.0);
        }
    }

    mod chase {
        use super::*;

        #[test]
        fn test_position_approaches_exponentially() {
            let mut view = view_at([10.0, 60.0], 0.0);
            let target = [11.0, 60.0];

            let mut last_distance = f64::INFINITY;
            for _ in 0..20 {
                view = chase_pose(&view, target, 13.0, 45.0);
                let distance = (target[0] - view.longitude).abs();
                assert!(distance < last_distance, "chase must close in every frame");
                last_distance = distance;
            }
            // One-pole low-pass never quite arrives
            assert!(last_distance > 0.0);
            assert!(last_distance < 0.1);
        }

        #[test]
        fn test_bearing_smoothed_not_snapped() {
            let view = view_at([10.0, 60.0], 0.0);
            // Target due north: travel bearing 90°
            let pose = chase_pose(&view, [10.0, 61.0], 13.0, 45.0);
            assert!(pose.bearing > 0.0);
            assert!(
                pose.bearing < 90.0,
                "bearing {} should move partway toward 90°",
                pose.bearing
            );
            assert!((pose.bearing - CHASE_SMOOTHING * 90.0).abs() < 1e-9);
        }

        #[test]
        fn test_coincident_target_holds_pose_direction() {
            let view = view_at([10.0, 60.0], 77.0);
            let pose = chase_pose(&view, [10.0, 60.0], 13.0, 45.0);
            assert_eq!(pose.longitude, 10.0);
            assert_eq!(pose.latitude, 60.0);
            assert!((pose.bearing - 77.0).abs() < 1e-9);
        }
    }
}
