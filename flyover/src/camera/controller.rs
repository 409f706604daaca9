//! The flyover controller core.
//!
//! `FlyoverCamera` is a synchronous state object: one `tick(now)` method
//! advances whichever mode is authoritative, and one `sample(now)` method
//! runs the auto-follow heuristic. All time is passed in explicitly, so
//! the core is agnostic to the frame-scheduling primitive driving it —
//! the tokio driver in [`crate::service`], a game loop, or a test with a
//! synthetic clock.
//!
//! # Mode arbitration
//!
//! Precedence per tick is Chase > Follow > Segment, enforced by the
//! single [`CameraMode`] value: `follow()` replaces any chase,
//! `set_chase_vehicle()` replaces any follow, and a follow deadline
//! reverts to segment touring at the current waypoint index. The mode is
//! re-read at every tick start, so a transition requested between frames
//! takes effect on the very next frame, never after the segment finishes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::camera::animator::{self, SegmentAnim};
use crate::camera::mode::{CameraMode, ChaseState, FollowState, FollowTarget, ModeKind};
use crate::camera::options::{FlyoverOptions, FollowRequest};
use crate::geo::LonLat;
use crate::host::CameraHost;
use crate::track::MovementSampler;

/// Point-in-time controller status, for UIs and logs.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyoverStatus {
    /// Whether the controller is running.
    pub running: bool,
    /// The authoritative mode.
    pub mode: ModeKind,
    /// Current tour waypoint index.
    pub waypoint_index: usize,
    /// Chased vehicle id, if chasing.
    pub chase_vehicle: Option<String>,
    /// Time left on the follow override, if following.
    pub follow_remaining: Option<Duration>,
}

/// The camera flyover controller.
///
/// Owns all session state; collaborators (waypoints, view state, vehicle
/// feed) come from the injected [`CameraHost`]. Randomness is injected
/// too: [`FlyoverCamera::with_seed`] gives fully deterministic behavior
/// for tests.
pub struct FlyoverCamera {
    host: Arc<dyn CameraHost>,
    opts: FlyoverOptions,
    rng: SmallRng,
    running: bool,
    waypoint_index: usize,
    mode: CameraMode,
    segment: Option<SegmentAnim>,
    sampler: MovementSampler,
}

impl std::fmt::Debug for FlyoverCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlyoverCamera")
            .field("running", &self.running)
            .field("mode", &self.mode.kind())
            .field("waypoint_index", &self.waypoint_index)
            .field("has_segment", &self.segment.is_some())
            .finish()
    }
}

impl FlyoverCamera {
    /// Create a controller with an OS-seeded RNG.
    pub fn new(host: Arc<dyn CameraHost>, options: FlyoverOptions) -> Self {
        Self::with_rng(host, options, SmallRng::from_os_rng())
    }

    /// Create a controller with a seeded RNG for deterministic runs.
    pub fn with_seed(host: Arc<dyn CameraHost>, options: FlyoverOptions, seed: u64) -> Self {
        Self::with_rng(host, options, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(host: Arc<dyn CameraHost>, options: FlyoverOptions, rng: SmallRng) -> Self {
        let opts = options.sanitized();
        let sampler = MovementSampler::new(opts.min_follow_speed_mps);
        Self {
            host,
            opts,
            rng,
            running: false,
            waypoint_index: 0,
            mode: CameraMode::Segment,
            segment: None,
            sampler,
        }
    }

    /// The sanitized options this controller runs with.
    pub fn options(&self) -> &FlyoverOptions {
        &self.opts
    }

    /// Whether the tour is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin touring. No-op returning `false` when the waypoint list is
    /// empty; `true` (and a fresh session) otherwise. Calling on a
    /// running controller is a no-op returning `true`.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.running {
            return true;
        }
        self.reset_session();
        if !self.begin_segment(now) {
            tracing::debug!("start ignored - no waypoints");
            return false;
        }
        self.running = true;
        tracing::info!("Flyover started");
        true
    }

    /// Stop touring and reset session state to defaults.
    ///
    /// Idempotent; safe to call from any mode, at any point.
    pub fn stop(&mut self) {
        if self.running {
            tracing::info!("Flyover stopped");
        }
        self.running = false;
        self.reset_session();
    }

    fn reset_session(&mut self) {
        self.mode = CameraMode::Segment;
        self.segment = None;
        self.waypoint_index = 0;
        self.sampler.clear();
    }

    /// Advance the animation one frame.
    ///
    /// The sole producer of view-state writes: whichever mode is
    /// authoritative computes the full next pose and hands it to the
    /// host. Does nothing when stopped.
    pub fn tick(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        self.expire_follow(now);
        match self.mode.kind() {
            ModeKind::Segment => self.tick_segment(now),
            ModeKind::Follow => self.tick_follow(now),
            ModeKind::Chase => self.tick_chase(now),
        }
    }

    /// Engage a timed follow override, replacing any active chase.
    pub fn follow(&mut self, target: FollowTarget, request: FollowRequest, now: Instant) {
        if let CameraMode::Chase(chase) = &self.mode {
            tracing::debug!(vehicle = %chase.vehicle_id, "Chase cleared by follow override");
        }
        self.segment = None;
        self.mode = CameraMode::Follow(FollowState {
            target,
            ends_at: now + request.duration(),
            zoom: request.zoom.or(self.opts.follow_zoom),
            pitch: request.pitch.or(self.opts.follow_pitch),
        });
        tracing::debug!(duration_ms = request.duration_ms, "Follow override engaged");
    }

    /// Chase a vehicle until cleared, replacing any follow override.
    /// `None` clears an active chase back to segment touring.
    ///
    /// No-op when the host has no vehicle feed.
    pub fn set_chase_vehicle(&mut self, vehicle_id: Option<String>) {
        match vehicle_id {
            Some(id) => {
                if self.host.vehicles().is_none() {
                    tracing::debug!("No vehicle feed - chase unavailable");
                    return;
                }
                if matches!(self.mode, CameraMode::Follow(_)) {
                    tracing::debug!("Follow override cleared by chase");
                }
                tracing::info!(vehicle = %id, "Chase engaged");
                self.segment = None;
                self.mode = CameraMode::Chase(ChaseState { vehicle_id: id });
            }
            None => {
                if let CameraMode::Chase(chase) = &self.mode {
                    tracing::info!(vehicle = %chase.vehicle_id, "Chase cleared");
                    self.mode = CameraMode::Segment;
                    self.segment = None;
                }
            }
        }
    }

    /// Advance the chase through the vehicle roster in feed order.
    ///
    /// Not chasing ⇒ chase the first vehicle. Chasing the last vehicle
    /// (or one that left the feed) ⇒ clear the chase entirely rather
    /// than wrapping, returning control to the tour.
    pub fn cycle_chase_vehicle(&mut self) {
        let Some(vehicles) = self.host.vehicles() else {
            tracing::debug!("No vehicle feed - chase cycling unavailable");
            return;
        };
        if vehicles.is_empty() {
            return;
        }
        let next = match &self.mode {
            CameraMode::Chase(chase) => {
                match vehicles.iter().position(|v| v.id == chase.vehicle_id) {
                    Some(i) if i + 1 < vehicles.len() => Some(vehicles[i + 1].id.clone()),
                    _ => None,
                }
            }
            _ => Some(vehicles[0].id.clone()),
        };
        self.set_chase_vehicle(next);
    }

    /// Run one auto-follow sampling pass.
    ///
    /// Estimates each vehicle's speed over the last interval and, when
    /// touring, follows a random mover above the configured threshold.
    /// The last-seen table updates on every pass — including while an
    /// override is active — so estimates always span one interval; only
    /// the trigger is suppressed mid-cinematic.
    pub fn sample(&mut self, now: Instant) {
        if !self.running || !self.opts.auto_follow {
            return;
        }
        let Some(vehicles) = self.host.vehicles() else {
            return;
        };
        let movers = self.sampler.sample(&vehicles, now);
        if !self.mode.is_segment() || movers.is_empty() {
            return;
        }

        let choice = movers[self.rng.random_range(0..movers.len())].clone();
        tracing::debug!(
            vehicle = %choice.id,
            speed_mps = choice.speed_mps,
            candidates = movers.len(),
            "Auto-follow triggered"
        );
        self.follow(
            FollowTarget::vehicle(choice.id),
            FollowRequest::new(self.opts.auto_follow_duration_ms),
            now,
        );
    }

    /// A point-in-time status snapshot.
    pub fn status(&self, now: Instant) -> FlyoverStatus {
        let (chase_vehicle, follow_remaining) = match &self.mode {
            CameraMode::Chase(chase) => (Some(chase.vehicle_id.clone()), None),
            CameraMode::Follow(follow) => {
                (None, Some(follow.ends_at.saturating_duration_since(now)))
            }
            CameraMode::Segment => (None, None),
        };
        FlyoverStatus {
            running: self.running,
            mode: self.mode.kind(),
            waypoint_index: self.waypoint_index,
            chase_vehicle,
            follow_remaining,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Per-mode ticks
    // ─────────────────────────────────────────────────────────────────────

    fn expire_follow(&mut self, now: Instant) {
        if let CameraMode::Follow(follow) = &self.mode {
            if now >= follow.ends_at {
                tracing::debug!(
                    waypoint = self.waypoint_index,
                    "Follow override expired - resuming tour"
                );
                self.mode = CameraMode::Segment;
                // Next segment starts from the current camera position,
                // so there is no position jump on reversion.
                self.segment = None;
            }
        }
    }

    fn tick_segment(&mut self, now: Instant) {
        if self.segment.is_none() && !self.begin_segment(now) {
            self.stop();
            return;
        }
        let Some(segment) = &self.segment else {
            return;
        };

        if let Some(until) = segment.dwell_until {
            // Pose holds at the waypoint during the dwell
            if now >= until {
                self.advance_waypoint();
            }
            return;
        }

        let pose = segment.pose_at(now, &self.opts);
        let complete = segment.is_complete(now);
        self.host.set_view_state(pose);

        if complete {
            if self.opts.dwell_ms > 0 {
                if let Some(segment) = &mut self.segment {
                    segment.dwell_until = Some(now + self.opts.dwell());
                }
            } else {
                self.advance_waypoint();
            }
        }
    }

    fn tick_follow(&mut self, _now: Instant) {
        let CameraMode::Follow(follow) = &self.mode else {
            return;
        };
        let target = match &follow.target {
            FollowTarget::Position(getter) => getter(),
            FollowTarget::Vehicle(id) => self.lookup_vehicle(id),
        };
        let Some(position) = target else {
            // Target unknown this tick: hold the last pose, resume
            // transparently once it reappears.
            tracing::trace!("Follow target unresolved - holding pose");
            return;
        };
        let current = self.host.view_state();
        let zoom = follow.zoom.unwrap_or(self.opts.base_zoom);
        let pitch = follow.pitch.unwrap_or(self.opts.base_pitch);
        self.host
            .set_view_state(animator::follow_pose(&current, position, zoom, pitch));
    }

    fn tick_chase(&mut self, _now: Instant) {
        let CameraMode::Chase(chase) = &self.mode else {
            return;
        };
        let Some(position) = self.lookup_vehicle(&chase.vehicle_id) else {
            tracing::trace!(vehicle = %chase.vehicle_id, "Chase target missing - holding pose");
            return;
        };
        let current = self.host.view_state();
        let zoom = self.opts.follow_zoom.unwrap_or(self.opts.base_zoom);
        let pitch = self.opts.follow_pitch.unwrap_or(self.opts.base_pitch);
        self.host
            .set_view_state(animator::chase_pose(&current, position, zoom, pitch));
    }

    fn lookup_vehicle(&self, id: &str) -> Option<LonLat> {
        self.host
            .vehicles()?
            .into_iter()
            .find(|vehicle| vehicle.id == id)
            .map(|vehicle| vehicle.position)
    }

    /// Begin the next hop toward the waypoint at the current index.
    ///
    /// The waypoint list is re-fetched here (copy-on-read), so external
    /// updates apply from the next segment without a restart. Returns
    /// `false` when the tour cannot continue: empty list, or the index
    /// ran past the end without looping.
    fn begin_segment(&mut self, now: Instant) -> bool {
        let waypoints = self.host.waypoints();
        if waypoints.is_empty() {
            tracing::debug!("Waypoint list empty - ending tour");
            return false;
        }
        if self.waypoint_index >= waypoints.len() {
            if !self.opts.loop_tour {
                tracing::info!("Tour complete");
                return false;
            }
            self.waypoint_index = 0;
        }

        let view = self.host.view_state();
        let to = waypoints[self.waypoint_index];
        let segment = SegmentAnim::begin(&view, to, &self.opts, &mut self.rng, now);
        tracing::trace!(
            waypoint = self.waypoint_index,
            duration_ms = segment.duration.as_millis() as u64,
            "Segment started"
        );
        self.segment = Some(segment);
        true
    }

    fn advance_waypoint(&mut self) {
        tracing::trace!(waypoint = self.waypoint_index, "Segment complete");
        self.segment = None;
        self.waypoint_index += 1;
    }
}
