//! Tokio frame driver for the flyover controller.
//!
//! The controller core is synchronous and clock-agnostic; this module is
//! the batteries-included scheduler around it. `start()` spawns a frame
//! task ticking at the configured frame interval and, when auto-follow is
//! enabled, a coarser sampler task — both bound to one cancellation
//! token. `stop()` cancels the token and joins both tasks before
//! resetting the core, so no callback can fire against a torn-down
//! controller.
//!
//! # Example
//!
//! ```ignore
//! use flyover::{FlyoverOptions, FlyoverService};
//!
//! let mut service = FlyoverService::new(host, FlyoverOptions::default());
//! service.start();
//! // ... later
//! service.stop().await;
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::camera::{
    FlyoverCamera, FlyoverOptions, FlyoverStatus, FollowRequest, FollowTarget,
};
use crate::host::CameraHost;

/// Drives a [`FlyoverCamera`] from the tokio clock.
///
/// All public operations are safe to call in any state; `stop` is
/// idempotent. The wrapped core is shared behind a mutex, so the frame
/// task, the sampler task and API calls always observe mode changes made
/// by each other no later than the next frame.
pub struct FlyoverService {
    core: Arc<Mutex<FlyoverCamera>>,
    frame_interval: Duration,
    sampler_interval: Duration,
    auto_follow: bool,
    cancel: Option<CancellationToken>,
    tasks: Vec<JoinHandle<()>>,
}

impl FlyoverService {
    /// Create a service around a new controller with an OS-seeded RNG.
    pub fn new(host: Arc<dyn CameraHost>, options: FlyoverOptions) -> Self {
        Self::from_core(FlyoverCamera::new(host, options))
    }

    /// Create a service with a seeded RNG for deterministic runs.
    pub fn with_seed(host: Arc<dyn CameraHost>, options: FlyoverOptions, seed: u64) -> Self {
        Self::from_core(FlyoverCamera::with_seed(host, options, seed))
    }

    fn from_core(core: FlyoverCamera) -> Self {
        let opts = core.options();
        let frame_interval = opts.frame_interval();
        let sampler_interval = opts.auto_follow_interval();
        let auto_follow = opts.auto_follow;
        Self {
            core: Arc::new(Mutex::new(core)),
            frame_interval,
            sampler_interval,
            auto_follow,
            cancel: None,
            tasks: Vec::new(),
        }
    }

    /// Handle to the wrapped controller, for direct core access.
    pub fn handle(&self) -> Arc<Mutex<FlyoverCamera>> {
        Arc::clone(&self.core)
    }

    /// Whether the tour is running.
    pub fn is_running(&self) -> bool {
        self.core.lock().is_running()
    }

    /// A point-in-time status snapshot.
    pub fn status(&self) -> FlyoverStatus {
        self.core.lock().status(Instant::now())
    }

    /// Engage a timed follow override. See [`FlyoverCamera::follow`].
    pub fn follow(&self, target: FollowTarget, request: FollowRequest) {
        self.core.lock().follow(target, request, Instant::now());
    }

    /// Chase a vehicle, or clear the chase with `None`.
    pub fn set_chase_vehicle(&self, vehicle_id: Option<String>) {
        self.core.lock().set_chase_vehicle(vehicle_id);
    }

    /// Cycle the chase through the vehicle roster.
    pub fn cycle_chase_vehicle(&self) {
        self.core.lock().cycle_chase_vehicle();
    }

    /// Start the tour and spawn the frame/sampler tasks.
    ///
    /// Returns `false` (spawning nothing) when the controller declines to
    /// start, i.e. the waypoint list is empty. Calling on a running
    /// service is a no-op returning `true`.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return true;
        }
        // Wind down a session that ended on its own (non-loop tour
        // completion); those tasks have already exited.
        if let Some(token) = self.cancel.take() {
            token.cancel();
            for task in self.tasks.drain(..) {
                task.abort();
            }
        }
        if !self.core.lock().start(Instant::now()) {
            return false;
        }

        let token = CancellationToken::new();

        let core = Arc::clone(&self.core);
        let frame_token = token.clone();
        let frame_interval = self.frame_interval;
        self.tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;

                    _ = frame_token.cancelled() => break,

                    _ = ticker.tick() => {
                        let mut cam = core.lock();
                        if !cam.is_running() {
                            // Tour ended on its own; take the sampler down too
                            frame_token.cancel();
                            break;
                        }
                        cam.tick(Instant::now());
                    }
                }
            }
            tracing::debug!("Frame loop stopped");
        }));

        if self.auto_follow {
            let core = Arc::clone(&self.core);
            let sampler_token = token.clone();
            let sampler_interval = self.sampler_interval;
            self.tasks.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(sampler_interval);
                loop {
                    tokio::select! {
                        biased;

                        _ = sampler_token.cancelled() => break,

                        _ = ticker.tick() => {
                            let mut cam = core.lock();
                            if !cam.is_running() {
                                break;
                            }
                            cam.sample(Instant::now());
                        }
                    }
                }
                tracing::debug!("Auto-follow sampler stopped");
            }));
        }

        self.cancel = Some(token);
        tracing::info!(
            frame_ms = self.frame_interval.as_millis() as u64,
            auto_follow = self.auto_follow,
            "Flyover service started"
        );
        true
    }

    /// Stop the tour: cancel and join both tasks, then reset the core.
    ///
    /// Guarantees no frame or sampler callback is pending when it
    /// returns. Idempotent; safe to call while a tick is in flight.
    pub async fn stop(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
        self.core.lock().stop();
    }
}

impl Drop for FlyoverService {
    fn drop(&mut self) {
        // Tasks hold only the core Arc; cancelling is enough for them to
        // wind down without the service.
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Vehicle, ViewState};
    use crate::geo::LonLat;
    use crate::camera::ModeKind;

    struct StaticHost {
        waypoints: Vec<LonLat>,
        view: Mutex<ViewState>,
        vehicles: Option<Vec<Vehicle>>,
    }

    impl StaticHost {
        fn new(waypoints: Vec<LonLat>) -> Arc<Self> {
            Arc::new(Self {
                waypoints,
                view: Mutex::new(ViewState::default()),
                vehicles: None,
            })
        }
    }

    impl CameraHost for StaticHost {
        fn waypoints(&self) -> Vec<LonLat> {
            self.waypoints.clone()
        }

        fn view_state(&self) -> ViewState {
            *self.view.lock()
        }

        fn set_view_state(&self, view: ViewState) {
            *self.view.lock() = view;
        }

        fn vehicles(&self) -> Option<Vec<Vehicle>> {
            self.vehicles.clone()
        }
    }

    fn quick_opts() -> FlyoverOptions {
        FlyoverOptions {
            hop_duration_ms: 50,
            dwell_ms: 0,
            duration_jitter: 0.0,
            burst_probability: 0.0,
            auto_follow: false,
            frame_interval_ms: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let host = StaticHost::new(vec![[10.0, 60.0], [11.0, 60.0]]);
        let mut service = FlyoverService::with_seed(host, quick_opts(), 1);

        assert!(service.start());
        assert!(service.is_running());

        tokio::time::sleep(Duration::from_millis(30)).await;
        service.stop().await;
        assert!(!service.is_running());
        assert!(service.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_stop_twice_is_safe() {
        let host = StaticHost::new(vec![[10.0, 60.0]]);
        let mut service = FlyoverService::with_seed(host, quick_opts(), 1);

        service.start();
        service.stop().await;
        service.stop().await;
        assert!(!service.is_running());
    }

    #[tokio::test]
    async fn test_stop_without_start_is_safe() {
        let host = StaticHost::new(vec![[10.0, 60.0]]);
        let mut service = FlyoverService::with_seed(host, quick_opts(), 1);
        service.stop().await;
        assert!(!service.is_running());
    }

    #[tokio::test]
    async fn test_start_with_empty_waypoints_declines() {
        let host = StaticHost::new(vec![]);
        let mut service = FlyoverService::with_seed(host, quick_opts(), 1);

        assert!(!service.start());
        assert!(!service.is_running());
        assert!(service.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_frames_advance_the_camera() {
        let host = StaticHost::new(vec![[10.0, 60.0], [11.0, 60.0]]);
        let mut service = FlyoverService::with_seed(Arc::clone(&host) as Arc<dyn CameraHost>, quick_opts(), 1);

        service.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        service.stop().await;

        let view = *host.view.lock();
        assert_ne!(view.position(), [0.0, 0.0], "camera never moved");
    }

    #[tokio::test]
    async fn test_non_loop_tour_winds_down_naturally() {
        let host = StaticHost::new(vec![[10.0, 60.0]]);
        let opts = FlyoverOptions {
            loop_tour: false,
            ..quick_opts()
        };
        let mut service = FlyoverService::with_seed(host, opts, 1);

        service.start();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!service.is_running(), "single-hop tour should complete");
        service.stop().await;
    }

    #[tokio::test]
    async fn test_follow_delegates_to_core() {
        let host = StaticHost::new(vec![[10.0, 60.0]]);
        let mut service = FlyoverService::with_seed(host, quick_opts(), 1);

        service.start();
        service.follow(
            FollowTarget::position(|| Some([12.0, 61.0])),
            FollowRequest::new(60_000),
        );
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(service.status().mode, ModeKind::Follow);
        service.stop().await;
    }
}
