//! Speed estimation from successive vehicle fixes.
//!
//! # Design
//!
//! - Each sample pass compares the current fixes against the previous
//!   pass and estimates `speed = haversine / Δt` per vehicle.
//! - The last-seen table is replaced wholesale every pass, so an estimate
//!   always spans exactly one sampling interval and vehicles that left
//!   the feed are dropped automatically.
//! - Vehicles first seen this pass have no baseline and never qualify.

use std::collections::HashMap;
use std::time::Instant;

use crate::camera::Vehicle;
use crate::geo::{haversine_meters, LonLat};

/// A position fix retained from the previous sampling pass.
#[derive(Debug, Clone, Copy)]
struct FixSample {
    position: LonLat,
    recorded_at: Instant,
}

/// A vehicle whose estimated speed cleared the follow threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingVehicle {
    /// Feed id of the vehicle.
    pub id: String,
    /// Estimated instantaneous speed in meters/second.
    pub speed_mps: f64,
}

/// Estimates vehicle speeds across sampling intervals.
#[derive(Debug)]
pub struct MovementSampler {
    /// Minimum speed to qualify as moving.
    min_speed_mps: f64,
    /// Fixes from the previous sampling pass, by vehicle id.
    last_seen: HashMap<String, FixSample>,
}

impl MovementSampler {
    /// Create a sampler with the given follow-speed threshold.
    pub fn new(min_speed_mps: f64) -> Self {
        Self {
            min_speed_mps,
            last_seen: HashMap::new(),
        }
    }

    /// Run one sampling pass over the current fixes.
    ///
    /// Returns the vehicles whose estimated speed over the last interval
    /// is at least the threshold. The last-seen table is replaced with
    /// the current snapshot unconditionally.
    pub fn sample(&mut self, fixes: &[Vehicle], now: Instant) -> Vec<MovingVehicle> {
        let mut movers = Vec::new();

        for fix in fixes {
            let Some(prev) = self.last_seen.get(&fix.id) else {
                continue;
            };
            let dt = now.duration_since(prev.recorded_at).as_secs_f64();
            if dt <= 0.0 {
                continue;
            }
            let speed_mps = haversine_meters(prev.position, fix.position) / dt;
            if speed_mps >= self.min_speed_mps {
                movers.push(MovingVehicle {
                    id: fix.id.clone(),
                    speed_mps,
                });
            }
        }

        self.last_seen = fixes
            .iter()
            .map(|fix| {
                (
                    fix.id.clone(),
                    FixSample {
                        position: fix.position,
                        recorded_at: now,
                    },
                )
            })
            .collect();

        movers
    }

    /// Number of vehicles with a retained baseline fix.
    pub fn tracked_count(&self) -> usize {
        self.last_seen.len()
    }

    /// Drop all retained fixes.
    pub fn clear(&mut self) {
        self.last_seen.clear();
    }
}
