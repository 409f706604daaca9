//! Planar geometry and easing kernel for camera animation.
//!
//! All camera math operates on `[longitude, latitude]` pairs in degrees.
//! Bearing and interpolation use a flat-earth approximation: accurate
//! enough at city scale, degrading at high latitudes or long hops. The
//! haversine distance is the one great-circle calculation, used only for
//! speed estimation where approximation error is tolerable.
//!
//! # Conventions
//!
//! - Points are `[lon, lat]` in degrees, matching waypoint order.
//! - Bearings are degrees in `[0, 360)`, measured as `atan2(Δlat, Δlon)`:
//!   0° points due east, 90° due north.
//! - Progress values `t` are clamped to `[0, 1]` by callers.

/// Mean Earth radius in meters, for haversine distance.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic point as `[longitude, latitude]` in degrees.
pub type LonLat = [f64; 2];

/// Planar bearing from `from` to `to`, in degrees `[0, 360)`.
///
/// Flat-earth `atan2(Δlat, Δlon)`; 0° points due east, 90° due north.
/// Identical points yield 0°.
pub fn bearing_between(from: LonLat, to: LonLat) -> f64 {
    let dlon = to[0] - from[0];
    let dlat = to[1] - from[1];
    normalize_bearing(dlat.atan2(dlon).to_degrees())
}

/// Signed shortest angular difference from `from` to `to`, in `(-180, 180]`.
///
/// Adding the result to `from` reaches `to` without sweeping the long way
/// around the compass.
pub fn shortest_angle_diff(from: f64, to: f64) -> f64 {
    let diff = (to - from).rem_euclid(360.0);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Wrap a bearing into `[0, 360)`.
pub fn normalize_bearing(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid of a tiny negative can round up to the modulus itself
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Linear interpolation between two scalars.
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Per-axis linear interpolation between two points.
pub fn lerp_point(from: LonLat, to: LonLat, t: f64) -> LonLat {
    [lerp(from[0], to[0], t), lerp(from[1], to[1], t)]
}

/// Quadratic ease-in-out time warp.
///
/// `2t²` for `t < 0.5`, else `1 − 2(1−t)²`. Maps `[0, 1]` onto `[0, 1]`,
/// accelerating through the first half and decelerating through the second.
pub fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        let inv = 1.0 - t;
        1.0 - 2.0 * inv * inv
    }
}

/// Great-circle distance between two points in meters.
pub fn haversine_meters(a: LonLat, b: LonLat) -> f64 {
    let lat1 = a[1].to_radians();
    let lat2 = b[1].to_radians();
    let dlat = (b[1] - a[1]).to_radians();
    let dlon = (b[0] - a[0]).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
