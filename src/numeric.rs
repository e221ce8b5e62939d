//! Small numeric helpers shared across the engine: sign, floating-point
//! comparison with a fixed epsilon, great-circle distance, and the
//! spherical-to-planar projection used by thrust direction callbacks.

use std::f64::consts::PI;

/// Epsilon used by `fp_eq`/`fp_lt`/`fp_gt`. Pole crossings are rare and
/// this epsilon is used solely to detect the `cos(lat) == 0`
/// singularity, so it can stay tight.
const FP_EPSILON: f64 = 1e-12;

/// Sign of `x`: -1, 0, or 1. Named `sgn` (not `signum`) because, unlike
/// `f64::signum`, it returns exactly `0.0` for `x == 0.0` rather than
/// `1.0`.
pub fn sgn(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Whether two floating point numbers are equal within `FP_EPSILON`.
pub fn fp_eq(x: f64, y: f64) -> bool {
    (x - y).abs() < FP_EPSILON
}

/// Whether `x < y` and they are not `fp_eq`.
pub fn fp_lt(x: f64, y: f64) -> bool {
    !fp_eq(x, y) && x < y
}

/// Whether `x > y` and they are not `fp_eq`.
pub fn fp_gt(x: f64, y: f64) -> bool {
    !fp_eq(x, y) && x > y
}

/// Haversine great-circle distance between two (lat, lon) points in
/// radians, on a sphere of the given `radius`.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64, radius: f64) -> f64 {
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * a.sqrt().asin() * radius
}

/// Axis index convention shared by cross-section/drag-coefficient
/// callbacks and by `spherical_to_planar`.
pub const X_AXIS: usize = 0;
pub const Y_AXIS: usize = 1;
pub const Z_AXIS: usize = 2;

/// Project a scalar `intensity` along (pitch, yaw) onto the requested
/// ENU axis. Used by thrust's default `follow_path` direction and by
/// any scenario-supplied direction callback that wants the same
/// projection.
pub fn spherical_to_planar(axis: usize, intensity: f64, pitch: f64, yaw: f64) -> f64 {
    match axis {
        X_AXIS => intensity * yaw.cos() * pitch.cos(),
        Y_AXIS => intensity * yaw.sin() * pitch.cos(),
        Z_AXIS => intensity * pitch.sin(),
        _ => 0.0,
    }
}

/// Normalize a longitude into `(-pi, pi]`.
pub fn wrap_longitude(lon: f64) -> f64 {
    let wrapped = (lon + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgn_matches_sign() {
        assert_eq!(sgn(5.0), 1.0);
        assert_eq!(sgn(-5.0), -1.0);
        assert_eq!(sgn(0.0), 0.0);
    }

    #[test]
    fn fp_eq_within_epsilon() {
        assert!(fp_eq(1.0, 1.0 + 1e-13));
        assert!(!fp_eq(1.0, 1.0 + 1e-6));
    }

    #[test]
    fn haversine_quarter_circle() {
        let radius = 6_378_137.0;
        let d = haversine(0.0, 0.0, PI / 2.0, 0.0, radius);
        assert!((d - radius * PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn wrap_longitude_handles_antimeridian() {
        assert!((wrap_longitude(PI + 0.1) - (-PI + 0.1)).abs() < 1e-12);
        assert!((wrap_longitude(-PI - 0.1) - (PI - 0.1)).abs() < 1e-12);
    }

    #[test]
    fn spherical_to_planar_vertical_thrust() {
        let z = spherical_to_planar(Z_AXIS, 100.0, PI / 2.0, 0.0);
        assert!((z - 100.0).abs() < 1e-9);
    }
}
