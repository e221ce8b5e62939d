//! An immutable snapshot of trajectory state at one simulated instant,
//! recorded once per step for downstream writers.

/// One row of the trajectory CSV: latitude/longitude are radians,
/// matching `Position`'s internal representation; `io::csv` converts
/// to degrees only when the target format calls for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub time: f64,
    pub planar_distance: f64,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub remaining_fuel: f64,
}
