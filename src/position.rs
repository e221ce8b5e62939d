//! Extended-precision geographic position.
//!
//! Some forces (Coriolis on a slow-moving body, in particular) move the
//! projectile by sub-meter amounts per step. A plain `f64` latitude
//! accumulated over thousands of steps loses those corrections to
//! rounding. Rust has no native extended-precision float, so latitude
//! and longitude are each stored as a compensated double-double pair
//! (a value plus a running error term), following the classic
//! Dekker/Knuth two-sum technique. Altitude does not need this
//! treatment; it is accumulated from `vz * dt`, which does not exhibit
//! the same sub-ulp cancellation.

use std::f64::consts::PI;

/// A double-double accumulator: `hi` holds the value, `lo` holds the
/// rounding error lost on the last addition. `value()` returns `hi + lo`
/// rounded to a single `f64`, but additions accumulate against the pair,
/// not the rounded value, so small increments are not lost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtendedFloat {
    hi: f64,
    lo: f64,
}

impl ExtendedFloat {
    pub fn new(value: f64) -> Self {
        Self { hi: value, lo: 0.0 }
    }

    pub fn value(self) -> f64 {
        self.hi + self.lo
    }

    /// Two-sum: add `delta` to this accumulator without losing the part
    /// that doesn't fit in `hi`'s mantissa.
    pub fn add(self, delta: f64) -> Self {
        let t = self.hi + delta;
        let err = if self.hi.abs() >= delta.abs() {
            (self.hi - t) + delta
        } else {
            (delta - t) + self.hi
        };
        Self {
            hi: t,
            lo: self.lo + err,
        }
    }

    /// Replace the value outright, discarding the compensation term.
    /// Used when a new value is computed from scratch (e.g. `asin`)
    /// rather than accumulated incrementally.
    pub fn set(self, value: f64) -> Self {
        Self { hi: value, lo: 0.0 }
    }
}

impl From<f64> for ExtendedFloat {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// Position on (or above) the reference sphere.
///
/// `lat` is in `[-pi/2, pi/2]`, `lon` is in `(-pi, pi]`, `alt` is meters
/// above the reference sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    lat: ExtendedFloat,
    lon: ExtendedFloat,
    pub alt: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self {
            lat: ExtendedFloat::new(lat),
            lon: ExtendedFloat::new(lon),
            alt,
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat.value()
    }

    pub fn lon(&self) -> f64 {
        self.lon.value()
    }

    /// Replace latitude with a freshly computed value (e.g. from `asin`).
    pub fn set_lat(&mut self, lat: f64) {
        self.lat = self.lat.set(lat);
    }

    /// Replace longitude with a freshly computed value, wrapped into
    /// `(-pi, pi]`.
    pub fn set_lon(&mut self, lon: f64) {
        self.lon = self.lon.set(crate::numeric::wrap_longitude(lon));
    }

    pub fn is_finite(&self) -> bool {
        self.lat().is_finite() && self.lon().is_finite() && self.alt.is_finite()
    }
}

impl Default for Position {
    /// Fallback launch site when a scenario doesn't specify one.
    fn default() -> Self {
        Self::new(44.869389_f64.to_radians(), 20.640221_f64.to_radians(), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_float_preserves_small_increments() {
        let mut acc = ExtendedFloat::new(1.0);
        // Each delta is below f64 rounding resolution at hi=1.0 scale
        // only in aggregate; verify many small adds sum correctly.
        for _ in 0..1_000_000 {
            acc = acc.add(1e-9);
        }
        assert!((acc.value() - (1.0 + 1e-3)).abs() < 1e-6);
    }

    #[test]
    fn position_wraps_longitude_on_set() {
        let mut p = Position::new(0.0, 0.0, 0.0);
        p.set_lon(PI + 0.2);
        assert!((p.lon() - (-PI + 0.2)).abs() < 1e-12);
    }
}
