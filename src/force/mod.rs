//! The closed set of forces a projectile can be subjected to, dispatched
//! through a single `match` rather than a trait object: the force set
//! is fixed and only one variant (`Thrust`) carries interior state, so
//! dynamic dispatch would buy nothing a plain sum type doesn't already
//! give for free.

mod centrifugal;
mod coriolis;
mod drag;
mod eotvos;
mod gravity;
mod thrust;

pub use centrifugal::Centrifugal;
pub use coriolis::Coriolis;
pub use drag::Drag;
pub use eotvos::Eotvos;
pub use gravity::Gravity;
pub use thrust::{DirectionFn, FuelFlowFn, Thrust};

use nalgebra::Vector3;

use crate::environment::Environment;
use crate::errors::SimError;
use crate::projectile::Projectile;

/// One entry in an `Environment`'s force list.
pub enum Force {
    Gravity(Gravity),
    Drag(Drag),
    Coriolis(Coriolis),
    Eotvos(Eotvos),
    Centrifugal(Centrifugal),
    Thrust(Thrust),
}

impl Force {
    pub fn default_gravity() -> Self {
        Force::Gravity(Gravity::default())
    }

    pub fn gravity(earth_mass: f64) -> Self {
        Force::Gravity(Gravity::new(earth_mass))
    }

    pub fn drag() -> Self {
        Force::Drag(Drag)
    }

    pub fn coriolis() -> Self {
        Force::Coriolis(Coriolis)
    }

    pub fn eotvos() -> Self {
        Force::Eotvos(Eotvos)
    }

    pub fn centrifugal() -> Self {
        Force::Centrifugal(Centrifugal)
    }

    pub fn thrust(thrust: Thrust) -> Self {
        Force::Thrust(thrust)
    }

    /// A human-readable identifier for this variant, used in log
    /// messages.
    pub fn name(&self) -> &'static str {
        match self {
            Force::Gravity(_) => "gravity",
            Force::Drag(_) => "drag",
            Force::Coriolis(_) => "coriolis",
            Force::Eotvos(_) => "eotvos",
            Force::Centrifugal(_) => "centrifugal",
            Force::Thrust(_) => "thrust",
        }
    }

    pub fn remaining_fuel(&self) -> Option<f64> {
        match self {
            Force::Thrust(t) => Some(t.remaining_fuel()),
            _ => None,
        }
    }

    pub fn total_fuel(&self) -> Option<f64> {
        match self {
            Force::Thrust(t) => Some(t.total_fuel()),
            _ => None,
        }
    }

    /// Whether `other` is the same force kind as `self`, ignoring any
    /// interior state (used by `Environment::remove_force`'s
    /// remove-by-kind lookup).
    pub fn same_kind(&self, other: &Force) -> bool {
        matches!(
            (self, other),
            (Force::Gravity(_), Force::Gravity(_))
                | (Force::Drag(_), Force::Drag(_))
                | (Force::Coriolis(_), Force::Coriolis(_))
                | (Force::Eotvos(_), Force::Eotvos(_))
                | (Force::Centrifugal(_), Force::Centrifugal(_))
                | (Force::Thrust(_), Force::Thrust(_))
        )
    }

    /// Evaluate this force's contribution for the current step. Only
    /// `Thrust` needs `&mut Projectile` (to burn fuel and update
    /// `lost_mass`); the others only read state.
    pub(crate) fn evaluate(
        &mut self,
        projectile: &mut Projectile,
        environment: &Environment,
    ) -> Result<Vector3<f64>, SimError> {
        match self {
            Force::Gravity(g) => Ok(g.components(projectile, environment)),
            Force::Drag(d) => Ok(d.components(projectile, environment)),
            Force::Coriolis(c) => Ok(c.components(projectile, environment)),
            Force::Eotvos(e) => Ok(e.components(projectile, environment)),
            Force::Centrifugal(c) => Ok(c.components(projectile, environment)),
            Force::Thrust(t) => t.components(projectile, environment),
        }
    }
}
