//! Shared, mostly-read-only simulation context: planetary constants,
//! the atmosphere model, and the ordered force list that every force
//! evaluation borrows from.

use nalgebra::Vector3;

use crate::atmosphere::{Atmosphere, StandardAtmosphere, UNIVERSAL_GAS_CONSTANT};
use crate::errors::SimError;
use crate::force::{Force, Thrust};
use crate::position::Position;
use crate::projectile::Projectile;

/// Reference sphere radius, m. The simulated Earth is a sphere, not a
/// WGS-84 ellipsoid.
pub const DEFAULT_EARTH_RADIUS: f64 = 6_378_137.0;
/// Earth's sidereal angular velocity, rad/s.
pub const DEFAULT_EARTH_ANGULAR_VELOCITY: f64 = 7.2921159e-5;
/// Standard gravity, m/s^2 (used only by `pressure`'s barometric formula,
/// not by `force::Gravity`, which computes gravity from `earth_mass`).
pub const DEFAULT_STD_GRAVITY: f64 = 9.80665;

/// A callback resolving the ground altitude (m) beneath a position;
/// defaults to flat sea level (`0.0`) everywhere, since the engine
/// models no terrain.
pub type SurfaceAltitudeFn = dyn Fn(&Position) -> f64 + Send + Sync;

fn sea_level(_position: &Position) -> f64 {
    0.0
}

pub struct Environment {
    pub earth_radius: f64,
    pub earth_angular_velocity: f64,
    pub std_gravity: f64,
    pub atmosphere: Box<dyn Atmosphere>,
    surface_altitude: Box<SurfaceAltitudeFn>,
    forces: Vec<Force>,
}

impl Environment {
    pub fn new(atmosphere: Box<dyn Atmosphere>) -> Self {
        Self {
            earth_radius: DEFAULT_EARTH_RADIUS,
            earth_angular_velocity: DEFAULT_EARTH_ANGULAR_VELOCITY,
            std_gravity: DEFAULT_STD_GRAVITY,
            atmosphere,
            surface_altitude: Box::new(sea_level),
            forces: Vec::new(),
        }
    }

    /// Build an environment with a caller-supplied force list, skipping
    /// the default five forces. Used by integration tests that want an
    /// isolated force (e.g. gravity alone for a drop test).
    pub fn new_with_forces(forces: Vec<Force>) -> Result<Self, SimError> {
        let mut env = Self::new(Box::new(StandardAtmosphere));
        env.forces = forces;
        Ok(env)
    }

    pub fn with_surface_altitude(
        mut self,
        surface_altitude: impl Fn(&Position) -> f64 + Send + Sync + 'static,
    ) -> Self {
        self.surface_altitude = Box::new(surface_altitude);
        self
    }

    pub fn surface_altitude(&self, position: &Position) -> f64 {
        (self.surface_altitude)(position)
    }

    /// Air density at `altitude_m` (kg/m^3), via the ideal gas law from
    /// the atmosphere model's pressure/temperature at that altitude.
    /// Clamped to zero above the top of the standard atmosphere table.
    pub fn density(&self, altitude_m: f64) -> f64 {
        if altitude_m > 100_000.0 {
            return 0.0;
        }
        let p = self.pressure(altitude_m);
        let t = self.atmosphere.temperature(altitude_m);
        let m = self.atmosphere.molar_mass(altitude_m);
        p * m / (UNIVERSAL_GAS_CONSTANT * t)
    }

    /// Air pressure at `altitude_m` (Pa), via the barometric formula:
    /// the isothermal form when the layer's lapse rate is zero, the
    /// polytropic form otherwise.
    pub fn pressure(&self, altitude_m: f64) -> f64 {
        if altitude_m > 100_000.0 {
            return 0.0;
        }
        let floor = self.atmosphere.layer_floor(altitude_m);
        let t0 = self.atmosphere.base_temperature(altitude_m);
        let lapse = self.atmosphere.lapse_rate(altitude_m);
        let m = self.atmosphere.molar_mass(altitude_m);
        let base_pressure = self.atmosphere.base_density(altitude_m) * UNIVERSAL_GAS_CONSTANT * t0 / m;

        if lapse.abs() < f64::EPSILON {
            base_pressure * (-self.std_gravity * m * (altitude_m - floor) / (UNIVERSAL_GAS_CONSTANT * t0)).exp()
        } else {
            let t = t0 + lapse * (altitude_m - floor);
            base_pressure * (t0 / t).powf(self.std_gravity * m / (UNIVERSAL_GAS_CONSTANT * lapse))
        }
    }

    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    pub fn add_force(&mut self, force: Force) -> usize {
        self.forces.push(force);
        self.forces.len() - 1
    }

    /// Append a thrust force and record it as `projectile`'s primary
    /// thrust for fuel reporting. The thrust's fuel is wet mass: it is
    /// added to the projectile's initial mass up front, so that
    /// `mass()` starts at dry mass plus fuel and ends at dry mass once
    /// burnout empties the tank.
    pub fn add_thrust(&mut self, thrust: Thrust, projectile: &mut Projectile) -> usize {
        let fuel = thrust.total_fuel();
        let index = self.add_force(Force::Thrust(thrust));
        projectile.initial_mass += fuel;
        projectile.set_primary_thrust(index);
        index
    }

    /// Remove the first registered force matching `kind`'s variant
    /// (interior state of `kind` is ignored; it exists only to select a
    /// discriminant). Logs a warning and does nothing if no force of
    /// that kind is registered.
    pub fn remove_force(&mut self, kind: &Force) {
        match self.forces.iter().position(|f| f.same_kind(kind)) {
            Some(index) => {
                self.forces.remove(index);
            }
            None => {
                log::warn!("attempted to remove force of kind `{}`, but none is registered", kind.name());
            }
        }
    }

    pub fn thrust_remaining_fuel(&self, index: usize) -> Option<f64> {
        self.forces.get(index).and_then(Force::remaining_fuel)
    }

    /// Sum every registered force's contribution for the current step.
    ///
    /// The force list is swapped out for the duration of the loop so
    /// each force's `evaluate` can still borrow `self` (for
    /// `earth_radius`, the atmosphere, ...) immutably while being
    /// iterated mutably itself (only `Thrust` needs `&mut`, to burn
    /// fuel).
    pub fn total_force(&mut self, projectile: &mut Projectile) -> Result<Vector3<f64>, SimError> {
        let mut forces = std::mem::take(&mut self.forces);
        let mut total = Vector3::zeros();
        let mut err = None;
        for force in &mut forces {
            match force.evaluate(projectile, self) {
                Ok(v) => total += v,
                Err(e) => {
                    err = Some(e);
                    break;
                }
            }
        }
        self.forces = forces;
        match err {
            Some(e) => Err(e),
            None => Ok(total),
        }
    }

    /// Per-force breakdown for the current step, in registration order,
    /// for `io::csv`'s forces writer.
    pub fn force_matrix(
        &mut self,
        projectile: &mut Projectile,
    ) -> Result<Vec<(&'static str, Vector3<f64>)>, SimError> {
        let mut forces = std::mem::take(&mut self.forces);
        let mut rows = Vec::with_capacity(forces.len());
        let mut err = None;
        for force in &mut forces {
            let name = force.name();
            match force.evaluate(projectile, self) {
                Ok(v) => rows.push((name, v)),
                Err(e) => {
                    err = Some(e);
                    break;
                }
            }
        }
        self.forces = forces;
        match err {
            Some(e) => Err(e),
            None => Ok(rows),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        let mut env = Self::new(Box::new(StandardAtmosphere));
        env.forces = vec![
            Force::default_gravity(),
            Force::drag(),
            Force::coriolis(),
            Force::eotvos(),
            Force::centrifugal(),
        ];
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::projectile::Projectile;

    #[test]
    fn remove_force_drops_first_matching_kind() {
        let mut env = Environment::default();
        assert_eq!(env.forces().len(), 5);
        env.remove_force(&Force::drag());
        assert_eq!(env.forces().len(), 4);
        assert!(env.forces().iter().all(|f| f.name() != "drag"));
    }

    #[test]
    fn remove_force_warns_and_does_nothing_for_unregistered_kind() {
        let mut env = Environment::new_with_forces(vec![Force::default_gravity()]).unwrap();
        env.remove_force(&Force::drag());
        assert_eq!(env.forces().len(), 1);
    }

    #[test]
    fn add_thrust_adds_fuel_mass_to_projectile_initial_mass() {
        let mut env = Environment::new_with_forces(vec![Force::default_gravity()]).unwrap();
        let mut p = Projectile::new(1000.0, Position::default()).unwrap();
        let thrust = Thrust::new(500.0, |_t| 10.0, 2500.0, 0.0, 0.0);
        env.add_thrust(thrust, &mut p);
        assert!((p.initial_mass - 1500.0).abs() < 1e-9);
        assert!((p.mass() - 1500.0).abs() < 1e-9);
    }
}
