//! Stateful thrust with a finite fuel reservoir.
//!
//! The magnitude (and the fuel burned to produce it) is computed once
//! per simulated instant and cached, since `Environment::total_force`
//! may be queried more than once at the same `projectile.time` (e.g. by
//! `force_matrix` diagnostics). Burning fuel also increases
//! `projectile.lost_mass`.

use nalgebra::Vector3;

use crate::environment::Environment;
use crate::errors::SimError;
use crate::numeric::{spherical_to_planar, X_AXIS, Y_AXIS, Z_AXIS};
use crate::projectile::Projectile;

/// `direction(axis, magnitude, projectile)` resolves one axis of the
/// thrust vector given the scalar magnitude computed this step.
pub type DirectionFn = dyn Fn(usize, f64, &Projectile) -> f64 + Send + Sync;
/// `fuel_flow(time)` is the commanded mass flow rate (kg/s) at a given
/// simulated time, before the remaining-fuel clamp is applied.
pub type FuelFlowFn = dyn Fn(f64) -> f64 + Send + Sync;

/// Thrust pointed along the projectile's current velocity direction,
/// the default when no `direction` override is supplied.
fn follow_path(axis: usize, magnitude: f64, projectile: &Projectile) -> f64 {
    spherical_to_planar(axis, magnitude, projectile.pitch, projectile.yaw)
}

pub struct Thrust {
    total_fuel: f64,
    remaining_fuel: f64,
    last_time: Option<f64>,
    last_result: Vector3<f64>,
    fuel_flow: Box<FuelFlowFn>,
    ejection_speed: f64,
    nozzle_pressure: f64,
    nozzle_exit_area: f64,
    direction: Box<DirectionFn>,
}

impl Thrust {
    pub fn new(
        fuel_mass: f64,
        fuel_flow: impl Fn(f64) -> f64 + Send + Sync + 'static,
        ejection_speed: f64,
        nozzle_pressure: f64,
        nozzle_exit_area: f64,
    ) -> Self {
        Self::with_direction(
            fuel_mass,
            fuel_flow,
            ejection_speed,
            nozzle_pressure,
            nozzle_exit_area,
            follow_path,
        )
    }

    pub fn with_direction(
        fuel_mass: f64,
        fuel_flow: impl Fn(f64) -> f64 + Send + Sync + 'static,
        ejection_speed: f64,
        nozzle_pressure: f64,
        nozzle_exit_area: f64,
        direction: impl Fn(usize, f64, &Projectile) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            total_fuel: fuel_mass,
            remaining_fuel: fuel_mass,
            last_time: None,
            last_result: Vector3::zeros(),
            fuel_flow: Box::new(fuel_flow),
            ejection_speed,
            nozzle_pressure,
            nozzle_exit_area,
            direction: Box::new(direction),
        }
    }

    pub fn remaining_fuel(&self) -> f64 {
        self.remaining_fuel
    }

    pub fn total_fuel(&self) -> f64 {
        self.total_fuel
    }

    pub(crate) fn components(
        &mut self,
        projectile: &mut Projectile,
        environment: &Environment,
    ) -> Result<Vector3<f64>, SimError> {
        if self.last_time == Some(projectile.time) {
            return Ok(self.last_result);
        }

        let magnitude = if self.remaining_fuel <= 0.0 {
            0.0
        } else {
            let commanded = (self.fuel_flow)(projectile.time);
            let burned = (commanded * projectile.dt).min(self.remaining_fuel);
            let flow_rate = burned / projectile.dt;
            self.remaining_fuel -= burned;
            projectile.lost_mass += burned;

            let p_ambient = environment.pressure(projectile.position.alt);
            self.ejection_speed * flow_rate + (self.nozzle_pressure - p_ambient) * self.nozzle_exit_area
        };

        let mut f = Vector3::zeros();
        for axis in [X_AXIS, Y_AXIS, Z_AXIS] {
            f[axis] = (self.direction)(axis, magnitude, projectile);
        }

        self.last_time = Some(projectile.time);
        self.last_result = f;
        Ok(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::position::Position;

    #[test]
    fn burns_fuel_and_updates_lost_mass() {
        let env = Environment::default();
        let mut p = Projectile::new(100.0, Position::default()).unwrap();
        p.dt = 1.0;
        let mut thrust = Thrust::new(10.0, |_t| 2.0, 2500.0, 0.0, 0.0);
        let _ = thrust.components(&mut p, &env).unwrap();
        assert!((thrust.remaining_fuel() - 8.0).abs() < 1e-9);
        assert!((p.lost_mass - 2.0).abs() < 1e-9);
    }

    #[test]
    fn memoizes_per_simulated_time() {
        let env = Environment::default();
        let mut p = Projectile::new(100.0, Position::default()).unwrap();
        p.dt = 1.0;
        let mut thrust = Thrust::new(10.0, |_t| 2.0, 2500.0, 0.0, 0.0);
        thrust.components(&mut p, &env).unwrap();
        thrust.components(&mut p, &env).unwrap();
        assert!((thrust.remaining_fuel() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn stops_burning_when_fuel_exhausted() {
        let env = Environment::default();
        let mut p = Projectile::new(100.0, Position::default()).unwrap();
        p.dt = 1.0;
        let mut thrust = Thrust::new(1.0, |_t| 2.0, 2500.0, 0.0, 0.0);
        thrust.components(&mut p, &env).unwrap();
        assert_eq!(thrust.remaining_fuel(), 0.0);
        p.time += p.dt;
        let f = thrust.components(&mut p, &env).unwrap();
        assert_eq!(f, Vector3::zeros());
    }
}
