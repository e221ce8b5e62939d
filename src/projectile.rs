//! The projectile's state and its per-step integration.
//!
//! A concrete, non-generic struct rather than a trait-bound state
//! vector: this engine has exactly one state shape and one fixed-step
//! explicit integration scheme, so generic state-transition bookkeeping
//! would have no job to do here.

use nalgebra::Vector3;

use crate::environment::Environment;
use crate::errors::{require_finite, SimError};
use crate::numeric::{fp_eq, haversine, sgn, X_AXIS, Y_AXIS, Z_AXIS};
use crate::position::Position;
use crate::sample::TrajectorySample;
use crate::stats::RollingStatistic;

/// `cross_section`/`drag_coef` callbacks: given an axis and the
/// projectile's current (pitch, yaw), return the corresponding
/// cross-sectional area (m^2) or drag coefficient (dimensionless).
pub type AeroFn = dyn Fn(usize, f64, f64) -> f64 + Send + Sync;

fn default_cross_section(_axis: usize, _pitch: f64, _yaw: f64) -> f64 {
    0.25
}

fn default_drag_coef(_axis: usize, _pitch: f64, _yaw: f64) -> f64 {
    0.1
}

/// A projectile in flight. Owned exclusively by the simulation driving
/// it; the `Environment` it flies through is passed into `advance` each
/// step rather than stored by reference, so there is no lifetime tying
/// the two together.
pub struct Projectile {
    pub initial_mass: f64,
    pub lost_mass: f64,
    pub position: Position,
    pub velocities: Vector3<f64>,
    pub directions: Vector3<f64>,
    pub total_velocity: f64,
    pub planar_velocity: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub time: f64,
    pub dt: f64,
    pub distance_travelled: f64,
    pub vy_corrective_change_threshold: f64,
    pub crossed_the_pole: bool,
    distance_stats: RollingStatistic,
    cross_section: Box<AeroFn>,
    drag_coef: Box<AeroFn>,
    /// Index into `Environment::forces` of the first thrust this
    /// projectile was given, for fuel reporting in `TrajectorySample`.
    primary_thrust: Option<usize>,
}

impl Projectile {
    pub fn new(mass: f64, position: Position) -> Result<Self, SimError> {
        Self::with_aero(mass, position, default_cross_section, default_drag_coef)
    }

    pub fn with_aero(
        mass: f64,
        position: Position,
        cross_section: impl Fn(usize, f64, f64) -> f64 + Send + Sync + 'static,
        drag_coef: impl Fn(usize, f64, f64) -> f64 + Send + Sync + 'static,
    ) -> Result<Self, SimError> {
        if mass <= 0.0 {
            return Err(SimError::Configuration(format!(
                "projectile mass must be positive, got {}",
                mass
            )));
        }
        require_finite("initial_mass", mass)?;
        if !position.is_finite() {
            return Err(SimError::Configuration(
                "initial position must be finite".to_string(),
            ));
        }
        Ok(Self {
            initial_mass: mass,
            lost_mass: 0.0,
            position,
            velocities: Vector3::zeros(),
            directions: Vector3::zeros(),
            total_velocity: 0.0,
            planar_velocity: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            time: 0.0,
            dt: 0.0,
            distance_travelled: 0.0,
            vy_corrective_change_threshold: 0.1,
            crossed_the_pole: false,
            distance_stats: RollingStatistic::default(),
            cross_section: Box::new(cross_section),
            drag_coef: Box::new(drag_coef),
            primary_thrust: None,
        })
    }

    pub fn mass(&self) -> f64 {
        self.initial_mass - self.lost_mass
    }

    pub fn cross_section(&self, axis: usize, pitch: f64, yaw: f64) -> f64 {
        (self.cross_section)(axis, pitch, yaw)
    }

    pub fn drag_coef(&self, axis: usize, pitch: f64, yaw: f64) -> f64 {
        (self.drag_coef)(axis, pitch, yaw)
    }

    pub fn primary_thrust(&self) -> Option<usize> {
        self.primary_thrust
    }

    /// Record which force-list slot is this projectile's "main" thrust,
    /// for fuel reporting. Called by `Environment::add_thrust`.
    pub(crate) fn set_primary_thrust(&mut self, index: usize) {
        if self.primary_thrust.is_none() {
            self.primary_thrust = Some(index);
        }
    }

    /// Set initial velocities from a launch angle and total speed.
    pub fn launch_at_angle(&mut self, pitch: f64, yaw: f64, velocity: f64) {
        self.pitch = pitch;
        self.yaw = yaw;
        self.velocities = Vector3::new(
            velocity * yaw.cos() * pitch.cos(),
            velocity * yaw.sin() * pitch.cos(),
            velocity * pitch.sin(),
        );
    }

    /// Set initial velocities directly; pitch/yaw are derived.
    pub fn set_initial_velocities(&mut self, vx: f64, vy: f64, vz: f64) {
        self.velocities = Vector3::new(vx, vy, vz);
        self.update_angles();
    }

    pub fn has_hit_ground(&self, environment: &Environment) -> bool {
        self.position.alt <= environment.surface_altitude(&self.position)
    }

    pub fn sample(&self, environment: &Environment) -> TrajectorySample {
        let remaining_fuel = self
            .primary_thrust
            .and_then(|idx| environment.thrust_remaining_fuel(idx))
            .unwrap_or(0.0);
        TrajectorySample {
            time: self.time,
            planar_distance: self.distance_travelled,
            lat: self.position.lat(),
            lon: self.position.lon(),
            alt: self.position.alt,
            vx: self.velocities[X_AXIS],
            vy: self.velocities[Y_AXIS],
            vz: self.velocities[Z_AXIS],
            pitch: self.pitch,
            yaw: self.yaw,
            remaining_fuel,
        }
    }

    /// Advance the projectile by `dt` seconds: the heart of the
    /// simulation.
    pub fn advance(&mut self, environment: &mut Environment, dt: f64) -> Result<(), SimError> {
        if dt <= 0.0 {
            return Err(SimError::Configuration(format!(
                "dt must be positive, got {}",
                dt
            )));
        }
        self.dt = dt;

        let forces = environment.total_force(self)?;
        let acc = forces / self.mass();
        self.velocities += acc * dt;

        self.planar_velocity =
            (self.velocities[X_AXIS].powi(2) + self.velocities[Y_AXIS].powi(2)).sqrt();
        self.total_velocity = (self.planar_velocity.powi(2) + self.velocities[Z_AXIS].powi(2)).sqrt();
        self.directions = Vector3::new(
            sgn(self.velocities[X_AXIS]),
            sgn(self.velocities[Y_AXIS]),
            sgn(self.velocities[Z_AXIS]),
        );

        self.update_angles();

        let radius = environment.earth_radius + self.position.alt;
        let movement_x = self.velocities[X_AXIS] * dt;
        let movement_y = self.velocities[Y_AXIS] * dt;
        let distance_m = (movement_x.powi(2) + movement_y.powi(2)).sqrt();
        let distance_rad = distance_m / radius;

        let true_course = self.yaw - std::f64::consts::FRAC_PI_2;
        let old_lat = self.position.lat();
        let old_lon = self.position.lon();

        let new_lat = (old_lat.sin() * distance_rad.cos()
            + old_lat.cos() * distance_rad.sin() * true_course.cos())
        .asin();
        self.position.set_lat(new_lat);

        if !fp_eq(self.position.lat().cos(), 0.0) {
            let new_lon = old_lon
                - (true_course.sin() * distance_rad.sin() / self.position.lat().cos()).asin();
            // `set_lon` wraps into (-pi, pi] via the same
            // ((x + pi) mod 2pi) - pi formula the spec gives directly.
            self.position.set_lon(new_lon);
        }

        self.position.alt += self.velocities[Z_AXIS] * dt;

        self.time += dt;
        self.distance_travelled += distance_m;

        self.reproject_velocities(old_lat, old_lon, radius, distance_m);
        self.update_angles();

        require_finite("position.lat", self.position.lat())?;
        require_finite("position.lon", self.position.lon())?;
        require_finite("position.alt", self.position.alt)?;
        require_finite("velocities.x", self.velocities[X_AXIS])?;
        require_finite("velocities.y", self.velocities[Y_AXIS])?;
        require_finite("velocities.z", self.velocities[Z_AXIS])?;

        Ok(())
    }

    /// Reproject (vx, vy) into the new local tangent plane after the
    /// position has moved, handling antimeridian crossings and the
    /// anomalous-Δlat pole-crossing case.
    fn reproject_velocities(&mut self, old_lat: f64, old_lon: f64, radius: f64, distance_m: f64) {
        let lat = self.position.lat();
        let lon = self.position.lon();

        let old_vy = self.velocities[Y_AXIS];
        let candidate_vy = radius * (lat - old_lat) / self.dt;
        self.velocities[Y_AXIS] = candidate_vy;

        let change_ratio = (candidate_vy / old_vy - 1.0).abs();
        if change_ratio > self.vy_corrective_change_threshold {
            let actual_distance = haversine(lat, lon, old_lat, old_lon, radius);
            if self.crossed_the_pole {
                log::warn!(
                    "V_y has too extreme oscillations: {:.6} (already past a pole crossing)",
                    change_ratio
                );
            } else if actual_distance < self.distance_stats.mean()
                && self.distance_stats.is_outlier(actual_distance, 2.0)
            {
                log::info!(
                    "crossing the pole: change ratio is {:.6}, distance {:.3}m vs mean {:.3}m",
                    change_ratio,
                    actual_distance,
                    self.distance_stats.mean()
                );
                self.velocities[Y_AXIS] = -old_vy;
                self.crossed_the_pole = true;
                self.position.set_lon(self.position.lon() + std::f64::consts::PI);
                self.velocities[X_AXIS] = -self.velocities[X_AXIS];
                return;
            } else if actual_distance < self.distance_stats.mean() {
                log::warn!(
                    "V_y has extreme correction, but we're far from poles: {:.6}",
                    change_ratio
                );
            }
        }

        if self.crossed_the_pole {
            self.crossed_the_pole = false;
            self.velocities[Y_AXIS] = old_vy;
            return;
        }

        self.distance_stats.update(distance_m);

        let mut lon_radius = radius * lat.cos();
        if lon_radius == 0.0 {
            lon_radius = radius * old_lat.cos();
        }
        if (lon - old_lon).abs() < std::f64::consts::PI {
            self.velocities[X_AXIS] = lon_radius * (lon - old_lon) / self.dt;
        } else {
            self.velocities[X_AXIS] =
                lon_radius * (lon - old_lon + 2.0 * std::f64::consts::PI * sgn(old_lon - lon)) / self.dt;
        }
    }

    fn update_angles(&mut self) {
        self.pitch = self.velocities[Z_AXIS].atan2(
            (self.velocities[X_AXIS].powi(2) + self.velocities[Y_AXIS].powi(2)).sqrt(),
        );
        self.yaw = self.velocities[Y_AXIS].atan2(self.velocities[X_AXIS]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::force::Force;

    #[test]
    fn mass_reflects_lost_mass() {
        let p = Projectile::new(10.0, Position::default()).unwrap();
        assert!((p.mass() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_mass() {
        assert!(Projectile::new(0.0, Position::default()).is_err());
        assert!(Projectile::new(-1.0, Position::default()).is_err());
    }

    #[test]
    fn drop_test_hits_ground_close_to_analytical_time() {
        let mut env = Environment::new_with_forces(vec![Force::default_gravity()]).unwrap();
        let mut p = Projectile::new(1.0, Position::new(0.0, 0.0, 100.0)).unwrap();
        let dt = 0.01;
        while !p.has_hit_ground(&env) {
            p.advance(&mut env, dt).unwrap();
        }
        assert!((p.time - 4.515).abs() < 0.02);
        assert!((p.velocities[Z_AXIS] - (-44.29)).abs() < 0.1);
        let _ = &mut env;
    }
}
