//! Coriolis force, horizontal components only.
//!
//! `Fz` is hardcoded to zero here: the vertical term is supplied
//! separately by [`crate::force::eotvos::Eotvos`]. Combining this
//! force's own (nonzero) vertical term with a separate Eötvös force
//! would double-count it.

use nalgebra::Vector3;

use crate::environment::Environment;
use crate::numeric::{X_AXIS, Y_AXIS, Z_AXIS};
use crate::projectile::Projectile;

#[derive(Debug, Clone, Copy, Default)]
pub struct Coriolis;

impl Coriolis {
    pub(crate) fn components(&self, projectile: &Projectile, environment: &Environment) -> Vector3<f64> {
        let m = projectile.mass();
        let omega = environment.earth_angular_velocity;
        let lat = projectile.position.lat();
        let vx = projectile.velocities[X_AXIS];
        let vy = projectile.velocities[Y_AXIS];
        let vz = projectile.velocities[Z_AXIS];

        let mut f = Vector3::zeros();
        f[X_AXIS] = 2.0 * omega * m * (vy * lat.sin() - vz * lat.cos());
        f[Y_AXIS] = -2.0 * omega * m * vx * lat.sin();
        f[Z_AXIS] = 0.0;
        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::position::Position;

    #[test]
    fn vertical_component_is_zero() {
        let env = Environment::default();
        let mut p = Projectile::new(1.0, Position::new(0.3, 0.0, 0.0)).unwrap();
        p.set_initial_velocities(10.0, 5.0, 3.0);
        let f = Coriolis.components(&p, &env);
        assert_eq!(f[Z_AXIS], 0.0);
    }
}
