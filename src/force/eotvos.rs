//! Eötvös effect, the vertical complement to [`crate::force::coriolis::Coriolis`].
//! Applies no mass multiplier: unlike the other forces here, this one
//! is already an acceleration, not scaled by `projectile.mass()`.

use nalgebra::Vector3;

use crate::environment::Environment;
use crate::numeric::{sgn, X_AXIS, Z_AXIS};
use crate::projectile::Projectile;

#[derive(Debug, Clone, Copy, Default)]
pub struct Eotvos;

impl Eotvos {
    pub(crate) fn components(&self, projectile: &Projectile, environment: &Environment) -> Vector3<f64> {
        let omega = environment.earth_angular_velocity;
        let lat = projectile.position.lat();
        let vx = projectile.velocities[X_AXIS];

        let mut f = Vector3::zeros();
        f[Z_AXIS] = 2.0 * sgn(vx) * omega * projectile.planar_velocity * lat.cos();
        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::position::Position;

    #[test]
    fn zero_at_equator_with_no_eastward_velocity() {
        let env = Environment::default();
        let p = Projectile::new(1.0, Position::new(0.0, 0.0, 0.0)).unwrap();
        let f = Eotvos.components(&p, &env);
        assert_eq!(f[X_AXIS], 0.0);
        assert_eq!(f[Z_AXIS], 0.0);
    }
}
