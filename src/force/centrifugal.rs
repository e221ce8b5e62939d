//! Centrifugal force from Earth's rotation.

use nalgebra::Vector3;

use crate::environment::Environment;
use crate::numeric::{X_AXIS, Y_AXIS, Z_AXIS};
use crate::projectile::Projectile;

#[derive(Debug, Clone, Copy, Default)]
pub struct Centrifugal;

impl Centrifugal {
    pub(crate) fn components(&self, projectile: &Projectile, environment: &Environment) -> Vector3<f64> {
        let m = projectile.mass();
        let omega = environment.earth_angular_velocity;
        let lat = projectile.position.lat();
        let c = m * omega.powi(2) * environment.earth_radius * lat.cos();

        let mut f = Vector3::zeros();
        f[X_AXIS] = 0.0;
        f[Y_AXIS] = -c * lat.sin();
        f[Z_AXIS] = c * lat.cos();
        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::position::Position;

    #[test]
    fn vanishes_along_x_axis() {
        let env = Environment::default();
        let p = Projectile::new(1.0, Position::new(0.5, 0.0, 0.0)).unwrap();
        let f = Centrifugal.components(&p, &env);
        assert_eq!(f[X_AXIS], 0.0);
    }

    #[test]
    fn maximal_at_equator() {
        let env = Environment::default();
        let p_eq = Projectile::new(1.0, Position::new(0.0, 0.0, 0.0)).unwrap();
        let p_mid = Projectile::new(1.0, Position::new(0.6, 0.0, 0.0)).unwrap();
        let f_eq = Centrifugal.components(&p_eq, &env);
        let f_mid = Centrifugal.components(&p_mid, &env);
        assert!(f_eq[Z_AXIS] > f_mid[Z_AXIS]);
    }
}
