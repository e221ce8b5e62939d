//! Aerodynamic drag, per axis, opposing the velocity component on that
//! axis.

use nalgebra::Vector3;

use crate::environment::Environment;
use crate::numeric::{sgn, X_AXIS, Y_AXIS, Z_AXIS};
use crate::projectile::Projectile;

#[derive(Debug, Clone, Copy, Default)]
pub struct Drag;

impl Drag {
    pub(crate) fn components(&self, projectile: &Projectile, environment: &Environment) -> Vector3<f64> {
        let rho = environment.density(projectile.position.alt);
        let pitch = projectile.pitch;
        let yaw = projectile.yaw;
        let mut f = Vector3::zeros();
        for axis in [X_AXIS, Y_AXIS, Z_AXIS] {
            let v = projectile.velocities[axis];
            let area = projectile.cross_section(axis, pitch, yaw);
            let cd = projectile.drag_coef(axis, pitch, yaw);
            f[axis] = -sgn(v) * 0.5 * rho * v.powi(2) * area * cd;
        }
        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::position::Position;

    #[test]
    fn opposes_velocity_sign() {
        let env = Environment::default();
        let mut p = Projectile::new(1.0, Position::new(0.0, 0.0, 0.0)).unwrap();
        p.set_initial_velocities(50.0, 0.0, 0.0);
        let f = Drag.components(&p, &env);
        assert!(f[0] < 0.0);
        assert_eq!(f[1], 0.0);
        assert_eq!(f[2], 0.0);
    }
}
