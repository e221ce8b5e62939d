//! Deserializable description of one flight, loaded from a TOML file.
//!
//! A plain `serde::Deserialize` struct with primitive fields, loaded
//! through the `config` crate rather than `toml::from_str` directly so
//! scenario files can later layer environment-variable overrides.
//!
//! `*_expr` fields let a scenario describe `cross_section`/`drag_coef`/
//! `fuel_flow` as math expressions instead of constants, parsed out of
//! TOML with `meval::Expr` rather than requiring a fixed polynomial
//! shape.

use std::path::Path;

use serde_derive::Deserialize;

use crate::environment::{
    Environment, DEFAULT_EARTH_ANGULAR_VELOCITY, DEFAULT_EARTH_RADIUS, DEFAULT_STD_GRAVITY,
};
use crate::errors::SimError;
use crate::force::{Force, Thrust};
use crate::position::Position;
use crate::projectile::Projectile;

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default = "default_earth_radius")]
    pub earth_radius_m: f64,
    #[serde(default = "default_earth_angular_velocity")]
    pub earth_angular_velocity_rad_s: f64,
    #[serde(default = "default_std_gravity")]
    pub std_gravity_m_s2: f64,
}

fn default_earth_radius() -> f64 {
    DEFAULT_EARTH_RADIUS
}

fn default_earth_angular_velocity() -> f64 {
    DEFAULT_EARTH_ANGULAR_VELOCITY
}

fn default_std_gravity() -> f64 {
    DEFAULT_STD_GRAVITY
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectileConfig {
    pub mass_kg: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
    pub pitch_deg: f64,
    pub yaw_deg: f64,
    pub velocity_m_s: f64,
    #[serde(default)]
    pub cross_section_m2: Option<f64>,
    /// Math expression in `pitch`/`yaw` (radians), overriding
    /// `cross_section_m2` when present.
    #[serde(default)]
    pub cross_section_expr: Option<String>,
    #[serde(default)]
    pub drag_coefficient: Option<f64>,
    /// Math expression in `pitch`/`yaw`, overriding `drag_coefficient`.
    #[serde(default)]
    pub drag_coefficient_expr: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThrustConfig {
    pub fuel_mass_kg: f64,
    #[serde(default)]
    pub fuel_flow_kg_s: Option<f64>,
    /// Math expression in `t` (seconds since launch), overriding
    /// `fuel_flow_kg_s` when present.
    #[serde(default)]
    pub fuel_flow_expr: Option<String>,
    pub ejection_speed_m_s: f64,
    #[serde(default)]
    pub nozzle_pressure_pa: f64,
    #[serde(default)]
    pub nozzle_exit_area_m2: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForcesConfig {
    #[serde(default = "default_true")]
    pub gravity: bool,
    #[serde(default = "default_true")]
    pub drag: bool,
    #[serde(default = "default_true")]
    pub coriolis: bool,
    #[serde(default = "default_true")]
    pub eotvos: bool,
    #[serde(default = "default_true")]
    pub centrifugal: bool,
    #[serde(default)]
    pub thrust: Option<ThrustConfig>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub environment: EnvironmentConfig,
    pub projectile: ProjectileConfig,
    #[serde(default)]
    pub forces: ForcesConfig,
    #[serde(default = "default_dt")]
    pub dt_s: f64,
}

fn default_dt() -> f64 {
    0.01
}

/// Compile an optional `pitch`/`yaw` math expression into an
/// aerodynamic callback, falling back to `constant` when no expression
/// is given. Evaluated with a fresh `meval::Context` per call rather
/// than `Expr::bind2`, since a bound closure borrows the `Expr` it was
/// built from and can't outlive this function; a parse failure inside
/// `eval_with_context` surfaces as NaN, which `Projectile::advance`'s
/// finite-state check then fails fast on.
fn aero_callback(
    expr_src: &Option<String>,
    constant: f64,
    field_name: &'static str,
) -> Result<Box<crate::projectile::AeroFn>, SimError> {
    match expr_src {
        Some(src) => {
            let expr: meval::Expr = src
                .parse()
                .map_err(|e| SimError::Configuration(format!("invalid `{}` `{}`: {}", field_name, src, e)))?;
            Ok(Box::new(move |_axis, pitch, yaw| {
                let mut ctx = meval::Context::new();
                ctx.var("pitch", pitch).var("yaw", yaw);
                expr.eval_with_context(&ctx).unwrap_or(f64::NAN)
            }))
        }
        None => Ok(Box::new(move |_axis, _pitch, _yaw| constant)),
    }
}

/// Compile an optional `t` (seconds since launch) math expression into
/// a fuel-flow callback, falling back to `constant` when no expression
/// is given. See `aero_callback` for why evaluation is re-done per call
/// instead of via `Expr::bind`.
fn fuel_flow_callback(
    expr_src: &Option<String>,
    constant: f64,
) -> Result<Box<crate::force::FuelFlowFn>, SimError> {
    match expr_src {
        Some(src) => {
            let expr: meval::Expr = src.parse().map_err(|e| {
                SimError::Configuration(format!("invalid `fuel_flow_expr` `{}`: {}", src, e))
            })?;
            Ok(Box::new(move |t| {
                let mut ctx = meval::Context::new();
                ctx.var("t", t);
                expr.eval_with_context(&ctx).unwrap_or(f64::NAN)
            }))
        }
        None => Ok(Box::new(move |_t| constant)),
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            earth_radius_m: DEFAULT_EARTH_RADIUS,
            earth_angular_velocity_rad_s: DEFAULT_EARTH_ANGULAR_VELOCITY,
            std_gravity_m_s2: DEFAULT_STD_GRAVITY,
        }
    }
}

impl Default for ForcesConfig {
    fn default() -> Self {
        Self {
            gravity: true,
            drag: true,
            coriolis: true,
            eotvos: true,
            centrifugal: true,
            thrust: None,
        }
    }
}

impl Scenario {
    /// Load and deserialize a scenario TOML file through the `config`
    /// crate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let mut cfg = config::Config::default();
        cfg.merge(config::File::from(path.as_ref().to_path_buf()))
            .map_err(|e| SimError::Configuration(e.to_string()))?;
        cfg.try_into()
            .map_err(|e| SimError::Configuration(e.to_string()))
    }

    /// Build the `Environment` this scenario describes.
    pub fn build_environment(&self) -> Environment {
        let mut env = Environment::new(Box::new(crate::atmosphere::StandardAtmosphere));
        env.earth_radius = self.environment.earth_radius_m;
        env.earth_angular_velocity = self.environment.earth_angular_velocity_rad_s;
        env.std_gravity = self.environment.std_gravity_m_s2;

        if self.forces.gravity {
            env.add_force(Force::default_gravity());
        }
        if self.forces.drag {
            env.add_force(Force::drag());
        }
        if self.forces.coriolis {
            env.add_force(Force::coriolis());
        }
        if self.forces.eotvos {
            env.add_force(Force::eotvos());
        }
        if self.forces.centrifugal {
            env.add_force(Force::centrifugal());
        }
        env
    }

    /// Build the `Projectile` this scenario describes, launched at its
    /// configured pitch/yaw/velocity, and wire in a thrust force (if
    /// configured) as its primary thrust.
    pub fn build_projectile(&self, env: &mut Environment) -> Result<Projectile, SimError> {
        let position = Position::new(
            self.projectile.latitude_deg.to_radians(),
            self.projectile.longitude_deg.to_radians(),
            self.projectile.altitude_m,
        );

        let cross_section_fn = aero_callback(
            &self.projectile.cross_section_expr,
            self.projectile.cross_section_m2.unwrap_or(0.25),
            "cross_section_expr",
        )?;
        let drag_coef_fn = aero_callback(
            &self.projectile.drag_coefficient_expr,
            self.projectile.drag_coefficient.unwrap_or(0.1),
            "drag_coefficient_expr",
        )?;

        let mut projectile =
            Projectile::with_aero(self.projectile.mass_kg, position, cross_section_fn, drag_coef_fn)?;

        projectile.launch_at_angle(
            self.projectile.pitch_deg.to_radians(),
            self.projectile.yaw_deg.to_radians(),
            self.projectile.velocity_m_s,
        );

        if let Some(thrust_cfg) = &self.forces.thrust {
            let fuel_flow_fn = fuel_flow_callback(
                &thrust_cfg.fuel_flow_expr,
                thrust_cfg.fuel_flow_kg_s.unwrap_or(0.0),
            )?;
            let thrust = Thrust::new(
                thrust_cfg.fuel_mass_kg,
                fuel_flow_fn,
                thrust_cfg.ejection_speed_m_s,
                thrust_cfg.nozzle_pressure_pa,
                thrust_cfg.nozzle_exit_area_m2,
            );
            env.add_thrust(thrust, &mut projectile);
        }

        Ok(projectile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aero_callback_falls_back_to_constant_without_an_expr() {
        let f = aero_callback(&None, 0.42, "cross_section_expr").unwrap();
        assert!((f(0, 1.0, 2.0) - 0.42).abs() < 1e-12);
    }

    #[test]
    fn aero_callback_evaluates_pitch_yaw_expression() {
        let f = aero_callback(
            &Some("0.1 + 0.2 * pitch + yaw".to_string()),
            0.0,
            "cross_section_expr",
        )
        .unwrap();
        assert!((f(0, 1.0, 0.5) - (0.1 + 0.2 + 0.5)).abs() < 1e-9);
    }

    #[test]
    fn aero_callback_rejects_unparseable_expression() {
        assert!(aero_callback(&Some("pitch +".to_string()), 0.0, "cross_section_expr").is_err());
    }

    #[test]
    fn fuel_flow_callback_evaluates_time_expression() {
        let f = fuel_flow_callback(&Some("2 * t".to_string()), 0.0).unwrap();
        assert!((f(3.0) - 6.0).abs() < 1e-9);
    }

    fn minimal_scenario() -> Scenario {
        Scenario {
            environment: EnvironmentConfig::default(),
            projectile: ProjectileConfig {
                mass_kg: 10.0,
                latitude_deg: 0.0,
                longitude_deg: 0.0,
                altitude_m: 0.0,
                pitch_deg: 45.0,
                yaw_deg: 0.0,
                velocity_m_s: 50.0,
                cross_section_m2: None,
                cross_section_expr: None,
                drag_coefficient: None,
                drag_coefficient_expr: None,
            },
            forces: ForcesConfig::default(),
            dt_s: 0.01,
        }
    }

    #[test]
    fn build_environment_registers_the_five_default_forces() {
        let scenario = minimal_scenario();
        let env = scenario.build_environment();
        assert_eq!(env.forces().len(), 5);
    }

    #[test]
    fn build_projectile_launches_at_configured_angle() {
        let scenario = minimal_scenario();
        let mut env = scenario.build_environment();
        let projectile = scenario.build_projectile(&mut env).unwrap();
        assert!((projectile.pitch - 45f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn build_projectile_wires_configured_thrust_as_primary() {
        let mut scenario = minimal_scenario();
        scenario.forces.thrust = Some(ThrustConfig {
            fuel_mass_kg: 100.0,
            fuel_flow_kg_s: Some(5.0),
            fuel_flow_expr: None,
            ejection_speed_m_s: 2000.0,
            nozzle_pressure_pa: 0.0,
            nozzle_exit_area_m2: 0.0,
        });
        let mut env = scenario.build_environment();
        let projectile = scenario.build_projectile(&mut env).unwrap();
        assert_eq!(projectile.primary_thrust(), Some(5));
        assert_eq!(env.thrust_remaining_fuel(5), Some(100.0));
    }
}
