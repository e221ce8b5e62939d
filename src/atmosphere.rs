//! Layer-indexed standard atmosphere.
//!
//! Exposed as a trait, not a fixed table, so a scenario can supply a
//! non-standard atmosphere override without touching the engine.

/// Universal gas constant, J/(mol*K).
pub const UNIVERSAL_GAS_CONSTANT: f64 = 8.3144598;

/// The per-layer constants a standard atmosphere must answer for any
/// altitude: base (mass) density, base temperature, temperature lapse
/// rate, the altitude at which the containing layer starts, and molar
/// mass.
pub trait Atmosphere: Send + Sync {
    fn base_density(&self, altitude_m: f64) -> f64;
    fn base_temperature(&self, altitude_m: f64) -> f64;
    fn lapse_rate(&self, altitude_m: f64) -> f64;
    fn layer_floor(&self, altitude_m: f64) -> f64;
    fn molar_mass(&self, altitude_m: f64) -> f64;

    /// Temperature at `altitude_m`, derived from the layer's base
    /// temperature and lapse rate.
    fn temperature(&self, altitude_m: f64) -> f64 {
        self.base_temperature(altitude_m)
            + self.lapse_rate(altitude_m) * (altitude_m - self.layer_floor(altitude_m))
    }
}

/// One row of the seven-layer 1976 U.S. Standard Atmosphere table,
/// breakpoints at {0, 11000, 20000, 32000, 47000, 51000, 71000} m.
struct Layer {
    floor_m: f64,
    base_density: f64,
    base_temperature: f64,
    lapse_rate: f64,
}

const LAYERS: [Layer; 7] = [
    Layer { floor_m: 0.0, base_density: 1.2250, base_temperature: 288.15, lapse_rate: -0.0065 },
    Layer { floor_m: 11_000.0, base_density: 0.36391, base_temperature: 216.65, lapse_rate: 0.0 },
    Layer { floor_m: 20_000.0, base_density: 0.08803, base_temperature: 216.65, lapse_rate: 0.001 },
    Layer { floor_m: 32_000.0, base_density: 0.01322, base_temperature: 228.65, lapse_rate: 0.0028 },
    Layer { floor_m: 47_000.0, base_density: 0.00143, base_temperature: 270.65, lapse_rate: 0.0 },
    Layer { floor_m: 51_000.0, base_density: 0.00086, base_temperature: 270.65, lapse_rate: -0.0028 },
    Layer { floor_m: 71_000.0, base_density: 0.000064, base_temperature: 214.65, lapse_rate: -0.002 },
];

/// Molar mass of dry air (kg/mol). Constant across layers; the standard
/// atmosphere is only homogeneous enough for this below ~100km, which
/// is also where `Environment::density` clamps to zero anyway.
const DRY_AIR_MOLAR_MASS: f64 = 0.0289644;

fn layer_for(altitude_m: f64) -> &'static Layer {
    LAYERS
        .iter()
        .rev()
        .find(|l| altitude_m >= l.floor_m)
        .unwrap_or(&LAYERS[0])
}

/// The default seven-layer standard atmosphere.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardAtmosphere;

impl Atmosphere for StandardAtmosphere {
    fn base_density(&self, altitude_m: f64) -> f64 {
        layer_for(altitude_m).base_density
    }

    fn base_temperature(&self, altitude_m: f64) -> f64 {
        layer_for(altitude_m).base_temperature
    }

    fn lapse_rate(&self, altitude_m: f64) -> f64 {
        layer_for(altitude_m).lapse_rate
    }

    fn layer_floor(&self, altitude_m: f64) -> f64 {
        layer_for(altitude_m).floor_m
    }

    fn molar_mass(&self, _altitude_m: f64) -> f64 {
        DRY_AIR_MOLAR_MASS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_breakpoints_select_correct_row() {
        let atm = StandardAtmosphere;
        assert!((atm.base_density(0.0) - 1.2250).abs() < 1e-9);
        assert!((atm.base_density(10_999.0) - 1.2250).abs() < 1e-9);
        assert!((atm.base_density(11_000.0) - 0.36391).abs() < 1e-9);
        assert!((atm.base_density(80_000.0) - 0.000064).abs() < 1e-9);
    }

    #[test]
    fn isothermal_layer_has_zero_lapse_rate() {
        let atm = StandardAtmosphere;
        assert_eq!(atm.lapse_rate(15_000.0), 0.0);
        assert_eq!(atm.temperature(15_000.0), atm.base_temperature(15_000.0));
    }
}
