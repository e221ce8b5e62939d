//! The launcher loop: build a flight from a `Scenario`, step it to
//! ground impact, and write out its trajectory (and optionally its
//! per-force breakdown).

use std::path::Path;

use crate::errors::SimError;
use crate::io::csv::{ForcesWriter, TrajectoryWriter};
use crate::sample::TrajectorySample;
use crate::scenario::Scenario;

/// The result of running one scenario to completion: every recorded
/// trajectory sample, in order.
pub struct FlightLog {
    pub samples: Vec<TrajectorySample>,
}

impl FlightLog {
    pub fn apex(&self) -> Option<&TrajectorySample> {
        self.samples
            .iter()
            .max_by(|a, b| a.alt.partial_cmp(&b.alt).unwrap())
    }
}

/// Run `scenario` to ground impact, recording a sample at every step.
/// There is no maximum step count: a scenario whose projectile never
/// returns to the ground (escape trajectory, orbit) runs until the
/// caller kills the process. This is a deliberate consequence of a
/// fixed-step, no-adaptive-stepping design, not a bug to work around
/// here.
pub fn run_scenario(scenario: &Scenario) -> Result<FlightLog, SimError> {
    let mut environment = scenario.build_environment();
    let mut projectile = scenario.build_projectile(&mut environment)?;

    let mut samples = Vec::new();
    samples.push(projectile.sample(&environment));

    while !projectile.has_hit_ground(&environment) {
        projectile.advance(&mut environment, scenario.dt_s)?;
        samples.push(projectile.sample(&environment));
    }

    log::info!(
        "flight complete: {} steps, {:.3}s simulated, {:.3}m travelled",
        samples.len(),
        projectile.time,
        projectile.distance_travelled
    );

    Ok(FlightLog { samples })
}

/// Run `scenario` to completion and write its trajectory (and,
/// optionally, forces-over-time) CSV files, then pack the trajectory
/// into a KMZ alongside them.
pub fn run_and_write(
    scenario: &Scenario,
    trajectory_csv: impl AsRef<Path>,
    forces_csv: Option<impl AsRef<Path>>,
    kmz_path: impl AsRef<Path>,
) -> Result<FlightLog, SimError> {
    let log = run_scenario(scenario)?;

    let mut writer = TrajectoryWriter::create(trajectory_csv.as_ref())?;
    for sample in &log.samples {
        writer.write(sample)?;
    }
    writer.flush()?;

    if let Some(forces_path) = forces_csv {
        let mut environment = scenario.build_environment();
        let mut projectile = scenario.build_projectile(&mut environment)?;
        let mut forces_writer = ForcesWriter::create(forces_path.as_ref())?;
        forces_writer.write(&mut projectile, &mut environment)?;
        while !projectile.has_hit_ground(&environment) {
            projectile.advance(&mut environment, scenario.dt_s)?;
            forces_writer.write(&mut projectile, &mut environment)?;
        }
        forces_writer.flush()?;
    }

    crate::io::kml::write_kmz(&log.samples, kmz_path.as_ref())?;

    Ok(log)
}
