//! Trajectory and per-force CSV writers.

use std::fs::File;
use std::path::Path;

use crate::environment::Environment;
use crate::errors::SimError;
use crate::projectile::Projectile;
use crate::sample::TrajectorySample;

/// Writes one row per simulation step:
/// `time,distance,latitude,longitude,altitude,Vx,Vy,Vz,pitch,yaw,fuel`.
/// Latitude/longitude/pitch/yaw are radians, matching `TrajectorySample`;
/// time/distance/fuel are fixed to 4/2/2 decimals, everything else is
/// full-precision text.
pub struct TrajectoryWriter {
    inner: csv::Writer<File>,
}

impl TrajectoryWriter {
    pub fn create(path: &Path) -> Result<Self, SimError> {
        let mut inner = csv::Writer::from_path(path)?;
        inner.write_record(&[
            "time", "distance", "latitude", "longitude", "altitude", "Vx", "Vy", "Vz", "pitch",
            "yaw", "fuel",
        ])?;
        Ok(Self { inner })
    }

    pub fn write(&mut self, sample: &TrajectorySample) -> Result<(), SimError> {
        self.inner.write_record(&[
            format!("{:.4}", sample.time),
            format!("{:.2}", sample.planar_distance),
            sample.lat.to_string(),
            sample.lon.to_string(),
            sample.alt.to_string(),
            sample.vx.to_string(),
            sample.vy.to_string(),
            sample.vz.to_string(),
            sample.pitch.to_string(),
            sample.yaw.to_string(),
            format!("{:.2}", sample.remaining_fuel),
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SimError> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Reads a trajectory CSV back into `TrajectorySample`s, the inverse of
/// `TrajectoryWriter`. Used by the `kmz` CLI subcommand, which converts
/// an already-written trajectory CSV rather than re-running a scenario.
pub fn read_trajectory(path: &Path) -> Result<Vec<TrajectorySample>, SimError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |i: usize| -> f64 { record[i].parse().unwrap_or(f64::NAN) };
        samples.push(TrajectorySample {
            time: field(0),
            planar_distance: field(1),
            lat: field(2),
            lon: field(3),
            alt: field(4),
            vx: field(5),
            vy: field(6),
            vz: field(7),
            pitch: field(8),
            yaw: field(9),
            remaining_fuel: field(10),
        });
    }
    Ok(samples)
}

/// Writes `time,mass,force_id,Fx,Fy,Fz`, one row per force in the
/// environment's declared order, grouped by (time, mass). `force_id` is
/// the force's numeric position in the environment's force list, not
/// its name.
pub struct ForcesWriter {
    inner: csv::Writer<File>,
}

impl ForcesWriter {
    pub fn create(path: &Path) -> Result<Self, SimError> {
        let mut inner = csv::Writer::from_path(path)?;
        inner.write_record(&["time", "mass", "force_id", "Fx", "Fy", "Fz"])?;
        Ok(Self { inner })
    }

    pub fn write(
        &mut self,
        projectile: &mut Projectile,
        environment: &mut Environment,
    ) -> Result<(), SimError> {
        let time = projectile.time;
        let mass = projectile.mass();
        for (index, (_name, components)) in environment.force_matrix(projectile)?.into_iter().enumerate() {
            self.inner.write_record(&[
                format!("{:.4}", time),
                format!("{:.2}", mass),
                index.to_string(),
                components[0].to_string(),
                components[1].to_string(),
                components[2].to_string(),
            ])?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SimError> {
        self.inner.flush()?;
        Ok(())
    }
}
