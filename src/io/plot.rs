//! Forces-over-time PNG rendering: one line series per registered
//! force, magnitude against simulated time.

use std::collections::BTreeMap;
use std::path::Path;

use plotters::prelude::*;

use crate::errors::SimError;

/// One row read back from a forces CSV (`time,mass,force_id,Fx,Fy,Fz`).
/// `force_id` is the force's numeric position in the environment's force
/// list.
struct ForceRow {
    time: f64,
    force_id: usize,
    magnitude: f64,
}

fn read_forces_csv(path: &Path) -> Result<Vec<ForceRow>, SimError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let time: f64 = record[0].parse().unwrap_or(f64::NAN);
        let force_id: usize = record[2].parse().unwrap_or(0);
        let fx: f64 = record[3].parse().unwrap_or(0.0);
        let fy: f64 = record[4].parse().unwrap_or(0.0);
        let fz: f64 = record[5].parse().unwrap_or(0.0);
        let magnitude = (fx.powi(2) + fy.powi(2) + fz.powi(2)).sqrt();
        rows.push(ForceRow { time, force_id, magnitude });
    }
    Ok(rows)
}

/// Render a forces CSV as one line series per force, magnitude over
/// simulated time, into a PNG at `output_path`.
pub fn plot_forces(forces_csv: &Path, output_path: &Path) -> Result<(), SimError> {
    let rows = read_forces_csv(forces_csv)?;

    let mut series: BTreeMap<usize, Vec<(f64, f64)>> = BTreeMap::new();
    for row in &rows {
        series
            .entry(row.force_id)
            .or_insert_with(Vec::new)
            .push((row.time, row.magnitude));
    }

    let max_time = rows.iter().map(|r| r.time).fold(0.0_f64, f64::max);
    let max_mag = rows.iter().map(|r| r.magnitude).fold(0.0_f64, f64::max);

    let root = BitMapBackend::new(output_path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| SimError::Configuration(format!("plot backend error: {}", e)))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Force magnitude over time", ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..max_time.max(1.0), 0.0..max_mag.max(1.0))
        .map_err(|e| SimError::Configuration(format!("plot chart error: {}", e)))?;

    chart
        .configure_mesh()
        .x_desc("time (s)")
        .y_desc("|F| (N)")
        .draw()
        .map_err(|e| SimError::Configuration(format!("plot mesh error: {}", e)))?;

    let palette = [&RED, &BLUE, &GREEN, &MAGENTA, &CYAN, &BLACK];
    for (i, (force_id, points)) in series.iter().enumerate() {
        let color = palette[i % palette.len()];
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color))
            .map_err(|e| SimError::Configuration(format!("plot series error: {}", e)))?
            .label(format!("force {}", force_id))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| SimError::Configuration(format!("plot legend error: {}", e)))?;

    root.present()
        .map_err(|e| SimError::Configuration(format!("plot present error: {}", e)))?;
    Ok(())
}
