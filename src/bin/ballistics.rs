//! CLI entry point: `run <scenario>`, `plot <forces.csv>`,
//! `kmz <trajectory.csv>`.
//!
//! `run` accepts a glob pattern and, when it expands to more than one
//! file, runs the independent flights concurrently with `rayon`: each
//! scenario is a fully independent flight, so there is no shared state
//! to synchronize across them.

extern crate clap;
extern crate glob;
extern crate log;
extern crate pretty_env_logger;
extern crate rayon;

use std::env::{set_var, var};
use std::path::PathBuf;
use std::process::exit;

use clap::{App, AppSettings, Arg, SubCommand};
use glob::glob;
use rayon::prelude::*;

use ballistics_sim::driver::run_and_write;
use ballistics_sim::io::csv::read_trajectory;
use ballistics_sim::io::kml::write_kmz;
use ballistics_sim::io::plot::plot_forces;
use ballistics_sim::scenario::Scenario;

const LOG_VAR: &str = "BALLISTICS_LOG";

fn main() {
    if var(LOG_VAR).is_err() {
        set_var(LOG_VAR, "INFO");
    }
    std::env::set_var("RUST_LOG", var(LOG_VAR).unwrap());
    pretty_env_logger::init();

    let matches = App::new("ballistics")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Ballistic flight simulation engine over a rotating spherical Earth")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("run")
                .about("Run a scenario to ground impact and write its trajectory")
                .arg(Arg::with_name("scenario").required(true))
                .arg(
                    Arg::with_name("forces")
                        .long("forces")
                        .takes_value(true)
                        .help("also write a forces-over-time diagnostic CSV"),
                ),
        )
        .subcommand(
            SubCommand::with_name("plot")
                .about("Render a forces CSV as a PNG chart")
                .arg(Arg::with_name("forces_csv").required(true)),
        )
        .subcommand(
            SubCommand::with_name("kmz")
                .about("Pack a trajectory CSV into a KMZ")
                .arg(Arg::with_name("trajectory_csv").required(true)),
        )
        .get_matches();

    let result = match matches.subcommand() {
        ("run", Some(sub)) => {
            let scenario_path = sub.value_of("scenario").unwrap();
            let forces_path = sub.value_of("forces").map(PathBuf::from);
            run_command(scenario_path, forces_path)
        }
        ("plot", Some(sub)) => {
            let forces_csv = PathBuf::from(sub.value_of("forces_csv").unwrap());
            let output = forces_csv.with_extension("png");
            plot_forces(&forces_csv, &output).map_err(|e| e.to_string())
        }
        ("kmz", Some(sub)) => {
            let trajectory_csv = PathBuf::from(sub.value_of("trajectory_csv").unwrap());
            kmz_command(&trajectory_csv)
        }
        _ => {
            eprintln!("no subcommand given; run with --help for usage");
            exit(1);
        }
    };

    if let Err(e) = result {
        log::error!("{}", e);
        exit(1);
    }
}

fn run_command(scenario_path: &str, forces_path: Option<PathBuf>) -> Result<(), String> {
    if scenario_path.contains('*') {
        return run_batch_command(scenario_path);
    }
    run_one_scenario(scenario_path, forces_path)
}

fn run_one_scenario(scenario_path: &str, forces_path: Option<PathBuf>) -> Result<(), String> {
    let scenario = Scenario::load(scenario_path).map_err(|e| e.to_string())?;
    let base = PathBuf::from(scenario_path).with_extension("");
    let trajectory_csv = base.with_extension("trajectory.csv");
    let kmz_path = base.with_extension("kmz");

    run_and_write(&scenario, &trajectory_csv, forces_path, &kmz_path).map_err(|e| e.to_string())?;
    log::info!(
        "wrote {} and {}",
        trajectory_csv.display(),
        kmz_path.display()
    );
    Ok(())
}

/// Expand `pattern` (e.g. `"scenarios/*.toml"`) and run every matching
/// scenario concurrently. The forces-diagnostic CSV is single-flight
/// only (`--forces` names one file, which a batch of flights would
/// stomp on), so batch mode never writes one.
fn run_batch_command(pattern: &str) -> Result<(), String> {
    let paths: Vec<PathBuf> = glob(pattern)
        .map_err(|e| e.to_string())?
        .filter_map(Result::ok)
        .collect();
    if paths.is_empty() {
        return Err(format!("no scenario files matched `{}`", pattern));
    }

    let results: Vec<Result<(), String>> = paths
        .par_iter()
        .map(|path| run_one_scenario(path.to_str().unwrap(), None))
        .collect();

    let mut failed = 0;
    for (path, result) in paths.iter().zip(results) {
        if let Err(e) = result {
            log::error!("{}: {}", path.display(), e);
            failed += 1;
        }
    }
    if failed > 0 {
        return Err(format!("{} of {} scenarios failed", failed, paths.len()));
    }
    Ok(())
}

fn kmz_command(trajectory_csv: &PathBuf) -> Result<(), String> {
    let samples = read_trajectory(trajectory_csv).map_err(|e| e.to_string())?;
    let kmz_path = trajectory_csv.with_extension("kmz");
    write_kmz(&samples, &kmz_path).map_err(|e| e.to_string())?;
    log::info!("wrote {}", kmz_path.display());
    Ok(())
}
