use std::{error::Error, fs, path::Path};

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use dartrig_core::{score, scoring_zones, CameraIntrinsics, MarkerObservation, Pt2, Real};
use dartrig_pipeline::ExtrinsicSolver;

/// Calibration and scoring tools for the dart tracking rig.
#[derive(Debug, Parser)]
#[command(author, version, about = "Dart rig calibration and scoring tools")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Write the JSON result to a file instead of stdout.
    #[arg(long, global = true)]
    output: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a board-plane impact position.
    Score {
        /// X coordinate, meters from the bull's-eye centre.
        x: Real,
        /// Y coordinate, meters from the bull's-eye centre.
        y: Real,
    },
    /// Solve the camera-pair transform from simultaneous marker
    /// observations.
    Extrinsics {
        /// Path to a JSON file containing ExtrinsicsInput.
        #[arg(long)]
        input: String,
    },
    /// Print the static scoring-zone table.
    Zones,
}

/// One camera's side of an extrinsic solve. The observations carry
/// the camera id; the solver reads the endpoints from them.
#[derive(Debug, Serialize, Deserialize)]
struct CameraObservations {
    intrinsics: CameraIntrinsics,
    observations: Vec<MarkerObservation>,
}

/// Input document for the `extrinsics` subcommand.
#[derive(Debug, Serialize, Deserialize)]
struct ExtrinsicsInput {
    /// Marker edge length, meters.
    marker_size: Real,
    camera_a: CameraObservations,
    camera_b: CameraObservations,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let data = fs::read_to_string(path)?;
    let value = serde_json::from_str(&data)?;
    Ok(value)
}

fn score_impact(x: Real, y: Real) -> Result<String, Box<dyn Error>> {
    let result = score(&Pt2::new(x, y));
    Ok(serde_json::to_string_pretty(&result)?)
}

fn run_extrinsics_from_file(input_path: &str) -> Result<String, Box<dyn Error>> {
    let input: ExtrinsicsInput = load_json_file(Path::new(input_path))?;

    let transform = ExtrinsicSolver::default().compute(
        &input.camera_a.observations,
        &input.camera_b.observations,
        input.marker_size,
        &input.camera_a.intrinsics,
        &input.camera_b.intrinsics,
    )?;

    Ok(serde_json::to_string_pretty(&transform)?)
}

fn zone_table_json() -> Result<String, Box<dyn Error>> {
    Ok(serde_json::to_string_pretty(scoring_zones())?)
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let json = match args.command {
        Command::Score { x, y } => score_impact(x, y)?,
        Command::Extrinsics { input } => run_extrinsics_from_file(&input)?,
        Command::Zones => zone_table_json()?,
    };

    match args.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{}", json),
    }
    Ok(())
}
