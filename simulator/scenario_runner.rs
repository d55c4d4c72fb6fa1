// Scenario Runner - Load and execute scenario YAML files
//
// Usage:
//   cargo run --bin scenario_runner scenarios/convergence.yaml
//   cargo run --bin scenario_runner scenarios/  (runs all .yaml files in directory)
//   cargo run --bin scenario_runner scenarios/convergence.yaml --seed 0x1234...

mod scenario;

use clap::Parser;
use log::{error, info, LevelFilter};
use mh_rust::mh_config::{parse_seed_hex, random_seed, seed_to_hex, ConfigError};
use scenario::{scenario_files, ScenarioFile, ScenarioRunner};
use simple_logger::SimpleLogger;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about = "Run Monty Hall scenarios from YAML files", long_about = None)]
struct Args {
    /// Scenario file or directory of scenario files
    path: PathBuf,

    /// Hex seed overriding the scenario's own
    #[arg(long)]
    seed: Option<String>,

    /// Write each scenario's result as YAML into this directory
    #[arg(long)]
    export: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    let level: LevelFilter = args.log_level.parse().unwrap_or_else(|_| {
        eprintln!("{}", ConfigError::InvalidLogLevel(args.log_level.clone()));
        std::process::exit(1);
    });
    SimpleLogger::new().with_level(level).init().unwrap();

    let seed = args.seed.as_deref().map(parse_seed_hex).transpose().unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let result = if args.path.is_file() {
        run_scenario_file(&args.path, seed, args.export.as_deref())
    } else if args.path.is_dir() {
        run_scenario_directory(&args.path, seed, args.export.as_deref())
    } else {
        eprintln!("Error: Path does not exist: {}", args.path.display());
        std::process::exit(1);
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run_scenario_directory(
    dir: &Path,
    seed: Option<[u8; 32]>,
    export: Option<&Path>,
) -> Result<(), ConfigError> {
    let scenarios = scenario_files(dir)?;

    if scenarios.is_empty() {
        eprintln!("No .yaml files found in {}", dir.display());
        std::process::exit(1);
    }

    println!("Found {} scenario(s) to run\n", scenarios.len());

    for (i, scenario_path) in scenarios.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, scenarios.len(), scenario_path.display());
        run_scenario_file(scenario_path, seed, export)?;
    }

    println!("\nAll scenarios complete!\n");
    Ok(())
}

fn run_scenario_file(
    path: &Path,
    seed: Option<[u8; 32]>,
    export: Option<&Path>,
) -> Result<(), ConfigError> {
    println!("Loading scenario from: {}", path.display());

    let scenario = ScenarioFile::load(path)?;

    // Print scenario header
    let name = scenario
        .meta
        .name
        .clone()
        .unwrap_or_else(|| path.display().to_string());
    println!("\n== {} ==\n", name);

    if let Some(ref desc) = scenario.meta.description {
        println!("{}\n", desc);
    }

    if let Some(ref hypothesis) = scenario.meta.hypothesis {
        println!("Hypothesis:");
        println!("  {}\n", hypothesis);
    }

    // command line seed wins over the file's
    let seed = match (seed, scenario.seed.as_deref()) {
        (Some(seed), _) => seed,
        (None, Some(hex)) => parse_seed_hex(hex)?,
        (None, None) => random_seed(),
    };
    println!("Seed: {}", seed_to_hex(&seed));
    println!("Batches: {}", scenario.batches.len());

    let runner = ScenarioRunner::new(scenario, seed);
    let result = runner.run();

    result.print_summary();

    if let Some(dir) = export {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("scenario");
        let out = dir.join(format!("{}.result.yaml", stem));
        let yaml = serde_yaml::to_string(&result).map_err(|source| ConfigError::Yaml {
            path: out.clone(),
            source,
        })?;
        fs::write(&out, yaml).map_err(|source| ConfigError::Io {
            path: out.clone(),
            source,
        })?;
        info!("result written to {}", out.display());
    }

    Ok(())
}
