// Scenario Runner - Load and execute scenario YAML files
//
// Usage:
//   cargo run --bin scenario_runner scenarios/fitness_sweep.yaml
//   cargo run --bin scenario_runner scenarios/  (runs all .yaml files in directory)
//   cargo run --bin scenario_runner scenarios/suppressor.yaml --seed 0x1234...

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use simple_logger::SimpleLogger;

use eg_rust::eg_experiment::run_experiment;
use eg_rust::eg_scenario::{format_seed, load_scenario, ScenarioFile};

fn main() {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .unwrap();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <scenario.yaml | directory/> [--seed SEED_HEX]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} scenarios/fitness_sweep.yaml", args[0]);
        eprintln!("  {} scenarios/", args[0]);
        eprintln!("  {} scenarios/suppressor.yaml --seed 0x123456...", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);

    // Seed from the command line wins over the one in the file
    let seed: Option<String> = if args.len() >= 4 && args[2] == "--seed" {
        Some(args[3].clone())
    } else {
        None
    };

    if path.is_file() {
        run_scenario_file(path, seed.as_deref());
    } else if path.is_dir() {
        run_scenario_directory(path, seed.as_deref());
    } else {
        eprintln!("Error: Path does not exist: {}", path.display());
        std::process::exit(1);
    }
}

fn run_scenario_directory(dir: &Path, seed: Option<&str>) {
    let mut scenarios: Vec<PathBuf> = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path.extension().and_then(|s| s.to_str());
            if ext == Some("yaml") || ext == Some("yml") {
                scenarios.push(path);
            }
        }
    }

    scenarios.sort();

    if scenarios.is_empty() {
        eprintln!("No .yaml files found in {}", dir.display());
        std::process::exit(1);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  SCENARIO RUNNER - Multiple Scenarios                  ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
    println!("Found {} scenario(s) to run\n", scenarios.len());

    for (i, scenario_path) in scenarios.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, scenarios.len(), scenario_path.display());
        run_scenario_file(scenario_path, seed);
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  All scenarios complete!                               ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
}

fn run_scenario_file(path: &Path, seed: Option<&str>) {
    println!("Loading scenario from: {}", path.display());

    let mut scenario: ScenarioFile = load_scenario(path).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    if let Some(seed) = seed {
        scenario.config.seed = Some(seed.to_string());
    }

    println!("\n╔════════════════════════════════════════════════════════╗");
    match scenario.meta.name {
        Some(ref name) => println!("║  {}", name),
        None => println!(
            "║  Scenario: {}",
            path.file_stem().and_then(|s| s.to_str()).unwrap_or("?")
        ),
    }
    println!("╚════════════════════════════════════════════════════════╝\n");

    if let Some(ref desc) = scenario.meta.description {
        println!("{}\n", desc);
    }

    let config = &scenario.config;
    println!("Configuration:");
    println!("  Simulations: {}", config.num_simulations);
    match config.iteration_cap {
        Some(cap) => println!("  Iteration cap: {}", cap),
        None => println!("  Iteration cap: none"),
    }
    println!("  Output: {}", config.output_dir.display());
    println!("  Experiment: {:?}", scenario.experiment);

    let seed = config.resolve_seed().unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });
    info!("seed = {}", format_seed(&seed));
    let mut rng = StdRng::from_seed(seed);

    println!("\nStarting simulation...\n");
    match run_experiment(&scenario.experiment, config, &mut rng) {
        Ok(report) => report.print_summary(),
        Err(e) => {
            eprintln!("Scenario failed: {}", e);
            std::process::exit(1);
        }
    }

    println!("\n✓ Scenario complete!\n");
}
