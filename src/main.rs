// Fixation probability estimator
//
// Usage:
//   evo-graphs -fitnessPlot <size> <minF> <maxF> <step>
//   evo-graphs -sizePlot <minSize> <maxSize> <step> <fitness>
//   evo-graphs -counterExampleProb <fitness>
//   evo-graphs -sup <size> <fitness>
//   evo-graphs -graph <name> <size> <fitness>
//   evo-graphs -file <edges.txt> <fitness>
//   evo-graphs -matrix <matrix.txt> <fitness>
//
// Options: --simulations N, --cap N|none, --seed HEX, --out DIR

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use log::{info, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use simple_logger::SimpleLogger;

use eg_rust::eg_experiment::run_experiment;
use eg_rust::eg_scenario::{format_seed, Experiment, RunConfig};

fn main() {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .unwrap();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("evo-graphs");

    let (experiment, config) = match parse_args(&args[1.min(args.len())..]) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("Error: {}\n", msg);
            print_usage(program);
            std::process::exit(1);
        }
    };

    let seed = config.resolve_seed().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    info!("seed = {}", format_seed(&seed));
    let mut rng = StdRng::from_seed(seed);

    match run_experiment(&experiment, &config, &mut rng) {
        Ok(report) => report.print_summary(),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage:");
    eprintln!("  {} -fitnessPlot <size> <minF> <maxF> <step>", program);
    eprintln!("  {} -sizePlot <minSize> <maxSize> <step> <fitness>", program);
    eprintln!("  {} -counterExampleProb <fitness>", program);
    eprintln!("  {} -sup <size> <fitness>", program);
    eprintln!("  {} -graph <name> <size> <fitness>", program);
    eprintln!("  {} -file <edges.txt> <fitness>", program);
    eprintln!("  {} -matrix <matrix.txt> <fitness>", program);
    eprintln!("\nOptions:");
    eprintln!("  --simulations N   trials per estimate (default 100000)");
    eprintln!("  --cap N|none      steps per trial before giving up (default 6250000)");
    eprintln!("  --seed HEX        32-byte seed for reproducible runs");
    eprintln!("  --out DIR         directory for sweep CSV files (default .)");
}

fn parse_value<T: FromStr>(name: &str, value: Option<&String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("missing <{}>", name))?;
    value
        .parse()
        .map_err(|_| format!("invalid <{}>: '{}'", name, value))
}

/// Split command, positionals and `--` options into an experiment and its settings
fn parse_args(args: &[String]) -> Result<(Experiment, RunConfig), String> {
    let mut config = RunConfig::default();
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--simulations" => config.num_simulations = parse_value("N", iter.next())?,
            "--cap" => {
                let value = iter.next().ok_or("missing value for --cap")?;
                config.iteration_cap = if value == "none" {
                    None
                } else {
                    Some(parse_value("cap", Some(value))?)
                };
            }
            "--seed" => config.seed = Some(parse_value("seed", iter.next())?),
            "--out" => config.output_dir = parse_value::<PathBuf>("dir", iter.next())?,
            _ => positional.push(arg),
        }
    }

    let (command, rest) = positional.split_first().ok_or("missing command")?;
    let arg = |i: usize| rest.get(i).copied();
    let experiment = match command.as_str() {
        "-fitnessPlot" => Experiment::FitnessSweep {
            size: parse_value("size", arg(0))?,
            min_fitness: parse_value("minF", arg(1))?,
            max_fitness: parse_value("maxF", arg(2))?,
            step: parse_value("step", arg(3))?,
        },
        "-sizePlot" => Experiment::SizeSweep {
            min_size: parse_value("minSize", arg(0))?,
            max_size: parse_value("maxSize", arg(1))?,
            step: parse_value("step", arg(2))?,
            fitness: parse_value("fitness", arg(3))?,
        },
        "-counterExampleProb" => Experiment::Single {
            graph: "galanis_graph".to_string(),
            size: 3,
            fitness: parse_value("fitness", arg(0))?,
        },
        "-sup" => Experiment::Single {
            graph: "fixation_supressor".to_string(),
            size: parse_value("size", arg(0))?,
            fitness: parse_value("fitness", arg(1))?,
        },
        "-graph" => Experiment::Single {
            graph: parse_value("name", arg(0))?,
            size: parse_value("size", arg(1))?,
            fitness: parse_value("fitness", arg(2))?,
        },
        "-file" => Experiment::EdgeFile {
            path: parse_value("edges.txt", arg(0))?,
            fitness: parse_value("fitness", arg(1))?,
        },
        "-matrix" => Experiment::MatrixFile {
            path: parse_value("matrix.txt", arg(0))?,
            fitness: parse_value("fitness", arg(1))?,
        },
        other => return Err(format!("unknown command '{}'", other)),
    };

    Ok((experiment, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_fitness_plot() {
        let (experiment, config) = parse_args(&args("-fitnessPlot 10 0.5 3 0.25")).unwrap();
        assert_eq!(
            experiment,
            Experiment::FitnessSweep {
                size: 10,
                min_fitness: 0.5,
                max_fitness: 3.0,
                step: 0.25
            }
        );
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_options_anywhere() {
        let (experiment, config) =
            parse_args(&args("--simulations 200 -sup 5 --cap none 1.5 --out results")).unwrap();
        assert_eq!(
            experiment,
            Experiment::Single {
                graph: "fixation_supressor".into(),
                size: 5,
                fitness: 1.5
            }
        );
        assert_eq!(config.num_simulations, 200);
        assert_eq!(config.iteration_cap, None);
        assert_eq!(config.output_dir, PathBuf::from("results"));
    }

    #[test]
    fn test_malformed_arguments() {
        assert_eq!(
            parse_args(&args("-sizePlot 3 10 x 1.0")).unwrap_err(),
            "invalid <step>: 'x'"
        );
        assert_eq!(
            parse_args(&args("-sup 5")).unwrap_err(),
            "missing <fitness>"
        );
        assert!(parse_args(&args("-teleport 1")).is_err());
        assert!(parse_args(&[]).is_err());
        assert!(parse_args(&args("-sup 5 1.0 --cap")).is_err());
    }
}
