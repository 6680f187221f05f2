//! Experiment execution shared by the command-line tools

use std::fmt;
use std::path::PathBuf;

use log::info;
use rand::Rng;

use crate::eg_catalog::{GraphKind, UnknownGraph};
use crate::eg_edge_list::{graph_from_edge_file, graph_from_matrix_file, EdgeListError};
use crate::eg_graph::PopulationGraph;
use crate::eg_interface::Fitness;
use crate::eg_moran::{estimate_fixation, FixationEstimate, MoranError};
use crate::eg_scenario::{Experiment, RunConfig};
use crate::eg_sweep::{arange, fitness_sweep, size_range, size_sweep, SweepError, SweepSeries};

#[derive(Debug)]
pub enum ExperimentError {
    UnknownGraph(UnknownGraph),
    EdgeList(EdgeListError),
    Moran(MoranError),
    Sweep(SweepError),
}

impl fmt::Display for ExperimentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentError::UnknownGraph(e) => write!(f, "{}", e),
            ExperimentError::EdgeList(e) => write!(f, "{}", e),
            ExperimentError::Moran(e) => write!(f, "{}", e),
            ExperimentError::Sweep(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ExperimentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExperimentError::UnknownGraph(e) => Some(e),
            ExperimentError::EdgeList(e) => Some(e),
            ExperimentError::Moran(e) => Some(e),
            ExperimentError::Sweep(e) => Some(e),
        }
    }
}

impl From<UnknownGraph> for ExperimentError {
    fn from(e: UnknownGraph) -> Self {
        ExperimentError::UnknownGraph(e)
    }
}

impl From<EdgeListError> for ExperimentError {
    fn from(e: EdgeListError) -> Self {
        ExperimentError::EdgeList(e)
    }
}

impl From<MoranError> for ExperimentError {
    fn from(e: MoranError) -> Self {
        ExperimentError::Moran(e)
    }
}

impl From<SweepError> for ExperimentError {
    fn from(e: SweepError) -> Self {
        ExperimentError::Sweep(e)
    }
}

/// Result of one experiment
#[derive(Debug)]
pub enum ExperimentReport {
    /// Fixation estimate for a single graph
    Estimate {
        graph: String,
        nodes: usize,
        fitness: Fitness,
        estimate: FixationEstimate,
    },

    /// Sweep series and the CSV files they were written to
    Sweep {
        series: Vec<SweepSeries>,
        files: Vec<PathBuf>,
    },
}

impl ExperimentReport {
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║        Fixation Probability Results                    ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        match self {
            ExperimentReport::Estimate {
                graph,
                nodes,
                fitness,
                estimate,
            } => {
                println!("Graph: {} ({} nodes)", graph, nodes);
                println!("Fitness: {}", fitness);
                println!(
                    "Trials: {} (fixation {}, extinction {}, capped {})",
                    estimate.trials, estimate.fixations, estimate.extinctions, estimate.capped
                );
                if estimate.capped > 0 {
                    if let Some(p) = estimate.absorbed_probability() {
                        println!("Fixation among absorbed trials: {:.6}", p);
                    }
                }
                println!(
                    "\nThe average fixation probability of the graph is {}",
                    estimate.probability()
                );
            }
            ExperimentReport::Sweep { series, files } => {
                for s in series {
                    println!("{}", s.render_chart(40));
                }
                println!("Wrote {} file(s):", files.len());
                for file in files {
                    println!("  {}", file.display());
                }
            }
        }
    }
}

fn estimate_graph<R: Rng + ?Sized>(
    name: String,
    graph: &PopulationGraph,
    fitness: Fitness,
    config: &RunConfig,
    rng: &mut R,
) -> Result<ExperimentReport, ExperimentError> {
    info!(
        "estimating {} ({} nodes, fitness {}, {} trials)",
        name,
        graph.len(),
        fitness,
        config.num_simulations
    );
    let estimate = estimate_fixation(
        graph,
        fitness,
        config.num_simulations,
        config.iteration_cap,
        rng,
    )?;
    Ok(ExperimentReport::Estimate {
        graph: name,
        nodes: graph.len(),
        fitness,
        estimate,
    })
}

fn save_all(series: Vec<SweepSeries>, config: &RunConfig) -> Result<ExperimentReport, ExperimentError> {
    let mut files = Vec::with_capacity(series.len());
    for s in &series {
        files.push(s.save(&config.output_dir)?);
    }
    Ok(ExperimentReport::Sweep { series, files })
}

/// Run an experiment with the given settings and random source
pub fn run_experiment<R: Rng + ?Sized>(
    experiment: &Experiment,
    config: &RunConfig,
    rng: &mut R,
) -> Result<ExperimentReport, ExperimentError> {
    match experiment {
        Experiment::FitnessSweep {
            size,
            min_fitness,
            max_fitness,
            step,
        } => {
            let values = arange(*min_fitness, *max_fitness, *step)?;
            let series = fitness_sweep(*size, &values, config.sweep_config(), rng)?;
            save_all(series, config)
        }
        Experiment::SizeSweep {
            min_size,
            max_size,
            step,
            fitness,
        } => {
            let sizes = size_range(*min_size, *max_size, *step)?;
            let series = size_sweep(&sizes, *fitness, config.sweep_config(), rng)?;
            save_all(series, config)
        }
        Experiment::Single {
            graph,
            size,
            fitness,
        } => {
            let kind: GraphKind = graph.parse()?;
            estimate_graph(kind.name().to_string(), &kind.build(*size), *fitness, config, rng)
        }
        Experiment::EdgeFile { path, fitness } => {
            let graph = graph_from_edge_file(path)?;
            estimate_graph(path.display().to_string(), &graph, *fitness, config, rng)
        }
        Experiment::MatrixFile { path, fitness } => {
            let graph = graph_from_matrix_file(path)?;
            estimate_graph(path.display().to_string(), &graph, *fitness, config, rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eg_edge_list::write_edge_list;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(dir: &str) -> RunConfig {
        RunConfig {
            num_simulations: 40,
            iteration_cap: Some(100_000),
            seed: None,
            output_dir: std::env::temp_dir().join(format!("{}_{}", dir, std::process::id())),
        }
    }

    #[test]
    fn test_single_experiment() {
        let mut rng = StdRng::from_seed([9u8; 32]);
        let experiment = Experiment::Single {
            graph: "galanis_graph".into(),
            size: 0,
            fitness: 2.0,
        };
        match run_experiment(&experiment, &config("eg_single"), &mut rng).unwrap() {
            ExperimentReport::Estimate {
                graph,
                nodes,
                estimate,
                ..
            } => {
                assert_eq!(graph, "galanis_graph");
                assert_eq!(nodes, 3);
                assert_eq!(estimate.trials, 40);
            }
            other => panic!("unexpected report: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_graph() {
        let mut rng = StdRng::from_seed([9u8; 32]);
        let experiment = Experiment::Single {
            graph: "hypercube".into(),
            size: 4,
            fitness: 1.0,
        };
        assert!(matches!(
            run_experiment(&experiment, &config("eg_unknown"), &mut rng),
            Err(ExperimentError::UnknownGraph(_))
        ));
    }

    #[test]
    fn test_size_sweep_writes_files() {
        let mut rng = StdRng::from_seed([10u8; 32]);
        let cfg = config("eg_size_sweep");
        let experiment = Experiment::SizeSweep {
            min_size: 2,
            max_size: 5,
            step: 2,
            fitness: 1.5,
        };
        match run_experiment(&experiment, &cfg, &mut rng).unwrap() {
            ExperimentReport::Sweep { series, files } => {
                assert_eq!(series.len(), 5);
                assert_eq!(files.len(), 5);
                assert!(files.iter().all(|f| f.exists()));
                assert!(files[0].ends_with("complete_graph_population_size_fixation_probability.csv"));
            }
            other => panic!("unexpected report: {:?}", other),
        }
        std::fs::remove_dir_all(&cfg.output_dir).unwrap();
    }

    #[test]
    fn test_edge_file_experiment() {
        let mut rng = StdRng::from_seed([11u8; 32]);
        let cfg = config("eg_edge_file");
        std::fs::create_dir_all(&cfg.output_dir).unwrap();
        let path = cfg.output_dir.join("ring.txt");
        write_edge_list(&path, &[(0, 1, 1), (1, 2, 1), (2, 0, 1)]).unwrap();

        let experiment = Experiment::EdgeFile {
            path: path.clone(),
            fitness: 1.0,
        };
        match run_experiment(&experiment, &cfg, &mut rng).unwrap() {
            ExperimentReport::Estimate { nodes, estimate, .. } => {
                assert_eq!(nodes, 3);
                assert_eq!(estimate.capped, 0);
            }
            other => panic!("unexpected report: {:?}", other),
        }

        let missing = Experiment::MatrixFile {
            path: cfg.output_dir.join("missing.txt"),
            fitness: 1.0,
        };
        assert!(matches!(
            run_experiment(&missing, &cfg, &mut rng),
            Err(ExperimentError::EdgeList(_))
        ));
        std::fs::remove_dir_all(&cfg.output_dir).unwrap();
    }
}
