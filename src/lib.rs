//! # egRust - Evolutionary dynamics on graphs
//!
//! Monte Carlo simulation of the Moran process with selection on
//! graph-structured populations.
//!
//! ## Core Components
//!
//! - **PopulationGraph**: directed adjacency lists with optional replacement weights
//! - **Graph catalog**: complete, cycle, line, star, burst, fixation suppressor
//!   and the 3-node weighted counterexample
//! - **MoranSimulator**: single trials to fixation/extinction and the
//!   fixation-probability estimator
//! - **Sweeps**: fixation probability against fitness or population size
//! - **Animation**: frame sequences delivered to a `FrameSink`
//!
//! Randomness is always injected, so a seeded `StdRng` reproduces a run:
//!
//! ```no_run
//! use eg_rust::eg_catalog::complete_graph;
//! use eg_rust::eg_moran::estimate_fixation;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let graph = complete_graph(10, false);
//! let mut rng = StdRng::from_seed([0u8; 32]);
//! let estimate = estimate_fixation(&graph, 1.0, 10_000, Some(6_250_000), &mut rng)?;
//! println!("fixation probability {}", estimate.probability());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Command-line tools
//!
//! - `evo-graphs`: estimates and sweeps from command-line flags
//! - `scenario_runner`: experiments described in YAML files under `scenarios/`
//! - `animation_runner`: frame-by-frame console animations

pub mod eg_interface;
pub mod eg_graph;
pub mod eg_catalog;
pub mod eg_edge_list;
pub mod eg_moran;

pub mod eg_sweep;
pub mod eg_animation;

// Configuration and experiment execution for the binaries
pub mod eg_scenario;
pub mod eg_experiment;

// Re-export commonly used types
pub use eg_catalog::{generate_graphs, GraphKind};
pub use eg_graph::{Edge, PopulationGraph};
pub use eg_interface::{
    Fitness, Frame, FrameSink, Label, NoOpSink, NodeId, TrialOutcome, DEFAULT_ITERATION_CAP,
    DEFAULT_NUM_SIMULATIONS,
};
pub use eg_moran::{
    average_fixation_probability, estimate_fixation, run_trial, FixationEstimate, MoranError,
    MoranSimulator,
};
