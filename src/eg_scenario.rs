//! Scenario files and run configuration
//!
//! A scenario is a YAML document with three sections:
//!
//! ```yaml
//! meta:
//!   name: Fitness sweep
//!   description: Fixation probability of every catalog graph, size 10
//! config:
//!   num_simulations: 10000
//!   iteration_cap: 6250000   # null disables the cap
//!   seed: "0x1f2e..."        # optional, 32 bytes hex
//!   output_dir: results
//! experiment:
//!   type: fitness_sweep
//!   size: 10
//!   min_fitness: 0.5
//!   max_fitness: 3.0
//!   step: 0.25
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Deserialize;

use crate::eg_interface::{Fitness, Step, DEFAULT_ITERATION_CAP, DEFAULT_NUM_SIMULATIONS};
use crate::eg_sweep::SweepConfig;

#[derive(Debug)]
pub enum ScenarioError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_yaml::Error },
    InvalidSeed(String),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            ScenarioError::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
            ScenarioError::InvalidSeed(msg) => write!(f, "invalid seed: {}", msg),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioError::Io { source, .. } => Some(source),
            ScenarioError::Parse { source, .. } => Some(source),
            ScenarioError::InvalidSeed(_) => None,
        }
    }
}

/// Complete scenario document
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub meta: ScenarioMeta,

    #[serde(default)]
    pub config: RunConfig,

    pub experiment: Experiment,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioMeta {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Settings shared by every experiment
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_num_simulations")]
    pub num_simulations: usize,

    /// Steps per trial before giving up; None runs until absorption
    #[serde(default = "default_iteration_cap")]
    pub iteration_cap: Option<Step>,

    /// 32-byte seed as hex; None draws one from entropy
    #[serde(default)]
    pub seed: Option<String>,

    /// Directory receiving sweep CSV files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_num_simulations() -> usize {
    DEFAULT_NUM_SIMULATIONS
}

fn default_iteration_cap() -> Option<Step> {
    Some(DEFAULT_ITERATION_CAP)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_simulations: default_num_simulations(),
            iteration_cap: default_iteration_cap(),
            seed: None,
            output_dir: default_output_dir(),
        }
    }
}

impl RunConfig {
    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            num_simulations: self.num_simulations,
            iteration_cap: self.iteration_cap,
        }
    }

    /// Configured seed, or a fresh one from entropy
    pub fn resolve_seed(&self) -> Result<[u8; 32], ScenarioError> {
        match &self.seed {
            Some(hex) => parse_seed_hex(hex),
            None => {
                let mut seed = [0u8; 32];
                StdRng::from_entropy().fill_bytes(&mut seed);
                Ok(seed)
            }
        }
    }
}

/// What to simulate
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Experiment {
    /// Every sweep graph of one size, fitness in `[min_fitness, max_fitness)`
    FitnessSweep {
        size: usize,
        min_fitness: Fitness,
        max_fitness: Fitness,
        step: Fitness,
    },

    /// Every sized sweep graph, size in `[min_size, max_size)`
    SizeSweep {
        min_size: usize,
        max_size: usize,
        step: usize,
        fitness: Fitness,
    },

    /// One catalog graph by name
    Single {
        graph: String,
        #[serde(default)]
        size: usize,
        fitness: Fitness,
    },

    /// Graph loaded from an edge-list file
    EdgeFile { path: PathBuf, fitness: Fitness },

    /// Graph loaded from an adjacency-matrix file
    MatrixFile { path: PathBuf, fitness: Fitness },
}

pub fn parse_scenario(text: &str, path: &Path) -> Result<ScenarioFile, ScenarioError> {
    serde_yaml::from_str(text).map_err(|source| ScenarioError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioFile, ScenarioError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_scenario(&text, path)
}

/// Parse up to 32 bytes of hex (optional `0x` prefix); missing bytes are zero
pub fn parse_seed_hex(hex: &str) -> Result<[u8; 32], ScenarioError> {
    let hex = hex.trim();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.is_empty() || hex.len() > 64 || hex.len() % 2 != 0 {
        return Err(ScenarioError::InvalidSeed(format!(
            "expected an even number of hex digits (max 64), got {}",
            hex.len()
        )));
    }

    let mut seed = [0u8; 32];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let byte_str = std::str::from_utf8(chunk)
            .map_err(|e| ScenarioError::InvalidSeed(e.to_string()))?;
        seed[i] = u8::from_str_radix(byte_str, 16)
            .map_err(|e| ScenarioError::InvalidSeed(format!("'{}': {}", byte_str, e)))?;
    }
    Ok(seed)
}

/// Seed as `0x`-prefixed hex, accepted back by `parse_seed_hex`
pub fn format_seed(seed: &[u8; 32]) -> String {
    let mut out = String::from("0x");
    for byte in seed {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_scenario() {
        let text = r#"
meta:
  name: Sweep
  description: fitness sweep on size 6
config:
  num_simulations: 500
  iteration_cap: null
  seed: "0x0102"
  output_dir: out
experiment:
  type: fitness_sweep
  size: 6
  min_fitness: 0.5
  max_fitness: 2.0
  step: 0.5
"#;
        let scenario = parse_scenario(text, Path::new("sweep.yaml")).unwrap();
        assert_eq!(scenario.meta.name.as_deref(), Some("Sweep"));
        assert_eq!(scenario.config.num_simulations, 500);
        assert_eq!(scenario.config.iteration_cap, None);
        assert_eq!(scenario.config.output_dir, PathBuf::from("out"));
        assert_eq!(
            scenario.experiment,
            Experiment::FitnessSweep {
                size: 6,
                min_fitness: 0.5,
                max_fitness: 2.0,
                step: 0.5
            }
        );

        let seed = scenario.config.resolve_seed().unwrap();
        assert_eq!(&seed[..3], &[1, 2, 0]);
    }

    #[test]
    fn test_config_defaults() {
        let text = "experiment:\n  type: single\n  graph: galanis_graph\n  fitness: 2\n";
        let scenario = parse_scenario(text, Path::new("single.yaml")).unwrap();
        assert_eq!(scenario.config, RunConfig::default());
        assert_eq!(scenario.config.iteration_cap, Some(DEFAULT_ITERATION_CAP));
        assert_eq!(
            scenario.experiment,
            Experiment::Single {
                graph: "galanis_graph".into(),
                size: 0,
                fitness: 2.0
            }
        );
    }

    #[test]
    fn test_parse_errors_name_the_file() {
        let err = parse_scenario("experiment:\n  type: teleport\n", Path::new("bad.yaml"))
            .unwrap_err();
        assert!(err.to_string().starts_with("failed to parse bad.yaml"));

        let err = load_scenario("/nonexistent/scenario.yaml").unwrap_err();
        assert!(matches!(err, ScenarioError::Io { .. }));
    }

    #[test]
    fn test_seed_hex_round_trip() {
        let mut seed = [0u8; 32];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = (i * 7) as u8;
        }
        let hex = format_seed(&seed);
        assert_eq!(hex.len(), 66);
        assert_eq!(parse_seed_hex(&hex).unwrap(), seed);

        assert!(parse_seed_hex("0xabc").is_err());
        assert!(parse_seed_hex("zz").is_err());
        assert!(parse_seed_hex("").is_err());
    }

    #[test]
    fn test_shipped_scenarios_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
        let mut count = 0;
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
                let scenario = load_scenario(&path).unwrap();
                assert!(scenario.meta.name.is_some(), "{} has no name", path.display());
                count += 1;
            }
        }
        assert!(count >= 5);
    }
}
