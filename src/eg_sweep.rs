//! Parameter sweeps over the graph catalog
//!
//! Fixation probability as a function of mutant fitness (fixed size) or of
//! population size (fixed fitness). Each graph yields one `SweepSeries`, which
//! can be written as CSV or rendered as a text chart.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use rand::Rng;

use crate::eg_catalog::GraphKind;
use crate::eg_interface::{Fitness, Step, DEFAULT_ITERATION_CAP, DEFAULT_NUM_SIMULATIONS};
use crate::eg_moran::{estimate_fixation, FixationEstimate, MoranError};

#[derive(Debug)]
pub enum SweepError {
    /// Range bounds or step are unusable
    InvalidRange(String),

    /// A simulation could not run
    Moran(MoranError),

    /// Output could not be written
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::InvalidRange(msg) => write!(f, "invalid range: {}", msg),
            SweepError::Moran(e) => write!(f, "simulation failed: {}", e),
            SweepError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweepError::Moran(e) => Some(e),
            SweepError::Io { source, .. } => Some(source),
            SweepError::InvalidRange(_) => None,
        }
    }
}

impl From<MoranError> for SweepError {
    fn from(e: MoranError) -> Self {
        SweepError::Moran(e)
    }
}

/// Trials per point and cap per trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepConfig {
    pub num_simulations: usize,
    pub iteration_cap: Option<Step>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            num_simulations: DEFAULT_NUM_SIMULATIONS,
            iteration_cap: Some(DEFAULT_ITERATION_CAP),
        }
    }
}

/// Which quantity varies along a series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepAxis {
    Fitness,
    PopulationSize,
}

impl SweepAxis {
    pub fn label(self) -> &'static str {
        match self {
            SweepAxis::Fitness => "fitness",
            SweepAxis::PopulationSize => "population_size",
        }
    }

    /// Output file name for a graph's series
    pub fn file_name(self, graph: &str) -> String {
        match self {
            SweepAxis::Fitness => format!("{}_fixation_probability.csv", graph),
            SweepAxis::PopulationSize => {
                format!("{}_population_size_fixation_probability.csv", graph)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    pub x: f64,
    pub estimate: FixationEstimate,
}

/// Fixation estimates of one graph along the sweep axis
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSeries {
    pub graph: String,
    pub axis: SweepAxis,
    pub points: Vec<SweepPoint>,
}

impl SweepSeries {
    pub fn probabilities(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.estimate.probability()).collect()
    }

    pub fn write_csv<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "{},fixation_probability,fixations,extinctions,capped,trials",
            self.axis.label()
        )?;
        for point in &self.points {
            let e = &point.estimate;
            writeln!(
                out,
                "{},{},{},{},{},{}",
                point.x,
                e.probability(),
                e.fixations,
                e.extinctions,
                e.capped,
                e.trials
            )?;
        }
        Ok(())
    }

    /// Write the series into `dir`, returning the file path
    pub fn save(&self, dir: &Path) -> Result<PathBuf, SweepError> {
        let path = dir.join(self.axis.file_name(&self.graph));
        let io_err = |source| SweepError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(dir).map_err(io_err)?;
        let mut writer = BufWriter::new(File::create(&path).map_err(io_err)?);
        self.write_csv(&mut writer).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        Ok(path)
    }

    /// Horizontal bar chart, probability axis fixed to [0, 1]
    pub fn render_chart(&self, width: usize) -> String {
        let mut out = format!("{} ({} vs fixation probability)\n", self.graph, self.axis.label());
        for point in &self.points {
            let p = point.estimate.probability();
            let bar = (p.clamp(0.0, 1.0) * width as f64).round() as usize;
            out.push_str(&format!(
                "{:>8.3} | {:<w$} {:.4}\n",
                point.x,
                "#".repeat(bar),
                p,
                w = width
            ));
        }
        out
    }
}

/// Half-open float range `[start, stop)` in increments of `step`
pub fn arange(start: f64, stop: f64, step: f64) -> Result<Vec<f64>, SweepError> {
    if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
        return Err(SweepError::InvalidRange("bounds must be finite".into()));
    }
    if step <= 0.0 {
        return Err(SweepError::InvalidRange(format!("step must be positive, got {}", step)));
    }
    let count = ((stop - start) / step).ceil().max(0.0) as usize;
    Ok((0..count).map(|i| start + i as f64 * step).collect())
}

/// Half-open integer range `[start, stop)` in increments of `step`
pub fn size_range(start: usize, stop: usize, step: usize) -> Result<Vec<usize>, SweepError> {
    if step == 0 {
        return Err(SweepError::InvalidRange("step must be positive".into()));
    }
    if start == 0 {
        return Err(SweepError::InvalidRange("population size must be at least 1".into()));
    }
    Ok((start..stop).step_by(step).collect())
}

/// Fixation probability against fitness for every sweep graph of one size
pub fn fitness_sweep<R: Rng + ?Sized>(
    size: usize,
    fitness_values: &[Fitness],
    config: SweepConfig,
    rng: &mut R,
) -> Result<Vec<SweepSeries>, SweepError> {
    let mut all = Vec::new();
    for kind in GraphKind::SWEEP {
        let graph = kind.build(size);
        info!(
            "{}: {} nodes, {} fitness values",
            kind,
            graph.len(),
            fitness_values.len()
        );

        let mut points = Vec::with_capacity(fitness_values.len());
        for &fitness in fitness_values {
            let estimate =
                estimate_fixation(&graph, fitness, config.num_simulations, config.iteration_cap, rng)?;
            points.push(SweepPoint {
                x: fitness,
                estimate,
            });
        }

        all.push(SweepSeries {
            graph: kind.name().to_string(),
            axis: SweepAxis::Fitness,
            points,
        });
    }
    Ok(all)
}

/// Fixation probability against population size; the fixed-size Galanis graph is skipped
pub fn size_sweep<R: Rng + ?Sized>(
    sizes: &[usize],
    fitness: Fitness,
    config: SweepConfig,
    rng: &mut R,
) -> Result<Vec<SweepSeries>, SweepError> {
    let mut all = Vec::new();
    for kind in GraphKind::SWEEP.into_iter().filter(|k| k.is_sized()) {
        info!("{}: {} sizes at fitness {}", kind, sizes.len(), fitness);

        let mut points = Vec::with_capacity(sizes.len());
        for &size in sizes {
            let graph = kind.build(size);
            let estimate =
                estimate_fixation(&graph, fitness, config.num_simulations, config.iteration_cap, rng)?;
            points.push(SweepPoint {
                x: size as f64,
                estimate,
            });
        }

        all.push(SweepSeries {
            graph: kind.name().to_string(),
            axis: SweepAxis::PopulationSize,
            points,
        });
    }
    Ok(all)
}
