//! Frame-by-frame animation of population dynamics
//!
//! Animations only produce `Frame`s; rendering is up to the `FrameSink`.
//! Two dynamics are available:
//!
//! - `animate_moran`: one Moran step per frame, stops on fixation or extinction
//! - `animate_mutation_drift`: neutral copying plus random mutation (no
//!   selection), starts all-resident and stops once every node is mutant

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::eg_graph::PopulationGraph;
use crate::eg_interface::{Frame, FrameSink, Label, TrialOutcome};
use crate::eg_moran::MoranSimulator;

#[derive(Debug, Clone, PartialEq)]
pub enum AnimationError {
    EmptyGraph,

    /// Mutation rate outside [0, 1]
    InvalidMutationRate(f64),
}

impl fmt::Display for AnimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimationError::EmptyGraph => write!(f, "graph has no nodes"),
            AnimationError::InvalidMutationRate(r) => {
                write!(f, "mutation rate must be within [0, 1], got {}", r)
            }
        }
    }
}

impl std::error::Error for AnimationError {}

/// How an animation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSummary {
    /// Frames delivered to the sink, including frame 0
    pub frames: usize,

    /// Mutants in the last frame
    pub mutants: usize,

    /// Set when the animation stopped because the population became uniform
    pub outcome: Option<TrialOutcome>,
}

/// Animate one Moran trial, at most `max_frames` frames
pub fn animate_moran<R: Rng + ?Sized, S: FrameSink + ?Sized>(
    sim: &MoranSimulator<'_>,
    max_frames: usize,
    rng: &mut R,
    sink: &mut S,
) -> AnimationSummary {
    let mut process = sim.start(rng);
    let mut frame = Frame {
        step: 0,
        labels: process.labels().to_vec(),
        reproducer: None,
        new_mutant: None,
    };
    let mut frames = 0;

    while frames < max_frames {
        sink.frame(&frame);
        frames += 1;
        if process.outcome().is_some() {
            break;
        }

        let report = match process.step(rng) {
            Some(report) => report,
            None => break,
        };
        frame.step += 1;
        frame.labels.copy_from_slice(process.labels());
        frame.reproducer = report.replaced.map(|_| report.reproducer);
        frame.new_mutant = None;
    }

    debug!("moran animation: {} frames, {} mutants", frames, process.mutant_count());
    AnimationSummary {
        frames,
        mutants: process.mutant_count(),
        outcome: process.outcome(),
    }
}

/// Animate copying with random mutation
///
/// Each frame a uniformly chosen node copies its label onto a uniformly chosen
/// out-neighbor (if it has one), then a uniformly chosen node turns mutant with
/// probability `mutation_rate`.
pub fn animate_mutation_drift<R: Rng + ?Sized, S: FrameSink + ?Sized>(
    graph: &PopulationGraph,
    mutation_rate: f64,
    max_frames: usize,
    rng: &mut R,
    sink: &mut S,
) -> Result<AnimationSummary, AnimationError> {
    if graph.is_empty() {
        return Err(AnimationError::EmptyGraph);
    }
    if !(0.0..=1.0).contains(&mutation_rate) {
        return Err(AnimationError::InvalidMutationRate(mutation_rate));
    }

    let mut frame = Frame {
        step: 0,
        labels: vec![Label::Resident; graph.len()],
        reproducer: None,
        new_mutant: None,
    };
    let mut frames = 0;

    while frames < max_frames {
        if frame.step > 0 {
            drift_step(graph, mutation_rate, rng, &mut frame);
        }
        sink.frame(&frame);
        frames += 1;
        if frame.labels.iter().all(|l| l.is_mutant()) {
            break;
        }
        frame.step += 1;
    }

    let mutants = frame.mutants();
    Ok(AnimationSummary {
        frames,
        mutants,
        outcome: (mutants == graph.len()).then_some(TrialOutcome::Fixation),
    })
}

fn drift_step<R: Rng + ?Sized>(
    graph: &PopulationGraph,
    mutation_rate: f64,
    rng: &mut R,
    frame: &mut Frame,
) {
    let reproducer = rng.gen_range(0..graph.len());
    frame.reproducer = graph.neighbors(reproducer).choose(rng).map(|&(child, _)| {
        frame.labels[child] = frame.labels[reproducer];
        reproducer
    });

    let candidate = rng.gen_range(0..graph.len());
    let mutates = rng.gen_bool(mutation_rate);
    frame.new_mutant = if mutates && !frame.labels[candidate].is_mutant() {
        frame.labels[candidate] = Label::Mutant;
        Some(candidate)
    } else {
        None
    };
}

// ============================================================================
// Console Sink
// ============================================================================

/// Prints one line per frame: step, node glyphs, and what happened
pub struct ConsoleFrameSink {
    enabled: bool,
}

impl ConsoleFrameSink {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

/// Text rendering of a frame, `R` for mutant (red) and `B` for resident (blue)
pub fn render_frame(frame: &Frame) -> String {
    let glyphs: String = frame.labels.iter().map(|l| l.glyph()).collect();
    let mut line = format!("Step: {:>4}  {}", frame.step, glyphs);
    if let Some(node) = frame.reproducer {
        line.push_str(&format!("  Node {} reproduces", node));
    }
    if let Some(node) = frame.new_mutant {
        line.push_str(&format!("  Node {} becomes mutant", node));
    }
    line
}

impl FrameSink for ConsoleFrameSink {
    fn frame(&mut self, frame: &Frame) {
        if self.enabled {
            println!("{}", render_frame(frame));
        }
    }
}

// ============================================================================
// CSV Sink
// ============================================================================

/// One CSV row per frame
pub struct CsvFrameSink<W: Write = BufWriter<File>> {
    writer: W,

    /// Rows that failed to write
    write_errors: usize,
}

impl CsvFrameSink {
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Self::from_writer(BufWriter::new(file))
    }
}

impl<W: Write> CsvFrameSink<W> {
    /// Write the header to `writer` and return a sink appending rows to it
    pub fn from_writer(mut writer: W) -> std::io::Result<Self> {
        writeln!(writer, "step,mutants,reproducer,new_mutant,labels")?;
        Ok(Self {
            writer,
            write_errors: 0,
        })
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    pub fn write_errors(&self) -> usize {
        self.write_errors
    }
}

fn optional(node: Option<usize>) -> String {
    node.map(|n| n.to_string()).unwrap_or_default()
}

impl<W: Write> FrameSink for CsvFrameSink<W> {
    fn frame(&mut self, frame: &Frame) {
        let glyphs: String = frame.labels.iter().map(|l| l.glyph()).collect();
        let result = writeln!(
            self.writer,
            "{},{},{},{},{}",
            frame.step,
            frame.mutants(),
            optional(frame.reproducer),
            optional(frame.new_mutant),
            glyphs
        );

        if let Err(e) = result {
            self.write_errors += 1;
            eprintln!("Error writing to CSV: {}", e);
        }
    }
}

impl<W: Write> Drop for CsvFrameSink<W> {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
