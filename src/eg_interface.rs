//! Shared types for the population simulators.

use std::fmt;

/// Dense node index inside a `PopulationGraph` (`0..len`)
pub type NodeId = usize;

/// Relative reproductive weight of the mutant type (residents are 1.0)
pub type Fitness = f64;

/// Step counter used by the simulators
pub type Step = u64;

/// Safety valve for a single trial: 50^4 steps
pub const DEFAULT_ITERATION_CAP: Step = 50 * 50 * 50 * 50;

/// Trials per estimate used by the command-line tools
pub const DEFAULT_NUM_SIMULATIONS: usize = 100_000;

/// Frames rendered by an animation before it gives up
pub const DEFAULT_MAX_FRAMES: usize = 200;

/// Type carried by a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Resident,
    Mutant,
}

impl Label {
    pub fn is_mutant(self) -> bool {
        self == Label::Mutant
    }

    /// Single character used by text renderings (red mutant, blue resident)
    pub fn glyph(self) -> char {
        match self {
            Label::Mutant => 'R',
            Label::Resident => 'B',
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Mutant => write!(f, "mutant"),
            Label::Resident => write!(f, "resident"),
        }
    }
}

/// How a single Moran trial ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    /// Every node carries the mutant label
    Fixation,

    /// The mutant label disappeared
    Extinction,

    /// Iteration cap reached (or the state can never change) before absorption
    Capped { mutants: usize },
}

impl TrialOutcome {
    pub fn is_fixation(&self) -> bool {
        matches!(self, TrialOutcome::Fixation)
    }

    pub fn is_absorbed(&self) -> bool {
        !matches!(self, TrialOutcome::Capped { .. })
    }
}

/// One rendered state of an animation
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Frame index, 0 is the initial state
    pub step: usize,

    /// Label of every node after this frame's update
    pub labels: Vec<Label>,

    /// Node that reproduced onto a neighbor during this frame
    pub reproducer: Option<NodeId>,

    /// Node that mutated during this frame
    pub new_mutant: Option<NodeId>,
}

impl Frame {
    pub fn mutants(&self) -> usize {
        self.labels.iter().filter(|l| l.is_mutant()).count()
    }

    /// All nodes share one label
    pub fn is_uniform(&self) -> bool {
        self.labels.windows(2).all(|w| w[0] == w[1])
    }
}

/// Output side of the animations
pub trait FrameSink {
    fn frame(&mut self, frame: &Frame);
}

/// Frame sink that discards everything
pub struct NoOpSink;

impl FrameSink for NoOpSink {
    #[inline(always)]
    fn frame(&mut self, _frame: &Frame) {}
}

/// Frame sink that keeps every frame in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub frames: Vec<Frame>,
}

impl FrameSink for CollectingSink {
    fn frame(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cap_is_fifty_to_the_fourth() {
        assert_eq!(DEFAULT_ITERATION_CAP, 6_250_000);
    }

    #[test]
    fn test_frame_uniformity() {
        let mut frame = Frame {
            step: 0,
            labels: vec![Label::Resident, Label::Mutant],
            reproducer: None,
            new_mutant: None,
        };
        assert!(!frame.is_uniform());
        assert_eq!(frame.mutants(), 1);

        frame.labels[0] = Label::Mutant;
        assert!(frame.is_uniform());
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(TrialOutcome::Fixation.is_fixation());
        assert!(TrialOutcome::Extinction.is_absorbed());
        assert!(!TrialOutcome::Capped { mutants: 3 }.is_absorbed());
        assert!(!TrialOutcome::Capped { mutants: 3 }.is_fixation());
    }
}
