//! Moran process with selection on a population graph
//!
//! One trial starts from a single uniformly placed mutant and repeats
//! birth-death steps until the mutant label fixates or dies out:
//!
//! 1. pick a reproducer among all nodes, weight `fitness` for mutants and 1
//!    for residents
//! 2. pick one of its out-neighbors, weighted by edge weight
//! 3. copy the reproducer's label onto that neighbor
//!
//! A reproducer without usable out-neighbors replaces nobody but the step still
//! counts. The iteration cap ends a trial that has not absorbed; such trials are
//! reported as `TrialOutcome::Capped` and never count as fixation. A mixed state
//! in which no step can change any label is reported the same way, with or
//! without a cap.

use std::fmt;

use log::{debug, warn};
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;

use crate::eg_graph::PopulationGraph;
use crate::eg_interface::{Fitness, Label, NodeId, Step, TrialOutcome, DEFAULT_ITERATION_CAP};

#[derive(Debug, Clone, PartialEq)]
pub enum MoranError {
    /// Graph has no nodes
    EmptyGraph,

    /// Fitness must be finite and non-negative
    InvalidFitness(Fitness),

    /// An edge weight is negative or not a number
    InvalidEdgeWeight { node: NodeId },

    /// Estimator asked for zero trials
    NoSimulations,
}

impl fmt::Display for MoranError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoranError::EmptyGraph => write!(f, "graph has no nodes"),
            MoranError::InvalidFitness(v) => {
                write!(f, "fitness must be finite and non-negative, got {}", v)
            }
            MoranError::InvalidEdgeWeight { node } => {
                write!(f, "node {} has an invalid outgoing edge weight", node)
            }
            MoranError::NoSimulations => write!(f, "number of simulations must be positive"),
        }
    }
}

impl std::error::Error for MoranError {}

/// What happened during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub reproducer: NodeId,

    /// Neighbor that received the reproducer's label, None if it had no neighbors
    pub replaced: Option<NodeId>,
}

/// Graph and fitness prepared for running trials
///
/// Neighbor distributions are built once and shared by every trial.
pub struct MoranSimulator<'g> {
    graph: &'g PopulationGraph,
    fitness: Fitness,

    /// Replacement distribution per node, None when it cannot replace anyone
    replacement: Vec<Option<WeightedIndex<f64>>>,

    /// Out-neighbors reachable with positive weight
    targets: Vec<Vec<NodeId>>,
}

impl<'g> MoranSimulator<'g> {
    pub fn new(graph: &'g PopulationGraph, fitness: Fitness) -> Result<Self, MoranError> {
        if graph.is_empty() {
            return Err(MoranError::EmptyGraph);
        }
        if !fitness.is_finite() || fitness < 0.0 {
            return Err(MoranError::InvalidFitness(fitness));
        }

        let mut replacement = Vec::with_capacity(graph.len());
        let mut targets = Vec::with_capacity(graph.len());
        for node in 0..graph.len() {
            let weights = graph.neighbor_weights(node);
            let choice = match WeightedIndex::new(&weights) {
                Ok(dist) => Some(dist),
                Err(WeightedError::InvalidWeight) => {
                    return Err(MoranError::InvalidEdgeWeight { node })
                }
                Err(_) => None,
            };
            replacement.push(choice);
            targets.push(
                graph
                    .neighbors(node)
                    .iter()
                    .zip(&weights)
                    .filter(|&(_, &w)| w > 0.0)
                    .map(|(&(target, _), _)| target)
                    .collect(),
            );
        }

        Ok(Self {
            graph,
            fitness,
            replacement,
            targets,
        })
    }

    pub fn graph(&self) -> &PopulationGraph {
        self.graph
    }

    pub fn fitness(&self) -> Fitness {
        self.fitness
    }

    /// New trial with one uniformly chosen mutant
    pub fn start<R: Rng + ?Sized>(&self, rng: &mut R) -> MoranProcess<'_> {
        let node = rng.gen_range(0..self.graph.len());
        self.start_at(node)
    }

    /// New trial with the mutant placed on `node`
    pub fn start_at(&self, node: NodeId) -> MoranProcess<'_> {
        MoranProcess::new(self, node)
    }

    /// Run one trial to absorption or the cap
    pub fn run_trial<R: Rng + ?Sized>(&self, iteration_cap: Option<Step>, rng: &mut R) -> TrialOutcome {
        let mut process = self.start(rng);
        process.run(iteration_cap, rng)
    }
}

/// State of a single trial
///
/// Nodes are kept in two pools (mutants, residents) so a fitness-weighted
/// reproducer is drawn in constant time.
pub struct MoranProcess<'a> {
    sim: &'a MoranSimulator<'a>,
    labels: Vec<Label>,
    mutants: Vec<NodeId>,
    residents: Vec<NodeId>,

    /// Position of each node inside its pool
    slot: Vec<usize>,

    steps: Step,
}

impl<'a> MoranProcess<'a> {
    fn new(sim: &'a MoranSimulator<'a>, mutant: NodeId) -> Self {
        let n = sim.graph.len();
        let mut labels = vec![Label::Resident; n];
        labels[mutant] = Label::Mutant;

        let mut mutants = Vec::with_capacity(n);
        let mut residents = Vec::with_capacity(n);
        let mut slot = vec![0; n];
        for (node, label) in labels.iter().enumerate() {
            let pool = if label.is_mutant() {
                &mut mutants
            } else {
                &mut residents
            };
            slot[node] = pool.len();
            pool.push(node);
        }

        Self {
            sim,
            labels,
            mutants,
            residents,
            slot,
            steps: 0,
        }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn mutant_count(&self) -> usize {
        self.mutants.len()
    }

    pub fn steps(&self) -> Step {
        self.steps
    }

    /// Fixation or extinction, None while both labels are present
    pub fn outcome(&self) -> Option<TrialOutcome> {
        if self.residents.is_empty() {
            Some(TrialOutcome::Fixation)
        } else if self.mutants.is_empty() {
            Some(TrialOutcome::Extinction)
        } else {
            None
        }
    }

    /// Perform one birth-death step; None once the trial has absorbed
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<StepReport> {
        if self.outcome().is_some() {
            return None;
        }
        self.steps += 1;

        let reproducer = self.pick_reproducer(rng);
        let replaced = self.sim.replacement[reproducer].as_ref().map(|dist| {
            let (target, _) = self.sim.graph.neighbors(reproducer)[dist.sample(rng)];
            target
        });

        if let Some(target) = replaced {
            self.relabel(target, self.labels[reproducer]);
        }

        Some(StepReport {
            reproducer,
            replaced,
        })
    }

    /// Step until absorption; `iteration_cap` bounds the number of steps
    ///
    /// A state where no step can change a label ends the trial as `Capped`.
    /// It is checked at the start and after runs of steps that changed
    /// nothing, each run twice as long as the one before.
    pub fn run<R: Rng + ?Sized>(&mut self, iteration_cap: Option<Step>, rng: &mut R) -> TrialOutcome {
        let patience = self.sim.graph.len() as Step;
        let mut next_check: Step = 0;
        let mut idle: Step = 0;
        loop {
            if let Some(outcome) = self.outcome() {
                return outcome;
            }
            if iteration_cap.map_or(false, |cap| self.steps >= cap) {
                debug!(
                    "trial capped after {} steps with {} mutants",
                    self.steps,
                    self.mutants.len()
                );
                return self.capped();
            }
            if idle >= next_check {
                if self.is_frozen() {
                    debug!(
                        "trial frozen after {} steps with {} mutants",
                        self.steps,
                        self.mutants.len()
                    );
                    return self.capped();
                }
                next_check = (next_check * 2).max(patience);
            }

            let before = self.mutants.len();
            self.step(rng);
            if self.mutants.len() == before {
                idle += 1;
            } else {
                idle = 0;
            }
        }
    }

    fn capped(&self) -> TrialOutcome {
        TrialOutcome::Capped {
            mutants: self.mutants.len(),
        }
    }

    /// True when no possible step changes any label
    pub fn is_frozen(&self) -> bool {
        let share = self.mutant_share();
        !self.labels.iter().enumerate().any(|(node, &label)| {
            let reproduces = match label {
                Label::Mutant => share > 0.0,
                Label::Resident => share < 1.0,
            };
            reproduces && self.sim.targets[node].iter().any(|&t| self.labels[t] != label)
        })
    }

    /// Probability that the reproducer is drawn from the mutant pool,
    /// `1 / (1 + r / (fitness * m))`; saturates at 1 for huge fitness
    fn mutant_share(&self) -> f64 {
        if self.mutants.is_empty() || self.sim.fitness == 0.0 {
            return 0.0;
        }
        if self.residents.is_empty() {
            return 1.0;
        }
        let mutant_weight = self.sim.fitness * self.mutants.len() as f64;
        1.0 / (1.0 + self.residents.len() as f64 / mutant_weight)
    }

    fn pick_reproducer<R: Rng + ?Sized>(&self, rng: &mut R) -> NodeId {
        if rng.gen::<f64>() < self.mutant_share() {
            self.mutants[rng.gen_range(0..self.mutants.len())]
        } else {
            self.residents[rng.gen_range(0..self.residents.len())]
        }
    }

    fn relabel(&mut self, node: NodeId, label: Label) {
        if self.labels[node] == label {
            return;
        }
        let (from, to) = match label {
            Label::Mutant => (&mut self.residents, &mut self.mutants),
            Label::Resident => (&mut self.mutants, &mut self.residents),
        };

        let idx = self.slot[node];
        from.swap_remove(idx);
        if let Some(&moved) = from.get(idx) {
            self.slot[moved] = idx;
        }
        self.slot[node] = to.len();
        to.push(node);
        self.labels[node] = label;
    }
}

/// Tally of repeated trials
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixationEstimate {
    pub trials: usize,
    pub fixations: usize,
    pub extinctions: usize,
    pub capped: usize,
}

impl FixationEstimate {
    pub fn record(&mut self, outcome: TrialOutcome) {
        self.trials += 1;
        match outcome {
            TrialOutcome::Fixation => self.fixations += 1,
            TrialOutcome::Extinction => self.extinctions += 1,
            TrialOutcome::Capped { .. } => self.capped += 1,
        }
    }

    /// Fraction of all trials that fixated; capped trials count as non-fixation
    pub fn probability(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.fixations as f64 / self.trials as f64
    }

    /// Fixation fraction among trials that absorbed
    pub fn absorbed_probability(&self) -> Option<f64> {
        let absorbed = self.fixations + self.extinctions;
        (absorbed > 0).then(|| self.fixations as f64 / absorbed as f64)
    }
}

/// Run `num_simulations` independent trials and tally the outcomes
pub fn estimate_fixation<R: Rng + ?Sized>(
    graph: &PopulationGraph,
    fitness: Fitness,
    num_simulations: usize,
    iteration_cap: Option<Step>,
    rng: &mut R,
) -> Result<FixationEstimate, MoranError> {
    if num_simulations == 0 {
        return Err(MoranError::NoSimulations);
    }
    let sim = MoranSimulator::new(graph, fitness)?;

    let mut estimate = FixationEstimate::default();
    for _ in 0..num_simulations {
        estimate.record(sim.run_trial(iteration_cap, rng));
    }

    if estimate.capped > 0 {
        warn!(
            "{} of {} trials hit the iteration cap without absorbing (fitness {})",
            estimate.capped, estimate.trials, fitness
        );
    }
    debug!(
        "fitness {}: {} fixations / {} trials",
        fitness, estimate.fixations, estimate.trials
    );

    Ok(estimate)
}

/// Fixation probability with the default iteration cap
pub fn average_fixation_probability<R: Rng + ?Sized>(
    graph: &PopulationGraph,
    fitness: Fitness,
    num_simulations: usize,
    rng: &mut R,
) -> Result<f64, MoranError> {
    estimate_fixation(graph, fitness, num_simulations, Some(DEFAULT_ITERATION_CAP), rng)
        .map(|e| e.probability())
}

/// One trial on `graph`
pub fn run_trial<R: Rng + ?Sized>(
    graph: &PopulationGraph,
    fitness: Fitness,
    iteration_cap: Option<Step>,
    rng: &mut R,
) -> Result<TrialOutcome, MoranError> {
    Ok(MoranSimulator::new(graph, fitness)?.run_trial(iteration_cap, rng))
}
