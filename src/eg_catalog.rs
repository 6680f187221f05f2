//! Catalog of canonical population structures
//!
//! Pure construction, no randomness. Names match the file names produced by
//! the sweeps (`<name>_fixation_probability.csv`).

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::eg_graph::PopulationGraph;

/// Weight matrix of the 3-node counterexample graph
pub const GALANIS_WEIGHTS: [[f64; 3]; 3] = [
    [0.0, 0.25, 0.75],
    [0.25, 0.0, 0.75],
    [0.5, 0.5, 0.0],
];

/// Named graph families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphKind {
    Complete,
    Cycle,
    Line,
    Star,
    FixationSuppressor,
    Galanis,
    Burst,
}

impl GraphKind {
    /// Graphs evaluated by the fitness sweep, in output order
    pub const SWEEP: [GraphKind; 6] = [
        GraphKind::Complete,
        GraphKind::Cycle,
        GraphKind::Line,
        GraphKind::Star,
        GraphKind::FixationSuppressor,
        GraphKind::Galanis,
    ];

    pub const ALL: [GraphKind; 7] = [
        GraphKind::Complete,
        GraphKind::Cycle,
        GraphKind::Line,
        GraphKind::Star,
        GraphKind::FixationSuppressor,
        GraphKind::Galanis,
        GraphKind::Burst,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GraphKind::Complete => "complete_graph",
            GraphKind::Cycle => "cycle_graph",
            GraphKind::Line => "line_graph",
            GraphKind::Star => "star_graph",
            GraphKind::FixationSuppressor => "fixation_supressor",
            GraphKind::Galanis => "galanis_graph",
            GraphKind::Burst => "burst_graph",
        }
    }

    /// Whether `size` changes the graph (the Galanis graph is fixed)
    pub fn is_sized(self) -> bool {
        self != GraphKind::Galanis
    }

    pub fn build(self, size: usize) -> PopulationGraph {
        match self {
            GraphKind::Complete => complete_graph(size, false),
            GraphKind::Cycle => cycle_graph(size, false),
            GraphKind::Line => line_graph(size),
            GraphKind::Star => star_graph(size),
            GraphKind::FixationSuppressor => fixation_suppressor_graph(size),
            GraphKind::Galanis => galanis_graph(),
            GraphKind::Burst => burst_graph(size),
        }
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown graph name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGraph(pub String);

impl fmt::Display for UnknownGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown graph '{}'", self.0)
    }
}

impl std::error::Error for UnknownGraph {}

impl FromStr for GraphKind {
    type Err = UnknownGraph;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        GraphKind::ALL
            .iter()
            .copied()
            .find(|kind| {
                let name = kind.name();
                wanted == name || wanted == name.trim_end_matches("_graph")
            })
            .or(match wanted.as_str() {
                "suppressor" | "fixation_suppressor" | "sup" => {
                    Some(GraphKind::FixationSuppressor)
                }
                _ => None,
            })
            .ok_or_else(|| UnknownGraph(s.to_string()))
    }
}

/// Every node connected to every other node, no self-loops
pub fn complete_graph(n: usize, directed: bool) -> PopulationGraph {
    let mut graph = PopulationGraph::with_nodes(n, directed);
    for i in 0..n {
        for j in 0..n {
            if i != j && (directed || i < j) {
                graph.add_edge(i, j, None);
            }
        }
    }
    graph
}

/// Ring `0 - 1 - ... - n-1 - 0`; a single node gets a self-loop
pub fn cycle_graph(n: usize, directed: bool) -> PopulationGraph {
    let mut graph = PopulationGraph::with_nodes(n, directed);
    for i in 0..n {
        graph.add_edge(i, (i + 1) % n, None);
    }
    graph
}

/// Directed path `0 -> 1 -> ... -> n-1` with a self-loop on the last node
pub fn line_graph(n: usize) -> PopulationGraph {
    let mut graph = PopulationGraph::with_nodes(n, true);
    for i in 1..n {
        graph.add_edge(i - 1, i, None);
    }
    if n > 0 {
        graph.add_edge(n - 1, n - 1, None);
    }
    graph
}

/// Undirected star: hub 0 plus `leaves` leaf nodes
pub fn star_graph(leaves: usize) -> PopulationGraph {
    let mut graph = PopulationGraph::with_nodes(leaves + 1, false);
    for leaf in 1..=leaves {
        graph.add_edge(0, leaf, None);
    }
    graph
}

/// Directed star of `n` nodes: hub 0 points at every leaf, leaves point nowhere
pub fn burst_graph(n: usize) -> PopulationGraph {
    let mut graph = PopulationGraph::with_nodes(n, true);
    for leaf in 1..n {
        graph.add_edge(0, leaf, None);
    }
    graph
}

/// Directed cycle on `0..n`, directed complete graph on `n..2n`, joined by `0 -> n`
pub fn fixation_suppressor_graph(n: usize) -> PopulationGraph {
    let cycle = cycle_graph(n, true);
    let complete = complete_graph(n, true);
    let mut graph = cycle.disjoint_union(&complete);
    if n > 0 {
        graph.add_edge(0, n, None);
    }
    graph
}

/// Fixed 3-node weighted counterexample
pub fn galanis_graph() -> PopulationGraph {
    weighted_graph(&GALANIS_WEIGHTS)
}

/// Directed graph with an edge for every nonzero matrix entry
pub fn weighted_graph<R: AsRef<[f64]>>(matrix: &[R]) -> PopulationGraph {
    let mut graph = PopulationGraph::new_directed();
    for (i, row) in matrix.iter().enumerate() {
        for (j, &w) in row.as_ref().iter().enumerate() {
            if w != 0.0 {
                graph.add_labeled_edge(i as i64, j as i64, Some(w));
            }
        }
    }
    graph
}

/// The sweep graphs for one population size, in output order
pub fn generate_graphs(size: usize) -> IndexMap<&'static str, PopulationGraph> {
    GraphKind::SWEEP
        .iter()
        .map(|kind| (kind.name(), kind.build(size)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_graph() {
        let graph = complete_graph(5, false);
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.edge_count(), 10);
        for node in 0..5 {
            assert_eq!(graph.out_degree(node), 4);
            assert!(!graph.has_edge(node, node));
        }

        let directed = complete_graph(4, true);
        assert_eq!(directed.edge_count(), 12);
    }

    #[test]
    fn test_cycle_graph() {
        let graph = cycle_graph(6, false);
        assert_eq!(graph.edge_count(), 6);
        assert!(graph.has_edge(0, 5));
        assert!(graph.has_edge(5, 0));
        assert!((0..6).all(|n| graph.out_degree(n) == 2));

        let single = cycle_graph(1, false);
        assert!(single.has_edge(0, 0));
    }

    #[test]
    fn test_line_graph_has_terminal_self_loop() {
        let graph = line_graph(4);
        assert!(graph.is_directed());
        assert!(graph.has_edge(0, 1));
        assert!(!graph.has_edge(1, 0));
        assert!(graph.has_edge(3, 3));
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_star_graph_has_extra_hub() {
        let graph = star_graph(5);
        assert_eq!(graph.len(), 6);
        assert_eq!(graph.out_degree(0), 5);
        assert!((1..6).all(|leaf| graph.neighbors(leaf) == [(0, None)]));
    }

    #[test]
    fn test_burst_graph_leaves_are_sinks() {
        let graph = burst_graph(5);
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.out_degree(0), 4);
        assert!((1..5).all(|leaf| graph.out_degree(leaf) == 0));
    }

    #[test]
    fn test_fixation_suppressor_structure() {
        let graph = fixation_suppressor_graph(4);
        assert_eq!(graph.len(), 8);
        // cycle 4 + complete 12 + bridge
        assert_eq!(graph.edge_count(), 17);
        assert!(graph.has_edge(0, 4));
        assert!(!graph.has_edge(4, 0));
        assert!(graph.has_edge(3, 0));
        assert!(graph.has_edge(7, 5));
    }

    #[test]
    fn test_galanis_graph_weights() {
        let graph = galanis_graph();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 6);
        assert_eq!(graph.neighbors(0), &[(1, Some(0.25)), (2, Some(0.75))]);
        assert_eq!(graph.neighbors(2), &[(0, Some(0.5)), (1, Some(0.5))]);
    }

    #[test]
    fn test_generate_graphs_order() {
        let graphs = generate_graphs(5);
        let names: Vec<_> = graphs.keys().copied().collect();
        assert_eq!(
            names,
            vec![
                "complete_graph",
                "cycle_graph",
                "line_graph",
                "star_graph",
                "fixation_supressor",
                "galanis_graph"
            ]
        );
        assert_eq!(graphs["galanis_graph"].len(), 3);
    }

    #[test]
    fn test_graph_kind_parsing() {
        assert_eq!("star_graph".parse::<GraphKind>(), Ok(GraphKind::Star));
        assert_eq!("cycle".parse::<GraphKind>(), Ok(GraphKind::Cycle));
        assert_eq!("sup".parse::<GraphKind>(), Ok(GraphKind::FixationSuppressor));
        assert_eq!("Burst".parse::<GraphKind>(), Ok(GraphKind::Burst));
        assert!("tree".parse::<GraphKind>().is_err());
    }
}
