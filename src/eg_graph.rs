//! Population graph
//!
//! Nodes are stored densely (`0..len`) with an external integer label each, so
//! graphs loaded from edge-list files keep the ids used in the file. Edges are
//! directed adjacency entries; an undirected graph stores both directions.

use indexmap::IndexMap;

use crate::eg_interface::NodeId;

/// Directed edge with optional replacement weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: Option<f64>,
}

/// Graph-structured population
#[derive(Debug, Clone)]
pub struct PopulationGraph {
    directed: bool,

    /// External label -> dense index, in insertion order
    labels: IndexMap<i64, NodeId>,

    /// Out-neighbors per node with the weight of the connecting edge
    adjacency: Vec<Vec<(NodeId, Option<f64>)>>,
}

impl PopulationGraph {
    pub fn new_directed() -> Self {
        Self {
            directed: true,
            labels: IndexMap::new(),
            adjacency: Vec::new(),
        }
    }

    pub fn new_undirected() -> Self {
        Self {
            directed: false,
            ..Self::new_directed()
        }
    }

    /// Graph with nodes labelled `0..n` and no edges
    pub fn with_nodes(n: usize, directed: bool) -> Self {
        let mut graph = if directed {
            Self::new_directed()
        } else {
            Self::new_undirected()
        };
        for i in 0..n {
            graph.add_node(i as i64);
        }
        graph
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Add a node by external label, returning its index (existing index if present)
    pub fn add_node(&mut self, label: i64) -> NodeId {
        if let Some(&idx) = self.labels.get(&label) {
            return idx;
        }
        let idx = self.adjacency.len();
        self.labels.insert(label, idx);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Add (or re-weight) an edge between two existing nodes
    ///
    /// Indices come from `add_node` or `with_nodes`; anything else is a caller bug.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, weight: Option<f64>) {
        debug_assert!(
            source < self.len() && target < self.len(),
            "edge {}->{} outside graph of {} nodes",
            source,
            target,
            self.len()
        );
        Self::insert_arc(&mut self.adjacency[source], target, weight);
        if !self.directed && source != target {
            Self::insert_arc(&mut self.adjacency[target], source, weight);
        }
    }

    /// Add an edge by external labels, creating nodes as needed
    pub fn add_labeled_edge(&mut self, source: i64, target: i64, weight: Option<f64>) {
        let s = self.add_node(source);
        let t = self.add_node(target);
        self.add_edge(s, t, weight);
    }

    fn insert_arc(arcs: &mut Vec<(NodeId, Option<f64>)>, target: NodeId, weight: Option<f64>) {
        match arcs.iter_mut().find(|(t, _)| *t == target) {
            Some(arc) => arc.1 = weight,
            None => arcs.push((target, weight)),
        }
    }

    /// Out-neighbors of `node` with edge weights
    pub fn neighbors(&self, node: NodeId) -> &[(NodeId, Option<f64>)] {
        &self.adjacency[node]
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.adjacency[node].len()
    }

    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.adjacency[source].iter().any(|(t, _)| *t == target)
    }

    /// Replacement weights towards each out-neighbor; unweighted edges count as 1/N
    pub fn neighbor_weights(&self, node: NodeId) -> Vec<f64> {
        let default = 1.0 / self.len() as f64;
        self.adjacency[node]
            .iter()
            .map(|(_, w)| w.unwrap_or(default))
            .collect()
    }

    /// External label of a node
    pub fn node_label(&self, node: NodeId) -> i64 {
        self.labels
            .get_index(node)
            .map(|(label, _)| *label)
            .unwrap_or(node as i64)
    }

    pub fn index_of(&self, label: i64) -> Option<NodeId> {
        self.labels.get(&label).copied()
    }

    /// Number of edges (undirected edges counted once)
    pub fn edge_count(&self) -> usize {
        self.edges().len()
    }

    /// All edges; undirected edges are reported once with `source <= target`
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for (source, arcs) in self.adjacency.iter().enumerate() {
            for &(target, weight) in arcs {
                if self.directed || source <= target {
                    edges.push(Edge {
                        source,
                        target,
                        weight,
                    });
                }
            }
        }
        edges
    }

    /// Disjoint union: nodes of `other` are appended after ours and relabelled
    /// `len..len + other.len()`
    pub fn disjoint_union(&self, other: &PopulationGraph) -> PopulationGraph {
        let mut union = PopulationGraph::with_nodes(self.len() + other.len(), true);
        let offset = self.len();
        for edge in self.directed_arcs() {
            union.add_edge(edge.source, edge.target, edge.weight);
        }
        for edge in other.directed_arcs() {
            union.add_edge(edge.source + offset, edge.target + offset, edge.weight);
        }
        union
    }

    fn directed_arcs(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(source, arcs)| {
                arcs.iter().map(move |&(target, weight)| Edge {
                    source,
                    target,
                    weight,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undirected_edges_are_symmetric() {
        let mut graph = PopulationGraph::with_nodes(3, false);
        graph.add_edge(0, 1, None);
        graph.add_edge(1, 2, Some(0.5));

        assert!(graph.has_edge(1, 0));
        assert!(graph.has_edge(2, 1));
        assert!(!graph.has_edge(0, 2));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.out_degree(1), 2);
    }

    #[test]
    fn test_duplicate_edge_updates_weight() {
        let mut graph = PopulationGraph::with_nodes(2, true);
        graph.add_edge(0, 1, Some(1.0));
        graph.add_edge(0, 1, Some(3.0));

        assert_eq!(graph.neighbors(0), &[(1, Some(3.0))]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_missing_weights_default_to_inverse_size() {
        let mut graph = PopulationGraph::with_nodes(4, true);
        graph.add_edge(0, 1, None);
        graph.add_edge(0, 2, Some(0.75));

        assert_eq!(graph.neighbor_weights(0), vec![0.25, 0.75]);
        assert!(graph.neighbor_weights(3).is_empty());
    }

    #[test]
    fn test_labeled_edges_keep_external_ids() {
        let mut graph = PopulationGraph::new_directed();
        graph.add_labeled_edge(10, 20, Some(1.0));
        graph.add_labeled_edge(20, 10, Some(2.0));

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.index_of(20), Some(1));
        assert_eq!(graph.node_label(0), 10);
        assert!(graph.has_edge(1, 0));
    }

    #[test]
    fn test_self_loop_stored_once() {
        let mut graph = PopulationGraph::with_nodes(1, false);
        graph.add_edge(0, 0, None);
        assert_eq!(graph.out_degree(0), 1);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside graph of 2 nodes")]
    fn test_edge_to_unknown_node_is_rejected() {
        let mut graph = PopulationGraph::with_nodes(2, true);
        graph.add_edge(0, 5, None);
    }

    #[test]
    fn test_disjoint_union_offsets_second_graph() {
        let mut a = PopulationGraph::with_nodes(2, true);
        a.add_edge(0, 1, None);
        let mut b = PopulationGraph::with_nodes(2, false);
        b.add_edge(0, 1, None);

        let union = a.disjoint_union(&b);
        assert_eq!(union.len(), 4);
        assert!(union.is_directed());
        assert!(union.has_edge(0, 1));
        assert!(union.has_edge(2, 3));
        assert!(union.has_edge(3, 2));
        assert!(!union.has_edge(1, 2));
    }
}
