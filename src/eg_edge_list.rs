//! Edge-list and adjacency-matrix text formats
//!
//! Edge list: one edge per line, `source target weight` as whitespace-separated
//! integers. Adjacency matrix: one row per line, nonzero entry `(i, j)` becomes
//! edge `i -> j` carrying that weight. Blank lines are ignored in both.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::eg_graph::PopulationGraph;

/// `(source, target, weight)` as written in the file
pub type EdgeTriple = (i64, i64, i64);

#[derive(Debug)]
pub enum EdgeListError {
    /// Could not read or write the file
    Io { path: PathBuf, source: io::Error },

    /// Line does not hold exactly three fields
    FieldCount { line: usize, found: usize },

    /// Field is not an integer
    InvalidNumber { line: usize, field: String },

    /// Matrix row length differs from the first row
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for EdgeListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeListError::Io { path, source } => {
                write!(f, "{}: {}", path.display(), source)
            }
            EdgeListError::FieldCount { line, found } => {
                write!(f, "line {}: expected 3 fields, found {}", line, found)
            }
            EdgeListError::InvalidNumber { line, field } => {
                write!(f, "line {}: '{}' is not an integer", line, field)
            }
            EdgeListError::RaggedRow {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {}: expected {} columns, found {}",
                line, expected, found
            ),
        }
    }
}

impl std::error::Error for EdgeListError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EdgeListError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn parse_field(line: usize, field: &str) -> Result<i64, EdgeListError> {
    field.parse().map_err(|_| EdgeListError::InvalidNumber {
        line,
        field: field.to_string(),
    })
}

/// Parse edge-list text into triples, keeping file order
pub fn parse_edge_list(text: &str) -> Result<Vec<EdgeTriple>, EdgeListError> {
    let mut edges = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let fields: Vec<&str> = raw.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 3 {
            return Err(EdgeListError::FieldCount {
                line,
                found: fields.len(),
            });
        }
        edges.push((
            parse_field(line, fields[0])?,
            parse_field(line, fields[1])?,
            parse_field(line, fields[2])?,
        ));
    }
    Ok(edges)
}

/// Render triples as edge-list text
pub fn format_edge_list(edges: &[EdgeTriple]) -> String {
    let mut out = String::new();
    for (source, target, weight) in edges {
        out.push_str(&format!("{} {} {}\n", source, target, weight));
    }
    out
}

/// Parse an adjacency matrix into triples, row-major
pub fn parse_adjacency_matrix(text: &str) -> Result<Vec<EdgeTriple>, EdgeListError> {
    let mut edges = Vec::new();
    let mut width = None;
    let mut row = 0i64;
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let fields: Vec<&str> = raw.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let expected = *width.get_or_insert(fields.len());
        if fields.len() != expected {
            return Err(EdgeListError::RaggedRow {
                line,
                expected,
                found: fields.len(),
            });
        }
        for (col, field) in fields.iter().enumerate() {
            let weight = parse_field(line, field)?;
            if weight != 0 {
                edges.push((row, col as i64, weight));
            }
        }
        row += 1;
    }
    Ok(edges)
}

/// Directed weighted graph from triples; node labels are the file's ids
pub fn graph_from_edges(edges: &[EdgeTriple]) -> PopulationGraph {
    let mut graph = PopulationGraph::new_directed();
    for &(source, target, weight) in edges {
        graph.add_labeled_edge(source, target, Some(weight as f64));
    }
    graph
}

fn read(path: &Path) -> Result<String, EdgeListError> {
    fs::read_to_string(path).map_err(|source| EdgeListError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_edge_list<P: AsRef<Path>>(path: P) -> Result<Vec<EdgeTriple>, EdgeListError> {
    parse_edge_list(&read(path.as_ref())?)
}

pub fn write_edge_list<P: AsRef<Path>>(path: P, edges: &[EdgeTriple]) -> Result<(), EdgeListError> {
    let path = path.as_ref();
    let io_err = |source| EdgeListError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs::File::create(path).map_err(io_err)?;
    file.write_all(format_edge_list(edges).as_bytes())
        .map_err(io_err)
}

/// Load a directed weighted graph from an edge-list file
pub fn graph_from_edge_file<P: AsRef<Path>>(path: P) -> Result<PopulationGraph, EdgeListError> {
    let edges = read_edge_list(path.as_ref())?;
    let graph = graph_from_edges(&edges);
    debug!(
        "loaded {} nodes / {} edges from {}",
        graph.len(),
        graph.edge_count(),
        path.as_ref().display()
    );
    Ok(graph)
}

/// Load a directed weighted graph from an adjacency-matrix file
pub fn graph_from_matrix_file<P: AsRef<Path>>(path: P) -> Result<PopulationGraph, EdgeListError> {
    let edges = parse_adjacency_matrix(&read(path.as_ref())?)?;
    Ok(graph_from_edges(&edges))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_order() {
        let edges = vec![(3, 1, 2), (0, 1, 1), (1, 2, 5), (2, 0, 1)];
        let text = format_edge_list(&edges);
        assert_eq!(parse_edge_list(&text).unwrap(), edges);
    }

    #[test]
    fn test_parse_tolerates_blank_lines_and_spacing() {
        let text = "0 1 1\n\n1   2\t3\n";
        assert_eq!(parse_edge_list(text).unwrap(), vec![(0, 1, 1), (1, 2, 3)]);
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        match parse_edge_list("0 1 1\n0 1\n") {
            Err(EdgeListError::FieldCount { line: 2, found: 2 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_non_integers() {
        let err = parse_edge_list("0 1 0.5\n").unwrap_err();
        assert_eq!(err.to_string(), "line 1: '0.5' is not an integer");
    }

    #[test]
    fn test_adjacency_matrix() {
        let text = "0 1 3\n1 0 3\n2 2 0\n";
        let edges = parse_adjacency_matrix(text).unwrap();
        assert_eq!(
            edges,
            vec![(0, 1, 1), (0, 2, 3), (1, 0, 1), (1, 2, 3), (2, 0, 2), (2, 1, 2)]
        );
        assert!(matches!(
            parse_adjacency_matrix("0 1\n1 0 0\n"),
            Err(EdgeListError::RaggedRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_graph_from_edges_uses_file_ids() {
        let graph = graph_from_edges(&[(5, 7, 2), (7, 5, 1), (7, 7, 1)]);
        assert_eq!(graph.len(), 2);
        let five = graph.index_of(5).unwrap();
        let seven = graph.index_of(7).unwrap();
        assert_eq!(graph.neighbors(five), &[(seven, Some(2.0))]);
        assert!(graph.has_edge(seven, seven));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("eg_edges_{}.txt", std::process::id()));
        let edges = vec![(0, 1, 1), (1, 2, 1), (2, 2, 1)];
        write_edge_list(&path, &edges).unwrap();
        assert_eq!(read_edge_list(&path).unwrap(), edges);

        let graph = graph_from_edge_file(&path).unwrap();
        assert_eq!(graph.len(), 3);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            read_edge_list(&path),
            Err(EdgeListError::Io { .. })
        ));
    }

    #[test]
    fn test_shipped_line_sample() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/line.txt");
        let graph = graph_from_edge_file(&path).unwrap();

        assert_eq!(graph.len(), 5);
        assert_eq!(graph.edge_count(), 5);
        for i in 0..4 {
            assert_eq!(graph.neighbors(i), &[(i + 1, Some(1.0))]);
        }
        assert_eq!(graph.neighbors(4), &[(4, Some(1.0))]);
    }
}
