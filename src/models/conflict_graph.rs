//! Conflict graph model for multiple-patterning layout decomposition.
//!
//! A conflict edge forbids equal colors on its endpoints. Edge weights are
//! strictly positive integers; stitch (negative-weight) edges are out of
//! scope. Vertices may carry an optional precoloring that the solver must
//! preserve.

use crate::error::{Result, SolverError};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

/// Number of color classes available to the decomposer.
///
/// Colors are encoded as two bits per vertex; under [`ColorCount::Three`]
/// the code `0b11` is forbidden by an extra constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorCount {
    /// Triple patterning: colors {0, 1, 2}.
    Three,
    /// Quadruple patterning: colors {0, 1, 2, 3}.
    Four,
}

impl ColorCount {
    /// Size of the palette.
    pub fn colors(self) -> usize {
        match self {
            ColorCount::Three => 3,
            ColorCount::Four => 4,
        }
    }
}

/// Undirected conflict graph with positive integer edge weights.
///
/// # Example
///
/// ```
/// use layoutsolvers::models::ConflictGraph;
///
/// let mut graph = ConflictGraph::new(3);
/// graph.add_edge(0, 1, 1).unwrap();
/// graph.add_edge(1, 2, 2).unwrap();
/// assert_eq!(graph.num_edges(), 2);
/// assert!(graph.is_proper(&[0, 1, 0]));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictGraph {
    /// Node weight is the optional precolor, edge weight the conflict weight.
    graph: UnGraph<Option<usize>, i64>,
}

impl ConflictGraph {
    /// Create a conflict graph with `num_vertices` vertices and no edges.
    pub fn new(num_vertices: usize) -> Self {
        let mut graph = UnGraph::new_undirected();
        for _ in 0..num_vertices {
            graph.add_node(None);
        }
        Self { graph }
    }

    /// Create a conflict graph from a weighted edge list.
    pub fn with_edges(num_vertices: usize, edges: Vec<(usize, usize, i64)>) -> Result<Self> {
        let mut graph = Self::new(num_vertices);
        for (u, v, w) in edges {
            graph.add_edge(u, v, w)?;
        }
        Ok(graph)
    }

    /// Add a conflict edge of weight `weight` between `u` and `v`.
    ///
    /// Rejects self-loops and non-positive weights.
    pub fn add_edge(&mut self, u: usize, v: usize, weight: i64) -> Result<()> {
        let n = self.num_vertices();
        for index in [u, v] {
            if index >= n {
                return Err(SolverError::IndexOutOfBounds { index, bound: n });
            }
        }
        if u == v {
            return Err(SolverError::SelfLoop { vertex: u });
        }
        if weight <= 0 {
            return Err(SolverError::NonPositiveWeight {
                source_vertex: u,
                target_vertex: v,
                weight,
            });
        }
        self.graph
            .add_edge(NodeIndex::new(u), NodeIndex::new(v), weight);
        Ok(())
    }

    /// Pin vertex `v` to `color`. Colors are two-bit codes, so the palette
    /// here is always {0, 1, 2, 3}; the solver additionally rejects color 3
    /// when running in three-color mode.
    pub fn set_precolor(&mut self, v: usize, color: usize) -> Result<()> {
        let n = self.num_vertices();
        if v >= n {
            return Err(SolverError::IndexOutOfBounds { index: v, bound: n });
        }
        if color > 3 {
            return Err(SolverError::InvalidPrecolor { color, palette: 4 });
        }
        self.graph[NodeIndex::new(v)] = Some(color);
        Ok(())
    }

    /// The precolor of vertex `v`, if any.
    pub fn precolor(&self, v: usize) -> Option<usize> {
        self.graph[NodeIndex::new(v)]
    }

    /// Whether any vertex carries a precolor.
    pub fn has_precolored(&self) -> bool {
        self.graph.node_weights().any(|w| w.is_some())
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of conflict edges.
    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// The edges as `(u, v, weight)` triples.
    pub fn edges(&self) -> Vec<(usize, usize, i64)> {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), *e.weight()))
            .collect()
    }

    /// Neighbors of vertex `v`.
    pub fn neighbors(&self, v: usize) -> Vec<usize> {
        self.graph
            .neighbors(NodeIndex::new(v))
            .map(|n| n.index())
            .collect()
    }

    /// Degree of vertex `v`.
    pub fn degree(&self, v: usize) -> usize {
        self.graph.neighbors(NodeIndex::new(v)).count()
    }

    /// Whether `colors` assigns different colors to the endpoints of every
    /// conflict edge.
    pub fn is_proper(&self, colors: &[usize]) -> bool {
        self.conflict_count(colors) == 0
    }

    /// Number of conflict edges whose endpoints share a color.
    pub fn conflict_count(&self, colors: &[usize]) -> usize {
        self.graph
            .edge_references()
            .filter(|e| {
                let u = e.source().index();
                let v = e.target().index();
                colors.get(u) == colors.get(v)
            })
            .count()
    }

    /// Total weight of conflict edges whose endpoints share a color.
    pub fn conflict_weight(&self, colors: &[usize]) -> i64 {
        self.graph
            .edge_references()
            .filter(|e| {
                let u = e.source().index();
                let v = e.target().index();
                colors.get(u) == colors.get(v)
            })
            .map(|e| *e.weight())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let graph = ConflictGraph::with_edges(4, vec![(0, 1, 1), (1, 2, 2), (2, 3, 1)]).unwrap();
        assert_eq!(graph.num_vertices(), 4);
        assert_eq!(graph.num_edges(), 3);
        assert_eq!(graph.degree(1), 2);
        assert_eq!(graph.neighbors(0), vec![1]);
    }

    #[test]
    fn test_rejects_non_positive_weight() {
        let mut graph = ConflictGraph::new(2);
        let err = graph.add_edge(0, 1, 0).unwrap_err();
        assert_eq!(
            err,
            SolverError::NonPositiveWeight {
                source_vertex: 0,
                target_vertex: 1,
                weight: 0
            }
        );
        assert!(graph.add_edge(0, 1, -3).is_err());
        assert_eq!(graph.num_edges(), 0);
    }

    #[test]
    fn test_rejects_self_loop() {
        let mut graph = ConflictGraph::new(2);
        assert_eq!(
            graph.add_edge(1, 1, 1).unwrap_err(),
            SolverError::SelfLoop { vertex: 1 }
        );
    }

    #[test]
    fn test_rejects_out_of_range_endpoint() {
        let mut graph = ConflictGraph::new(2);
        assert_eq!(
            graph.add_edge(0, 5, 1).unwrap_err(),
            SolverError::IndexOutOfBounds { index: 5, bound: 2 }
        );
    }

    #[test]
    fn test_precoloring() {
        let mut graph = ConflictGraph::new(3);
        assert!(!graph.has_precolored());
        graph.set_precolor(1, 2).unwrap();
        assert_eq!(graph.precolor(1), Some(2));
        assert_eq!(graph.precolor(0), None);
        assert!(graph.has_precolored());
        assert!(graph.set_precolor(1, 4).is_err());
    }

    #[test]
    fn test_conflict_counts() {
        let graph = ConflictGraph::with_edges(3, vec![(0, 1, 2), (1, 2, 3), (0, 2, 5)]).unwrap();
        assert!(graph.is_proper(&[0, 1, 2]));
        assert_eq!(graph.conflict_count(&[0, 0, 1]), 1);
        assert_eq!(graph.conflict_weight(&[0, 0, 1]), 2);
        assert_eq!(graph.conflict_count(&[0, 0, 0]), 3);
        assert_eq!(graph.conflict_weight(&[0, 0, 0]), 10);
    }

    #[test]
    fn test_color_count_palette() {
        assert_eq!(ColorCount::Three.colors(), 3);
        assert_eq!(ColorCount::Four.colors(), 4);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut graph = ConflictGraph::with_edges(3, vec![(0, 1, 1), (1, 2, 4)]).unwrap();
        graph.set_precolor(0, 1).unwrap();
        let json = serde_json::to_string(&graph).unwrap();
        let back: ConflictGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back.num_vertices(), 3);
        assert_eq!(back.edges(), graph.edges());
        assert_eq!(back.precolor(0), Some(1));
    }
}
