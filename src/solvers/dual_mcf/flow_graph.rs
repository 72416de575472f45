//! Directed flow network with integer supplies, capacities and costs.
//!
//! Nodes and arcs are plain integer identifiers, assigned densely in
//! insertion order. Capacities are finite; callers cap otherwise
//! uncapacitated arcs with a big-M value.

/// A directed arc with an upper capacity and a per-unit cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowArc {
    /// Tail node (flow leaves here).
    pub tail: usize,
    /// Head node (flow arrives here).
    pub head: usize,
    /// Upper capacity.
    pub capacity: i64,
    /// Cost per unit of flow.
    pub cost: i64,
}

/// A min-cost-flow instance: node supplies plus capacitated cost arcs.
///
/// Positive supply means the node injects flow, negative supply that it
/// consumes flow. A feasible instance has supplies summing to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowGraph {
    supplies: Vec<i64>,
    arcs: Vec<FlowArc>,
}

impl FlowGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with `n` nodes of zero supply.
    pub fn with_nodes(n: usize) -> Self {
        Self {
            supplies: vec![0; n],
            arcs: Vec::new(),
        }
    }

    /// Add a node with zero supply, returning its id.
    pub fn add_node(&mut self) -> usize {
        self.supplies.push(0);
        self.supplies.len() - 1
    }

    /// Add an arc, returning its id.
    pub fn add_arc(&mut self, tail: usize, head: usize, capacity: i64, cost: i64) -> usize {
        debug_assert!(tail < self.num_nodes() && head < self.num_nodes());
        debug_assert!(capacity >= 0);
        self.arcs.push(FlowArc {
            tail,
            head,
            capacity,
            cost,
        });
        self.arcs.len() - 1
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.supplies.len()
    }

    /// Number of arcs.
    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    /// Supply of a node.
    pub fn supply(&self, node: usize) -> i64 {
        self.supplies[node]
    }

    /// Set the supply of a node.
    pub fn set_supply(&mut self, node: usize, supply: i64) {
        self.supplies[node] = supply;
    }

    /// Shift the supply of a node.
    pub fn add_supply(&mut self, node: usize, delta: i64) {
        self.supplies[node] += delta;
    }

    /// Arc by id.
    pub fn arc(&self, id: usize) -> &FlowArc {
        &self.arcs[id]
    }

    /// All arcs in insertion order.
    pub fn arcs(&self) -> &[FlowArc] {
        &self.arcs
    }

    /// All node supplies.
    pub fn supplies(&self) -> &[i64] {
        &self.supplies
    }

    /// Sum of all supplies; zero for balanced instances.
    pub fn total_supply(&self) -> i64 {
        self.supplies.iter().sum()
    }
}
