//! Interchangeable min-cost-flow engines.
//!
//! Four algorithms behind one parameter-bag enum: capacity scaling,
//! cost scaling, network simplex and cycle canceling. Every engine expects
//! non-negative arc costs (guaranteed upstream by the negative-cost arc
//! rewrite) and finite capacities, and leaves an optimal flow in the shared
//! residual network. Flows, the total cost and node potentials are then
//! read off uniformly.
//!
//! Potentials follow the convention
//! `cost(a) - pi(tail) + pi(head) >= 0` for every residual arc `a` of the
//! optimal flow, which makes `pi` a feasible point of the dualized
//! difference system.

mod capacity_scaling;
mod cost_scaling;
mod cycle_canceling;
mod network_simplex;

use serde::{Deserialize, Serialize};

use crate::solvers::dual_mcf::FlowGraph;

/// Discharge strategy of the cost-scaling engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostScalingMethod {
    /// Single-arc pushes.
    Push,
    /// Augment along maximal admissible paths.
    Augment,
    /// Augment along admissible paths of bounded length.
    #[default]
    PartialAugment,
}

/// Entering-arc selection rule of the network-simplex engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotRule {
    /// First arc violating optimality, scanning cyclically.
    FirstEligible,
    /// Arc with the largest violation.
    BestEligible,
    /// Best arc within sqrt(m)-sized blocks, scanning cyclically.
    #[default]
    BlockSearch,
    /// Maintained shortlist of eligible arcs; runs as block search here.
    CandidateList,
    /// Shortlist with partial reordering; runs as block search here.
    AlteringList,
}

/// Cycle selection strategy of the cycle-canceling engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleCancelingMethod {
    /// Cancel any negative residual cycle.
    Simple,
    /// Cancel minimum-mean residual cycles.
    MinMean,
    /// Minimum-mean canceling with potential tightening between rounds.
    #[default]
    CancelAndTighten,
}

/// Engine choice plus its algorithm-specific parameter bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum McfEngine {
    /// Successive shortest paths with capacity scaling.
    CapacityScaling {
        /// Scaling base for the delta phases.
        factor: i64,
    },
    /// Push-relabel with epsilon cost scaling.
    CostScaling {
        method: CostScalingMethod,
        /// Divisor applied to epsilon between phases.
        factor: i64,
    },
    /// Primal network simplex on a spanning-tree basis.
    NetworkSimplex { pivot: PivotRule },
    /// Negative-cycle canceling from an initial feasible flow.
    CycleCanceling { method: CycleCancelingMethod },
}

impl Default for McfEngine {
    fn default() -> Self {
        Self::network_simplex()
    }
}

impl McfEngine {
    /// Capacity scaling with its default factor 4.
    pub fn capacity_scaling() -> Self {
        McfEngine::CapacityScaling { factor: 4 }
    }

    /// Cost scaling with partial augmentation and factor 16.
    pub fn cost_scaling() -> Self {
        McfEngine::CostScaling {
            method: CostScalingMethod::PartialAugment,
            factor: 16,
        }
    }

    /// Network simplex with block-search pivoting.
    pub fn network_simplex() -> Self {
        McfEngine::NetworkSimplex {
            pivot: PivotRule::BlockSearch,
        }
    }

    /// Cycle canceling in its cancel-and-tighten flavor.
    pub fn cycle_canceling() -> Self {
        McfEngine::CycleCanceling {
            method: CycleCancelingMethod::CancelAndTighten,
        }
    }

    /// One engine of each kind with its default parameters.
    pub fn all() -> [Self; 4] {
        [
            Self::capacity_scaling(),
            Self::cost_scaling(),
            Self::network_simplex(),
            Self::cycle_canceling(),
        ]
    }

    /// Solve a min-cost-flow instance.
    pub fn run(&self, graph: &FlowGraph) -> FlowResult {
        let mut net = Residual::new(graph);
        let feasible = match *self {
            McfEngine::CapacityScaling { factor } => capacity_scaling::run(&mut net, factor),
            McfEngine::CostScaling { method, factor } => {
                cost_scaling::run(&mut net, method, factor)
            }
            McfEngine::NetworkSimplex { pivot } => network_simplex::run(graph, &mut net, pivot),
            McfEngine::CycleCanceling { method } => cycle_canceling::run(&mut net, method),
        };
        if !feasible {
            return FlowResult {
                status: FlowStatus::Infeasible,
                flows: Vec::new(),
                potentials: Vec::new(),
                cost: 0,
            };
        }
        let flows: Vec<i64> = (0..graph.num_arcs()).map(|a| net.flow(a)).collect();
        let cost = flows
            .iter()
            .zip(graph.arcs())
            .map(|(&f, arc)| f * arc.cost)
            .sum();
        FlowResult {
            status: FlowStatus::Optimal,
            potentials: compute_potentials(&net),
            flows,
            cost,
        }
    }
}

/// Engine verdict on an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowStatus {
    /// An optimal flow was found.
    Optimal,
    /// The supplies cannot be routed within the capacities.
    Infeasible,
    /// The cost is unbounded below. Engines here never report it because
    /// every arc carries a finite capacity, but adapters over external
    /// engines may.
    Unbounded,
}

/// Optimal flow, node potentials and total cost, or a failure status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowResult {
    pub status: FlowStatus,
    /// Flow per arc, in arc-id order. Empty unless optimal.
    pub flows: Vec<i64>,
    /// Potential per node. Empty unless optimal.
    pub potentials: Vec<i64>,
    /// Total flow cost. Zero unless optimal.
    pub cost: i64,
}

/// Residual network: two directed edges per arc, edge `2a` forward and
/// edge `2a ^ 1` its reverse. Node excesses start at the supplies and
/// reach zero exactly when a feasible flow has been established.
pub(crate) struct Residual {
    adj: Vec<Vec<usize>>,
    to: Vec<usize>,
    cap: Vec<i64>,
    cost: Vec<i64>,
    pub excess: Vec<i64>,
}

impl Residual {
    pub fn new(graph: &FlowGraph) -> Self {
        let n = graph.num_nodes();
        let mut net = Self {
            adj: vec![Vec::new(); n],
            to: Vec::with_capacity(2 * graph.num_arcs()),
            cap: Vec::with_capacity(2 * graph.num_arcs()),
            cost: Vec::with_capacity(2 * graph.num_arcs()),
            excess: graph.supplies().to_vec(),
        };
        for arc in graph.arcs() {
            net.adj[arc.tail].push(net.to.len());
            net.to.push(arc.head);
            net.cap.push(arc.capacity);
            net.cost.push(arc.cost);
            net.adj[arc.head].push(net.to.len());
            net.to.push(arc.tail);
            net.cap.push(0);
            net.cost.push(-arc.cost);
        }
        net
    }

    pub fn num_nodes(&self) -> usize {
        self.adj.len()
    }

    pub fn num_edges(&self) -> usize {
        self.to.len()
    }

    pub fn head(&self, e: usize) -> usize {
        self.to[e]
    }

    pub fn tail(&self, e: usize) -> usize {
        self.to[e ^ 1]
    }

    pub fn cap(&self, e: usize) -> i64 {
        self.cap[e]
    }

    pub fn cost(&self, e: usize) -> i64 {
        self.cost[e]
    }

    pub fn edges_from(&self, v: usize) -> &[usize] {
        &self.adj[v]
    }

    /// Move `amount` units of excess along edge `e`.
    pub fn push(&mut self, e: usize, amount: i64) {
        debug_assert!(amount <= self.cap[e]);
        self.cap[e] -= amount;
        self.cap[e ^ 1] += amount;
        let tail = self.tail(e);
        let head = self.head(e);
        self.excess[tail] -= amount;
        self.excess[head] += amount;
    }

    /// Flow currently on original arc `a`.
    pub fn flow(&self, a: usize) -> i64 {
        self.cap[2 * a + 1]
    }

    pub fn is_balanced(&self) -> bool {
        self.excess.iter().all(|&x| x == 0)
    }
}

/// Route all surplus to deficits ignoring costs, by repeated breadth-first
/// augmentation through positive residual capacities. Returns whether the
/// excesses balanced out, i.e. whether a feasible flow exists.
pub(crate) fn establish_feasible_flow(net: &mut Residual) -> bool {
    let n = net.num_nodes();
    loop {
        let mut pred: Vec<usize> = vec![usize::MAX; n];
        let mut seen = vec![false; n];
        let mut queue = std::collections::VecDeque::new();
        for v in 0..n {
            if net.excess[v] > 0 {
                seen[v] = true;
                queue.push_back(v);
            }
        }
        let mut sink = None;
        'bfs: while let Some(u) = queue.pop_front() {
            for k in 0..net.edges_from(u).len() {
                let e = net.edges_from(u)[k];
                let v = net.head(e);
                if seen[v] || net.cap(e) == 0 {
                    continue;
                }
                seen[v] = true;
                pred[v] = e;
                if net.excess[v] < 0 {
                    sink = Some(v);
                    break 'bfs;
                }
                queue.push_back(v);
            }
        }
        let Some(sink) = sink else { break };

        // Bottleneck over the path, the origin's surplus and the sink's
        // deficit.
        let mut amount = -net.excess[sink];
        let mut v = sink;
        while pred[v] != usize::MAX {
            amount = amount.min(net.cap(pred[v]));
            v = net.tail(pred[v]);
        }
        amount = amount.min(net.excess[v]);

        let mut v = sink;
        while pred[v] != usize::MAX {
            let e = pred[v];
            net.push(e, amount);
            v = net.tail(e);
        }
    }
    net.is_balanced()
}

/// Recover node potentials from the residual network of an optimal flow:
/// shortest distances from a virtual zero-cost root over residual edges,
/// negated. Optimality guarantees the absence of negative residual cycles,
/// so Bellman-Ford converges.
pub(crate) fn compute_potentials(net: &Residual) -> Vec<i64> {
    let n = net.num_nodes();
    let mut dist = vec![0_i64; n];
    for _ in 0..n {
        let mut updated = false;
        for e in 0..net.num_edges() {
            if net.cap(e) == 0 {
                continue;
            }
            let u = net.tail(e);
            let v = net.head(e);
            if dist[u] + net.cost(e) < dist[v] {
                dist[v] = dist[u] + net.cost(e);
                updated = true;
            }
        }
        if !updated {
            break;
        }
    }
    dist.into_iter().map(|d| -d).collect()
}
