//! Primal network simplex on a spanning-tree basis.
//!
//! The basis is a spanning tree over the nodes plus an artificial root;
//! artificial root arcs with a prohibitive cost make the initial basis
//! feasible. Each pivot brings in an arc violating its optimality
//! condition, pushes flow around the unique tree cycle it closes, and
//! swaps it with the first blocking arc. Potentials are recomputed from
//! the tree after every structural change. Positive flow left on an
//! artificial arc at the end certifies infeasibility.

use super::{PivotRule, Residual};
use crate::solvers::dual_mcf::FlowGraph;

const BASIC: u8 = 0;
const AT_LOWER: u8 = 1;
const AT_UPPER: u8 = 2;

/// Capacity of the artificial root arcs; large enough to never bind.
const ROOT_CAP: i64 = i64::MAX / 8;

struct Simplex {
    node_count: usize,
    root: usize,
    tails: Vec<usize>,
    heads: Vec<usize>,
    caps: Vec<i64>,
    costs: Vec<i64>,
    flows: Vec<i64>,
    state: Vec<u8>,
    parent: Vec<usize>,
    parent_arc: Vec<usize>,
    potential: Vec<i64>,
}

pub(crate) fn run(graph: &FlowGraph, net: &mut Residual, pivot: PivotRule) -> bool {
    let n = graph.num_nodes();
    if n == 0 {
        return true;
    }
    let m = graph.num_arcs();
    let root = n;
    let big_cost: i64 = 1 + graph.arcs().iter().map(|a| a.cost.abs()).sum::<i64>();

    let mut spx = Simplex {
        node_count: n + 1,
        root,
        tails: graph.arcs().iter().map(|a| a.tail).collect(),
        heads: graph.arcs().iter().map(|a| a.head).collect(),
        caps: graph.arcs().iter().map(|a| a.capacity).collect(),
        costs: graph.arcs().iter().map(|a| a.cost).collect(),
        flows: vec![0; m],
        state: vec![AT_LOWER; m],
        parent: vec![root; n + 1],
        parent_arc: vec![usize::MAX; n + 1],
        potential: vec![0; n + 1],
    };
    spx.parent[root] = usize::MAX;

    // Star-shaped initial basis of artificial arcs, oriented along the
    // supply so the initial flow is non-negative.
    for v in 0..n {
        let supply = graph.supply(v);
        let (tail, head) = if supply >= 0 { (v, root) } else { (root, v) };
        spx.tails.push(tail);
        spx.heads.push(head);
        spx.caps.push(ROOT_CAP);
        spx.costs.push(big_cost);
        spx.flows.push(supply.abs());
        spx.state.push(BASIC);
        spx.parent_arc[v] = m + v;
    }
    spx.update_potentials();

    let total_arcs = m + n;
    let block = (total_arcs as f64).sqrt().ceil() as usize;
    let mut cursor = 0;
    while let Some(entering) = select_entering(&spx, pivot, &mut cursor, block.max(1)) {
        spx.pivot_step(entering);
    }

    if (m..total_arcs).any(|a| spx.flows[a] > 0) {
        return false;
    }
    for a in 0..m {
        if spx.flows[a] > 0 {
            net.push(2 * a, spx.flows[a]);
        }
    }
    true
}

/// How strongly arc `a` violates its optimality condition; non-positive
/// for arcs that are fine where they are.
fn violation(spx: &Simplex, a: usize) -> i64 {
    let rc = spx.costs[a] - spx.potential[spx.tails[a]] + spx.potential[spx.heads[a]];
    match spx.state[a] {
        AT_LOWER => -rc,
        AT_UPPER => rc,
        _ => i64::MIN,
    }
}

fn select_entering(
    spx: &Simplex,
    pivot: PivotRule,
    cursor: &mut usize,
    block: usize,
) -> Option<usize> {
    let total = spx.tails.len();
    match pivot {
        PivotRule::FirstEligible => {
            for offset in 0..total {
                let a = (*cursor + offset) % total;
                if violation(spx, a) > 0 {
                    *cursor = (a + 1) % total;
                    return Some(a);
                }
            }
            None
        }
        PivotRule::BestEligible => (0..total)
            .filter(|&a| violation(spx, a) > 0)
            .max_by_key(|&a| violation(spx, a)),
        PivotRule::BlockSearch | PivotRule::CandidateList | PivotRule::AlteringList => {
            let mut scanned = 0;
            while scanned < total {
                let mut best: Option<usize> = None;
                for _ in 0..block.min(total - scanned) {
                    let a = *cursor;
                    *cursor = (*cursor + 1) % total;
                    scanned += 1;
                    if violation(spx, a) > 0
                        && best.is_none_or(|b| violation(spx, a) > violation(spx, b))
                    {
                        best = Some(a);
                    }
                }
                if best.is_some() {
                    return best;
                }
            }
            None
        }
    }
}

impl Simplex {
    /// Recompute all potentials from the tree: reduced costs of basic arcs
    /// are zero by definition.
    fn update_potentials(&mut self) {
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.node_count];
        for v in 0..self.node_count {
            if self.parent[v] != usize::MAX {
                children[self.parent[v]].push(v);
            }
        }
        self.potential[self.root] = 0;
        let mut stack = vec![self.root];
        while let Some(p) = stack.pop() {
            for &v in &children[p] {
                let a = self.parent_arc[v];
                self.potential[v] = if self.heads[a] == v {
                    // arc points parent -> v
                    self.potential[p] - self.costs[a]
                } else {
                    self.potential[p] + self.costs[a]
                };
                stack.push(v);
            }
        }
    }

    /// Nodes on the tree path from `v` up to (excluding) the root.
    fn chain(&self, v: usize) -> Vec<usize> {
        let mut nodes = Vec::new();
        let mut x = v;
        while x != self.root {
            nodes.push(x);
            x = self.parent[x];
        }
        nodes
    }

    fn pivot_step(&mut self, entering: usize) {
        // Push direction along the entering arc.
        let (from, to) = if self.state[entering] == AT_LOWER {
            (self.tails[entering], self.heads[entering])
        } else {
            (self.heads[entering], self.tails[entering])
        };

        let from_chain = self.chain(from);
        let to_chain = self.chain(to);
        let mut on_from_chain = vec![false; self.node_count];
        for &x in &from_chain {
            on_from_chain[x] = true;
        }
        let lca = to_chain
            .iter()
            .copied()
            .find(|&x| on_from_chain[x])
            .unwrap_or(self.root);

        // The compensating flow runs to -> lca -> from through the tree.
        // On the `to` side travel goes child-to-parent, on the `from` side
        // parent-to-child.
        let mut cycle: Vec<(usize, usize, bool)> = Vec::new(); // (arc, child node, travels with arc)
        for &x in to_chain.iter().take_while(|&&x| x != lca) {
            let a = self.parent_arc[x];
            cycle.push((a, x, self.tails[a] == x));
        }
        for &x in from_chain.iter().take_while(|&&x| x != lca) {
            let a = self.parent_arc[x];
            cycle.push((a, x, self.heads[a] == x));
        }

        let entering_room = if self.state[entering] == AT_LOWER {
            self.caps[entering] - self.flows[entering]
        } else {
            self.flows[entering]
        };
        let mut step = entering_room;
        for &(a, _, with_arc) in &cycle {
            let room = if with_arc {
                self.caps[a] - self.flows[a]
            } else {
                self.flows[a]
            };
            step = step.min(room);
        }

        // First blocking arc in traversal order leaves; the entering arc
        // itself blocks when it reaches its opposite bound.
        let mut leaving: Option<(usize, usize)> = None; // (arc, child node)
        if entering_room == step {
            leaving = Some((entering, usize::MAX));
        }
        if leaving.is_none() {
            for &(a, child, with_arc) in &cycle {
                let room = if with_arc {
                    self.caps[a] - self.flows[a]
                } else {
                    self.flows[a]
                };
                if room == step {
                    leaving = Some((a, child));
                    break;
                }
            }
        }
        let (leaving_arc, leaving_child) =
            leaving.expect("a blocking arc bounds every pivot step");

        // Apply the flow change.
        if self.state[entering] == AT_LOWER {
            self.flows[entering] += step;
        } else {
            self.flows[entering] -= step;
        }
        for &(a, _, with_arc) in &cycle {
            if with_arc {
                self.flows[a] += step;
            } else {
                self.flows[a] -= step;
            }
        }

        if leaving_arc == entering {
            // Bound flip, basis unchanged.
            self.state[entering] = if self.flows[entering] == self.caps[entering] {
                AT_UPPER
            } else {
                AT_LOWER
            };
            return;
        }

        self.state[leaving_arc] = if self.flows[leaving_arc] == 0 {
            AT_LOWER
        } else {
            AT_UPPER
        };
        self.state[entering] = BASIC;

        // Re-hang the subtree cut off by the leaving arc: the entering arc
        // becomes the parent link of the side that contained the leaving
        // arc, and parent pointers reverse along the way.
        let q_in = if on_from_chain[leaving_child] {
            from
        } else {
            to
        };
        let q_out = if q_in == from { to } else { from };

        let mut segment = Vec::new();
        let mut x = q_in;
        loop {
            segment.push(x);
            if x == leaving_child {
                break;
            }
            x = self.parent[x];
        }
        let mut new_parent = q_out;
        let mut new_arc = entering;
        for &x in &segment {
            let old_parent = self.parent[x];
            let old_arc = self.parent_arc[x];
            self.parent[x] = new_parent;
            self.parent_arc[x] = new_arc;
            new_parent = x;
            new_arc = old_arc;
        }
        self.update_potentials();
    }
}
