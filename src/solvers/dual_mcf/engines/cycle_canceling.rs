//! Negative-cycle canceling.
//!
//! A feasible flow is established first by cost-free routing; afterwards
//! negative cycles in the residual network are canceled until none remain,
//! which is the classic optimality certificate. Cycles are located through
//! a Karp table: walks of exactly k edges from a virtual root, for k up to
//! the node count. A node whose n-edge walk undercuts all of its shorter
//! walks certifies a negative cycle on that walk; decomposing the walk
//! then yields one. The method picks which of the decomposed cycles to
//! cancel: any negative one, or the one of minimum mean.

use super::{establish_feasible_flow, CycleCancelingMethod, Residual};

pub(crate) fn run(net: &mut Residual, method: CycleCancelingMethod) -> bool {
    if !establish_feasible_flow(net) {
        return false;
    }
    let min_mean = !matches!(method, CycleCancelingMethod::Simple);
    while let Some(cycle) = find_negative_cycle(net, min_mean) {
        let step = cycle
            .iter()
            .map(|&e| net.cap(e))
            .min()
            .expect("cycles are non-empty");
        for e in cycle {
            net.push(e, step);
        }
    }
    true
}

/// Locate a negative cycle in the residual network, or report that none
/// exists. With `min_mean` set, the cycle of smallest mean cost among the
/// candidates of the certifying walk is preferred.
fn find_negative_cycle(net: &Residual, min_mean: bool) -> Option<Vec<usize>> {
    let n = net.num_nodes();
    if n == 0 {
        return None;
    }
    const UNSET: i64 = i64::MAX;

    // dist[k][v]: cheapest walk of exactly k edges ending at v, starting
    // anywhere (the virtual root contributes the all-zero row 0).
    let mut dist = vec![vec![UNSET; n]; n + 1];
    let mut via = vec![vec![usize::MAX; n]; n + 1];
    dist[0] = vec![0; n];
    for k in 1..=n {
        for e in 0..net.num_edges() {
            if net.cap(e) == 0 {
                continue;
            }
            let u = net.tail(e);
            let v = net.head(e);
            if dist[k - 1][u] == UNSET {
                continue;
            }
            let candidate = dist[k - 1][u] + net.cost(e);
            if candidate < dist[k][v] {
                dist[k][v] = candidate;
                via[k][v] = e;
            }
        }
    }

    // v certifies a negative cycle iff its n-edge walk undercuts every
    // shorter walk to it.
    let qualifies = |v: usize| {
        dist[n][v] != UNSET && (0..n).all(|k| dist[k][v] == UNSET || dist[n][v] < dist[k][v])
    };
    let witness = if min_mean {
        (0..n)
            .filter(|&v| qualifies(v))
            .min_by(|&a, &b| {
                let ratio = |v: usize| {
                    (0..n)
                        .filter(|&k| dist[k][v] != UNSET)
                        .map(|k| (dist[n][v] - dist[k][v]) as f64 / (n - k) as f64)
                        .fold(f64::MIN, f64::max)
                };
                ratio(a).total_cmp(&ratio(b))
            })?
    } else {
        (0..n).find(|&v| qualifies(v))?
    };

    // Reconstruct the certifying walk, then decompose it; at least one of
    // the decomposed cycles is negative.
    let mut walk_edges = vec![usize::MAX; n + 1];
    let mut node = witness;
    for k in (1..=n).rev() {
        walk_edges[k] = via[k][node];
        node = net.tail(via[k][node]);
    }

    let mut position = vec![usize::MAX; n];
    let mut node_stack = vec![node];
    let mut edge_stack = vec![usize::MAX];
    position[node] = 0;
    let mut best: Option<(Vec<usize>, i64)> = None;
    for k in 1..=n {
        let e = walk_edges[k];
        let v = net.head(e);
        if position[v] == usize::MAX {
            position[v] = node_stack.len();
            node_stack.push(v);
            edge_stack.push(e);
            continue;
        }
        let mut cycle: Vec<usize> = edge_stack[position[v] + 1..].to_vec();
        cycle.push(e);
        let cost: i64 = cycle.iter().map(|&e| net.cost(e)).sum();
        if cost < 0 {
            let better = match &best {
                None => true,
                // Compare means by cross-multiplication.
                Some((held, held_cost)) => {
                    cost * (held.len() as i64) < held_cost * cycle.len() as i64
                }
            };
            if better {
                best = Some((cycle.clone(), cost));
            }
            if !min_mean {
                break;
            }
        }
        while node_stack.len() > position[v] + 1 {
            let popped = node_stack.pop().expect("stack holds the cycle");
            position[popped] = usize::MAX;
            edge_stack.pop();
        }
    }
    best.map(|(cycle, _)| cycle)
}
