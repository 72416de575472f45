//! Successive shortest paths with capacity scaling.
//!
//! Surplus is routed to deficits along reduced-cost shortest paths, in
//! units of a scaling parameter delta that shrinks by the configured
//! factor each phase. At the start of a phase every delta-wide residual
//! edge with negative reduced cost is saturated, restoring the invariant
//! that Dijkstra only ever sees non-negative reduced costs.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::Residual;

pub(crate) fn run(net: &mut Residual, factor: i64) -> bool {
    let n = net.num_nodes();
    let factor = factor.max(2);
    let max_excess = net.excess.iter().map(|x| x.abs()).max().unwrap_or(0);
    if max_excess == 0 {
        // Costs are non-negative, so the zero flow is optimal.
        return true;
    }

    let mut prices = vec![0_i64; n];
    let mut delta = 1_i64;
    while delta.saturating_mul(factor) <= max_excess {
        delta *= factor;
    }

    loop {
        // Saturate delta-wide edges that turned admissible when delta
        // shrank; this keeps reduced costs non-negative in the
        // delta-residual network.
        for e in 0..net.num_edges() {
            if net.cap(e) >= delta {
                let rc = net.cost(e) + prices[net.tail(e)] - prices[net.head(e)];
                if rc < 0 {
                    let full = net.cap(e);
                    net.push(e, full);
                }
            }
        }

        let mut stuck = vec![false; n];
        loop {
            let Some(source) = (0..n).find(|&v| net.excess[v] >= delta && !stuck[v]) else {
                break;
            };
            match shortest_path(net, &prices, delta, source) {
                Some((dist, pred, target)) => {
                    let radius = dist[target];
                    for v in 0..n {
                        prices[v] += dist[v].min(radius);
                    }
                    let mut v = target;
                    while v != source {
                        let e = pred[v];
                        net.push(e, delta);
                        v = net.tail(e);
                    }
                    stuck.fill(false);
                }
                None => stuck[source] = true,
            }
        }

        if delta == 1 {
            break;
        }
        delta /= factor;
    }

    net.is_balanced()
}

/// Dijkstra over delta-wide residual edges with reduced costs, from
/// `source` to the nearest node holding a deficit of at least delta.
/// Returns tentative distances, predecessor edges and the target.
#[allow(clippy::type_complexity)]
fn shortest_path(
    net: &Residual,
    prices: &[i64],
    delta: i64,
    source: usize,
) -> Option<(Vec<i64>, Vec<usize>, usize)> {
    let n = net.num_nodes();
    let mut dist = vec![i64::MAX; n];
    let mut pred = vec![usize::MAX; n];
    let mut done = vec![false; n];
    let mut heap = BinaryHeap::new();
    dist[source] = 0;
    heap.push(Reverse((0_i64, source)));

    while let Some(Reverse((d, u))) = heap.pop() {
        if done[u] {
            continue;
        }
        done[u] = true;
        if net.excess[u] <= -delta {
            return Some((dist, pred, u));
        }
        for k in 0..net.edges_from(u).len() {
            let e = net.edges_from(u)[k];
            if net.cap(e) < delta {
                continue;
            }
            let v = net.head(e);
            let rc = net.cost(e) + prices[u] - prices[v];
            debug_assert!(rc >= 0);
            if d + rc < dist[v] {
                dist[v] = d + rc;
                pred[v] = e;
                heap.push(Reverse((dist[v], v)));
            }
        }
    }
    None
}
