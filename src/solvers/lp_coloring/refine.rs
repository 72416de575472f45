//! Color application and greedy pairwise conflict repair.

use crate::models::{ColorCount, ConflictGraph};
use crate::solvers::lp_coloring::relaxation::Relaxation;

/// Round every bit to the nearest integer and compose the per-vertex
/// colors. Under three colors a residual half/half pair would round to the
/// forbidden code `0b11` (the palette row keeps exact ones out of the LP,
/// rounding is the only path there); such a pair falls back to color 2.
pub(crate) fn decode_colors(relax: &Relaxation) -> Vec<usize> {
    let three = relax.color_count() == ColorCount::Three;
    (0..relax.num_vertices())
        .map(|v| {
            let (first, second) = relax.vertex_bits(v);
            let b1 = relax.lp.value(first).round().clamp(0.0, 1.0) as usize;
            let b2 = relax.lp.value(second).round().clamp(0.0, 1.0) as usize;
            let code = (b1 << 1) | b2;
            if three && code == 3 {
                2
            } else {
                code
            }
        })
        .collect()
}

/// Local pairwise repair of residual conflicts.
///
/// For every conflict edge whose endpoints share a color, try the ordered
/// color pairs `(c1, c2)` with `c1 != c2`. A color is forbidden for an
/// endpoint when a neighbor other than the opposite endpoint already holds
/// it; the first pair leaving both endpoints clean is assigned. Each repair
/// resolves its edge without creating new conflicts, so the number of
/// same-color edges never increases.
pub(crate) fn greedy_repair(
    graph: &ConflictGraph,
    colors: &mut [usize],
    color_count: ColorCount,
) {
    let palette = color_count.colors();
    for (s, t, _) in graph.edges() {
        if colors[s] != colors[t] {
            continue;
        }
        let forbidden_s = forbidden_for(graph, colors, s, t);
        let forbidden_t = forbidden_for(graph, colors, t, s);
        'pairs: for c1 in 0..palette {
            for c2 in 0..palette {
                if c1 == c2 || forbidden_s[c1] || forbidden_t[c2] {
                    continue;
                }
                colors[s] = c1;
                colors[t] = c2;
                break 'pairs;
            }
        }
    }
}

/// Colors held by neighbors of `v` other than `other`.
fn forbidden_for(graph: &ConflictGraph, colors: &[usize], v: usize, other: usize) -> [bool; 4] {
    let mut forbidden = [false; 4];
    for u in graph.neighbors(v) {
        if u != other {
            forbidden[colors[u]] = true;
        }
    }
    forbidden
}
