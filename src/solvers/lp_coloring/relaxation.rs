//! Continuous relaxation of the two-bit coloring model.
//!
//! Every vertex gets two bit variables in [0, 1]; the color index is
//! `(b1 << 1) | b2`. For each conflict edge the four cover constraints
//! forbid identical codes on the endpoints: writing `s1, s2` for the
//! source bits and `t1, t2` for the target bits,
//!
//! ```text
//! s1 + s2 + t1 + t2 >= 1                    forbids (0,0) = (0,0)
//! (1-s1) + s2 + (1-t1) + t2 >= 1            forbids (1,0) = (1,0)
//! s1 + (1-s2) + t1 + (1-t2) >= 1            forbids (0,1) = (0,1)
//! (1-s1) + (1-s2) + (1-t1) + (1-t2) >= 1    forbids (1,1) = (1,1)
//! ```
//!
//! each requiring at least one of the four comparator bits to differ. In
//! three-color mode the code `0b11` is ruled out by `b1 + b2 <= 1` per
//! vertex. One auxiliary bit per edge is carried in [0, 1] for slackness
//! experiments; no hard constraint references it.

use crate::error::{Result, SolverError};
use crate::models::{ColorCount, Comparison, ConflictGraph};
use crate::solvers::lp::LpModel;

/// Integrality tolerance. Bit values are compared against 0, 1/2 and 1
/// within this tolerance rather than exactly, absorbing backend drift.
pub(crate) const INT_TOL: f64 = 1e-6;

/// Whether a bit value is integral within tolerance.
pub(crate) fn is_integral(x: f64) -> bool {
    (x - x.round()).abs() <= INT_TOL
}

/// Whether a bit value sits at exactly one half within tolerance.
pub(crate) fn is_half(x: f64) -> bool {
    (x - 0.5).abs() <= INT_TOL
}

/// Counts of fractional variables, the termination witness of both
/// refinement loops: iteration continues only while the vertex-bit
/// non-integer count strictly decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Census {
    pub vertex_nonintegral: usize,
    pub vertex_half: usize,
    pub edge_nonintegral: usize,
    pub edge_half: usize,
}

/// The relaxation: an [`LpModel`] plus the variable layout over the graph.
pub(crate) struct Relaxation {
    pub lp: LpModel,
    num_vertices: usize,
    num_edges: usize,
    color_count: ColorCount,
}

impl Relaxation {
    /// Build the relaxation for `graph`. Precolored vertices are pinned by
    /// equal bounds on their bit variables. The initial objective is zero.
    pub fn build(graph: &ConflictGraph, color_count: ColorCount) -> Result<Self> {
        let n = graph.num_vertices();
        let mut lp = LpModel::new();

        for v in 0..n {
            match graph.precolor(v) {
                Some(color) => {
                    if color >= color_count.colors() {
                        return Err(SolverError::InvalidPrecolor {
                            color,
                            palette: color_count.colors(),
                        });
                    }
                    let b1 = ((color >> 1) & 1) as f64;
                    let b2 = (color & 1) as f64;
                    lp.add_var(b1, b1);
                    lp.add_var(b2, b2);
                }
                None => {
                    lp.add_var(0.0, 1.0);
                    lp.add_var(0.0, 1.0);
                }
            }
        }
        for _ in 0..graph.num_edges() {
            lp.add_var(0.0, 1.0);
        }

        for (s, t, _) in graph.edges() {
            let (s1, s2) = Self::bits_of(s);
            let (t1, t2) = Self::bits_of(t);
            lp.add_row(
                vec![(s1, 1.0), (s2, 1.0), (t1, 1.0), (t2, 1.0)],
                Comparison::Ge,
                1.0,
            );
            lp.add_row(
                vec![(s1, -1.0), (s2, 1.0), (t1, -1.0), (t2, 1.0)],
                Comparison::Ge,
                -1.0,
            );
            lp.add_row(
                vec![(s1, 1.0), (s2, -1.0), (t1, 1.0), (t2, -1.0)],
                Comparison::Ge,
                -1.0,
            );
            lp.add_row(
                vec![(s1, -1.0), (s2, -1.0), (t1, -1.0), (t2, -1.0)],
                Comparison::Ge,
                -3.0,
            );
        }

        if color_count == ColorCount::Three {
            for v in 0..n {
                let (b1, b2) = Self::bits_of(v);
                lp.add_row(vec![(b1, 1.0), (b2, 1.0)], Comparison::Le, 1.0);
            }
        }

        Ok(Self {
            lp,
            num_vertices: n,
            num_edges: graph.num_edges(),
            color_count,
        })
    }

    fn bits_of(v: usize) -> (usize, usize) {
        (2 * v, 2 * v + 1)
    }

    /// The two bit-variable ids of a vertex.
    pub fn vertex_bits(&self, v: usize) -> (usize, usize) {
        Self::bits_of(v)
    }

    /// The auxiliary bit-variable id of an edge.
    pub fn edge_bit(&self, e: usize) -> usize {
        2 * self.num_vertices + e
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn color_count(&self) -> ColorCount {
        self.color_count
    }

    /// Break the color-permutation symmetry: with no precoloring present,
    /// pin both bits of the first highest-degree vertex to zero. Any
    /// precoloring already breaks the symmetry, so the anchor is omitted.
    pub fn anchor(&mut self, graph: &ConflictGraph) -> Option<usize> {
        if graph.has_precolored() || self.num_vertices == 0 {
            return None;
        }
        let mut anchor = 0;
        let mut best = graph.degree(0);
        for v in 1..self.num_vertices {
            let d = graph.degree(v);
            if d > best {
                best = d;
                anchor = v;
            }
        }
        let (b1, b2) = self.vertex_bits(anchor);
        self.lp.set_bounds(b1, 0.0, 0.0);
        self.lp.set_bounds(b2, 0.0, 0.0);
        Some(anchor)
    }

    /// Count fractional and half-integral bits at the last solution.
    pub fn census(&self) -> Census {
        let mut census = Census::default();
        for v in 0..2 * self.num_vertices {
            let x = self.lp.value(v);
            if !is_integral(x) {
                census.vertex_nonintegral += 1;
            }
            if is_half(x) {
                census.vertex_half += 1;
            }
        }
        for e in 0..self.num_edges {
            let x = self.lp.value(self.edge_bit(e));
            if !is_integral(x) {
                census.edge_nonintegral += 1;
            }
            if is_half(x) {
                census.edge_half += 1;
            }
        }
        census
    }
}
