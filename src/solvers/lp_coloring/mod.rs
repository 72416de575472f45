//! LP-relaxation coloring solver for layout decomposition.
//!
//! The solver colors a conflict graph with three or four colors by
//! iteratively tightening a continuous relaxation of the two-bit coloring
//! model:
//!
//! 1. build the relaxation and anchor one vertex,
//! 2. re-optimize under small objective perturbations plus odd-cycle cuts
//!    while the count of fractional vertex bits keeps falling,
//! 3. fix stubborn half-integer pairs by binding-constraint analysis,
//! 4. round, decode the two-bit codes, and run a local greedy repair on
//!    residual conflicts.
//!
//! The result is a heuristic: valid input always yields a full coloring,
//! but not necessarily a conflict-free one on graphs that are not
//! k-colorable.

mod odd_cycle;
mod refine;
mod relaxation;
mod rounding;

use std::collections::HashSet;

use crate::error::{Result, SolverError};
use crate::models::{ColorCount, ConflictGraph};
use crate::solvers::lp::LpStatus;
use relaxation::{is_integral, Relaxation};

/// Diagnostics from one [`LpColoring::solve_with_stats`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColoringStats {
    /// Refinement passes over the relaxation.
    pub refine_iterations: usize,
    /// Odd-cycle cut rows added.
    pub cuts_added: usize,
    /// Half-integer pairs fixed by binding analysis.
    pub pairs_rounded: usize,
    /// Fractional auxiliary edge bits left in the final relaxation.
    pub fractional_edge_bits: usize,
    /// Conflict edges remaining after repair.
    pub residual_conflicts: usize,
}

/// LP-relaxation coloring solver.
///
/// # Example
///
/// ```
/// use layoutsolvers::models::{ColorCount, ConflictGraph};
/// use layoutsolvers::solvers::LpColoring;
///
/// let graph =
///     ConflictGraph::with_edges(3, vec![(0, 1, 1), (1, 2, 1), (0, 2, 1)]).unwrap();
/// let colors = LpColoring::new(ColorCount::Three).solve(&graph).unwrap();
/// assert!(graph.is_proper(&colors));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LpColoring {
    color_count: ColorCount,
}

impl LpColoring {
    /// Create a solver for the given palette size.
    pub fn new(color_count: ColorCount) -> Self {
        Self { color_count }
    }

    /// The palette size this solver assigns.
    pub fn color_count(&self) -> ColorCount {
        self.color_count
    }

    /// Color the graph, returning one color per vertex.
    pub fn solve(&self, graph: &ConflictGraph) -> Result<Vec<usize>> {
        self.solve_with_stats(graph).map(|(colors, _)| colors)
    }

    /// Color the graph and report run diagnostics.
    pub fn solve_with_stats(&self, graph: &ConflictGraph) -> Result<(Vec<usize>, ColoringStats)> {
        let mut relax = Relaxation::build(graph, self.color_count)?;
        relax.anchor(graph);
        let mut stats = ColoringStats::default();

        Self::optimize(&mut relax)?;
        let mut census = relax.census();

        // Refinement: perturb, cut odd cycles, re-optimize. The census is
        // the termination witness; it can only decrease 2|V| times.
        let mut seen_cycles: HashSet<Vec<usize>> = HashSet::new();
        let mut previous = usize::MAX;
        while census.vertex_nonintegral > 0 && census.vertex_nonintegral < previous {
            previous = census.vertex_nonintegral;
            stats.refine_iterations += 1;

            let objective = self.perturbation(graph, &relax);
            stats.cuts_added += self.cut_odd_cycles(graph, &mut relax, &mut seen_cycles);
            relax.lp.set_objective(objective);

            Self::optimize(&mut relax)?;
            census = relax.census();
        }

        // Binding-analysis rounding of the remaining half-integer pairs.
        previous = usize::MAX;
        while census.vertex_half > 0 && census.vertex_nonintegral < previous {
            previous = census.vertex_nonintegral;
            let fixed = rounding::round_half_pairs(&mut relax);
            if fixed == 0 {
                break;
            }
            stats.pairs_rounded += fixed;
            Self::optimize(&mut relax)?;
            census = relax.census();
        }
        stats.fractional_edge_bits = census.edge_nonintegral + census.edge_half;

        let mut colors = refine::decode_colors(&relax);
        if !graph.has_precolored() {
            refine::greedy_repair(graph, &mut colors, self.color_count);
        }
        stats.residual_conflicts = graph.conflict_count(&colors);
        Ok((colors, stats))
    }

    fn optimize(relax: &mut Relaxation) -> Result<()> {
        match relax.lp.optimize()? {
            LpStatus::Optimal => Ok(()),
            LpStatus::Infeasible => Err(SolverError::RelaxationInfeasible),
        }
    }

    /// Build the perturbation objective for the current solution: for every
    /// fractional pair, reward the larger bit and penalize the smaller one;
    /// for every conflict edge and bit index, reward the larger side. The
    /// terms nudge the solution toward definite bits without changing the
    /// feasible set.
    fn perturbation(&self, graph: &ConflictGraph, relax: &Relaxation) -> Vec<(usize, f64)> {
        let mut coeffs = vec![0.0_f64; relax.lp.num_vars()];

        for v in 0..graph.num_vertices() {
            let (first, second) = relax.vertex_bits(v);
            let (x1, x2) = (relax.lp.value(first), relax.lp.value(second));
            if is_integral(x1) && is_integral(x2) {
                continue;
            }
            if x1 > x2 {
                // minimize x2 - x1
                coeffs[second] += 1.0;
                coeffs[first] -= 1.0;
            } else {
                coeffs[first] += 1.0;
                coeffs[second] -= 1.0;
            }
        }

        for (s, t, _) in graph.edges() {
            let (s1, s2) = relax.vertex_bits(s);
            let (t1, t2) = relax.vertex_bits(t);
            for (sb, tb) in [(s1, t1), (s2, t2)] {
                if relax.lp.value(sb) > relax.lp.value(tb) {
                    // minimize t_i - s_i
                    coeffs[tb] += 1.0;
                    coeffs[sb] -= 1.0;
                } else {
                    coeffs[sb] += 1.0;
                    coeffs[tb] -= 1.0;
                }
            }
        }

        coeffs
            .into_iter()
            .enumerate()
            .filter(|&(_, c)| c != 0.0)
            .collect()
    }

    /// Add the two cut rows per bit index for every fresh odd cycle through
    /// a fractional vertex: the cycle's bits must sum to at least 1 and at
    /// most L - 1. Returns the number of rows added.
    fn cut_odd_cycles(
        &self,
        graph: &ConflictGraph,
        relax: &mut Relaxation,
        seen: &mut HashSet<Vec<usize>>,
    ) -> usize {
        use crate::models::Comparison;

        let mut added = 0;
        for root in 0..graph.num_vertices() {
            let (first, second) = relax.vertex_bits(root);
            if is_integral(relax.lp.value(first)) && is_integral(relax.lp.value(second)) {
                continue;
            }
            for cycle in odd_cycle::odd_cycles_through(graph, root) {
                let mut signature = cycle.clone();
                signature.sort_unstable();
                if !seen.insert(signature) {
                    continue;
                }
                let length = cycle.len() as f64;
                for bit in 0..2 {
                    let terms: Vec<(usize, f64)> = cycle
                        .iter()
                        .map(|&v| (relax.vertex_bits(v).0 + bit, 1.0))
                        .collect();
                    relax.lp.add_row(terms.clone(), Comparison::Ge, 1.0);
                    relax.lp.add_row(terms, Comparison::Le, length - 1.0);
                    added += 2;
                }
            }
        }
        added
    }
}
