//! Dual min-cost-flow solver for difference-constraint LPs.
//!
//! The LP
//!
//! ```text
//! min  sum_i c_i x_i   s.t.  x_i - x_j >= b,  d_i <= x_i <= u_i
//! ```
//!
//! is rewritten over `y_i = x_i + y_0` with a source variable `y_0`, which
//! turns the bounds into difference constraints as well:
//!
//! ```text
//! y_i - y_j >= b      (original rows)
//! y_i - y_0 >= d_i    (lower bounds)
//! y_0 - y_i >= -u_i   (upper bounds)
//! ```
//!
//! The dual of this system is a min-cost flow: one node per variable plus
//! a source node, supply `-c_i` per node, and an arc `j -> i` of cost `-b`
//! for every difference `y_i - y_j >= b`. Optimal node potentials decode
//! the primal as `x_i = pi_i - pi_0`, and the optimal flow values are the
//! dual values of the rows.
//!
//! Arcs whose induced cost would be negative are reversed on entry so any
//! engine can run (only capacity scaling tolerates negative costs); the
//! swap shifts both endpoint supplies by the capacity and accrues a cost
//! offset that is corrected for after the solve. Uncapacitated arcs are
//! capped with a big-M exceeding any feasible magnitude.

mod engines;
mod flow_graph;

pub use engines::{
    CostScalingMethod, CycleCancelingMethod, FlowResult, FlowStatus, McfEngine, PivotRule,
};
pub use flow_graph::{FlowArc, FlowGraph};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Comparison, LinearModel};

/// Verdict of a [`DualMcf`] solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// The solution was written into the model.
    Optimal,
    /// The constraint system admits no solution.
    Infeasible,
    /// The objective is unbounded below.
    Unbounded,
}

/// Result of a [`DualMcf`] solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualSolution {
    pub status: SolveStatus,
    /// Value per variable. Empty unless optimal.
    pub values: Vec<i64>,
    /// Objective at the solution. Zero unless optimal.
    pub objective: i64,
    /// Dual value (arc flow in original orientation) per stored
    /// difference constraint; equalities report the net of their two
    /// directions. Empty unless optimal.
    pub duals: Vec<i64>,
}

/// Tracks one row's arc through the negative-cost rewrite so its dual
/// value can be reported in original orientation.
#[derive(Debug, Clone, Copy)]
struct ArcSlot {
    arc: usize,
    capacity: i64,
    reversed: bool,
}

impl ArcSlot {
    fn flow(&self, result: &FlowResult) -> i64 {
        let raw = result.flows[self.arc];
        if self.reversed {
            self.capacity - raw
        } else {
            raw
        }
    }
}

/// The flow instance distilled from a [`LinearModel`].
struct Reduction {
    graph: FlowGraph,
    source: usize,
    /// Accumulated cost offset of the reversed arcs.
    offset: i64,
    /// Per stored constraint: the >= arc, plus the <= arc for equalities.
    rows: Vec<(ArcSlot, Option<ArcSlot>)>,
}

impl Reduction {
    fn build(model: &LinearModel) -> Self {
        let n = model.num_vars();
        let mut graph = FlowGraph::with_nodes(n + 1);
        let source = n;

        let mut objective_total = 0;
        for (i, var) in model.vars().iter().enumerate() {
            graph.set_supply(i, -var.objective);
            objective_total += var.objective;
        }
        graph.set_supply(source, objective_total);

        let big_m = big_m(model);
        let mut reduction = Self {
            graph,
            source,
            offset: 0,
            rows: Vec::with_capacity(model.constraints().len()),
        };

        for constraint in model.constraints() {
            let (pos, neg) = match constraint.terms.as_slice() {
                [(a, 1), (b, -1)] => (*a, *b),
                [(a, -1), (b, 1)] => (*b, *a),
                _ => unreachable!("intake validation keeps only difference rows"),
            };
            // x_pos - x_neg {cmp} rhs
            let ge = match constraint.cmp {
                Comparison::Le => None,
                _ => Some(reduction.add_arc(neg, pos, big_m, -constraint.rhs)),
            };
            let le = match constraint.cmp {
                Comparison::Ge => None,
                // x_pos - x_neg <= rhs  <=>  x_neg - x_pos >= -rhs
                _ => Some(reduction.add_arc(pos, neg, big_m, constraint.rhs)),
            };
            reduction.rows.push((ge.or(le).expect("one side exists"), {
                if constraint.cmp == Comparison::Eq {
                    le
                } else {
                    None
                }
            }));
        }

        for (i, var) in model.vars().iter().enumerate() {
            // y_i - y_0 >= lower  and  y_0 - y_i >= -upper
            reduction.add_arc(source, i, big_m, -var.lower);
            reduction.add_arc(i, source, big_m, var.upper);
        }
        reduction
    }

    /// Add an arc, reversing it when its cost is negative so the engines
    /// only ever see non-negative costs.
    fn add_arc(&mut self, tail: usize, head: usize, capacity: i64, cost: i64) -> ArcSlot {
        if cost >= 0 {
            let arc = self.graph.add_arc(tail, head, capacity, cost);
            return ArcSlot {
                arc,
                capacity,
                reversed: false,
            };
        }
        // f = capacity - f' turns the arc around: the full capacity is
        // pre-pushed through it, the reverse arc can take it back, and the
        // pre-push is settled in the supplies and the cost offset.
        let arc = self.graph.add_arc(head, tail, capacity, -cost);
        self.graph.add_supply(tail, -capacity);
        self.graph.add_supply(head, capacity);
        self.offset += cost * capacity;
        ArcSlot {
            arc,
            capacity,
            reversed: true,
        }
    }
}

/// A capacity surrogate exceeding any feasible |x_i| and any useful flow
/// volume: the summed magnitudes of bounds, right-hand sides and objective
/// coefficients, with headroom.
fn big_m(model: &LinearModel) -> i64 {
    let bounds: i64 = model
        .vars()
        .iter()
        .map(|v| v.lower.abs() + v.upper.abs() + v.objective.abs())
        .sum();
    let rhs: i64 = model.constraints().iter().map(|c| c.rhs.abs()).sum();
    2 * (bounds + rhs) + 1
}

/// Difference-constraint LP solver via the dual min-cost-flow reduction.
///
/// # Example
///
/// ```
/// use layoutsolvers::models::{LinearConstraint, LinearModel};
/// use layoutsolvers::solvers::{DualMcf, SolveStatus};
///
/// let mut model = LinearModel::new();
/// let x1 = model.add_var(0, 10, 1, "x1").unwrap();
/// let x2 = model.add_var(0, 10, 1, "x2").unwrap();
/// model
///     .add_constraint(LinearConstraint::ge(vec![(x1, 1), (x2, -1)], 3))
///     .unwrap();
/// model
///     .add_constraint(LinearConstraint::ge(vec![(x2, 1)], 1))
///     .unwrap();
///
/// let solution = DualMcf::new().solve(&mut model).unwrap();
/// assert_eq!(solution.status, SolveStatus::Optimal);
/// assert_eq!(solution.values, vec![4, 1]);
/// assert_eq!(model.objective_value(), Some(5));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DualMcf {
    engine: McfEngine,
}

impl DualMcf {
    /// Create a solver with the default engine (network simplex).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver with an explicit engine choice.
    pub fn with_engine(engine: McfEngine) -> Self {
        Self { engine }
    }

    /// The configured engine.
    pub fn engine(&self) -> McfEngine {
        self.engine
    }

    /// Solve the model. On [`SolveStatus::Optimal`] the values and the
    /// objective are also written into the model's solution slots.
    pub fn solve(&self, model: &mut LinearModel) -> Result<DualSolution> {
        let reduction = Reduction::build(model);
        debug_assert_eq!(reduction.graph.total_supply(), 0);

        let result = self.engine.run(&reduction.graph);
        match result.status {
            FlowStatus::Infeasible => return Ok(DualSolution::failed(SolveStatus::Infeasible)),
            FlowStatus::Unbounded => return Ok(DualSolution::failed(SolveStatus::Unbounded)),
            FlowStatus::Optimal => {}
        }

        let pi0 = result.potentials[reduction.source];
        let values: Vec<i64> = (0..model.num_vars())
            .map(|i| result.potentials[i] - pi0)
            .collect();

        // Big-M capping hides the unbounded-dual signature of an
        // infeasible difference system, so the decoded point is checked
        // against the original rows and bounds.
        if !model.is_feasible(&values) {
            return Ok(DualSolution::failed(SolveStatus::Infeasible));
        }

        let objective = -(result.cost + reduction.offset);
        debug_assert_eq!(objective, model.evaluate_objective(&values));

        let duals = reduction
            .rows
            .iter()
            .map(|(ge, le)| {
                ge.flow(&result) - le.map(|slot| slot.flow(&result)).unwrap_or(0)
            })
            .collect();

        model.set_solution(values.clone(), objective);
        Ok(DualSolution {
            status: SolveStatus::Optimal,
            values,
            objective,
            duals,
        })
    }
}

impl DualSolution {
    fn failed(status: SolveStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: 0,
            duals: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinearConstraint;

    fn legalization_model() -> LinearModel {
        // min x1 + x2  s.t.  x1 - x2 >= 3,  x2 >= 1,  x in [0, 10]^2
        let mut model = LinearModel::new();
        let x1 = model.add_var(0, 10, 1, "x1").unwrap();
        let x2 = model.add_var(0, 10, 1, "x2").unwrap();
        model
            .add_constraint(LinearConstraint::ge(vec![(x1, 1), (x2, -1)], 3))
            .unwrap();
        model
            .add_constraint(LinearConstraint::ge(vec![(x2, 1)], 1))
            .unwrap();
        model
    }

    #[test]
    fn test_rewrite_leaves_no_negative_costs_and_balanced_supplies() {
        let model = legalization_model();
        let reduction = Reduction::build(&model);
        assert!(reduction.graph.arcs().iter().all(|a| a.cost >= 0));
        assert_eq!(reduction.graph.total_supply(), 0);
        // x1 - x2 >= 3 induces cost -3: that arc must have been reversed.
        assert!(reduction.rows[0].0.reversed);
        assert!(reduction.offset < 0);
    }

    #[test]
    fn test_minimal_spacing_solved_by_every_engine() {
        for engine in McfEngine::all() {
            let mut model = legalization_model();
            let solution = DualMcf::with_engine(engine).solve(&mut model).unwrap();
            assert_eq!(solution.status, SolveStatus::Optimal, "{engine:?}");
            assert_eq!(solution.values, vec![4, 1], "{engine:?}");
            assert_eq!(solution.objective, 5, "{engine:?}");
            assert_eq!(model.solution(), Some(&[4, 1][..]), "{engine:?}");
            assert_eq!(model.objective_value(), Some(5), "{engine:?}");
        }
    }

    #[test]
    fn test_contradictory_differences_are_infeasible() {
        for engine in McfEngine::all() {
            let mut model = LinearModel::new();
            let x1 = model.add_var(0, 10, 0, "x1").unwrap();
            let x2 = model.add_var(0, 10, 0, "x2").unwrap();
            model
                .add_constraint(LinearConstraint::ge(vec![(x1, 1), (x2, -1)], 1))
                .unwrap();
            model
                .add_constraint(LinearConstraint::ge(vec![(x2, 1), (x1, -1)], 1))
                .unwrap();
            let solution = DualMcf::with_engine(engine).solve(&mut model).unwrap();
            assert_eq!(solution.status, SolveStatus::Infeasible, "{engine:?}");
            assert!(model.solution().is_none(), "{engine:?}");
        }
    }

    #[test]
    fn test_equality_row() {
        let mut model = LinearModel::new();
        let a = model.add_var(0, 20, 1, "a").unwrap();
        let b = model.add_var(2, 20, 0, "b").unwrap();
        model
            .add_constraint(LinearConstraint::eq(vec![(a, 1), (b, -1)], 5))
            .unwrap();
        let solution = DualMcf::new().solve(&mut model).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.values, vec![7, 2]);
        assert_eq!(solution.objective, 7);
    }

    #[test]
    fn test_le_row_rewritten() {
        // min -x1  s.t.  x1 - x2 <= 4,  x2 <= 3  =>  x1 = 7
        let mut model = LinearModel::new();
        let x1 = model.add_var(0, 100, -1, "x1").unwrap();
        let x2 = model.add_var(0, 3, 0, "x2").unwrap();
        model
            .add_constraint(LinearConstraint::le(vec![(x1, 1), (x2, -1)], 4))
            .unwrap();
        let solution = DualMcf::new().solve(&mut model).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.values, vec![7, 3]);
        assert_eq!(solution.objective, -7);
    }

    #[test]
    fn test_negative_bounds() {
        // min x1  s.t.  x1 - x2 >= -2,  x in [-5, 5]^2
        let mut model = LinearModel::new();
        let x1 = model.add_var(-5, 5, 1, "x1").unwrap();
        let x2 = model.add_var(-5, 5, 0, "x2").unwrap();
        model
            .add_constraint(LinearConstraint::ge(vec![(x1, 1), (x2, -1)], -2))
            .unwrap();
        let solution = DualMcf::new().solve(&mut model).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.values[0], -5);
        assert!(model.is_feasible(&solution.values));
    }

    #[test]
    fn test_duals_track_binding_rows() {
        let mut model = legalization_model();
        let solution = DualMcf::new().solve(&mut model).unwrap();
        // Both rows are binding at (4, 1); their dual values are the flows
        // carrying the objective pressure, one unit each.
        assert_eq!(solution.duals.len(), 1);
        assert!(solution.duals[0] >= 1);
    }

    #[test]
    fn test_empty_model() {
        let mut model = LinearModel::new();
        let solution = DualMcf::new().solve(&mut model).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!(solution.values.is_empty());
        assert_eq!(solution.objective, 0);
    }
}
