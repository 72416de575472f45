//! Re-optimizable LP adapter over the good_lp backend.
//!
//! good_lp models are single-shot: rows and bounds cannot be edited after
//! `solve`. The coloring relaxation needs repeated re-optimization with
//! mutated bounds and a growing row set, plus slack, coefficient and column
//! queries at the last solution. The adapter therefore keeps the model
//! itself (variables, sparse rows, objective, column index) and rebuilds
//! the backend problem on every [`LpModel::optimize`] call.

use crate::error::{Result, SolverError};
use crate::models::Comparison;
use good_lp::{default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable};

/// Outcome of an [`LpModel::optimize`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    /// An optimal solution is available through the query methods.
    Optimal,
    /// The model is infeasible.
    Infeasible,
}

#[derive(Debug, Clone)]
struct LpVar {
    lb: f64,
    ub: f64,
}

/// A sparse LP row.
#[derive(Debug, Clone)]
pub struct LpRow {
    /// Sparse representation: (var_index, coefficient) pairs.
    pub terms: Vec<(usize, f64)>,
    /// Row sense.
    pub cmp: Comparison,
    /// Right-hand side constant.
    pub rhs: f64,
}

/// A continuous linear program with a minimization objective.
#[derive(Debug, Clone, Default)]
pub struct LpModel {
    vars: Vec<LpVar>,
    rows: Vec<LpRow>,
    /// Column index: variable -> rows it appears in.
    columns: Vec<Vec<usize>>,
    /// Sparse objective coefficients.
    objective: Vec<(usize, f64)>,
    /// Variable values at the last solution.
    values: Vec<f64>,
}

impl LpModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Add a continuous variable with bounds `[lb, ub]`.
    pub fn add_var(&mut self, lb: f64, ub: f64) -> usize {
        self.vars.push(LpVar { lb, ub });
        self.columns.push(Vec::new());
        self.vars.len() - 1
    }

    /// Add a row, keeping the column index current.
    pub fn add_row(&mut self, terms: Vec<(usize, f64)>, cmp: Comparison, rhs: f64) -> usize {
        let row = self.rows.len();
        for &(var, _) in &terms {
            self.columns[var].push(row);
        }
        self.rows.push(LpRow { terms, cmp, rhs });
        row
    }

    /// Replace the minimization objective.
    pub fn set_objective(&mut self, objective: Vec<(usize, f64)>) {
        self.objective = objective;
    }

    /// Lower bound of a variable.
    pub fn lb(&self, var: usize) -> f64 {
        self.vars[var].lb
    }

    /// Upper bound of a variable.
    pub fn ub(&self, var: usize) -> f64 {
        self.vars[var].ub
    }

    /// Mutate the lower bound of a variable.
    pub fn set_lb(&mut self, var: usize, lb: f64) {
        self.vars[var].lb = lb;
    }

    /// Mutate the upper bound of a variable.
    pub fn set_ub(&mut self, var: usize, ub: f64) {
        self.vars[var].ub = ub;
    }

    /// Fix both bounds of a variable.
    pub fn set_bounds(&mut self, var: usize, lb: f64, ub: f64) {
        self.vars[var].lb = lb;
        self.vars[var].ub = ub;
    }

    /// Rebuild the backend problem from the stored model and solve it.
    pub fn optimize(&mut self) -> Result<LpStatus> {
        let mut builder = ProblemVariables::new();
        let handles: Vec<Variable> = self
            .vars
            .iter()
            .map(|v| builder.add(variable().min(v.lb).max(v.ub)))
            .collect();

        let objective: Expression = self
            .objective
            .iter()
            .map(|&(var, coef)| coef * handles[var])
            .sum();

        let mut problem = builder.minimise(objective).using(default_solver);
        for row in &self.rows {
            let lhs: Expression = row
                .terms
                .iter()
                .map(|&(var, coef)| coef * handles[var])
                .sum();
            let constraint = match row.cmp {
                Comparison::Le => lhs.leq(row.rhs),
                Comparison::Ge => lhs.geq(row.rhs),
                Comparison::Eq => lhs.eq(row.rhs),
            };
            problem = problem.with(constraint);
        }

        match problem.solve() {
            Ok(solution) => {
                self.values = handles.iter().map(|v| solution.value(*v)).collect();
                Ok(LpStatus::Optimal)
            }
            Err(ResolutionError::Infeasible) => Ok(LpStatus::Infeasible),
            Err(other) => Err(SolverError::Backend(other.to_string())),
        }
    }

    /// Value of a variable at the last solution.
    pub fn value(&self, var: usize) -> f64 {
        self.values[var]
    }

    /// Slack of a row at the last solution: the distance to the bound,
    /// non-negative for feasible points. Equality rows report the absolute
    /// residual.
    pub fn slack(&self, row: usize) -> f64 {
        let r = &self.rows[row];
        let lhs: f64 = r
            .terms
            .iter()
            .map(|&(var, coef)| coef * self.values[var])
            .sum();
        match r.cmp {
            Comparison::Le => r.rhs - lhs,
            Comparison::Ge => lhs - r.rhs,
            Comparison::Eq => (lhs - r.rhs).abs(),
        }
    }

    /// Sense of a row.
    pub fn sense(&self, row: usize) -> Comparison {
        self.rows[row].cmp
    }

    /// Coefficient of a variable within a row (zero if absent).
    pub fn coeff(&self, row: usize, var: usize) -> f64 {
        self.rows[row]
            .terms
            .iter()
            .find(|&&(v, _)| v == var)
            .map(|&(_, c)| c)
            .unwrap_or(0.0)
    }

    /// Rows touching a variable.
    pub fn column(&self, var: usize) -> &[usize] {
        &self.columns[var]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_and_query() {
        // min x + y  s.t.  x + y >= 2,  x - y <= 0.5,  x,y in [0, 10]
        let mut lp = LpModel::new();
        let x = lp.add_var(0.0, 10.0);
        let y = lp.add_var(0.0, 10.0);
        let r0 = lp.add_row(vec![(x, 1.0), (y, 1.0)], Comparison::Ge, 2.0);
        let r1 = lp.add_row(vec![(x, 1.0), (y, -1.0)], Comparison::Le, 0.5);
        lp.set_objective(vec![(x, 1.0), (y, 1.0)]);

        assert_eq!(lp.optimize().unwrap(), LpStatus::Optimal);
        let obj = lp.value(x) + lp.value(y);
        assert!((obj - 2.0).abs() < 1e-6, "objective was {obj}");
        // The covering row is binding at the optimum.
        assert!(lp.slack(r0).abs() < 1e-6);
        assert!(lp.slack(r1) >= -1e-6);
    }

    #[test]
    fn test_bound_mutation_and_resolve() {
        // min x  s.t.  x >= y - 1,  y fixed by bounds afterwards
        let mut lp = LpModel::new();
        let x = lp.add_var(0.0, 10.0);
        let y = lp.add_var(0.0, 10.0);
        lp.add_row(vec![(x, 1.0), (y, -1.0)], Comparison::Ge, -1.0);
        lp.set_objective(vec![(x, 1.0)]);

        assert_eq!(lp.optimize().unwrap(), LpStatus::Optimal);
        assert!(lp.value(x).abs() < 1e-6);

        lp.set_bounds(y, 5.0, 5.0);
        assert_eq!(lp.optimize().unwrap(), LpStatus::Optimal);
        assert!((lp.value(x) - 4.0).abs() < 1e-6);
        assert!((lp.value(y) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible_status() {
        let mut lp = LpModel::new();
        let x = lp.add_var(0.0, 1.0);
        lp.add_row(vec![(x, 1.0)], Comparison::Ge, 2.0);
        assert_eq!(lp.optimize().unwrap(), LpStatus::Infeasible);
    }

    #[test]
    fn test_coeff_and_column() {
        let mut lp = LpModel::new();
        let x = lp.add_var(0.0, 1.0);
        let y = lp.add_var(0.0, 1.0);
        let r0 = lp.add_row(vec![(x, 2.0), (y, -1.0)], Comparison::Le, 1.0);
        let r1 = lp.add_row(vec![(y, 3.0)], Comparison::Ge, 0.0);
        assert_eq!(lp.coeff(r0, x), 2.0);
        assert_eq!(lp.coeff(r1, x), 0.0);
        assert_eq!(lp.coeff(r1, y), 3.0);
        assert_eq!(lp.column(x), &[r0]);
        assert_eq!(lp.column(y), &[r0, r1]);
        assert_eq!(lp.sense(r0), Comparison::Le);
        assert_eq!(lp.sense(r1), Comparison::Ge);
    }

    #[test]
    fn test_empty_objective_is_feasibility_solve() {
        let mut lp = LpModel::new();
        let x = lp.add_var(0.0, 1.0);
        lp.add_row(vec![(x, 1.0)], Comparison::Ge, 0.25);
        assert_eq!(lp.optimize().unwrap(), LpStatus::Optimal);
        assert!(lp.value(x) >= 0.25 - 1e-6);
    }
}
