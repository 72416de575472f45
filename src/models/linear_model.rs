//! Difference-constraint linear program model.
//!
//! The model accepted by the dual min-cost-flow core:
//!
//! ```text
//! min  sum_i c_i x_i
//! s.t. x_i - x_j {>=, <=, ==} b     (difference constraints)
//!      lower_i <= x_i <= upper_i
//! ```
//!
//! over integer variables. Constraints are validated on entry: a constraint
//! must have exactly two terms with coefficients +1 and -1, or a single
//! term with coefficient +1 or -1 (a simple bound, folded into the variable
//! bounds). Anything else is rejected as outside the difference-constraint
//! class. This shape is what legalization, compaction and scheduling LPs
//! produce.

use crate::error::{Result, SolverError};
use serde::{Deserialize, Serialize};

/// Comparison operator for linear constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    /// Less than or equal (<=).
    Le,
    /// Greater than or equal (>=).
    Ge,
    /// Equal (==).
    Eq,
}

impl Comparison {
    /// Check if the comparison holds between lhs and rhs.
    pub fn holds(&self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparison::Le => lhs <= rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Eq => lhs == rhs,
        }
    }
}

/// A sparse linear constraint: sum of (coefficient * variable) {<=, >=, ==} rhs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Sparse representation: (var_index, coefficient) pairs.
    pub terms: Vec<(usize, i64)>,
    /// Comparison operator.
    pub cmp: Comparison,
    /// Right-hand side constant.
    pub rhs: i64,
}

impl LinearConstraint {
    /// Create a new linear constraint.
    pub fn new(terms: Vec<(usize, i64)>, cmp: Comparison, rhs: i64) -> Self {
        Self { terms, cmp, rhs }
    }

    /// Create a less-than-or-equal constraint.
    pub fn le(terms: Vec<(usize, i64)>, rhs: i64) -> Self {
        Self::new(terms, Comparison::Le, rhs)
    }

    /// Create a greater-than-or-equal constraint.
    pub fn ge(terms: Vec<(usize, i64)>, rhs: i64) -> Self {
        Self::new(terms, Comparison::Ge, rhs)
    }

    /// Create an equality constraint.
    pub fn eq(terms: Vec<(usize, i64)>, rhs: i64) -> Self {
        Self::new(terms, Comparison::Eq, rhs)
    }

    /// Evaluate the left-hand side for given variable values.
    pub fn evaluate_lhs(&self, values: &[i64]) -> i64 {
        self.terms
            .iter()
            .map(|&(var, coef)| coef * values.get(var).copied().unwrap_or(0))
            .sum()
    }

    /// Check if the constraint is satisfied by given variable values.
    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        self.cmp.holds(self.evaluate_lhs(values), self.rhs)
    }
}

/// An integer variable with finite bounds and a linear objective coefficient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVar {
    /// Lower bound.
    pub lower: i64,
    /// Upper bound.
    pub upper: i64,
    /// Objective coefficient.
    pub objective: i64,
    /// Variable name, used in diagnostics.
    pub name: String,
}

/// A difference-constraint LP with solution slots.
///
/// # Example
///
/// ```
/// use layoutsolvers::models::{LinearConstraint, LinearModel};
///
/// let mut model = LinearModel::new();
/// let x1 = model.add_var(0, 10, 1, "x1").unwrap();
/// let x2 = model.add_var(0, 10, 1, "x2").unwrap();
/// // x1 - x2 >= 3
/// model
///     .add_constraint(LinearConstraint::ge(vec![(x1, 1), (x2, -1)], 3))
///     .unwrap();
/// // x2 >= 1, a simple bound folded into the variable bounds
/// model
///     .add_constraint(LinearConstraint::ge(vec![(x2, 1)], 1))
///     .unwrap();
/// assert_eq!(model.var(x2).lower, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    vars: Vec<ModelVar>,
    /// Difference constraints (always exactly two terms, +1 and -1).
    constraints: Vec<LinearConstraint>,
    /// Solution values, written once on a successful solve.
    solution: Vec<i64>,
    /// Objective value at the solution.
    objective_value: Option<i64>,
}

impl LinearModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable with bounds `[lower, upper]` and objective coefficient.
    pub fn add_var(
        &mut self,
        lower: i64,
        upper: i64,
        objective: i64,
        name: impl Into<String>,
    ) -> Result<usize> {
        let index = self.vars.len();
        if lower > upper {
            return Err(SolverError::InconsistentBounds {
                index,
                lower,
                upper,
            });
        }
        self.vars.push(ModelVar {
            lower,
            upper,
            objective,
            name: name.into(),
        });
        Ok(index)
    }

    /// Add a constraint, validating its shape immediately.
    ///
    /// Two ±1 terms are stored as a difference constraint. A single ±1 term
    /// is folded into the variable's bounds and not stored as a row. Any
    /// other shape is rejected.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) -> Result<()> {
        for &(var, _) in &constraint.terms {
            if var >= self.vars.len() {
                return Err(SolverError::IndexOutOfBounds {
                    index: var,
                    bound: self.vars.len(),
                });
            }
        }
        let simple_bound = match constraint.terms.as_slice() {
            [(var, coef)] if coef.abs() == 1 => Some((*var, *coef)),
            [(a, ca), (b, cb)] if *ca == -*cb && ca.abs() == 1 && a != b => None,
            _ => {
                return Err(SolverError::NotDifference(format!(
                    "{:?} {:?} {}",
                    constraint.terms, constraint.cmp, constraint.rhs
                )))
            }
        };
        match simple_bound {
            Some((var, coef)) => self.fold_bound(var, coef, &constraint),
            None => {
                self.constraints.push(constraint);
                Ok(())
            }
        }
    }

    /// Tighten a variable's bounds from a single-term constraint
    /// `coef * x {cmp} rhs` with `coef` in {+1, -1}.
    fn fold_bound(&mut self, var: usize, coef: i64, constraint: &LinearConstraint) -> Result<()> {
        // Normalize to x {cmp'} rhs' with a +1 coefficient.
        let (cmp, rhs) = if coef == 1 {
            (constraint.cmp, constraint.rhs)
        } else {
            let flipped = match constraint.cmp {
                Comparison::Le => Comparison::Ge,
                Comparison::Ge => Comparison::Le,
                Comparison::Eq => Comparison::Eq,
            };
            (flipped, -constraint.rhs)
        };
        let spec = &mut self.vars[var];
        match cmp {
            Comparison::Ge => spec.lower = spec.lower.max(rhs),
            Comparison::Le => spec.upper = spec.upper.min(rhs),
            Comparison::Eq => {
                spec.lower = spec.lower.max(rhs);
                spec.upper = spec.upper.min(rhs);
            }
        }
        if spec.lower > spec.upper {
            return Err(SolverError::InconsistentBounds {
                index: var,
                lower: spec.lower,
                upper: spec.upper,
            });
        }
        Ok(())
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Variable specification by index.
    pub fn var(&self, index: usize) -> &ModelVar {
        &self.vars[index]
    }

    /// All variable specifications.
    pub fn vars(&self) -> &[ModelVar] {
        &self.vars
    }

    /// The stored difference constraints.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Evaluate the objective for given variable values.
    pub fn evaluate_objective(&self, values: &[i64]) -> i64 {
        self.vars
            .iter()
            .zip(values)
            .map(|(spec, &value)| spec.objective * value)
            .sum()
    }

    /// Check bounds and all constraints for given variable values.
    pub fn is_feasible(&self, values: &[i64]) -> bool {
        if values.len() != self.vars.len() {
            return false;
        }
        let bounds_ok = self
            .vars
            .iter()
            .zip(values)
            .all(|(spec, &value)| spec.lower <= value && value <= spec.upper);
        bounds_ok && self.constraints.iter().all(|c| c.is_satisfied(values))
    }

    /// The solution values, if the model has been solved to optimality.
    pub fn solution(&self) -> Option<&[i64]> {
        if self.solution.is_empty() && self.objective_value.is_none() {
            None
        } else {
            Some(&self.solution)
        }
    }

    /// The objective value at the solution, if solved.
    pub fn objective_value(&self) -> Option<i64> {
        self.objective_value
    }

    pub(crate) fn set_solution(&mut self, values: Vec<i64>, objective: i64) {
        self.solution = values;
        self.objective_value = Some(objective);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_var_and_bounds() {
        let mut model = LinearModel::new();
        let x = model.add_var(-2, 5, 3, "x").unwrap();
        assert_eq!(model.var(x).lower, -2);
        assert_eq!(model.var(x).upper, 5);
        assert_eq!(model.var(x).objective, 3);
        assert!(model.add_var(4, 2, 0, "bad").is_err());
    }

    #[test]
    fn test_difference_constraint_accepted() {
        let mut model = LinearModel::new();
        let a = model.add_var(0, 10, 0, "a").unwrap();
        let b = model.add_var(0, 10, 0, "b").unwrap();
        model
            .add_constraint(LinearConstraint::ge(vec![(a, 1), (b, -1)], 2))
            .unwrap();
        model
            .add_constraint(LinearConstraint::le(vec![(a, -1), (b, 1)], 7))
            .unwrap();
        assert_eq!(model.constraints().len(), 2);
    }

    #[test]
    fn test_simple_bound_folds() {
        let mut model = LinearModel::new();
        let x = model.add_var(0, 10, 0, "x").unwrap();
        // x >= 3
        model
            .add_constraint(LinearConstraint::ge(vec![(x, 1)], 3))
            .unwrap();
        assert_eq!(model.var(x).lower, 3);
        // -x >= -7, i.e. x <= 7
        model
            .add_constraint(LinearConstraint::ge(vec![(x, -1)], -7))
            .unwrap();
        assert_eq!(model.var(x).upper, 7);
        assert!(model.constraints().is_empty());
        // x == 100 contradicts the bounds
        assert!(model
            .add_constraint(LinearConstraint::eq(vec![(x, 1)], 100))
            .is_err());
    }

    #[test]
    fn test_non_difference_rejected() {
        let mut model = LinearModel::new();
        let a = model.add_var(0, 10, 0, "a").unwrap();
        let b = model.add_var(0, 10, 0, "b").unwrap();
        // coefficient 2 is outside the class
        assert!(matches!(
            model.add_constraint(LinearConstraint::ge(vec![(a, 2), (b, -2)], 0)),
            Err(SolverError::NotDifference(_))
        ));
        // both coefficients positive
        assert!(model
            .add_constraint(LinearConstraint::ge(vec![(a, 1), (b, 1)], 0))
            .is_err());
        // three terms
        let c = model.add_var(0, 10, 0, "c").unwrap();
        assert!(model
            .add_constraint(LinearConstraint::ge(vec![(a, 1), (b, -1), (c, 1)], 0))
            .is_err());
        // unknown variable index
        assert!(matches!(
            model.add_constraint(LinearConstraint::ge(vec![(17, 1)], 0)),
            Err(SolverError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_evaluation_and_feasibility() {
        let mut model = LinearModel::new();
        let a = model.add_var(0, 10, 1, "a").unwrap();
        let b = model.add_var(0, 10, 2, "b").unwrap();
        model
            .add_constraint(LinearConstraint::ge(vec![(a, 1), (b, -1)], 3))
            .unwrap();
        assert_eq!(model.evaluate_objective(&[4, 1]), 6);
        assert!(model.is_feasible(&[4, 1]));
        assert!(!model.is_feasible(&[1, 4]));
        assert!(!model.is_feasible(&[11, 1]));
        assert!(!model.is_feasible(&[4]));
    }

    #[test]
    fn test_solution_slots() {
        let mut model = LinearModel::new();
        model.add_var(0, 5, 1, "x").unwrap();
        assert!(model.solution().is_none());
        assert!(model.objective_value().is_none());
        model.set_solution(vec![2], 2);
        assert_eq!(model.solution(), Some(&[2][..]));
        assert_eq!(model.objective_value(), Some(2));
    }
}
