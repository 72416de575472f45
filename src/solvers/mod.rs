//! Solver cores.
//!
//! Two independent cores that share no state: the LP-relaxation coloring
//! solver (feature-gated on an LP backend) and the dual min-cost-flow
//! solver for difference-constraint LPs.

pub mod dual_mcf;

#[cfg(feature = "lp-solver")]
pub mod lp;
#[cfg(feature = "lp-solver")]
pub mod lp_coloring;

pub use dual_mcf::{DualMcf, DualSolution, FlowResult, FlowStatus, McfEngine, SolveStatus};

#[cfg(feature = "lp-solver")]
pub use lp::{LpModel, LpStatus};
#[cfg(feature = "lp-solver")]
pub use lp_coloring::{ColoringStats, LpColoring};
