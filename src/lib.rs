//! # layoutsolvers
//!
//! Solver cores for physical-design layout optimization.
//!
//! Two independent cores, each a pure computation over an in-memory model:
//!
//! - **LP-relaxation coloring** ([`solvers::LpColoring`]): colors a
//!   conflict graph with three or four colors for multiple-patterning
//!   layout decomposition. Colors are two-bit codes over continuous LP
//!   variables; the relaxation is tightened iteratively with objective
//!   perturbations and odd-cycle cuts, stubborn half-integer pairs are
//!   fixed by binding-constraint analysis, and a local greedy pass repairs
//!   residual conflicts.
//! - **Dual min-cost flow** ([`solvers::DualMcf`]): solves LPs made of
//!   difference constraints (`x_i - x_j >= b` plus bounds), the shape
//!   produced by legalization, compaction and scheduling, by dualizing to
//!   a min-cost-flow problem whose optimal node potentials are the primal
//!   solution. Four interchangeable flow engines are provided.
//!
//! ## Example
//!
//! ```
//! use layoutsolvers::models::{ColorCount, ConflictGraph};
//! use layoutsolvers::solvers::LpColoring;
//!
//! // A triangle of conflicts needs all three colors.
//! let graph =
//!     ConflictGraph::with_edges(3, vec![(0, 1, 1), (1, 2, 1), (0, 2, 1)]).unwrap();
//! let colors = LpColoring::new(ColorCount::Three).solve(&graph).unwrap();
//! assert!(graph.is_proper(&colors));
//! ```

pub mod error;
pub mod models;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, SolverError};
    pub use crate::models::{
        ColorCount, Comparison, ConflictGraph, LinearConstraint, LinearModel,
    };
    pub use crate::solvers::dual_mcf::{
        CostScalingMethod, CycleCancelingMethod, DualMcf, DualSolution, McfEngine, PivotRule,
        SolveStatus,
    };
    #[cfg(feature = "lp-solver")]
    pub use crate::solvers::{ColoringStats, LpColoring};
}

// Re-export commonly used items at crate root
pub use error::{Result, SolverError};
