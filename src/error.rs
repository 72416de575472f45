//! Error types for the layoutsolvers library.

use thiserror::Error;

/// Errors that can occur in the layoutsolvers library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Conflict edge with a zero or negative weight.
    #[error("edge ({source_vertex}, {target_vertex}) has non-positive weight {weight}")]
    NonPositiveWeight {
        source_vertex: usize,
        target_vertex: usize,
        weight: i64,
    },

    /// Conflict edge whose endpoints coincide.
    #[error("edge endpoints must be distinct, got a self-loop on vertex {vertex}")]
    SelfLoop { vertex: usize },

    /// Vertex or variable index outside the model.
    #[error("index out of bounds: {index} >= {bound}")]
    IndexOutOfBounds { index: usize, bound: usize },

    /// Precolor outside the active palette.
    #[error("precolor {color} out of range for a {palette}-color palette")]
    InvalidPrecolor { color: usize, palette: usize },

    /// Constraint that is not a difference constraint or a simple bound.
    #[error("constraint is outside the difference-constraint class: {0}")]
    NotDifference(String),

    /// Variable declared with lower bound above its upper bound.
    #[error("variable {index} has inconsistent bounds [{lower}, {upper}]")]
    InconsistentBounds {
        index: usize,
        lower: i64,
        upper: i64,
    },

    /// The coloring relaxation reported infeasible. The relaxation is
    /// feasible by construction, so this indicates an internal bug.
    #[error("coloring relaxation reported infeasible")]
    RelaxationInfeasible,

    /// Failure inside the LP backend.
    #[error("LP backend failure: {0}")]
    Backend(String),
}

/// Result type alias for layoutsolvers operations.
pub type Result<T> = std::result::Result<T, SolverError>;
