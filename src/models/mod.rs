//! Problem models consumed by the solver cores.
//!
//! Each core takes exactly one of these as its immutable input: the
//! LP-coloring core consumes a [`ConflictGraph`], the dual min-cost-flow
//! core consumes a [`LinearModel`].

pub mod conflict_graph;
pub mod linear_model;

pub use conflict_graph::{ColorCount, ConflictGraph};
pub use linear_model::{Comparison, LinearConstraint, LinearModel, ModelVar};
