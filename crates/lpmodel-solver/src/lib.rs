//! Dense simplex engine with branch-and-bound and post-optimal analysis.
//!
//! The engine works on an index-based [`LpProblem`]: columns with bounds and
//! an integrality flag, a sparse objective and sparse rows. [`Solver::solve`]
//! never fails outright; the outcome is reported through
//! [`Solution::status`], and for optimal LPs the [`Analysis`] carries duals,
//! reduced costs and sensitivity ranges.

mod branch;
mod error;
mod problem;
mod scaling;
#[cfg(feature = "serde")]
pub mod serde_f64;
mod simplex;
mod solution;

pub use error::SolverError;
pub use problem::{Constraint, ConstraintOp, LpProblem, Objective, VariableDef};
pub use scaling::Scaling;
pub use simplex::Solver;
pub use solution::{Analysis, ReducedCost, SensitivityRange, ShadowPrice, Solution, SolutionStatus};
