use thiserror::Error;

/// Reasons the engine could not produce a trustworthy solution.
///
/// These never escape [`crate::Solver::solve`] as an `Err`; they ride along in
/// [`crate::Solution::error`] next to a [`crate::SolutionStatus::Error`] (or a
/// `Suboptimal` status when a limit cut the search short).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Column {column} referenced by {owner} does not exist ({columns} columns)")]
    ColumnOutOfRange {
        owner: String,
        column: usize,
        columns: usize,
    },
    #[error("Non-finite value in {0}")]
    NonFiniteValue(String),
    #[error("Invalid bounds for variable {name}: [{lower}, {upper}]")]
    InvalidBound {
        name: String,
        #[cfg_attr(feature = "serde", serde(with = "crate::serde_f64"))]
        lower: f64,
        #[cfg_attr(feature = "serde", serde(with = "crate::serde_f64"))]
        upper: f64,
    },
    #[error("Simplex iteration limit of {0} reached")]
    IterationLimit(usize),
    #[error("Branch-and-bound node limit of {0} reached")]
    NodeLimit(usize),
}
