use crate::error::SolverError;

/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Value of each variable, indexed by column
    pub values: Vec<f64>,
    /// Objective value (NaN when no solution is available)
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f64"))]
    pub objective_value: f64,
    /// Row activity of each constraint, indexed by row
    pub activities: Vec<f64>,
    /// Duals and sensitivity ranges
    pub analysis: Analysis,
    /// Simplex pivots performed, summed over all branch-and-bound nodes
    pub iterations: usize,
    /// Branch-and-bound nodes explored (1 for a pure LP)
    pub nodes: usize,
    /// What went wrong, for `Error` and limit-bound `Suboptimal` results
    pub error: Option<SolverError>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// A feasible solution was found but a limit stopped the search early.
    ///
    /// After a simplex iteration limit the [`Analysis`] is left empty. After
    /// a node limit it belongs to the LP relaxation of the incumbent's node.
    Suboptimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// Solver encountered an error
    Error,
}

impl SolutionStatus {
    /// Whether values, duals and ranges are populated
    pub fn has_solution(self) -> bool {
        matches!(self, SolutionStatus::Optimal | SolutionStatus::Suboptimal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Suboptimal => "suboptimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
            SolutionStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detailed analysis of the optimal solution
///
/// Every vector is indexed like the problem it came from: per constraint for
/// `shadow_prices` and `rhs_sensitivity`, per variable for the rest.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Shadow prices (dual values) for each constraint
    /// Change in objective per unit increase of the right-hand side
    pub shadow_prices: Vec<ShadowPrice>,

    /// Reduced costs for each variable
    /// Change in objective per unit the variable is pushed off its bound
    pub reduced_costs: Vec<ReducedCost>,

    /// Which constraints are binding (nonzero shadow price) at optimum
    pub binding_constraints: Vec<String>,

    /// Ranges for objective coefficients keeping the basis optimal
    pub objective_sensitivity: Vec<SensitivityRange>,

    /// Ranges for constraint RHS values keeping the shadow price valid
    pub rhs_sensitivity: Vec<SensitivityRange>,

    /// Ranges of values a variable can be forced to while its reduced cost holds
    pub value_sensitivity: Vec<SensitivityRange>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowPrice {
    /// Constraint name
    pub constraint: String,
    /// Shadow price value
    pub value: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedCost {
    /// Variable name
    pub variable: String,
    /// Current value in solution
    pub value: f64,
    /// Reduced cost
    pub reduced_cost: f64,
    /// Is this variable in the basis?
    pub is_basic: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityRange {
    /// Variable or constraint name
    pub name: String,
    /// Current value
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f64"))]
    pub current: f64,
    /// Lower bound of range where solution structure stays same
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f64"))]
    pub lower_bound: f64,
    /// Upper bound of range where solution structure stays same
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f64"))]
    pub upper_bound: f64,
}

impl SensitivityRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower_bound && value <= self.upper_bound
    }
}

impl Solution {
    fn without_values(status: SolutionStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value: f64::NAN,
            activities: Vec::new(),
            analysis: Analysis::default(),
            iterations: 0,
            nodes: 0,
            error: None,
        }
    }

    pub fn infeasible() -> Self {
        Self::without_values(SolutionStatus::Infeasible)
    }

    pub fn unbounded() -> Self {
        Self::without_values(SolutionStatus::Unbounded)
    }

    pub fn error(error: SolverError) -> Self {
        Self {
            error: Some(error),
            ..Self::without_values(SolutionStatus::Error)
        }
    }

    pub(crate) fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Shadow price of constraint `row`, if populated
    pub fn dual(&self, row: usize) -> Option<f64> {
        self.analysis.shadow_prices.get(row).map(|sp| sp.value)
    }

    /// Reduced cost of variable `column`, if populated
    pub fn reduced_cost(&self, column: usize) -> Option<f64> {
        self.analysis.reduced_costs.get(column).map(|rc| rc.reduced_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_has_solution() {
        assert!(SolutionStatus::Optimal.has_solution());
        assert!(SolutionStatus::Suboptimal.has_solution());
        assert!(!SolutionStatus::Infeasible.has_solution());
        assert!(!SolutionStatus::Unbounded.has_solution());
        assert!(!SolutionStatus::Error.has_solution());
        assert_eq!(SolutionStatus::Unbounded.to_string(), "unbounded");
    }

    #[test]
    fn test_range_contains_its_ends() {
        let range = SensitivityRange {
            name: "R1".to_string(),
            current: 80.0,
            lower_bound: 40.0,
            upper_bound: f64::INFINITY,
        };
        assert!(range.contains(40.0));
        assert!(range.contains(1e12));
        assert!(!range.contains(39.999));
    }

    #[test]
    fn test_error_solution_carries_cause() {
        let solution = Solution::error(SolverError::IterationLimit(5));
        assert_eq!(solution.status, SolutionStatus::Error);
        assert!(solution.values.is_empty());
        assert!(solution.objective_value.is_nan());
        assert_eq!(solution.error, Some(SolverError::IterationLimit(5)));
        assert_eq!(solution.dual(0), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_solution_serializes() {
        let solution = Solution::error(SolverError::NodeLimit(3));
        let json = serde_json::to_value(&solution).unwrap();
        assert_eq!(json["status"], "Error");
        assert_eq!(json["error"]["NodeLimit"], 3);
        assert_eq!(json["objective_value"], "NaN");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_solution_round_trips_through_json() {
        let mut solution = Solution::infeasible();
        solution.analysis.value_sensitivity.push(SensitivityRange {
            name: "x".to_string(),
            current: 20.0,
            lower_bound: f64::NEG_INFINITY,
            upper_bound: f64::INFINITY,
        });

        let json = serde_json::to_string(&solution).unwrap();
        let back: Solution = serde_json::from_str(&json).unwrap();

        assert_eq!(back.status, SolutionStatus::Infeasible);
        assert!(back.objective_value.is_nan());
        assert_eq!(back.analysis.value_sensitivity, solution.analysis.value_sensitivity);
        let error = Solution::error(SolverError::InvalidBound {
            name: "x".to_string(),
            lower: 1.0,
            upper: f64::NEG_INFINITY,
        });
        let back: Solution = serde_json::from_str(&serde_json::to_string(&error).unwrap()).unwrap();
        assert_eq!(back.error, error.error);
    }
}
