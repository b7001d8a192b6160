use crate::error::SolverError;

/// Represents a linear (or mixed-integer) programming problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Columns, in index order
    pub variables: Vec<VariableDef>,
    /// Objective function coefficients
    pub objective: Objective,
    /// Constraints, in index order
    pub constraints: Vec<Constraint>,
}

/// One column of the problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: String,
    /// Finite lower bound
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f64"))]
    pub lower: f64,
    /// Upper bound, `f64::INFINITY` when unbounded above
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f64"))]
    pub upper: f64,
    /// Restrict the column to integral values
    pub integer: bool,
}

impl VariableDef {
    /// Continuous column in `[0, +inf)`
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower: 0.0,
            upper: f64::INFINITY,
            integer: false,
        }
    }

    /// 0/1 column
    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower: 0.0,
            upper: 1.0,
            integer: true,
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct Objective {
    /// Sparse (column, coefficient) pairs
    pub coefficients: Vec<(usize, f64)>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Sparse (column, coefficient) pairs; repeated columns are summed
    pub coefficients: Vec<(usize, f64)>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        }
    }

    /// Operator that holds after both sides are multiplied by -1
    pub fn flipped(self) -> Self {
        match self {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        }
    }
}

impl Constraint {
    /// Dense copy of the row over `n` columns
    pub fn dense(&self, n: usize) -> Vec<f64> {
        dense_row(&self.coefficients, n)
    }

    /// Row activity for the given column values
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .map(|&(j, coef)| coef * values.get(j).copied().unwrap_or(0.0))
            .sum()
    }
}

pub(crate) fn dense_row(coefficients: &[(usize, f64)], n: usize) -> Vec<f64> {
    let mut row = vec![0.0; n];
    for &(j, coef) in coefficients {
        if j < n {
            row[j] += coef;
        }
    }
    row
}

impl LpProblem {
    /// Problem over continuous, non-negative columns with the given names
    pub fn new(variables: Vec<String>) -> Self {
        Self {
            variables: variables.into_iter().map(VariableDef::continuous).collect(),
            objective: Objective {
                coefficients: Vec::new(),
                minimize: true,
            },
            constraints: Vec::new(),
        }
    }

    /// Append a column and return its index
    pub fn add_variable(&mut self, variable: VariableDef) -> usize {
        self.variables.push(variable);
        self.variables.len() - 1
    }

    pub fn set_objective(&mut self, coefficients: Vec<(usize, f64)>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        coefficients: Vec<(usize, f64)>,
        op: ConstraintOp,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn has_integers(&self) -> bool {
        self.variables.iter().any(|v| v.integer)
    }

    /// Dense objective coefficients
    pub fn objective_row(&self) -> Vec<f64> {
        dense_row(&self.objective.coefficients, self.num_variables())
    }

    /// Objective value for the given column values
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .map(|&(j, coef)| coef * values.get(j).copied().unwrap_or(0.0))
            .sum()
    }

    /// Check that every index is in range and every number is usable
    pub fn validate(&self) -> Result<(), SolverError> {
        let n = self.num_variables();

        for v in &self.variables {
            if !v.lower.is_finite() || v.upper.is_nan() || v.upper == f64::NEG_INFINITY {
                return Err(SolverError::InvalidBound {
                    name: v.name.clone(),
                    lower: v.lower,
                    upper: v.upper,
                });
            }
        }

        check_row("objective", &self.objective.coefficients, n)?;

        for c in &self.constraints {
            check_row(&c.name, &c.coefficients, n)?;
            if !c.rhs.is_finite() {
                return Err(SolverError::NonFiniteValue(format!("right-hand side of {}", c.name)));
            }
        }

        Ok(())
    }
}

fn check_row(owner: &str, coefficients: &[(usize, f64)], n: usize) -> Result<(), SolverError> {
    for &(j, coef) in coefficients {
        if j >= n {
            return Err(SolverError::ColumnOutOfRange {
                owner: owner.to_string(),
                column: j,
                columns: n,
            });
        }
        if !coef.is_finite() {
            return Err(SolverError::NonFiniteValue(format!(
                "{} coefficient of column {}",
                owner, j
            )));
        }
    }
    Ok(())
}
