//! Row and column scaling of the constraint matrix.
//!
//! Factors are rounded to powers of two so scaling and unscaling are exact
//! in floating point. Integral columns keep a factor of one so branching
//! still sees integral bounds.

use tracing::debug;

use crate::problem::LpProblem;
use crate::solution::Solution;

/// Sweeps of alternating row/column geometric scaling
const GEOMETRIC_PASSES: usize = 4;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scaling {
    /// Solve the problem as stated
    #[default]
    None,
    /// Divide rows and columns by the geometric mean of their extreme magnitudes
    Geometric,
    /// Divide rows, then columns, by their largest magnitude
    Equilibrate,
}

#[derive(Debug, Clone)]
pub(crate) struct ScaleFactors {
    rows: Vec<f64>,
    cols: Vec<f64>,
}

impl ScaleFactors {
    /// Factors for `problem`, or `None` when scaling would change nothing
    pub(crate) fn compute(problem: &LpProblem, mode: Scaling) -> Option<Self> {
        let n = problem.num_variables();
        let matrix: Vec<Vec<f64>> = problem.constraints.iter().map(|c| c.dense(n)).collect();
        let scalable: Vec<bool> = problem.variables.iter().map(|v| !v.integer).collect();

        let mut rows = vec![1.0; matrix.len()];
        let mut cols = vec![1.0; n];

        match mode {
            Scaling::None => return None,
            Scaling::Geometric => {
                for _ in 0..GEOMETRIC_PASSES {
                    for (i, row) in matrix.iter().enumerate() {
                        let scaled = row.iter().zip(&cols).map(|(a, s)| a * s);
                        if let Some((min, max)) = extent(scaled) {
                            rows[i] = 1.0 / (min * max).sqrt();
                        }
                    }
                    for j in (0..n).filter(|&j| scalable[j]) {
                        let scaled = matrix.iter().zip(&rows).map(|(row, r)| row[j] * r);
                        if let Some((min, max)) = extent(scaled) {
                            cols[j] = 1.0 / (min * max).sqrt();
                        }
                    }
                }
            }
            Scaling::Equilibrate => {
                for (i, row) in matrix.iter().enumerate() {
                    if let Some((_, max)) = extent(row.iter().copied()) {
                        rows[i] = 1.0 / max;
                    }
                }
                for j in (0..n).filter(|&j| scalable[j]) {
                    let scaled = matrix.iter().zip(&rows).map(|(row, r)| row[j] * r);
                    if let Some((_, max)) = extent(scaled) {
                        cols[j] = 1.0 / max;
                    }
                }
            }
        }

        rows.iter_mut().chain(cols.iter_mut()).for_each(|f| *f = power_of_two(*f));
        if rows.iter().chain(&cols).all(|&f| f == 1.0) {
            return None;
        }

        debug!(
            component = "solver",
            operation = "scale",
            mode = ?mode,
            rows = rows.len() as u64,
            columns = cols.len() as u64,
            "Scaled problem"
        );
        Some(Self { rows, cols })
    }

    /// Scaled copy of the problem, with `x' = x / col` and rows multiplied by `row`
    pub(crate) fn apply(&self, problem: &LpProblem) -> LpProblem {
        let mut scaled = problem.clone();

        for (var, &s) in scaled.variables.iter_mut().zip(&self.cols) {
            var.lower /= s;
            var.upper /= s;
        }
        for (j, coef) in scaled.objective.coefficients.iter_mut() {
            *coef *= self.cols[*j];
        }
        for (constraint, &r) in scaled.constraints.iter_mut().zip(&self.rows) {
            for (j, coef) in constraint.coefficients.iter_mut() {
                *coef *= r * self.cols[*j];
            }
            constraint.rhs *= r;
        }

        scaled
    }

    /// Map a solution of the scaled problem back to the original one
    pub(crate) fn unscale(&self, mut solution: Solution) -> Solution {
        let analysis = &mut solution.analysis;

        for (value, &s) in solution.values.iter_mut().zip(&self.cols) {
            *value *= s;
        }
        for (activity, &r) in solution.activities.iter_mut().zip(&self.rows) {
            *activity /= r;
        }
        for (price, &r) in analysis.shadow_prices.iter_mut().zip(&self.rows) {
            price.value *= r;
        }
        for (range, &r) in analysis.rhs_sensitivity.iter_mut().zip(&self.rows) {
            range.current /= r;
            range.lower_bound /= r;
            range.upper_bound /= r;
        }
        for (rc, &s) in analysis.reduced_costs.iter_mut().zip(&self.cols) {
            rc.value *= s;
            rc.reduced_cost /= s;
        }
        for (range, &s) in analysis.objective_sensitivity.iter_mut().zip(&self.cols) {
            range.current /= s;
            range.lower_bound /= s;
            range.upper_bound /= s;
        }
        for (range, &s) in analysis.value_sensitivity.iter_mut().zip(&self.cols) {
            range.current *= s;
            range.lower_bound *= s;
            range.upper_bound *= s;
        }

        solution
    }
}

/// Smallest and largest nonzero magnitude
fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .map(f64::abs)
        .filter(|&a| a > 0.0)
        .fold(None, |acc, a| match acc {
            None => Some((a, a)),
            Some((min, max)) => Some((min.min(a), max.max(a))),
        })
}

fn power_of_two(factor: f64) -> f64 {
    if !factor.is_finite() || factor <= 0.0 {
        return 1.0;
    }
    factor.log2().round().exp2()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{ConstraintOp, VariableDef};
    use crate::simplex::Solver;
    use crate::solution::SolutionStatus;

    fn badly_scaled() -> LpProblem {
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![(0, 20000.0), (1, 15000.0)], false);
        problem.add_constraint("r1", vec![(0, 1000.0), (1, 2000.0)], ConstraintOp::Le, 80000.0);
        problem.add_constraint("r2", vec![(0, 0.003), (1, 0.002)], ConstraintOp::Le, 0.12);
        problem
    }

    #[test]
    fn test_factors_are_powers_of_two() {
        let factors = ScaleFactors::compute(&badly_scaled(), Scaling::Geometric).unwrap();
        for f in factors.rows.iter().chain(&factors.cols) {
            assert_eq!(f.log2().fract(), 0.0, "factor {} is not a power of two", f);
        }
        assert!(ScaleFactors::compute(&badly_scaled(), Scaling::None).is_none());
    }

    #[test]
    fn test_scaled_solution_matches_unscaled() {
        let problem = badly_scaled();
        let plain = Solver::new().solve(&problem);

        for mode in [Scaling::Geometric, Scaling::Equilibrate] {
            let scaled = Solver::new().with_scaling(mode).solve(&problem);
            assert_eq!(scaled.status, SolutionStatus::Optimal);
            for (a, b) in plain.values.iter().zip(&scaled.values) {
                assert!((a - b).abs() < 1e-6, "{:?}: {} vs {}", mode, a, b);
            }
            for i in 0..2 {
                let (a, b) = (plain.dual(i).unwrap(), scaled.dual(i).unwrap());
                let tol = 1e-6 * a.abs().max(1.0);
                assert!((a - b).abs() < tol, "{:?} dual {}: {} vs {}", mode, i, a, b);
                let a = &plain.analysis.rhs_sensitivity[i];
                let b = &scaled.analysis.rhs_sensitivity[i];
                let (lo, hi) = (a.lower_bound, a.upper_bound);
                assert!((lo - b.lower_bound).abs() < 1e-6 * lo.abs().max(1.0));
                assert!((hi - b.upper_bound).abs() < 1e-6 * hi.abs().max(1.0));
            }
            assert!((plain.objective_value - scaled.objective_value).abs() < 1e-6);
        }
    }

    #[test]
    fn test_integer_columns_are_not_scaled() {
        let mut problem = badly_scaled();
        let b = problem.add_variable(VariableDef::binary("b"));
        problem.add_constraint("link", vec![(0, 1.0), (b, -5000.0)], ConstraintOp::Le, 0.0);

        let factors = ScaleFactors::compute(&problem, Scaling::Geometric).unwrap();
        assert_eq!(factors.cols[b], 1.0);
    }
}
