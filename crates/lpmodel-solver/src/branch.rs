//! Depth-first branch-and-bound over integral columns.

use tracing::{debug, trace};

use crate::error::SolverError;
use crate::problem::LpProblem;
use crate::simplex::Solver;
use crate::solution::{Solution, SolutionStatus};

/// Bounds of every column at one node of the search tree
#[derive(Debug, Clone)]
struct Node {
    lower: Vec<f64>,
    upper: Vec<f64>,
    depth: usize,
}

impl Node {
    fn root(problem: &LpProblem) -> Self {
        Self {
            lower: problem.variables.iter().map(|v| v.lower).collect(),
            upper: problem.variables.iter().map(|v| v.upper).collect(),
            depth: 0,
        }
    }

    fn with_upper(&self, column: usize, upper: f64) -> Self {
        let mut child = self.clone();
        child.upper[column] = upper;
        child.depth += 1;
        child
    }

    fn with_lower(&self, column: usize, lower: f64) -> Self {
        let mut child = self.clone();
        child.lower[column] = lower;
        child.depth += 1;
        child
    }

    fn apply(&self, problem: &LpProblem) -> LpProblem {
        let mut relaxed = problem.clone();
        for (j, var) in relaxed.variables.iter_mut().enumerate() {
            var.lower = self.lower[j];
            var.upper = self.upper[j];
        }
        relaxed
    }
}

impl Solver {
    pub(crate) fn branch_and_bound(&self, problem: &LpProblem) -> Solution {
        let minimize = problem.objective.minimize;
        let improves = |candidate: f64, incumbent: f64| {
            let gap = 1e-9 * (1.0 + incumbent.abs());
            if minimize {
                candidate < incumbent - gap
            } else {
                candidate > incumbent + gap
            }
        };

        let mut stack = vec![Node::root(problem)];
        let mut incumbent: Option<Solution> = None;
        let mut limit: Option<SolverError> = None;
        let mut iterations = 0;
        let mut nodes = 0;

        while let Some(node) = stack.pop() {
            if nodes >= self.max_nodes {
                limit = Some(SolverError::NodeLimit(self.max_nodes));
                break;
            }
            nodes += 1;

            let solution = self.solve_relaxation(&node.apply(problem));
            iterations += solution.iterations;

            match solution.status {
                SolutionStatus::Optimal => {}
                SolutionStatus::Suboptimal => {
                    limit.get_or_insert(SolverError::IterationLimit(solution.iterations));
                }
                SolutionStatus::Infeasible => {
                    trace!(
                        component = "solver",
                        operation = "branch",
                        depth = node.depth as u64,
                        "Node infeasible"
                    );
                    continue;
                }
                // A child region is a subset of the root, so this only happens at the root
                SolutionStatus::Unbounded => {
                    let mut unbounded = Solution::unbounded().with_iterations(iterations);
                    unbounded.nodes = nodes;
                    return unbounded;
                }
                SolutionStatus::Error => {
                    let mut failed = solution;
                    failed.iterations = iterations;
                    failed.nodes = nodes;
                    return failed;
                }
            }

            if let Some(best) = &incumbent {
                if !improves(solution.objective_value, best.objective_value) {
                    trace!(
                        component = "solver",
                        operation = "branch",
                        depth = node.depth as u64,
                        "Node pruned by bound"
                    );
                    continue;
                }
            }

            match self.branching_column(problem, &solution.values) {
                None => {
                    debug!(
                        component = "solver",
                        operation = "branch",
                        depth = node.depth as u64,
                        objective = solution.objective_value,
                        "New incumbent"
                    );
                    incumbent = Some(solution);
                }
                Some((column, value)) => {
                    let down = node.with_upper(column, value.floor());
                    let up = node.with_lower(column, value.ceil());
                    // Explore the side nearer to the fractional value first
                    if value - value.floor() < 0.5 {
                        stack.push(up);
                        stack.push(down);
                    } else {
                        stack.push(down);
                        stack.push(up);
                    }
                }
            }
        }

        let status = if limit.is_some() {
            SolutionStatus::Suboptimal
        } else {
            SolutionStatus::Optimal
        };
        let mut result = match incumbent {
            Some(mut best) => {
                best.status = status;
                best.error = limit;
                best
            }
            None => match limit {
                Some(err) => Solution::error(err),
                None => Solution::infeasible(),
            },
        };
        result.iterations = iterations;
        result.nodes = nodes;
        result
    }

    /// First integral column whose relaxed value is fractional
    fn branching_column(&self, problem: &LpProblem, values: &[f64]) -> Option<(usize, f64)> {
        problem
            .variables
            .iter()
            .zip(values)
            .enumerate()
            .find(|(_, (var, value))| {
                var.integer && (*value - value.round()).abs() > self.integrality_tolerance
            })
            .map(|(j, (_, &value))| (j, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{ConstraintOp, VariableDef};

    /// Maximize 1.5x + 2y where only one of x, y may be switched on
    fn either_or_problem() -> LpProblem {
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        let bx = problem.add_variable(VariableDef::binary("bx"));
        let by = problem.add_variable(VariableDef::binary("by"));
        problem.set_objective(vec![(0, 1.5), (1, 2.0)], false);
        problem.add_constraint("x_max", vec![(0, 1.0)], ConstraintOp::Le, 300.0);
        problem.add_constraint("y_max", vec![(1, 1.0)], ConstraintOp::Le, 300.0);
        problem.add_constraint("x_on", vec![(0, 1.0), (bx, -1000.0)], ConstraintOp::Le, 0.0);
        problem.add_constraint("y_on", vec![(1, 1.0), (by, -1000.0)], ConstraintOp::Le, 0.0);
        problem.add_constraint("one", vec![(bx, 1.0), (by, 1.0)], ConstraintOp::Eq, 1.0);
        problem
    }

    #[test]
    fn test_binary_choice_is_exact() {
        let solution = Solver::new().solve(&either_or_problem());

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values[2], 0.0);
        assert_eq!(solution.values[3], 1.0);
        assert!(solution.values[0].abs() < 1e-9, "x = {}", solution.values[0]);
        assert!((solution.values[1] - 300.0).abs() < 1e-6, "y = {}", solution.values[1]);
        assert!((solution.objective_value - 600.0).abs() < 1e-6);
        assert!(solution.nodes > 1);
    }

    #[test]
    fn test_general_integer_knapsack() {
        // Maximize 5a + 4b with 6a + 4b <= 24, a + 2b <= 6, a, b integral
        // LP optimum (3, 1.5) is fractional; integral optimum is (4, 0) with 20
        let mut problem = LpProblem::new(Vec::new());
        problem.add_variable(VariableDef {
            name: "a".to_string(),
            lower: 0.0,
            upper: f64::INFINITY,
            integer: true,
        });
        problem.add_variable(VariableDef {
            name: "b".to_string(),
            lower: 0.0,
            upper: f64::INFINITY,
            integer: true,
        });
        problem.set_objective(vec![(0, 5.0), (1, 4.0)], false);
        problem.add_constraint("wood", vec![(0, 6.0), (1, 4.0)], ConstraintOp::Le, 24.0);
        problem.add_constraint("labor", vec![(0, 1.0), (1, 2.0)], ConstraintOp::Le, 6.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values, vec![4.0, 0.0]);
        assert_eq!(solution.objective_value, 20.0);
    }

    #[test]
    fn test_infeasible_integer_problem() {
        // 2b = 1 has no integral solution
        let mut problem = LpProblem::new(Vec::new());
        problem.add_variable(VariableDef::binary("b"));
        problem.set_objective(vec![(0, 1.0)], true);
        problem.add_constraint("half", vec![(0, 2.0)], ConstraintOp::Eq, 1.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert_eq!(solution.nodes, 3);
    }

    #[test]
    fn test_node_limit() {
        let solution = Solver::new().with_max_nodes(1).solve(&either_or_problem());

        // The root relaxation is fractional, so no incumbent exists yet
        assert_eq!(solution.status, SolutionStatus::Error);
        assert_eq!(solution.error, Some(SolverError::NodeLimit(1)));
    }

    #[test]
    fn test_node_limit_keeps_incumbent() {
        // Root is fractional in bx, and whichever child comes first is integral
        let solution = Solver::new().with_max_nodes(2).solve(&either_or_problem());

        assert_eq!(solution.status, SolutionStatus::Suboptimal);
        assert_eq!(solution.error, Some(SolverError::NodeLimit(2)));
        assert_eq!(solution.nodes, 2);
        let (bx, by) = (solution.values[2], solution.values[3]);
        assert!(bx == 0.0 || bx == 1.0, "bx = {}", bx);
        assert_eq!(bx + by, 1.0);
        let expected = 1.5 * solution.values[0] + 2.0 * solution.values[1];
        let objective = solution.objective_value;
        assert!((objective - expected).abs() < 1e-6, "obj = {}", objective);
        assert!(objective >= 450.0 - 1e-6, "obj = {}", objective);
        assert!(!solution.analysis.shadow_prices.is_empty());
    }
}
