use tracing::{debug, trace, warn};

use crate::error::SolverError;
use crate::problem::{ConstraintOp, LpProblem};
use crate::scaling::{ScaleFactors, Scaling};
use crate::solution::{
    Analysis, ReducedCost, SensitivityRange, ShadowPrice, Solution, SolutionStatus,
};

/// Consecutive degenerate pivots tolerated before switching to Bland's rule
const DEGENERATE_STREAK_LIMIT: usize = 50;

/// Largest artificial value still accepted as feasible after phase 1
const FEASIBILITY_TOLERANCE: f64 = 1e-7;

/// Simplex solver for linear and mixed-integer programming problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots per LP before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    /// Coefficient scaling applied before solving
    scaling: Scaling,
    /// Maximum branch-and-bound nodes
    pub(crate) max_nodes: usize,
    /// Distance from an integer still treated as integral
    pub(crate) integrality_tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
            scaling: Scaling::None,
            max_nodes: 10000,
            integrality_tolerance: 1e-6,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_scaling(mut self, scaling: Scaling) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = max;
        self
    }

    pub fn with_integrality_tolerance(mut self, tol: f64) -> Self {
        self.integrality_tolerance = tol;
        self
    }

    pub fn scaling(&self) -> Scaling {
        self.scaling
    }

    /// Solve the problem; the outcome is always reported through the status
    pub fn solve(&self, problem: &LpProblem) -> Solution {
        if let Err(err) = problem.validate() {
            warn!(
                component = "solver",
                operation = "validate",
                status = "error",
                error = %err,
                "Rejected problem"
            );
            return Solution::error(err);
        }

        debug!(
            component = "solver",
            operation = "solve",
            variables = problem.num_variables() as u64,
            constraints = problem.num_constraints() as u64,
            integer = problem.has_integers(),
            scaling = ?self.scaling,
            "Solving problem"
        );

        let solution = match ScaleFactors::compute(problem, self.scaling) {
            Some(factors) => {
                let scaled = factors.apply(problem);
                factors.unscale(self.solve_unscaled(&scaled))
            }
            None => self.solve_unscaled(problem),
        };
        let solution = self.settle(problem, solution);

        debug!(
            component = "solver",
            operation = "solve",
            status = solution.status.as_str(),
            objective = solution.objective_value,
            iterations = solution.iterations as u64,
            nodes = solution.nodes as u64,
            "Solve finished"
        );
        solution
    }

    fn solve_unscaled(&self, problem: &LpProblem) -> Solution {
        if problem.has_integers() {
            self.branch_and_bound(problem)
        } else {
            self.solve_relaxation(problem)
        }
    }

    /// Solve the LP relaxation (integrality ignored) using the two-phase simplex method
    pub(crate) fn solve_relaxation(&self, problem: &LpProblem) -> Solution {
        let mut tableau = Tableau::build(problem);
        let mut iterations = 0;

        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau, &mut iterations) {
                SimplexResult::Optimal => {}
                SimplexResult::Unbounded => {
                    return Solution::infeasible().with_iterations(iterations);
                }
                SimplexResult::IterationLimit => {
                    warn!(
                        component = "solver",
                        operation = "phase1",
                        iterations = iterations as u64,
                        "Iteration limit reached"
                    );
                    return Solution::error(SolverError::IterationLimit(self.max_iterations))
                        .with_iterations(iterations);
                }
            }
            if !tableau.artificials_cleared() {
                trace!(
                    component = "solver",
                    operation = "phase1",
                    status = "infeasible",
                    "Artificials remain positive"
                );
                return Solution::infeasible().with_iterations(iterations);
            }
            self.drive_out_artificials(&mut tableau);
            tableau.restore_objective(self.tolerance);
        }

        // Phase 2: Optimize
        match self.phase2(&mut tableau, &mut iterations) {
            SimplexResult::Optimal => self
                .extract_solution(&tableau, problem, SolutionStatus::Optimal)
                .with_iterations(iterations),
            SimplexResult::Unbounded => Solution::unbounded().with_iterations(iterations),
            SimplexResult::IterationLimit => {
                warn!(
                    component = "solver",
                    operation = "phase2",
                    iterations = iterations as u64,
                    "Iteration limit reached"
                );
                let mut solution = self
                    .extract_solution(&tableau, problem, SolutionStatus::Suboptimal)
                    .with_iterations(iterations);
                // Duals of a basis that is not optimal mean nothing
                solution.analysis = Analysis::default();
                solution.error = Some(SolverError::IterationLimit(self.max_iterations));
                solution
            }
        }
    }

    fn phase1(&self, tableau: &mut Tableau, iterations: &mut usize) -> SimplexResult {
        // Auxiliary objective: maximize -sum(artificials)
        let obj_row = tableau.obj_row();
        let n_cols = tableau.n_cols();
        let art_start = tableau.art_start();

        let orig_obj = std::mem::replace(&mut tableau.data[obj_row], vec![0.0; n_cols]);
        tableau.saved_objective = Some(orig_obj);

        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[obj_row][j] = -1.0;
        }

        // Make objective row consistent with basic artificial variables
        for i in 0..obj_row {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] += tableau.data[i][j];
                }
            }
        }

        let result = self.run_simplex(tableau, art_start + tableau.n_artificial, iterations);
        trace!(
            component = "solver",
            operation = "phase1",
            iterations = *iterations as u64,
            "Phase 1 finished"
        );
        result
    }

    fn phase2(&self, tableau: &mut Tableau, iterations: &mut usize) -> SimplexResult {
        // Exclude artificial variable columns from pivoting
        let result = self.run_simplex(tableau, tableau.art_start(), iterations);
        trace!(
            component = "solver",
            operation = "phase2",
            iterations = *iterations as u64,
            "Phase 2 finished"
        );
        result
    }

    fn run_simplex(
        &self,
        tableau: &mut Tableau,
        column_limit: usize,
        iterations: &mut usize,
    ) -> SimplexResult {
        let rhs_col = tableau.rhs_col();
        let mut degenerate_streak = 0;

        loop {
            if *iterations >= self.max_iterations {
                return SimplexResult::IterationLimit;
            }
            let bland = degenerate_streak >= DEGENERATE_STREAK_LIMIT;
            let Some(pivot_col) = self.find_pivot_column(tableau, column_limit, bland) else {
                return SimplexResult::Optimal;
            };
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col, bland) else {
                return SimplexResult::Unbounded;
            };

            if tableau.data[pivot_row][rhs_col] <= self.tolerance {
                degenerate_streak += 1;
            } else {
                degenerate_streak = 0;
            }

            tableau.pivot(pivot_row, pivot_col);
            *iterations += 1;
        }
    }

    /// Most positive reduced cost (Dantzig), or the first positive one (Bland)
    fn find_pivot_column(
        &self,
        tableau: &Tableau,
        column_limit: usize,
        bland: bool,
    ) -> Option<usize> {
        let obj = &tableau.data[tableau.obj_row()];

        if bland {
            return (0..column_limit).find(|&j| obj[j] > self.tolerance);
        }

        let mut max_val = self.tolerance;
        let mut max_col = None;
        for (j, &value) in obj.iter().enumerate().take(column_limit) {
            if value > max_val {
                max_val = value;
                max_col = Some(j);
            }
        }
        max_col
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize, bland: bool) -> Option<usize> {
        let rhs_col = tableau.rhs_col();

        let mut min_ratio = f64::INFINITY;
        let mut min_row: Option<usize> = None;

        for i in 0..tableau.obj_row() {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.data[i][rhs_col].max(0.0) / val;
            let better = match min_row {
                None => true,
                Some(best) if bland => {
                    ratio < min_ratio - self.tolerance
                        || (ratio <= min_ratio + self.tolerance
                            && tableau.basic_vars[i] < tableau.basic_vars[best])
                }
                Some(_) => ratio < min_ratio,
            };
            if better {
                min_ratio = ratio;
                min_row = Some(i);
            }
        }

        min_row
    }

    /// Pivot zero-level artificials out of the basis wherever a real column can replace them
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let art_start = tableau.art_start();
        for i in 0..tableau.obj_row() {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            let replacement = (0..art_start).find(|&j| {
                tableau.data[i][j].abs() > self.tolerance && !tableau.basic_vars.contains(&j)
            });
            // No replacement means the row is redundant; its artificial stays basic at zero
            if let Some(col) = replacement {
                tableau.pivot(i, col);
            }
        }
    }

    fn extract_solution(
        &self,
        tableau: &Tableau,
        problem: &LpProblem,
        status: SolutionStatus,
    ) -> Solution {
        let n_vars = problem.num_variables();
        let rhs_col = tableau.rhs_col();

        // Undo the lower-bound shift
        let mut values = tableau.lower.clone();
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < n_vars {
                values[basic] += tableau.data[i][rhs_col];
            }
        }

        let objective_value = problem.objective_value(&values);
        let activities = problem.constraints.iter().map(|c| c.activity(&values)).collect();
        let analysis = self.analyze(tableau, problem, &values);

        Solution {
            status,
            values,
            objective_value,
            activities,
            analysis,
            iterations: 0,
            nodes: 1,
            error: None,
        }
    }

    fn analyze(&self, tableau: &Tableau, problem: &LpProblem, values: &[f64]) -> Analysis {
        let n_vars = problem.num_variables();
        let obj_row = tableau.obj_row();
        let rhs_col = tableau.rhs_col();
        let art_start = tableau.art_start();
        let tol = self.tolerance;
        // Internal tableau maximizes; user-facing numbers follow the stated direction
        let sense = if problem.objective.minimize { -1.0 } else { 1.0 };

        let mut basic_row = vec![None; art_start];
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < art_start {
                basic_row[basic] = Some(i);
            }
        }

        let mut shadow_prices = Vec::with_capacity(problem.num_constraints());
        let mut rhs_sensitivity = Vec::with_capacity(problem.num_constraints());
        for (i, constraint) in problem.constraints.iter().enumerate() {
            shadow_prices.push(ShadowPrice {
                constraint: constraint.name.clone(),
                value: self.clean(sense * tableau.row_dual(i)),
            });
            let (lo, hi) = tableau.rhs_range(i, tol);
            rhs_sensitivity.push(SensitivityRange {
                name: constraint.name.clone(),
                current: constraint.rhs,
                lower_bound: constraint.rhs + lo,
                upper_bound: constraint.rhs + hi,
            });
        }

        let mut reduced_costs = Vec::with_capacity(n_vars);
        let mut objective_sensitivity = Vec::with_capacity(n_vars);
        let mut value_sensitivity = Vec::with_capacity(n_vars);
        let obj = &tableau.data[obj_row];

        for (j, var) in problem.variables.iter().enumerate() {
            let row = basic_row[j];

            // A basic column sitting on its upper bound takes the bound row's dual
            let internal = match (row, tableau.bound_rows[j]) {
                (None, _) => obj[j],
                (Some(_), Some(bound_row)) => tableau.row_dual(bound_row),
                (Some(_), None) => 0.0,
            };
            reduced_costs.push(ReducedCost {
                variable: var.name.clone(),
                value: values[j],
                reduced_cost: self.clean(sense * internal),
                is_basic: row.is_some(),
            });

            // Cost ranging in internal (maximize) terms
            let (lo, hi) = match row {
                None => (f64::NEG_INFINITY, -obj[j]),
                Some(p) => {
                    let mut lo = f64::NEG_INFINITY;
                    let mut hi = f64::INFINITY;
                    for k in 0..art_start {
                        if k == j || basic_row[k].is_some() {
                            continue;
                        }
                        let a = tableau.data[p][k];
                        if a > tol {
                            lo = lo.max(obj[k] / a);
                        } else if a < -tol {
                            hi = hi.min(obj[k] / a);
                        }
                    }
                    (lo, hi)
                }
            };
            let cost = tableau.costs[j];
            let (from, till) = if problem.objective.minimize {
                (-(cost + hi), -(cost + lo))
            } else {
                (cost + lo, cost + hi)
            };
            objective_sensitivity.push(SensitivityRange {
                name: var.name.clone(),
                current: sense * cost,
                lower_bound: from,
                upper_bound: till,
            });

            // How far a nonbasic column can be pushed before a basic one leaves
            let (lo, hi) = match row {
                Some(_) => (f64::NEG_INFINITY, f64::INFINITY),
                None => {
                    let mut hi = f64::INFINITY;
                    for q in 0..obj_row {
                        let a = tableau.data[q][j];
                        if a > tol {
                            hi = hi.min(tableau.data[q][rhs_col].max(0.0) / a);
                        }
                    }
                    (0.0, hi)
                }
            };
            value_sensitivity.push(SensitivityRange {
                name: var.name.clone(),
                current: values[j],
                lower_bound: var.lower + lo,
                upper_bound: var.lower + hi,
            });
        }

        let binding_constraints = shadow_prices
            .iter()
            .filter(|sp| sp.value.abs() > tol)
            .map(|sp| sp.constraint.clone())
            .collect();

        Analysis {
            shadow_prices,
            reduced_costs,
            binding_constraints,
            objective_sensitivity,
            rhs_sensitivity,
            value_sensitivity,
        }
    }

    /// Snap numeric noise and recompute derived quantities against the original problem
    fn settle(&self, problem: &LpProblem, mut solution: Solution) -> Solution {
        if !solution.status.has_solution() {
            return solution;
        }

        for (j, value) in solution.values.iter_mut().enumerate() {
            if problem.variables[j].integer {
                *value = value.round();
            }
            *value = self.clean(*value);
        }
        solution.objective_value = problem.objective_value(&solution.values);
        solution.activities = problem
            .constraints
            .iter()
            .map(|c| self.clean(c.activity(&solution.values)))
            .collect();

        let costs = problem.objective_row();
        for (j, rc) in solution.analysis.reduced_costs.iter_mut().enumerate() {
            rc.value = solution.values[j];
        }
        for (j, range) in solution.analysis.value_sensitivity.iter_mut().enumerate() {
            range.current = solution.values[j];
        }
        for (j, range) in solution.analysis.objective_sensitivity.iter_mut().enumerate() {
            range.current = costs[j];
        }
        for (i, range) in solution.analysis.rhs_sensitivity.iter_mut().enumerate() {
            range.current = problem.constraints[i].rhs;
        }
        solution
    }

    fn clean(&self, value: f64) -> f64 {
        if value.abs() <= self.tolerance { 0.0 } else { value }
    }
}

/// Dense simplex tableau
///
/// Rows are the problem's constraints followed by one `<=` row per finite
/// upper bound, then the objective row. Columns are the (lower-bound
/// shifted) variables, slack/surplus columns, artificial columns and the RHS.
/// The objective row holds `c_j - z_j` for the internal maximization and
/// `-z` in the RHS cell.
struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
    /// Column that started out as the unit vector of each row
    markers: Vec<usize>,
    /// Rows multiplied by -1 to make the right-hand side non-negative
    flipped: Vec<bool>,
    /// Internal upper-bound row of each variable
    bound_rows: Vec<Option<usize>>,
    /// Objective coefficients as maximized internally
    costs: Vec<f64>,
    lower: Vec<f64>,
    /// Phase 2 objective row parked while phase 1 runs
    saved_objective: Option<Vec<f64>>,
}

enum SimplexResult {
    Optimal,
    Unbounded,
    IterationLimit,
}

impl Tableau {
    fn build(problem: &LpProblem) -> Self {
        let n_vars = problem.num_variables();
        let lower: Vec<f64> = problem.variables.iter().map(|v| v.lower).collect();

        let mut rows: Vec<(Vec<f64>, ConstraintOp, f64)> = Vec::new();
        for c in &problem.constraints {
            let coefficients = c.dense(n_vars);
            let shift: f64 = coefficients.iter().zip(&lower).map(|(a, l)| a * l).sum();
            rows.push((coefficients, c.op, c.rhs - shift));
        }

        let mut bound_rows = vec![None; n_vars];
        for (j, v) in problem.variables.iter().enumerate() {
            if v.upper.is_finite() {
                let mut coefficients = vec![0.0; n_vars];
                coefficients[j] = 1.0;
                bound_rows[j] = Some(rows.len());
                rows.push((coefficients, ConstraintOp::Le, v.upper - v.lower));
            }
        }

        // RHS must be non-negative; `>= 0` rows also flip so they need no artificial
        let mut flipped = Vec::with_capacity(rows.len());
        for (coefficients, op, rhs) in rows.iter_mut() {
            let flip = *rhs < 0.0 || (*rhs == 0.0 && *op == ConstraintOp::Ge);
            if flip {
                coefficients.iter_mut().for_each(|a| *a = -*a);
                *rhs = -*rhs;
                *op = op.flipped();
            }
            flipped.push(flip);
        }

        let n_rows = rows.len();
        let n_slack = rows.iter().filter(|r| r.1 != ConstraintOp::Eq).count();
        let n_artificial = rows.iter().filter(|r| r.1 != ConstraintOp::Le).count();
        let total_cols = n_vars + n_slack + n_artificial + 1; // +1 for RHS

        let mut data = vec![vec![0.0; total_cols]; n_rows + 1]; // +1 for objective
        let mut basic_vars = vec![0; n_rows];
        let mut markers = vec![0; n_rows];

        let mut slack_idx = n_vars;
        let mut artificial_idx = n_vars + n_slack;

        for (i, (coefficients, op, rhs)) in rows.into_iter().enumerate() {
            data[i][..n_vars].copy_from_slice(&coefficients);
            data[i][total_cols - 1] = rhs;

            match op {
                ConstraintOp::Le => {
                    data[i][slack_idx] = 1.0;
                    basic_vars[i] = slack_idx;
                    markers[i] = slack_idx;
                    slack_idx += 1;
                }
                ConstraintOp::Ge => {
                    data[i][slack_idx] = -1.0; // surplus
                    slack_idx += 1;
                    data[i][artificial_idx] = 1.0;
                    basic_vars[i] = artificial_idx;
                    markers[i] = artificial_idx;
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    data[i][artificial_idx] = 1.0;
                    basic_vars[i] = artificial_idx;
                    markers[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        // Simplex maximizes, so minimization negates the coefficients
        let sign = if problem.objective.minimize { -1.0 } else { 1.0 };
        let costs: Vec<f64> = problem.objective_row().into_iter().map(|c| sign * c).collect();
        data[n_rows][..n_vars].copy_from_slice(&costs);

        Self {
            data,
            basic_vars,
            n_vars,
            n_slack,
            n_artificial,
            markers,
            flipped,
            bound_rows,
            costs,
            lower,
            saved_objective: None,
        }
    }

    fn obj_row(&self) -> usize {
        self.data.len() - 1
    }

    fn n_cols(&self) -> usize {
        self.data[0].len()
    }

    fn rhs_col(&self) -> usize {
        self.n_cols() - 1
    }

    fn art_start(&self) -> usize {
        self.n_vars + self.n_slack
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let n_cols = self.n_cols();

        // Update basic variable
        self.basic_vars[row] = col;

        // Scale pivot row
        let pivot_val = self.data[row][col];
        for j in 0..n_cols {
            self.data[row][j] /= pivot_val;
        }

        // Eliminate column in other rows
        let pivot_row = self.data[row].clone();
        for (i, current) in self.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = current[col];
            if factor == 0.0 {
                continue;
            }
            for (value, &p) in current.iter_mut().zip(&pivot_row) {
                *value -= factor * p;
            }
        }
    }

    fn artificials_cleared(&self) -> bool {
        let art_start = self.art_start();
        let rhs_col = self.rhs_col();
        self.basic_vars
            .iter()
            .enumerate()
            .all(|(i, &basic)| {
                basic < art_start || self.data[i][rhs_col].abs() <= FEASIBILITY_TOLERANCE
            })
    }

    /// Put the phase 2 objective back and price out the current basis
    fn restore_objective(&mut self, tolerance: f64) {
        let Some(orig_obj) = self.saved_objective.take() else {
            return;
        };
        let obj_row = self.obj_row();
        let n_cols = self.n_cols();
        self.data[obj_row] = orig_obj;

        for i in 0..obj_row {
            let basic = self.basic_vars[i];
            let ratio = self.data[obj_row][basic];
            if ratio.abs() > tolerance {
                for j in 0..n_cols {
                    self.data[obj_row][j] -= ratio * self.data[i][j];
                }
            }
        }
    }

    /// Dual of row `i` as originally stated, in internal (maximize) terms
    fn row_dual(&self, i: usize) -> f64 {
        let y = -self.data[self.obj_row()][self.markers[i]];
        if self.flipped[i] { -y } else { y }
    }

    /// Shift interval of row `i`'s RHS that keeps the current basis feasible
    fn rhs_range(&self, i: usize, tol: f64) -> (f64, f64) {
        let marker = self.markers[i];
        let rhs_col = self.rhs_col();
        let mut lo = f64::NEG_INFINITY;
        let mut hi = f64::INFINITY;

        for q in 0..self.obj_row() {
            let u = self.data[q][marker];
            let x = self.data[q][rhs_col].max(0.0);
            if u > tol {
                lo = lo.max(-x / u);
            } else if u < -tol {
                hi = hi.min(-x / u);
            }
        }

        if self.flipped[i] { (-hi, -lo) } else { (lo, hi) }
    }
}
