use std::fmt;

use lpmodel_solver::{LpProblem, Solution, SolutionStatus, Solver, VariableDef};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::expr::LinearExpr;
use crate::ids::{ModelId, RestrictionId, VarId};
use crate::objective::{Objective, Sense};
use crate::restriction::{
    DualsCallback, Restriction, RestrictionExpr, RestrictionResult, ResultCallback,
};
use crate::variable::{Bindable, Callbacks, Var, Variable, VariableInfo, VariableResult};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error(
        "Variable {} of model {} does not belong to this model",
        .0.index(),
        .0.model().inner()
    )]
    ForeignVariable(VarId),
    #[error(
        "Restriction {} of model {} does not belong to this model",
        .0.index(),
        .0.model().inner()
    )]
    ForeignRestriction(RestrictionId),
    #[error("Non-finite value in {0}")]
    NonFiniteCoefficient(String),
    #[error("Variable {0} holds a payload of a different type")]
    TypeMismatch(String),
    #[error("Model has no objective function")]
    MissingObjective,
    #[error("Model has already been run")]
    AlreadyRun,
}

/// Lifecycle of a [`Model`]. There is no way back to `Building`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Accepting variables, restrictions and the objective
    Building,
    /// Solved; results are bound
    Solved,
    /// Run finished without a usable solution; results keep their defaults
    Failed,
}

/// Outcome of [`Model::run`]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolutionResult {
    pub status: SolutionStatus,
    /// Optimized objective including its constant, 0.0 without a solution
    pub objective_value: f64,
}

/// Registry of variables and restrictions plus the objective.
///
/// Indices are handed out in registration order. A model runs once; build a
/// new one for a modified problem.
pub struct Model {
    id: ModelId,
    variables: Vec<Box<dyn Bindable>>,
    restrictions: Vec<Restriction>,
    objective: Option<Objective>,
    state: ModelState,
    solution: Option<Solution>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    pub fn new() -> Self {
        Self {
            id: ModelId::next(),
            variables: Vec::new(),
            restrictions: Vec::new(),
            objective: None,
            state: ModelState::Building,
            solution: None,
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Register a continuous variable in `[0, +inf)`
    pub fn add_variable<T: 'static>(
        &mut self,
        payload: T,
        name: impl Into<String>,
    ) -> Result<Var<T>, ModelError> {
        self.new_variable(payload).name(name).add()
    }

    /// Register a 0/1 variable
    pub fn add_binary_variable<T: 'static>(
        &mut self,
        payload: T,
        name: impl Into<String>,
    ) -> Result<Var<T>, ModelError> {
        self.new_variable(payload).name(name).binary().add()
    }

    /// One continuous variable per item, indexed in iteration order
    pub fn add_variables<T: 'static>(
        &mut self,
        items: impl IntoIterator<Item = T>,
        mut name_fn: impl FnMut(&T) -> String,
    ) -> Result<Vec<Var<T>>, ModelError> {
        items
            .into_iter()
            .map(|item| {
                let name = name_fn(&item);
                self.add_variable(item, name)
            })
            .collect()
    }

    /// Start registering a variable with callbacks
    pub fn new_variable<T: 'static>(&mut self, payload: T) -> VariableBuilder<'_, T> {
        VariableBuilder {
            model: self,
            payload,
            name: None,
            is_binary: false,
            callbacks: Callbacks::default(),
        }
    }

    pub fn add_restriction(
        &mut self,
        candidate: RestrictionExpr,
        name: impl Into<String>,
    ) -> Result<RestrictionId, ModelError> {
        self.new_restriction(candidate, name).add()
    }

    /// Start registering a restriction with callbacks
    pub fn new_restriction(
        &mut self,
        candidate: RestrictionExpr,
        name: impl Into<String>,
    ) -> RestrictionBuilder<'_> {
        RestrictionBuilder {
            model: self,
            candidate,
            name: name.into(),
            on_result: None,
            on_duals: None,
        }
    }

    /// Set the objective, replacing any earlier one
    pub fn set_objective(&mut self, objective: Objective) -> Result<(), ModelError> {
        self.ensure_building()?;
        self.check_expression(objective.expression(), objective.name().unwrap_or("objective"))?;
        if self.objective.is_some() {
            debug!(component = "model", operation = "set_objective", "Replacing objective");
        }
        self.objective = Some(objective);
        Ok(())
    }

    /// Unit-coefficient sum of the handles, all of which must belong to this model
    pub fn sum<T>(&self, vars: &[Var<T>]) -> Result<LinearExpr, ModelError> {
        for var in vars {
            self.entry(var.id())?;
        }
        Ok(vars.iter().sum())
    }

    /// Unit-coefficient sum of the handles whose payload satisfies `predicate`
    pub fn sum_where<T: 'static>(
        &self,
        vars: &[Var<T>],
        mut predicate: impl FnMut(&T) -> bool,
    ) -> Result<LinearExpr, ModelError> {
        let mut sum = LinearExpr::new();
        for var in vars {
            if predicate(self.variable(var)?.payload()) {
                sum += *var;
            }
        }
        Ok(sum)
    }

    pub fn variable<T: 'static>(&self, var: &Var<T>) -> Result<&Variable<T>, ModelError> {
        let entry = self.entry(var.id())?;
        entry
            .as_any()
            .downcast_ref::<Variable<T>>()
            .ok_or_else(|| ModelError::TypeMismatch(entry.info().name.clone()))
    }

    /// Every variable in index order, without payloads
    pub fn variables(&self) -> impl Iterator<Item = &VariableInfo> + '_ {
        self.variables.iter().map(|v| v.info())
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn restriction(&self, id: RestrictionId) -> Result<&Restriction, ModelError> {
        if id.model() != self.id {
            return Err(ModelError::ForeignRestriction(id));
        }
        self.restrictions.get(id.index()).ok_or(ModelError::ForeignRestriction(id))
    }

    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrictions
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Raw engine output of the last run
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Flat form handed to the engine: one column per variable, one row per restriction
    pub fn to_problem(&self) -> Result<LpProblem, ModelError> {
        let objective = self.objective.as_ref().ok_or(ModelError::MissingObjective)?;

        let mut problem = LpProblem::new(Vec::new());
        for variable in &self.variables {
            let info = variable.info();
            let def = if info.is_binary {
                VariableDef::binary(info.name.clone())
            } else {
                VariableDef::continuous(info.name.clone())
            };
            problem.add_variable(def);
        }
        problem.set_objective(sparse(objective.expression()), objective.sense() == Sense::Minimize);
        for restriction in &self.restrictions {
            problem.add_constraint(
                restriction.name(),
                sparse(restriction.expression()),
                restriction.op(),
                restriction.rhs(),
            );
        }
        Ok(problem)
    }

    /// Solve with the default engine settings
    pub fn run(&mut self) -> Result<SolutionResult, ModelError> {
        self.run_with(&Solver::new())
    }

    /// Solve once and bind results to every variable and restriction.
    ///
    /// Non-optimal outcomes are reported through the returned status; only
    /// registration problems are errors.
    pub fn run_with(&mut self, solver: &Solver) -> Result<SolutionResult, ModelError> {
        self.ensure_building()?;
        let problem = self.to_problem()?;

        debug!(
            component = "model",
            operation = "run",
            variables = self.variables.len() as u64,
            restrictions = self.restrictions.len() as u64,
            scaling = ?solver.scaling(),
            "Running model"
        );

        let solution = solver.solve(&problem);
        let status = solution.status;

        let objective_value = if status.has_solution() {
            self.bind(&solution);
            self.state = ModelState::Solved;
            let constant = self.objective.as_ref().map_or(0.0, |o| o.expression().constant());
            solution.objective_value + constant
        } else {
            self.state = ModelState::Failed;
            match &solution.error {
                Some(err) => warn!(
                    component = "model",
                    operation = "run",
                    status = status.as_str(),
                    error = %err,
                    "Engine failed"
                ),
                None => debug!(
                    component = "model",
                    operation = "run",
                    status = status.as_str(),
                    "No solution"
                ),
            }
            0.0
        };
        self.solution = Some(solution);

        debug!(
            component = "model",
            operation = "run",
            status = status.as_str(),
            objective = objective_value,
            "Model run finished"
        );
        Ok(SolutionResult { status, objective_value })
    }

    fn bind(&mut self, solution: &Solution) {
        let analysis = &solution.analysis;

        for (j, variable) in self.variables.iter_mut().enumerate() {
            let cost_range = analysis.objective_sensitivity.get(j);
            let value_range = analysis.value_sensitivity.get(j);
            variable.set_result(VariableResult {
                value: solution.values.get(j).copied().unwrap_or(0.0),
                from: cost_range.map_or(0.0, |r| r.lower_bound),
                till: cost_range.map_or(0.0, |r| r.upper_bound),
                dual_value: solution.reduced_cost(j).unwrap_or(0.0),
                dual_from: value_range.map_or(0.0, |r| r.lower_bound),
                dual_till: value_range.map_or(0.0, |r| r.upper_bound),
            });
        }

        for (i, restriction) in self.restrictions.iter_mut().enumerate() {
            let rhs_range = analysis.rhs_sensitivity.get(i);
            restriction.set_result(RestrictionResult {
                value: solution.activities.get(i).copied().unwrap_or(0.0),
                dual_value: solution.dual(i).unwrap_or(0.0),
                dual_from: rhs_range.map_or(0.0, |r| r.lower_bound),
                dual_till: rhs_range.map_or(0.0, |r| r.upper_bound),
            });
        }

        trace!(
            component = "model",
            operation = "bind",
            variables = self.variables.len() as u64,
            restrictions = self.restrictions.len() as u64,
            "Bound results"
        );
    }

    fn ensure_building(&self) -> Result<(), ModelError> {
        match self.state {
            ModelState::Building => Ok(()),
            _ => Err(ModelError::AlreadyRun),
        }
    }

    fn entry(&self, id: VarId) -> Result<&dyn Bindable, ModelError> {
        if id.model() != self.id {
            return Err(ModelError::ForeignVariable(id));
        }
        self.variables
            .get(id.index())
            .map(|v| &**v)
            .ok_or(ModelError::ForeignVariable(id))
    }

    fn check_expression(&self, expr: &LinearExpr, owner: &str) -> Result<(), ModelError> {
        for term in expr.terms() {
            let entry = self.entry(term.var)?;
            if !term.coefficient.is_finite() {
                return Err(ModelError::NonFiniteCoefficient(format!(
                    "{} coefficient of {}",
                    owner,
                    entry.info().name
                )));
            }
        }
        if !expr.constant().is_finite() {
            return Err(ModelError::NonFiniteCoefficient(format!("constant of {}", owner)));
        }
        Ok(())
    }

    fn register_variable<T: 'static>(
        &mut self,
        payload: T,
        name: Option<String>,
        is_binary: bool,
        callbacks: Callbacks<T>,
    ) -> Result<Var<T>, ModelError> {
        self.ensure_building()?;
        let id = VarId::new(self.id, self.variables.len());
        let name = name.unwrap_or_else(|| format!("x{}", id.index()));

        trace!(
            component = "model",
            operation = "add_variable",
            index = id.index() as u64,
            name = %name,
            binary = is_binary,
            "Registered variable"
        );

        let info = VariableInfo {
            id,
            name,
            is_binary,
            result: VariableResult::default(),
        };
        self.variables.push(Box::new(Variable::new(info, payload, callbacks)));
        Ok(Var::new(id))
    }

    fn register_restriction(
        &mut self,
        candidate: RestrictionExpr,
        name: String,
        on_result: Option<ResultCallback>,
        on_duals: Option<DualsCallback>,
    ) -> Result<RestrictionId, ModelError> {
        self.ensure_building()?;
        self.check_expression(candidate.expression(), &name)?;
        if !candidate.rhs().is_finite() {
            return Err(ModelError::NonFiniteCoefficient(format!("right-hand side of {}", name)));
        }

        let id = RestrictionId::new(self.id, self.restrictions.len());
        trace!(
            component = "model",
            operation = "add_restriction",
            index = id.index() as u64,
            name = %name,
            op = candidate.op().symbol(),
            rhs = candidate.rhs(),
            "Registered restriction"
        );
        self.restrictions.push(Restriction::new(id, name, candidate, on_result, on_duals));
        Ok(id)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.id)
            .field("variables", &self.variables().collect::<Vec<_>>())
            .field("restrictions", &self.restrictions)
            .field("objective", &self.objective)
            .field("state", &self.state)
            .finish()
    }
}

fn sparse(expr: &LinearExpr) -> Vec<(usize, f64)> {
    expr.terms().map(|t| (t.var.index(), t.coefficient)).collect()
}

/// Builder returned by [`Model::new_variable`]
#[must_use = "call add() to register the variable"]
pub struct VariableBuilder<'m, T> {
    model: &'m mut Model,
    payload: T,
    name: Option<String>,
    is_binary: bool,
    callbacks: Callbacks<T>,
}

impl<T: 'static> VariableBuilder<'_, T> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Derive the name from the payload
    pub fn name_from(mut self, name_fn: impl FnOnce(&T) -> String) -> Self {
        self.name = Some(name_fn(&self.payload));
        self
    }

    pub fn binary(mut self) -> Self {
        self.is_binary = true;
        self
    }

    /// Called with the primal value
    pub fn on_result(mut self, callback: impl FnMut(&mut T, f64) + 'static) -> Self {
        self.callbacks.on_result = Some(Box::new(callback));
        self
    }

    /// Called with the objective coefficient range `(from, till)`
    pub fn on_range(mut self, callback: impl FnMut(&mut T, f64, f64) + 'static) -> Self {
        self.callbacks.on_range = Some(Box::new(callback));
        self
    }

    /// Called with the reduced cost and its value range
    pub fn on_dual(mut self, callback: impl FnMut(&mut T, f64, f64, f64) + 'static) -> Self {
        self.callbacks.on_dual = Some(Box::new(callback));
        self
    }

    pub fn add(self) -> Result<Var<T>, ModelError> {
        self.model
            .register_variable(self.payload, self.name, self.is_binary, self.callbacks)
    }
}

/// Builder returned by [`Model::new_restriction`]
#[must_use = "call add() to register the restriction"]
pub struct RestrictionBuilder<'m> {
    model: &'m mut Model,
    candidate: RestrictionExpr,
    name: String,
    on_result: Option<ResultCallback>,
    on_duals: Option<DualsCallback>,
}

impl RestrictionBuilder<'_> {
    /// Called with the row activity
    pub fn on_result(mut self, callback: impl FnMut(f64) + 'static) -> Self {
        self.on_result = Some(Box::new(callback));
        self
    }

    /// Called with the shadow price and its right-hand side range
    pub fn on_duals(mut self, callback: impl FnMut(f64, f64, f64) + 'static) -> Self {
        self.on_duals = Some(Box::new(callback));
        self
    }

    pub fn add(self) -> Result<RestrictionId, ModelError> {
        self.model
            .register_restriction(self.candidate, self.name, self.on_result, self.on_duals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpmodel_solver::ConstraintOp;

    #[test]
    fn test_indices_follow_registration_order() {
        let mut model = Model::new();
        let a = model.add_variable("a", "a").unwrap();
        let b = model.add_binary_variable(7u32, "b").unwrap();
        let rest = model.add_variables(vec!["c", "d"], |s| s.to_uppercase()).unwrap();

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(rest.iter().map(|v| v.index()).collect::<Vec<_>>(), vec![2, 3]);

        let names: Vec<&str> = model.variables().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "C", "D"]);

        let first = model.add_restriction(a.leq(1.0), "first").unwrap();
        let second = model.add_restriction((a + b).geq(0.0), "second").unwrap();
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(model.restriction(second).unwrap().name(), "second");
    }

    #[test]
    fn test_builder_names_and_defaults() {
        let mut model = Model::new();
        let unnamed = model.new_variable(()).add().unwrap();
        let from_payload = model
            .new_variable(String::from("steel"))
            .name_from(|s| format!("use_{}", s))
            .add()
            .unwrap();

        assert_eq!(model.variable(&unnamed).unwrap().name(), "x0");
        assert_eq!(model.variable(&from_payload).unwrap().name(), "use_steel");
        assert_eq!(model.variable(&from_payload).unwrap().payload(), "steel");
    }

    #[test]
    fn test_foreign_variable_is_rejected() {
        let mut first = Model::new();
        let mut second = Model::new();
        let x = first.add_variable((), "x").unwrap();
        let y = second.add_variable((), "y").unwrap();

        let err = second.add_restriction((x + y).leq(4.0), "mixed").unwrap_err();
        assert_eq!(err, ModelError::ForeignVariable(x.id()));

        let err = second.set_objective(Objective::maximize(x)).unwrap_err();
        assert_eq!(err, ModelError::ForeignVariable(x.id()));

        assert!(matches!(second.variable(&x), Err(ModelError::ForeignVariable(_))));
        let id = first.add_restriction(x.leq(1.0), "cap").unwrap();
        assert_eq!(second.restriction(id).unwrap_err(), ModelError::ForeignRestriction(id));
    }

    #[test]
    fn test_non_finite_coefficient_is_rejected() {
        let mut model = Model::new();
        let x = model.add_variable((), "x").unwrap();

        let err = model.add_restriction((x * f64::NAN).leq(1.0), "bad").unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteCoefficient(_)));
        let err = model.add_restriction(x.leq(f64::INFINITY), "open").unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteCoefficient(_)));
        assert!(model.restrictions().is_empty());
    }

    #[test]
    fn test_missing_objective() {
        let mut model = Model::new();
        let x = model.add_variable((), "x").unwrap();
        model.add_restriction(x.leq(1.0), "cap").unwrap();

        assert_eq!(model.run().unwrap_err(), ModelError::MissingObjective);
        assert_eq!(model.state(), ModelState::Building);
    }

    #[test]
    fn test_set_objective_replaces() {
        let mut model = Model::new();
        let x = model.add_variable((), "x").unwrap();
        model.set_objective(Objective::maximize(x)).unwrap();
        model.set_objective(Objective::minimize(2.0 * x).named("cost")).unwrap();

        let objective = model.objective().unwrap();
        assert_eq!(objective.sense(), Sense::Minimize);
        assert_eq!(objective.name(), Some("cost"));
        assert_eq!(objective.expression().coefficient(x.id()), 2.0);
    }

    #[test]
    fn test_to_problem_serializes_rows_and_bounds() {
        let mut model = Model::new();
        let x = model.add_variable((), "x").unwrap();
        let b = model.add_binary_variable((), "b").unwrap();
        model.add_restriction((x - 10.0 * b + 3.0).leq(5.0), "link").unwrap();
        model.set_objective(Objective::maximize(x + b)).unwrap();

        let problem = model.to_problem().unwrap();
        assert_eq!(problem.variables[0].upper, f64::INFINITY);
        assert!(!problem.variables[0].integer);
        assert_eq!(problem.variables[1].upper, 1.0);
        assert!(problem.variables[1].integer);
        assert!(!problem.objective.minimize);

        let row = &problem.constraints[0];
        assert_eq!(row.name, "link");
        assert_eq!(row.op, ConstraintOp::Le);
        assert_eq!(row.rhs, 2.0);
        assert_eq!(row.dense(2), vec![1.0, -10.0]);
    }

    #[test]
    fn test_sum_where_filters_by_payload() {
        let mut model = Model::new();
        let vars = model.add_variables(1..=4, |n| format!("n{}", n)).unwrap();

        let all = model.sum(&vars).unwrap();
        let manual = vars[0] + vars[1] + vars[2] + vars[3];
        assert_eq!(all, manual);

        let even = model.sum_where(&vars, |n| n % 2 == 0).unwrap();
        assert_eq!(even, vars[1] + vars[3]);

        let other = Model::new();
        assert_eq!(other.sum(&vars), Err(ModelError::ForeignVariable(vars[0].id())));
        assert!(matches!(other.sum_where(&vars, |_| true), Err(ModelError::ForeignVariable(_))));
    }

    #[test]
    fn test_iteration_limit_binds_values_without_duals() {
        let mut model = Model::new();
        let x = model.add_variable((), "x").unwrap();
        let y = model.add_variable((), "y").unwrap();
        model.add_restriction((x + y).leq(4.0), "sum").unwrap();
        model.add_restriction(x.leq(3.0), "x_max").unwrap();
        model.add_restriction(y.leq(3.0), "y_max").unwrap();
        model.set_objective(Objective::maximize(3.0 * x + 2.0 * y)).unwrap();

        // One pivot brings x in at 3 and stops short of the optimum at (3, 1)
        let result = model.run_with(&Solver::new().with_max_iterations(1)).unwrap();
        assert_eq!(result.status, SolutionStatus::Suboptimal);
        assert_eq!(model.state(), ModelState::Solved);
        assert!((result.objective_value - 9.0).abs() < 1e-9, "obj = {}", result.objective_value);

        let x = model.variable(&x).unwrap().result();
        assert!((x.value - 3.0).abs() < 1e-9, "x = {}", x.value);
        assert_eq!((x.from, x.till, x.dual_value), (0.0, 0.0, 0.0));
        let sum = model.restrictions()[0].result();
        assert!((sum.value - 3.0).abs() < 1e-9, "sum = {}", sum.value);
        assert_eq!((sum.dual_value, sum.dual_from, sum.dual_till), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_model_runs_once() {
        let mut model = Model::new();
        let x = model.add_variable((), "x").unwrap();
        model.add_restriction(x.leq(4.0), "cap").unwrap();
        model.set_objective(Objective::maximize(3.0 * x + 1.0)).unwrap();

        let result = model.run().unwrap();
        assert_eq!(result.status, SolutionStatus::Optimal);
        assert!((result.objective_value - 13.0).abs() < 1e-9, "obj = {}", result.objective_value);
        assert_eq!(model.state(), ModelState::Solved);

        assert_eq!(model.run().unwrap_err(), ModelError::AlreadyRun);
        assert_eq!(model.add_variable((), "late").unwrap_err(), ModelError::AlreadyRun);
        assert_eq!(model.add_restriction(x.geq(1.0), "late").unwrap_err(), ModelError::AlreadyRun);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_results_serialize() {
        let mut model = Model::new();
        let x = model.add_variable((), "x").unwrap();
        model.add_restriction(x.leq(2.0), "cap").unwrap();
        model.set_objective(Objective::maximize(x)).unwrap();
        let result = model.run().unwrap();

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("Optimal"));
        let info = model.variables().next().unwrap();
        let json = serde_json::to_value(info).unwrap();
        assert_eq!(json["name"], "x");
        assert_eq!(json["result"]["value"], 2.0);
        // Basic column: the value range is open on both ends
        assert_eq!(json["result"]["dual_from"], "-inf");
        assert_eq!(json["result"]["till"], "inf");

        let back: VariableInfo = serde_json::from_value(json).unwrap();
        assert_eq!(&back, info);
        let cap = model.restrictions()[0].result();
        let json = serde_json::to_string(&cap).unwrap();
        let back: RestrictionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cap);
    }
}
