//! Symbolic modeling layer for linear and mixed-integer programs.
//!
//! Declare variables on a [`Model`], combine them into [`LinearExpr`]s,
//! register restrictions and an [`Objective`], then [`Model::run`]. After a
//! successful run every variable and restriction carries its primal value,
//! dual value and sensitivity range, and the callbacks registered with them
//! have fired once.
//!
//! ```
//! use lpmodel_core::{Model, Objective, SolutionStatus};
//!
//! let mut model = Model::new();
//! let x = model.add_variable((), "x").unwrap();
//! let y = model.add_variable((), "y").unwrap();
//! model.add_restriction((x + 2.0 * y).leq(80.0), "r1").unwrap();
//! model.add_restriction((3.0 * x + 2.0 * y).leq(120.0), "r2").unwrap();
//! model.set_objective(Objective::maximize(20000.0 * x + 15000.0 * y)).unwrap();
//!
//! let result = model.run().unwrap();
//! assert_eq!(result.status, SolutionStatus::Optimal);
//! assert!((result.objective_value - 850000.0).abs() < 1e-6);
//! ```

mod expr;
mod ids;
mod model;
mod objective;
mod restriction;
mod variable;

pub use expr::{LinearExpr, Term};
pub use ids::{ModelId, RestrictionId, VarId};
pub use model::{Model, ModelError, ModelState, RestrictionBuilder, SolutionResult, VariableBuilder};
pub use objective::{Objective, Sense};
pub use restriction::{Restriction, RestrictionExpr, RestrictionResult, compare};
pub use variable::{Var, Variable, VariableInfo, VariableResult};

pub use lpmodel_solver::{ConstraintOp, Scaling, Solution, SolutionStatus, Solver};
