use std::fmt;

use lpmodel_solver::ConstraintOp;

use crate::expr::LinearExpr;
use crate::ids::RestrictionId;

/// A comparison moved into `terms <op> rhs` form.
///
/// Built from `lhs <op> rhs` as `(lhs - rhs)` without its constant on the
/// left, and the negated constant of that difference on the right.
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictionExpr {
    expression: LinearExpr,
    op: ConstraintOp,
    rhs: f64,
}

impl RestrictionExpr {
    pub fn new(lhs: impl Into<LinearExpr>, op: ConstraintOp, rhs: impl Into<LinearExpr>) -> Self {
        let difference = lhs.into() - rhs.into();
        Self {
            expression: difference.without_constant(),
            op,
            rhs: -difference.constant(),
        }
    }

    /// Constant-free left-hand side
    pub fn expression(&self) -> &LinearExpr {
        &self.expression
    }

    pub fn op(&self) -> ConstraintOp {
        self.op
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }
}

/// `lhs <op> rhs` for any mix of expressions, handles and scalars
pub fn compare(
    lhs: impl Into<LinearExpr>,
    op: ConstraintOp,
    rhs: impl Into<LinearExpr>,
) -> RestrictionExpr {
    RestrictionExpr::new(lhs, op, rhs)
}

/// Values bound to a restriction after a solve
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RestrictionResult {
    /// Row activity of the left-hand side
    pub value: f64,
    /// Shadow price
    pub dual_value: f64,
    /// Right-hand side range over which the shadow price holds
    #[cfg_attr(feature = "serde", serde(with = "lpmodel_solver::serde_f64"))]
    pub dual_from: f64,
    #[cfg_attr(feature = "serde", serde(with = "lpmodel_solver::serde_f64"))]
    pub dual_till: f64,
}

pub(crate) type ResultCallback = Box<dyn FnMut(f64)>;
pub(crate) type DualsCallback = Box<dyn FnMut(f64, f64, f64)>;

/// A registered restriction: one row of the model.
pub struct Restriction {
    id: RestrictionId,
    name: String,
    expression: LinearExpr,
    op: ConstraintOp,
    rhs: f64,
    result: RestrictionResult,
    on_result: Option<ResultCallback>,
    on_duals: Option<DualsCallback>,
}

impl Restriction {
    pub(crate) fn new(
        id: RestrictionId,
        name: String,
        candidate: RestrictionExpr,
        on_result: Option<ResultCallback>,
        on_duals: Option<DualsCallback>,
    ) -> Self {
        Self {
            id,
            name,
            expression: candidate.expression,
            op: candidate.op,
            rhs: candidate.rhs,
            result: RestrictionResult::default(),
            on_result,
            on_duals,
        }
    }

    pub fn id(&self) -> RestrictionId {
        self.id
    }

    pub fn index(&self) -> usize {
        self.id.index()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &LinearExpr {
        &self.expression
    }

    pub fn op(&self) -> ConstraintOp {
        self.op
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    pub fn result(&self) -> RestrictionResult {
        self.result
    }

    /// Store solve results and fire the callbacks
    pub(crate) fn set_result(&mut self, result: RestrictionResult) {
        self.result = result;
        if let Some(callback) = self.on_result.as_mut() {
            callback(result.value);
        }
        if let Some(callback) = self.on_duals.as_mut() {
            callback(result.dual_value, result.dual_from, result.dual_till);
        }
    }
}

impl fmt::Debug for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Restriction")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("expression", &self.expression)
            .field("op", &self.op)
            .field("rhs", &self.rhs)
            .field("result", &self.result)
            .field("on_result", &self.on_result.is_some())
            .field("on_duals", &self.on_duals.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ModelId, VarId};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_constants_move_to_the_right() {
        let model = ModelId::next();
        let (x, y) = (VarId::new(model, 0), VarId::new(model, 1));

        // x + 2y + 10 <= 90 is x + 2y <= 80
        let folded = (LinearExpr::from(x) + LinearExpr::from(y) * 2.0 + 10.0).leq(90.0);
        let plain = (LinearExpr::from(x) + LinearExpr::from(y) * 2.0).leq(80.0);
        assert_eq!(folded, plain);
        assert_eq!(folded.expression().constant(), 0.0);
    }

    #[test]
    fn test_expression_on_both_sides() {
        let model = ModelId::next();
        let (x, y) = (VarId::new(model, 0), VarId::new(model, 1));

        // 3x + 4 >= y - 2 is 3x - y >= -6
        let candidate = compare(
            LinearExpr::from(x) * 3.0 + 4.0,
            ConstraintOp::Ge,
            LinearExpr::from(y) - 2.0,
        );
        assert_eq!(candidate.op(), ConstraintOp::Ge);
        assert_eq!(candidate.rhs(), -6.0);
        assert_eq!(candidate.expression().coefficient(x), 3.0);
        assert_eq!(candidate.expression().coefficient(y), -1.0);
    }

    #[test]
    fn test_set_result_fires_callbacks() {
        let model = ModelId::next();
        let seen = Rc::new(Cell::new((0.0, 0.0, 0.0, 0.0)));
        let on_result = {
            let seen = Rc::clone(&seen);
            Box::new(move |value: f64| {
                let (_, d, f, t) = seen.get();
                seen.set((value, d, f, t));
            }) as ResultCallback
        };
        let on_duals = {
            let seen = Rc::clone(&seen);
            Box::new(move |dual: f64, from: f64, till: f64| {
                let (v, _, _, _) = seen.get();
                seen.set((v, dual, from, till));
            }) as DualsCallback
        };

        let candidate = LinearExpr::from(VarId::new(model, 0)).leq(5.0);
        let mut restriction = Restriction::new(
            RestrictionId::new(model, 0),
            "cap".to_string(),
            candidate,
            Some(on_result),
            Some(on_duals),
        );
        restriction.set_result(RestrictionResult {
            value: 5.0,
            dual_value: 2.0,
            dual_from: 3.0,
            dual_till: 8.0,
        });

        assert_eq!(seen.get(), (5.0, 2.0, 3.0, 8.0));
        assert_eq!(restriction.result().dual_value, 2.0);
    }
}
