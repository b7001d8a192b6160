use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Sum;
use std::marker::PhantomData;
use std::ops::{Add, Mul, Neg, Sub};

use lpmodel_solver::ConstraintOp;

use crate::expr::LinearExpr;
use crate::ids::VarId;
use crate::restriction::RestrictionExpr;

/// Typed handle to a variable whose payload is a `T`.
///
/// Handles are `Copy` and take part in the expression algebra directly:
/// `x + 2.0 * y`, `x.leq(10.0)`.
pub struct Var<T> {
    id: VarId,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Var<T> {
    pub(crate) fn new(id: VarId) -> Self {
        Self {
            id,
            _payload: PhantomData,
        }
    }

    pub fn id(&self) -> VarId {
        self.id
    }

    /// Column index in the owning model
    pub fn index(&self) -> usize {
        self.id.index()
    }

    pub fn leq(self, rhs: impl Into<LinearExpr>) -> RestrictionExpr {
        RestrictionExpr::new(self, ConstraintOp::Le, rhs)
    }

    pub fn geq(self, rhs: impl Into<LinearExpr>) -> RestrictionExpr {
        RestrictionExpr::new(self, ConstraintOp::Ge, rhs)
    }

    pub fn eq_to(self, rhs: impl Into<LinearExpr>) -> RestrictionExpr {
        RestrictionExpr::new(self, ConstraintOp::Eq, rhs)
    }
}

impl<T> Clone for Var<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Var<T> {}

impl<T> PartialEq for Var<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Var<T> {}

impl<T> Hash for Var<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Var<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Var").field(&self.id).finish()
    }
}

impl<T> From<Var<T>> for VarId {
    fn from(var: Var<T>) -> Self {
        var.id
    }
}

impl<T> From<Var<T>> for LinearExpr {
    fn from(var: Var<T>) -> Self {
        LinearExpr::from(var.id)
    }
}

impl<T> From<&Var<T>> for LinearExpr {
    fn from(var: &Var<T>) -> Self {
        LinearExpr::from(var.id)
    }
}

impl<T, R: Into<LinearExpr>> Add<R> for Var<T> {
    type Output = LinearExpr;

    fn add(self, rhs: R) -> LinearExpr {
        LinearExpr::from(self) + rhs
    }
}

impl<T, R: Into<LinearExpr>> Sub<R> for Var<T> {
    type Output = LinearExpr;

    fn sub(self, rhs: R) -> LinearExpr {
        LinearExpr::from(self) - rhs
    }
}

impl<T> Mul<f64> for Var<T> {
    type Output = LinearExpr;

    fn mul(self, rhs: f64) -> LinearExpr {
        LinearExpr::from(self) * rhs
    }
}

impl<T> Mul<i32> for Var<T> {
    type Output = LinearExpr;

    fn mul(self, rhs: i32) -> LinearExpr {
        LinearExpr::from(self) * rhs
    }
}

impl<T> Neg for Var<T> {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        -LinearExpr::from(self)
    }
}

impl<T> Sum<Var<T>> for LinearExpr {
    fn sum<I: Iterator<Item = Var<T>>>(iter: I) -> Self {
        iter.fold(LinearExpr::new(), |acc, var| acc + var)
    }
}

impl<'a, T> Sum<&'a Var<T>> for LinearExpr {
    fn sum<I: Iterator<Item = &'a Var<T>>>(iter: I) -> Self {
        iter.fold(LinearExpr::new(), |acc, var| acc + *var)
    }
}

macro_rules! scalar_lhs_var_ops {
    ($($scalar:ty),*) => {$(
        impl<T> Mul<Var<T>> for $scalar {
            type Output = LinearExpr;

            fn mul(self, rhs: Var<T>) -> LinearExpr {
                rhs * self
            }
        }

        impl<T> Add<Var<T>> for $scalar {
            type Output = LinearExpr;

            fn add(self, rhs: Var<T>) -> LinearExpr {
                rhs + self
            }
        }

        impl<T> Sub<Var<T>> for $scalar {
            type Output = LinearExpr;

            fn sub(self, rhs: Var<T>) -> LinearExpr {
                LinearExpr::from(self) - rhs
            }
        }
    )*};
}

scalar_lhs_var_ops!(f64, i32);

/// Values bound to a variable after a solve
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VariableResult {
    /// Primal value
    pub value: f64,
    /// Objective coefficient range keeping the current basis optimal
    #[cfg_attr(feature = "serde", serde(with = "lpmodel_solver::serde_f64"))]
    pub from: f64,
    #[cfg_attr(feature = "serde", serde(with = "lpmodel_solver::serde_f64"))]
    pub till: f64,
    /// Reduced cost
    pub dual_value: f64,
    /// Value range over which the reduced cost holds
    #[cfg_attr(feature = "serde", serde(with = "lpmodel_solver::serde_f64"))]
    pub dual_from: f64,
    #[cfg_attr(feature = "serde", serde(with = "lpmodel_solver::serde_f64"))]
    pub dual_till: f64,
}

/// Payload-independent part of a variable
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub id: VarId,
    pub name: String,
    pub is_binary: bool,
    pub result: VariableResult,
}

pub(crate) type ResultCallback<T> = Box<dyn FnMut(&mut T, f64)>;
pub(crate) type RangeCallback<T> = Box<dyn FnMut(&mut T, f64, f64)>;
pub(crate) type DualCallback<T> = Box<dyn FnMut(&mut T, f64, f64, f64)>;

pub(crate) struct Callbacks<T> {
    pub(crate) on_result: Option<ResultCallback<T>>,
    pub(crate) on_range: Option<RangeCallback<T>>,
    pub(crate) on_dual: Option<DualCallback<T>>,
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self {
            on_result: None,
            on_range: None,
            on_dual: None,
        }
    }
}

/// A registered variable with its caller-owned payload.
pub struct Variable<T> {
    info: VariableInfo,
    payload: T,
    callbacks: Callbacks<T>,
}

impl<T> Variable<T> {
    pub(crate) fn new(info: VariableInfo, payload: T, callbacks: Callbacks<T>) -> Self {
        Self {
            info,
            payload,
            callbacks,
        }
    }

    pub fn id(&self) -> VarId {
        self.info.id
    }

    pub fn index(&self) -> usize {
        self.info.id.index()
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn is_binary(&self) -> bool {
        self.info.is_binary
    }

    pub fn result(&self) -> VariableResult {
        self.info.result
    }

    pub fn info(&self) -> &VariableInfo {
        &self.info
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }
}

impl<T> fmt::Debug for Variable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("info", &self.info)
            .field("on_result", &self.callbacks.on_result.is_some())
            .field("on_range", &self.callbacks.on_range.is_some())
            .field("on_dual", &self.callbacks.on_dual.is_some())
            .finish_non_exhaustive()
    }
}

/// Type-erased access the model needs to hold variables of any payload type
pub(crate) trait Bindable {
    fn info(&self) -> &VariableInfo;
    fn set_result(&mut self, result: VariableResult);
    fn as_any(&self) -> &dyn Any;
}

impl<T: 'static> Bindable for Variable<T> {
    fn info(&self) -> &VariableInfo {
        &self.info
    }

    fn set_result(&mut self, result: VariableResult) {
        self.info.result = result;
        let callbacks = &mut self.callbacks;
        if let Some(callback) = callbacks.on_result.as_mut() {
            callback(&mut self.payload, result.value);
        }
        if let Some(callback) = callbacks.on_range.as_mut() {
            callback(&mut self.payload, result.from, result.till);
        }
        if let Some(callback) = callbacks.on_dual.as_mut() {
            callback(&mut self.payload, result.dual_value, result.dual_from, result.dual_till);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ModelId;

    #[derive(Debug, Default)]
    struct Product {
        produced: f64,
        profit_range: (f64, f64),
        reduced_cost: f64,
    }

    #[test]
    fn test_handle_algebra() {
        let model = ModelId::next();
        let x: Var<()> = Var::new(VarId::new(model, 0));
        let y: Var<()> = Var::new(VarId::new(model, 1));

        let expr = 2.0 * x + y * 3 - x + 1.0;
        assert_eq!(expr.coefficient(x.id()), 1.0);
        assert_eq!(expr.coefficient(y.id()), 3.0);
        assert_eq!(expr.constant(), 1.0);

        let negated = -x;
        assert_eq!(negated.coefficient(x.id()), -1.0);

        let total: LinearExpr = [x, y, x].iter().sum();
        assert_eq!(total.coefficient(x.id()), 2.0);
    }

    #[test]
    fn test_set_result_writes_payload_through_callbacks() {
        let model = ModelId::next();
        let info = VariableInfo {
            id: VarId::new(model, 0),
            name: "x".to_string(),
            is_binary: false,
            result: VariableResult::default(),
        };
        let callbacks = Callbacks {
            on_result: Some(Box::new(|p: &mut Product, value: f64| {
                p.produced = value
            }) as ResultCallback<Product>),
            on_range: Some(Box::new(|p: &mut Product, from: f64, till: f64| {
                p.profit_range = (from, till)
            }) as RangeCallback<Product>),
            on_dual: Some(Box::new(|p: &mut Product, dual: f64, _: f64, _: f64| {
                p.reduced_cost = dual
            }) as DualCallback<Product>),
        };
        let mut variable = Variable::new(info, Product::default(), callbacks);

        variable.set_result(VariableResult {
            value: 20.0,
            from: 7500.0,
            till: 22500.0,
            dual_value: 0.0,
            dual_from: f64::NEG_INFINITY,
            dual_till: f64::INFINITY,
        });

        assert_eq!(variable.payload().produced, 20.0);
        assert_eq!(variable.payload().profit_range, (7500.0, 22500.0));
        assert_eq!(variable.result().value, 20.0);
        assert!(variable.as_any().downcast_ref::<Variable<Product>>().is_some());
        assert!(variable.as_any().downcast_ref::<Variable<u8>>().is_none());
    }
}
