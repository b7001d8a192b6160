//! Linear expression algebra.
//!
//! A [`LinearExpr`] maps each variable to one accumulated coefficient and
//! carries a scalar constant. Every combining operation merges terms on the
//! same variable, so a variable never occupies two slots.

use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use lpmodel_solver::ConstraintOp;

use crate::ids::VarId;
use crate::restriction::RestrictionExpr;

/// A single variable with its coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub var: VarId,
    pub coefficient: f64,
}

impl Term {
    pub fn new(var: VarId, coefficient: f64) -> Self {
        Self { var, coefficient }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: BTreeMap<VarId, f64>,
    constant: f64,
}

impl LinearExpr {
    /// The empty expression, equal to zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_constant(constant: f64) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant,
        }
    }

    pub fn from_term(term: Term) -> Self {
        let mut expr = Self::new();
        expr.add_term(term.var, term.coefficient);
        expr
    }

    /// Add `coefficient` to the slot of `var`. Zero sums are kept.
    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        *self.terms.entry(var).or_insert(0.0) += coefficient;
    }

    pub fn add_constant(mut self, value: f64) -> Self {
        self.constant += value;
        self
    }

    /// Per-variable coefficient sum; constants add.
    pub fn merge(mut self, other: &LinearExpr) -> Self {
        for (&var, &coefficient) in &other.terms {
            self.add_term(var, coefficient);
        }
        self.constant += other.constant;
        self
    }

    /// Same as merging the negation of `other`.
    pub fn subtract(mut self, other: &LinearExpr) -> Self {
        for (&var, &coefficient) in &other.terms {
            self.add_term(var, -coefficient);
        }
        self.constant -= other.constant;
        self
    }

    pub fn scale(mut self, factor: f64) -> Self {
        self.terms.values_mut().for_each(|c| *c *= factor);
        self.constant *= factor;
        self
    }

    pub fn negate(self) -> Self {
        self.scale(-1.0)
    }

    pub fn without_constant(&self) -> Self {
        Self {
            terms: self.terms.clone(),
            constant: 0.0,
        }
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Coefficient of `var`, zero when absent
    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    /// Terms in variable order
    pub fn terms(&self) -> impl Iterator<Item = Term> + '_ {
        self.terms.iter().map(|(&var, &coefficient)| Term::new(var, coefficient))
    }

    /// Number of variable slots, including zero-coefficient ones
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Equal up to `tolerance`, treating an absent term like a zero coefficient
    pub fn equivalent(&self, other: &LinearExpr, tolerance: f64) -> bool {
        if (self.constant - other.constant).abs() > tolerance {
            return false;
        }
        self.terms
            .keys()
            .chain(other.terms.keys())
            .all(|&var| (self.coefficient(var) - other.coefficient(var)).abs() <= tolerance)
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

impl From<f64> for LinearExpr {
    fn from(value: f64) -> Self {
        Self::from_constant(value)
    }
}

impl From<i32> for LinearExpr {
    fn from(value: i32) -> Self {
        Self::from_constant(f64::from(value))
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        Self::from_term(Term::new(var, 1.0))
    }
}

impl From<Term> for LinearExpr {
    fn from(term: Term) -> Self {
        Self::from_term(term)
    }
}

impl From<&LinearExpr> for LinearExpr {
    fn from(expr: &LinearExpr) -> Self {
        expr.clone()
    }
}

impl<R: Into<LinearExpr>> Add<R> for LinearExpr {
    type Output = LinearExpr;

    fn add(self, rhs: R) -> LinearExpr {
        self.merge(&rhs.into())
    }
}

impl<R: Into<LinearExpr>> Sub<R> for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: R) -> LinearExpr {
        self.subtract(&rhs.into())
    }
}

impl<R: Into<LinearExpr>> AddAssign<R> for LinearExpr {
    fn add_assign(&mut self, rhs: R) {
        let rhs = rhs.into();
        for (&var, &coefficient) in &rhs.terms {
            self.add_term(var, coefficient);
        }
        self.constant += rhs.constant;
    }
}

impl<R: Into<LinearExpr>> SubAssign<R> for LinearExpr {
    fn sub_assign(&mut self, rhs: R) {
        *self += rhs.into().negate();
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(self, rhs: f64) -> LinearExpr {
        self.scale(rhs)
    }
}

impl Mul<i32> for LinearExpr {
    type Output = LinearExpr;

    fn mul(self, rhs: i32) -> LinearExpr {
        self.scale(f64::from(rhs))
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self.negate()
    }
}

impl Sum for LinearExpr {
    fn sum<I: Iterator<Item = LinearExpr>>(iter: I) -> Self {
        iter.fold(LinearExpr::new(), |acc, expr| acc.merge(&expr))
    }
}

/// Scalar on the left: `2.0 * expr`, `10 + expr`, `5.0 - expr`
macro_rules! scalar_lhs_ops {
    ($($scalar:ty),*) => {$(
        impl Mul<LinearExpr> for $scalar {
            type Output = LinearExpr;

            fn mul(self, rhs: LinearExpr) -> LinearExpr {
                rhs * self
            }
        }

        impl Add<LinearExpr> for $scalar {
            type Output = LinearExpr;

            fn add(self, rhs: LinearExpr) -> LinearExpr {
                rhs + self
            }
        }

        impl Sub<LinearExpr> for $scalar {
            type Output = LinearExpr;

            fn sub(self, rhs: LinearExpr) -> LinearExpr {
                LinearExpr::from(self) - rhs
            }
        }
    )*};
}

scalar_lhs_ops!(f64, i32);
