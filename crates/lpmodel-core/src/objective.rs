use crate::expr::LinearExpr;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

/// The function being optimized. A model holds at most one.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    expression: LinearExpr,
    sense: Sense,
    name: Option<String>,
}

impl Objective {
    pub fn new(expression: impl Into<LinearExpr>, sense: Sense) -> Self {
        Self {
            expression: expression.into(),
            sense,
            name: None,
        }
    }

    pub fn maximize(expression: impl Into<LinearExpr>) -> Self {
        Self::new(expression, Sense::Maximize)
    }

    pub fn minimize(expression: impl Into<LinearExpr>) -> Self {
        Self::new(expression, Sense::Minimize)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Expression including its constant, which is added to the reported value
    pub fn expression(&self) -> &LinearExpr {
        &self.expression
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ModelId, VarId};

    #[test]
    fn test_named_objective_keeps_constant() {
        let x = VarId::new(ModelId::next(), 0);
        let objective = Objective::minimize(LinearExpr::from(x) * 2.0 + 15.0).named("cost");

        assert_eq!(objective.name(), Some("cost"));
        assert_eq!(objective.sense(), Sense::Minimize);
        assert_eq!(objective.expression().constant(), 15.0);
        assert_eq!(objective.expression().coefficient(x), 2.0);
    }

    #[test]
    fn test_unnamed_by_default() {
        let objective = Objective::maximize(4.0);
        assert_eq!(objective.name(), None);
        assert_eq!(objective.sense(), Sense::Maximize);
        assert!(objective.expression().is_empty());
        assert_eq!(objective.expression().constant(), 4.0);
    }
}
