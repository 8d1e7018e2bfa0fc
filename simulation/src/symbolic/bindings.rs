use std::collections::BTreeMap;

use super::Expr;
use crate::error::{SimulationError, SimulationResult};

/// Numeric values for the free symbols of an expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: BTreeMap<String, f64>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Substitute every bound value into `expr` and evaluate it.
    ///
    /// `symbols` lists the free symbols of `expr`; each one must be bound.
    pub fn evaluate(&self, expr: &Expr, symbols: &[&str]) -> SimulationResult<f64> {
        if let Some(missing) = symbols.iter().find(|name| !self.values.contains_key(**name)) {
            return Err(SimulationError::UnboundSymbol {
                name: missing.to_string(),
            });
        }
        let constant = self
            .values
            .iter()
            .fold(expr.clone(), |bound, (name, &value)| bound.set_variable(name, value));
        let value = constant.lambdify1D();
        Ok(value(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_substitutes_every_symbol() {
        let expr = Expr::parse_expression("a*b + b^2");
        let bindings = Bindings::new().with("a", 3.0).with("b", 2.0);
        assert_eq!(bindings.evaluate(&expr, &["a", "b"]).unwrap(), 10.0);
        assert_eq!(bindings.get("a"), Some(3.0));
        assert_eq!(bindings.get("c"), None);
    }

    #[test]
    fn test_missing_symbol_is_reported() {
        let expr = Expr::parse_expression("a*b");
        let err = Bindings::new()
            .with("a", 1.0)
            .evaluate(&expr, &["a", "b"])
            .unwrap_err();
        assert_eq!(
            err,
            SimulationError::UnboundSymbol {
                name: "b".to_string()
            }
        );
    }
}
