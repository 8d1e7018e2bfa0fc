use std::fmt;
use std::time::Instant;

use super::{Bindings, Expr};
use crate::error::{SimulationError, SimulationResult};

/// Largest expression, in printed characters, handed to the simplifier.
pub const DEFAULT_SIMPLIFY_BUDGET: usize = 1_000_000;

pub const X: &str = "x";
pub const Y: &str = "y";
pub const RADIUS: &str = "R";
pub const STEEPNESS: &str = "sigma";

/// Free symbols of the shape function and everything derived from it.
pub const SHAPE_SYMBOLS: [&str; 4] = [X, Y, RADIUS, STEEPNESS];
/// Free symbols of the line element.
pub const LINE_ELEMENT_SYMBOLS: [&str; 5] = ["c", "dt", "dx", "vs", "f"];

/// Strict inequality `lhs < bound`, kept unevaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Inequality {
    pub lhs: Expr,
    pub bound: f64,
}

impl Inequality {
    pub fn less_than(lhs: Expr, bound: f64) -> Self {
        Self { lhs, bound }
    }

    /// Decide the predicate at a concrete point.
    pub fn holds_at(&self, bindings: &Bindings, symbols: &[&str]) -> SimulationResult<bool> {
        Ok(bindings.evaluate(&self.lhs, symbols)? < self.bound)
    }
}

impl fmt::Display for Inequality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} < {}", self.lhs, self.bound)
    }
}

/// `tanh(u)` written as `(exp(2u) - 1) / (exp(2u) + 1)`.
fn tanh_of(argument: &str) -> String {
    format!("((exp(2*{argument}) - 1)/(exp(2*{argument}) + 1))")
}

/// `f(r) = (tanh(sigma*(r + R)) - tanh(sigma*(r - R))) / (2*tanh(sigma*R))`
/// with `r = (x*x + y*y)^0.5`.
pub fn shape_expression() -> Expr {
    let r = format!("({X}*{X} + {Y}*{Y})^0.5");
    let leading = tanh_of(&format!("{STEEPNESS}*({r} + {RADIUS})"));
    let trailing = tanh_of(&format!("{STEEPNESS}*({r} - {RADIUS})"));
    let norm = tanh_of(&format!("{STEEPNESS}*{RADIUS}"));
    Expr::parse_expression(&format!("({leading} - {trailing})/(2*{norm})"))
}

/// `ds^2 = -c^2 dt^2 + (dx - vs f dt)^2`, with `f` standing in for the
/// shape function value.
pub fn line_element_expression() -> Expr {
    Expr::parse_expression("(dx - vs*f*dt)^2 - c^2*dt^2")
}

/// Symbolic form of the bubble and its derived quantities.
///
/// Everything is derived and simplified once in [`SymbolicMetricModel::new`];
/// queries only substitute numbers into the stored trees.
#[derive(Debug, Clone)]
pub struct SymbolicMetricModel {
    shape: Expr,
    df_dx: Expr,
    df_dy: Expr,
    laplacian: Expr,
    negative_energy: Inequality,
    line_element: Expr,
    degraded: Vec<SimulationError>,
}

impl SymbolicMetricModel {
    pub fn new() -> Self {
        Self::with_budget(DEFAULT_SIMPLIFY_BUDGET)
    }

    /// Build the model, simplifying only expressions of at most `budget`
    /// printed characters. Larger ones are kept in their raw form.
    pub fn with_budget(budget: usize) -> Self {
        let mut degraded = Vec::new();
        let mut simplify = |what: &str, expr: Expr| {
            let size = expr.to_string().len();
            if size > budget {
                let err = SimulationError::SimplificationTimeout {
                    what: what.to_string(),
                    budget,
                };
                log::warn!("{}; keeping the unsimplified form", err);
                degraded.push(err);
                return expr;
            }
            let started = Instant::now();
            let simplified = expr.simplify();
            log::debug!(
                "simplified {} from {} to {} characters in {:?}",
                what,
                size,
                simplified.to_string().len(),
                started.elapsed()
            );
            simplified
        };

        let shape = simplify("shape function", shape_expression());
        let df_dx = simplify("df/dx", shape.diff(X));
        let df_dy = simplify("df/dy", shape.diff(Y));
        let laplacian = simplify("laplacian", df_dx.diff(X) + df_dy.diff(Y));
        let line_element = simplify("line element", line_element_expression());
        let negative_energy = Inequality::less_than(laplacian.clone(), 0.0);

        Self {
            shape,
            df_dx,
            df_dy,
            laplacian,
            negative_energy,
            line_element,
            degraded,
        }
    }

    pub fn shape_function(&self) -> &Expr {
        &self.shape
    }

    /// `(df/dx, df/dy, laplacian)`
    pub fn derivatives(&self) -> (&Expr, &Expr, &Expr) {
        (&self.df_dx, &self.df_dy, &self.laplacian)
    }

    /// Regions where the laplacian is negative need exotic matter.
    pub fn negative_energy_condition(&self) -> &Inequality {
        &self.negative_energy
    }

    pub fn metric_line_element(&self) -> &Expr {
        &self.line_element
    }

    /// Simplifications skipped for exceeding the budget while building the model.
    pub fn degradations(&self) -> &[SimulationError] {
        &self.degraded
    }

    pub fn point(radius: f64, steepness: f64, x: f64, y: f64) -> Bindings {
        Bindings::new()
            .with(RADIUS, radius)
            .with(STEEPNESS, steepness)
            .with(X, x)
            .with(Y, y)
    }

    /// Laplacian of the shape function at `(x, y)`.
    ///
    /// The derivatives carry `x / r` factors, so the bubble centre `r = 0` is
    /// a removable singularity of the symbolic form and is rejected. The
    /// exponential form of tanh overflows once `sigma * (r + R)` exceeds
    /// about 118, giving a non-finite value.
    pub fn evaluate_laplacian(
        &self,
        radius: f64,
        steepness: f64,
        x: f64,
        y: f64,
    ) -> SimulationResult<f64> {
        if x == 0.0 && y == 0.0 {
            return Err(SimulationError::CoordinateSingularity {
                what: "laplacian",
                x,
                y,
            });
        }
        Self::point(radius, steepness, x, y).evaluate(&self.laplacian, &SHAPE_SYMBOLS)
    }

    pub fn evaluate_shape(
        &self,
        radius: f64,
        steepness: f64,
        x: f64,
        y: f64,
    ) -> SimulationResult<f64> {
        Self::point(radius, steepness, x, y).evaluate(&self.shape, &SHAPE_SYMBOLS)
    }
}

impl Default for SymbolicMetricModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ShapeFunction;

    /// Closed form of the radial laplacian f'' + f'/r.
    fn radial_laplacian(radius: f64, steepness: f64, r: f64) -> f64 {
        let sech2 = |u: f64| 1.0 / u.cosh().powi(2);
        let a = steepness * (r + radius);
        let b = steepness * (r - radius);
        let norm = 2.0 * (steepness * radius).tanh();
        let first = steepness * (sech2(a) - sech2(b)) / norm;
        let curvature = -2.0 * sech2(a) * a.tanh() + 2.0 * sech2(b) * b.tanh();
        let second = steepness * steepness * curvature / norm;
        second + first / r
    }

    fn close(actual: f64, expected: f64, tolerance: f64) -> bool {
        (actual - expected).abs() <= tolerance * expected.abs().max(1.0)
    }

    #[test]
    fn test_symbolic_shape_matches_numeric_shape() {
        let model = SymbolicMetricModel::new();
        let shape = ShapeFunction::new(2.5, 1.0);
        for &(x, y) in &[(0.3, 0.4), (2.0, 1.5), (-4.0, 3.0)] {
            let symbolic = model.evaluate_shape(2.5, 1.0, x, y).unwrap();
            assert!(close(symbolic, shape.value_at_point(x, y), 1e-10));
        }
    }

    #[test]
    fn test_laplacian_matches_closed_form() {
        let model = SymbolicMetricModel::new();
        for &(x, y) in &[(1.0, 0.5), (-1.5, 0.8), (0.4, -2.2)] {
            let r = f64::hypot(x, y);
            let expected = radial_laplacian(2.0, 0.5, r);
            let actual = model.evaluate_laplacian(2.0, 0.5, x, y).unwrap();
            assert!(close(actual, expected, 1e-8), "at ({x}, {y}): {actual} vs {expected}");
        }
    }

    #[test]
    fn test_sample_point_laplacian_matches_closed_form() {
        let model = SymbolicMetricModel::new();
        let actual = model.evaluate_laplacian(2.0, 10.0, 1.0, 0.0).unwrap();
        let expected = radial_laplacian(2.0, 10.0, 1.0);
        assert!(expected < 0.0);
        assert!((actual - expected).abs() <= 1e-4 * expected.abs());
    }

    #[test]
    fn test_laplacian_at_bubble_centre_is_rejected() {
        let model = SymbolicMetricModel::new();
        assert_eq!(
            model.evaluate_laplacian(2.0, 10.0, 0.0, 0.0),
            Err(SimulationError::CoordinateSingularity {
                what: "laplacian",
                x: 0.0,
                y: 0.0
            })
        );
        assert!(model.evaluate_shape(2.0, 10.0, 0.0, 0.0).unwrap().is_finite());
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let model = SymbolicMetricModel::new();
        let shape = ShapeFunction::new(2.0, 0.8);
        let (df_dx, df_dy, _) = model.derivatives();
        let point = SymbolicMetricModel::point(2.0, 0.8, 1.2, -0.7);
        let h = 1e-6;
        let numeric_x = (shape.value_at_point(1.2 + h, -0.7) - shape.value_at_point(1.2 - h, -0.7))
            / (2.0 * h);
        let numeric_y = (shape.value_at_point(1.2, -0.7 + h) - shape.value_at_point(1.2, -0.7 - h))
            / (2.0 * h);
        assert!((point.evaluate(df_dx, &SHAPE_SYMBOLS).unwrap() - numeric_x).abs() < 1e-6);
        assert!((point.evaluate(df_dy, &SHAPE_SYMBOLS).unwrap() - numeric_y).abs() < 1e-6);
    }

    #[test]
    fn test_laplacian_evaluation_is_deterministic() {
        let model = SymbolicMetricModel::new();
        let first = model.evaluate_laplacian(2.0, 10.0, 1.0, 0.0).unwrap();
        let second = model.evaluate_laplacian(2.0, 10.0, 1.0, 0.0).unwrap();
        assert!(first.is_finite());
        assert_eq!(first.to_bits(), second.to_bits());

        let rebuilt = SymbolicMetricModel::new();
        let again = rebuilt.evaluate_laplacian(2.0, 10.0, 1.0, 0.0).unwrap();
        assert_eq!(again.to_bits(), first.to_bits());
        assert_eq!(
            rebuilt.metric_line_element().to_string(),
            model.metric_line_element().to_string()
        );
    }

    #[test]
    fn test_derivatives_need_every_shape_symbol() {
        let model = SymbolicMetricModel::new();
        assert!(model.degradations().is_empty());
        let partial = Bindings::new().with(X, 1.0).with(Y, 0.5).with(RADIUS, 2.0);
        let (df_dx, _, laplacian) = model.derivatives();
        for expr in [df_dx, laplacian] {
            assert!(matches!(
                partial.evaluate(expr, &SHAPE_SYMBOLS),
                Err(SimulationError::UnboundSymbol { ref name }) if name == STEEPNESS
            ));
        }
    }

    #[test]
    fn test_negative_energy_condition_stays_symbolic() {
        let model = SymbolicMetricModel::new();
        let condition = model.negative_energy_condition();
        assert!(condition.to_string().ends_with(" < 0"));
        assert_eq!(condition.lhs, *model.derivatives().2);

        let point = SymbolicMetricModel::point(2.0, 0.5, 2.0, 0.0);
        let inside = condition.holds_at(&point, &SHAPE_SYMBOLS).unwrap();
        assert_eq!(inside, radial_laplacian(2.0, 0.5, 2.0) < 0.0);
    }

    #[test]
    fn test_line_element_values() {
        let model = SymbolicMetricModel::new();
        let ds2 = model.metric_line_element();
        let printed = ds2.to_string();
        for symbol in LINE_ELEMENT_SYMBOLS {
            assert!(printed.contains(symbol), "{printed} lacks {symbol}");
        }

        let at_light_speed = Bindings::new()
            .with("c", 1.0)
            .with("dt", 1.0)
            .with("dx", 2.0)
            .with("vs", 1.0)
            .with("f", 1.0);
        assert!(at_light_speed.evaluate(ds2, &LINE_ELEMENT_SYMBOLS).unwrap().abs() < 1e-12);

        let moving = Bindings::new()
            .with("c", 2.0)
            .with("dt", 1.0)
            .with("dx", 4.0)
            .with("vs", 0.5)
            .with("f", 2.0);
        assert!((moving.evaluate(ds2, &LINE_ELEMENT_SYMBOLS).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_exhausted_budget_degrades_gracefully() {
        let model = SymbolicMetricModel::with_budget(10);
        assert!(!model.degradations().is_empty());
        assert!(matches!(
            model.degradations()[0],
            SimulationError::SimplificationTimeout { budget: 10, .. }
        ));

        let full = SymbolicMetricModel::new();
        let degraded = model.evaluate_laplacian(2.0, 0.5, 1.0, 0.5).unwrap();
        let reference = full.evaluate_laplacian(2.0, 0.5, 1.0, 0.5).unwrap();
        assert!(close(degraded, reference, 1e-9));
    }
}
