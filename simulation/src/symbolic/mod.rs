//! Symbolic form of the warp bubble, built on the `RustedSciThe` symbolic
//! engine: the shape function, its derivatives and laplacian, the
//! negative-energy condition and the line element.

mod bindings;
mod metric;

pub use bindings::Bindings;
pub use metric::{
    line_element_expression, shape_expression, Inequality, SymbolicMetricModel,
    DEFAULT_SIMPLIFY_BUDGET, LINE_ELEMENT_SYMBOLS, RADIUS, SHAPE_SYMBOLS, STEEPNESS, X, Y,
};
pub use RustedSciThe::symbolic::symbolic_engine::Expr;
