//! The simulation crate holds the toy warp-bubble model: the tanh shape
//! function sampled over 1D and 2D grids, its symbolic derivatives, the
//! scalar curvature estimate and the moving-bubble animation frames.
//!
//! Nothing here draws or writes files; see the renderer crate for that.

pub mod animation;
pub mod error;
pub mod field;
pub mod parameters;
pub mod scalar;
pub mod session;
pub mod symbolic;

pub use animation::{AnimationFrame, BubbleAnimation, FRAME_COUNT, FRAME_INTERVAL_MS};
pub use error::{SimulationError, SimulationResult};
pub use field::{
    evaluate_1d, evaluate_1d_centered, evaluate_2d, AxisRange, CurvatureField1D,
    CurvatureField2D, ShapeFunction, Stability, GRID_RESOLUTION, LINE_RESOLUTION,
};
pub use parameters::{DriveParameters, ENERGY_DENSITY_RANGE, MASS_RANGE};
pub use scalar::{estimate, narrative, ScalarReport};
pub use session::Session;
pub use symbolic::{Bindings, Expr, Inequality, SymbolicMetricModel};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_and_estimate_are_distinct_quantities() {
        let params = DriveParameters::default();
        let field = evaluate_1d(&params, AxisRange::default(), 201).unwrap();
        let centre = field.samples()[100];
        assert_eq!(centre.0, 0.0);
        assert!((centre.1 - 1.0).abs() < 1e-12);
        assert_eq!(estimate(params.mass, params.energy_density).unwrap(), 0.5);
    }

    #[test]
    fn test_symbolic_and_numeric_fields_agree() {
        let params = DriveParameters::new(6.0, 15.0).unwrap();
        let model = SymbolicMetricModel::new();
        let grid = evaluate_2d(&params, AxisRange::default(), AxisRange::default(), 11).unwrap();
        for (x, y, value) in grid.triples() {
            let symbolic = model
                .evaluate_shape(params.bubble_radius(), params.wall_steepness(), x, y)
                .unwrap();
            assert!((symbolic - value).abs() < 1e-9, "mismatch at ({x}, {y})");
        }
    }
}
