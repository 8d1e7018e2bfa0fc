use thiserror::Error;

/// Result alias used throughout the simulation crate.
pub type SimulationResult<T> = Result<T, SimulationError>;

/// Failures raised by the warp-bubble model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid {name}: {value} (expected a finite, positive value)")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("energy density {energy_density} drives the {model} denominator to zero")]
    DivisionInstability {
        model: &'static str,
        energy_density: f64,
    },
    #[error("{what} is larger than the simplification budget of {budget} characters")]
    SimplificationTimeout { what: String, budget: usize },
    #[error("{what} is singular at ({x}, {y})")]
    CoordinateSingularity { what: &'static str, x: f64, y: f64 },
    #[error("symbol `{name}` has no numeric value bound")]
    UnboundSymbol { name: String },
    #[error("frame {index} is outside the animation (0..{count})")]
    FrameOutOfRange { index: usize, count: usize },
}

impl SimulationError {
    pub(crate) fn invalid(name: &'static str, value: f64) -> Self {
        SimulationError::InvalidParameter { name, value }
    }
}

/// Rejects NaN, infinities and non-positive values.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> SimulationResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::invalid(name, value))
    }
}
