use crate::error::{ensure_positive, SimulationError, SimulationResult};
use crate::parameters::DriveParameters;

/// Short explanation of the Alcubierre drive shown by the concept action.
pub const CONCEPT: &str = "The Alcubierre warp drive is a theoretical proposal within \
general relativity that would allow faster-than-light travel without breaking known \
physical laws. Instead of \
accelerating a ship past the speed of light in its local surroundings, spacetime itself \
contracts in front of the ship and expands behind it, creating a 'bubble' that can move at \
apparently superluminal speeds.\n\n\
This is possible because relativity allows spacetime to deform and places no speed limit on \
the expansion or contraction of space itself. The theory does however require 'exotic matter' \
with negative energy density, which has never been observed experimentally.\n\n\
The idea was proposed by the Mexican physicist Miguel Alcubierre in 1994 and has inspired \
scientists and science fiction writers alike.";

/// Toy curvature estimate `mass / energy_density`.
///
/// Unrelated to the field model's shape function; the two are separate quantities.
pub fn estimate(mass: f64, energy_density: f64) -> SimulationResult<f64> {
    let mass = ensure_positive("mass", mass)?;
    if energy_density == 0.0 {
        return Err(SimulationError::DivisionInstability {
            model: "curvature estimate",
            energy_density,
        });
    }
    let energy_density = ensure_positive("energy density", energy_density)?;
    Ok(mass / energy_density)
}

/// Multi-line summary of one simulated run.
pub fn narrative(mass: f64, energy_density: f64, curvature: f64) -> String {
    format!(
        "Warp drive simulation:\n \
         - Mass: {mass} kg\n \
         - Energy density: {energy_density} J/m^3\n \
         - Computed curvature: {curvature}\n\
         The ship could potentially travel at superluminal speeds."
    )
}

/// Paragraph shown by the curvature action.
pub fn curvature_explanation(curvature: f64) -> String {
    format!(
        "The computed curvature is: {curvature:.4}\n\n\
         This shows how mass and energy affect the deformation of spacetime.\n\
         Larger masses or lower energy densities produce a stronger curvature."
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarReport {
    pub mass: f64,
    pub energy_density: f64,
    pub curvature_estimate: f64,
    pub narrative: String,
}

impl ScalarReport {
    pub fn compute(params: &DriveParameters) -> SimulationResult<Self> {
        let curvature_estimate = estimate(params.mass, params.energy_density)?;
        log::debug!(
            "curvature estimate {} for mass {} and energy density {}",
            curvature_estimate,
            params.mass,
            params.energy_density
        );
        Ok(Self {
            mass: params.mass,
            energy_density: params.energy_density,
            curvature_estimate,
            narrative: narrative(params.mass, params.energy_density, curvature_estimate),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_is_exact_ratio() {
        assert_eq!(estimate(5.0, 10.0), Ok(0.5));
        assert_eq!(estimate(50.0, 1.0), Ok(50.0));
        assert_eq!(estimate(1.0, 3.0), Ok(1.0 / 3.0));
    }

    #[test]
    fn test_zero_energy_density_is_a_division_error() {
        assert!(matches!(
            estimate(5.0, 0.0),
            Err(SimulationError::DivisionInstability { energy_density, .. })
                if energy_density == 0.0
        ));
        assert!(matches!(estimate(5.0, -0.0), Err(SimulationError::DivisionInstability { .. })));
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(matches!(
            estimate(-1.0, 10.0),
            Err(SimulationError::InvalidParameter { name: "mass", .. })
        ));
        assert!(matches!(
            estimate(5.0, -2.0),
            Err(SimulationError::InvalidParameter { name: "energy density", .. })
        ));
        assert!(matches!(
            estimate(f64::NAN, 10.0),
            Err(SimulationError::InvalidParameter { .. })
        ));
        assert!(matches!(
            estimate(5.0, f64::INFINITY),
            Err(SimulationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_narrative_lists_inputs() {
        let text = narrative(5.0, 10.0, 0.5);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Warp drive simulation:");
        assert_eq!(lines[1], " - Mass: 5 kg");
        assert_eq!(lines[2], " - Energy density: 10 J/m^3");
        assert_eq!(lines[3], " - Computed curvature: 0.5");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_curvature_explanation_uses_four_decimals() {
        let text = curvature_explanation(1.0 / 3.0);
        assert!(text.starts_with("The computed curvature is: 0.3333\n"));
    }

    #[test]
    fn test_report_from_parameters() {
        let report = ScalarReport::compute(&DriveParameters::default()).unwrap();
        assert_eq!(report.curvature_estimate, 0.5);
        assert_eq!(report.narrative, narrative(5.0, 10.0, 0.5));
    }
}
