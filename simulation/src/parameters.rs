use std::ops::RangeInclusive;

use crate::error::{ensure_positive, SimulationResult};

/// Mass range offered by the interactive controls (kg).
pub const MASS_RANGE: RangeInclusive<f64> = 1.0..=50.0;
/// Energy density range offered by the interactive controls (J/m³).
pub const ENERGY_DENSITY_RANGE: RangeInclusive<f64> = 1.0..=100.0;

pub const DEFAULT_MASS: f64 = 5.0;
pub const DEFAULT_ENERGY_DENSITY: f64 = 10.0;

/// User-chosen inputs of the warp drive model.
///
/// Values are checked to be finite and positive but deliberately not for
/// physical plausibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveParameters {
    /// Mass in kilograms
    pub mass: f64,
    /// Energy density in joules per cubic metre
    pub energy_density: f64,
}

impl DriveParameters {
    /// Validate and build a parameter pair
    pub fn new(mass: f64, energy_density: f64) -> SimulationResult<Self> {
        Ok(Self {
            mass: ensure_positive("mass", mass)?,
            energy_density: ensure_positive("energy density", energy_density)?,
        })
    }

    /// Build a parameter pair clamped into the slider ranges.
    /// NaN inputs fall back to the defaults.
    pub fn clamped(mass: f64, energy_density: f64) -> Self {
        let clamp = |value: f64, range: &RangeInclusive<f64>, fallback: f64| {
            if value.is_nan() {
                fallback
            } else {
                value.clamp(*range.start(), *range.end())
            }
        };
        Self {
            mass: clamp(mass, &MASS_RANGE, DEFAULT_MASS),
            energy_density: clamp(energy_density, &ENERGY_DENSITY_RANGE, DEFAULT_ENERGY_DENSITY),
        }
    }

    /// Bubble radius R = mass / 2
    pub fn bubble_radius(&self) -> f64 {
        self.mass / 2.0
    }

    /// Wall steepness sigma = energy_density / 10
    pub fn wall_steepness(&self) -> f64 {
        self.energy_density / 10.0
    }

    /// Whether both values sit inside the documented slider ranges
    pub fn within_control_ranges(&self) -> bool {
        MASS_RANGE.contains(&self.mass) && ENERGY_DENSITY_RANGE.contains(&self.energy_density)
    }
}

impl Default for DriveParameters {
    fn default() -> Self {
        Self {
            mass: DEFAULT_MASS,
            energy_density: DEFAULT_ENERGY_DENSITY,
        }
    }
}
