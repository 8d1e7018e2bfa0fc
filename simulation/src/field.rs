//! Pointwise evaluation of the warp-bubble shape function.
//!
//! The bubble profile is
//!
//! ```text
//! f(r) = (tanh(sigma * (r + R)) - tanh(sigma * (r - R))) / (2 * tanh(sigma * R))
//! ```
//!
//! with `R = mass / 2` and `sigma = energy_density / 10`. It equals 1 at the
//! bubble centre and decays to 0 far outside the wall.

use crate::error::{SimulationError, SimulationResult};
use crate::parameters::DriveParameters;

/// Half width of the square sampling window.
pub const FIELD_EXTENT: f64 = 10.0;
/// Samples used for line plots.
pub const LINE_RESOLUTION: usize = 400;
/// Samples per axis used for contour maps.
pub const GRID_RESOLUTION: usize = 200;

/// Floor applied to `2 * tanh(sigma * R)` before dividing.
pub const DENOMINATOR_EPSILON: f64 = 1e-12;
/// Below this normalisation the ratio is dominated by rounding error.
pub const STABILITY_THRESHOLD: f64 = 1e-9;

/// Closed interval sampled by the field evaluators
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub start: f64,
    pub end: f64,
}

impl AxisRange {
    pub fn new(start: f64, end: f64) -> SimulationResult<Self> {
        if !start.is_finite() {
            return Err(SimulationError::invalid("range start", start));
        }
        if !end.is_finite() || end <= start {
            return Err(SimulationError::invalid("range end", end));
        }
        Ok(Self { start, end })
    }

    /// `[-extent, extent]`
    pub fn symmetric(extent: f64) -> SimulationResult<Self> {
        Self::new(-extent, extent)
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// `count` evenly spaced points including both end points.
    pub fn linspace(&self, count: usize) -> impl Iterator<Item = f64> + '_ {
        let last = count.saturating_sub(1).max(1) as f64;
        (0..count).map(move |i| {
            if i + 1 == count && count > 1 {
                self.end
            } else {
                self.start + self.span() * i as f64 / last
            }
        })
    }
}

impl Default for AxisRange {
    fn default() -> Self {
        Self {
            start: -FIELD_EXTENT,
            end: FIELD_EXTENT,
        }
    }
}

/// Whether the normalisation of the shape function was usable
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stability {
    Stable,
    /// `2 * tanh(sigma * R)` fell below [`STABILITY_THRESHOLD`]; values are
    /// computed with the clamped denominator and should be displayed with
    /// clamped axis ranges.
    Unstable { normalization: f64 },
}

impl Stability {
    pub fn is_stable(&self) -> bool {
        matches!(self, Stability::Stable)
    }
}

/// The tanh-difference bubble wall profile `f(r; R, sigma)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeFunction {
    radius: f64,
    steepness: f64,
}

impl ShapeFunction {
    pub fn new(radius: f64, steepness: f64) -> Self {
        Self { radius, steepness }
    }

    pub fn from_parameters(params: &DriveParameters) -> Self {
        Self::new(params.bubble_radius(), params.wall_steepness())
    }

    /// Bubble radius R
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Wall steepness sigma
    pub fn steepness(&self) -> f64 {
        self.steepness
    }

    /// Raw denominator `2 * tanh(sigma * R)`
    pub fn normalization(&self) -> f64 {
        2.0 * (self.steepness * self.radius).tanh()
    }

    pub fn stability(&self) -> Stability {
        let normalization = self.normalization();
        if normalization.abs() < STABILITY_THRESHOLD {
            Stability::Unstable { normalization }
        } else {
            Stability::Stable
        }
    }

    /// Evaluate at radial distance `r`.
    pub fn value(&self, r: f64) -> f64 {
        let leading = (self.steepness * (r + self.radius)).tanh();
        let numerator = leading - (self.steepness * (r - self.radius)).tanh();
        let denominator = self.normalization();
        let denominator = if denominator.abs() < DENOMINATOR_EPSILON {
            DENOMINATOR_EPSILON.copysign(denominator)
        } else {
            denominator
        };
        numerator / denominator
    }

    /// Evaluate at the planar point `(x, y)` using `r = sqrt(x² + y²)`.
    pub fn value_at_point(&self, x: f64, y: f64) -> f64 {
        self.value(x.hypot(y))
    }
}

/// Line samples `(x, f(|x - center|))`
#[derive(Debug, Clone, PartialEq)]
pub struct CurvatureField1D {
    samples: Vec<(f64, f64)>,
    stability: Stability,
}

impl CurvatureField1D {
    pub fn samples(&self) -> &[(f64, f64)] {
        &self.samples
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|&(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn stability(&self) -> Stability {
        self.stability
    }

    /// Smallest and largest finite value, if any.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        finite_range(self.values())
    }
}

/// Grid samples stored row-major: row `j` holds every `x` at `ys[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvatureField2D {
    xs: Vec<f64>,
    ys: Vec<f64>,
    values: Vec<f64>,
    stability: Stability,
}

impl CurvatureField2D {
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn stability(&self) -> Stability {
        self.stability
    }

    /// Value at column `ix`, row `iy`.
    pub fn value(&self, ix: usize, iy: usize) -> Option<f64> {
        if ix >= self.xs.len() || iy >= self.ys.len() {
            return None;
        }
        self.values.get(iy * self.xs.len() + ix).copied()
    }

    /// Every `(x, y, f(r))` triple in row-major order.
    pub fn triples(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        let width = self.xs.len();
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (self.xs[i % width], self.ys[i / width], v))
    }

    pub fn value_range(&self) -> Option<(f64, f64)> {
        finite_range(self.values.iter().copied())
    }

    /// Grid spacing along x and y.
    pub fn cell_size(&self) -> (f64, f64) {
        (spacing(&self.xs), spacing(&self.ys))
    }
}

fn spacing(axis: &[f64]) -> f64 {
    match axis {
        [first, second, ..] => second - first,
        _ => 0.0,
    }
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn check_resolution(resolution: usize) -> SimulationResult<()> {
    if resolution < 2 {
        return Err(SimulationError::invalid("resolution", resolution as f64));
    }
    Ok(())
}

fn checked_shape(params: &DriveParameters) -> SimulationResult<ShapeFunction> {
    // Parameters may have been built by struct literal, so validate again.
    let params = DriveParameters::new(params.mass, params.energy_density)?;
    let shape = ShapeFunction::from_parameters(&params);
    if let Stability::Unstable { normalization } = shape.stability() {
        log::warn!(
            "shape function normalisation {:e} is near zero (mass={}, energy density={}); \
             values use a clamped denominator",
            normalization,
            params.mass,
            params.energy_density
        );
    }
    Ok(shape)
}

/// Sample `f(|x|)` over `x_range`.
pub fn evaluate_1d(
    params: &DriveParameters,
    x_range: AxisRange,
    resolution: usize,
) -> SimulationResult<CurvatureField1D> {
    evaluate_1d_centered(params, x_range, resolution, 0.0)
}

/// Sample `f(|x - center|)` over `x_range`.
pub fn evaluate_1d_centered(
    params: &DriveParameters,
    x_range: AxisRange,
    resolution: usize,
    center: f64,
) -> SimulationResult<CurvatureField1D> {
    check_resolution(resolution)?;
    let shape = checked_shape(params)?;
    Ok(sample_line(&shape, x_range, resolution, center))
}

pub(crate) fn sample_line(
    shape: &ShapeFunction,
    x_range: AxisRange,
    resolution: usize,
    center: f64,
) -> CurvatureField1D {
    let samples = x_range
        .linspace(resolution)
        .map(|x| (x, shape.value((x - center).abs())))
        .collect();
    CurvatureField1D {
        samples,
        stability: shape.stability(),
    }
}

/// Sample `f(sqrt(x² + y²))` over the `x_range` × `y_range` grid.
pub fn evaluate_2d(
    params: &DriveParameters,
    x_range: AxisRange,
    y_range: AxisRange,
    resolution: usize,
) -> SimulationResult<CurvatureField2D> {
    check_resolution(resolution)?;
    let shape = checked_shape(params)?;

    let xs: Vec<f64> = x_range.linspace(resolution).collect();
    let ys: Vec<f64> = y_range.linspace(resolution).collect();
    let mut values = Vec::with_capacity(xs.len() * ys.len());
    for &y in &ys {
        values.extend(xs.iter().map(|&x| shape.value_at_point(x, y)));
    }
    log::debug!(
        "evaluated {}x{} curvature grid (R={}, sigma={})",
        xs.len(),
        ys.len(),
        shape.radius(),
        shape.steepness()
    );

    Ok(CurvatureField2D {
        xs,
        ys,
        values,
        stability: shape.stability(),
    })
}
