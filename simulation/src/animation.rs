use std::ops::Range;

use crate::error::{SimulationError, SimulationResult};
use crate::field::{sample_line, AxisRange, CurvatureField1D, ShapeFunction, LINE_RESOLUTION};
use crate::parameters::DriveParameters;

pub const FRAME_COUNT: usize = 100;
pub const START_CENTER: f64 = -5.0;
pub const CENTER_STEP: f64 = 0.1;
/// Display time of one frame in milliseconds.
pub const FRAME_INTERVAL_MS: u32 = 50;
/// Fixed vertical axis of the animation plot.
pub const ANIMATION_Y_RANGE: Range<f64> = 0.0..1.2;

/// The curve of one animation frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub index: usize,
    pub center: f64,
    pub curve: CurvatureField1D,
}

/// Bubble translating along x, one frame per `CENTER_STEP`.
///
/// Frames are computed on demand from the index alone, so replaying the
/// animation only means starting the index over.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleAnimation {
    shape: ShapeFunction,
    x_range: AxisRange,
    resolution: usize,
}

impl BubbleAnimation {
    pub fn new(params: &DriveParameters) -> SimulationResult<Self> {
        let params = DriveParameters::new(params.mass, params.energy_density)?;
        let shape = ShapeFunction::from_parameters(&params);
        if !shape.stability().is_stable() {
            log::warn!(
                "animating an unstable shape function (mass={}, energy density={})",
                params.mass,
                params.energy_density
            );
        }
        Ok(Self {
            shape,
            x_range: AxisRange::default(),
            resolution: LINE_RESOLUTION,
        })
    }

    pub fn frame_count(&self) -> usize {
        FRAME_COUNT
    }

    pub fn center(index: usize) -> f64 {
        START_CENTER + CENTER_STEP * index as f64
    }

    pub fn render_frame(&self, index: usize) -> SimulationResult<AnimationFrame> {
        if index >= FRAME_COUNT {
            return Err(SimulationError::FrameOutOfRange {
                index,
                count: FRAME_COUNT,
            });
        }
        let center = Self::center(index);
        Ok(AnimationFrame {
            index,
            center,
            curve: sample_line(&self.shape, self.x_range, self.resolution, center),
        })
    }

    /// Lazily yields every frame from the first one.
    pub fn frames(&self) -> Frames<'_> {
        Frames {
            animation: self,
            next: 0,
        }
    }
}

pub struct Frames<'a> {
    animation: &'a BubbleAnimation,
    next: usize,
}

impl Iterator for Frames<'_> {
    type Item = AnimationFrame;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.animation.render_frame(self.next).ok()?;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = FRAME_COUNT.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_has_one_hundred_frames() {
        let animation = BubbleAnimation::new(&DriveParameters::default()).unwrap();
        assert_eq!(animation.frame_count(), 100);
        assert_eq!(animation.frames().len(), 100);
        assert_eq!(animation.frames().count(), 100);
    }

    #[test]
    fn test_frame_centers() {
        let animation = BubbleAnimation::new(&DriveParameters::default()).unwrap();
        assert_eq!(animation.render_frame(0).unwrap().center, -5.0);
        assert!((animation.render_frame(99).unwrap().center - 4.9).abs() < 1e-9);
        assert!(matches!(
            animation.render_frame(100),
            Err(SimulationError::FrameOutOfRange { index: 100, count: 100 })
        ));
    }

    #[test]
    fn test_frame_peaks_at_its_center() {
        let animation = BubbleAnimation::new(&DriveParameters::default()).unwrap();
        let frame = animation.render_frame(50).unwrap();
        let (x_peak, _) = frame
            .curve
            .samples()
            .iter()
            .copied()
            .fold((f64::NAN, f64::MIN), |best, s| if s.1 > best.1 { s } else { best });
        assert!((x_peak - frame.center).abs() < 0.1);
        assert_eq!(frame.curve.len(), LINE_RESOLUTION);
    }

    #[test]
    fn test_frames_restart_and_match_render_frame() {
        let animation = BubbleAnimation::new(&DriveParameters::new(10.0, 30.0).unwrap()).unwrap();
        let mut frames = animation.frames();
        let first = frames.next().unwrap();
        let second = frames.next().unwrap();
        assert_eq!(frames.len(), 98);
        assert_eq!(second, animation.render_frame(1).unwrap());
        assert_eq!(animation.frames().next().unwrap(), first);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let params = DriveParameters {
            mass: 0.0,
            energy_density: 10.0,
        };
        assert!(BubbleAnimation::new(&params).is_err());
    }
}
