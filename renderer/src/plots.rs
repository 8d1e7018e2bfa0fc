use std::ops::Range;

use anyhow::{bail, ensure, Context, Result};
use image::RgbImage;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use warp_simulation::animation::ANIMATION_Y_RANGE;
use warp_simulation::{AnimationFrame, CurvatureField1D, CurvatureField2D};

pub const LINE_TITLE: &str = "Spacetime curvature (1D)";
pub const CONTOUR_TITLE: &str = "2D warp bubble curvature map";
pub const ANIMATION_TITLE: &str = "Warp bubble in motion";

const POSITION_LABEL: &str = "Position";
const CURVATURE_LABEL: &str = "Relative curvature";
const FONT: &str = "sans-serif";
/// Largest width or height a figure may be rasterised at.
pub const MAX_DIMENSION: u32 = 8192;
const CAPTION_HEIGHT: u32 = 30;
const LABEL_AREA: u32 = 35;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Anchor colours of the plasma colormap, from low to high values.
const PLASMA: [(u8, u8, u8); 5] = [
    (13, 8, 135),
    (126, 3, 168),
    (204, 71, 120),
    (248, 149, 64),
    (240, 249, 33),
];

/// How figures are rasterised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Number of filled contour bands
    pub levels: usize,
    /// Draw captions, axis labels and tick values
    pub annotate: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            levels: 50,
            annotate: true,
        }
    }
}

impl RenderOptions {
    /// Small text-free figures, used where no fonts are available.
    pub fn bare() -> Self {
        Self {
            width: 320,
            height: 240,
            levels: 50,
            annotate: false,
        }
    }

    pub fn without_annotations(self) -> Self {
        Self {
            annotate: false,
            ..self
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width >= 16 && self.height >= 16,
            "figure size {}x{} is too small",
            self.width,
            self.height
        );
        ensure!(
            self.width <= MAX_DIMENSION && self.height <= MAX_DIMENSION,
            "figure size {}x{} exceeds the {MAX_DIMENSION}px limit",
            self.width,
            self.height
        );
        ensure!(self.levels >= 1, "at least one contour level is required");
        Ok(())
    }
}

/// Position against curvature.
pub fn render_line(field: &CurvatureField1D, options: &RenderOptions) -> Result<RgbImage> {
    let x_range = position_bounds(field)?;
    let (lo, hi) = field
        .value_range()
        .context("curvature curve has no finite values")?;
    let y_range = padded(lo.min(0.0), hi);
    render_with(options, |root| {
        draw_curve(root, field, x_range, y_range, LINE_TITLE.to_string(), options)
    })
}

/// One frame of the moving bubble, on the fixed animation axes.
pub fn render_animation_frame(
    frame: &AnimationFrame,
    options: &RenderOptions,
) -> Result<RgbImage> {
    let x_range = position_bounds(&frame.curve)?;
    let title = format!("{} (center = {:.1})", ANIMATION_TITLE, frame.center);
    render_with(options, |root| {
        draw_curve(root, &frame.curve, x_range, ANIMATION_Y_RANGE, title, options)
    })
}

/// Filled contour map with a colour bar, keeping x and y at the same scale.
pub fn render_contour(field: &CurvatureField2D, options: &RenderOptions) -> Result<RgbImage> {
    let (lo, hi) = field
        .value_range()
        .context("curvature grid has no finite values")?;
    let (dx, dy) = field.cell_size();
    let (x_range, y_range) = grid_bounds(field)?;
    let levels = options.levels;

    render_with(options, |root| {
        let (caption, plot_area, bar_area) = contour_areas(root, options.annotate);
        if let Some(caption) = caption {
            caption.titled(CONTOUR_TITLE, (FONT, 20))?;
        }
        let mut chart = contour_chart(&plot_area, x_range, y_range, options.annotate)?;
        if options.annotate {
            chart.configure_mesh().disable_mesh().x_desc("x").y_desc("y").draw()?;
        }
        chart.draw_series(field.triples().map(|(x, y, value)| {
            let colour = band_colour(level_index(value, lo, hi, levels), levels);
            Rectangle::new(
                [(x - dx / 2.0, y - dy / 2.0), (x + dx / 2.0, y + dy / 2.0)],
                colour.filled(),
            )
        }))?;

        draw_colour_bar(&bar_area, lo, hi, options)
    })
}

/// Caption strip, square plot area and colour bar column.
///
/// The caption is split off before the square is carved, so only the label
/// areas are taken out of the square and they are the same size on both axes.
fn contour_areas<'a>(root: &Area<'a>, annotate: bool) -> (Option<Area<'a>>, Area<'a>, Area<'a>) {
    let (caption, body) = if annotate {
        let (caption, body) = root.split_vertically(CAPTION_HEIGHT);
        (Some(caption), body)
    } else {
        (None, root.clone())
    };
    let (width, height) = body.dim_in_pixel();
    let bar_width = (width / 8).max(24).min(width / 2);
    let (plot_column, bar_area) = body.split_horizontally(width - bar_width);
    let side = (width - bar_width).min(height);
    let offset = ((width - bar_width - side) / 2, (height - side) / 2);
    (caption, plot_column.shrink(offset, (side, side)), bar_area)
}

fn contour_chart<'a, 'b>(
    area: &'a Area<'b>,
    x_range: Range<f64>,
    y_range: Range<f64>,
    annotate: bool,
) -> Result<ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>> {
    let mut builder = ChartBuilder::on(area);
    builder.margin(5);
    if annotate {
        builder
            .x_label_area_size(LABEL_AREA)
            .y_label_area_size(LABEL_AREA);
    }
    Ok(builder.build_cartesian_2d(x_range, y_range)?)
}

fn grid_bounds(field: &CurvatureField2D) -> Result<(Range<f64>, Range<f64>)> {
    let (dx, dy) = field.cell_size();
    let (xs, ys) = (field.xs(), field.ys());
    match (xs.first(), xs.last(), ys.first(), ys.last()) {
        (Some(&x0), Some(&x1), Some(&y0), Some(&y1)) => Ok((
            (x0 - dx / 2.0)..(x1 + dx / 2.0),
            (y0 - dy / 2.0)..(y1 + dy / 2.0),
        )),
        _ => bail!("curvature grid is empty"),
    }
}

/// Band of `value` among `levels` equal bands spanning `lo..=hi`.
pub fn level_index(value: f64, lo: f64, hi: f64, levels: usize) -> usize {
    let top = levels.saturating_sub(1);
    if !(hi > lo) || !value.is_finite() {
        return 0;
    }
    let t = (value - lo) / (hi - lo);
    ((t * levels as f64).floor().max(0.0) as usize).min(top)
}

/// Plasma colour at `t` in `[0, 1]`.
pub fn plasma(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (PLASMA.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(PLASMA.len() - 2);
    let frac = scaled - i as f64;
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (PLASMA[i], PLASMA[i + 1]);
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn band_colour(level: usize, levels: usize) -> RGBColor {
    if levels <= 1 {
        plasma(0.0)
    } else {
        plasma(level as f64 / (levels - 1) as f64)
    }
}

fn draw_colour_bar(
    area: &Area<'_>,
    lo: f64,
    hi: f64,
    options: &RenderOptions,
) -> Result<()> {
    let levels = options.levels;
    let span = if hi > lo { hi - lo } else { 1.0 };
    let (_, height) = area.dim_in_pixel();
    let label_room = if options.annotate { 35 } else { 5 };
    let mut builder = ChartBuilder::on(area);
    builder
        .margin_top(height / 12)
        .margin_bottom((height / 12 + label_room).min(height / 3))
        .margin_right(5);
    if options.annotate {
        builder.y_label_area_size(45);
    }
    let mut chart = builder.build_cartesian_2d(0.0..1.0, lo..(lo + span))?;
    if options.annotate {
        chart
            .configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(6)
            .y_label_formatter(&|v| format!("{v:.2}"))
            .draw()?;
    }
    chart.draw_series((0..levels).map(|k| {
        let y0 = lo + span * k as f64 / levels as f64;
        let y1 = lo + span * (k + 1) as f64 / levels as f64;
        Rectangle::new([(0.0, y0), (1.0, y1)], band_colour(k, levels).filled())
    }))?;
    Ok(())
}

fn draw_curve(
    root: &Area<'_>,
    field: &CurvatureField1D,
    x_range: Range<f64>,
    y_range: Range<f64>,
    title: String,
    options: &RenderOptions,
) -> Result<()> {
    let mut builder = ChartBuilder::on(root);
    builder.margin(10);
    if options.annotate {
        builder
            .caption(title, (FONT, 22))
            .x_label_area_size(35)
            .y_label_area_size(50);
    }
    let mut chart = builder.build_cartesian_2d(x_range, y_range)?;
    if options.annotate {
        chart
            .configure_mesh()
            .x_desc(POSITION_LABEL)
            .y_desc(CURVATURE_LABEL)
            .draw()?;
    }
    chart.draw_series(LineSeries::new(
        field.samples().iter().copied().filter(|(_, v)| v.is_finite()),
        BLUE.stroke_width(2),
    ))?;
    Ok(())
}

fn render_with<F>(options: &RenderOptions, draw: F) -> Result<RgbImage>
where
    F: FnOnce(&Area<'_>) -> Result<()>,
{
    options.validate()?;
    let (width, height) = (options.width, options.height);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    RgbImage::from_raw(width, height, buffer).context("plot buffer does not match the figure size")
}

fn position_bounds(field: &CurvatureField1D) -> Result<Range<f64>> {
    let samples = field.samples();
    match (samples.first(), samples.last()) {
        (Some(&(start, _)), Some(&(end, _))) if end > start => Ok(start..end),
        _ => bail!("curvature curve needs at least two increasing positions"),
    }
}

fn padded(lo: f64, hi: f64) -> Range<f64> {
    let pad = ((hi - lo) * 0.05).max(1e-3);
    (lo - pad)..(hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp_simulation::{evaluate_1d, evaluate_2d, AxisRange, BubbleAnimation, DriveParameters};

    fn is_white(pixel: &image::Rgb<u8>) -> bool {
        pixel.0 == [255, 255, 255]
    }

    #[test]
    fn test_line_plot_draws_the_curve() {
        let field = evaluate_1d(&DriveParameters::default(), AxisRange::default(), 400).unwrap();
        let options = RenderOptions::bare();
        let image = render_line(&field, &options).unwrap();
        assert_eq!(image.dimensions(), (options.width, options.height));
        assert!(image.pixels().any(is_white));
        assert!(image.pixels().any(|p| p.0[2] > 200 && p.0[0] < 60 && p.0[1] < 60));
    }

    #[test]
    fn test_contour_centre_uses_the_top_band() {
        let field = evaluate_2d(
            &DriveParameters::default(),
            AxisRange::default(),
            AxisRange::default(),
            200,
        )
        .unwrap();
        let options = RenderOptions::bare();
        let image = render_contour(&field, &options).unwrap();
        assert_eq!(image.dimensions(), (320, 240));

        // 280px plot column, 240px square centred in it.
        let centre = image.get_pixel(20 + 120, 120);
        assert_eq!(centre.0, [240, 249, 33]);
        let corner = image.get_pixel(20 + 8, 240 - 8);
        assert_eq!(corner.0, [13, 8, 135]);
    }

    #[test]
    fn test_animation_frame_renders() {
        let animation = BubbleAnimation::new(&DriveParameters::default()).unwrap();
        let frame = animation.render_frame(0).unwrap();
        let options = RenderOptions {
            width: 200,
            height: 120,
            ..RenderOptions::bare()
        };
        let image = render_animation_frame(&frame, &options).unwrap();
        assert_eq!(image.dimensions(), (200, 120));
    }

    #[test]
    fn test_level_index_bands() {
        assert_eq!(level_index(0.0, 0.0, 1.0, 50), 0);
        assert_eq!(level_index(1.0, 0.0, 1.0, 50), 49);
        assert_eq!(level_index(0.5, 0.0, 1.0, 50), 25);
        assert_eq!(level_index(0.3, 0.3, 0.3, 50), 0);
        assert_eq!(level_index(f64::NAN, 0.0, 1.0, 50), 0);
    }

    #[test]
    fn test_plasma_endpoints() {
        assert_eq!(plasma(0.0), RGBColor(13, 8, 135));
        assert_eq!(plasma(1.0), RGBColor(240, 249, 33));
        assert_eq!(plasma(0.5), RGBColor(204, 71, 120));
        assert_eq!(plasma(7.0), plasma(1.0));
    }

    #[test]
    fn test_rejects_unusable_options() {
        let field = evaluate_1d(&DriveParameters::default(), AxisRange::default(), 50).unwrap();
        let tiny = RenderOptions {
            width: 4,
            ..RenderOptions::bare()
        };
        assert!(render_line(&field, &tiny).is_err());

        let grid = evaluate_2d(
            &DriveParameters::default(),
            AxisRange::default(),
            AxisRange::default(),
            10,
        )
        .unwrap();
        let no_levels = RenderOptions {
            levels: 0,
            ..RenderOptions::bare()
        };
        assert!(render_contour(&grid, &no_levels).is_err());

        let huge = RenderOptions {
            width: MAX_DIMENSION + 1,
            ..RenderOptions::bare()
        };
        assert!(huge.validate().is_err());
        assert!(render_line(&field, &huge).is_err());
        let largest = RenderOptions {
            width: MAX_DIMENSION,
            height: MAX_DIMENSION,
            ..RenderOptions::bare()
        };
        assert!(largest.validate().is_ok());
    }

    fn plot_pixels(width: u32, height: u32, annotate: bool) -> (i32, i32) {
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        let (_, plot_area, _) = contour_areas(&root, annotate);
        let chart = contour_chart(&plot_area, -10.05..10.05, -10.05..10.05, annotate).unwrap();
        let (xs, ys) = chart.plotting_area().get_pixel_range();
        (xs.end - xs.start, ys.end - ys.start)
    }

    #[test]
    fn test_contour_plotting_region_is_square() {
        for (width, height) in [(800, 600), (320, 240), (600, 900), (1200, 400)] {
            for annotate in [true, false] {
                let (w, h) = plot_pixels(width, height, annotate);
                assert!(w > 0);
                assert_eq!(w, h, "{width}x{height}, annotate = {annotate}");
            }
        }
    }
}
