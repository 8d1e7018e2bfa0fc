//! Request/response layer between an interaction shell and the model.
//!
//! A shell turns user input into an [`Action`], hands it to [`dispatch`]
//! together with its [`Session`], and shows whatever [`Outcome`] comes back.

use std::path::PathBuf;

use anyhow::Result;
use image::RgbImage;
use warp_simulation::scalar::{curvature_explanation, CONCEPT};
use warp_simulation::{
    estimate, evaluate_1d, evaluate_2d, AxisRange, BubbleAnimation, DriveParameters, ScalarReport,
    Session, SymbolicMetricModel, GRID_RESOLUTION, LINE_RESOLUTION,
};

use crate::export::write_pdf;
use crate::plots::{render_contour, render_line, RenderOptions, CONTOUR_TITLE, LINE_TITLE};
use crate::report::Report;

/// Point at which the symbolic laplacian is reported.
pub const SYMBOLIC_SAMPLE_POINT: (f64, f64, f64, f64) = (2.0, 10.0, 1.0, 0.0);

const SIMULATION_CLOSING: &str =
    "The warp bubble allows apparent superluminal travel without violating relativity.";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ShowConcept,
    ComputeCurvature(DriveParameters),
    SimulateDrive(DriveParameters),
    /// Plot actions use the parameters last recorded in the session.
    PlotLine,
    PlotContour,
    Animate,
    SymbolicAnalysis,
    /// `None` means the user did not pick a destination.
    ExportPdf(Option<PathBuf>),
}

#[derive(Debug)]
pub enum Outcome {
    Text { title: String, body: String },
    Figure { title: String, image: RgbImage },
    /// Frames are rendered by the shell as it plays them.
    Animation(BubbleAnimation),
    Exported(PathBuf),
    Cancelled,
}

pub fn dispatch(
    session: &mut Session,
    model: &SymbolicMetricModel,
    action: Action,
    options: &RenderOptions,
) -> Result<Outcome> {
    log::debug!("dispatching {:?}", action);
    let outcome = match action {
        Action::ShowConcept => Outcome::Text {
            title: "Basic concept".to_string(),
            body: CONCEPT.to_string(),
        },
        Action::ComputeCurvature(params) => {
            let curvature = estimate(params.mass, params.energy_density)?;
            session.record(params);
            Outcome::Text {
                title: "Computed curvature".to_string(),
                body: curvature_explanation(curvature),
            }
        }
        Action::SimulateDrive(params) => {
            let report = ScalarReport::compute(&params)?;
            session.record(params);
            Outcome::Text {
                title: "Drive simulation".to_string(),
                body: format!("{}\n\n{SIMULATION_CLOSING}", report.narrative),
            }
        }
        Action::PlotLine => {
            let field = evaluate_1d(&session.parameters(), AxisRange::default(), LINE_RESOLUTION)?;
            Outcome::Figure {
                title: LINE_TITLE.to_string(),
                image: render_line(&field, options)?,
            }
        }
        Action::PlotContour => {
            let field = evaluate_2d(
                &session.parameters(),
                AxisRange::default(),
                AxisRange::default(),
                GRID_RESOLUTION,
            )?;
            Outcome::Figure {
                title: CONTOUR_TITLE.to_string(),
                image: render_contour(&field, options)?,
            }
        }
        Action::Animate => Outcome::Animation(BubbleAnimation::new(&session.parameters())?),
        Action::SymbolicAnalysis => Outcome::Text {
            title: "Symbolic analysis".to_string(),
            body: symbolic_analysis(model)?,
        },
        Action::ExportPdf(None) => {
            log::info!("export cancelled, no destination chosen");
            Outcome::Cancelled
        }
        Action::ExportPdf(Some(path)) => {
            let report = Report::assemble(&session.parameters(), model, options)?;
            write_pdf(&report, &path)?;
            Outcome::Exported(path)
        }
    };
    Ok(outcome)
}

fn symbolic_analysis(model: &SymbolicMetricModel) -> Result<String> {
    let (radius, steepness, x, y) = SYMBOLIC_SAMPLE_POINT;
    let rho = model.evaluate_laplacian(radius, steepness, x, y)?;
    for degraded in model.degradations() {
        log::warn!("{}", degraded);
    }
    Ok(format!(
        "This symbolic analysis looks at the metric proposed by Miguel Alcubierre in a \
         simplified 1D case, and at the curvature of the field it generates.\n\n\
         Simplified 1D Alcubierre metric:\n  ds^2 = {metric}\n\n\
         This metric describes how spacetime is deformed by the shape function f and the \
         bubble velocity vs.\n\n\
         Laplacian of f evaluated at x={x}, y={y}:\n  \
         rho ~ {rho:.4} (proportional to the required energy density)\n\n\
         Symbolic condition for exotic energy (rho < 0):\n  {condition}\n\n\
         Where the laplacian of f is negative, exotic matter with negative energy density is \
         needed to sustain the warp bubble.\n\
         This is one of the biggest physical obstacles to building such a drive.",
        metric = model.metric_line_element(),
        condition = model.negative_energy_condition(),
    ))
}
