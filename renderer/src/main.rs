use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use warp_renderer::animation::write_gif;
use warp_renderer::export::save_png;
use warp_renderer::{dispatch, Action, Outcome, RenderOptions, ViewerSettings};
use warp_simulation::parameters::{DEFAULT_ENERGY_DENSITY, DEFAULT_MASS};
use warp_simulation::{DriveParameters, Session, SymbolicMetricModel};

/// Explore a toy model of the Alcubierre warp drive
#[derive(Parser, Debug)]
#[command(name = "warp-explorer")]
#[command(author, version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    render: RenderArgs,

    /// Defaults to the interactive viewer
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Explain the Alcubierre drive
    Concept,
    /// Compute the curvature estimate mass / energy density
    Curvature(ParameterArgs),
    /// Summarise a simulated run of the drive
    Simulate(ParameterArgs),
    /// Plot the 1D curvature profile to a PNG file
    Plot1d(FigureArgs),
    /// Plot the 2D curvature map to a PNG file
    Plot2d(FigureArgs),
    /// Write the moving-bubble animation to a GIF file
    Animate {
        #[command(flatten)]
        params: ParameterArgs,
        #[arg(short, long, default_value = "warp_bubble.gif")]
        output: PathBuf,
    },
    /// Print the symbolic analysis of the metric
    Symbolic,
    /// Export the three page PDF report
    Export {
        #[command(flatten)]
        params: ParameterArgs,
        /// Destination; without one the export is cancelled
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Open the interactive viewer window
    View {
        #[command(flatten)]
        params: ParameterArgs,
        /// Destination of the report written with the P key
        #[arg(long)]
        export: Option<PathBuf>,
        /// Change applied per arrow key press
        #[arg(long, default_value_t = 1.0)]
        step: f64,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct ParameterArgs {
    /// Mass in kg
    #[arg(short, long, default_value_t = DEFAULT_MASS)]
    mass: f64,
    /// Energy density in J/m^3
    #[arg(short, long, default_value_t = DEFAULT_ENERGY_DENSITY)]
    energy_density: f64,
}

impl ParameterArgs {
    /// Any positive value is accepted; values outside the slider ranges are
    /// only reported.
    fn parameters(&self) -> Result<DriveParameters> {
        let params = DriveParameters::new(self.mass, self.energy_density)?;
        if !params.within_control_ranges() {
            log::warn!(
                "mass {} / energy density {} lie outside the usual ranges \
                 (1..50 kg, 1..100 J/m^3)",
                params.mass,
                params.energy_density
            );
        }
        Ok(params)
    }
}

#[derive(Args, Debug)]
struct FigureArgs {
    #[command(flatten)]
    params: ParameterArgs,
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Copy)]
struct RenderArgs {
    /// Figure width in pixels
    #[arg(long, global = true, default_value_t = 800)]
    width: u32,
    /// Figure height in pixels
    #[arg(long, global = true, default_value_t = 600)]
    height: u32,
    /// Leave out titles, axis labels and tick values
    #[arg(long, global = true)]
    no_labels: bool,
}

impl RenderArgs {
    fn options(&self) -> RenderOptions {
        let options = RenderOptions {
            width: self.width,
            height: self.height,
            ..RenderOptions::default()
        };
        if self.no_labels {
            options.without_annotations()
        } else {
            options
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let options = cli.render.options();
    let command = cli.command.unwrap_or(Command::View {
        params: ParameterArgs {
            mass: DEFAULT_MASS,
            energy_density: DEFAULT_ENERGY_DENSITY,
        },
        export: None,
        step: 1.0,
    });

    match command {
        Command::Concept => show(&mut Session::new(), Action::ShowConcept, &options),
        Command::Curvature(args) => {
            show(&mut Session::new(), Action::ComputeCurvature(args.parameters()?), &options)
        }
        Command::Simulate(args) => {
            show(&mut Session::new(), Action::SimulateDrive(args.parameters()?), &options)
        }
        Command::Plot1d(args) => {
            let output = args.output.unwrap_or_else(|| PathBuf::from("curvature_1d.png"));
            let mut session = Session::with_parameters(args.params.parameters()?);
            save_figure(&mut session, Action::PlotLine, &options, &output)
        }
        Command::Plot2d(args) => {
            let output = args.output.unwrap_or_else(|| PathBuf::from("curvature_2d.png"));
            let mut session = Session::with_parameters(args.params.parameters()?);
            save_figure(&mut session, Action::PlotContour, &options, &output)
        }
        Command::Animate { params, output } => {
            let mut session = Session::with_parameters(params.parameters()?);
            match dispatch(&mut session, &SymbolicMetricModel::new(), Action::Animate, &options)? {
                Outcome::Animation(animation) => {
                    write_gif(&animation, &options, &output)?;
                    println!("Animation saved to {}", output.display());
                    Ok(())
                }
                other => bail!("unexpected outcome {:?}", other),
            }
        }
        Command::Symbolic => show(&mut Session::new(), Action::SymbolicAnalysis, &options),
        Command::Export { params, output } => {
            let mut session = Session::with_parameters(params.parameters()?);
            show(&mut session, Action::ExportPdf(output), &options)
        }
        Command::View {
            params,
            export,
            step,
        } => {
            if !(step.is_finite() && step > 0.0) {
                bail!("step must be a positive number, got {step}");
            }
            let settings = ViewerSettings {
                initial: params.parameters()?,
                mass_step: step,
                energy_step: step,
                export_path: export,
                render: options,
                ..ViewerSettings::default()
            };
            warp_renderer::run(settings, SymbolicMetricModel::new())
        }
    }
}

/// Dispatch `action` and print its textual outcome.
fn show(session: &mut Session, action: Action, options: &RenderOptions) -> Result<()> {
    let model = SymbolicMetricModel::new();
    match dispatch(session, &model, action, options)? {
        Outcome::Text { title, body } => println!("== {title} ==\n{body}"),
        Outcome::Exported(path) => println!("Report saved to {}", path.display()),
        Outcome::Cancelled => println!("Export cancelled: no destination given (use --output)"),
        other => bail!("unexpected outcome {:?}", other),
    }
    Ok(())
}

fn save_figure(
    session: &mut Session,
    action: Action,
    options: &RenderOptions,
    output: &Path,
) -> Result<()> {
    match dispatch(session, &SymbolicMetricModel::new(), action, options)? {
        Outcome::Figure { title, image } => {
            save_png(&image, output)?;
            println!("{title} saved to {}", output.display());
            Ok(())
        }
        other => bail!("unexpected outcome {:?}", other),
    }
}
