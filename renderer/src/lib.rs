//! Rendering side of the warp bubble explorer: rasterised plots, the PDF
//! report and GIF animation exports, the action dispatcher shared by the
//! command line and the viewer, and the wgpu viewer window itself.

pub mod actions;
pub mod animation;
pub mod export;
pub mod plots;
pub mod report;
mod texture;
pub mod viewer;

pub use actions::{dispatch, Action, Outcome};
pub use export::ExportError;
pub use plots::RenderOptions;
pub use viewer::{run, ViewerSettings};
