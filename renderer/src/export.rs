use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::RgbImage;
use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument, PdfLayerReference};
use thiserror::Error;

use crate::report::{Report, ReportPage};

/// A4 landscape
const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const PAGE_MARGIN_MM: f32 = 15.0;
const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 9.0;
const LINE_SPACING_MM: f32 = 4.5;
const MM_PER_INCH: f32 = 25.4;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not render figure: {0:#}")]
    Render(anyhow::Error),
    #[error("could not build PDF document: {0}")]
    Pdf(String),
    #[error("could not encode image: {0}")]
    Image(#[from] image::ImageError),
}

impl ExportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn pdf(err: impl std::fmt::Debug) -> Self {
        ExportError::Pdf(format!("{err:?}"))
    }
}

/// Write through a sibling partial file and move it into place once
/// `write` succeeded, so `destination` is either complete or untouched.
pub(crate) fn write_atomically<F>(destination: &Path, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), ExportError>,
{
    let name = destination.file_name().ok_or_else(|| {
        ExportError::io(
            destination,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "destination has no file name"),
        )
    })?;
    let mut partial_name = std::ffi::OsString::from(".");
    partial_name.push(name);
    partial_name.push(".partial");
    let partial = destination.with_file_name(partial_name);

    let file = File::create(&partial).map_err(|e| ExportError::io(destination, e))?;
    let mut writer = BufWriter::new(file);
    let result = write(&mut writer)
        .and_then(|()| writer.flush().map_err(|e| ExportError::io(destination, e)))
        .and_then(|()| {
            drop(writer);
            fs::rename(&partial, destination).map_err(|e| ExportError::io(destination, e))
        });

    if result.is_err() {
        if let Err(err) = fs::remove_file(&partial) {
            if err.kind() != std::io::ErrorKind::NotFound {
                log::warn!("could not remove {}: {}", partial.display(), err);
            }
        }
    }
    result
}

pub fn save_png(figure: &RgbImage, destination: &Path) -> Result<(), ExportError> {
    write_atomically(destination, |writer| {
        figure.write_to(writer, image::ImageFormat::Png)?;
        Ok(())
    })?;
    log::info!("wrote {}", destination.display());
    Ok(())
}

/// One PDF page per report page, in report order.
pub fn write_pdf(report: &Report, destination: &Path) -> Result<(), ExportError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        report.title(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "page 1",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(ExportError::pdf)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(ExportError::pdf)?;

    for (index, page) in report.pages().iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let label = format!("page {}", index + 1);
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), label);
            doc.get_page(page).get_layer(layer)
        };
        match page {
            ReportPage::Figure { image, .. } => place_figure(layer, image),
            ReportPage::Text { title, sections } => {
                let mut y = PAGE_HEIGHT_MM - PAGE_MARGIN_MM;
                layer.use_text(title.as_str(), TITLE_SIZE, Mm(PAGE_MARGIN_MM), Mm(y), &bold);
                y -= 2.0 * LINE_SPACING_MM;
                for (heading, lines) in sections {
                    if y < PAGE_MARGIN_MM {
                        break;
                    }
                    let x = Mm(PAGE_MARGIN_MM);
                    layer.use_text(heading.as_str(), HEADING_SIZE, x, Mm(y), &bold);
                    y -= 1.5 * LINE_SPACING_MM;
                    for line in lines {
                        if y < PAGE_MARGIN_MM {
                            break;
                        }
                        layer.use_text(line.as_str(), BODY_SIZE, Mm(PAGE_MARGIN_MM), Mm(y), &font);
                        y -= LINE_SPACING_MM;
                    }
                    y -= LINE_SPACING_MM;
                }
            }
        }
    }

    write_atomically(destination, |writer| doc.save(writer).map_err(ExportError::pdf))?;
    log::info!("wrote {} page report to {}", report.pages().len(), destination.display());
    Ok(())
}

/// Scale the figure to fit inside the margins and centre it.
fn place_figure(layer: PdfLayerReference, figure: &RgbImage) {
    let (width, height) = figure.dimensions();
    let usable_width = (PAGE_WIDTH_MM - 2.0 * PAGE_MARGIN_MM) / MM_PER_INCH;
    let usable_height = (PAGE_HEIGHT_MM - 2.0 * PAGE_MARGIN_MM) / MM_PER_INCH;
    let dpi = (width as f32 / usable_width).max(height as f32 / usable_height);
    let shown_width = width as f32 / dpi * MM_PER_INCH;
    let shown_height = height as f32 / dpi * MM_PER_INCH;

    let raw = printpdf::image_crate::RgbImage::from_raw(width, height, figure.as_raw().clone());
    let Some(raw) = raw else {
        log::warn!("skipping figure with inconsistent buffer size {}x{}", width, height);
        return;
    };
    let image = Image::from_dynamic_image(&printpdf::image_crate::DynamicImage::ImageRgb8(raw));
    image.add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm((PAGE_WIDTH_MM - shown_width) / 2.0)),
            translate_y: Some(Mm((PAGE_HEIGHT_MM - shown_height) / 2.0)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
}
