use anyhow::Result;
use image::RgbImage;
use warp_simulation::{
    evaluate_1d, evaluate_2d, AxisRange, DriveParameters, SymbolicMetricModel, GRID_RESOLUTION,
    LINE_RESOLUTION,
};

use crate::plots::{render_contour, render_line, RenderOptions, CONTOUR_TITLE, LINE_TITLE};

pub const REPORT_TITLE: &str = "Alcubierre warp bubble report";
const TEXT_PAGE_TITLE: &str = "Symbolic model";
/// Characters per line on the text page.
const WRAP_WIDTH: usize = 140;
/// Expressions longer than this many wrapped lines are cut short.
const MAX_EXPRESSION_LINES: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    LinePlot,
    ContourPlot,
    Text,
}

#[derive(Debug, Clone)]
pub enum ReportPage {
    Figure {
        kind: PageKind,
        title: String,
        image: RgbImage,
    },
    /// Headed blocks of pre-wrapped lines
    Text {
        title: String,
        sections: Vec<(String, Vec<String>)>,
    },
}

impl ReportPage {
    pub fn kind(&self) -> PageKind {
        match self {
            ReportPage::Figure { kind, .. } => *kind,
            ReportPage::Text { .. } => PageKind::Text,
        }
    }
}

/// The exported document: 1D plot, 2D plot, then the symbolic text page.
#[derive(Debug, Clone)]
pub struct Report {
    title: String,
    pages: Vec<ReportPage>,
}

impl Report {
    pub fn assemble(
        params: &DriveParameters,
        model: &SymbolicMetricModel,
        options: &RenderOptions,
    ) -> Result<Self> {
        let line = evaluate_1d(params, AxisRange::default(), LINE_RESOLUTION)?;
        let grid = evaluate_2d(
            params,
            AxisRange::default(),
            AxisRange::default(),
            GRID_RESOLUTION,
        )?;

        let pages = vec![
            ReportPage::Figure {
                kind: PageKind::LinePlot,
                title: LINE_TITLE.to_string(),
                image: render_line(&line, options)?,
            },
            ReportPage::Figure {
                kind: PageKind::ContourPlot,
                title: CONTOUR_TITLE.to_string(),
                image: render_contour(&grid, options)?,
            },
            symbolic_page(model),
        ];
        Ok(Self {
            title: REPORT_TITLE.to_string(),
            pages,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pages(&self) -> &[ReportPage] {
        &self.pages
    }

    pub fn kinds(&self) -> Vec<PageKind> {
        self.pages.iter().map(ReportPage::kind).collect()
    }
}

fn symbolic_page(model: &SymbolicMetricModel) -> ReportPage {
    let metric = format!("ds^2 = {}", model.metric_line_element());
    let condition = model.negative_energy_condition().to_string();
    ReportPage::Text {
        title: TEXT_PAGE_TITLE.to_string(),
        sections: vec![
            ("1D Alcubierre metric:".to_string(), expression_lines(&metric)),
            ("Condition for rho < 0:".to_string(), expression_lines(&condition)),
        ],
    }
}

fn expression_lines(text: &str) -> Vec<String> {
    let mut lines = wrap_text(text, WRAP_WIDTH);
    if lines.len() > MAX_EXPRESSION_LINES {
        log::debug!("truncating expression of {} lines on the text page", lines.len());
        lines.truncate(MAX_EXPRESSION_LINES);
        lines.push("...".to_string());
    }
    lines
}

/// Greedy word wrap; words wider than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let current_len = current.chars().count();
        if !current.is_empty() && current_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_pages_are_ordered() {
        let options = RenderOptions {
            width: 100,
            height: 80,
            ..RenderOptions::bare()
        };
        let model = SymbolicMetricModel::new();
        let report = Report::assemble(&DriveParameters::default(), &model, &options).unwrap();
        assert_eq!(report.pages().len(), 3);
        assert_eq!(
            report.kinds(),
            vec![PageKind::LinePlot, PageKind::ContourPlot, PageKind::Text]
        );

        let ReportPage::Text { sections, .. } = &report.pages()[2] else {
            panic!("last page should be text");
        };
        assert!(sections[0].1[0].starts_with("ds^2 = "));
        assert!(sections[0].1.concat().contains("vs"));
        assert!(sections[1].1.len() <= MAX_EXPRESSION_LINES + 1);
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("a bb ccc dddd", 6), vec!["a bb", "ccc", "dddd"]);
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert_eq!(wrap_text("x abcdefg", 4), vec!["x", "abcd", "efg"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn test_expression_lines_are_truncated() {
        let long = "term + ".repeat(1000);
        let lines = expression_lines(&long);
        assert_eq!(lines.len(), MAX_EXPRESSION_LINES + 1);
        assert_eq!(lines.last().map(String::as_str), Some("..."));
    }
}
