//! SVG chart rendering for reports.

use std::fs;
use std::path::{Path, PathBuf};

use coinvault_core::ReportError;
use plotters::prelude::*;

use crate::views::Report;

pub const INTRODUCTION_CHART: &str = "crypto_introduction.svg";
pub const RANK_CHART: &str = "rank_distribution.svg";

/// File name of the name/symbol table for the top `n` entities.
pub fn top_table_chart(n: usize) -> String {
    format!("top_{}_cryptos_table.svg", n)
}

/// Renders a report into image files.
pub trait ChartRenderer {
    /// Render every chart of `report` into `out_dir`, creating it if needed.
    ///
    /// Returns the paths written.
    fn render(&self, report: &Report<'_>, out_dir: &Path) -> Result<Vec<PathBuf>, ReportError>;
}

/// Writes charts as SVG files with plotters.
#[derive(Debug, Clone, Copy)]
pub struct SvgChartRenderer {
    pub size: (u32, u32),
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self { size: (1200, 700) }
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, report: &Report<'_>, out_dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
        fs::create_dir_all(out_dir).map_err(|e| ReportError::OutputDir {
            path: out_dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let introduction = out_dir.join(INTRODUCTION_CHART);
        self.introduction_chart(report, &introduction)
            .map_err(|reason| render_error(INTRODUCTION_CHART, reason))?;

        let ranks = out_dir.join(RANK_CHART);
        self.rank_chart(report, &ranks)
            .map_err(|reason| render_error(RANK_CHART, reason))?;

        let table_name = top_table_chart(report.top_n);
        let table = out_dir.join(&table_name);
        self.top_table(report, &table)
            .map_err(|reason| render_error(&table_name, reason))?;

        let written = vec![introduction, ranks, table];
        tracing::info!(dir = %out_dir.display(), charts = written.len(), "rendered report charts");
        Ok(written)
    }
}

fn render_error(chart: &str, reason: String) -> ReportError {
    ReportError::Render {
        chart: chart.to_string(),
        reason,
    }
}

/// Bar length for the rank chart; better ranks get longer bars.
fn inverse_rank(rank: i64) -> f64 {
    if rank > 0 {
        1.0 / rank as f64
    } else {
        0.0
    }
}

impl SvgChartRenderer {
    fn introduction_chart(&self, report: &Report<'_>, path: &Path) -> Result<(), String> {
        let root = SVGBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let labels: Vec<String> = report.introductions.keys().map(|ym| ym.to_string()).collect();
        let counts: Vec<usize> = report.introductions.values().copied().collect();
        let max = counts.iter().copied().max().unwrap_or(0) + 1;
        // Segmented ranges need at least one bucket.
        let buckets = labels.len().max(1);

        let mut chart = ChartBuilder::on(&root)
            .caption("Cryptocurrency Introduction Over Time", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(90)
            .y_label_area_size(60)
            .build_cartesian_2d((0usize..buckets).into_segmented(), 0usize..max)
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Year-Month")
            .y_desc("Number of Cryptocurrencies Introduced")
            .x_labels(buckets)
            .x_label_formatter(&|value: &SegmentValue<usize>| match value {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .draw()
            .map_err(|e| e.to_string())?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(BLUE.mix(0.7).filled())
                    .margin(4)
                    .data(counts.iter().enumerate().map(|(i, count)| (i, *count))),
            )
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())
    }

    fn rank_chart(&self, report: &Report<'_>, path: &Path) -> Result<(), String> {
        let root = SVGBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let rows: Vec<(String, f64)> = report
            .top
            .iter()
            .map(|row| (row.name.clone(), inverse_rank(row.rank)))
            .collect();
        let slots = rows.len().max(1);

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Rank Distribution of Top {} Cryptocurrencies", rows.len()),
                ("sans-serif", 28),
            )
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(160)
            .build_cartesian_2d(0f64..1.1f64, (0usize..slots).into_segmented())
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .x_desc("Inverse Rank")
            .y_labels(slots)
            .y_label_formatter(&|value: &SegmentValue<usize>| match value {
                SegmentValue::CenterOf(i) => {
                    rows.get(*i).map(|(name, _)| name.clone()).unwrap_or_default()
                }
                _ => String::new(),
            })
            .draw()
            .map_err(|e| e.to_string())?;

        chart
            .draw_series(
                Histogram::horizontal(&chart)
                    .style(GREEN.mix(0.7).filled())
                    .margin(4)
                    .data(rows.iter().enumerate().map(|(i, (_, value))| (i, *value))),
            )
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())
    }

    fn top_table(&self, report: &Report<'_>, path: &Path) -> Result<(), String> {
        const ROW_HEIGHT: i32 = 40;
        const LEFT: i32 = 60;
        const SYMBOL_COLUMN: i32 = 700;

        let (width, _) = self.size;
        let height = (ROW_HEIGHT * (report.names.len() as i32 + 3)) as u32;
        let root = SVGBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let header = ("sans-serif", 22).into_font().style(FontStyle::Bold);
        let body = ("sans-serif", 20).into_font();
        let right = width as i32 - LEFT;

        root.draw(&Text::new(
            format!("Top {} Cryptocurrencies", report.names.len()),
            (LEFT, ROW_HEIGHT / 2),
            ("sans-serif", 26).into_font(),
        ))
        .map_err(|e| e.to_string())?;

        let mut y = ROW_HEIGHT * 2;
        root.draw(&Text::new("Name", (LEFT, y), header.clone()))
            .map_err(|e| e.to_string())?;
        root.draw(&Text::new("Symbol", (SYMBOL_COLUMN, y), header))
            .map_err(|e| e.to_string())?;

        for entry in &report.names {
            let rule = y + ROW_HEIGHT - 10;
            root.draw(&PathElement::new(
                vec![(LEFT, rule), (right, rule)],
                BLACK.stroke_width(1),
            ))
            .map_err(|e| e.to_string())?;

            y += ROW_HEIGHT;
            root.draw(&Text::new(entry.name.to_string(), (LEFT, y), body.clone()))
                .map_err(|e| e.to_string())?;
            root.draw(&Text::new(entry.symbol.to_string(), (SYMBOL_COLUMN, y), body.clone()))
                .map_err(|e| e.to_string())?;
        }

        root.present().map_err(|e| e.to_string())
    }
}
