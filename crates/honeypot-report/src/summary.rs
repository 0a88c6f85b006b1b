//! Plain-text statistics printout.
//!
//! Renders [`DatasetStatistics`] and the data-quality summary in the layout
//! below (values illustrative):
//!
//! ```text
//! =========================
//! Dataset Statistics
//! =========================
//! Total number of entries: 451,581
//! Number of unique hosts: 9
//! Date range: 2013-03-03 21:53:00 to 2013-09-08 05:55:00
//!
//! Most common attack types:
//! Echo Request (ICMP)             12,345
//!
//! Basic statistics for numerical columns:
//!             latitude   longitude
//! count              2           2
//! mean           34.24      116.16
//! ...
//! =========================
//! ```

use std::io::Write;

use honeypot_core::error::Result;
use honeypot_core::formatting::{format_count, format_number, percentage};
use honeypot_data::analysis::AnalysisReport;
use honeypot_data::quality::DataQualityReport;
use honeypot_data::statistics::{ColumnSummary, DatasetStatistics};

use crate::emitter::ReportEmitter;

const RULE: &str = "=========================";
const LABEL_WIDTH: usize = 30;
const STAT_WIDTH: usize = 12;

/// Writes the statistics and data-quality summary as text to `out`.
pub struct SummaryEmitter<W: Write> {
    out: W,
}

impl<W: Write> SummaryEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportEmitter for SummaryEmitter<W> {
    fn emit(&mut self, report: &AnalysisReport) -> Result<()> {
        let mut text = render_statistics(&report.statistics);
        text.push_str(&render_quality(
            &report.quality,
            report.metadata.rows_loaded,
            report.metadata.rows_retained,
        ));
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// The "Dataset Statistics" block.
pub fn render_statistics(stats: &DatasetStatistics) -> String {
    let mut lines = vec![
        RULE.to_string(),
        "Dataset Statistics".to_string(),
        RULE.to_string(),
        format!(
            "Total number of entries: {}",
            format_count(stats.total_entries as u64)
        ),
        format!("Number of unique hosts: {}", stats.unique_hosts),
    ];

    match (stats.first_seen, stats.last_seen) {
        (Some(first), Some(last)) => lines.push(format!("Date range: {} to {}", first, last)),
        _ => lines.push("Date range: n/a".to_string()),
    }

    lines.push(String::new());
    lines.push("Most common attack types:".to_string());
    if stats.top_labels.is_empty() {
        lines.push("(none)".to_string());
    }
    for (label, count) in &stats.top_labels {
        lines.push(format!(
            "{:<width$}{:>stat$}",
            label,
            format_count(*count),
            width = LABEL_WIDTH,
            stat = STAT_WIDTH
        ));
    }

    lines.push(String::new());
    lines.push("Basic statistics for numerical columns:".to_string());
    lines.extend(describe_table(
        stats.latitude.as_ref(),
        stats.longitude.as_ref(),
    ));
    lines.push(RULE.to_string());

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Side-by-side latitude/longitude summary, one statistic per row.
fn describe_table(lat: Option<&ColumnSummary>, lon: Option<&ColumnSummary>) -> Vec<String> {
    let cell = |summary: Option<&ColumnSummary>, pick: fn(&ColumnSummary) -> Option<f64>| {
        summary
            .and_then(pick)
            .map(|v| format_number(v, 2))
            .unwrap_or_else(|| "NaN".to_string())
    };

    let rows: [(&str, fn(&ColumnSummary) -> Option<f64>); 8] = [
        ("count", |s| Some(s.count as f64)),
        ("mean", |s| Some(s.mean)),
        ("std", |s| s.std),
        ("min", |s| Some(s.min)),
        ("25%", |s| Some(s.p25)),
        ("50%", |s| Some(s.p50)),
        ("75%", |s| Some(s.p75)),
        ("max", |s| Some(s.max)),
    ];

    let mut out = vec![format!(
        "{:<6}{:>stat$}{:>stat$}",
        "",
        "latitude",
        "longitude",
        stat = STAT_WIDTH
    )];
    for (name, pick) in rows {
        let (lat_cell, lon_cell) = if name == "count" {
            (
                format_count(lat.map_or(0, |s| s.count as u64)),
                format_count(lon.map_or(0, |s| s.count as u64)),
            )
        } else {
            (cell(lat, pick), cell(lon, pick))
        };
        out.push(format!(
            "{:<6}{:>stat$}{:>stat$}",
            name,
            lat_cell,
            lon_cell,
            stat = STAT_WIDTH
        ));
    }
    out
}

/// The "Data Quality" block.
pub fn render_quality(quality: &DataQualityReport, rows_loaded: usize, rows_retained: usize) -> String {
    let mut lines = vec![
        "Data Quality".to_string(),
        RULE.to_string(),
        format!(
            "Rows retained: {} of {} ({}%)",
            format_count(rows_retained as u64),
            format_count(rows_loaded as u64),
            format_number(percentage(rows_retained as f64, rows_loaded as f64, 1), 1)
        ),
    ];

    if quality.is_clean() {
        lines.push("No rows dropped or excluded".to_string());
    }
    for (reason, count) in &quality.counts {
        let action = if reason.removes_row() {
            "dropped"
        } else {
            "excluded from typed views"
        };
        lines.push(format!(
            "{}: {} {}",
            capitalize(reason.description()),
            format_count(*count),
            action
        ));
    }
    if quality.invalid_cells > 0 {
        lines.push(format!(
            "Unreadable cells treated as missing: {}",
            format_count(quality.invalid_cells)
        ));
    }
    lines.push(RULE.to_string());

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
