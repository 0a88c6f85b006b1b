//! Report emitters and the JSON view writer.

use std::fs;
use std::path::{Path, PathBuf};

use honeypot_core::error::Result;
use honeypot_data::analysis::AnalysisReport;
use serde::Serialize;
use tracing::{debug, info};

/// File names written by [`JsonReportEmitter`], in write order.
pub const GEO_POINTS_FILE: &str = "geo_points.json";
pub const DAILY_COUNTS_FILE: &str = "daily_counts.json";
pub const PROTOCOL_SHARES_FILE: &str = "protocol_shares.json";
pub const HOST_TYPE_COUNTS_FILE: &str = "host_type_counts.json";
pub const DATA_QUALITY_FILE: &str = "data_quality.json";

/// A sink for one finished [`AnalysisReport`].
pub trait ReportEmitter {
    fn emit(&mut self, report: &AnalysisReport) -> Result<()>;
}

// ── JsonReportEmitter ─────────────────────────────────────────────────────────

/// Writes the four chart-ready views plus the data-quality summary as
/// pretty-printed JSON files into one directory.
///
/// These are the tables behind the map scatter, daily line chart, protocol
/// pie chart and per-host grouped bar chart.
#[derive(Debug, Clone)]
pub struct JsonReportEmitter {
    output_dir: PathBuf,
}

impl JsonReportEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

impl ReportEmitter for JsonReportEmitter {
    fn emit(&mut self, report: &AnalysisReport) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;

        let views = &report.views;
        self.write_json(GEO_POINTS_FILE, &views.geo_points)?;
        self.write_json(DAILY_COUNTS_FILE, &views.daily_counts)?;
        self.write_json(PROTOCOL_SHARES_FILE, &views.protocol_shares)?;
        self.write_json(HOST_TYPE_COUNTS_FILE, &views.host_type_counts)?;
        self.write_json(DATA_QUALITY_FILE, &report.quality)?;

        info!("Wrote chart views to {}", self.output_dir.display());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
