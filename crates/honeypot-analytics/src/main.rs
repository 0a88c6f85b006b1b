mod bootstrap;

use anyhow::{Context, Result};
use honeypot_core::settings::{AnalysisConfig, Settings};
use honeypot_data::analysis::analyze;
use honeypot_report::csv_export::CleanedCsvWriter;
use honeypot_report::emitter::{JsonReportEmitter, ReportEmitter};
use honeypot_report::summary::SummaryEmitter;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::ensure_directories(&settings)?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Honeypot Analytics v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Settings: {:?}", settings);

    let config = AnalysisConfig::resolve(settings.config.as_deref())
        .context("failed to load analysis configuration")?;

    let report = analyze(&settings.input, &config).map_err(|e| {
        tracing::error!("Analysis failed: {}", e);
        e
    })?;

    let mut emitters: Vec<Box<dyn ReportEmitter>> =
        vec![Box::new(JsonReportEmitter::new(&settings.output_dir))];
    if let Some(path) = &settings.export_cleaned {
        emitters.push(Box::new(CleanedCsvWriter::new(path)));
    }
    if !settings.quiet {
        emitters.push(Box::new(SummaryEmitter::new(std::io::stdout())));
    }

    for emitter in &mut emitters {
        emitter.emit(&report)?;
    }

    tracing::info!(
        "Done: {} of {} rows retained in {:.2}s",
        report.metadata.rows_retained,
        report.metadata.rows_loaded,
        report.metadata.load_time_seconds
            + report.metadata.transform_time_seconds
            + report.metadata.aggregate_time_seconds
    );

    Ok(())
}
