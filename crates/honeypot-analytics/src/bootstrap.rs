use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use honeypot_core::settings::Settings;
use tracing::Subscriber;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure every directory the run will write into exists.
///
/// Creates (including any missing parents):
/// - the report output directory
/// - the parent of `--export-cleaned`, if given
/// - the parent of `--log-file`, if given
pub fn ensure_directories(settings: &Settings) -> anyhow::Result<()> {
    std::fs::create_dir_all(&settings.output_dir)?;
    for file in [&settings.export_cleaned, &settings.log_file]
        .into_iter()
        .flatten()
    {
        if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name to a tracing filter directive.
///
/// Unrecognised names are passed through unchanged so that full
/// `EnvFilter` directives also work.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Open `path` for appending, creating it if absent.
pub fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Build the `tracing` subscriber without installing it.
///
/// Logs go to stderr, or, with `log_file` set, are appended to that file
/// without ANSI colours instead. Falls back to `"info"` if the level string
/// is not a valid filter.
pub fn build_subscriber(
    log_level: &str,
    log_file: Option<&Path>,
) -> anyhow::Result<impl Subscriber + Send + Sync + 'static> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (stderr_layer, file_layer) = match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (None, Some(layer))
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr);
            (Some(layer), None)
        }
    };

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer))
}

/// Initialise the global `tracing` subscriber; see [`build_subscriber`].
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    build_subscriber(log_level, log_file)?.try_init()?;
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
