use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::data_processors::{TimestampParser, DEFAULT_TIMESTAMP_FORMATS};
use crate::error::{AnalyticsError, Result};
use crate::protocols::ProtocolMapping;

/// Country recorded for events whose `country` cell is blank.
pub const DEFAULT_UNKNOWN_COUNTRY: &str = "Unknown";

/// Port recorded for events whose `spt`/`dpt` cell is blank.
pub const DEFAULT_MISSING_PORT: u16 = 0;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Descriptive analytics over honeypot attack logs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "honeypot-analytics",
    about = "Descriptive analytics over honeypot attack logs",
    version
)]
pub struct Settings {
    /// CSV file, or a directory searched recursively for CSV files
    pub input: PathBuf,

    /// Analysis configuration file (JSON)
    #[arg(long, env = "HONEYPOT_ANALYTICS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory that receives the chart-ready JSON views
    #[arg(long, default_value = "report")]
    pub output_dir: PathBuf,

    /// Also write the cleaned, labelled events to this CSV file
    #[arg(long)]
    pub export_cleaned: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Do not print the statistics summary
    #[arg(long)]
    pub quiet: bool,
}

impl Settings {
    /// Parse CLI arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`Settings::load`] but with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Settings::try_parse_from(args).map(Self::resolve)
    }

    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── CleaningPolicy ─────────────────────────────────────────────────────────────

/// Fill values used by the cleaner for columns that are defaulted rather
/// than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningPolicy {
    pub unknown_country: String,
    pub missing_port: u16,
}

impl Default for CleaningPolicy {
    fn default() -> Self {
        Self {
            unknown_country: DEFAULT_UNKNOWN_COUNTRY.to_string(),
            missing_port: DEFAULT_MISSING_PORT,
        }
    }
}

// ── AnalysisConfig ─────────────────────────────────────────────────────────────

/// Analysis configuration, read from `config.json`.
///
/// Every field is optional in the file; missing fields take the built-in
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Attack-type code → label lookup.
    pub protocol_labels: ProtocolMapping,
    pub cleaning: CleaningPolicy,
    /// `strftime` patterns for the `datetime` column, tried in order.
    pub timestamp_formats: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            protocol_labels: ProtocolMapping::default(),
            cleaning: CleaningPolicy::default(),
            timestamp_formats: DEFAULT_TIMESTAMP_FORMATS
                .iter()
                .map(|f| (*f).to_string())
                .collect(),
        }
    }
}

impl AnalysisConfig {
    /// Default location: `<config dir>/honeypot-analytics/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("honeypot-analytics").join("config.json"))
    }

    /// Load from `explicit` when given (a missing file is a
    /// [`AnalyticsError::Config`] error), else from
    /// [`AnalysisConfig::default_path`] when that file exists, else
    /// defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(AnalyticsError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No analysis config found; using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate the config at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AnalyticsError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AnalysisConfig = serde_json::from_str(&content).map_err(|e| {
            AnalyticsError::Config(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        debug!("Loaded analysis config from {}", path.display());
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.protocol_labels.is_empty() {
            return Err(AnalyticsError::Config(
                "protocol_labels must map at least one code".to_string(),
            ));
        }
        if self.timestamp_formats.is_empty() {
            return Err(AnalyticsError::Config(
                "timestamp_formats must list at least one pattern".to_string(),
            ));
        }
        if self.cleaning.unknown_country.trim().is_empty() {
            return Err(AnalyticsError::Config(
                "cleaning.unknown_country must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Timestamp parser for the configured formats.
    pub fn timestamp_parser(&self) -> TimestampParser {
        TimestampParser::new(self.timestamp_formats.clone())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProtocolCode;
    use tempfile::TempDir;

    // ── Settings ──────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::load_from_args(["honeypot-analytics", "attacks.csv"]).unwrap();

        assert_eq!(settings.input, PathBuf::from("attacks.csv"));
        assert!(settings.config.is_none());
        assert_eq!(settings.output_dir, PathBuf::from("report"));
        assert!(settings.export_cleaned.is_none());
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.quiet);
    }

    #[test]
    fn test_settings_debug_overrides_log_level() {
        let settings = Settings::load_from_args([
            "honeypot-analytics",
            "attacks.csv",
            "--log-level",
            "ERROR",
            "--debug",
        ])
        .unwrap();
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_settings_requires_input() {
        assert!(Settings::load_from_args(["honeypot-analytics"]).is_err());
    }

    #[test]
    fn test_settings_rejects_unknown_log_level() {
        let result =
            Settings::load_from_args(["honeypot-analytics", "a.csv", "--log-level", "LOUD"]);
        assert!(result.is_err());
    }

    // ── AnalysisConfig ────────────────────────────────────────────────────────

    #[test]
    fn test_config_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.cleaning.unknown_country, "Unknown");
        assert_eq!(config.cleaning.missing_port, 0);
        assert_eq!(config.protocol_labels, ProtocolMapping::default());
        assert_eq!(config.timestamp_formats.len(), DEFAULT_TIMESTAMP_FORMATS.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_file_fills_defaults() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "protocol_labels": { "1": "TCP", "2": "UDP", "3": "ICMP" } }"#,
        )
        .unwrap();

        let config = AnalysisConfig::load_from(&path).unwrap();

        assert_eq!(config.protocol_labels.len(), 3);
        assert_eq!(config.protocol_labels.label(ProtocolCode(2)).unwrap(), "UDP");
        assert_eq!(config.cleaning, CleaningPolicy::default());
    }

    #[test]
    fn test_config_missing_explicit_file_is_error() {
        let tmp = TempDir::new().expect("tempdir");
        let err = AnalysisConfig::resolve(Some(&tmp.path().join("absent.json"))).unwrap_err();
        assert!(matches!(err, AnalyticsError::Config(_)));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_config_invalid_json_is_config_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = AnalysisConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, AnalyticsError::Config(_)));
    }

    #[test]
    fn test_config_rejects_empty_mapping() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{ "protocol_labels": {} }"#).unwrap();
        let err = AnalysisConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("protocol_labels"));
    }

    #[test]
    fn test_config_rejects_blank_country_sentinel() {
        let mut config = AnalysisConfig::default();
        config.cleaning.unknown_country = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timestamp_parser_uses_configured_formats() {
        let config = AnalysisConfig {
            timestamp_formats: vec!["%d.%m.%Y %H:%M".to_string()],
            ..AnalysisConfig::default()
        };
        let parser = config.timestamp_parser();
        assert_eq!(parser.formats(), &["%d.%m.%Y %H:%M".to_string()]);
    }
}
