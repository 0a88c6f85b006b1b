use std::path::PathBuf;
use thiserror::Error;

use crate::models::ProtocolCode;

/// All errors produced by the honeypot analytics pipeline.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV header is missing one or more required columns.
    #[error("Missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    /// An attack-type code has no entry in the configured protocol mapping.
    #[error("Unknown protocol code: {0}")]
    UnknownProtocolCode(ProtocolCode),

    /// A datetime string did not match any configured format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// A CSV document could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed or serialized.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The input path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No CSV files were found under the given directory.
    #[error("No CSV files found in {0}")]
    NoDataFiles(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the analytics crates.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = AnalyticsError::FileRead {
            path: PathBuf::from("/data/attacks.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/attacks.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_schema_lists_columns() {
        let err = AnalyticsError::Schema {
            missing: vec!["host".to_string(), "dpt".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required columns: host, dpt");
    }

    #[test]
    fn test_error_display_unknown_protocol_code() {
        let err = AnalyticsError::UnknownProtocolCode(ProtocolCode(42));
        assert_eq!(err.to_string(), "Unknown protocol code: 42");
    }

    #[test]
    fn test_error_display_timestamp_parse() {
        let err = AnalyticsError::TimestampParse("not-a-date".to_string());
        assert_eq!(err.to_string(), "Invalid timestamp format: not-a-date");
    }

    #[test]
    fn test_error_display_no_data_files() {
        let err = AnalyticsError::NoDataFiles(PathBuf::from("/empty/dir"));
        assert_eq!(err.to_string(), "No CSV files found in /empty/dir");
    }

    #[test]
    fn test_error_display_config() {
        let err = AnalyticsError::Config("bad protocol code".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad protocol code");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AnalyticsError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: AnalyticsError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
