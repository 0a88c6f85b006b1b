//! Export of the cleaned, labelled event table as CSV.

use std::io::Write;
use std::path::{Path, PathBuf};

use honeypot_core::error::Result;
use honeypot_core::models::{Event, EventTable};
use honeypot_data::analysis::AnalysisReport;
use serde::Serialize;
use tracing::info;

use crate::emitter::ReportEmitter;

/// Timestamp layout used in the exported `datetime` column.
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One output row, borrowing from the event it describes.
#[derive(Debug, Serialize)]
struct CleanedRow<'a> {
    datetime: String,
    host: &'a str,
    src_ip: &'a str,
    proto: &'a str,
    #[serde(rename = "type")]
    protocol_code: Option<u16>,
    type_label: Option<&'a str>,
    spt: Option<u16>,
    dpt: Option<u16>,
    country: Option<&'a str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl<'a> From<&'a Event> for CleanedRow<'a> {
    fn from(event: &'a Event) -> Self {
        let datetime = match event.timestamp {
            Some(ts) => ts.format(EXPORT_TIMESTAMP_FORMAT).to_string(),
            None => event.datetime.clone(),
        };
        Self {
            datetime,
            host: &event.host,
            src_ip: &event.source_ip,
            proto: &event.transport,
            protocol_code: event.protocol_code.map(|c| c.0),
            type_label: event.protocol_label.as_deref(),
            spt: event.source_port,
            dpt: event.dest_port,
            country: event.country.as_deref(),
            latitude: event.latitude,
            longitude: event.longitude,
        }
    }
}

/// Serialise `table` as CSV with a header row into `writer`.
///
/// Returns the number of data rows written.
pub fn write_table<W: Write>(table: &EventTable, writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for event in table {
        csv_writer.serialize(CleanedRow::from(event))?;
    }
    csv_writer.flush()?;
    Ok(table.len())
}

/// Writes the cleaned table of each report to a fixed CSV path.
#[derive(Debug, Clone)]
pub struct CleanedCsvWriter {
    path: PathBuf,
}

impl CleanedCsvWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportEmitter for CleanedCsvWriter {
    fn emit(&mut self, report: &AnalysisReport) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(&self.path)?;
        let rows = write_table(&report.table, std::io::BufWriter::new(file))?;
        info!("Exported {} cleaned rows to {}", rows, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::tests::{make_event, sample_report};
    use tempfile::TempDir;

    #[test]
    fn test_write_table_header_and_rows() {
        let mut event = make_event("2013-03-03 21:53", "groucho-oregon", 8, Some((28.55, 115.93)));
        event.protocol_label = Some("Echo Request (ICMP)".to_string());
        event.source_port = Some(0);
        event.dest_port = Some(0);
        let table = EventTable::from(vec![event]);

        let mut buf = Vec::new();
        let rows = write_table(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(rows, 1);
        assert_eq!(
            lines[0],
            "datetime,host,src_ip,proto,type,type_label,spt,dpt,country,latitude,longitude"
        );
        assert_eq!(
            lines[1],
            "2013-03-03 21:53:00,groucho-oregon,61.131.218.218,ICMP,8,Echo Request (ICMP),0,0,China,28.55,115.93"
        );
    }

    #[test]
    fn test_write_table_unlabelled_and_missing_fields_are_blank() {
        let table = EventTable::from(vec![make_event("2013-03-03 21:53", "h", 99, None)]);

        let mut buf = Vec::new();
        write_table(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text.lines().nth(1).unwrap(),
            "2013-03-03 21:53:00,h,61.131.218.218,ICMP,99,,,,China,,"
        );
    }

    #[test]
    fn test_write_empty_table_has_no_rows() {
        let mut buf = Vec::new();
        assert_eq!(write_table(&EventTable::new(), &mut buf).unwrap(), 0);
        assert!(String::from_utf8(buf).unwrap().lines().count() <= 1);
    }

    #[test]
    fn test_cleaned_csv_writer_emits_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out").join("cleaned.csv");
        let report = sample_report();

        CleanedCsvWriter::new(&path).emit(&report).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), report.table.len() + 1);
        assert!(text.contains("Echo Reply (ICMP)"));
    }
}
