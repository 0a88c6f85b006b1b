//! Missing-value resolution and timestamp parsing.
//!
//! Each null-prone column has its own rule:
//!
//! | column     | when null                                      |
//! |------------|------------------------------------------------|
//! | `spt`      | fill with [`CleaningPolicy::missing_port`]     |
//! | `dpt`      | fill with [`CleaningPolicy::missing_port`]     |
//! | `type`     | drop the row                                   |
//! | `country`  | fill with [`CleaningPolicy::unknown_country`]  |
//! | `datetime` | drop the row when it does not parse            |
//!
//! Each column is resolved by its own method.

use honeypot_core::data_processors::TimestampParser;
use honeypot_core::models::{Event, EventTable, ProtocolCode};
use honeypot_core::settings::{AnalysisConfig, CleaningPolicy};
use tracing::{debug, warn};

use crate::quality::{DataQualityReport, DropReason};

/// Applies the per-column null policies to an [`EventTable`].
#[derive(Debug, Clone)]
pub struct Cleaner {
    policy: CleaningPolicy,
    timestamps: TimestampParser,
}

impl Cleaner {
    pub fn new(policy: CleaningPolicy, timestamps: TimestampParser) -> Self {
        Self { policy, timestamps }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.cleaning.clone(), config.timestamp_parser())
    }

    /// Clean `table`, discarding the per-reason drop counts.
    pub fn clean(&self, table: EventTable) -> EventTable {
        self.clean_with_report(table).0
    }

    /// Clean `table`, returning the retained rows in their original order
    /// together with the number of rows dropped per reason.
    pub fn clean_with_report(&self, table: EventTable) -> (EventTable, DataQualityReport) {
        let input_len = table.len();
        let mut report = DataQualityReport::new();

        let cleaned: EventTable = table
            .into_iter()
            .filter_map(|event| match self.clean_event(event) {
                Ok(event) => Some(event),
                Err(reason) => {
                    report.record(reason);
                    None
                }
            })
            .collect();

        if !report.is_clean() {
            warn!(
                "Cleaner dropped {} of {} rows ({} missing type, {} unparsable timestamp)",
                report.rows_dropped(),
                input_len,
                report.count(DropReason::MissingType),
                report.count(DropReason::UnparsableTimestamp),
            );
        }
        debug!("Cleaner retained {} of {} rows", cleaned.len(), input_len);

        (cleaned, report)
    }

    /// Resolve every null-prone field of one event, or say why it goes.
    pub fn clean_event(&self, mut event: Event) -> Result<Event, DropReason> {
        event.protocol_code = Some(self.resolve_type(event.protocol_code)?);

        event.timestamp = match event.timestamp {
            Some(ts) => Some(ts),
            None => match self.timestamps.parse(&event.datetime) {
                Ok(ts) => Some(ts),
                Err(e) => {
                    debug!("Dropping row from {}: {}", event.host, e);
                    return Err(DropReason::UnparsableTimestamp);
                }
            },
        };

        event.source_port = Some(self.resolve_source_port(event.source_port));
        event.dest_port = Some(self.resolve_dest_port(event.dest_port));
        event.country = Some(self.resolve_country(event.country));
        Ok(event)
    }

    /// `type`: required.
    pub fn resolve_type(&self, code: Option<ProtocolCode>) -> Result<ProtocolCode, DropReason> {
        code.ok_or(DropReason::MissingType)
    }

    /// `spt`: missing for non-TCP/UDP traffic.
    pub fn resolve_source_port(&self, port: Option<u16>) -> u16 {
        port.unwrap_or(self.policy.missing_port)
    }

    pub fn resolve_dest_port(&self, port: Option<u16>) -> u16 {
        port.unwrap_or(self.policy.missing_port)
    }

    /// `country`: blank counts as missing.
    pub fn resolve_country(&self, country: Option<String>) -> String {
        match country {
            Some(c) if !c.trim().is_empty() => c,
            _ => self.policy.unknown_country.clone(),
        }
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(CleaningPolicy::default(), TimestampParser::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn raw_event(datetime: &str, code: Option<u16>) -> Event {
        Event {
            datetime: datetime.to_string(),
            timestamp: None,
            host: "groucho-oregon".to_string(),
            source_ip: "61.131.218.218".to_string(),
            transport: "ICMP".to_string(),
            protocol_code: code.map(ProtocolCode),
            protocol_label: None,
            source_port: None,
            dest_port: None,
            country: None,
            latitude: None,
            longitude: None,
        }
    }

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn assert_fully_resolved(table: &EventTable) {
        for e in table {
            assert!(e.timestamp.is_some());
            assert!(e.protocol_code.is_some());
            assert!(e.source_port.is_some());
            assert!(e.dest_port.is_some());
            assert!(e.country.is_some());
        }
    }

    // ── Column rules ──────────────────────────────────────────────────────────

    #[test]
    fn test_resolve_type_drops_null() {
        let cleaner = Cleaner::default();
        assert_eq!(cleaner.resolve_type(None), Err(DropReason::MissingType));
        assert_eq!(cleaner.resolve_type(Some(ProtocolCode(8))), Ok(ProtocolCode(8)));
    }

    #[test]
    fn test_resolve_ports_fill_with_policy_value() {
        let cleaner = Cleaner::new(
            CleaningPolicy {
                missing_port: 9,
                ..CleaningPolicy::default()
            },
            TimestampParser::default(),
        );
        assert_eq!(cleaner.resolve_source_port(None), 9);
        assert_eq!(cleaner.resolve_dest_port(None), 9);
        assert_eq!(cleaner.resolve_source_port(Some(22)), 22);
        assert_eq!(cleaner.resolve_dest_port(Some(445)), 445);
    }

    #[test]
    fn test_resolve_country_fills_unknown() {
        let cleaner = Cleaner::default();
        assert_eq!(cleaner.resolve_country(None), "Unknown");
        assert_eq!(cleaner.resolve_country(Some("  ".to_string())), "Unknown");
        assert_eq!(cleaner.resolve_country(Some("Japan".to_string())), "Japan");
    }

    #[test]
    fn test_resolve_country_uses_configured_sentinel() {
        let cleaner = Cleaner::new(
            CleaningPolicy {
                unknown_country: "ZZ".to_string(),
                ..CleaningPolicy::default()
            },
            TimestampParser::default(),
        );
        assert_eq!(cleaner.resolve_country(None), "ZZ");
    }

    #[test]
    fn test_missing_country_does_not_drop_row() {
        let cleaner = Cleaner::default();
        let event = cleaner.clean_event(raw_event("3/3/13 21:53", Some(8))).unwrap();
        assert_eq!(event.country.as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_missing_ports_do_not_drop_row() {
        let cleaner = Cleaner::default();
        let event = cleaner.clean_event(raw_event("3/3/13 21:53", Some(8))).unwrap();
        assert_eq!(event.source_port, Some(0));
        assert_eq!(event.dest_port, Some(0));
    }

    // ── clean ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_clean_parses_timestamp() {
        let cleaner = Cleaner::default();
        let event = cleaner.clean_event(raw_event("3/3/13 21:53", Some(8))).unwrap();
        assert_eq!(event.timestamp, Some(ts(2013, 3, 3, 21, 53)));
    }

    #[test]
    fn test_clean_drops_unparsable_timestamp() {
        let cleaner = Cleaner::default();
        let result = cleaner.clean_event(raw_event("not a date", Some(8)));
        assert_eq!(result, Err(DropReason::UnparsableTimestamp));
    }

    #[test]
    fn test_clean_counts_per_reason_and_preserves_order() {
        let cleaner = Cleaner::default();
        let mut rows = vec![
            raw_event("3/3/13 21:53", Some(8)),
            raw_event("3/3/13 21:54", None),
            raw_event("garbage", Some(8)),
            raw_event("3/4/13 01:00", Some(0)),
        ];
        rows[0].host = "first".to_string();
        rows[3].host = "last".to_string();

        let (cleaned, report) = cleaner.clean_with_report(EventTable::from(rows));

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.events()[0].host, "first");
        assert_eq!(cleaned.events()[1].host, "last");
        assert_eq!(report.count(DropReason::MissingType), 1);
        assert_eq!(report.count(DropReason::UnparsableTimestamp), 1);
        assert_fully_resolved(&cleaned);
    }

    #[test]
    fn test_clean_missing_type_wins_over_bad_timestamp() {
        let cleaner = Cleaner::default();
        let (_, report) = cleaner.clean_with_report(EventTable::from(vec![raw_event("??", None)]));
        assert_eq!(report.count(DropReason::MissingType), 1);
        assert_eq!(report.count(DropReason::UnparsableTimestamp), 0);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let cleaner = Cleaner::default();
        let table = EventTable::from(vec![
            raw_event("3/3/13 21:53", Some(8)),
            raw_event("3/3/13 21:54", None),
            raw_event("2013-03-05 10:00:00", Some(3)),
        ]);

        let once = cleaner.clean(table);
        let (twice, report) = cleaner.clean_with_report(once.clone());

        assert_eq!(once, twice);
        assert!(report.is_clean());
    }

    #[test]
    fn test_clean_round_trips_fully_populated_table() {
        let cleaner = Cleaner::default();
        let populated: EventTable = (0..5)
            .map(|i| Event {
                datetime: format!("2013-03-0{} 12:00:00", i + 1),
                timestamp: Some(ts(2013, 3, i + 1, 12, 0)),
                host: format!("host-{}", i),
                source_ip: "10.0.0.1".to_string(),
                transport: "TCP".to_string(),
                protocol_code: Some(ProtocolCode(i as u16)),
                protocol_label: None,
                source_port: Some(1024 + i as u16),
                dest_port: Some(22),
                country: Some("Germany".to_string()),
                latitude: Some(51.0),
                longitude: None,
            })
            .collect();

        assert_eq!(cleaner.clean(populated.clone()), populated);
    }

    #[test]
    fn test_clean_empty_table() {
        let (cleaned, report) = Cleaner::default().clean_with_report(EventTable::new());
        assert!(cleaned.is_empty());
        assert!(report.is_clean());
    }
}
