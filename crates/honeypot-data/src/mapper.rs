//! Attack-type code → label translation.

use std::collections::BTreeMap;

use honeypot_core::error::AnalyticsError;
use honeypot_core::models::{EventTable, ProtocolCode};
use honeypot_core::protocols::ProtocolMapping;
use tracing::warn;

use crate::quality::{DataQualityReport, DropReason};

/// Label every event in `table` using `mapping`.
///
/// See [`map_types_with_report`].
pub fn map_types(table: EventTable, mapping: &ProtocolMapping) -> EventTable {
    map_types_with_report(table, mapping).0
}

/// Label every event in `table` using `mapping`.
///
/// Events whose code is not in the mapping stay in the table with no label
/// and are counted as [`DropReason::UnknownProtocolCode`]; the typed views
/// skip them. `protocol_code` is never modified.
pub fn map_types_with_report(
    table: EventTable,
    mapping: &ProtocolMapping,
) -> (EventTable, DataQualityReport) {
    let mut report = DataQualityReport::new();
    let mut unknown: BTreeMap<ProtocolCode, u64> = BTreeMap::new();

    let mapped: EventTable = table
        .into_iter()
        .map(|mut event| {
            event.protocol_label = match event.protocol_code {
                Some(code) => match mapping.label(code) {
                    Ok(label) => Some(label.to_string()),
                    Err(_) => {
                        report.record(DropReason::UnknownProtocolCode);
                        *unknown.entry(code).or_insert(0) += 1;
                        None
                    }
                },
                None => None,
            };
            event
        })
        .collect();

    for (code, n) in &unknown {
        warn!(
            "{}: {} events excluded from typed views",
            AnalyticsError::UnknownProtocolCode(*code),
            n
        );
    }

    (mapped, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use honeypot_core::models::Event;

    fn event(code: Option<u16>) -> Event {
        Event {
            datetime: "3/3/13 21:53".to_string(),
            timestamp: None,
            host: "hostA".to_string(),
            source_ip: "1.2.3.4".to_string(),
            transport: "ICMP".to_string(),
            protocol_code: code.map(ProtocolCode),
            protocol_label: None,
            source_port: Some(0),
            dest_port: Some(0),
            country: Some("US".to_string()),
            latitude: None,
            longitude: None,
        }
    }

    fn tcp_udp() -> ProtocolMapping {
        ProtocolMapping::new([(1, "TCP"), (2, "UDP"), (3, "ICMP")]).unwrap()
    }

    #[test]
    fn test_map_types_adds_labels_and_keeps_codes() {
        let table = EventTable::from(vec![event(Some(1)), event(Some(3))]);
        let mapped = map_types(table, &tcp_udp());

        let labels: Vec<Option<&str>> = mapped
            .iter()
            .map(|e| e.protocol_label.as_deref())
            .collect();
        assert_eq!(labels, vec![Some("TCP"), Some("ICMP")]);
        assert_eq!(mapped.events()[0].protocol_code, Some(ProtocolCode(1)));
    }

    #[test]
    fn test_map_types_default_mapping() {
        let mapped = map_types(EventTable::from(vec![event(Some(8))]), &ProtocolMapping::default());
        assert_eq!(
            mapped.events()[0].protocol_label.as_deref(),
            Some("Echo Request (ICMP)")
        );
    }

    #[test]
    fn test_unknown_code_is_kept_unlabelled_and_counted() {
        let table = EventTable::from(vec![event(Some(1)), event(Some(42)), event(Some(42))]);
        let (mapped, report) = map_types_with_report(table, &tcp_udp());

        assert_eq!(mapped.len(), 3);
        assert_eq!(mapped.events()[1].protocol_label, None);
        assert_eq!(mapped.events()[1].protocol_code, Some(ProtocolCode(42)));
        assert_eq!(report.count(DropReason::UnknownProtocolCode), 2);
        assert_eq!(report.rows_dropped(), 0);
    }

    #[test]
    fn test_missing_code_left_unlabelled_without_count() {
        let (mapped, report) = map_types_with_report(EventTable::from(vec![event(None)]), &tcp_udp());
        assert_eq!(mapped.events()[0].protocol_label, None);
        assert!(report.is_clean());
    }

    #[test]
    fn test_remapping_replaces_stale_label() {
        let mut stale = event(Some(2));
        stale.protocol_label = Some("old".to_string());
        let mapped = map_types(EventTable::from(vec![stale]), &tcp_udp());
        assert_eq!(mapped.events()[0].protocol_label.as_deref(), Some("UDP"));
    }
}
