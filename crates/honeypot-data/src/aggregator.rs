//! Chart-ready views over a cleaned, labelled [`EventTable`].
//!
//! Every function here is pure: it reads the table and returns a fresh
//! view. Events without a protocol label are left out of
//! [`EventAggregator::protocol_shares`] and
//! [`EventAggregator::host_type_counts`] but still count everywhere else.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use honeypot_core::models::{
    AggregateViews, DailyCount, EventTable, GeoPoint, HostTypeCounts, ProtocolShare,
};

/// Stateless helper that derives the four aggregate views.
pub struct EventAggregator;

impl EventAggregator {
    /// Compute all four views.
    pub fn aggregate(table: &EventTable) -> AggregateViews {
        AggregateViews {
            geo_points: Self::geo_points(table),
            daily_counts: Self::daily_counts(table),
            protocol_shares: Self::protocol_shares(table),
            host_type_counts: Self::host_type_counts(table),
        }
    }

    /// Coordinates of every event that has both latitude and longitude, in
    /// table order.
    pub fn geo_points(table: &EventTable) -> Vec<GeoPoint> {
        table
            .iter()
            .filter_map(|e| e.coordinates())
            .map(|(latitude, longitude)| GeoPoint {
                latitude,
                longitude,
            })
            .collect()
    }

    /// Events per calendar day, ascending.
    ///
    /// Only days that have at least one event appear; gaps are not filled.
    pub fn daily_counts(table: &EventTable) -> Vec<DailyCount> {
        let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for day in table.iter().filter_map(|e| e.day()) {
            *days.entry(day).or_insert(0) += 1;
        }
        days.into_iter()
            .map(|(day, count)| DailyCount { day, count })
            .collect()
    }

    /// Share of labelled events per protocol label.
    ///
    /// Ordered by count descending, then label ascending. Empty when no
    /// event carries a label.
    pub fn protocol_shares(table: &EventTable) -> Vec<ProtocolShare> {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for label in table.iter().filter_map(|e| e.protocol_label.as_deref()) {
            *counts.entry(label).or_insert(0) += 1;
        }

        let total: u64 = counts.values().sum();
        if total == 0 {
            return Vec::new();
        }

        let mut shares: Vec<ProtocolShare> = counts
            .into_iter()
            .map(|(label, count)| ProtocolShare {
                label: label.to_string(),
                count,
                share: count as f64 / total as f64,
            })
            .collect();
        shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        shares
    }

    /// Labelled events per `(host, label)`, zero-filled so that every host
    /// carries every observed label.
    pub fn host_type_counts(table: &EventTable) -> HostTypeCounts {
        let mut sparse: BTreeMap<(String, String), u64> = BTreeMap::new();
        for event in table.iter() {
            if let Some(label) = &event.protocol_label {
                *sparse
                    .entry((event.host.clone(), label.clone()))
                    .or_insert(0) += 1;
            }
        }
        HostTypeCounts::from_sparse(sparse)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
