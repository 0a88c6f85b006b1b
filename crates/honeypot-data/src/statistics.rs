//! Descriptive statistics for the statistics printout.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use honeypot_core::models::EventTable;
use serde::{Deserialize, Serialize};

/// How many labels [`DatasetStatistics::top_labels`] keeps.
pub const TOP_LABELS: usize = 5;

// ── Percentile helper ─────────────────────────────────────────────────────────

/// Compute the `p`-th percentile of a **sorted** slice using linear
/// interpolation between closest ranks.
///
/// Returns `0.0` for an empty slice.
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }
    let len = sorted_data.len();
    if len == 1 {
        return sorted_data[0];
    }
    let rank = (p / 100.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted_data[lo];
    }
    let frac = rank - lo as f64;
    sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo])
}

// ── ColumnSummary ─────────────────────────────────────────────────────────────

/// Count, moments and quartiles of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` for fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Summarise `values`, or `None` when there are none.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count as f64 - 1.0)).sqrt()
        });

        Some(Self {
            count,
            mean,
            std,
            min: values[0],
            p25: percentile(&values, 25.0),
            p50: percentile(&values, 50.0),
            p75: percentile(&values, 75.0),
            max: values[count - 1],
        })
    }
}

// ── DatasetStatistics ─────────────────────────────────────────────────────────

/// Overview of a cleaned, labelled table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub total_entries: usize,
    pub unique_hosts: usize,
    pub first_seen: Option<NaiveDateTime>,
    pub last_seen: Option<NaiveDateTime>,
    /// Most common protocol labels with their counts, most frequent first;
    /// ties are broken by label. Unlabelled events are not counted.
    pub top_labels: Vec<(String, u64)>,
    pub latitude: Option<ColumnSummary>,
    pub longitude: Option<ColumnSummary>,
}

impl DatasetStatistics {
    pub fn compute(table: &EventTable) -> Self {
        let hosts: HashSet<&str> = table.iter().map(|e| e.host.as_str()).collect();
        let first_seen = table.iter().filter_map(|e| e.timestamp).min();
        let last_seen = table.iter().filter_map(|e| e.timestamp).max();

        let mut label_counts: HashMap<&str, u64> = HashMap::new();
        for label in table.iter().filter_map(|e| e.protocol_label.as_deref()) {
            *label_counts.entry(label).or_insert(0) += 1;
        }
        let mut top_labels: Vec<(String, u64)> = label_counts
            .into_iter()
            .map(|(label, n)| (label.to_string(), n))
            .collect();
        top_labels.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_labels.truncate(TOP_LABELS);

        Self {
            total_entries: table.len(),
            unique_hosts: hosts.len(),
            first_seen,
            last_seen,
            top_labels,
            latitude: ColumnSummary::from_values(table.iter().filter_map(|e| e.latitude).collect()),
            longitude: ColumnSummary::from_values(
                table.iter().filter_map(|e| e.longitude).collect(),
            ),
        }
    }
}
