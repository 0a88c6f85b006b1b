//! Data-quality bookkeeping for recoverable pipeline issues.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a row was dropped from the table or excluded from typed aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The CSV reader could not decode the record. Dropped.
    MalformedRecord,
    /// The `type` cell was empty. Dropped.
    MissingType,
    /// No configured format matched the `datetime` cell. Dropped.
    UnparsableTimestamp,
    /// The `type` code has no label. Kept, but excluded from the
    /// protocol-share and host/type views.
    UnknownProtocolCode,
}

impl DropReason {
    /// Whether rows with this reason are removed from the table entirely.
    pub fn removes_row(&self) -> bool {
        !matches!(self, DropReason::UnknownProtocolCode)
    }

    pub fn description(&self) -> &'static str {
        match self {
            DropReason::MalformedRecord => "malformed CSV record",
            DropReason::MissingType => "missing attack type",
            DropReason::UnparsableTimestamp => "unparsable timestamp",
            DropReason::UnknownProtocolCode => "unknown protocol code",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Per-reason counts of dropped or excluded rows for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityReport {
    /// Rows affected, by reason. Reasons that never occurred are absent.
    pub counts: BTreeMap<DropReason, u64>,
    /// Cells that were present but unreadable and so treated as missing.
    pub invalid_cells: u64,
}

impl DataQualityReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, reason: DropReason) {
        self.record_many(reason, 1);
    }

    pub fn record_many(&mut self, reason: DropReason, n: u64) {
        if n > 0 {
            *self.counts.entry(reason).or_insert(0) += n;
        }
    }

    pub fn count(&self, reason: DropReason) -> u64 {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    /// Rows removed from the table.
    pub fn rows_dropped(&self) -> u64 {
        self.counts
            .iter()
            .filter(|(reason, _)| reason.removes_row())
            .map(|(_, n)| n)
            .sum()
    }

    /// Rows kept but left out of the typed views.
    pub fn rows_excluded(&self) -> u64 {
        self.count(DropReason::UnknownProtocolCode)
    }

    /// `true` when no row was dropped or excluded.
    pub fn is_clean(&self) -> bool {
        self.counts.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: &DataQualityReport) {
        for (reason, n) in &other.counts {
            self.record_many(*reason, *n);
        }
        self.invalid_cells += other.invalid_cells;
    }
}
