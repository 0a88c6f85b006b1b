use crate::error::{AnalyticsError, Result};
use crate::models::ProtocolCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// ICMP message types observed in the honeypot data set, with their labels.
pub const DEFAULT_PROTOCOL_LABELS: &[(u16, &str)] = &[
    (0, "Echo Reply (ICMP)"),
    (3, "Destination Unreachable (ICMP)"),
    (5, "Redirect (ICMP)"),
    (8, "Echo Request (ICMP)"),
    (11, "Time Exceeded (ICMP)"),
    (12, "Timestamp Request (ICMP)"),
    (13, "Timestamp Reply (ICMP)"),
];

/// Lookup from attack-type code to human-readable label.
///
/// The mapping is total over its own domain: every code it contains has a
/// non-empty label. Codes outside the domain are reported as
/// [`AnalyticsError::UnknownProtocolCode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<ProtocolCode, String>", into = "BTreeMap<ProtocolCode, String>")]
pub struct ProtocolMapping {
    labels: BTreeMap<ProtocolCode, String>,
}

impl ProtocolMapping {
    /// Build a mapping from `(code, label)` pairs.
    ///
    /// Fails with [`AnalyticsError::Config`] on an empty label or a code
    /// listed twice with different labels.
    pub fn new<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u16, S)>,
        S: Into<String>,
    {
        let mut labels = BTreeMap::new();
        for (code, label) in pairs {
            let label: String = label.into();
            let label = label.trim().to_string();
            if label.is_empty() {
                return Err(AnalyticsError::Config(format!(
                    "protocol code {} has an empty label",
                    code
                )));
            }
            if let Some(previous) = labels.insert(ProtocolCode(code), label.clone()) {
                if previous != label {
                    return Err(AnalyticsError::Config(format!(
                        "protocol code {} mapped to both \"{}\" and \"{}\"",
                        code, previous, label
                    )));
                }
            }
        }
        Ok(Self { labels })
    }

    /// Resolve `code` to its label.
    pub fn label(&self, code: ProtocolCode) -> Result<&str> {
        self.labels
            .get(&code)
            .map(String::as_str)
            .ok_or(AnalyticsError::UnknownProtocolCode(code))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for ProtocolMapping {
    fn default() -> Self {
        Self {
            labels: DEFAULT_PROTOCOL_LABELS
                .iter()
                .map(|(code, label)| (ProtocolCode(*code), (*label).to_string()))
                .collect(),
        }
    }
}

impl TryFrom<BTreeMap<ProtocolCode, String>> for ProtocolMapping {
    type Error = AnalyticsError;

    fn try_from(map: BTreeMap<ProtocolCode, String>) -> Result<Self> {
        Self::new(map.into_iter().map(|(code, label)| (code.0, label)))
    }
}

impl From<ProtocolMapping> for BTreeMap<ProtocolCode, String> {
    fn from(mapping: ProtocolMapping) -> Self {
        mapping.labels
    }
}
