use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Numeric attack-type code as recorded in the honeypot log's `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolCode(pub u16);

impl fmt::Display for ProtocolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single attack record read from a honeypot CSV log.
///
/// Fields that the source may leave blank are `Option`s. After cleaning,
/// `timestamp`, `protocol_code`, `source_port`, `dest_port` and `country`
/// are always `Some`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The `datetime` cell exactly as read.
    pub datetime: String,
    /// Parsed wall-clock time of the attack, in the log's own timezone.
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    /// Sensor that recorded the attack.
    pub host: String,
    /// Attacking address.
    pub source_ip: String,
    /// Transport protocol name from the `proto` column (e.g. `"ICMP"`).
    #[serde(default)]
    pub transport: String,
    /// Attack-type code from the `type` column.
    #[serde(default)]
    pub protocol_code: Option<ProtocolCode>,
    /// Human-readable label for `protocol_code`, set by the type mapper.
    #[serde(default)]
    pub protocol_label: Option<String>,
    #[serde(default)]
    pub source_port: Option<u16>,
    #[serde(default)]
    pub dest_port: Option<u16>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Event {
    /// Both coordinates, when present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Calendar day of the parsed timestamp.
    pub fn day(&self) -> Option<NaiveDate> {
        self.timestamp.map(|ts| ts.date())
    }
}

/// Ordered collection of [`Event`]s in source-file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTable {
    events: Vec<Event>,
}

impl EventTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Append every event of `other`, keeping its order after ours.
    pub fn extend(&mut self, other: EventTable) {
        self.events.extend(other.events);
    }
}

impl From<Vec<Event>> for EventTable {
    fn from(events: Vec<Event>) -> Self {
        Self { events }
    }
}

impl FromIterator<Event> for EventTable {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for EventTable {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a EventTable {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

// ── Aggregate views ───────────────────────────────────────────────────────────

/// One attack origin for the geographic scatter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Number of attacks seen on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: u64,
}

/// Fraction of typed attacks carrying one protocol label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolShare {
    pub label: String,
    pub count: u64,
    /// `count` divided by the number of typed events, in `0.0..=1.0`.
    pub share: f64,
}

/// Attack counts keyed by host, then by protocol label.
///
/// Every host carries the same label set; labels a host never saw are
/// present with a count of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostTypeCounts {
    hosts: BTreeMap<String, BTreeMap<String, u64>>,
}

impl HostTypeCounts {
    /// Build from sparse `(host, label) -> count` pairs, zero-filling every
    /// label that appears under any host.
    pub fn from_sparse(sparse: BTreeMap<(String, String), u64>) -> Self {
        let labels: BTreeSet<&String> = sparse.keys().map(|(_, label)| label).collect();

        let mut hosts: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
        for (host, _) in sparse.keys() {
            hosts.entry(host.clone()).or_insert_with(|| {
                labels.iter().map(|label| ((*label).clone(), 0)).collect()
            });
        }
        for ((host, label), count) in &sparse {
            if let Some(row) = hosts.get_mut(host) {
                row.insert(label.clone(), *count);
            }
        }

        Self { hosts }
    }

    /// Host names in ascending order.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(String::as_str)
    }

    /// The shared label set, ascending. Empty when there are no hosts.
    pub fn labels(&self) -> Vec<&str> {
        self.hosts
            .values()
            .next()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Label counts for one host.
    pub fn row(&self, host: &str) -> Option<&BTreeMap<String, u64>> {
        self.hosts.get(host)
    }

    /// Count for a `(host, label)` pair; `None` if either is unknown.
    pub fn get(&self, host: &str, label: &str) -> Option<u64> {
        self.hosts.get(host).and_then(|row| row.get(label)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, u64>)> {
        self.hosts.iter()
    }
}

/// The four chart-ready tables derived from a cleaned, typed [`EventTable`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateViews {
    pub geo_points: Vec<GeoPoint>,
    pub daily_counts: Vec<DailyCount>,
    pub protocol_shares: Vec<ProtocolShare>,
    pub host_type_counts: HostTypeCounts,
}
