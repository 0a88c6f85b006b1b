//! CSV discovery and loading for honeypot attack logs.
//!
//! Maps each CSV row onto an [`Event`] without cleaning it. Blank cells
//! become `None`; everything else is left for the cleaner.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use csv::StringRecord;
use honeypot_core::data_processors::{Cell, FieldParser};
use honeypot_core::error::{AnalyticsError, Result};
use honeypot_core::models::{Event, EventTable, ProtocolCode};
use regex::Regex;
use tracing::{debug, warn};

// ── Columns ───────────────────────────────────────────────────────────────────

/// The logical columns every honeypot log must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Datetime,
    Host,
    SourceIp,
    Proto,
    Type,
    SourcePort,
    DestPort,
    Country,
    Latitude,
    Longitude,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Datetime,
        Column::Host,
        Column::SourceIp,
        Column::Proto,
        Column::Type,
        Column::SourcePort,
        Column::DestPort,
        Column::Country,
        Column::Latitude,
        Column::Longitude,
    ];

    /// Canonical header name, used in schema errors.
    pub fn name(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Accepted header spellings, in order of preference.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::Datetime => &["datetime"],
            Column::Host => &["host"],
            Column::SourceIp => &["src_ip", "srcstr", "src"],
            Column::Proto => &["proto"],
            Column::Type => &["type"],
            Column::SourcePort => &["spt"],
            Column::DestPort => &["dpt"],
            Column::Country => &["country"],
            Column::Latitude => &["lat", "latitude"],
            Column::Longitude => &["long", "longitude", "lon"],
        }
    }
}

/// Position of each [`Column`] in a particular file's header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    positions: [usize; 10],
}

impl ColumnIndex {
    /// Resolve every required column against `headers`.
    ///
    /// Fails with [`AnalyticsError::Schema`] naming each column for which no
    /// alias is present.
    pub fn resolve(headers: &StringRecord) -> Result<Self> {
        let names: Vec<&str> = headers.iter().map(str::trim).collect();

        for name in names.iter().filter(|n| is_index_column(n)) {
            debug!("Ignoring index column \"{}\"", name);
        }

        let mut positions = [0usize; 10];
        let mut missing = Vec::new();
        for (slot, column) in positions.iter_mut().zip(Column::ALL) {
            let found = column
                .aliases()
                .iter()
                .find_map(|alias| names.iter().position(|n| n == alias));
            match found {
                Some(pos) => *slot = pos,
                None => missing.push(column.name().to_string()),
            }
        }

        if missing.is_empty() {
            Ok(Self { positions })
        } else {
            Err(AnalyticsError::Schema { missing })
        }
    }

    fn get<'r>(&self, record: &'r StringRecord, column: Column) -> &'r str {
        let pos = self.positions[column as usize];
        record.get(pos).unwrap_or("")
    }
}

/// `true` for headers pandas writes for an unnamed index (`"Unnamed: 15"`)
/// and for blank headers.
fn is_index_column(name: &str) -> bool {
    static INDEX_HEADER: OnceLock<Regex> = OnceLock::new();
    let re = INDEX_HEADER.get_or_init(|| Regex::new(r"^Unnamed: \d+$").expect("regex is valid"));
    name.is_empty() || re.is_match(name)
}

// ── LoadedTable ───────────────────────────────────────────────────────────────

/// An [`EventTable`] plus bookkeeping about how it was read.
#[derive(Debug, Clone, Default)]
pub struct LoadedTable {
    pub table: EventTable,
    /// CSV files that contributed rows.
    pub files_read: usize,
    /// Records the CSV reader could not decode; they are skipped.
    pub malformed_records: u64,
    /// Non-empty cells that did not fit their field's type; read as null.
    pub invalid_cells: u64,
}

impl LoadedTable {
    fn absorb(&mut self, other: LoadedTable) {
        self.table.extend(other.table);
        self.files_read += other.files_read;
        self.malformed_records += other.malformed_records;
        self.invalid_cells += other.invalid_cells;
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read the CSV at `path` into an [`EventTable`].
pub fn load(path: &Path) -> Result<EventTable> {
    Ok(load_file(path)?.table)
}

/// Read `path`, dispatching to [`load_dir`] when it is a directory.
pub fn load_input(path: &Path) -> Result<LoadedTable> {
    if path.is_dir() {
        load_dir(path)
    } else {
        load_file(path)
    }
}

/// Find all `.csv` files recursively under `data_path`, sorted by path.
pub fn find_csv_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every CSV file under `dir`, concatenated in path order.
pub fn load_dir(dir: &Path) -> Result<LoadedTable> {
    if !dir.exists() {
        return Err(AnalyticsError::DataPathNotFound(dir.to_path_buf()));
    }
    let files = find_csv_files(dir);
    if files.is_empty() {
        return Err(AnalyticsError::NoDataFiles(dir.to_path_buf()));
    }

    let mut loaded = LoadedTable::default();
    for file in &files {
        loaded.absorb(load_file(file)?);
    }

    debug!(
        "Loaded {} events from {} files under {}",
        loaded.table.len(),
        files.len(),
        dir.display()
    );
    Ok(loaded)
}

/// Load a single CSV file.
///
/// Fails with [`AnalyticsError::FileRead`] when the file cannot be opened
/// or read and with [`AnalyticsError::Schema`] when required columns are
/// absent. Undecodable records are skipped and counted.
pub fn load_file(path: &Path) -> Result<LoadedTable> {
    let file = std::fs::File::open(path).map_err(|source| AnalyticsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .clone();
    let index = ColumnIndex::resolve(&headers)?;

    let mut loaded = LoadedTable {
        files_read: 1,
        ..LoadedTable::default()
    };

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(csv_error(path, e)),
            Err(e) => {
                warn!("Skipping malformed record in {}: {}", path.display(), e);
                loaded.malformed_records += 1;
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let (event, invalid) = map_to_event(&record, &index, path, line);
        loaded.invalid_cells += invalid;
        loaded.table.push(event);
    }

    debug!(
        "File {}: {} events, {} malformed records, {} invalid cells",
        path.display(),
        loaded.table.len(),
        loaded.malformed_records,
        loaded.invalid_cells,
    );

    Ok(loaded)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Surface an I/O failure inside the CSV reader as a file-read error.
fn csv_error(path: &Path, err: csv::Error) -> AnalyticsError {
    if err.is_io_error() {
        AnalyticsError::FileRead {
            path: path.to_path_buf(),
            source: err.into(),
        }
    } else {
        AnalyticsError::Csv(err)
    }
}

/// Collapse a typed cell to an `Option`, warning about and counting cells
/// that were present but unreadable.
fn checked<T>(
    cell: Cell<T>,
    column: Column,
    record: &StringRecord,
    index: &ColumnIndex,
    origin: (&Path, u64),
    invalid: &mut u64,
) -> Option<T> {
    if cell.is_invalid() {
        warn!(
            "{}:{}: unreadable {} value \"{}\"; treating as missing",
            origin.0.display(),
            origin.1,
            column.name(),
            index.get(record, column).trim()
        );
        *invalid += 1;
    }
    cell.value()
}

/// Map one record to an [`Event`], returning the number of cells that had
/// to be read as null because they did not fit their type.
fn map_to_event(record: &StringRecord, index: &ColumnIndex, path: &Path, line: u64) -> (Event, u64) {
    let mut invalid = 0u64;
    let origin = (path, line);
    let raw = |column: Column| index.get(record, column);

    let protocol_code = checked(
        FieldParser::integer::<u16>(raw(Column::Type)),
        Column::Type,
        record,
        index,
        origin,
        &mut invalid,
    )
    .map(ProtocolCode);
    let source_port = checked(
        FieldParser::integer::<u16>(raw(Column::SourcePort)),
        Column::SourcePort,
        record,
        index,
        origin,
        &mut invalid,
    );
    let dest_port = checked(
        FieldParser::integer::<u16>(raw(Column::DestPort)),
        Column::DestPort,
        record,
        index,
        origin,
        &mut invalid,
    );
    let latitude = checked(
        FieldParser::float(raw(Column::Latitude)),
        Column::Latitude,
        record,
        index,
        origin,
        &mut invalid,
    );
    let longitude = checked(
        FieldParser::float(raw(Column::Longitude)),
        Column::Longitude,
        record,
        index,
        origin,
        &mut invalid,
    );

    let event = Event {
        datetime: raw(Column::Datetime).trim().to_string(),
        timestamp: None,
        host: FieldParser::text(raw(Column::Host)).unwrap_or_default(),
        source_ip: FieldParser::text(raw(Column::SourceIp)).unwrap_or_default(),
        transport: FieldParser::text(raw(Column::Proto)).unwrap_or_default(),
        protocol_code,
        protocol_label: None,
        source_port,
        dest_port,
        country: FieldParser::text(raw(Column::Country)),
        latitude,
        longitude,
    };

    (event, invalid)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
