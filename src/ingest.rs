// Module for CSV ingestion and validation.
use crate::model::WorkoutSetRecord;
use crate::store::WorkoutStore;
use std::path::Path;
use std::str::FromStr;

/// Columns that must be present for an import to succeed.
pub const REQUIRED_COLUMNS: [&str; 3] = ["title", "start_time", "exercise_title"];

#[derive(Debug)]
pub enum ImportError {
    /// Malformed CSV structure; carries the parser's own message.
    Parse(String),
    /// The file parsed but yielded no data rows.
    EmptyFile,
    /// One or more required columns are absent from the header.
    MissingColumns(Vec<String>),
    /// The persistence layer rejected the write.
    Storage(String),
    /// Anything else, original message included.
    Unexpected(String),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Parse(msg) => write!(f, "Error processing CSV file: {msg}"),
            ImportError::EmptyFile => {
                write!(f, "CSV file is empty or does not contain valid data")
            }
            ImportError::MissingColumns(cols) => {
                write!(f, "Required fields missing in CSV: {}", cols.join(", "))
            }
            ImportError::Storage(msg) => write!(f, "Error saving to workout store: {msg}"),
            ImportError::Unexpected(msg) => write!(f, "Unexpected error: {msg}"),
        }
    }
}

impl std::error::Error for ImportError {}

#[derive(Debug, PartialEq, Eq)]
pub struct ImportOutcome {
    pub records_imported: usize,
}

/// Parse CSV text and replace the store's contents with the result.
///
/// A failure at any step leaves previously stored records untouched; only a
/// persistence failure mid-replace can leave the store empty, and that is
/// reported as [`ImportError::Storage`].
pub fn import_from_str(
    csv_text: &str,
    store: &mut WorkoutStore,
) -> Result<ImportOutcome, ImportError> {
    let records = parse_records(csv_text)?;
    log::info!("Parsed {} rows from CSV", records.len());
    let records_imported = store
        .import_workouts(records)
        .map_err(|e| ImportError::Storage(e.to_string()))?;
    Ok(ImportOutcome { records_imported })
}

/// Read `path` and import its contents. I/O failures while reading the file
/// surface as [`ImportError::Unexpected`].
pub fn import_from_file<P: AsRef<Path>>(
    path: P,
    store: &mut WorkoutStore,
) -> Result<ImportOutcome, ImportError> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ImportError::Unexpected(e.to_string()))?;
    import_from_str(&text, store)
}

/// User-facing status line after a successful import.
pub fn format_import_message(records: usize, filename: &str) -> String {
    format!("Imported {records} records from {filename}")
}

fn parse_records(csv_text: &str) -> Result<Vec<WorkoutSetRecord>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());
    let headers = rdr
        .headers()
        .map_err(|e| ImportError::Parse(e.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        // Any structural error fails the whole import; no partial data.
        let row = result.map_err(|e| ImportError::Parse(e.to_string()))?;
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == **c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing));
    }

    Ok(rows
        .iter()
        .map(|row| record_from_row(&headers, row))
        .collect())
}

fn record_from_row(headers: &csv::StringRecord, row: &csv::StringRecord) -> WorkoutSetRecord {
    let mut record = WorkoutSetRecord::default();
    for (name, value) in headers.iter().zip(row.iter()) {
        match name {
            "title" => record.title = value.to_string(),
            "start_time" => record.start_time = value.to_string(),
            "exercise_title" => record.exercise_title = value.to_string(),
            "set_index" => record.set_index = parse_numeric(value),
            "weight_kg" => record.weight_kg = parse_numeric(value),
            "reps" => record.reps = parse_numeric(value),
            "distance_km" => record.distance_km = parse_numeric(value),
            "duration_seconds" => record.duration_seconds = parse_numeric(value),
            "rpe" => record.rpe = parse_numeric(value),
            other => {
                record.extra.insert(other.to_string(), value.to_string());
            }
        }
    }
    record
}

/// Coerce one numeric cell. Empty or unparseable text becomes `None`,
/// never zero, so "not logged" stays distinguishable from "logged as zero."
fn parse_numeric<T: FromStr>(value: &str) -> Option<T> {
    if value.is_empty() {
        return None;
    }
    value.parse().ok()
}
