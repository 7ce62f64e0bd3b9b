//! CSV import of uploaded participant tables and the cached snapshot file.

use std::fs;
use std::io::Read;
use std::path::Path;

use super::model::{ParticipantRecord, COLUMNS};
use super::normalizer::{normalize, RawTable};

#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("failed to parse CSV: {0}")]
    Parse(#[from] csv::Error),
    #[error("failed to read CSV data: {0}")]
    Io(#[from] std::io::Error),
    #[error("participant snapshot not found at {0}")]
    SnapshotMissing(String),
}

/// Picks the most frequent of `,` `;` and tab on the header line, preferring comma on ties.
fn sniff_delimiter(buffer: &[u8]) -> u8 {
    let header_line = buffer.split(|b| *b == b'\n').next().unwrap_or_default();
    let candidates = [b',', b';', b'\t'];
    let mut best = (b',', 0usize);
    for candidate in candidates {
        let count = header_line.iter().filter(|b| **b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Reads a CSV into a raw table. Rows may have any length.
pub fn read_table<R: Read>(mut reader: R) -> Result<RawTable, CsvError> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    // UTF-8 BOM from spreadsheet exports
    let data = buffer.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&buffer[..]);

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(data))
        .flexible(true)
        .has_headers(true)
        .from_reader(data);

    let header: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    if header.iter().all(|name| name.trim().is_empty()) && rows.is_empty() {
        return Ok(RawTable::default());
    }
    Ok(RawTable::new(header, rows))
}

/// Reads and normalizes an uploaded CSV.
pub fn read_participants<R: Read>(reader: R) -> Result<Vec<ParticipantRecord>, CsvError> {
    Ok(normalize(&read_table(reader)?))
}

/// Writes the five-column snapshot, header included even when there are no rows.
pub fn write_snapshot(path: &Path, records: &[ParticipantRecord]) -> Result<(), CsvError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.write_record(record.cells())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<Vec<ParticipantRecord>, CsvError> {
    if !path.exists() {
        return Err(CsvError::SnapshotMissing(path.display().to_string()));
    }
    read_participants(fs::File::open(path)?)
}
