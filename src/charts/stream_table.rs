use chrono::NaiveDate;
use thiserror::Error;

use crate::models::ChartKind;
use crate::scoring::match_key;

use super::snapshot::{ChartEntry, ChartSnapshot};

// Fixed column layout of the daily streaming CSV.
const COL_PLACE: usize = 0;
const COL_TITLE: usize = 1;
const COL_ARTIST: usize = 2;
const COL_STREAMS: usize = 3;
const COL_URL: usize = 4;

/// A row that could not be turned into a chart entry. Stream counts are used
/// as denominators, so bad cells are rejected rather than zeroed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("line {line}: missing column `{column}`")]
    MissingCell { line: u64, column: &'static str },

    #[error("line {line}: column `{column}` is not an integer: {value:?}")]
    InvalidCell {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: {reason}")]
    Unreadable { line: u64, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRow {
    pub place: u32,
    pub title: String,
    pub artist: String,
    pub streams: u64,
    pub url: String,
}

fn cell<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    column: &'static str,
    line: u64,
) -> Result<&'r str, RowError> {
    record
        .get(index)
        .ok_or(RowError::MissingCell { line, column })
}

fn integer_cell<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    column: &'static str,
    line: u64,
) -> Result<T, RowError> {
    let raw = cell(record, index, column, line)?;
    raw.parse().map_err(|_| RowError::InvalidCell {
        line,
        column,
        value: raw.to_string(),
    })
}

/// Parse a streaming chart table, skipping `header_rows` leading lines.
/// Blank lines are ignored.
pub fn parse_stream_table(raw: &[u8], header_rows: usize) -> Result<Vec<StreamRow>, RowError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw);

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate().skip(header_rows) {
        let fallback_line = i as u64 + 1;
        let record = record.map_err(|e| RowError::Unreadable {
            line: e.position().map(|p| p.line()).unwrap_or(fallback_line),
            reason: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        rows.push(StreamRow {
            place: integer_cell(&record, COL_PLACE, "place", line)?,
            title: cell(&record, COL_TITLE, "title", line)?.to_string(),
            artist: cell(&record, COL_ARTIST, "artist", line)?.to_string(),
            streams: integer_cell(&record, COL_STREAMS, "streams", line)?,
            url: record.get(COL_URL).unwrap_or_default().to_string(),
        });
    }

    Ok(rows)
}

pub fn into_snapshot(date: NaiveDate, rows: Vec<StreamRow>) -> ChartSnapshot {
    let mode = ChartKind::StreamTable.title_mode();

    let entries = rows
        .into_iter()
        .map(|row| ChartEntry {
            match_key: match_key(&row.artist, &row.title, mode),
            rank: row.place,
            peak_rank: None,
            last_week_rank: None,
            weeks_on_chart: None,
            streams: Some(row.streams),
            title: row.title,
            artist: row.artist,
        })
        .collect();

    ChartSnapshot::new(ChartKind::StreamTable, date, entries)
}
