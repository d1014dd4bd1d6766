use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::models::ChartKind;
use crate::scoring::TitleMode;

use super::rank_feed::{self, RankFeedPayload};
use super::stream_table::{self, RowError};

/// Which of the two streaming snapshots a problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SnapshotSide {
    Current,
    Previous,
}

impl std::fmt::Display for SnapshotSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotSide::Current => f.write_str("current"),
            SnapshotSide::Previous => f.write_str("previous"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChartDataError {
    #[error("unrecognised chart date {0:?}")]
    InvalidDate(String),

    #[error("{snapshot} snapshot, {source}")]
    Table {
        snapshot: SnapshotSide,
        #[source]
        source: RowError,
    },
}

/// One song on a chart, keyed for matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartEntry {
    pub match_key: String,
    pub title: String,
    pub artist: String,
    pub rank: u32,
    pub peak_rank: Option<u32>,
    pub last_week_rank: Option<u32>,
    pub weeks_on_chart: Option<u32>,
    pub streams: Option<u64>,
}

/// Normalized, immutable view of a chart for one date.
#[derive(Debug, Clone)]
pub struct ChartSnapshot {
    kind: ChartKind,
    date: NaiveDate,
    entries: Vec<ChartEntry>,
    index: HashMap<String, usize>,
}

impl ChartSnapshot {
    /// Build a snapshot, keeping source order. When two entries share a match
    /// key the first one wins.
    pub fn new(kind: ChartKind, date: NaiveDate, entries: Vec<ChartEntry>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            index.entry(entry.match_key.clone()).or_insert(i);
        }

        Self {
            kind,
            date,
            entries,
            index,
        }
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn title_mode(&self) -> TitleMode {
        self.kind.title_mode()
    }

    pub fn entries(&self) -> &[ChartEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, match_key: &str) -> Option<&ChartEntry> {
        self.index.get(match_key).map(|&i| &self.entries[i])
    }
}

/// The snapshot a round is scored against, plus the prior period for
/// streaming charts.
#[derive(Debug, Clone)]
pub struct ChartPair {
    pub current: ChartSnapshot,
    pub previous: Option<ChartSnapshot>,
}

impl ChartPair {
    pub fn single(current: ChartSnapshot) -> Self {
        Self {
            current,
            previous: None,
        }
    }
}

/// Chart data as delivered by a source, before normalization.
#[derive(Debug, Clone)]
pub enum RawChart {
    RankFeed(RankFeedPayload),
    StreamTables {
        date: NaiveDate,
        current: Vec<u8>,
        previous: Vec<u8>,
        header_rows: usize,
    },
}

/// Normalize raw chart data into snapshots with precomputed match keys.
pub fn adapt(raw: RawChart) -> Result<ChartPair, ChartDataError> {
    match raw {
        RawChart::RankFeed(payload) => {
            let snapshot = rank_feed::into_snapshot(payload)?;
            Ok(ChartPair::single(snapshot))
        }
        RawChart::StreamTables {
            date,
            current,
            previous,
            header_rows,
        } => {
            let current_rows = stream_table::parse_stream_table(&current, header_rows).map_err(
                |source| ChartDataError::Table {
                    snapshot: SnapshotSide::Current,
                    source,
                },
            )?;
            let previous_rows = stream_table::parse_stream_table(&previous, header_rows).map_err(
                |source| ChartDataError::Table {
                    snapshot: SnapshotSide::Previous,
                    source,
                },
            )?;

            Ok(ChartPair {
                current: stream_table::into_snapshot(date, current_rows),
                previous: Some(stream_table::into_snapshot(
                    date - Duration::days(1),
                    previous_rows,
                )),
            })
        }
    }
}
