use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::TitleMode;

/// Which kind of external chart a round is scored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Weekly ranked feed carrying last-week / peak / weeks-on-chart metadata.
    RankFeed,
    /// Daily streaming chart published as a CSV table with raw stream counts.
    StreamTable,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::RankFeed => "rank_feed",
            ChartKind::StreamTable => "stream_table",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rank_feed" => Some(ChartKind::RankFeed),
            "stream_table" => Some(ChartKind::StreamTable),
            _ => None,
        }
    }

    /// Streaming charts append "(feat. X)" to titles, predictions usually don't.
    pub fn title_mode(&self) -> TitleMode {
        match self {
            ChartKind::RankFeed => TitleMode::Full,
            ChartKind::StreamTable => TitleMode::StripSuffix,
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Weekly,
    Daily,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Weekly => "weekly",
            Cadence::Daily => "daily",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "weekly" => Some(Cadence::Weekly),
            "daily" => Some(Cadence::Daily),
            _ => None,
        }
    }

    pub fn period(&self) -> Duration {
        match self {
            Cadence::Weekly => Duration::days(7),
            Cadence::Daily => Duration::days(1),
        }
    }
}

/// One named chart and the round currently open on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartRound {
    pub id: Uuid,
    pub name: String,
    pub kind: ChartKind,
    /// Identifier understood by the chart source, e.g. "hot-100" or "global".
    pub chart_key: String,
    pub cadence: Cadence,
    /// Currency deducted per submitted slate.
    pub cost: Decimal,
    pub prize_pool: Decimal,
    pub round_date: NaiveDate,
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
}

/// Open/close window of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub round_date: NaiveDate,
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
}

impl ChartRound {
    pub fn schedule(&self) -> Schedule {
        Schedule {
            round_date: self.round_date,
            opens_at: self.opens_at,
            closes_at: self.closes_at,
        }
    }

    /// The schedule of the round that follows the current one.
    pub fn next_schedule(&self) -> Schedule {
        let period = self.cadence.period();
        Schedule {
            round_date: self.round_date + period,
            opens_at: self.opens_at + period,
            closes_at: self.closes_at + period,
        }
    }

    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        self.closes_at <= now
    }
}
