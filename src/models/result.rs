use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ChartKind;

/// Points earned by a single pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPoints {
    /// 1-indexed position of the pick in the slate.
    pub position: u32,
    pub title: String,
    pub artist: String,
    pub match_key: String,
    /// Rank on the chart, `None` when the song did not chart.
    pub chart_rank: Option<u32>,
    pub points: Decimal,
    pub lead_single: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub username: String,
    pub total_points: Decimal,
    pub breakdown: Vec<SongPoints>,
}

/// Settled outcome of one round. Leaderboard order is processing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResult {
    pub id: Uuid,
    pub chart_id: Uuid,
    pub chart_name: String,
    pub kind: ChartKind,
    pub round_date: NaiveDate,
    pub computed_at: DateTime<Utc>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Result header without the leaderboard, for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub id: Uuid,
    pub chart_id: Uuid,
    pub chart_name: String,
    pub kind: ChartKind,
    pub round_date: NaiveDate,
    pub computed_at: DateTime<Utc>,
    pub entries: i64,
}

impl RoundResult {
    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            id: self.id,
            chart_id: self.chart_id,
            chart_name: self.chart_name.clone(),
            kind: self.kind,
            round_date: self.round_date,
            computed_at: self.computed_at,
            entries: self.leaderboard.len() as i64,
        }
    }

    pub fn entry_for(&self, username: &str) -> Option<&LeaderboardEntry> {
        self.leaderboard.iter().find(|e| e.username == username)
    }
}
