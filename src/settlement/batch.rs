use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{ChartRound, LeaderboardEntry, PredictionSlate, RoundResult, Schedule};
use crate::scoring::SlateScore;

/// Everything one settlement run produced, handed to the store in a single
/// commit. Entries keep the order slates were processed in.
#[derive(Debug, Clone)]
pub struct SettlementBatch {
    chart: ChartRound,
    round_date: NaiveDate,
    computed_at: DateTime<Utc>,
    entries: Vec<LeaderboardEntry>,
    consumed: Vec<ConsumedSlate>,
}

/// A slate version that was scored. A resubmission after scoring changes
/// `submitted_at`, so the store can tell the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumedSlate {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
}

impl ConsumedSlate {
    pub fn matches(&self, slate: &PredictionSlate) -> bool {
        self.id == slate.id && self.submitted_at == slate.submitted_at
    }
}

impl SettlementBatch {
    pub fn new(chart: ChartRound, round_date: NaiveDate, computed_at: DateTime<Utc>) -> Self {
        Self {
            chart,
            round_date,
            computed_at,
            entries: Vec::new(),
            consumed: Vec::new(),
        }
    }

    /// Append a scored slate. The slate is marked consumed together with its
    /// entry so one is never persisted without the other.
    pub fn record(&mut self, slate: &PredictionSlate, score: SlateScore) {
        self.entries.push(LeaderboardEntry {
            user_id: slate.user_id,
            username: slate.username.clone(),
            total_points: score.total_points,
            breakdown: score.breakdown,
        });
        self.consumed.push(ConsumedSlate {
            id: slate.id,
            submitted_at: slate.submitted_at,
        });
    }

    pub fn chart(&self) -> &ChartRound {
        &self.chart
    }

    pub fn round_date(&self) -> NaiveDate {
        self.round_date
    }

    pub fn computed_at(&self) -> DateTime<Utc> {
        self.computed_at
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn consumed_slates(&self) -> &[ConsumedSlate] {
        &self.consumed
    }

    /// Schedule the chart moves to once this batch is committed.
    pub fn next_schedule(&self) -> Schedule {
        self.chart.next_schedule()
    }

    pub fn total_points(&self) -> Decimal {
        self.entries.iter().map(|e| e.total_points).sum()
    }

    pub fn into_result(self, id: Uuid) -> RoundResult {
        RoundResult {
            id,
            chart_id: self.chart.id,
            chart_name: self.chart.name,
            kind: self.chart.kind,
            round_date: self.round_date,
            computed_at: self.computed_at,
            leaderboard: self.entries,
        }
    }
}
