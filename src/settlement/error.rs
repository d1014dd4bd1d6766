use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::charts::{ChartDataError, ChartFetchError};
use crate::scoring::ScoringError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("chart {0} not found")]
    ChartNotFound(Uuid),

    #[error("{chart} already settled for {round_date}")]
    AlreadySettled { chart: String, round_date: NaiveDate },

    #[error("{chart} is already being settled for {round_date}")]
    SettlementInProgress { chart: String, round_date: NaiveDate },

    #[error("{chart} has {current} open, cannot settle {requested}")]
    RoundMismatch {
        chart: String,
        current: NaiveDate,
        requested: NaiveDate,
    },

    #[error("{chart} round for {round_date} stays open until {closes_at}")]
    RoundStillOpen {
        chart: String,
        round_date: NaiveDate,
        closes_at: DateTime<Utc>,
    },

    #[error("chart fetch failed: {0}")]
    ChartFetchFailed(String),

    #[error("malformed chart data: {0}")]
    MalformedChartData(#[from] ChartDataError),

    #[error("scoring slate {slate_id} ({username}) failed: {source}")]
    SlateScoringFailed {
        slate_id: Uuid,
        username: String,
        #[source]
        source: ScoringError,
    },

    #[error("slates for {chart} on {round_date} changed while settling, nothing was committed")]
    SlatesChanged { chart: String, round_date: NaiveDate },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ChartFetchError> for SettlementError {
    fn from(e: ChartFetchError) -> Self {
        SettlementError::ChartFetchFailed(e.to_string())
    }
}

impl SettlementError {
    /// Whether re-running the same settlement may succeed without operator changes.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SettlementError::ChartFetchFailed(_)
                | SettlementError::SettlementInProgress { .. }
                | SettlementError::RoundStillOpen { .. }
                | SettlementError::SlatesChanged { .. }
        )
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SettlementError::ChartNotFound(_) => "chart_not_found",
            SettlementError::AlreadySettled { .. } => "already_settled",
            SettlementError::SettlementInProgress { .. } => "in_progress",
            SettlementError::RoundMismatch { .. } => "round_mismatch",
            SettlementError::RoundStillOpen { .. } => "round_open",
            SettlementError::ChartFetchFailed(_) => "chart_fetch_failed",
            SettlementError::MalformedChartData(_) => "malformed_chart_data",
            SettlementError::SlateScoringFailed { .. } => "slate_scoring_failed",
            SettlementError::SlatesChanged { .. } => "slates_changed",
            SettlementError::Store(_) => "store",
        }
    }
}
