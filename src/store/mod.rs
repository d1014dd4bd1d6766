pub mod memory;
pub mod pg;

use chrono::NaiveDate;
use futures_util::future::BoxFuture;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ChartRound, PredictionSlate, ResultSummary, RoundResult};
use crate::settlement::SettlementBatch;

pub use memory::MemoryStore;
pub use pg::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A result for this (chart, round date) already exists.
    #[error("result already recorded for chart {chart_id} on {round_date}")]
    Conflict { chart_id: Uuid, round_date: NaiveDate },

    #[error("chart {0} not found")]
    ChartNotFound(Uuid),

    /// A scored slate was resubmitted or removed before the commit.
    #[error("only {unchanged} of {expected} scored slates for chart {chart_id} are unchanged")]
    StaleSlates {
        chart_id: Uuid,
        expected: usize,
        unchanged: usize,
    },

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence used by settlement and the read API.
///
/// `commit_settlement` is the only write: it records the result and its
/// leaderboard, deletes the consumed slates and advances the chart schedule
/// as one unit. Either all of it is durable or none of it is. A slate is only
/// deleted in the exact version that was scored; if any consumed slate has
/// changed the commit fails with [`StoreError::StaleSlates`].
pub trait SettlementStore: Send + Sync {
    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>>;

    fn find_chart(&self, id: Uuid) -> BoxFuture<'_, Result<Option<ChartRound>, StoreError>>;

    fn list_charts(&self) -> BoxFuture<'_, Result<Vec<ChartRound>, StoreError>>;

    fn find_result(
        &self,
        chart_id: Uuid,
        round_date: NaiveDate,
    ) -> BoxFuture<'_, Result<Option<ResultSummary>, StoreError>>;

    fn get_result(&self, id: Uuid) -> BoxFuture<'_, Result<Option<RoundResult>, StoreError>>;

    /// Newest first.
    fn list_results(&self) -> BoxFuture<'_, Result<Vec<ResultSummary>, StoreError>>;

    /// Slates submitted for the chart's open round, oldest first.
    fn pending_slates(&self, chart_id: Uuid)
        -> BoxFuture<'_, Result<Vec<PredictionSlate>, StoreError>>;

    fn commit_settlement(
        &self,
        batch: SettlementBatch,
    ) -> BoxFuture<'_, Result<RoundResult, StoreError>>;
}
