use chrono::NaiveDate;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{chart_repo, result_repo, slate_repo};
use crate::models::{ChartRound, PredictionSlate, ResultSummary, RoundResult};
use crate::settlement::SettlementBatch;

use super::{SettlementStore, StoreError};

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load_result(&self, id: Uuid) -> Result<Option<RoundResult>, StoreError> {
        let Some(row) = result_repo::get_result(&self.pool, id).await? else {
            return Ok(None);
        };
        let summary = ResultSummary::try_from(row).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let leaderboard = result_repo::get_entries(&self.pool, id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(Some(RoundResult {
            id: summary.id,
            chart_id: summary.chart_id,
            chart_name: summary.chart_name,
            kind: summary.kind,
            round_date: summary.round_date,
            computed_at: summary.computed_at,
            leaderboard,
        }))
    }

    async fn commit(&self, batch: SettlementBatch) -> Result<RoundResult, StoreError> {
        let chart_id = batch.chart().id;
        let round_date = batch.round_date();
        let mut tx = self.pool.begin().await.map_err(anyhow::Error::from)?;

        // Serializes settlements of the same chart across processes.
        if chart_repo::lock_chart(&mut tx, chart_id).await?.is_none() {
            return Err(StoreError::ChartNotFound(chart_id));
        }

        let result_id = result_repo::insert_result(
            &mut tx,
            chart_id,
            &batch.chart().name,
            batch.chart().kind,
            round_date,
            batch.computed_at(),
        )
        .await?
        .ok_or(StoreError::Conflict {
            chart_id,
            round_date,
        })?;

        for (seq, entry) in batch.entries().iter().enumerate() {
            let seq = i32::try_from(seq).map_err(|e| StoreError::Corrupt(e.to_string()))?;
            result_repo::insert_entry(&mut tx, result_id, seq, entry).await?;
        }

        // Dropping `tx` on the error path rolls the result and entries back.
        let expected = batch.consumed_slates().len();
        let deleted = slate_repo::delete_slates(&mut tx, batch.consumed_slates()).await?;
        if deleted != expected as u64 {
            tracing::warn!(
                chart_id = %chart_id,
                expected,
                deleted,
                "Scored slates changed before commit, rolling back"
            );
            return Err(StoreError::StaleSlates {
                chart_id,
                expected,
                unchanged: usize::try_from(deleted).unwrap_or(usize::MAX),
            });
        }

        chart_repo::advance_schedule(&mut tx, chart_id, &batch.next_schedule()).await?;

        tx.commit().await.map_err(anyhow::Error::from)?;

        tracing::debug!(
            chart_id = %chart_id,
            result_id = %result_id,
            entries = batch.entries().len(),
            "Settlement committed"
        );

        Ok(batch.into_result(result_id))
    }
}

impl SettlementStore for PgStore {
    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(anyhow::Error::from)?;
            Ok(())
        }
        .boxed()
    }

    fn find_chart(&self, id: Uuid) -> BoxFuture<'_, Result<Option<ChartRound>, StoreError>> {
        async move {
            chart_repo::get_chart(&self.pool, id)
                .await?
                .map(ChartRound::try_from)
                .transpose()
                .map_err(|e| StoreError::Corrupt(e.to_string()))
        }
        .boxed()
    }

    fn list_charts(&self) -> BoxFuture<'_, Result<Vec<ChartRound>, StoreError>> {
        async move {
            chart_repo::list_charts(&self.pool)
                .await?
                .into_iter()
                .map(ChartRound::try_from)
                .collect::<anyhow::Result<Vec<_>>>()
                .map_err(|e| StoreError::Corrupt(e.to_string()))
        }
        .boxed()
    }

    fn find_result(
        &self,
        chart_id: Uuid,
        round_date: NaiveDate,
    ) -> BoxFuture<'_, Result<Option<ResultSummary>, StoreError>> {
        async move {
            result_repo::get_result_for_round(&self.pool, chart_id, round_date)
                .await?
                .map(ResultSummary::try_from)
                .transpose()
                .map_err(|e| StoreError::Corrupt(e.to_string()))
        }
        .boxed()
    }

    fn get_result(&self, id: Uuid) -> BoxFuture<'_, Result<Option<RoundResult>, StoreError>> {
        self.load_result(id).boxed()
    }

    fn list_results(&self) -> BoxFuture<'_, Result<Vec<ResultSummary>, StoreError>> {
        async move {
            result_repo::list_results(&self.pool)
                .await?
                .into_iter()
                .map(ResultSummary::try_from)
                .collect::<anyhow::Result<Vec<_>>>()
                .map_err(|e| StoreError::Corrupt(e.to_string()))
        }
        .boxed()
    }

    fn pending_slates(
        &self,
        chart_id: Uuid,
    ) -> BoxFuture<'_, Result<Vec<PredictionSlate>, StoreError>> {
        async move {
            let rows = slate_repo::get_pending_slates(&self.pool, chart_id).await?;
            Ok(rows.into_iter().map(Into::into).collect())
        }
        .boxed()
    }

    fn commit_settlement(
        &self,
        batch: SettlementBatch,
    ) -> BoxFuture<'_, Result<RoundResult, StoreError>> {
        self.commit(batch).boxed()
    }
}
