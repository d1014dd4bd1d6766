use std::collections::HashMap;

use chrono::NaiveDate;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{ChartRound, PredictionSlate, ResultSummary, RoundResult};
use crate::settlement::SettlementBatch;

use super::{SettlementStore, StoreError};

/// Process-local store. Used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    charts: HashMap<Uuid, ChartRound>,
    /// Submission order.
    slates: Vec<PredictionSlate>,
    results: Vec<RoundResult>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_chart(&self, chart: ChartRound) {
        self.inner.lock().await.charts.insert(chart.id, chart);
    }

    /// Store a slate, replacing any earlier slate by the same user for the same chart.
    pub async fn submit_slate(&self, slate: PredictionSlate) {
        let mut inner = self.inner.lock().await;
        inner
            .slates
            .retain(|s| !(s.chart_id == slate.chart_id && s.user_id == slate.user_id));
        inner.slates.push(slate);
    }

    pub async fn slate_count(&self, chart_id: Uuid) -> usize {
        self.inner
            .lock()
            .await
            .slates
            .iter()
            .filter(|s| s.chart_id == chart_id)
            .count()
    }

    pub async fn result_count(&self) -> usize {
        self.inner.lock().await.results.len()
    }
}

impl SettlementStore for MemoryStore {
    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        async { Ok(()) }.boxed()
    }

    fn find_chart(&self, id: Uuid) -> BoxFuture<'_, Result<Option<ChartRound>, StoreError>> {
        async move { Ok(self.inner.lock().await.charts.get(&id).cloned()) }.boxed()
    }

    fn list_charts(&self) -> BoxFuture<'_, Result<Vec<ChartRound>, StoreError>> {
        async move {
            let inner = self.inner.lock().await;
            let mut charts: Vec<ChartRound> = inner.charts.values().cloned().collect();
            charts.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(charts)
        }
        .boxed()
    }

    fn find_result(
        &self,
        chart_id: Uuid,
        round_date: NaiveDate,
    ) -> BoxFuture<'_, Result<Option<ResultSummary>, StoreError>> {
        async move {
            let inner = self.inner.lock().await;
            Ok(inner
                .results
                .iter()
                .find(|r| r.chart_id == chart_id && r.round_date == round_date)
                .map(RoundResult::summary))
        }
        .boxed()
    }

    fn get_result(&self, id: Uuid) -> BoxFuture<'_, Result<Option<RoundResult>, StoreError>> {
        async move {
            let inner = self.inner.lock().await;
            Ok(inner.results.iter().find(|r| r.id == id).cloned())
        }
        .boxed()
    }

    fn list_results(&self) -> BoxFuture<'_, Result<Vec<ResultSummary>, StoreError>> {
        async move {
            let inner = self.inner.lock().await;
            let mut summaries: Vec<ResultSummary> =
                inner.results.iter().map(RoundResult::summary).collect();
            summaries.sort_by(|a, b| {
                b.round_date
                    .cmp(&a.round_date)
                    .then(b.computed_at.cmp(&a.computed_at))
            });
            Ok(summaries)
        }
        .boxed()
    }

    fn pending_slates(
        &self,
        chart_id: Uuid,
    ) -> BoxFuture<'_, Result<Vec<PredictionSlate>, StoreError>> {
        async move {
            let inner = self.inner.lock().await;
            Ok(inner
                .slates
                .iter()
                .filter(|s| s.chart_id == chart_id)
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn commit_settlement(
        &self,
        batch: SettlementBatch,
    ) -> BoxFuture<'_, Result<RoundResult, StoreError>> {
        async move {
            let mut inner = self.inner.lock().await;
            let chart_id = batch.chart().id;
            let round_date = batch.round_date();

            if inner
                .results
                .iter()
                .any(|r| r.chart_id == chart_id && r.round_date == round_date)
            {
                return Err(StoreError::Conflict {
                    chart_id,
                    round_date,
                });
            }

            if !inner.charts.contains_key(&chart_id) {
                return Err(StoreError::ChartNotFound(chart_id));
            }

            let consumed = batch.consumed_slates();
            let unchanged = inner
                .slates
                .iter()
                .filter(|s| consumed.iter().any(|c| c.matches(s)))
                .count();
            if unchanged != consumed.len() {
                return Err(StoreError::StaleSlates {
                    chart_id,
                    expected: consumed.len(),
                    unchanged,
                });
            }
            inner
                .slates
                .retain(|s| !consumed.iter().any(|c| c.matches(s)));

            let next = batch.next_schedule();
            if let Some(chart) = inner.charts.get_mut(&chart_id) {
                chart.round_date = next.round_date;
                chart.opens_at = next.opens_at;
                chart.closes_at = next.closes_at;
            }

            let result = batch.into_result(Uuid::new_v4());
            inner.results.push(result.clone());
            Ok(result)
        }
        .boxed()
    }
}
