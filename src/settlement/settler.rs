use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use metrics::{counter, histogram};
use uuid::Uuid;

use crate::charts::{self, ChartPair, ChartSource};
use crate::models::{ChartRound, RoundResult};
use crate::scoring::score_slate;
use crate::store::{SettlementStore, StoreError};

use super::batch::SettlementBatch;
use super::error::SettlementError;
use super::grant::OperatorGrant;
use super::in_flight::InFlightRounds;

/// Settles closed rounds: fetches chart truth, scores every pending slate and
/// commits the leaderboard.
pub struct Settler {
    store: Arc<dyn SettlementStore>,
    charts: Arc<dyn ChartSource>,
    in_flight: InFlightRounds,
}

impl Settler {
    pub fn new(store: Arc<dyn SettlementStore>, charts: Arc<dyn ChartSource>) -> Self {
        Self {
            store,
            charts,
            in_flight: InFlightRounds::new(),
        }
    }

    pub fn in_flight(&self) -> &InFlightRounds {
        &self.in_flight
    }

    /// Settle one round of a chart. `round_date` defaults to the chart's open
    /// round and must match it when given.
    ///
    /// Nothing is written unless every slate scores. Settling a round twice
    /// returns [`SettlementError::AlreadySettled`] and changes nothing.
    pub async fn settle(
        &self,
        _grant: &OperatorGrant,
        chart_id: Uuid,
        round_date: Option<NaiveDate>,
    ) -> Result<RoundResult, SettlementError> {
        let started = Instant::now();
        let outcome = self.run(chart_id, round_date).await;
        histogram!("settlement_duration_seconds").record(started.elapsed().as_secs_f64());

        match &outcome {
            Ok(result) => {
                counter!("settlements_completed").increment(1);
                counter!("slates_settled").increment(result.leaderboard.len() as u64);
                tracing::info!(
                    chart_id = %chart_id,
                    result_id = %result.id,
                    round_date = %result.round_date,
                    entries = result.leaderboard.len(),
                    "Round settled"
                );
            }
            Err(e) => {
                counter!("settlements_failed", "reason" => e.kind()).increment(1);
                if e.is_retryable() {
                    tracing::warn!(chart_id = %chart_id, error = %e, "Settlement not possible yet");
                } else {
                    tracing::error!(chart_id = %chart_id, error = %e, "Settlement rejected");
                }
            }
        }

        outcome
    }

    async fn run(
        &self,
        chart_id: Uuid,
        requested: Option<NaiveDate>,
    ) -> Result<RoundResult, SettlementError> {
        let chart = self
            .store
            .find_chart(chart_id)
            .await?
            .ok_or(SettlementError::ChartNotFound(chart_id))?;
        let round_date = requested.unwrap_or(chart.round_date);

        let _reservation = self.in_flight.reserve(chart.id, round_date).ok_or_else(|| {
            SettlementError::SettlementInProgress {
                chart: chart.name.clone(),
                round_date,
            }
        })?;

        if let Some(existing) = self.store.find_result(chart.id, round_date).await? {
            tracing::info!(
                chart_id = %chart.id,
                result_id = %existing.id,
                round_date = %round_date,
                "Round already has a result"
            );
            return Err(SettlementError::AlreadySettled {
                chart: chart.name,
                round_date,
            });
        }

        if round_date != chart.round_date {
            return Err(SettlementError::RoundMismatch {
                chart: chart.name,
                current: chart.round_date,
                requested: round_date,
            });
        }

        let now = Utc::now();
        if !chart.is_closed(now) {
            return Err(SettlementError::RoundStillOpen {
                chart: chart.name,
                round_date,
                closes_at: chart.closes_at,
            });
        }

        let pair = self.load_chart(&chart, round_date).await?;

        let slates = self.store.pending_slates(chart.id).await?;
        tracing::info!(
            chart_id = %chart.id,
            round_date = %round_date,
            slates = slates.len(),
            chart_entries = pair.current.len(),
            "Scoring round"
        );

        let mut batch = SettlementBatch::new(chart.clone(), round_date, now);
        for slate in &slates {
            let score = score_slate(&slate.picks, &pair).map_err(|source| {
                SettlementError::SlateScoringFailed {
                    slate_id: slate.id,
                    username: slate.username.clone(),
                    source,
                }
            })?;
            tracing::debug!(
                slate_id = %slate.id,
                username = %slate.username,
                points = %score.total_points,
                "Slate scored"
            );
            batch.record(slate, score);
        }

        match self.store.commit_settlement(batch).await {
            Ok(result) => Ok(result),
            Err(StoreError::Conflict { .. }) => Err(SettlementError::AlreadySettled {
                chart: chart.name,
                round_date,
            }),
            Err(StoreError::StaleSlates { .. }) => Err(SettlementError::SlatesChanged {
                chart: chart.name,
                round_date,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_chart(
        &self,
        chart: &ChartRound,
        round_date: NaiveDate,
    ) -> Result<ChartPair, SettlementError> {
        let raw = self.charts.fetch(chart, round_date).await?;
        let pair = charts::adapt(raw)?;

        // The feed serves its latest week when the requested one is not out yet.
        if pair.current.date() != round_date {
            return Err(SettlementError::ChartFetchFailed(format!(
                "{} chart for {round_date} not published, source returned {}",
                chart.name,
                pair.current.date()
            )));
        }

        Ok(pair)
    }
}
