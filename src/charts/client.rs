use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDate};
use futures_util::future::{try_join, BoxFuture};
use futures_util::FutureExt;
use reqwest::Client;
use thiserror::Error;

use crate::models::{ChartKind, ChartRound};

use super::rank_feed::RankFeedPayload;
use super::snapshot::RawChart;

#[derive(Debug, Error)]
pub enum ChartFetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Where chart truth comes from. Failures are treated as transient.
pub trait ChartSource: Send + Sync {
    fn fetch<'a>(
        &'a self,
        chart: &'a ChartRound,
        date: NaiveDate,
    ) -> BoxFuture<'a, Result<RawChart, ChartFetchError>>;
}

#[derive(Debug, Clone)]
pub struct ChartClientConfig {
    pub rank_feed_base_url: String,
    pub stream_chart_base_url: String,
    pub stream_header_rows: usize,
    pub timeout_secs: u64,
}

/// HTTP chart source for both weekly rank feeds and daily streaming tables.
#[derive(Debug, Clone)]
pub struct ChartClient {
    http: Client,
    config: ChartClientConfig,
}

impl ChartClient {
    pub fn new(config: ChartClientConfig) -> Result<Self, ChartFetchError> {
        let http = Client::builder()
            .timeout(StdDuration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    /// Fetch the weekly ranked chart published for `date`.
    pub async fn fetch_rank_chart(
        &self,
        chart_key: &str,
        date: NaiveDate,
    ) -> Result<RankFeedPayload, ChartFetchError> {
        let url = format!(
            "{}/{}?date={}",
            self.config.rank_feed_base_url.trim_end_matches('/'),
            chart_key,
            date.format("%Y-%m-%d"),
        );
        let resp = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?;

        let payload: RankFeedPayload = resp.json().await?;
        Ok(payload)
    }

    /// Download one day's streaming chart CSV.
    pub async fn fetch_stream_table(
        &self,
        chart_key: &str,
        date: NaiveDate,
    ) -> Result<Vec<u8>, ChartFetchError> {
        let url = format!(
            "{}/{}/daily/{}/download",
            self.config.stream_chart_base_url.trim_end_matches('/'),
            chart_key,
            date.format("%Y-%m-%d"),
        );
        let resp = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?;

        let body = resp.bytes().await?;
        if body.is_empty() {
            return Err(ChartFetchError::Unexpected(format!(
                "empty chart table for {chart_key} on {date}"
            )));
        }

        Ok(body.to_vec())
    }

    async fn fetch_raw(&self, chart: &ChartRound, date: NaiveDate) -> Result<RawChart, ChartFetchError> {
        match chart.kind {
            ChartKind::RankFeed => {
                let payload = self.fetch_rank_chart(&chart.chart_key, date).await?;
                Ok(RawChart::RankFeed(payload))
            }
            ChartKind::StreamTable => {
                let (current, previous) = try_join(
                    self.fetch_stream_table(&chart.chart_key, date),
                    self.fetch_stream_table(&chart.chart_key, date - Duration::days(1)),
                )
                .await?;

                Ok(RawChart::StreamTables {
                    date,
                    current,
                    previous,
                    header_rows: self.config.stream_header_rows,
                })
            }
        }
    }
}

impl ChartSource for ChartClient {
    fn fetch<'a>(
        &'a self,
        chart: &'a ChartRound,
        date: NaiveDate,
    ) -> BoxFuture<'a, Result<RawChart, ChartFetchError>> {
        self.fetch_raw(chart, date).boxed()
    }
}
