use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;
use futures_util::future::{self, BoxFuture};
use futures_util::FutureExt;

use crate::models::ChartRound;

use super::client::{ChartFetchError, ChartSource};
use super::snapshot::RawChart;

/// Chart source backed by payloads loaded up front, keyed by chart key and
/// date. Used to replay a captured chart and in tests.
#[derive(Debug, Default)]
pub struct FixedChartSource {
    charts: Mutex<HashMap<(String, NaiveDate), RawChart>>,
}

impl FixedChartSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, chart_key: &str, date: NaiveDate, raw: RawChart) {
        self.charts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((chart_key.to_string(), date), raw);
    }
}

impl ChartSource for FixedChartSource {
    fn fetch<'a>(
        &'a self,
        chart: &'a ChartRound,
        date: NaiveDate,
    ) -> BoxFuture<'a, Result<RawChart, ChartFetchError>> {
        let found = self
            .charts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(chart.chart_key.clone(), date))
            .cloned();

        let result = found.ok_or_else(|| {
            ChartFetchError::Unexpected(format!(
                "no chart loaded for {} on {date}",
                chart.chart_key
            ))
        });

        future::ready(result).boxed()
    }
}
