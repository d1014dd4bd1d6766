pub mod api;
pub mod charts;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod scoring;
pub mod settlement;
pub mod store;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::settlement::Settler;
use crate::store::SettlementStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SettlementStore>,
    pub settler: Arc<Settler>,
    pub config: AppConfig,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
