use std::sync::OnceLock;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register settlement metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
///
/// The recorder is installed once per process; later calls return the same
/// handle and leave recorded values alone.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE.get_or_init(install).clone()
}

fn install() -> PrometheusHandle {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    if metrics::set_global_recorder(recorder).is_err() {
        tracing::warn!("Another metrics recorder is already installed, /metrics will be empty");
    }

    // Pre-register counters so they appear even before the first increment.
    counter!("settlements_completed").absolute(0);
    counter!("slates_settled").absolute(0);

    // Histogram is lazily created on first record; force creation.
    histogram!("settlement_duration_seconds").record(0.0);

    handle
}
