// src/metrics.rs
//! Prometheus recorder install + the `/metrics` exposition route.

use axum::{routing::get, Router};
use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::AppConfig;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and seed the static gauges. Call once
    /// at startup, before any counters are touched.
    pub fn init(config: &AppConfig) -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        gauge!("aggregate_cache_ttl_secs").set(config.cache_ttl_secs as f64);
        gauge!("process_start_ts").set(chrono::Utc::now().timestamp() as f64);

        Self { handle }
    }

    /// Router exposing `/metrics` in the Prometheus exposition format,
    /// merged next to the API router by the binary.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
