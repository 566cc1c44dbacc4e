//! Prometheus metrics & middleware helper.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use once_cell::sync::Lazy;

/// Global Prometheus handle. Request counts and latencies are labelled by
/// endpoint and status, which covers every transaction route.
pub static METRICS: Lazy<PrometheusMetrics> = Lazy::new(|| {
    PrometheusMetricsBuilder::new("purple_sui")
        .endpoint("/metrics")
        .build()
        .expect("metrics builder")
});
