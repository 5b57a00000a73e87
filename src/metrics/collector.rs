// src/metrics/collector.rs
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap();
        buffer
    }
}

pub struct MetricsCollector {
    // Request metrics
    pub requests_total: IntCounterVec,
    pub request_duration_seconds: HistogramVec,

    // Authentication metrics
    pub auth_failures_total: IntCounterVec,

    // System metrics
    pub active_requests: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new("proxy_requests_total", "Total number of handled requests"),
            &["method", "status_code", "instance"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "proxy_request_duration_seconds",
                "Request duration in seconds",
            ),
            &["method", "instance"],
        )?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        let auth_failures_total = IntCounterVec::new(
            Opts::new("proxy_auth_failures_total", "Rejected requests by reason"),
            &["reason"],
        )?;
        registry.register(Box::new(auth_failures_total.clone()))?;

        let active_requests =
            IntGauge::new("proxy_active_requests", "Requests currently in flight")?;
        registry.register(Box::new(active_requests.clone()))?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
            auth_failures_total,
            active_requests,
        })
    }

    pub fn record_request(&self, method: &str, status_code: u16, instance: &str, duration: Duration) {
        let status = status_code.to_string();
        self.requests_total
            .with_label_values(&[method, &status, instance])
            .inc();

        self.request_duration_seconds
            .with_label_values(&[method, instance])
            .observe(duration.as_secs_f64());
    }

    pub fn record_auth_failure(&self, reason: &str) {
        self.auth_failures_total.with_label_values(&[reason]).inc();
    }

    pub fn increment_active_requests(&self) {
        self.active_requests.inc();
    }

    pub fn decrement_active_requests(&self) {
        self.active_requests.dec();
    }
}
