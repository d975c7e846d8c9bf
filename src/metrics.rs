//! Request, error and persistence-failure counters
//!
//! Recorders are injected; nothing here registers into the process-wide
//! Prometheus registry.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::{RateError, Result};

/// Sink for service observability events
#[cfg_attr(test, mockall::automock)]
pub trait MetricsRecorder: Send + Sync {
    /// An RPC method was invoked
    fn record_request(&self, method: &str);

    /// An RPC method returned an error to its caller
    fn record_error(&self, method: &str);

    /// A fetched quote could not be persisted
    fn record_persistence_failure(&self);
}

/// Prometheus-backed recorder with its own registry
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    requests: IntCounterVec,
    errors: IntCounterVec,
    persistence_failures: IntCounter,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new(
                "rate_service_requests_total",
                "Total number of RateService requests",
            ),
            &["method"],
        )?;
        let errors = IntCounterVec::new(
            Opts::new(
                "rate_service_errors_total",
                "Total number of RateService errors",
            ),
            &["method"],
        )?;
        let persistence_failures = IntCounter::new(
            "rate_service_persistence_failures_total",
            "Total number of fetched quotes that could not be saved",
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(errors.clone()))?;
        registry.register(Box::new(persistence_failures.clone()))?;

        Ok(Self {
            registry,
            requests,
            errors,
            persistence_failures,
        })
    }

    /// Render all metrics in the Prometheus text format
    pub fn encode(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| RateError::Metrics(e.to_string()))
    }
}

impl MetricsRecorder for PrometheusMetrics {
    fn record_request(&self, method: &str) {
        self.requests.with_label_values(&[method]).inc();
    }

    fn record_error(&self, method: &str) {
        self.errors.with_label_values(&[method]).inc();
    }

    fn record_persistence_failure(&self) {
        self.persistence_failures.inc();
    }
}
