//! tonic service implementations

use std::sync::Arc;
use std::time::Duration;
use tonic::metadata::MetadataMap;
use tonic::{Request, Response, Status};
use tracing::{error, instrument};

use super::pb::health_service_server::HealthService;
use super::pb::rate_service_server::RateService as RateServiceRpc;
use super::pb::{GetRateRequest, GetRateResponse, HealthCheckRequest, HealthCheckResponse};
use crate::context::RequestContext;
use crate::metrics::MetricsRecorder;
use crate::service::RateService;

const GET_RATE: &str = "GetRate";

/// `final.RateService` backed by the rate orchestrator
#[derive(Clone)]
pub struct RateRpc {
    service: RateService,
    metrics: Arc<dyn MetricsRecorder>,
    /// Deadline applied to every GetRate call
    request_timeout: Option<Duration>,
}

impl RateRpc {
    pub fn new(
        service: RateService,
        metrics: Arc<dyn MetricsRecorder>,
        request_timeout: Option<Duration>,
    ) -> Self {
        Self {
            service,
            metrics,
            request_timeout,
        }
    }

    /// Context for one call: the shorter of the configured timeout and the
    /// client's `grpc-timeout`
    fn context_for(&self, metadata: &MetadataMap) -> RequestContext {
        let timeout = match (self.request_timeout, grpc_timeout(metadata)) {
            (Some(configured), Some(client)) => Some(configured.min(client)),
            (configured, client) => configured.or(client),
        };
        timeout.map(RequestContext::with_timeout).unwrap_or_default()
    }
}

#[tonic::async_trait]
impl RateServiceRpc for RateRpc {
    #[instrument(skip_all)]
    async fn get_rate(
        &self,
        request: Request<GetRateRequest>,
    ) -> Result<Response<GetRateResponse>, Status> {
        self.metrics.record_request(GET_RATE);
        let ctx = self.context_for(request.metadata());

        match self.service.get_rate(&ctx).await {
            Ok(quote) => Ok(Response::new(GetRateResponse {
                ask: quote.ask().to_string(),
                bid: quote.bid().to_string(),
                timestamp: quote.observed_at_rfc3339(),
            })),
            Err(e) => {
                self.metrics.record_error(GET_RATE);
                error!(error = %e, "Error while using rate service");
                Err(Status::internal("internal error"))
            }
        }
    }
}

/// `final.HealthService`; always healthy, touches neither upstream nor storage
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthRpc;

#[tonic::async_trait]
impl HealthService for HealthRpc {
    async fn health_check(
        &self,
        _request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        Ok(Response::new(HealthCheckResponse { ok: true }))
    }
}

/// Parse the client's `grpc-timeout` header (`<digits><H|M|S|m|u|n>`)
pub fn grpc_timeout(metadata: &MetadataMap) -> Option<Duration> {
    let raw = metadata.get("grpc-timeout")?.to_str().ok()?;
    if raw.len() < 2 || raw.len() > 9 {
        return None;
    }
    let (digits, unit) = raw.split_at(raw.len() - 1);
    let value: u64 = digits.parse().ok()?;

    match unit {
        "H" => Some(Duration::from_secs(value * 3600)),
        "M" => Some(Duration::from_secs(value * 60)),
        "S" => Some(Duration::from_secs(value)),
        "m" => Some(Duration::from_millis(value)),
        "u" => Some(Duration::from_micros(value)),
        "n" => Some(Duration::from_nanos(value)),
        _ => None,
    }
}
