//! gRPC surface for the rate and health services, plus the metrics listener.

mod handlers;
mod rpc;

pub use rpc::{grpc_timeout, HealthRpc, RateRpc};

/// Messages and service stubs generated from `proto/final.proto`
pub mod pb {
    tonic::include_proto!("r#final");
}

use axum::{routing::get, Router};
use std::sync::Arc;
use tonic::transport::{server::Router as GrpcRouter, Server};
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::metrics::PrometheusMetrics;
use pb::health_service_server::HealthServiceServer;
use pb::rate_service_server::RateServiceServer;

/// gRPC router serving `final.RateService` and `final.HealthService`
pub fn grpc_router(rate: RateRpc) -> GrpcRouter {
    Server::builder()
        .trace_fn(|request| info_span!("grpc", path = %request.uri().path()))
        .add_service(RateServiceServer::new(rate))
        .add_service(HealthServiceServer::new(HealthRpc))
}

/// Router exposing `/metrics` in the Prometheus text format
pub fn metrics_router(metrics: Arc<PrometheusMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(metrics)
}
