//! End-to-end tests: fake exchange -> client -> service -> gRPC surface

use async_trait::async_trait;
use axum::{http::StatusCode, routing::get, Router};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::Code;

use rate_service::server::pb::health_service_client::HealthServiceClient;
use rate_service::server::pb::rate_service_client::RateServiceClient;
use rate_service::server::pb::{GetRateRequest, HealthCheckRequest};
use rate_service::server::{grpc_router, RateRpc};
use rate_service::{
    GarantexClient, MetricsRecorder, PrometheusMetrics, Quote, RateError, RateService, RateStore,
    RequestContext, Result,
};

/// In-memory store that records saved quotes, or fails every write
#[derive(Default)]
struct MemoryStore {
    saved: Mutex<Vec<Quote>>,
    calls: AtomicUsize,
    fail: bool,
}

impl MemoryStore {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl RateStore for MemoryStore {
    async fn save_quote(&self, _ctx: &RequestContext, quote: &Quote) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RateError::Persistence("database is down".to_string()));
        }
        self.saved.lock().unwrap().push(quote.clone());
        Ok(())
    }
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn fake_exchange(status: u16, body: &'static str) -> String {
    let app = Router::new().route(
        "/api/v2/depth",
        get(move || async move { (StatusCode::from_u16(status).unwrap(), body) }),
    );
    format!("{}/api/v2/depth?market=usdtrub", spawn(app).await)
}

struct Harness {
    service: RateService,
    store: Arc<MemoryStore>,
    metrics: Arc<PrometheusMetrics>,
}

async fn harness(status: u16, body: &'static str, store: MemoryStore) -> Harness {
    let url = fake_exchange(status, body).await;
    let store = Arc::new(store);
    let metrics = Arc::new(PrometheusMetrics::new().unwrap());
    let service = RateService::new(
        Arc::new(GarantexClient::with_url(&url).unwrap()),
        store.clone(),
        metrics.clone(),
    );
    Harness {
        service,
        store,
        metrics,
    }
}

const GOOD_BOOK: &str =
    r#"{"asks":[{"price":"100.5"}],"bids":[{"price":"99.5"}],"timestamp":1700000000}"#;

#[tokio::test]
async fn fetched_quote_is_returned_and_saved() {
    let h = harness(200, GOOD_BOOK, MemoryStore::default()).await;

    let quote = h.service.get_rate(&RequestContext::background()).await.unwrap();

    assert_eq!(quote.ask(), "100.5");
    assert_eq!(quote.bid(), "99.5");
    assert_eq!(quote.observed_at().timestamp(), 1_700_000_000);
    assert_eq!(*h.store.saved.lock().unwrap(), vec![quote]);
}

#[tokio::test]
async fn empty_asks_fail_without_saving() {
    let h = harness(
        200,
        r#"{"asks":[],"bids":[{"price":"99.5"}],"timestamp":1700000000}"#,
        MemoryStore::default(),
    )
    .await;

    let err = h
        .service
        .get_rate(&RequestContext::background())
        .await
        .unwrap_err();

    assert!(matches!(err.cause(), RateError::InsufficientData));
    assert_eq!(h.store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upstream_500_fails_without_saving() {
    let h = harness(500, "<html>oops</html>", MemoryStore::default()).await;

    let err = h
        .service
        .get_rate(&RequestContext::background())
        .await
        .unwrap_err();

    assert!(matches!(err.cause(), RateError::UpstreamStatus { status: 500 }));
    assert!(err.to_string().contains("500"));
    assert_eq!(h.store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn store_failure_is_absorbed_and_counted() {
    let h = harness(200, GOOD_BOOK, MemoryStore::failing()).await;

    let quote = h.service.get_rate(&RequestContext::background()).await.unwrap();

    assert_eq!(quote, Quote::from_unix("100.5", "99.5", 1_700_000_000).unwrap());
    assert_eq!(h.store.calls.load(Ordering::SeqCst), 1);
    assert!(h
        .metrics
        .encode()
        .unwrap()
        .contains("rate_service_persistence_failures_total 1"));
}

/// Serve the gRPC surface for `service` on an ephemeral port
async fn spawn_grpc(h: &Harness, request_timeout: Option<Duration>) -> String {
    let recorder: Arc<dyn MetricsRecorder> = h.metrics.clone();
    let rpc = RateRpc::new(h.service.clone(), recorder, request_timeout);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        grpc_router(rpc)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn grpc_surface_serves_quote_and_hides_errors() {
    let ok = harness(200, GOOD_BOOK, MemoryStore::failing()).await;
    let endpoint = spawn_grpc(&ok, Some(Duration::from_secs(2))).await;

    let mut client = RateServiceClient::connect(endpoint).await.unwrap();
    let rate = client
        .get_rate(GetRateRequest {})
        .await
        .unwrap()
        .into_inner();
    assert_eq!(rate.ask, "100.5");
    assert_eq!(rate.bid, "99.5");
    assert_eq!(rate.timestamp, "2023-11-14T22:13:20Z");

    let failing = harness(502, "bad gateway", MemoryStore::default()).await;
    let endpoint = spawn_grpc(&failing, None).await;

    let mut client = RateServiceClient::connect(endpoint).await.unwrap();
    let status = client.get_rate(GetRateRequest {}).await.unwrap_err();
    assert_eq!(status.code(), Code::Internal);
    assert_eq!(status.message(), "internal error");
    assert_eq!(failing.store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn grpc_health_check_is_ok() {
    let h = harness(500, "down", MemoryStore::failing()).await;
    let endpoint = spawn_grpc(&h, None).await;

    let mut client = HealthServiceClient::connect(endpoint).await.unwrap();
    let health = client
        .health_check(HealthCheckRequest {})
        .await
        .unwrap()
        .into_inner();
    assert!(health.ok);
    assert_eq!(h.store.calls.load(Ordering::SeqCst), 0);
}
