//! Application wiring, serving and shutdown

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::metrics::{MetricsRecorder, PrometheusMetrics};
use crate::server::{grpc_router, metrics_router, RateRpc};
use crate::service::RateService;
use crate::source::GarantexClient;
use crate::store::PostgresRateStore;

/// Fully wired rate service
pub struct App {
    config: Config,
    store: Arc<PostgresRateStore>,
    metrics: Arc<PrometheusMetrics>,
    service: RateService,
}

impl App {
    /// Connect to the database and build all components.
    ///
    /// Fails if the database is unreachable.
    pub async fn new(config: Config) -> Result<Self> {
        debug!(
            app_addr = %config.app_addr(),
            db_host = %config.database.host,
            db_name = %config.database.name,
            upstream = %config.upstream_url,
            "Starting app"
        );

        let store = Arc::new(
            PostgresRateStore::connect(config.connect_options(), config.database.max_connections)
                .await?,
        );
        let source = Arc::new(GarantexClient::with_url(&config.upstream_url)?);
        let metrics = Arc::new(PrometheusMetrics::new()?);

        let service = RateService::new(source, store.clone(), metrics.clone());

        Ok(Self {
            config,
            store,
            metrics,
            service,
        })
    }

    /// Serve until Ctrl-C, then shut down gracefully and close the pool
    pub async fn run(self) -> anyhow::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `signal` resolves. The pool is closed on every exit path,
    /// including a failed bind.
    async fn run_until<S>(self, signal: S) -> anyhow::Result<()>
    where
        S: Future<Output = ()> + Send,
    {
        let result = self.serve(signal).await;

        info!("Shutting down db connection");
        self.store.close().await;

        result
    }

    async fn serve<S>(&self, signal: S) -> anyhow::Result<()>
    where
        S: Future<Output = ()> + Send,
    {
        // Both listeners are bound before anything is spawned
        let metrics_listener = TcpListener::bind(self.config.metrics_endpoint.as_str()).await?;
        let addr = self.config.app_addr();
        let listener = TcpListener::bind(addr.as_str()).await?;

        info!(addr = %self.config.metrics_endpoint, "Metrics server is listening");
        let metrics_app = metrics_router(self.metrics.clone());
        let metrics_task = tokio::spawn(async move {
            if let Err(e) = axum::serve(metrics_listener, metrics_app).await {
                warn!(error = %e, "Metrics server error");
            }
        });

        let recorder: Arc<dyn MetricsRecorder> = self.metrics.clone();
        let rpc = RateRpc::new(self.service.clone(), recorder, self.config.request_timeout);

        info!(addr = %addr, "Rate server is listening");
        let served = grpc_router(rpc)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), signal)
            .await;

        info!("Shutting down metrics server");
        metrics_task.abort();

        served?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
