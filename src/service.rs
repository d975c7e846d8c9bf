//! Rate orchestrator
//!
//! Fetches a quote, persists it on a best-effort basis and returns it.

use std::sync::Arc;
use tracing::{error, instrument};

use crate::context::RequestContext;
use crate::error::{RateError, Result};
use crate::metrics::MetricsRecorder;
use crate::quote::Quote;
use crate::source::RateSource;
use crate::store::RateStore;

/// Stateless fetch-then-persist service
#[derive(Clone)]
pub struct RateService {
    source: Arc<dyn RateSource>,
    store: Arc<dyn RateStore>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl RateService {
    pub fn new(
        source: Arc<dyn RateSource>,
        store: Arc<dyn RateStore>,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Self {
        Self {
            source,
            store,
            metrics,
        }
    }

    /// Fetch the current quote.
    ///
    /// Only fetch failures are returned. A failed save is logged and counted,
    /// and the fetched quote is still returned.
    #[instrument(skip_all)]
    pub async fn get_rate(&self, ctx: &RequestContext) -> Result<Quote> {
        let quote = self
            .source
            .fetch_quote(ctx)
            .await
            .map_err(RateError::fetch)?;

        if let Err(e) = self.store.save_quote(ctx, &quote).await {
            error!(
                error = %e,
                ask = quote.ask(),
                bid = quote.bid(),
                observed_at = %quote.observed_at(),
                "Failed to save rate"
            );
            self.metrics.record_persistence_failure();
        }

        Ok(quote)
    }
}
