//! Garantex depth API client
//!
//! Issues one GET per fetch and takes the first ask and bid level as best.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::RateSource;
use crate::context::RequestContext;
use crate::error::{RateError, Result};
use crate::quote::Quote;

/// USDT/RUB depth snapshot
pub const DEFAULT_DEPTH_URL: &str = "https://garantex.org/api/v2/depth?market=usdtrub";

/// Hard upper bound on a single upstream call
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Depth response body
#[derive(Debug, Clone, Deserialize)]
pub struct DepthResponse {
    pub asks: Vec<PriceEntry>,
    pub bids: Vec<PriceEntry>,
    /// Seconds since epoch
    pub timestamp: i64,
}

/// One price level; only the price is used
#[derive(Debug, Clone, Deserialize)]
pub struct PriceEntry {
    pub price: String,
}

impl DepthResponse {
    /// Take the first ask and bid as the best prices.
    ///
    /// Levels are expected best-first; ordering is not checked.
    pub fn into_quote(self) -> Result<Quote> {
        let (Some(ask), Some(bid)) = (self.asks.into_iter().next(), self.bids.into_iter().next())
        else {
            return Err(RateError::InsufficientData);
        };
        Quote::from_unix(ask.price, bid.price, self.timestamp)
    }
}

/// Decode a depth body into a quote
pub fn parse_depth(body: &[u8]) -> Result<Quote> {
    let depth: DepthResponse = serde_json::from_slice(body)?;
    depth.into_quote()
}

/// HTTP client for the Garantex depth endpoint
#[derive(Debug, Clone)]
pub struct GarantexClient {
    client: Client,
    url: String,
}

impl GarantexClient {
    /// Client for the default USDT/RUB market
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_DEPTH_URL)
    }

    /// Client for an arbitrary depth endpoint
    pub fn with_url(url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| RateError::RequestConstruction(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RateSource for GarantexClient {
    async fn fetch_quote(&self, ctx: &RequestContext) -> Result<Quote> {
        if ctx.is_expired() {
            return Err(RateError::RequestConstruction(
                "request context deadline exceeded".to_string(),
            ));
        }

        let request = self
            .client
            .get(&self.url)
            .timeout(ctx.bound(FETCH_TIMEOUT))
            .build()
            .map_err(|e| RateError::RequestConstruction(e.to_string()))?;

        let response = self.client.execute(request).await.map_err(|e| {
            warn!(url = %self.url, error = %e, "Upstream request failed");
            RateError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(url = %self.url, status = status.as_u16(), "Unexpected upstream status");
            return Err(RateError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RateError::Transport(e.to_string()))?;

        let quote = parse_depth(&body)?;
        debug!(
            ask = quote.ask(),
            bid = quote.bid(),
            observed_at = %quote.observed_at(),
            "Fetched quote"
        );

        Ok(quote)
    }
}
