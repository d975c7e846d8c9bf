//! Rate source module
//!
//! Fetches the current best ask/bid from an upstream order book.

mod garantex;

pub use garantex::{
    parse_depth, DepthResponse, GarantexClient, PriceEntry, DEFAULT_DEPTH_URL, FETCH_TIMEOUT,
};

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::Result;
use crate::quote::Quote;

/// Source of fresh quotes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch one quote. No retries are attempted.
    async fn fetch_quote(&self, ctx: &RequestContext) -> Result<Quote>;
}
