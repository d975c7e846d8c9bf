//! Rate store module
//!
//! Append-only persistence of fetched quotes.

mod postgres;

pub use postgres::{PostgresRateStore, INSERT_RATE_SQL};

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::Result;
use crate::quote::Quote;

/// Durable sink for quotes.
///
/// `Ok(())` means the quote was appended. Any error is a
/// [`RateError::Persistence`](crate::error::RateError::Persistence).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateStore: Send + Sync {
    async fn save_quote(&self, ctx: &RequestContext, quote: &Quote) -> Result<()>;
}
