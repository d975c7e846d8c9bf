//! Quote domain type
//!
//! A normalized best ask / best bid pair observed at an upstream timestamp.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{RateError, Result};

/// Best ask/bid quote for the configured market
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Best sell price, kept verbatim as received
    ask: String,
    /// Best buy price, kept verbatim as received
    bid: String,
    /// Upstream observation time
    observed_at: DateTime<Utc>,
}

impl Quote {
    /// Build a quote, rejecting empty or non-decimal prices
    pub fn new(
        ask: impl Into<String>,
        bid: impl Into<String>,
        observed_at: DateTime<Utc>,
    ) -> Result<Self> {
        let ask = ask.into();
        let bid = bid.into();
        validate_price("ask", &ask)?;
        validate_price("bid", &bid)?;

        Ok(Self {
            ask,
            bid,
            observed_at,
        })
    }

    /// Build a quote from an upstream seconds-since-epoch timestamp
    pub fn from_unix(
        ask: impl Into<String>,
        bid: impl Into<String>,
        timestamp: i64,
    ) -> Result<Self> {
        let observed_at = DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
            RateError::Decode(format!("timestamp {} out of range", timestamp))
        })?;
        Self::new(ask, bid, observed_at)
    }

    pub fn ask(&self) -> &str {
        &self.ask
    }

    pub fn bid(&self) -> &str {
        &self.bid
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Observation time as RFC 3339 text, the form handed to storage and callers
    pub fn observed_at_rfc3339(&self) -> String {
        self.observed_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

fn validate_price(side: &str, price: &str) -> Result<()> {
    if price.is_empty() {
        return Err(RateError::Decode(format!("empty {} price", side)));
    }
    Decimal::from_str(price)
        .map(|_| ())
        .map_err(|e| RateError::Decode(format!("invalid {} price {:?}: {}", side, price, e)))
}
