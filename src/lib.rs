//! Rate Service Library
//!
//! Fetches the best ask/bid for a currency pair from an exchange order book,
//! persists each quote on a best-effort basis and serves it over gRPC.

pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod quote;
pub mod server;
pub mod service;
pub mod source;
pub mod store;

pub use app::App;
pub use config::{Args, Config, Mode};
pub use context::RequestContext;
pub use error::{RateError, Result};
pub use metrics::{MetricsRecorder, PrometheusMetrics};
pub use quote::Quote;
pub use service::RateService;
pub use source::{GarantexClient, RateSource};
pub use store::{PostgresRateStore, RateStore};
