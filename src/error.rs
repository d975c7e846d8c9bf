//! Error types for the rate service

use thiserror::Error;

/// Rate service errors
#[derive(Error, Debug)]
pub enum RateError {
    #[error("failed to create request: {0}")]
    RequestConstruction(String),

    #[error("failed to do request: {0}")]
    Transport(String),

    #[error("unexpected status code: {status}")]
    UpstreamStatus { status: u16 },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("not enough data in upstream order book")]
    InsufficientData,

    /// Fetch failure as surfaced by the orchestrator, wrapping the client error
    #[error("failed to fetch rate: {0}")]
    Fetch(#[source] Box<RateError>),

    #[error("failed to save rate: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Metrics error: {0}")]
    Metrics(String),
}

impl RateError {
    /// Wrap a client error the way the orchestrator reports it
    pub fn fetch(cause: RateError) -> Self {
        RateError::Fetch(Box::new(cause))
    }

    /// The client-level cause, looking through a `Fetch` wrapper
    pub fn cause(&self) -> &RateError {
        match self {
            RateError::Fetch(inner) => inner.cause(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for RateError {
    fn from(err: serde_json::Error) -> Self {
        RateError::Decode(err.to_string())
    }
}

impl From<prometheus::Error> for RateError {
    fn from(err: prometheus::Error) -> Self {
        RateError::Metrics(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RateError>;
