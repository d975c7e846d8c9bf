//! Per-request context carrying the caller's deadline

use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// Request-scoped context passed through fetch and persist.
///
/// A context without a deadline never expires. Work bounded by an expired
/// context is abandoned at the next await point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context with no deadline
    pub fn background() -> Self {
        Self { deadline: None }
    }

    /// Context expiring `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.remaining(), Some(left) if left.is_zero())
    }

    /// Clamp a component timeout to the time this context has left
    pub fn bound(&self, limit: Duration) -> Duration {
        match self.remaining() {
            Some(left) => left.min(limit),
            None => limit,
        }
    }

    /// Run `fut` until it completes or the deadline passes.
    ///
    /// Returns `None` if the deadline passed first.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        match self.deadline {
            Some(deadline) => timeout_at(deadline, fut).await.ok(),
            None => Some(fut.await),
        }
    }
}
