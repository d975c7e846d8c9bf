//! Tracing subscriber setup

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Mode;

/// Install the global subscriber: JSON lines in production, human-readable
/// output in development. `RUST_LOG` directives are honored.
pub fn init(mode: Mode) {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());

    match mode {
        Mode::Production => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
        Mode::Development => tracing_subscriber::registry()
            .with(fmt::layer().pretty())
            .with(filter)
            .init(),
    }
}
