// Logging module for structured logging using the tracing crate

use std::error::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the tracing subscriber for structured logging
///
/// Filtering follows `RUST_LOG` when set and defaults to `info`. With
/// `json` set, events are emitted as JSON lines for log aggregation;
/// otherwise the human-readable formatter is used.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_subscriber(json: bool) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()?;
    }
    Ok(())
}
