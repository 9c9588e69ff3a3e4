#![forbid(unsafe_code)]

//! Process-wide log output.
//!
//! shelfkit crates only emit `tracing` events. Applications that have no
//! subscriber of their own can install one here:
//!
//! ```rust,no_run
//! shelfkit::logging::init("shelfkit_pages=info,shelfkit_forms=debug")?;
//! # Ok::<(), shelfkit::Error>(())
//! ```
//!
//! `RUST_LOG`, when set, overrides the filter passed in.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{Error, Result};

/// Default directive when neither `RUST_LOG` nor a filter is given.
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the installed pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    #[cfg(feature = "logging-json")]
    Json,
}

fn filter(directives: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directives = if directives.is_empty() {
        DEFAULT_FILTER
    } else {
        directives
    };
    EnvFilter::try_new(directives).map_err(|e| Error::Logging(e.to_string()))
}

/// Install a human-readable subscriber filtered by `directives`.
pub fn init(directives: &str) -> Result<()> {
    init_with(directives, LogFormat::default())
}

/// Install a subscriber in the given format.
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_with(directives: &str, format: LogFormat) -> Result<()> {
    let filter = filter(directives)?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        #[cfg(feature = "logging-json")]
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };
    installed.map_err(|e| Error::Logging(e.to_string()))?;
    tracing::debug!(?format, "logging initialized");
    Ok(())
}
