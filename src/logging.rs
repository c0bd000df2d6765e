//! Logging setup
//!
//! `tracing` events go through a plain fmt subscriber (no colours, no
//! timestamps: the browser console adds its own) filtered by the configured
//! directive.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::{DashboardError, Result};

/// Parse a filter directive such as `info` or `affiliate_dashboard=debug,warn`
pub fn filter(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive)
        .map_err(|e| DashboardError::Config(format!("invalid LOG_LEVEL {directive:?}: {e}")))
}

/// Install the global subscriber writing to `writer`.
///
/// Fails when the directive does not parse or a subscriber is already set.
pub fn init<W>(directive: &str, writer: W) -> Result<()>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter(directive)?)
        .with_ansi(false)
        .without_time()
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .map_err(|e| DashboardError::Config(format!("logger already installed: {e}")))
}
