//! # CPM Telemetry
//!
//! Logging bootstrap for the preference contract and its runtime.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cpm_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//!     // invocations are now logged
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CPM_SERVICE_NAME` | `cpm-preferences` | Service name |
//! | `CPM_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `CPM_JSON_LOGS` | `false` (`true` in containers) | JSON records |
//! | `CPM_LOG_SOURCE` | `false` | File and line in records |

mod config;
mod logging;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Initialize logging.
///
/// Returns a guard to hold for the lifetime of the process; dropping it
/// logs the shutdown.
///
/// # Errors
///
/// See [`init_logging`].
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    init_logging(config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// Guard that keeps telemetry active.
#[derive(Debug)]
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
