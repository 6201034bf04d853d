//! # Ledger Telemetry
//!
//! Structured logging for the ledger bridge workspace, built on `tracing`
//! and `tracing-subscriber`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LEDGER_LOG_LEVEL` / `RUST_LOG` | `info` | Level filter |
//! | `LEDGER_JSON_LOGS` | `false` | JSON output |
//! | `LEDGER_CONSOLE_OUTPUT` | `true` | Console output |
//! | `LEDGER_SERVICE_NAME` | `ledger-bridge` | Service name |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging, LoggingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("a global subscriber is already installed")]
    AlreadyInitialized,

    #[error("Invalid configuration: {0}")]
    Config(String),
}
