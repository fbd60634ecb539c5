// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the CodeClarity action.
//!
//! Uses `tracing` with `tracing-subscriber` for structured logging to stderr.
//! Log level can be controlled via the `RUST_LOG` environment variable.
//!
//! # Examples
//!
//! ```bash
//! # Default: warnings only
//! cargo run
//!
//! # Debug output for troubleshooting
//! RUST_LOG=clarity=debug,codeclarity_action=debug cargo run
//!
//! # Include request-level logs from reqwest
//! RUST_LOG=clarity=trace,reqwest=debug cargo run
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter directives.
const DEFAULT_FILTER: &str = "clarity=warn,codeclarity_action=warn,reqwest=error";

/// Default filter directives with `-v`.
const VERBOSE_FILTER: &str = "clarity=debug,codeclarity_action=debug,reqwest=warn";

/// Returns the default filter directives for the verbosity.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Initialize the logging subsystem.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects between warnings
/// only and debug output for the action's own crates.
pub fn init_logging(verbose: bool) {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
