#![forbid(unsafe_code)]

//! `gridboard`: a command-line front end for the layout engine.
//!
//! Every command loads a dashboard document, applies one engine operation,
//! and writes the document back.

pub mod cli;
pub mod commands;
pub mod error;
pub mod profile;
pub mod render;
pub mod store;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{CliError, Result};

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "GRIDBOARD_LOG";

/// Install the stderr subscriber. Safe to call more than once.
pub fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    if installed.is_ok() {
        tracing::debug!(json, "logging initialised");
    }
}
