//! Observability for command invocations.
//!
//! Two layers: `tracing` diagnostics from the framework itself, installed
//! with [`init_tracing`], and an optional markdown [`InvocationLogger`]
//! that records each invocation for later inspection.
//!
//! # Example
//!
//! ```no_run
//! use cmdtree::observability::{init_tracing, InvocationLogger};
//! use std::path::Path;
//!
//! init_tracing("cmdtree=debug");
//!
//! let logger = InvocationLogger::new(Some(Path::new("logs/cli.md")), None).unwrap();
//! logger.log_invocation("actor get-value", &["my-key".to_string()]).unwrap();
//! logger.log_completion(Some("actor get-value"), 0).unwrap();
//! ```

pub mod logger;

pub use logger::InvocationLogger;

use tracing_subscriber::EnvFilter;

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `false` when a
/// global subscriber was already installed, which leaves it in place.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
