//! Environment variable loading.
//!
//! Reads `.env` files and the prefixed variables that tune the CLI at run
//! time: `<PREFIX>_MAX_LINE_WIDTH`, `<PREFIX>_DEBUG` and `RUST_LOG`.

use crate::cli::help::{resolve_max_line_width, DEFAULT_ENV_PREFIX};
use std::env;
use std::path::Path;

/// Loads environment variables from a .env file and the process environment.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    prefix: String,
    env_file: Option<String>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to a .env file. Nothing is loaded when None.
    pub fn new(env_file: Option<&Path>) -> Self {
        Self::with_prefix(env_file, DEFAULT_ENV_PREFIX)
    }

    /// Initialize the loader with a custom variable prefix.
    ///
    /// # Arguments
    /// * `env_file` - Path to a .env file. Nothing is loaded when None.
    /// * `prefix` - Prefix for CLI variables, e.g. `APIFY` for `APIFY_DEBUG`.
    pub fn with_prefix(env_file: Option<&Path>, prefix: &str) -> Self {
        // Only an explicit path is loaded, so a stray .env in the working
        // directory never changes help layout.
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    tracing::warn!(path = %path.display(), error = %e, "failed to load .env file");
                }
            }
        }

        Self {
            prefix: prefix.to_string(),
            env_file: env_file.map(|p| p.to_string_lossy().to_string()),
        }
    }

    /// Variable prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The .env file this loader was created with
    pub fn env_file(&self) -> Option<&str> {
        self.env_file.as_deref()
    }

    fn var(&self, name: &str) -> Option<String> {
        env::var(format!("{}_{}", self.prefix, name)).ok()
    }

    /// Explicit help line width from `<PREFIX>_MAX_LINE_WIDTH`
    pub fn max_line_width(&self) -> Option<usize> {
        self.var("MAX_LINE_WIDTH").and_then(|v| v.trim().parse().ok())
    }

    /// Help line width after applying every override source
    pub fn resolved_line_width(&self, override_width: Option<usize>) -> usize {
        resolve_max_line_width(override_width, &self.prefix)
    }

    /// Whether `<PREFIX>_DEBUG` is set to a truthy value
    pub fn debug_enabled(&self) -> bool {
        self.var("DEBUG")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false)
    }

    /// Tracing filter: `RUST_LOG`, else `debug` when debugging is on, else `warn`
    pub fn log_filter(&self) -> String {
        env::var("RUST_LOG").ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| {
            if self.debug_enabled() {
                "debug".to_string()
            } else {
                "warn".to_string()
            }
        })
    }
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
