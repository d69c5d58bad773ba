//! Configuration management.
//!
//! Command trees are loaded from TOML or JSON with
//! [`CliConfig`](crate::cli::config::CliConfig); this module adds
//! environment handling through `.env` files and prefixed variables.
//!
//! # Example
//!
//! ```no_run
//! use cmdtree::config::EnvironmentLoader;
//! use std::path::Path;
//!
//! let env = EnvironmentLoader::with_prefix(Some(Path::new(".env")), "APIFY");
//! println!("Line width: {}", env.resolved_line_width(None));
//! println!("Log filter: {}", env.log_filter());
//! ```

pub mod environment;

pub use self::environment::EnvironmentLoader;
