//! cmdtree - declarative command trees for command-line tools
//!
//! cmdtree turns a tree of command descriptors into a working CLI:
//!
//! - **`cli`** - descriptors, registry, parser/validator, help rendering and execution
//! - **`config`** - `.env` and prefixed environment variables (with the `config` feature)
//! - **`observability`** - `tracing` setup and a markdown invocation log
//!   (with the `observability` feature)
//!
//! # Features
//!
//! Both optional features are on by default:
//!
//! ```toml
//! [dependencies]
//! cmdtree = { version = "0.1", default-features = false }
//! # Or pick what you need:
//! cmdtree = { version = "0.1", default-features = false, features = ["config"] }
//! ```
//!
//! # Example: a command tree from a config file
//!
//! ```no_run
//! use cmdtree::prelude::*;
//!
//! let mut cli = DeclarativeCli::from_file("cli.toml").unwrap();
//! cli.register_fn("actor::get-value", |ctx| async move {
//!     let key = ctx.arg("key").unwrap_or_default().to_string();
//!     ctx.output.print(&key);
//!     Ok(CommandOutcome::ok())
//! });
//!
//! std::process::exit(cli.run_blocking().code());
//! ```

#![warn(missing_docs)]

/// Command descriptors, parsing, help and execution
pub mod cli;

/// Configuration management (enabled with the `config` feature)
#[cfg(feature = "config")]
pub mod config;

/// Observability utilities (enabled with the `observability` feature)
#[cfg(feature = "observability")]
pub mod observability;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cli::{
        AppInfo, ArgSpec, CommandContext, CommandDescriptor, CommandFailure, CommandHandler,
        CommandOutcome, DeclarativeCli, DeclarativeError, DeclarativeResult, ExitStatus,
        FlagSpec, InputError, Output, StdinCache,
    };

    #[cfg(feature = "config")]
    pub use crate::cli::CliConfig;

    #[cfg(feature = "config")]
    pub use crate::config::EnvironmentLoader;

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_tracing, InvocationLogger};
}
