//! Declarative command trees
//!
//! Commands are described as data ([`CommandDescriptor`]), registered in a
//! [`CommandRegistry`] under every name combination, parsed and validated
//! in one pass, rendered as help, and dispatched to async handlers by
//! [`DeclarativeCli`].
//!
//! # Example
//!
//! ```no_run
//! use cmdtree::cli::{AppInfo, ArgSpec, CommandDescriptor, CommandOutcome, DeclarativeCli, FlagSpec};
//!
//! let mut cli = DeclarativeCli::new(AppInfo::new("apify", "1.0.0")).unwrap();
//! cli.register(
//!     CommandDescriptor::new("actor").subcommand(
//!         CommandDescriptor::new("set-value")
//!             .arg(ArgSpec::string("key").required())
//!             .arg(ArgSpec::string("value").stdin())
//!             .flag(FlagSpec::string("content-type").short('c')),
//!     ),
//! )
//! .unwrap();
//! cli.register_fn("actor::set-value", |ctx| async move {
//!     ctx.output.success(&format!("Stored {}", ctx.arg("key").unwrap_or_default()));
//!     Ok(CommandOutcome::ok())
//! });
//!
//! std::process::exit(cli.run_blocking().code());
//! ```

pub mod descriptor;
pub mod error;
pub mod executor;
pub mod help;
pub mod naming;
pub mod output;
pub mod parser;
pub mod registry;
pub mod stdin;

#[cfg(feature = "config")]
pub mod config;

#[cfg(test)]
pub mod test_utils;

// Re-exports for convenience
pub use descriptor::{ArgKind, ArgSpec, CommandDescriptor, FlagKind, FlagSpec, StdinMode, Value};
pub use error::{DeclarativeError, DeclarativeResult, InputError, InputErrorCode};
pub use executor::{
    CommandContext, CommandFailure, CommandHandler, CommandOutcome, DeclarativeCli, ExitStatus,
};
pub use help::{AppInfo, CommandHelp, HelpIndex, HelpSettings, SelectiveRenderOptions};
pub use output::{CapturedStreams, Output};
pub use parser::{parse, ParsedInvocation};
pub use registry::{CommandRegistry, RegisteredCommand, Resolution};
pub use stdin::StdinCache;

#[cfg(feature = "config")]
pub use config::{AppConfig, CliConfig};
