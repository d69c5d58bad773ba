//! CLI executor - the main DeclarativeCli type
//!
//! [`DeclarativeCli`] owns the command registry and the handler table.
//! One invocation flows through: main menu / version short-circuits,
//! command resolution, `--help`, group handling, parsing, a single combined
//! report of every input error, and finally the command's handler.
//!
//! Usage: `std::process::exit(DeclarativeCli::from_file("cli.toml")?.run_blocking().code())`

use super::descriptor::{ArgSpec, CommandDescriptor, HELP_FLAG, HELP_SHORT, JSON_FLAG};
use super::error::{DeclarativeError, DeclarativeResult, InputError};
use super::help::{AppInfo, HelpSettings, SelectiveRenderOptions};
use super::output::Output;
use super::parser::{parse, ParsedInvocation, END_OF_FLAGS};
use super::registry::{CommandRegistry, RegisteredCommand};
use super::stdin::StdinCache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

#[cfg(feature = "observability")]
use crate::observability::InvocationLogger;

/// Handler name that renders help for its `command` argument
pub const BUILTIN_HELP: &str = "builtin::help";

/// Handler name that prints `<name> <version>`
pub const BUILTIN_VERSION: &str = "builtin::version";

/// Process exit status of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Completed normally
    Success,
    /// The command failed, or no handler was bound to it
    Failure,
    /// A required argument or flag was missing
    MissingRequired,
    /// No command matched the invocation
    UnknownCommand,
    /// Any other input validation error
    InvalidInput,
    /// Code chosen by the command
    Custom(i32),
}

impl ExitStatus {
    /// Numeric exit code
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
            ExitStatus::MissingRequired => 2,
            ExitStatus::UnknownCommand => 3,
            ExitStatus::InvalidInput => 4,
            ExitStatus::Custom(code) => code,
        }
    }

    /// Status for a numeric code
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ExitStatus::Success,
            1 => ExitStatus::Failure,
            2 => ExitStatus::MissingRequired,
            3 => ExitStatus::UnknownCommand,
            4 => ExitStatus::InvalidInput,
            other => ExitStatus::Custom(other),
        }
    }

    /// Whether this is [`ExitStatus::Success`]
    pub fn is_success(self) -> bool {
        self == ExitStatus::Success
    }
}

/// An error that carries the exit code the process should end with
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct CommandFailure {
    /// Exit code passed through unchanged
    pub code: i32,
    /// Message printed after `Error:`
    pub message: String,
}

impl CommandFailure {
    /// Create a failure with an explicit exit code
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// What a handler returns on success
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    /// Exit status of the invocation
    pub status: ExitStatus,
    /// Structured result, printed when `--json` is set
    pub json: Option<serde_json::Value>,
}

impl CommandOutcome {
    /// Plain success
    pub fn ok() -> Self {
        Self {
            status: ExitStatus::Success,
            json: None,
        }
    }

    /// Success with a structured result
    pub fn json(value: serde_json::Value) -> Self {
        Self {
            status: ExitStatus::Success,
            json: Some(value),
        }
    }

    /// Finish with a specific exit code
    pub fn exit(code: i32) -> Self {
        Self {
            status: ExitStatus::from_code(code),
            json: None,
        }
    }
}

/// Everything a handler gets for one invocation
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Canonical command path
    pub path: Vec<String>,
    /// Bound arguments and flags
    pub invocation: ParsedInvocation,
    /// Output sink; in JSON mode status messages are suppressed
    pub output: Output,
    /// Shared standard input capture
    pub stdin: StdinCache,
    /// Whether `--json` was given
    pub json: bool,
}

impl CommandContext {
    /// String argument by any spelling of its name
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.invocation.string_arg(name)
    }

    /// String flag by any spelling of its name
    pub fn flag(&self, name: &str) -> Option<&str> {
        self.invocation.string_flag(name)
    }

    /// Boolean flag; `false` when unset
    pub fn flag_bool(&self, name: &str) -> bool {
        self.invocation.flag_bool(name)
    }

    /// Integer flag
    pub fn flag_i64(&self, name: &str) -> Option<i64> {
        self.invocation.flag_i64(name)
    }

    /// Argument bytes, including input bound from raw stdin
    pub fn arg_bytes(&self, name: &str) -> Option<&[u8]> {
        self.invocation.bytes_arg(name)
    }

    /// Flag bytes, including input bound from raw stdin
    pub fn flag_bytes(&self, name: &str) -> Option<&[u8]> {
        self.invocation.bytes_flag(name)
    }

    /// Canonical path joined with spaces
    pub fn path_string(&self) -> String {
        self.path.join(" ")
    }
}

/// Business logic behind a command
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Run the command. Errors are printed once as `Error: <message>`.
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<CommandOutcome>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(CommandContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<CommandOutcome>> + Send,
{
    async fn run(&self, ctx: CommandContext) -> anyhow::Result<CommandOutcome> {
        (self.0)(ctx).await
    }
}

/// Main declarative CLI type
pub struct DeclarativeCli {
    app: AppInfo,
    registry: CommandRegistry,
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
    output: Output,
    stdin: StdinCache,
    #[cfg(feature = "observability")]
    logger: Option<InvocationLogger>,
}

impl DeclarativeCli {
    /// Create a CLI with help settings detected from the terminal
    pub fn new(app: AppInfo) -> DeclarativeResult<Self> {
        Self::with_help_settings(app, HelpSettings::detect())
    }

    /// Create a CLI with explicit help settings.
    ///
    /// A hidden `help` command is registered up front.
    pub fn with_help_settings(app: AppInfo, settings: HelpSettings) -> DeclarativeResult<Self> {
        let mut registry = CommandRegistry::with_help_settings(app.name.clone(), settings);
        registry.register(help_command())?;

        Ok(Self {
            app,
            registry,
            handlers: HashMap::new(),
            output: Output::stdio(),
            stdin: StdinCache::process(),
            #[cfg(feature = "observability")]
            logger: None,
        })
    }

    /// Build a CLI from a loaded config and register its command tree
    #[cfg(feature = "config")]
    pub fn from_config(config: &super::config::CliConfig) -> DeclarativeResult<Self> {
        use std::io::IsTerminal;

        let env = crate::config::EnvironmentLoader::with_prefix(None, &config.app.env_prefix());
        let settings = HelpSettings {
            max_line_width: env.resolved_line_width(config.app.max_line_width),
            styled: std::io::stdout().is_terminal(),
        };

        let mut cli = Self::with_help_settings(config.app.app_info(), settings)?;
        for command in &config.commands {
            cli.register(command.clone())?;
        }

        #[cfg(feature = "observability")]
        if let Some(path) = config.app.log_file_path()? {
            let logger = InvocationLogger::new(Some(&path), None)
                .map_err(|e| DeclarativeError::config(format!("Failed to open log file: {}", e)))?;
            cli.logger = Some(logger);
        }

        Ok(cli)
    }

    /// Auto-detect format, load the config file and build the CLI
    #[cfg(feature = "config")]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> DeclarativeResult<Self> {
        let config = super::config::CliConfig::from_file(path)?;
        Self::from_config(&config)
    }

    /// Replace the output sink
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Replace the standard input source
    pub fn with_stdin(mut self, stdin: StdinCache) -> Self {
        self.stdin = stdin;
        self
    }

    /// Record every invocation in a markdown log
    #[cfg(feature = "observability")]
    pub fn with_logger(mut self, logger: InvocationLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Register a command tree
    pub fn register(&mut self, descriptor: CommandDescriptor) -> DeclarativeResult<()> {
        self.registry.register(descriptor)
    }

    /// Bind a handler to a handler name
    pub fn register_handler(&mut self, name: impl Into<String>, handler: impl CommandHandler + 'static) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    /// Bind an async closure to a handler name
    pub fn register_fn<F, Fut>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<CommandOutcome>> + Send + 'static,
    {
        self.register_handler(name, FnHandler(handler));
    }

    /// The command registry
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Application info
    pub fn app(&self) -> &AppInfo {
        &self.app
    }

    /// Check that every runnable command has a handler.
    ///
    /// Group commands without a declared handler are exempt: they print
    /// their own help.
    pub fn validate_handlers(&self) -> DeclarativeResult<()> {
        for command in self.registry.commands() {
            let descriptor = &command.descriptor;
            if descriptor.has_subcommands() && descriptor.handler.is_none() {
                continue;
            }
            let name = command.handler_name();
            if !self.has_handler(&name) {
                return Err(DeclarativeError::HandlerNotFound(name));
            }
        }
        Ok(())
    }

    fn has_handler(&self, name: &str) -> bool {
        name == BUILTIN_HELP || name == BUILTIN_VERSION || self.handlers.contains_key(name)
    }

    /// Run with the process arguments on a current-thread runtime
    pub fn run_blocking(&self) -> ExitStatus {
        match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime.block_on(self.run()),
            Err(e) => {
                let err = DeclarativeError::io("Failed to start async runtime", e);
                self.output.error(&err.to_string());
                self.record_error(None, &err.to_string());
                ExitStatus::Failure
            }
        }
    }

    /// Run with the process arguments
    pub async fn run(&self) -> ExitStatus {
        self.run_from(std::env::args().skip(1)).await
    }

    /// Run one invocation. `args` excludes the program name.
    pub async fn run_from<I, T>(&self, args: I) -> ExitStatus
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let (path, status) = self.dispatch(&args).await;

        tracing::debug!(command = path.as_deref().unwrap_or("-"), code = status.code(), "invocation finished");
        self.record_completion(path.as_deref(), status.code());
        status
    }

    async fn dispatch(&self, args: &[String]) -> (Option<String>, ExitStatus) {
        if args.len() == 1 && (args[0] == "--version" || args[0] == "-v") {
            self.output.print(&self.app.version_line());
            return (None, ExitStatus::Success);
        }
        if wants_main_menu(args) {
            self.output.print(&self.registry.help().render_main_menu(&self.app));
            return (None, ExitStatus::Success);
        }

        let resolution = match self.registry.resolve(args) {
            Ok(resolution) => resolution,
            Err(e) => {
                self.output.error(&e.to_string());
                self.record_error(None, &e.to_string());
                return (None, ExitStatus::UnknownCommand);
            }
        };

        let command = resolution.command;
        let path = command.path_string();
        self.record_invocation(&path, &resolution.remaining);

        let mut before_end = resolution.remaining.iter().take_while(|t| *t != END_OF_FLAGS);
        if before_end.any(|t| is_help_token(t)) {
            return (Some(path), self.print_help(&command.path));
        }

        let handler_name = command.handler_name();
        if command.descriptor.has_subcommands() && !self.has_handler(&handler_name) {
            let status = match resolution.remaining.first() {
                Some(unknown) if !unknown.starts_with('-') => {
                    let input = format!("{} {}", resolution.matched.join(" "), unknown);
                    let err = DeclarativeError::UnknownCommand {
                        suggestions: self.registry.suggest(&input),
                        input,
                    };
                    self.output.error(&err.to_string());
                    self.record_error(Some(&path), &err.to_string());
                    ExitStatus::UnknownCommand
                }
                Some(_) => {
                    // Flags on a group are checked against the group's own descriptor
                    let invocation = parse(&resolution.remaining, &command.descriptor, &self.stdin);
                    if invocation.is_valid() {
                        self.print_help(&command.path)
                    } else {
                        self.record_validation_failure(&path, &invocation.errors);
                        self.report_invalid_input(&command, &invocation)
                    }
                }
                None => self.print_help(&command.path),
            };
            return (Some(path), status);
        }

        let invocation = parse(&resolution.remaining, &command.descriptor, &self.stdin);
        let status = self.execute(&command, invocation).await;
        (Some(path), status)
    }

    /// Run a resolved command with a parsed invocation.
    ///
    /// Input errors are reported together with the usage line and the
    /// handler is never called. Handler errors are printed once.
    pub async fn execute(&self, command: &RegisteredCommand, invocation: ParsedInvocation) -> ExitStatus {
        let path = command.path_string();

        if !invocation.is_valid() {
            self.record_validation_failure(&path, &invocation.errors);
            return self.report_invalid_input(command, &invocation);
        }

        let handler_name = command.handler_name();
        match handler_name.as_str() {
            BUILTIN_HELP => return self.builtin_help(&invocation),
            BUILTIN_VERSION => {
                self.output.print(&self.app.version_line());
                return ExitStatus::Success;
            }
            _ => {}
        }

        let Some(handler) = self.handlers.get(&handler_name) else {
            let err = DeclarativeError::HandlerNotFound(handler_name);
            self.output.error(&err.to_string());
            self.record_error(Some(&path), &err.to_string());
            return ExitStatus::Failure;
        };

        let json = command.descriptor.json_flag && invocation.flag_bool(JSON_FLAG);
        let output = self.output.with_json_mode(json);
        let ctx = CommandContext {
            path: command.path.clone(),
            invocation,
            output: output.clone(),
            stdin: self.stdin.clone(),
            json,
        };

        tracing::debug!(command = %path, handler = %handler_name, json, "running handler");
        match handler.run(ctx).await {
            Ok(outcome) => {
                if json {
                    if let Some(value) = &outcome.json {
                        output.json(value);
                    }
                }
                outcome.status
            }
            Err(e) => {
                let status = match e.downcast_ref::<CommandFailure>() {
                    Some(failure) => ExitStatus::from_code(failure.code),
                    None => ExitStatus::Failure,
                };
                let message = format!("{:#}", e);
                output.error(&message);
                self.record_error(Some(&path), &message);
                status
            }
        }
    }

    fn report_invalid_input(&self, command: &RegisteredCommand, invocation: &ParsedInvocation) -> ExitStatus {
        let err = DeclarativeError::InvalidInput(invocation.errors.clone());
        self.output
            .error(&format!("{}\n  See more help with --{}", err, HELP_FLAG));

        let options = SelectiveRenderOptions {
            show_subcommands: command.descriptor.has_subcommands(),
            ..SelectiveRenderOptions::usage_only()
        };
        match self.registry.help().selective_render(&command.path, options) {
            Ok(usage) => {
                self.output.print_err("");
                self.output.print_err(&usage);
            }
            Err(e) => tracing::warn!(error = %e, "failed to render usage"),
        }

        if err.has_missing_required() {
            ExitStatus::MissingRequired
        } else {
            ExitStatus::InvalidInput
        }
    }

    fn print_help(&self, path: &[String]) -> ExitStatus {
        match self.registry.help().render(path) {
            Ok(text) => {
                self.output.print(&text);
                ExitStatus::Success
            }
            Err(e) => {
                self.output.error(&e.to_string());
                ExitStatus::Failure
            }
        }
    }

    fn builtin_help(&self, invocation: &ParsedInvocation) -> ExitStatus {
        let Some(target) = invocation.string_arg("command").filter(|s| !s.trim().is_empty()) else {
            self.output.print(&self.registry.help().render_main_menu(&self.app));
            return ExitStatus::Success;
        };

        let tokens: Vec<String> = target.split_whitespace().map(String::from).collect();
        match self.registry.resolve(&tokens) {
            Ok(resolution) if resolution.remaining.is_empty() => self.print_help(&resolution.command.path),
            _ => {
                let err = DeclarativeError::UnknownCommand {
                    suggestions: self.registry.suggest(target),
                    input: target.to_string(),
                };
                self.output.error(&err.to_string());
                ExitStatus::UnknownCommand
            }
        }
    }

    fn record_invocation(&self, path: &str, args: &[String]) {
        #[cfg(feature = "observability")]
        self.log_with(|logger| logger.log_invocation(path, args));
        #[cfg(not(feature = "observability"))]
        let _ = (path, args);
    }

    fn record_validation_failure(&self, path: &str, errors: &[InputError]) {
        #[cfg(feature = "observability")]
        self.log_with(|logger| logger.log_validation_failure(path, errors));
        #[cfg(not(feature = "observability"))]
        let _ = (path, errors);
    }

    fn record_error(&self, path: Option<&str>, message: &str) {
        #[cfg(feature = "observability")]
        self.log_with(|logger| logger.log_error(path, message));
        #[cfg(not(feature = "observability"))]
        let _ = (path, message);
    }

    fn record_completion(&self, path: Option<&str>, code: i32) {
        #[cfg(feature = "observability")]
        self.log_with(|logger| logger.log_completion(path, code));
        #[cfg(not(feature = "observability"))]
        let _ = (path, code);
    }

    #[cfg(feature = "observability")]
    fn log_with(&self, write: impl FnOnce(&InvocationLogger) -> anyhow::Result<()>) {
        if let Some(logger) = &self.logger {
            if let Err(e) = write(logger) {
                tracing::warn!(error = %e, "failed to write invocation log");
            }
        }
    }
}

impl std::fmt::Debug for DeclarativeCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut handlers: Vec<&String> = self.handlers.keys().collect();
        handlers.sort();
        f.debug_struct("DeclarativeCli")
            .field("app", &self.app)
            .field("commands", &self.registry.len())
            .field("handlers", &handlers)
            .finish()
    }
}

fn is_help_token(token: &str) -> bool {
    token == format!("--{}", HELP_FLAG) || token == format!("-{}", HELP_SHORT)
}

/// No command named before the first flag: `[]`, `--json`, `-h -x`.
/// A help token anywhere before `--` also asks for the menu.
fn wants_main_menu(args: &[String]) -> bool {
    let Some(first) = args.first() else {
        return true;
    };
    if !first.starts_with('-') {
        return false;
    }

    let end = args.iter().position(|t| t == END_OF_FLAGS).unwrap_or(args.len());
    let (flags, after_end) = args.split_at(end);
    let wants_help = flags.iter().any(|t| is_help_token(t));
    let has_positional = flags.iter().any(|t| !t.starts_with('-')) || after_end.len() > 1;
    wants_help || !has_positional
}

fn help_command() -> CommandDescriptor {
    CommandDescriptor::new("help")
        .hide()
        .short_description("Prints out help about a command, or all available commands.")
        .arg(
            ArgSpec::string("command")
                .catch_all()
                .description("The command to get help for."),
        )
        .handler(BUILTIN_HELP)
}
