//! Error types for the command framework
//!
//! Two layers live here. [`InputError`] covers problems with what the user
//! typed: the parser collects them instead of stopping at the first one, so
//! a single report can list everything that is wrong. [`DeclarativeError`]
//! covers everything else: broken descriptors, unknown commands, missing
//! help renderers and I/O. A failed validation is wrapped in
//! [`DeclarativeError::InvalidInput`], whose message is the report shown to
//! the user.

use super::help::layout::{display_width, pad_end};
use thiserror::Error;

/// Result type for framework operations
pub type DeclarativeResult<T> = Result<T, DeclarativeError>;

/// Stable codes for user-input problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputErrorCode {
    /// A required positional argument was not given
    MissingArgument,
    /// A required flag was not given, or was given without a value
    MissingFlag,
    /// The same flag (or one of its aliases) was given more than once
    FlagProvidedMultipleTimes,
    /// An integer flag received something that is not an integer
    InvalidIntegerValue,
    /// A boolean flag received an explicit value other than true/false
    InvalidBooleanValue,
    /// A value is not one of the declared choices
    InvalidChoice,
    /// Two flags that exclude each other were both given
    MutuallyExclusiveFlags,
    /// A flag that the command does not declare
    UnknownFlag,
    /// A positional token with no argument left to bind to
    UnexpectedArgument,
    /// Standard input could not be decoded as text
    InvalidStdinEncoding,
}

/// A problem with the tokens the user supplied.
///
/// Every variant carries the structured data needed to render a message,
/// so callers can inspect a failure without parsing strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// A required positional argument was not bound
    #[error("Missing required argument '{name}'")]
    MissingRequiredArgument {
        /// Declared argument name
        name: String,
        /// Argument description, shown in the missing-arguments report
        description: String,
    },

    /// A required flag is missing, or a value flag was given without a value
    #[error("{}", missing_flag_message(.flag, .matcher.as_deref(), .provided_without_value))]
    MissingRequiredFlag {
        /// Dashed flag name
        flag: String,
        /// Alias the user typed, when it differs from the flag name
        matcher: Option<String>,
        /// The flag was present but no value followed it
        provided_without_value: bool,
    },

    /// The flag was supplied more than once, possibly through different aliases
    #[error("Flag '--{flag}' can only be specified once (received: {})", .keys.join(", "))]
    FlagProvidedMultipleTimes {
        /// Dashed flag name
        flag: String,
        /// Every key the user used for this flag, in order of appearance
        keys: Vec<String>,
    },

    /// An integer flag received a non-integer value
    #[error("The provided value for the '--{flag}' flag could not be processed as an integer. Received: {value}.")]
    InvalidIntegerValue {
        /// Dashed flag name
        flag: String,
        /// Raw value the user supplied
        value: String,
    },

    /// A boolean flag was written as `--flag=<value>` with a non-boolean value
    #[error("Flag '--{flag}' does not take a value (received: {value})")]
    InvalidBooleanValue {
        /// Dashed flag name
        flag: String,
        /// Raw value the user supplied
        value: String,
    },

    /// The value is not a member of the declared choices
    #[error("Invalid value '{value}' for flag '--{flag}'. Allowed values: {}", .choices.join(", "))]
    InvalidChoice {
        /// Dashed flag name
        flag: String,
        /// Value the user supplied
        value: String,
        /// Allowed values, rendered as strings
        choices: Vec<String>,
    },

    /// Two mutually exclusive flags were both supplied
    #[error("Flags '--{flag}' and '--{other}' are mutually exclusive")]
    MutuallyExclusiveFlags {
        /// First flag, in declaration order
        flag: String,
        /// The flag it excludes
        other: String,
    },

    /// The command does not declare this flag
    #[error("{}", unknown_flag_message(.flag, .suggestion.as_deref()))]
    UnknownFlag {
        /// The flag as typed, including dashes
        flag: String,
        /// Closest declared flag, if any is close enough
        suggestion: Option<String>,
    },

    /// A positional token that no argument accepts
    #[error("Unexpected argument '{value}'")]
    UnexpectedArgument {
        /// The surplus token
        value: String,
    },

    /// `-` asked for text but standard input is not valid UTF-8
    #[error("Standard input for '{name}' is not valid UTF-8 text")]
    InvalidStdinEncoding {
        /// Argument name, or the flag with its dashes
        name: String,
    },
}

fn missing_flag_message(flag: &str, matcher: Option<&str>, provided_without_value: &bool) -> String {
    let mut name = format!("'--{}'", flag);
    if let Some(matcher) = matcher {
        name.push_str(&format!(" (alias used: '--{}')", matcher));
    }

    if *provided_without_value {
        format!(
            "Flag {} was provided, but no value was received. Did you mean to pass the value as an argument or through standard input?",
            name
        )
    } else {
        format!("Flag {} is required, but was not provided.", name)
    }
}

fn unknown_flag_message(flag: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(suggestion) => format!("Unknown flag '{}'. Did you mean '--{}'?", flag, suggestion),
        None => format!("Unknown flag '{}'", flag),
    }
}

impl InputError {
    /// Stable code for this error
    pub fn code(&self) -> InputErrorCode {
        match self {
            Self::MissingRequiredArgument { .. } => InputErrorCode::MissingArgument,
            Self::MissingRequiredFlag { .. } => InputErrorCode::MissingFlag,
            Self::FlagProvidedMultipleTimes { .. } => InputErrorCode::FlagProvidedMultipleTimes,
            Self::InvalidIntegerValue { .. } => InputErrorCode::InvalidIntegerValue,
            Self::InvalidBooleanValue { .. } => InputErrorCode::InvalidBooleanValue,
            Self::InvalidChoice { .. } => InputErrorCode::InvalidChoice,
            Self::MutuallyExclusiveFlags { .. } => InputErrorCode::MutuallyExclusiveFlags,
            Self::UnknownFlag { .. } => InputErrorCode::UnknownFlag,
            Self::UnexpectedArgument { .. } => InputErrorCode::UnexpectedArgument,
            Self::InvalidStdinEncoding { .. } => InputErrorCode::InvalidStdinEncoding,
        }
    }

    /// Whether this error is about something required that was not given
    pub fn is_missing_required(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredArgument { .. } | Self::MissingRequiredFlag { .. }
        )
    }
}

/// Errors raised by the framework itself
#[derive(Debug, Error)]
pub enum DeclarativeError {
    /// Command names must be lower-case; anything else corrupts lookups
    #[error("Command name \"{0}\" is not correctly set up internally. Command names must be lower-case.")]
    InvalidCommandName(String),

    /// A descriptor breaks one of its static rules
    #[error("Invalid descriptor for command '{command}': {reason}")]
    InvalidDescriptor {
        /// Command name
        command: String,
        /// Rule that was broken
        reason: String,
    },

    /// Registration would overwrite an existing path
    #[error("Command path '{0}' is already registered")]
    DuplicateCommand(String),

    /// No registered command matches the invocation
    #[error("{}", unknown_command_message(.input, .suggestions))]
    UnknownCommand {
        /// What the user typed
        input: String,
        /// Nearest registered paths
        suggestions: Vec<String>,
    },

    /// Help was requested for a command that was never registered
    #[error("No help renderer found for command {command}")]
    NoHelpRendererRegistered {
        /// Command path
        command: String,
    },

    /// A descriptor names a handler nobody registered
    #[error("Handler not found: {0}")]
    HandlerNotFound(String),

    /// The invocation failed validation.
    ///
    /// Missing arguments are listed first as an aligned block, followed by
    /// every other error on its own line.
    #[error("{}", input_errors_message(.0))]
    InvalidInput(Vec<InputError>),

    /// Config file errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO errors
    #[error("{context}: {source}")]
    Io {
        /// What was being done
        context: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

fn unknown_command_message(input: &str, suggestions: &[String]) -> String {
    let mut message = format!("Command {} not found", input);
    if !suggestions.is_empty() {
        message.push_str(&format!("\n  Did you mean: {}?", suggestions.join(", ")));
    }
    message
}

fn input_errors_message(errors: &[InputError]) -> String {
    let missing: Vec<(&str, &str)> = errors
        .iter()
        .filter_map(|e| match e {
            InputError::MissingRequiredArgument { name, description } => Some((name.as_str(), description.as_str())),
            _ => None,
        })
        .collect();

    let mut lines = Vec::new();
    if !missing.is_empty() {
        lines.push(format!("Missing {} required argument(s):", missing.len()));
        let width = missing.iter().map(|(name, _)| display_width(name)).max().unwrap_or(0);
        for (name, description) in &missing {
            let line = format!("  >  {}  {}", pad_end(name, width), description);
            lines.push(line.trim_end().to_string());
        }
    }

    lines.extend(
        errors
            .iter()
            .filter(|e| !matches!(e, InputError::MissingRequiredArgument { .. }))
            .map(|e| e.to_string()),
    );
    lines.join("\n")
}

impl DeclarativeError {
    /// Create a config error with context
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Wrap an I/O error with what was being done
    pub fn io<S: Into<String>>(context: S, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether any required argument or flag is missing
    pub fn has_missing_required(&self) -> bool {
        match self {
            Self::InvalidInput(errors) => errors.iter().any(InputError::is_missing_required),
            _ => false,
        }
    }

    /// Create a descriptor error for `command`
    pub fn descriptor<C: Into<String>, R: Into<String>>(command: C, reason: R) -> Self {
        Self::InvalidDescriptor {
            command: command.into(),
            reason: reason.into(),
        }
    }
}
