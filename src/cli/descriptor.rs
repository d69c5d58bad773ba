//! Command descriptors
//!
//! A [`CommandDescriptor`] is the static shape of one command: its name,
//! aliases, positional [`ArgSpec`]s, [`FlagSpec`]s and child subcommands.
//! Descriptors can be built in code with the builder methods or
//! deserialized from a config file; either way they are validated once at
//! registration and never mutated afterwards.

use super::error::{DeclarativeError, DeclarativeResult};
use super::naming::{canonical_key, dashed, strip_negation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Name of the implicit JSON output flag
pub const JSON_FLAG: &str = "json";

/// Name of the global help flag
pub const HELP_FLAG: &str = "help";

/// Short form of the global help flag
pub const HELP_SHORT: char = 'h';

/// A bound argument or flag value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean flag value
    Boolean(bool),
    /// Integer flag value
    Integer(i64),
    /// String argument or flag value
    String(String),
    /// Raw standard input bound in [`StdinMode::Raw`]
    Bytes(Vec<u8>),
}

impl Value {
    /// String content, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer content, if this is an integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Byte content of a raw or string value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    fn matches_kind(&self, kind: FlagKind) -> bool {
        matches!(
            (self, kind),
            (Value::String(_), FlagKind::String)
                | (Value::Boolean(_), FlagKind::Boolean)
                | (Value::Integer(_), FlagKind::Integer)
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

/// Kind of a positional argument
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    /// Plain string
    #[default]
    String,
}

/// How captured standard input is bound when `-` is substituted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StdinMode {
    /// Decoded as UTF-8 text; undecodable input is an input error
    #[default]
    Stringified,
    /// Bound as bytes, untouched
    Raw,
}

/// Kind of a flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    /// Takes a string value
    String,
    /// Presence flag, negatable with `--no-<name>`
    Boolean,
    /// Takes an integer value
    Integer,
}

impl FlagKind {
    /// Whether the flag consumes a value token
    pub fn takes_value(self) -> bool {
        !matches!(self, FlagKind::Boolean)
    }
}

/// One positional argument. Declaration order is binding order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgSpec {
    /// Argument name as shown in help
    pub name: String,

    /// Value kind
    #[serde(rename = "type", default)]
    pub kind: ArgKind,

    /// Whether the argument must be supplied
    #[serde(default)]
    pub required: bool,

    /// Help text
    #[serde(default)]
    pub description: String,

    /// Consumes every remaining positional token, joined with spaces
    #[serde(default)]
    pub catch_all: bool,

    /// `-` is replaced with captured standard input
    #[serde(default)]
    pub stdin: bool,

    /// Whether substituted input is bound as text or bytes
    #[serde(default)]
    pub stdin_mode: StdinMode,
}

impl ArgSpec {
    /// A string argument, optional until marked otherwise
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ArgKind::String,
            required: false,
            description: String::new(),
            catch_all: false,
            stdin: false,
            stdin_mode: StdinMode::Stringified,
        }
    }

    /// Mark the argument as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the help text
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Consume all remaining positionals
    pub fn catch_all(mut self) -> Self {
        self.catch_all = true;
        self
    }

    /// Accept `-` as "read standard input"
    pub fn stdin(mut self) -> Self {
        self.stdin = true;
        self
    }

    /// Accept `-` and bind standard input as raw bytes
    pub fn stdin_raw(mut self) -> Self {
        self.stdin = true;
        self.stdin_mode = StdinMode::Raw;
        self
    }

    /// Key the bound value is stored under
    pub fn key(&self) -> String {
        canonical_key(&self.name)
    }
}

/// One flag, keyed by its canonical name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagSpec {
    /// Flag name in any spelling; rendered dashed
    pub name: String,

    /// Value kind
    #[serde(rename = "type")]
    pub kind: FlagKind,

    /// Single-character short form (`-x`)
    #[serde(default)]
    pub short: Option<char>,

    /// Alternative long names
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Help text
    #[serde(default)]
    pub description: String,

    /// Whether the flag must be supplied
    #[serde(default)]
    pub required: bool,

    /// Value bound when the user does not supply one
    #[serde(default)]
    pub default: Option<Value>,

    /// Allowed values
    #[serde(default)]
    pub choices: Vec<Value>,

    /// Flags that may not be combined with this one
    #[serde(default)]
    pub exclusive: Vec<String>,

    /// `-` is replaced with captured standard input
    #[serde(default)]
    pub stdin: bool,

    /// Whether substituted input is bound as text or bytes
    #[serde(default)]
    pub stdin_mode: StdinMode,

    /// Parsed normally but left out of help
    #[serde(default)]
    pub hidden: bool,
}

impl FlagSpec {
    fn new(name: impl Into<String>, kind: FlagKind) -> Self {
        Self {
            name: name.into(),
            kind,
            short: None,
            aliases: Vec::new(),
            description: String::new(),
            required: false,
            default: None,
            choices: Vec::new(),
            exclusive: Vec::new(),
            stdin: false,
            stdin_mode: StdinMode::Stringified,
            hidden: false,
        }
    }

    /// A string flag
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::String)
    }

    /// A boolean flag
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Boolean)
    }

    /// An integer flag
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Integer)
    }

    /// Set the short form
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Add a long alias
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the help text
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the flag as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Restrict the flag to a set of values
    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Declare a flag this one cannot be combined with
    pub fn exclusive_with(mut self, other: impl Into<String>) -> Self {
        self.exclusive.push(other.into());
        self
    }

    /// Accept `-` as "read standard input"
    pub fn stdin(mut self) -> Self {
        self.stdin = true;
        self
    }

    /// Accept `-` and bind standard input as raw bytes
    pub fn stdin_raw(mut self) -> Self {
        self.stdin = true;
        self.stdin_mode = StdinMode::Raw;
        self
    }

    /// Hide from help output
    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Name as the user writes it, without dashes (`content-type`)
    pub fn dashed_name(&self) -> String {
        dashed(&self.name)
    }

    /// Key the bound value is stored under (`contentType`)
    pub fn key(&self) -> String {
        canonical_key(&self.name)
    }

    /// Dashed name of the underlying switch, and whether the declared
    /// name negates it.
    ///
    /// Only booleans are negatable: a boolean declared as `no-browser` is a
    /// negation of the `browser` switch. Other kinds keep their full name.
    pub fn switch_name(&self) -> (String, bool) {
        let dashed_name = self.dashed_name();
        if self.kind != FlagKind::Boolean {
            return (dashed_name, false);
        }

        let (base, negated) = strip_negation(&dashed_name);
        (base.to_string(), negated)
    }

    /// Every long key (dashed) that selects this flag, declared name first
    pub fn long_keys(&self) -> Vec<String> {
        let mut keys = vec![self.dashed_name()];
        if self.kind == FlagKind::Boolean {
            let (base, negated) = self.switch_name();
            if negated {
                keys.push(base);
            } else {
                keys.push(format!("no-{}", base));
            }
        }

        for alias in &self.aliases {
            let alias = dashed(alias);
            if !keys.contains(&alias) {
                keys.push(alias);
            }
        }

        keys
    }

    /// Allowed values rendered as strings
    pub fn choice_strings(&self) -> Vec<String> {
        self.choices.iter().map(|c| c.to_string()).collect()
    }
}

/// Static metadata describing one command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// Canonical (lower-case) name
    pub name: String,

    /// Listed aliases
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Aliases that resolve but are never listed
    #[serde(default)]
    pub hidden_aliases: Vec<String>,

    /// Full description, shown in the DESCRIPTION section
    #[serde(default)]
    pub description: Option<String>,

    /// One-line summary; falls back to the first line of `description`
    #[serde(default)]
    pub short_description: Option<String>,

    /// Positional arguments in binding order
    #[serde(default)]
    pub args: Vec<ArgSpec>,

    /// Flags
    #[serde(default)]
    pub flags: Vec<FlagSpec>,

    /// Child commands
    #[serde(default)]
    pub subcommands: Vec<CommandDescriptor>,

    /// Adds the implicit `--json` flag
    #[serde(default)]
    pub json_flag: bool,

    /// Left out of command listings
    #[serde(default)]
    pub hidden: bool,

    /// Name of the handler that runs this command
    #[serde(default)]
    pub handler: Option<String>,
}

impl CommandDescriptor {
    /// Create a descriptor with nothing but a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            hidden_aliases: Vec::new(),
            description: None,
            short_description: None,
            args: Vec::new(),
            flags: Vec::new(),
            subcommands: Vec::new(),
            json_flag: false,
            hidden: false,
            handler: None,
        }
    }

    /// Add a listed alias
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Add an alias that is never listed
    pub fn hidden_alias(mut self, alias: impl Into<String>) -> Self {
        self.hidden_aliases.push(alias.into());
        self
    }

    /// Set the full description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the one-line summary
    pub fn short_description(mut self, summary: impl Into<String>) -> Self {
        self.short_description = Some(summary.into());
        self
    }

    /// Append a positional argument
    pub fn arg(mut self, arg: ArgSpec) -> Self {
        self.args.push(arg);
        self
    }

    /// Append a flag
    pub fn flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    /// Append a subcommand
    pub fn subcommand(mut self, subcommand: CommandDescriptor) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    /// Enable the implicit `--json` flag
    pub fn enable_json_flag(mut self) -> Self {
        self.json_flag = true;
        self
    }

    /// Leave the command out of listings
    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Name the handler that runs this command
    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// One-line summary for listings
    pub fn summary(&self) -> Option<&str> {
        self.short_description
            .as_deref()
            .or_else(|| self.description.as_deref().and_then(|d| d.lines().next()))
    }

    /// Whether this command groups subcommands
    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// Declared flags plus the implicit `--json` flag when enabled
    pub fn effective_flags(&self) -> Vec<FlagSpec> {
        let mut flags = self.flags.clone();
        if self.json_flag {
            flags.push(
                FlagSpec::boolean(JSON_FLAG).description("Format the command output as JSON"),
            );
        }
        flags
    }

    /// Every name this command answers to: name, aliases, hidden aliases
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.aliases.iter().map(String::as_str))
            .chain(self.hidden_aliases.iter().map(String::as_str))
    }

    /// Find a declared flag by any spelling of its name
    pub fn find_flag(&self, name: &str) -> Option<&FlagSpec> {
        let key = canonical_key(name);
        self.flags.iter().find(|f| f.key() == key)
    }

    /// Keys of the flags `flag` may not be combined with.
    ///
    /// The relation is symmetric: if A lists B, then B excludes A even
    /// when B does not list A.
    pub fn exclusions_of(&self, flag: &FlagSpec) -> Vec<String> {
        let key = flag.key();
        let mut excluded: Vec<String> = flag.exclusive.iter().map(|e| canonical_key(e)).collect();

        for other in &self.flags {
            if other.key() == key {
                continue;
            }
            if other.exclusive.iter().any(|e| canonical_key(e) == key) && !excluded.contains(&other.key()) {
                excluded.push(other.key());
            }
        }

        excluded
    }

    /// Check the static rules of this descriptor (not its subcommands).
    pub fn validate(&self) -> DeclarativeResult<()> {
        if self.name.is_empty() || self.name.to_lowercase() != self.name {
            return Err(DeclarativeError::InvalidCommandName(self.name.clone()));
        }

        for alias in self.aliases.iter().chain(&self.hidden_aliases) {
            if alias.is_empty() || alias.contains(char::is_whitespace) {
                return Err(DeclarativeError::descriptor(
                    &self.name,
                    format!("alias '{}' must be a single non-empty word", alias),
                ));
            }
        }

        self.validate_args()?;
        self.validate_flags()
    }

    fn validate_args(&self) -> DeclarativeResult<()> {
        let mut seen = HashSet::new();
        let mut optional_seen: Option<&str> = None;

        for (index, arg) in self.args.iter().enumerate() {
            let key = arg.key();
            if key.is_empty() {
                return Err(DeclarativeError::descriptor(&self.name, "argument names must not be empty"));
            }
            if key == JSON_FLAG {
                return Err(DeclarativeError::descriptor(
                    &self.name,
                    "'json' is reserved for the --json flag and cannot name an argument",
                ));
            }
            if !seen.insert(key) {
                return Err(DeclarativeError::descriptor(
                    &self.name,
                    format!("argument '{}' is declared twice", arg.name),
                ));
            }

            if arg.required {
                if let Some(optional) = optional_seen {
                    return Err(DeclarativeError::descriptor(
                        &self.name,
                        format!(
                            "required argument '{}' follows optional argument '{}'",
                            arg.name, optional
                        ),
                    ));
                }
            } else if optional_seen.is_none() {
                optional_seen = Some(&arg.name);
            }

            if arg.catch_all && index + 1 != self.args.len() {
                return Err(DeclarativeError::descriptor(
                    &self.name,
                    format!("catch-all argument '{}' must be the last argument", arg.name),
                ));
            }
        }

        Ok(())
    }

    fn validate_flags(&self) -> DeclarativeResult<()> {
        let mut long_keys: HashSet<String> = HashSet::new();
        let mut shorts: HashSet<char> = HashSet::new();
        let mut flag_keys: HashSet<String> = HashSet::new();

        for flag in &self.flags {
            let key = flag.key();
            if key.is_empty() {
                return Err(DeclarativeError::descriptor(&self.name, "flag names must not be empty"));
            }
            if key == JSON_FLAG {
                return Err(DeclarativeError::descriptor(
                    &self.name,
                    "'json' is reserved; enable the JSON flag on the command instead",
                ));
            }
            if !flag_keys.insert(key) {
                return Err(DeclarativeError::descriptor(
                    &self.name,
                    format!("flag '--{}' is declared twice", flag.dashed_name()),
                ));
            }

            for long in flag.long_keys() {
                if long == HELP_FLAG || long == JSON_FLAG || !long_keys.insert(long.clone()) {
                    return Err(DeclarativeError::descriptor(
                        &self.name,
                        format!("flag name '--{}' is reserved or used by another flag", long),
                    ));
                }
            }

            if let Some(short) = flag.short {
                if short == HELP_SHORT || short == '-' || short.is_ascii_digit() || !shorts.insert(short) {
                    return Err(DeclarativeError::descriptor(
                        &self.name,
                        format!("short flag '-{}' is reserved or used by another flag", short),
                    ));
                }
            }

            if let Some(default) = &flag.default {
                if !default.matches_kind(flag.kind) {
                    return Err(DeclarativeError::descriptor(
                        &self.name,
                        format!("default of '--{}' does not match its type", flag.dashed_name()),
                    ));
                }
                if !flag.choices.is_empty() && !flag.choices.contains(default) {
                    return Err(DeclarativeError::descriptor(
                        &self.name,
                        format!("default of '--{}' is not one of its choices", flag.dashed_name()),
                    ));
                }
            }

            if flag.stdin_mode == StdinMode::Raw && flag.kind != FlagKind::String {
                return Err(DeclarativeError::descriptor(
                    &self.name,
                    format!("only string flags can bind raw standard input ('--{}')", flag.dashed_name()),
                ));
            }

            if !flag.choices.is_empty() {
                if flag.kind == FlagKind::Boolean {
                    return Err(DeclarativeError::descriptor(
                        &self.name,
                        format!("boolean flag '--{}' cannot declare choices", flag.dashed_name()),
                    ));
                }
                if flag.choices.iter().any(|c| !c.matches_kind(flag.kind)) {
                    return Err(DeclarativeError::descriptor(
                        &self.name,
                        format!("choices of '--{}' do not match its type", flag.dashed_name()),
                    ));
                }
            }
        }

        for flag in &self.flags {
            for other in &flag.exclusive {
                if canonical_key(other) == flag.key() || self.find_flag(other).is_none() {
                    return Err(DeclarativeError::descriptor(
                        &self.name,
                        format!(
                            "flag '--{}' excludes unknown flag '--{}'",
                            flag.dashed_name(),
                            dashed(other)
                        ),
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_value() -> CommandDescriptor {
        CommandDescriptor::new("set-value")
            .description("Sets or removes a record in the default key-value store.\nMore details follow.")
            .arg(ArgSpec::string("key").required().description("Key of the record"))
            .arg(ArgSpec::string("value").stdin().description("Record data"))
            .flag(
                FlagSpec::string("content-type")
                    .short('c')
                    .default_value("application/json")
                    .description("Specifies a custom MIME content type of the record"),
            )
    }

    #[test]
    fn test_valid_descriptor() {
        assert!(set_value().validate().is_ok());
        assert_eq!(
            set_value().summary(),
            Some("Sets or removes a record in the default key-value store.")
        );
    }

    #[test]
    fn test_short_description_wins_over_description() {
        let cmd = set_value().short_description("Sets a record");
        assert_eq!(cmd.summary(), Some("Sets a record"));
    }

    #[test]
    fn test_name_must_be_lower_case() {
        let err = CommandDescriptor::new("GetValue").validate().unwrap_err();
        assert!(matches!(err, DeclarativeError::InvalidCommandName(name) if name == "GetValue"));
    }

    #[test]
    fn test_required_after_optional_rejected() {
        let cmd = CommandDescriptor::new("push")
            .arg(ArgSpec::string("source"))
            .arg(ArgSpec::string("target").required());
        let err = cmd.validate().unwrap_err();
        assert!(err.to_string().contains("follows optional argument 'source'"));
    }

    #[test]
    fn test_catch_all_must_be_last() {
        let cmd = CommandDescriptor::new("help")
            .arg(ArgSpec::string("command").catch_all())
            .arg(ArgSpec::string("extra"));
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_json_is_reserved() {
        let cmd = CommandDescriptor::new("info").flag(FlagSpec::boolean("json"));
        assert!(cmd.validate().is_err());

        let cmd = CommandDescriptor::new("info").arg(ArgSpec::string("json"));
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_conflicting_flag_keys_rejected() {
        let cmd = CommandDescriptor::new("call")
            .flag(FlagSpec::string("build").short('b'))
            .flag(FlagSpec::string("branch").short('b'));
        assert!(cmd.validate().is_err());

        let cmd = CommandDescriptor::new("call")
            .flag(FlagSpec::string("input").alias("body"))
            .flag(FlagSpec::string("body"));
        assert!(cmd.validate().is_err());

        let cmd = CommandDescriptor::new("call").flag(FlagSpec::boolean("verbose").short('h'));
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_default_must_match_kind_and_choices() {
        let cmd = CommandDescriptor::new("login")
            .flag(FlagSpec::integer("timeout").default_value("soon"));
        assert!(cmd.validate().is_err());

        let cmd = CommandDescriptor::new("login").flag(
            FlagSpec::string("method")
                .choices(["console", "manual"])
                .default_value("browser"),
        );
        assert!(cmd.validate().is_err());

        let cmd = CommandDescriptor::new("login").flag(
            FlagSpec::string("method")
                .choices(["console", "manual"])
                .default_value("console"),
        );
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_raw_stdin_needs_string_flag() {
        let cmd = CommandDescriptor::new("push").flag(FlagSpec::integer("memory").stdin_raw());
        assert!(cmd.validate().is_err());

        let cmd = CommandDescriptor::new("push")
            .arg(ArgSpec::string("archive").stdin_raw())
            .flag(FlagSpec::string("body").stdin_raw());
        assert!(cmd.validate().is_ok());
        assert_eq!(cmd.args[0].stdin_mode, StdinMode::Raw);
        assert!(cmd.flags[0].stdin);
    }

    #[test]
    fn test_exclusive_partner_must_exist() {
        let cmd = CommandDescriptor::new("call")
            .flag(FlagSpec::string("input").exclusive_with("input-file"));
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_exclusions_are_symmetric() {
        let cmd = CommandDescriptor::new("call")
            .flag(FlagSpec::string("input").exclusive_with("input-file"))
            .flag(FlagSpec::string("input-file"));

        let input_file = cmd.find_flag("input-file").unwrap();
        assert_eq!(cmd.exclusions_of(input_file), vec!["input".to_string()]);

        let input = cmd.find_flag("input").unwrap();
        assert_eq!(cmd.exclusions_of(input), vec!["inputFile".to_string()]);
    }

    #[test]
    fn test_negated_boolean_keys() {
        let flag = FlagSpec::boolean("no-browser");
        assert_eq!(flag.switch_name(), ("browser".to_string(), true));
        assert_eq!(flag.key(), "noBrowser");
        assert_eq!(flag.long_keys(), vec!["no-browser".to_string(), "browser".to_string()]);

        let flag = FlagSpec::boolean("force").alias("yes");
        assert_eq!(
            flag.long_keys(),
            vec!["force".to_string(), "no-force".to_string(), "yes".to_string()]
        );

        let flag = FlagSpec::string("notes");
        assert_eq!(flag.switch_name(), ("notes".to_string(), false));
    }

    #[test]
    fn test_effective_flags_add_json() {
        let cmd = CommandDescriptor::new("info").enable_json_flag();
        let flags = cmd.effective_flags();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].name, JSON_FLAG);
        assert_eq!(flags[0].kind, FlagKind::Boolean);
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
            name = "get-value"
            aliases = ["gv"]
            handler = "actor::get-value"

            [[args]]
            name = "key"
            required = true
            description = "Key of the record"

            [[args]]
            name = "value"
            stdin = true
            stdin_mode = "raw"

            [[flags]]
            name = "limit"
            type = "integer"
            default = 10
            choices = [10, 20]
        "#;

        let cmd: CommandDescriptor = toml::from_str(toml).unwrap();
        assert_eq!(cmd.name, "get-value");
        assert_eq!(cmd.aliases, vec!["gv".to_string()]);
        assert!(cmd.args[0].required);
        assert_eq!(cmd.args[0].stdin_mode, StdinMode::Stringified);
        assert_eq!(cmd.args[1].stdin_mode, StdinMode::Raw);
        assert_eq!(cmd.flags[0].kind, FlagKind::Integer);
        assert_eq!(cmd.flags[0].default, Some(Value::Integer(10)));
        assert!(cmd.validate().is_ok());
    }
}
