//! Command registry - maps invocation paths to descriptors
//!
//! Every descriptor is expanded at registration into one entry per
//! invocation path: its name and each alias, and for every subcommand the
//! cross product of (parent name ∪ parent aliases) × (sub name ∪ sub
//! aliases). Registration takes `&mut self` and resolution `&self`, so all
//! registration is finished before the first lookup can happen.

use super::descriptor::CommandDescriptor;
use super::error::{DeclarativeError, DeclarativeResult};
use super::help::{HelpIndex, HelpSettings};
use std::collections::BTreeMap;
use std::sync::Arc;
use strsim::{jaro_winkler, levenshtein};

/// Maximum edit distance for a suggestion
const SUGGESTION_MAX_DISTANCE: usize = 2;

/// Minimum Jaro-Winkler similarity for a suggestion
const SUGGESTION_MIN_SIMILARITY: f64 = 0.95;

/// A descriptor together with its canonical path
#[derive(Debug)]
pub struct RegisteredCommand {
    /// The command's shape
    pub descriptor: Arc<CommandDescriptor>,
    /// Canonical names from the top-level command down to this one
    pub path: Vec<String>,
}

impl RegisteredCommand {
    /// Canonical path joined with spaces (`actor get-value`)
    pub fn path_string(&self) -> String {
        self.path.join(" ")
    }

    /// Handler name: the declared one, or the canonical path joined with `::`
    pub fn handler_name(&self) -> String {
        self.descriptor
            .handler
            .clone()
            .unwrap_or_else(|| self.path.join("::"))
    }

    /// Whether this is a top-level command
    pub fn is_top_level(&self) -> bool {
        self.path.len() == 1
    }
}

/// One invocation path pointing at a command
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// Target command
    pub command: Arc<RegisteredCommand>,
    /// Reached through a hidden alias, or the command itself is hidden
    pub hidden: bool,
}

/// Result of resolving leading tokens to a command
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The matched command
    pub command: Arc<RegisteredCommand>,
    /// Tokens consumed as the command path
    pub matched: Vec<String>,
    /// Tokens left for the parser
    pub remaining: Vec<String>,
}

/// Lookup from invocation path to command descriptor
#[derive(Debug)]
pub struct CommandRegistry {
    entrypoint: String,
    entries: BTreeMap<String, RegistryEntry>,
    commands: Vec<Arc<RegisteredCommand>>,
    help: HelpIndex,
    max_depth: usize,
}

impl CommandRegistry {
    /// Create an empty registry for `entrypoint`, with detected help settings
    pub fn new(entrypoint: impl Into<String>) -> Self {
        Self::with_help_settings(entrypoint, HelpSettings::detect())
    }

    /// Create an empty registry with explicit help settings
    pub fn with_help_settings(entrypoint: impl Into<String>, settings: HelpSettings) -> Self {
        let entrypoint = entrypoint.into();
        Self {
            help: HelpIndex::new(entrypoint.clone(), settings),
            entrypoint,
            entries: BTreeMap::new(),
            commands: Vec::new(),
            max_depth: 0,
        }
    }

    /// Register a descriptor and all of its subcommands.
    ///
    /// Nothing is inserted unless the whole tree is valid and none of its
    /// paths is already taken; registration never overwrites.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> DeclarativeResult<()> {
        validate_tree(&descriptor)?;

        let mut pending: Vec<(String, RegistryEntry)> = Vec::new();
        let mut registered: Vec<Arc<RegisteredCommand>> = Vec::new();
        expand(&descriptor, &[Vec::new()], &[], false, &mut pending, &mut registered);

        let mut seen = std::collections::HashSet::new();
        for (key, _) in &pending {
            if self.entries.contains_key(key) || !seen.insert(key.clone()) {
                return Err(DeclarativeError::DuplicateCommand(key.clone()));
            }
        }

        for (key, entry) in pending {
            let depth = key.split(' ').count();
            self.max_depth = self.max_depth.max(depth);
            tracing::trace!(path = %key, command = %entry.command.path_string(), "registered path");
            self.entries.insert(key, entry);
        }

        for command in registered {
            self.help.register(command.clone());
            self.commands.push(command);
        }

        tracing::debug!(command = %descriptor.name, paths = self.entries.len(), "registered command");
        Ok(())
    }

    /// Resolve the longest registered path at the start of `tokens`.
    ///
    /// Path matching is case-insensitive and stops at the first token that
    /// looks like a flag.
    pub fn resolve(&self, tokens: &[String]) -> DeclarativeResult<Resolution> {
        let leading = tokens
            .iter()
            .take(self.max_depth)
            .take_while(|t| !t.starts_with('-'))
            .count();

        for consumed in (1..=leading).rev() {
            let key = tokens[..consumed]
                .iter()
                .map(|t| t.to_lowercase())
                .collect::<Vec<_>>()
                .join(" ");

            if let Some(entry) = self.entries.get(&key) {
                tracing::debug!(path = %key, command = %entry.command.path_string(), "resolved command");
                return Ok(Resolution {
                    command: entry.command.clone(),
                    matched: tokens[..consumed].to_vec(),
                    remaining: tokens[consumed..].to_vec(),
                });
            }
        }

        let input = tokens.first().cloned().unwrap_or_default();
        Err(DeclarativeError::UnknownCommand {
            suggestions: self.suggest(&input),
            input,
        })
    }

    /// Registered paths close to `input`.
    ///
    /// Aliases are shown as `"<alias> (alias for <path>)"`. Hidden commands
    /// and hidden aliases are never suggested.
    pub fn suggest(&self, input: &str) -> Vec<String> {
        let input = input.to_lowercase();
        if input.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|(_, entry)| !entry.hidden)
            .filter(|(key, _)| {
                levenshtein(&input, key) <= SUGGESTION_MAX_DISTANCE
                    || jaro_winkler(&input, key) >= SUGGESTION_MIN_SIMILARITY
            })
            .map(|(key, entry)| {
                let canonical = entry.command.path_string();
                if *key == canonical {
                    key.clone()
                } else {
                    format!("{} (alias for {})", key, canonical)
                }
            })
            .collect()
    }

    /// Exact lookup by invocation path (`"actor get-value"`)
    pub fn get(&self, path: &str) -> Option<&Arc<RegisteredCommand>> {
        self.entries.get(&path.to_lowercase()).map(|e| &e.command)
    }

    /// Whether `path` is registered
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&path.to_lowercase())
    }

    /// Every invocation path, sorted
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Registered commands in registration order, each once
    pub fn commands(&self) -> &[Arc<RegisteredCommand>] {
        &self.commands
    }

    /// Number of invocation paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Program name used in usage lines
    pub fn entrypoint(&self) -> &str {
        &self.entrypoint
    }

    /// Help renderers for every registered command
    pub fn help(&self) -> &HelpIndex {
        &self.help
    }
}

fn validate_tree(descriptor: &CommandDescriptor) -> DeclarativeResult<()> {
    descriptor.validate()?;
    for sub in &descriptor.subcommands {
        validate_tree(sub)?;
    }
    Ok(())
}

fn expand(
    descriptor: &CommandDescriptor,
    parent_paths: &[Vec<String>],
    canonical_parent: &[String],
    parent_hidden: bool,
    pending: &mut Vec<(String, RegistryEntry)>,
    registered: &mut Vec<Arc<RegisteredCommand>>,
) {
    let mut canonical = canonical_parent.to_vec();
    canonical.push(descriptor.name.clone());

    let command = Arc::new(RegisteredCommand {
        descriptor: Arc::new(descriptor.clone()),
        path: canonical.clone(),
    });
    registered.push(command.clone());

    let hidden = parent_hidden || descriptor.hidden;
    let mut own_paths: Vec<Vec<String>> = Vec::new();

    for parent in parent_paths {
        for name in descriptor.all_names() {
            let hidden_alias = descriptor.hidden_aliases.iter().any(|a| a == name);
            let mut path = parent.clone();
            path.push(name.to_lowercase());

            pending.push((
                path.join(" "),
                RegistryEntry {
                    command: command.clone(),
                    hidden: hidden || hidden_alias,
                },
            ));
            own_paths.push(path);
        }
    }

    for sub in &descriptor.subcommands {
        expand(sub, &own_paths, &canonical, hidden, pending, registered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::descriptor::ArgSpec;

    fn actor() -> CommandDescriptor {
        CommandDescriptor::new("actor")
            .alias("act")
            .description("Manages runtime data operations inside of a running Actor.")
            .subcommand(
                CommandDescriptor::new("get-value")
                    .alias("gv")
                    .hidden_alias("getvalue")
                    .arg(ArgSpec::string("key").required()),
            )
            .subcommand(CommandDescriptor::new("set-value").alias("sv"))
    }

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::with_help_settings("apify", HelpSettings::plain(80));
        registry.register(actor()).unwrap();
        registry
            .register(CommandDescriptor::new("login").description("Authenticates"))
            .unwrap();
        registry
    }

    fn tokens(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cross_product_paths() {
        let registry = registry();
        for path in [
            "actor",
            "act",
            "actor get-value",
            "actor gv",
            "actor getvalue",
            "act get-value",
            "act gv",
            "act getvalue",
            "actor set-value",
            "act sv",
            "login",
        ] {
            assert!(registry.contains(path), "missing path {path}");
        }
        assert_eq!(registry.len(), 11);
        assert_eq!(registry.commands().len(), 4);
    }

    #[test]
    fn test_resolve_through_every_alias() {
        let registry = registry();
        for parts in [
            ["actor", "get-value"],
            ["act", "get-value"],
            ["actor", "gv"],
            ["act", "gv"],
            ["ACTOR", "Get-Value"],
        ] {
            let mut input = tokens(&parts);
            input.push("my-key".to_string());

            let resolution = registry.resolve(&input).unwrap();
            assert_eq!(resolution.command.path, vec!["actor", "get-value"]);
            assert_eq!(resolution.remaining, vec!["my-key".to_string()]);
        }
    }

    #[test]
    fn test_resolve_prefers_longest_path() {
        let registry = registry();
        let resolution = registry.resolve(&tokens(&["actor", "nope"])).unwrap();
        assert_eq!(resolution.command.path, vec!["actor"]);
        assert_eq!(resolution.remaining, tokens(&["nope"]));
    }

    #[test]
    fn test_resolve_stops_at_flags() {
        let registry = registry();
        let resolution = registry.resolve(&tokens(&["actor", "--help"])).unwrap();
        assert_eq!(resolution.command.path, vec!["actor"]);
        assert_eq!(resolution.remaining, tokens(&["--help"]));
    }

    #[test]
    fn test_unknown_command_suggests() {
        let registry = registry();
        let err = registry.resolve(&tokens(&["logn"])).unwrap_err();
        match err {
            DeclarativeError::UnknownCommand { input, suggestions } => {
                assert_eq!(input, "logn");
                assert_eq!(suggestions, vec!["login".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_suggestions_mark_aliases_and_skip_hidden() {
        let registry = registry();
        let suggestions = registry.suggest("actor gb");
        assert!(suggestions.contains(&"actor gv (alias for actor get-value)".to_string()));
        assert!(!suggestions.iter().any(|s| s.contains("getvalue")));
    }

    #[test]
    fn test_duplicate_path_is_rejected_without_partial_insert() {
        let mut registry = registry();
        let before = registry.len();

        let err = registry
            .register(CommandDescriptor::new("logout").alias("login"))
            .unwrap_err();
        assert!(matches!(err, DeclarativeError::DuplicateCommand(path) if path == "login"));
        assert_eq!(registry.len(), before);
        assert!(!registry.contains("logout"));

        let err = registry.register(CommandDescriptor::new("login")).unwrap_err();
        assert!(matches!(err, DeclarativeError::DuplicateCommand(_)));
    }

    #[test]
    fn test_upper_case_name_aborts_registration() {
        let mut registry = registry();
        let err = registry
            .register(CommandDescriptor::new("tasks").subcommand(CommandDescriptor::new("Run")))
            .unwrap_err();
        assert!(matches!(err, DeclarativeError::InvalidCommandName(name) if name == "Run"));
        assert!(!registry.contains("tasks"));
    }

    #[test]
    fn test_registration_feeds_help_index() {
        let registry = registry();
        assert!(registry.help().is_registered(&["actor", "get-value"]));
        assert!(registry.help().is_registered(&["login"]));
        assert!(!registry.help().is_registered(&["logout"]));
    }

    #[test]
    fn test_handler_name_defaults_to_path() {
        let registry = registry();
        let command = registry.get("act gv").unwrap();
        assert_eq!(command.handler_name(), "actor::get-value");
    }
}
