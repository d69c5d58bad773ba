//! Help rendering
//!
//! Every registered command gets a [`CommandHelp`] renderer in the
//! [`HelpIndex`], keyed by its canonical path. Asking for help on a path
//! that was never registered is a programming error and fails with
//! [`DeclarativeError::NoHelpRendererRegistered`] instead of printing a
//! partial page.

pub mod command;
pub mod layout;
pub mod menu;

pub use command::CommandHelp;
pub use menu::AppInfo;

use super::error::{DeclarativeError, DeclarativeResult};
use super::registry::RegisteredCommand;
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::sync::Arc;

/// Line width when nothing better is known
pub const DEFAULT_LINE_WIDTH: usize = 80;

/// Narrowest line width help is rendered at
pub const MIN_LINE_WIDTH: usize = 40;

/// Environment prefix used when none is configured
pub const DEFAULT_ENV_PREFIX: &str = "CMDTREE";

/// How help text is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpSettings {
    /// Maximum visible columns per line
    pub max_line_width: usize,
    /// Bold section headers
    pub styled: bool,
}

impl HelpSettings {
    /// Settings derived from the environment and the attached terminal
    pub fn detect() -> Self {
        Self {
            max_line_width: resolve_max_line_width(None, DEFAULT_ENV_PREFIX),
            styled: std::io::stdout().is_terminal(),
        }
    }

    /// Unstyled output at a fixed width
    pub fn plain(max_line_width: usize) -> Self {
        Self {
            max_line_width: max_line_width.max(MIN_LINE_WIDTH),
            styled: false,
        }
    }

    /// Section header, bold when styling is on
    pub fn header(&self, title: &str) -> String {
        if self.styled {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }
}

impl Default for HelpSettings {
    fn default() -> Self {
        Self::plain(DEFAULT_LINE_WIDTH)
    }
}

/// Resolve the help line width.
///
/// Order: explicit override, `<PREFIX>_MAX_LINE_WIDTH`, `COLUMNS`, then
/// [`DEFAULT_LINE_WIDTH`]. The result is never below [`MIN_LINE_WIDTH`].
pub fn resolve_max_line_width(override_width: Option<usize>, env_prefix: &str) -> usize {
    let prefixed = std::env::var(format!("{}_MAX_LINE_WIDTH", env_prefix)).ok();
    let columns = if std::io::stdout().is_terminal() {
        std::env::var("COLUMNS").ok()
    } else {
        None
    };
    width_from_sources(override_width, prefixed.as_deref(), columns.as_deref())
}

fn width_from_sources(override_width: Option<usize>, prefixed: Option<&str>, columns: Option<&str>) -> usize {
    let parse = |raw: Option<&str>| raw.and_then(|v| v.trim().parse::<usize>().ok()).filter(|w| *w > 0);

    override_width
        .or_else(|| parse(prefixed))
        .or_else(|| parse(columns))
        .unwrap_or(DEFAULT_LINE_WIDTH)
        .max(MIN_LINE_WIDTH)
}

/// Which sections a partial render includes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectiveRenderOptions {
    /// One-line summary at the top
    pub show_short_description: bool,
    /// USAGE block
    pub show_usage_string: bool,
    /// ARGUMENTS table
    pub show_arguments: bool,
    /// FLAGS table
    pub show_flags: bool,
    /// DESCRIPTION block
    pub show_description: bool,
    /// SUBCOMMANDS listing
    pub show_subcommands: bool,
}

impl SelectiveRenderOptions {
    /// Every section
    pub fn all() -> Self {
        Self {
            show_short_description: true,
            show_usage_string: true,
            show_arguments: true,
            show_flags: true,
            show_description: true,
            show_subcommands: true,
        }
    }

    /// Nothing but the USAGE block
    pub fn usage_only() -> Self {
        Self {
            show_short_description: false,
            show_usage_string: true,
            show_arguments: false,
            show_flags: false,
            show_description: false,
            show_subcommands: false,
        }
    }
}

impl Default for SelectiveRenderOptions {
    fn default() -> Self {
        Self::all()
    }
}

/// Help renderers for every registered command
#[derive(Debug, Clone)]
pub struct HelpIndex {
    entrypoint: String,
    settings: HelpSettings,
    renderers: BTreeMap<String, CommandHelp>,
}

impl HelpIndex {
    /// Create an empty index
    pub fn new(entrypoint: impl Into<String>, settings: HelpSettings) -> Self {
        Self {
            entrypoint: entrypoint.into(),
            settings,
            renderers: BTreeMap::new(),
        }
    }

    /// Add a renderer for `command`
    pub fn register(&mut self, command: Arc<RegisteredCommand>) {
        let key = command.path_string();
        self.renderers
            .insert(key, CommandHelp::new(self.entrypoint.clone(), command, self.settings));
    }

    /// Whether a renderer exists for the canonical `path`
    pub fn is_registered<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.renderers.contains_key(&join_path(path))
    }

    /// Renderer for the canonical `path`
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> DeclarativeResult<&CommandHelp> {
        let key = join_path(path);
        self.renderers
            .get(&key)
            .ok_or(DeclarativeError::NoHelpRendererRegistered { command: key })
    }

    /// Full help for the canonical `path`
    pub fn render<S: AsRef<str>>(&self, path: &[S]) -> DeclarativeResult<String> {
        Ok(self.get(path)?.render())
    }

    /// Partial help for the canonical `path`
    pub fn selective_render<S: AsRef<str>>(
        &self,
        path: &[S],
        options: SelectiveRenderOptions,
    ) -> DeclarativeResult<String> {
        Ok(self.get(path)?.selective_render(options))
    }

    /// Layout settings shared by every renderer
    pub fn settings(&self) -> HelpSettings {
        self.settings
    }

    /// Program name used in usage lines
    pub fn entrypoint(&self) -> &str {
        &self.entrypoint
    }

    /// Visible top-level commands, sorted by name
    pub(crate) fn top_level(&self) -> impl Iterator<Item = &CommandHelp> {
        self.renderers
            .values()
            .filter(|help| help.command().is_top_level() && !help.command().descriptor.hidden)
    }
}

fn join_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter().map(|p| p.as_ref().to_lowercase()).collect::<Vec<_>>().join(" ")
}
