//! Configuration schema for a declarative command tree
//!
//! A whole CLI can be described in TOML or JSON: an `[app]` table plus a list
//! of `[[commands]]`, each a full [`CommandDescriptor`] with nested
//! subcommands. Handlers are referenced by name and bound in code.

use super::descriptor::CommandDescriptor;
use super::error::{DeclarativeError, DeclarativeResult};
use super::help::AppInfo;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration for a declarative CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Application metadata
    pub app: AppConfig,

    /// Top-level commands
    #[serde(default)]
    pub commands: Vec<CommandDescriptor>,
}

/// Application metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Program name, used as the usage entrypoint
    pub name: String,

    /// Application version
    #[serde(default)]
    pub version: String,

    /// Text shown at the top of the main menu
    #[serde(default)]
    pub description: Option<String>,

    /// Fixed help line width; detected from the terminal when unset
    #[serde(default)]
    pub max_line_width: Option<usize>,

    /// Markdown invocation log; `~` and environment variables are expanded
    #[serde(default)]
    pub log_file: Option<String>,

    /// Prefix for environment overrides (`<PREFIX>_MAX_LINE_WIDTH`)
    #[serde(default)]
    pub env_prefix: Option<String>,

    /// Lines for the TROUBLESHOOTING section of the main menu
    #[serde(default)]
    pub troubleshooting: Vec<String>,
}

impl AppConfig {
    /// Menu and version information
    pub fn app_info(&self) -> AppInfo {
        AppInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            troubleshooting: self.troubleshooting.clone(),
        }
    }

    /// Environment prefix: the configured one, or the upper-cased app name
    pub fn env_prefix(&self) -> String {
        self.env_prefix
            .clone()
            .unwrap_or_else(|| self.name.to_uppercase().replace('-', "_"))
    }

    /// Log file path with `~` and `$VAR` expanded
    pub fn log_file_path(&self) -> DeclarativeResult<Option<PathBuf>> {
        let Some(raw) = &self.log_file else {
            return Ok(None);
        };
        let expanded = shellexpand::full(raw)
            .map_err(|e| DeclarativeError::config(format!("Failed to expand log file path '{}': {}", raw, e)))?;
        Ok(Some(PathBuf::from(expanded.as_ref())))
    }
}

impl CliConfig {
    /// Parse config from a TOML string
    pub fn from_toml_str(content: &str) -> DeclarativeResult<Self> {
        toml::from_str(content).map_err(|e| DeclarativeError::config(format!("Failed to parse TOML: {}", e)))
    }

    /// Parse config from a JSON string
    pub fn from_json_str(content: &str) -> DeclarativeResult<Self> {
        serde_json::from_str(content).map_err(|e| DeclarativeError::config(format!("Failed to parse JSON: {}", e)))
    }

    /// Load config from TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> DeclarativeResult<Self> {
        Self::from_toml_str(&read_config(path.as_ref())?)
    }

    /// Load config from JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> DeclarativeResult<Self> {
        Self::from_json_str(&read_config(path.as_ref())?)
    }

    /// Auto-detect format and load config
    pub fn from_file(path: impl AsRef<Path>) -> DeclarativeResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => {
                let content = read_config(path)?;
                Self::from_toml_str(&content).or_else(|_| Self::from_json_str(&content))
            }
        }
    }

    /// Validate every descriptor without registering anything
    pub fn validate(&self) -> DeclarativeResult<()> {
        fn walk(descriptor: &CommandDescriptor) -> DeclarativeResult<()> {
            descriptor.validate()?;
            descriptor.subcommands.iter().try_for_each(walk)
        }

        if self.app.name.trim().is_empty() {
            return Err(DeclarativeError::config("app.name must not be empty"));
        }
        self.commands.iter().try_for_each(walk)
    }
}

fn read_config(path: &Path) -> DeclarativeResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DeclarativeError::io(format!("Failed to read config file {}", path.display()), e))
}
