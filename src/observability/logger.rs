//! Markdown log of command invocations.

use crate::cli::error::InputError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Logger for command invocations.
///
/// Each invocation appends a markdown section: the command path and raw
/// arguments, any validation failures, errors raised by the command, and
/// the exit code it finished with.
#[derive(Debug, Clone)]
pub struct InvocationLogger {
    log_file: PathBuf,
    log_level: String,
}

impl InvocationLogger {
    /// Initialize logger.
    ///
    /// # Arguments
    /// * `log_file` - Path to log file. If None, creates a timestamped file in temp directory.
    /// * `log_level` - Logging level (defaults to "INFO").
    pub fn new(log_file: Option<&Path>, log_level: Option<&str>) -> Result<Self> {
        let log_file = match log_file {
            Some(p) => p.to_path_buf(),
            None => {
                let mut dir = std::env::temp_dir();
                dir.push("cmdtree-logs");
                std::fs::create_dir_all(&dir).with_context(|| {
                    format!("Failed to create log directory: {}", dir.display())
                })?;
                let filename = format!(
                    "invocations_{}_{}.md",
                    Utc::now().timestamp_millis(),
                    std::process::id()
                );
                dir.join(filename)
            }
        };

        let log_level = log_level.unwrap_or("INFO").to_string();

        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let logger = Self {
            log_file,
            log_level,
        };

        if !logger.log_file.exists() {
            logger.initialize_log_file()?;
        }

        Ok(logger)
    }

    fn initialize_log_file(&self) -> Result<()> {
        let mut file = File::create(&self.log_file)
            .with_context(|| format!("Failed to create log file: {}", self.log_file.display()))?;

        let now: DateTime<Utc> = Utc::now();

        writeln!(file, "# Command Invocation Log\n")?;
        writeln!(file, "Log started: {}\n", now.to_rfc3339())?;
        writeln!(file, "---\n")?;

        Ok(())
    }

    fn append_to_log(&self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file: {}", self.log_file.display()))?;

        write!(file, "{}", content).with_context(|| "Failed to write to log file")?;

        Ok(())
    }

    fn is_debug(&self) -> bool {
        self.log_level.eq_ignore_ascii_case("debug")
    }

    /// Log the start of an invocation.
    ///
    /// # Arguments
    /// * `path` - Canonical command path (`actor set-value`).
    /// * `args` - Raw tokens that followed the path.
    pub fn log_invocation(&self, path: &str, args: &[String]) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let mut content = format!("## Invocation - {}\n\n**Command:** {}\n", now.to_rfc3339(), path);

        if self.is_debug() {
            content.push_str(&format!(
                "**Arguments:**\n\n```json\n{}\n```\n\n",
                serde_json::to_string_pretty(args).unwrap_or_default()
            ));
        } else {
            content.push_str(&format!("**Arguments:** {} tokens\n\n", args.len()));
        }

        self.append_to_log(&content)
    }

    /// Log every input problem found while parsing.
    pub fn log_validation_failure(&self, path: &str, errors: &[InputError]) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let mut content = format!(
            "### Validation Failed - {}\n\n**Command:** {}\n\n",
            now.to_rfc3339(),
            path
        );
        for error in errors {
            content.push_str(&format!("- `{:?}`: {}\n", error.code(), error));
        }
        content.push('\n');

        self.append_to_log(&content)
    }

    /// Log an error raised while resolving or running a command.
    pub fn log_error(&self, path: Option<&str>, error: &str) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "### Error - {}\n\n**Command:** {}\n**Error:** {}\n\n",
            now.to_rfc3339(),
            path.unwrap_or("-"),
            error
        );

        self.append_to_log(&content)
    }

    /// Log the exit code an invocation finished with.
    pub fn log_completion(&self, path: Option<&str>, exit_code: i32) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "### Completed - {}\n\n**Command:** {}\n**Exit code:** {}\n\n---\n\n",
            now.to_rfc3339(),
            path.unwrap_or("-"),
            exit_code
        );

        self.append_to_log(&content)
    }

    /// Get the log file path.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Get the log level.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}
