//! Main help menu, shown when no command is given

use super::layout::{indent, table, wrap, SECTION_INDENT};
use super::HelpIndex;
use serde::{Deserialize, Serialize};

/// Application-level information for the main menu and `--version`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Program name, used as the usage entrypoint
    pub name: String,
    /// Version string
    #[serde(default)]
    pub version: String,
    /// Text shown at the top of the menu
    #[serde(default)]
    pub description: Option<String>,
    /// Lines for the TROUBLESHOOTING section
    #[serde(default)]
    pub troubleshooting: Vec<String>,
}

impl AppInfo {
    /// Create info for `name` at `version`
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            troubleshooting: Vec::new(),
        }
    }

    /// Set the menu description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a troubleshooting line
    pub fn troubleshooting(mut self, line: impl Into<String>) -> Self {
        self.troubleshooting.push(line.into());
        self
    }

    /// `<name> <version>`
    pub fn version_line(&self) -> String {
        format!("{} {}", self.name, self.version).trim().to_string()
    }
}

impl HelpIndex {
    /// Render the top-level menu.
    ///
    /// Visible top-level commands with subcommands are listed under TOPICS,
    /// the rest under COMMANDS, each sorted by name.
    pub fn render_main_menu(&self, app: &AppInfo) -> String {
        let settings = self.settings();
        let width = settings.max_line_width;
        let body_width = width.saturating_sub(SECTION_INDENT);
        let mut sections: Vec<Vec<String>> = Vec::new();

        if let Some(description) = &app.description {
            sections.push(wrap(description, width));
        }

        if !app.version.is_empty() {
            sections.push(vec![settings.header("VERSION"), format!("  {}", app.version)]);
        }

        sections.push(vec![
            settings.header("USAGE"),
            format!("  $ {} <command> [options]", self.entrypoint()),
        ]);

        let (topics, commands): (Vec<_>, Vec<_>) = self
            .top_level()
            .partition(|help| help.command().descriptor.has_subcommands());

        for (title, group) in [("TOPICS", topics), ("COMMANDS", commands)] {
            if group.is_empty() {
                continue;
            }
            let rows: Vec<(String, String)> = group
                .iter()
                .map(|help| {
                    let descriptor = &help.command().descriptor;
                    (descriptor.name.clone(), descriptor.summary().unwrap_or_default().to_string())
                })
                .collect();

            let mut section = vec![settings.header(title)];
            section.extend(table(&rows, width));
            sections.push(section);
        }

        if !app.troubleshooting.is_empty() {
            let mut section = vec![settings.header("TROUBLESHOOTING")];
            for (i, line) in app.troubleshooting.iter().enumerate() {
                if i > 0 {
                    section.push(String::new());
                }
                section.extend(indent(&wrap(line, body_width), SECTION_INDENT));
            }
            sections.push(section);
        }

        sections
            .into_iter()
            .map(|lines| lines.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
            .trim()
            .to_string()
    }
}
