//! Help text for a single command

use super::layout::{flow, indent, table, wrap, SECTION_INDENT};
use super::{HelpSettings, SelectiveRenderOptions};
use crate::cli::descriptor::{CommandDescriptor, FlagSpec};
use crate::cli::registry::RegisteredCommand;
use std::collections::HashSet;
use std::sync::Arc;

/// Renders help for one registered command
#[derive(Debug, Clone)]
pub struct CommandHelp {
    entrypoint: String,
    command: Arc<RegisteredCommand>,
    settings: HelpSettings,
}

impl CommandHelp {
    /// Create a renderer for `command`, invoked through `entrypoint`
    pub fn new(entrypoint: impl Into<String>, command: Arc<RegisteredCommand>, settings: HelpSettings) -> Self {
        Self {
            entrypoint: entrypoint.into(),
            command,
            settings,
        }
    }

    /// The command this renderer belongs to
    pub fn command(&self) -> &Arc<RegisteredCommand> {
        &self.command
    }

    fn descriptor(&self) -> &CommandDescriptor {
        &self.command.descriptor
    }

    /// Full help text
    pub fn render(&self) -> String {
        self.selective_render(SelectiveRenderOptions::all())
    }

    /// Help text limited to the chosen sections.
    ///
    /// Sections always appear in the same order: short description, USAGE,
    /// ARGUMENTS, FLAGS, GLOBAL FLAGS, DESCRIPTION, SUBCOMMANDS. The implicit
    /// `--json` flag is listed under GLOBAL FLAGS, never under FLAGS.
    pub fn selective_render(&self, options: SelectiveRenderOptions) -> String {
        let width = self.settings.max_line_width;
        let mut sections: Vec<Vec<String>> = Vec::new();

        if options.show_short_description {
            if let Some(summary) = self.descriptor().summary() {
                sections.push(wrap(summary, width));
            }
        }

        if options.show_usage_string {
            let mut section = vec![self.settings.header("USAGE")];
            section.extend(self.usage_lines());
            sections.push(section);
        }

        if options.show_arguments && !self.descriptor().args.is_empty() {
            let mut section = vec![self.settings.header("ARGUMENTS")];
            section.extend(table(&self.argument_rows(), width));
            sections.push(section);
        }

        let flag_rows = self.flag_rows();
        if options.show_flags && !flag_rows.is_empty() {
            let mut section = vec![self.settings.header("FLAGS")];
            section.extend(table(&flag_rows, width));
            sections.push(section);
        }

        let global_rows = self.global_flag_rows();
        if options.show_flags && !global_rows.is_empty() {
            let mut section = vec![self.settings.header("GLOBAL FLAGS")];
            section.extend(table(&global_rows, width));
            sections.push(section);
        }

        if options.show_description {
            if let Some(description) = &self.descriptor().description {
                let mut section = vec![self.settings.header("DESCRIPTION")];
                section.extend(indent(&wrap(description, width.saturating_sub(SECTION_INDENT)), SECTION_INDENT));
                sections.push(section);
            }
        }

        let subcommand_rows = self.subcommand_rows();
        if options.show_subcommands && !subcommand_rows.is_empty() {
            let mut section = vec![self.settings.header("SUBCOMMANDS")];
            section.extend(table(&subcommand_rows, width));
            sections.push(section);
        }

        sections
            .into_iter()
            .map(|lines| lines.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
            .trim_end()
            .to_string()
    }

    /// The USAGE block, indented and wrapped to the line width
    pub fn usage_lines(&self) -> Vec<String> {
        let width = self.settings.max_line_width.saturating_sub(SECTION_INDENT);
        let prefix = format!("$ {} {}", self.entrypoint, self.command.path.join(" "));
        indent(&flow(&prefix, &self.usage_tokens(), width), SECTION_INDENT)
    }

    /// Usage tokens after the command path: arguments, then flags
    pub fn usage_tokens(&self) -> Vec<String> {
        let descriptor = self.descriptor();
        let mut tokens: Vec<String> = descriptor
            .args
            .iter()
            .map(|arg| if arg.required { format!("<{}>", arg.name) } else { format!("[{}]", arg.name) })
            .collect();

        if descriptor.has_subcommands() && descriptor.args.is_empty() {
            tokens.push("<subcommand>".to_string());
        }

        let mut flags: Vec<FlagSpec> = descriptor.effective_flags().into_iter().filter(|f| !f.hidden).collect();
        flags.sort_by(|a, b| b.required.cmp(&a.required).then_with(|| a.dashed_name().cmp(&b.dashed_name())));

        let mut rendered: HashSet<String> = HashSet::new();
        for flag in &flags {
            if rendered.contains(&flag.key()) {
                continue;
            }

            let excluded = descriptor.exclusions_of(flag);
            let group: Vec<&FlagSpec> = std::iter::once(flag)
                .chain(flags.iter().filter(|other| excluded.contains(&other.key())))
                .filter(|f| !rendered.contains(&f.key()))
                .collect();

            let required = group.iter().any(|f| f.required);
            let body = group.iter().map(|f| usage_flag(f)).collect::<Vec<_>>().join(" | ");
            for member in &group {
                rendered.insert(member.key());
            }

            tokens.push(if required { body } else { format!("[{}]", body) });
        }

        tokens
    }

    fn argument_rows(&self) -> Vec<(String, String)> {
        self.descriptor()
            .args
            .iter()
            .map(|arg| (arg.name.clone(), arg.description.clone()))
            .collect()
    }

    fn flag_rows(&self) -> Vec<(String, String)> {
        self.descriptor()
            .flags
            .iter()
            .filter(|flag| !flag.hidden)
            .map(|flag| (table_flag_name(flag), table_flag_description(flag)))
            .collect()
    }

    fn global_flag_rows(&self) -> Vec<(String, String)> {
        let declared = &self.descriptor().flags;
        self.descriptor()
            .effective_flags()
            .iter()
            .filter(|flag| !declared.contains(flag))
            .map(|flag| (format!("--{}", flag.dashed_name()), flag.description.clone()))
            .collect()
    }

    fn subcommand_rows(&self) -> Vec<(String, String)> {
        let path = self.command.path.join(" ");
        self.descriptor()
            .subcommands
            .iter()
            .filter(|sub| !sub.hidden)
            .map(|sub| (format!("{} {}", path, sub.name), sub.summary().unwrap_or_default().to_string()))
            .collect()
    }
}

/// Flag as written in a usage line: short form when there is one
fn usage_flag(flag: &FlagSpec) -> String {
    let name = match flag.short {
        Some(short) => format!("-{}", short),
        None => format!("--{}", flag.dashed_name()),
    };

    if flag.kind.takes_value() {
        format!("{} <value>", name)
    } else {
        name
    }
}

/// Flag as written in the FLAGS table: `-c, --name=<value>`
fn table_flag_name(flag: &FlagSpec) -> String {
    let mut name = match flag.short {
        Some(short) => format!("-{}, --{}", short, flag.dashed_name()),
        None => format!("    --{}", flag.dashed_name()),
    };

    if flag.kind.takes_value() {
        name.push_str(if flag.choices.is_empty() { "=<value>" } else { "=<option>" });
    }
    name
}

fn table_flag_description(flag: &FlagSpec) -> String {
    let mut description = flag.description.clone();
    if !flag.choices.is_empty() {
        if !description.is_empty() {
            description.push('\n');
        }
        description.push_str(&format!("<options: {}>", flag.choice_strings().join("|")));
    }
    description
}
