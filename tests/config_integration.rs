//! Config-driven CLI integration tests
//!
//! A command tree is loaded from a file, handlers are bound by name and
//! invocations are run end to end, including the invocation log.

#![cfg(all(feature = "config", feature = "observability"))]

use cmdtree::cli::{CliConfig, CommandFailure, CommandOutcome, DeclarativeCli, ExitStatus, Output, StdinCache};
use std::io::Write;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, log_file: &std::path::Path) -> std::path::PathBuf {
    let content = format!(
        r#"
[app]
name = "apify"
version = "1.0.0"
description = "Apify command-line interface"
max_line_width = 60
log_file = "{}"
troubleshooting = ["For general support, reach out to us."]

[[commands]]
name = "actor"
aliases = ["act"]
description = "Manages runtime data operations inside of a running Actor."

[[commands.subcommands]]
name = "set-value"
short_description = "Sets a record in the default key-value store."
json_flag = true

[[commands.subcommands.args]]
name = "key"
required = true
description = "Key of the record"

[[commands.subcommands.args]]
name = "value"
stdin = true

[[commands.subcommands.flags]]
name = "content-type"
type = "string"
short = "c"
default = "application/json"

[[commands]]
name = "version"
hidden = true
handler = "builtin::version"

[[commands]]
name = "push"
handler = "deploy::push"

[[commands.flags]]
name = "memory"
type = "integer"
"#,
        log_file.display()
    );

    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn build(dir: &TempDir) -> (DeclarativeCli, cmdtree::cli::CapturedStreams, std::path::PathBuf) {
    let log_file = dir.path().join("logs").join("invocations.md");
    let config_path = write_config(dir, "cli.toml", &log_file);

    let (output, streams) = Output::captured();
    let mut cli = DeclarativeCli::from_file(&config_path)
        .unwrap()
        .with_output(output)
        .with_stdin(StdinCache::empty());

    cli.register_fn("actor::set-value", |ctx| async move {
        let key = ctx.arg("key").unwrap_or_default().to_string();
        ctx.output.success(&format!("Stored record {}", key));
        Ok(CommandOutcome::json(serde_json::json!({
            "key": key,
            "contentType": ctx.flag("content-type"),
        })))
    });
    cli.register_fn("deploy::push", |ctx| async move {
        match ctx.flag_i64("memory") {
            Some(memory) if memory > 4096 => Err(anyhow::Error::new(CommandFailure::new(10, "Not enough memory available"))),
            _ => Ok(CommandOutcome::ok()),
        }
    });

    (cli, streams, log_file)
}

#[tokio::test]
async fn test_config_tree_runs() {
    let dir = TempDir::new().unwrap();
    let (cli, streams, _) = build(&dir);

    assert!(cli.validate_handlers().is_ok());
    assert_eq!(cli.run_from(["act", "set-value", "greeting"]).await, ExitStatus::Success);
    assert_eq!(streams.stderr(), "Success: Stored record greeting\n");
    assert_eq!(streams.stdout(), "");
}

#[tokio::test]
async fn test_json_flag_from_config() {
    let dir = TempDir::new().unwrap();
    let (cli, streams, _) = build(&dir);

    let status = cli
        .run_from(["actor", "set-value", "greeting", "-c", "text/plain", "--json"])
        .await;
    assert_eq!(status, ExitStatus::Success);

    let value: serde_json::Value = serde_json::from_str(&streams.stdout()).unwrap();
    assert_eq!(value["key"], "greeting");
    assert_eq!(value["contentType"], "text/plain");
    assert_eq!(streams.stderr(), "");
}

#[tokio::test]
async fn test_custom_exit_code_passes_through() {
    let dir = TempDir::new().unwrap();
    let (cli, streams, _) = build(&dir);

    assert_eq!(cli.run_from(["push", "--memory", "8192"]).await, ExitStatus::Custom(10));
    assert_eq!(streams.stderr(), "Error: Not enough memory available\n");

    assert_eq!(cli.run_from(["push", "--memory", "lots"]).await, ExitStatus::InvalidInput);
}

#[tokio::test]
async fn test_builtin_version_command() {
    let dir = TempDir::new().unwrap();
    let (cli, streams, _) = build(&dir);

    assert_eq!(cli.run_from(["version"]).await, ExitStatus::Success);
    assert_eq!(streams.stdout(), "apify 1.0.0\n");
}

#[tokio::test]
async fn test_menu_uses_configured_width() {
    let dir = TempDir::new().unwrap();
    let (cli, streams, _) = build(&dir);

    assert_eq!(cli.run_from(Vec::<String>::new()).await, ExitStatus::Success);
    let menu = streams.stdout();
    assert!(menu.contains("TROUBLESHOOTING\n  For general support, reach out to us."));
    assert!(menu.contains("COMMANDS\n  push"));
    assert!(!menu.contains("  version"));
    assert!(menu.lines().all(|line| line.chars().count() <= 60));
}

#[tokio::test]
async fn test_invocations_are_logged() {
    let dir = TempDir::new().unwrap();
    let (cli, _streams, log_file) = build(&dir);

    cli.run_from(["actor", "set-value", "greeting"]).await;
    cli.run_from(["push", "--memory=abc"]).await;
    cli.run_from(["actr"]).await;

    let log = std::fs::read_to_string(&log_file).unwrap();
    assert!(log.starts_with("# Command Invocation Log"));
    assert!(log.contains("**Command:** actor set-value\n**Exit code:** 0"));
    assert!(log.contains("### Validation Failed"));
    assert!(log.contains("**Command:** push\n**Exit code:** 4"));
    assert!(log.contains("**Error:** Command actr not found"));
    assert!(log.contains("**Command:** -\n**Exit code:** 3"));
}

#[test]
fn test_json_config_matches_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cli.json");
    std::fs::write(
        &path,
        r#"{
            "app": {"name": "apify", "version": "1.0.0"},
            "commands": [{"name": "login", "flags": [{"name": "token", "type": "string", "short": "t"}]}]
        }"#,
    )
    .unwrap();

    let config = CliConfig::from_file(&path).unwrap();
    assert_eq!(config.commands[0].flags[0].short, Some('t'));

    let cli = DeclarativeCli::from_config(&config).unwrap();
    assert!(cli.registry().contains("login"));
}

#[test]
fn test_invalid_descriptor_in_config_is_rejected() {
    let config = CliConfig::from_json_str(r#"{"app": {"name": "apify"}, "commands": [{"name": "Login"}]}"#).unwrap();
    assert!(DeclarativeCli::from_config(&config).is_err());
}
