//! Framework integration tests
//!
//! These tests drive whole invocations through registry, parser, help and
//! executor using captured output.

use cmdtree::cli::help::layout::display_width;
use cmdtree::cli::naming::{canonical_key, dashed};
use cmdtree::cli::{
    parse, AppInfo, ArgSpec, CapturedStreams, CommandDescriptor, CommandOutcome, CommandRegistry,
    DeclarativeCli, DeclarativeError, ExitStatus, FlagSpec, HelpSettings, InputError,
    SelectiveRenderOptions, StdinCache,
};
use std::sync::{Arc, Mutex};

fn tokens(input: &[&str]) -> Vec<String> {
    input.iter().map(|s| s.to_string()).collect()
}

fn set_value() -> CommandDescriptor {
    CommandDescriptor::new("set-value")
        .alias("sv")
        .short_description("Sets or removes a record into the default key-value store.")
        .arg(ArgSpec::string("key").required().description("Key of the record in key-value store."))
        .arg(
            ArgSpec::string("value")
                .stdin()
                .description("Record data, which can be one of the following values: JSON, text."),
        )
        .flag(
            FlagSpec::string("content-type")
                .short('c')
                .default_value("application/json")
                .description("Specifies a custom MIME content type of the record."),
        )
}

fn actor() -> CommandDescriptor {
    CommandDescriptor::new("actor")
        .alias("act")
        .description("Manages runtime data operations inside of a running Actor.")
        .subcommand(set_value())
        .subcommand(
            CommandDescriptor::new("get-value")
                .alias("gv")
                .hidden_alias("getvalue")
                .arg(ArgSpec::string("key").required()),
        )
}

type Calls = Arc<Mutex<Vec<(Option<String>, Option<String>, Option<String>)>>>;

fn cli_with_recorder() -> (DeclarativeCli, CapturedStreams, Calls) {
    let (output, streams) = cmdtree::cli::Output::captured();
    let mut cli = DeclarativeCli::with_help_settings(AppInfo::new("apify", "1.0.0"), HelpSettings::plain(80))
        .unwrap()
        .with_output(output)
        .with_stdin(StdinCache::from_reader(std::io::Cursor::new("from stdin")));
    cli.register(actor()).unwrap();

    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = calls.clone();
    cli.register_fn("actor::set-value", move |ctx| {
        let recorded = recorded.clone();
        async move {
            recorded.lock().unwrap().push((
                ctx.arg("key").map(String::from),
                ctx.arg("value").map(String::from),
                ctx.flag("content-type").map(String::from),
            ));
            Ok(CommandOutcome::ok())
        }
    });
    (cli, streams, calls)
}

#[test]
fn test_canonicalization_is_idempotent() {
    for name in ["content-type", "contentType", "--content-type", "no-prompt", "max_items", "x"] {
        let once = canonical_key(name);
        assert_eq!(canonical_key(&once), once, "canonical key of {}", name);

        let dashed_once = dashed(name);
        assert_eq!(dashed(&dashed_once), dashed_once, "dashed form of {}", name);
    }
}

#[test]
fn test_required_then_optional_bind_in_order() {
    let descriptor = set_value();
    let parsed = parse(&tokens(&["my-key", "my-value"]), &descriptor, &StdinCache::empty());

    assert!(parsed.is_valid());
    assert_eq!(parsed.string_arg("key"), Some("my-key"));
    assert_eq!(parsed.string_arg("value"), Some("my-value"));
}

#[test]
fn test_flag_and_alias_together_always_conflict() {
    let descriptor = CommandDescriptor::new("push").flag(FlagSpec::string("version-number").alias("version"));

    for order in [
        ["--version-number=1.0", "--version=2.0"],
        ["--version=2.0", "--version-number=1.0"],
    ] {
        let parsed = parse(&tokens(&order), &descriptor, &StdinCache::empty());
        assert!(
            matches!(parsed.errors.as_slice(), [InputError::FlagProvidedMultipleTimes { flag, .. }] if flag == "version-number"),
            "order {:?} gave {:?}",
            order,
            parsed.errors
        );
    }
}

#[test]
fn test_integer_flag_rejects_text() {
    let descriptor = CommandDescriptor::new("run").flag(FlagSpec::integer("memory"));
    let parsed = parse(&tokens(&["--memory", "abc"]), &descriptor, &StdinCache::empty());

    assert_eq!(
        parsed.errors,
        vec![InputError::InvalidIntegerValue {
            flag: "memory".to_string(),
            value: "abc".to_string(),
        }]
    );
    assert_eq!(parsed.flag_i64("memory"), None);
}

#[test]
fn test_exclusive_flags_ignore_defaults() {
    let descriptor = CommandDescriptor::new("call")
        .flag(FlagSpec::string("input").exclusive_with("input-file").default_value("{}"))
        .flag(FlagSpec::string("input-file"));

    let both = parse(&tokens(&["--input={\"a\":1}", "--input-file=in.json"]), &descriptor, &StdinCache::empty());
    assert!(matches!(both.errors.as_slice(), [InputError::MutuallyExclusiveFlags { .. }]));

    let defaulted = parse(&tokens(&["--input-file=in.json"]), &descriptor, &StdinCache::empty());
    assert!(defaulted.is_valid());
    assert_eq!(defaulted.string_flag("input"), Some("{}"));
}

#[test]
fn test_every_missing_item_is_reported_at_once() {
    let descriptor = CommandDescriptor::new("create")
        .arg(ArgSpec::string("name").required())
        .arg(ArgSpec::string("template").required())
        .flag(FlagSpec::string("token").required());

    let parsed = parse(&[], &descriptor, &StdinCache::empty());
    assert_eq!(parsed.errors.len(), 3);
    assert_eq!(parsed.missing_required_args.len(), 2);
    assert!(parsed.errors.iter().all(InputError::is_missing_required));
}

#[test]
fn test_resolution_through_every_alias() {
    let mut registry = CommandRegistry::with_help_settings("apify", HelpSettings::plain(80));
    registry.register(actor()).unwrap();

    for path in [["actor", "get-value"], ["act", "get-value"], ["actor", "gv"], ["act", "getvalue"]] {
        let resolution = registry.resolve(&tokens(&path)).unwrap();
        assert_eq!(resolution.command.path, vec!["actor", "get-value"]);
        assert!(resolution.remaining.is_empty());
    }

    let err = registry
        .register(CommandDescriptor::new("actor").subcommand(CommandDescriptor::new("get-value")))
        .unwrap_err();
    assert!(matches!(err, DeclarativeError::DuplicateCommand(_)));
    assert!(registry.resolve(&tokens(&["actor", "get-value"])).is_ok());
}

#[test]
fn test_usage_wraps_to_narrow_width() {
    let mut registry = CommandRegistry::with_help_settings("apify", HelpSettings::plain(40));
    registry
        .register(
            CommandDescriptor::new("actor").subcommand(
                set_value()
                    .flag(FlagSpec::boolean("force").short('f'))
                    .flag(FlagSpec::integer("timeout").short('t'))
                    .flag(FlagSpec::string("store").short('s')),
            ),
        )
        .unwrap();

    let usage = registry
        .help()
        .selective_render(&["actor", "set-value"], SelectiveRenderOptions::usage_only())
        .unwrap();
    let lines: Vec<&str> = usage.lines().collect();

    assert!(lines.len() > 2, "usage was not wrapped:\n{}", usage);
    assert!(lines.iter().all(|line| display_width(line) <= 40), "line too wide:\n{}", usage);
}

#[test]
fn test_long_command_path_wraps_to_narrow_width() {
    let mut registry = CommandRegistry::with_help_settings("apify", HelpSettings::plain(40));
    registry
        .register(
            CommandDescriptor::new("key-value-stores").subcommand(
                CommandDescriptor::new("get-record-metadata")
                    .short_description("Gets metadata of a record in a key-value store.")
                    .arg(ArgSpec::string("store-id").required().description("The key-value store ID."))
                    .arg(ArgSpec::string("key").required().description("The record key."))
                    .enable_json_flag(),
            ),
        )
        .unwrap();

    let path = ["key-value-stores", "get-record-metadata"];
    let usage = registry
        .help()
        .selective_render(&path, SelectiveRenderOptions::usage_only())
        .unwrap();
    assert!(usage.lines().all(|line| display_width(line) <= 40), "line too wide:\n{}", usage);
    assert!(usage.contains("  $ apify key-value-stores\n      get-record-metadata"));

    let help = registry.help().render(&path).unwrap();
    assert!(help.lines().all(|line| display_width(line) <= 40), "line too wide:\n{}", help);
}

#[test]
fn test_help_for_unregistered_path_fails() {
    let registry = CommandRegistry::with_help_settings("apify", HelpSettings::plain(80));
    let err = registry.help().render(&["ghost"]).unwrap_err();
    assert!(matches!(err, DeclarativeError::NoHelpRendererRegistered { .. }));
}

#[tokio::test]
async fn test_set_value_end_to_end() {
    let (cli, _streams, calls) = cli_with_recorder();

    assert_eq!(cli.run_from(["actor", "set-value", "my-key"]).await, ExitStatus::Success);
    assert_eq!(
        cli.run_from(["act", "sv", "my-key", "my-value", "--content-type=text/plain"]).await,
        ExitStatus::Success
    );

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls[0],
        (Some("my-key".to_string()), None, Some("application/json".to_string()))
    );
    assert_eq!(
        calls[1],
        (
            Some("my-key".to_string()),
            Some("my-value".to_string()),
            Some("text/plain".to_string())
        )
    );
}

#[tokio::test]
async fn test_stdin_sentinel_reads_captured_input() {
    let (cli, _streams, calls) = cli_with_recorder();

    assert_eq!(cli.run_from(["actor", "set-value", "k", "-"]).await, ExitStatus::Success);
    assert_eq!(cli.run_from(["actor", "set-value", "k2", "-"]).await, ExitStatus::Success);

    let calls = calls.lock().unwrap().clone();
    assert_eq!(calls[0].1.as_deref(), Some("from stdin"));
    assert_eq!(calls[1].1.as_deref(), Some("from stdin"));
}

#[tokio::test]
async fn test_exit_codes() {
    let (cli, streams, calls) = cli_with_recorder();

    assert_eq!(cli.run_from(["actor", "set-value"]).await.code(), 2);
    assert_eq!(cli.run_from(["actr"]).await.code(), 3);
    assert_eq!(cli.run_from(["actor", "set-value", "k", "a", "b"]).await.code(), 4);
    assert_eq!(cli.run_from(["actor", "get-value", "k"]).await.code(), 1);
    assert!(calls.lock().unwrap().is_empty());

    let stderr = streams.stderr();
    assert!(stderr.contains("Missing 1 required argument(s):"));
    assert!(stderr.contains("Did you mean: act (alias for actor), actor?"));
    assert!(stderr.contains("Unexpected argument 'b'"));
    assert!(stderr.contains("Handler not found: actor::get-value"));
}

#[tokio::test]
async fn test_help_sections_in_order() {
    let (cli, streams, _) = cli_with_recorder();

    assert_eq!(cli.run_from(["actor", "set-value", "-h"]).await, ExitStatus::Success);
    let help = streams.stdout();

    let positions: Vec<usize> = ["USAGE", "ARGUMENTS", "FLAGS"]
        .iter()
        .map(|header| help.find(header).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(help.contains("-c, --content-type=<value>"));
}

#[tokio::test]
async fn test_main_menu_lists_topics() {
    let (cli, streams, _) = cli_with_recorder();

    assert_eq!(cli.run_from(["--help"]).await, ExitStatus::Success);
    let menu = streams.stdout();
    assert!(menu.contains("USAGE\n  $ apify <command> [options]"));
    assert!(menu.contains("TOPICS\n  actor"));
}
