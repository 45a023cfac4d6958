//! Tests for reading raw values from a command line through clap.
mod common;
use common::*;
use kumitate::cli::ClapAdapter;
use kumitate::prelude::*;

fn copy_command() -> Command<ValueMap> {
    Command::builder("copy")
        .source(SourceNode::argument("src").help("File to copy"))
        .source(SourceNode::option("dest").short('d').default("out"))
        .process(Strip)
        .source(SourceNode::flag("force").short('f'))
        .source(SourceNode::option("exclude").multiple())
        .build(|args: Arguments| Ok(args))
        .unwrap()
}

#[test]
fn test_run_from_reads_every_kind() {
    let mut command = copy_command();
    let args = command
        .run_from([
            "copy",
            "notes.txt",
            "-d",
            " backup ",
            "--force",
            "--exclude",
            "*.tmp",
            "--exclude",
            "*.log",
        ])
        .unwrap();

    assert_eq!(args.get_str("src"), Some("notes.txt"));
    assert_eq!(args.get_str("dest"), Some("backup"));
    assert_eq!(args.get_bool("force"), Some(true));
    assert_eq!(args.get("exclude"), Some(&Value::from(vec!["*.tmp", "*.log"])));
}

#[test]
fn test_unset_options_use_source_defaults() {
    let mut command = copy_command();
    let args = command.run_from(["copy", "notes.txt"]).unwrap();

    assert_eq!(args.get_str("dest"), Some("out"));
    assert_eq!(args.get_bool("force"), Some(false));
    assert!(args.get("exclude").is_none());
    assert!(!command.tree().source("dest").unwrap().was_provided());
    assert!(!command.tree().source("force").unwrap().was_provided());
    assert!(command.tree().source("src").unwrap().was_provided());
}

#[test]
fn test_missing_positional_is_a_resolve_error() {
    let mut command = copy_command();
    let err = command.run_from(["copy"]).unwrap_err();
    assert_eq!(err, PipelineError::Resolve(ResolveError::MissingValue("src".to_string())));
}

#[test]
fn test_nested_occurrences_keep_their_grouping() {
    let mut command = Command::builder("pairs")
        .source(SourceNode::option("pair").nargs(2).multiple())
        .process(ToUppercase)
        .build(|args: Arguments| Ok(args.get("pair").cloned()))
        .unwrap();

    let pairs = command
        .run_from(["pairs", "--pair", "a", "b", "--pair", "c", "d"])
        .unwrap();
    assert_eq!(
        pairs,
        Some(Value::List(vec![
            Value::from(vec!["A", "B"]),
            Value::from(vec!["C", "D"])
        ]))
    );
}

#[test]
fn test_typed_values_are_parsed_by_clap() {
    let mut command = count_command();
    assert_eq!(command.run_from(["counter", "-c", "4"]).unwrap(), 4);

    let err = command.run_from(["counter", "-c", "four"]).unwrap_err();
    assert!(matches!(err, PipelineError::Usage(ref message) if message.contains("four")));

    let err = command.run_from(["counter", "--count=-3"]).unwrap_err();
    assert_eq!(err.origin(), Some("count"));
}

#[test]
fn test_env_sources_are_not_registered_with_clap() {
    let command = Command::builder("deploy")
        .source(SourceNode::option("dry_run").value_type(ValueType::Bool).default(false))
        .source(SourceNode::env("token", "KUMITATE_CLI_TEST_TOKEN").default("none"))
        .build(|_args: Arguments| Ok(()))
        .unwrap();

    let clap_command = command.clap_command();
    let ids: Vec<_> = clap_command.get_arguments().map(|a| a.get_id().as_str()).collect();
    assert_eq!(ids, vec!["dry_run"]);
    let dry_run = clap_command.get_arguments().next().unwrap();
    assert_eq!(dry_run.get_long(), Some("dry-run"));
}

#[test]
fn test_adapter_parses_without_invoking() {
    let command = copy_command();
    let call = ClapAdapter::new(command.tree())
        .try_parse_from(["copy", "a.txt", "--exclude", "x"])
        .unwrap();
    assert_eq!(call.get("src"), Some(&Value::from("a.txt")));
    assert_eq!(call.get("exclude"), Some(&Value::from(vec!["x"])));
    assert!(call.get("dest").is_none());
    assert!(call.get("force").is_none());
}
