//! Tests for shape dispatch, chain semantics and hook ordering.
mod common;
use common::*;
use kumitate::prelude::*;

fn run_single(source: SourceNode, processors: Vec<ProcessorNode>, call: CallArgs) -> Result<Value, PipelineError> {
    let name = source.name().to_string();
    let mut builder = Command::builder("single").source(source);
    for processor in processors {
        builder = builder.process_with(processor);
    }
    let mut command = builder
        .build(move |args: Arguments| Ok(args.raw(&name).cloned().unwrap_or(Value::Null)))
        .map_err(PipelineError::from)?;
    command.invoke_blocking(call)
}

#[test]
fn test_flat_sequence_is_uppercased_element_wise() {
    let result = run_single(
        SourceNode::option("names").multiple(),
        vec![ProcessorNode::new(ToUppercase)],
        CallArgs::new().with("names", vec!["ab", "cd", "ef"]),
    )
    .unwrap();
    assert_eq!(result, Value::from(vec!["AB", "CD", "EF"]));
}

#[test]
fn test_nested_failure_reports_index_path() {
    let err = run_single(
        SourceNode::option("pairs").nargs(2).multiple(),
        vec![ProcessorNode::new(MinLength(2))],
        CallArgs::new().with(
            "pairs",
            Value::List(vec![Value::from(vec!["ab", "cd"]), Value::from(vec!["e", "fg"])]),
        ),
    )
    .unwrap_err();

    match &err {
        PipelineError::Processing {
            owner,
            processor,
            path,
            ..
        } => {
            assert_eq!(owner, "pairs");
            assert_eq!(processor, "min_length");
            assert_eq!(path.indices(), &[1, 0]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "Invalid value for 'pairs[1][0]': 'e' is shorter than 2 characters (min_length)"
    );
}

#[test]
fn test_nested_transformation_rebuilds_structure() {
    let result = run_single(
        SourceNode::option("pairs").nargs(2).multiple(),
        vec![ProcessorNode::new(AddPrefix::new("x-"))],
        CallArgs::new().with(
            "pairs",
            Value::List(vec![Value::from(vec!["a", "b"]), Value::from(vec!["c", "x-d"])]),
        ),
    )
    .unwrap();
    assert_eq!(
        result,
        Value::List(vec![
            Value::from(vec!["x-a", "x-b"]),
            Value::from(vec!["x-c", "x-d"])
        ])
    );
}

#[test]
fn test_missing_value_skips_processors() {
    let (validator, counter) = counting_validator("counted");
    let result = run_single(
        SourceNode::option("count").value_type(ValueType::Int),
        vec![ProcessorNode::new(validator), ProcessorNode::new(IsPositive)],
        CallArgs::new(),
    )
    .unwrap();
    assert_eq!(result, Value::Missing);
    assert_eq!(calls(&counter), 0);
}

#[test]
fn test_missing_aware_processor_runs_on_missing() {
    let fill = FnProcessor::new(
        "fill",
        Capabilities::transformer().each(TypeSet::INT).with_missing(),
        |value: &Value, _ctx: &Context<'_>| {
            Ok(value.is_missing().then_some(Value::Int(42)))
        },
    );
    let result = run_single(
        SourceNode::option("count").value_type(ValueType::Int),
        vec![ProcessorNode::new(fill), ProcessorNode::new(IsPositive)],
        CallArgs::new(),
    )
    .unwrap();
    assert_eq!(result, Value::Int(42));
}

#[test]
fn test_validator_returning_value_is_invalid_handler() {
    let bad = FnProcessor::new(
        "bad",
        Capabilities::validator().each(TypeSet::ANY),
        |_value: &Value, _ctx: &Context<'_>| Ok(Some(Value::Null)),
    );
    let err = run_single(
        SourceNode::option("name"),
        vec![ProcessorNode::new(bad)],
        CallArgs::new().with("name", "x"),
    )
    .unwrap_err();
    assert_eq!(
        err,
        PipelineError::InvalidHandler {
            owner: "name".to_string(),
            processor: "bad".to_string()
        }
    );
}

#[test]
fn test_runtime_type_drift_is_unhandled() {
    // Declares no produced type, then returns an integer anyway.
    let drift = FnProcessor::map("drift", |_value| Ok(Value::Int(1)));
    let err = run_single(
        SourceNode::option("name"),
        vec![ProcessorNode::new(drift), ProcessorNode::new(ToUppercase)],
        CallArgs::new().with("name", "x"),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Unhandled { ref processor, ref found, .. } if processor == "to_uppercase" && found == "int"
    ));
}

#[test]
fn test_transformer_output_replaces_running_value() {
    let result = run_single(
        SourceNode::option("target"),
        vec![
            ProcessorNode::new(Strip),
            ProcessorNode::new(AsPath::new()),
        ],
        CallArgs::new().with("target", "  out/dir "),
    )
    .unwrap();
    assert_eq!(result, Value::Path("out/dir".into()));
}

#[test]
fn test_processor_arguments_are_visible_in_context() {
    let suffix = FnProcessor::new(
        "suffix",
        Capabilities::transformer().each(TypeSet::STR),
        |value: &Value, ctx: &Context<'_>| {
            let suffix = ctx.kwarg("with").and_then(Value::as_str).unwrap_or("?");
            let repeat = ctx.args().first().and_then(Value::as_int).unwrap_or(1) as usize;
            Ok(value
                .as_str()
                .map(|s| Value::from(format!("{}{}", s, suffix.repeat(repeat)))))
        },
    );
    let node = ProcessorNode::new(suffix).with_arg(2).with_kwarg("with", "!");
    let result = run_single(
        SourceNode::option("word"),
        vec![node],
        CallArgs::new().with("word", "hey"),
    )
    .unwrap();
    assert_eq!(result, Value::from("hey!!"));
}

#[test]
fn test_exit_request_passes_through() {
    let quit = FnProcessor::new(
        "quit",
        Capabilities::validator().each(TypeSet::ANY),
        |_value: &Value, _ctx: &Context<'_>| Err(ProcessError::Exit(3)),
    );
    let err = run_single(
        SourceNode::option("name"),
        vec![ProcessorNode::new(quit)],
        CallArgs::new().with("name", "x"),
    )
    .unwrap_err();
    assert_eq!(err, PipelineError::Exit(3));
    assert!(err.is_exit());
}

#[tokio::test]
async fn test_async_steps_keep_chain_order() {
    let mut command = Command::builder("ordered")
        .source(SourceNode::option("first").default("a"))
        .process(slow_recorder("slow", 20))
        .process(recorder("fast"))
        .source(SourceNode::option("second").default("b"))
        .process(recorder("after"))
        .build(|_args: Arguments| Ok(()))
        .unwrap();

    command.invoke(CallArgs::new()).await.unwrap();
    assert_eq!(markers(command.tree().data()), vec!["slow", "fast", "after"]);
}

#[test]
fn test_blocking_bridge_drives_async_hooks() {
    let mut command = Command::builder("bridged")
        .source(SourceNode::option("value").default("v"))
        .process(recorder("one"))
        .process(slow_recorder("two", 5))
        .process(recorder("three"))
        .build(|_args: Arguments| Ok(()))
        .unwrap();

    command.invoke_blocking(CallArgs::new()).unwrap();
    assert_eq!(markers(command.tree().data()), vec!["one", "two", "three"]);
}

#[test]
fn test_debug_mode_keeps_offending_value() {
    let mut command = count_command();
    let err = command.invoke_blocking(CallArgs::new().with("count", -1)).unwrap_err();
    assert!(matches!(err, PipelineError::Processing { value: None, .. }));

    let mut command = Command::builder("counter")
        .config(EngineConfig::new().with_debug(true))
        .source(SourceNode::option("count").value_type(ValueType::Int).default(1))
        .process(IsPositive)
        .build(|args: Arguments| Ok(args.get_int("count")))
        .unwrap();
    let err = command.invoke_blocking(CallArgs::new().with("count", -1)).unwrap_err();
    assert!(matches!(err, PipelineError::Processing { value: Some(Value::Int(-1)), .. }));
    assert!(err.render(true).ends_with("[value: -1]"));
}

fn group_count() -> impl Processor {
    FnProcessor::new(
        "group_count",
        Capabilities::validator().nested(Handling::Whole(TypeSet::STR)),
        |value: &Value, ctx: &Context<'_>| {
            let groups = value.as_list().map_or(0, <[Value]>::len);
            ctx.data().set("groups", groups as i64);
            Ok(None)
        },
    )
}

#[test]
fn test_empty_nested_sequence_keeps_its_configured_shape() {
    let result = run_single(
        SourceNode::option("pairs").nargs(2).multiple(),
        vec![ProcessorNode::new(group_count())],
        CallArgs::new().with("pairs", Value::List(vec![])),
    )
    .unwrap();
    assert_eq!(result, Value::List(vec![]));
}

#[test]
fn test_empty_nested_default_runs_the_chain() {
    let mut command = Command::builder("grouped")
        .source(SourceNode::option("pairs").nargs(2).multiple().default(Value::List(vec![])))
        .process(group_count())
        .build(|args: Arguments| Ok(args.raw("pairs").cloned()))
        .unwrap();

    let pairs = command.invoke_blocking(CallArgs::new()).unwrap();
    assert_eq!(pairs, Some(Value::List(vec![])));
    assert_eq!(command.tree().data().get("groups"), Some(Value::Int(0)));
}

#[test]
fn test_empty_flat_sequence_passes_element_wise_processors() {
    let (validator, counter) = counting_validator("counted");
    let result = run_single(
        SourceNode::option("names").multiple(),
        vec![ProcessorNode::new(validator), ProcessorNode::new(ToUppercase)],
        CallArgs::new().with("names", Value::List(vec![])),
    )
    .unwrap();
    assert_eq!(result, Value::List(vec![]));
    assert_eq!(calls(&counter), 0);
}

#[test]
fn test_explicit_null_reaches_processors() {
    let seen = FnProcessor::new(
        "seen",
        Capabilities::validator().each(TypeSet::STR),
        |value: &Value, ctx: &Context<'_>| {
            ctx.data().set("seen", value.clone());
            Ok(None)
        },
    );
    let mut command = Command::builder("nullable")
        .source(SourceNode::option("name"))
        .process(seen)
        .build(|args: Arguments| Ok(args.raw("name").cloned()))
        .unwrap();

    let value = command
        .invoke_blocking(CallArgs::new().with("name", Value::Null))
        .unwrap();
    assert_eq!(value, Some(Value::Null));
    assert_eq!(command.tree().data().get("seen"), Some(Value::Null));

    // An absent value never reaches a processor that does not accept it.
    command.invoke_blocking(CallArgs::new()).unwrap();
    assert_eq!(command.tree().data().get("seen"), None);
}
