//! A small archiving command wired through the pipeline engine.
//!
//! Try:
//!   pipeline-demo notes.txt --level high --exclude '*.tmp' --exclude '*.log'
//!   pipeline-demo notes.txt --json --yaml
//!   KUMITATE_DEBUG=1 RUST_LOG=debug pipeline-demo notes.txt --retries 0
use kumitate::prelude::*;
use std::time::Duration;

fn archive_command() -> Result<Command<String>, BuildError> {
    let existing = AsyncFnProcessor::new(
        "lookup_target",
        Capabilities::validator().each(TypeSet::PATH),
        |value: Value, store: DataStore| async move {
            // Stands in for a remote lookup.
            tokio::time::sleep(Duration::from_millis(10)).await;
            store.set("looked_up", value);
            Ok::<Option<Value>, ProcessError>(None)
        },
    );

    Command::builder("pipeline-demo")
        .config(EngineConfig::from_env().with_log_tree(true))
        .hook(
            HookNode::on_error(FnHook::new("report_invalid", |event: &HookEvent<'_>| {
                if let Some(err) = event.error() {
                    log::warn!("Archive rejected: {}", err);
                }
                Ok(())
            }))
            .include(ErrorKind::Processing)
            .include(ErrorKind::Resolve),
        )
        .hook(HookNode::on_exit(FnHook::new("store_size", |event: &HookEvent<'_>| {
            log::debug!("Finished with {} data-store keys", event.data().keys().len());
            Ok(())
        })))
        .global(GlobalNode::injecting(
            "started",
            FnGlobal::new("clock", |_scope: &Scope<'_>| {
                Ok(Some(Value::from(format!("{:?}", std::time::SystemTime::now()))))
            }),
        ))
        .source(SourceNode::argument("target").help("File or directory to archive"))
        .process(Strip)
        .process(AsPath::new())
        .process(existing)
        .source(
            SourceNode::option("level")
                .short('l')
                .default("normal")
                .help("Compression level"),
        )
        .process(ToLowercase)
        .process(Choice::new(["low", "normal", "high"]))
        .source(
            SourceNode::option("retries")
                .value_type(ValueType::Int)
                .default(3)
                .help("Upload attempts"),
        )
        .process(IsPositive)
        .source(
            SourceNode::option("exclude")
                .short('x')
                .multiple()
                .help("Glob patterns to skip"),
        )
        .process(Strip)
        .source(SourceNode::flag("json").tag("format").help("Write a JSON manifest"))
        .source(SourceNode::flag("yaml").tag("format").help("Write a YAML manifest"))
        .tag("format")
        .process(Exclusive)
        .source(SourceNode::env("token", "KUMITATE_DEMO_TOKEN").default("anonymous"))
        .global(
            GlobalNode::injecting(
                "summary",
                FnGlobal::new("summary", |scope: &Scope<'_>| {
                    let provided = scope
                        .sources()
                        .iter()
                        .filter(|s| s.was_provided())
                        .map(|s| s.name())
                        .collect::<Vec<_>>();
                    Ok(Some(Value::from(format!("provided: {}", provided.join(", ")))))
                }),
            )
            .delayed(),
        )
        .build(|args: Arguments| {
            let excluded = args
                .get("exclude")
                .and_then(Value::as_list)
                .map_or(0, <[Value]>::len);
            let format = if args.get_bool("json") == Some(true) {
                "json"
            } else if args.get_bool("yaml") == Some(true) {
                "yaml"
            } else {
                "none"
            };
            Ok(format!(
                "archiving {} at level {} ({} retries, {} exclusions, manifest: {}, token: {})\n{}",
                args.get("target").map(ToString::to_string).unwrap_or_default(),
                args.get_str("level").unwrap_or_default(),
                args.get_int("retries").unwrap_or_default(),
                excluded,
                format,
                args.get_str("token").unwrap_or_default(),
                args.get_str("summary").unwrap_or_default(),
            ))
        })
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut command = archive_command()
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid command definition: {}", e)));
    let debug = command.config().debug;

    match command.run_from(std::env::args_os()) {
        Ok(report) => println!("{}", report),
        Err(PipelineError::Exit(code)) => std::process::exit(code),
        Err(PipelineError::Usage(usage)) => {
            eprintln!("{}", usage);
            std::process::exit(2);
        }
        Err(e) => exit_with_error(&e.render(debug)),
    }
}
