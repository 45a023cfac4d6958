//! Tests for lifecycle hooks: boot, init, error and exit.
mod common;
use common::*;
use kumitate::prelude::*;

fn marker_hook(marker: &'static str) -> impl Hook {
    FnHook::new(marker, move |event: &HookEvent<'_>| {
        push_marker(event.data(), marker);
        Ok(())
    })
}

/// Records the kind of the error it sees, or `none`.
fn error_recorder(marker: &'static str) -> impl Hook {
    FnHook::new(marker, move |event: &HookEvent<'_>| {
        let kind = event
            .error()
            .map_or("none".to_string(), |err| format!("{:?}", err.kind()));
        push_marker(event.data(), &format!("{}:{}", marker, kind));
        Ok(())
    })
}

#[test]
fn test_hooks_run_around_globals_and_chains() {
    let early = FnGlobal::new("early", |scope: &Scope<'_>| {
        push_marker(scope.data(), "early");
        Ok(None)
    });
    let mut command = Command::builder("phased")
        .hook(HookNode::on_exit(marker_hook("exit")))
        .hook(HookNode::on_init(marker_hook("init")))
        .hook(HookNode::on_boot(marker_hook("boot")))
        .hook(HookNode::on_boot(marker_hook("boot_again")))
        .global(GlobalNode::observer(early))
        .source(SourceNode::option("name").default("x"))
        .process(recorder("chain"))
        .build(|_args: Arguments| Ok(()))
        .unwrap();

    command.invoke_blocking(CallArgs::new()).unwrap();
    assert_eq!(
        markers(command.tree().data()),
        vec!["boot", "boot_again", "early", "init", "chain", "exit"]
    );
    assert_eq!(command.hooks().len(), 4);
}

#[test]
fn test_error_hooks_see_the_failure() {
    let mut command = Command::builder("counter")
        .hook(HookNode::on_error(error_recorder("any")))
        .hook(HookNode::on_error(error_recorder("resolve_only")).include(ErrorKind::Resolve))
        .hook(HookNode::on_error(error_recorder("not_processing")).exclude(ErrorKind::Processing))
        .hook(HookNode::on_exit(error_recorder("exit")))
        .source(SourceNode::option("count").value_type(ValueType::Int).default(1))
        .process(IsPositive)
        .build(|args: Arguments| Ok(args.get_int("count")))
        .unwrap();

    command
        .invoke_blocking(CallArgs::new().with("count", -2))
        .unwrap_err();
    assert_eq!(
        markers(command.tree().data()),
        vec!["any:Processing", "exit:Processing"]
    );

    command.invoke_blocking(CallArgs::new()).unwrap();
    assert_eq!(markers(command.tree().data()), vec!["exit:none"]);
}

#[test]
fn test_missing_value_reaches_resolve_filtered_hooks() {
    let mut command = Command::builder("strict")
        .hook(HookNode::on_init(marker_hook("init")))
        .hook(HookNode::on_error(error_recorder("resolve_only")).include(ErrorKind::Resolve))
        .source(SourceNode::argument("file"))
        .build(|_args: Arguments| Ok(()))
        .unwrap();

    let err = command.invoke_blocking(CallArgs::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resolve);
    // Init hooks never ran: validation failed first.
    assert_eq!(markers(command.tree().data()), vec!["resolve_only:Resolve"]);
}

#[test]
fn test_boot_failure_aborts_the_invocation() {
    let refuse = FnHook::new("refuse", |_event: &HookEvent<'_>| {
        Err(ProcessError::new("not today"))
    });
    let mut command = Command::builder("guarded")
        .hook(HookNode::on_boot(refuse))
        .hook(HookNode::on_error(error_recorder("error")))
        .source(SourceNode::option("value").default("v"))
        .process(recorder("chain"))
        .build(|_args: Arguments| Ok(()))
        .unwrap();

    let err = command.invoke_blocking(CallArgs::new()).unwrap_err();
    assert_eq!(
        err,
        PipelineError::Hook {
            hook: "refuse".to_string(),
            phase: HookPhase::Boot,
            message: "not today".to_string()
        }
    );
    assert_eq!(err.to_string(), "Hook 'refuse' failed during the boot phase: not today");
    assert_eq!(err.origin(), Some("refuse"));
    assert_eq!(markers(command.tree().data()), vec!["error:Hook"]);
    assert_eq!(command.phase(), Phase::Failed);
}

#[test]
fn test_init_hook_can_request_exit() {
    let stop = FnHook::new("stop", |_event: &HookEvent<'_>| Err(ProcessError::Exit(0)));
    let mut command = Command::builder("stopping")
        .hook(HookNode::on_init(stop))
        .source(SourceNode::option("value").default("v"))
        .process(recorder("chain"))
        .build(|_args: Arguments| Ok(()))
        .unwrap();

    assert_eq!(command.invoke_blocking(CallArgs::new()).unwrap_err(), PipelineError::Exit(0));
    assert!(markers(command.tree().data()).is_empty());
}

#[test]
fn test_teardown_failures_keep_the_original_result() {
    let broken = || {
        FnHook::new("broken", |_event: &HookEvent<'_>| {
            Err(ProcessError::new("cleanup failed"))
        })
    };
    let mut command = Command::builder("failing")
        .hook(HookNode::on_error(broken()))
        .hook(HookNode::on_error(error_recorder("after")))
        .hook(HookNode::on_exit(broken()))
        .build(|_args: Arguments| -> Result<(), ProcessError> { Err(ProcessError::new("boom")) })
        .unwrap();

    let err = command.invoke_blocking(CallArgs::new()).unwrap_err();
    assert_eq!(
        err,
        PipelineError::Target {
            command: "failing".to_string(),
            message: "boom".to_string()
        }
    );
    // Later error hooks still run.
    assert_eq!(markers(command.tree().data()), vec!["after:Target"]);

    let mut command = Command::builder("fine")
        .hook(HookNode::on_exit(broken()))
        .build(|_args: Arguments| Ok(7))
        .unwrap();
    assert_eq!(command.invoke_blocking(CallArgs::new()).unwrap(), 7);
    assert_eq!(command.phase(), Phase::Finished);
}

#[tokio::test]
async fn test_async_hooks_are_awaited_in_place() {
    let warm = AsyncFnHook::new("warm", |phase: HookPhase, store: DataStore| async move {
        tokio::task::yield_now().await;
        push_marker(&store, &phase.to_string());
        Ok::<(), ProcessError>(())
    });
    let mut command = Command::builder("async_hooks")
        .hook(HookNode::on_boot(warm))
        .hook(HookNode::on_exit(marker_hook("exit")))
        .source(SourceNode::option("name").default("x"))
        .process(slow_recorder("chain", 5))
        .build(|_args: Arguments| Ok(()))
        .unwrap();

    command.invoke(CallArgs::new()).await.unwrap();
    assert_eq!(markers(command.tree().data()), vec!["boot", "chain", "exit"]);
}
