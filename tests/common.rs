//! Common test utilities for building commands and recording hook order.
use kumitate::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// `count` (int, default 1) checked by `is_positive`. The target returns it.
#[allow(dead_code)]
pub fn count_command() -> Command<i64> {
    Command::builder("counter")
        .source(
            SourceNode::option("count")
                .short('c')
                .value_type(ValueType::Int)
                .default(1),
        )
        .process(IsPositive)
        .build(|args: Arguments| Ok(args.get_int("count").unwrap_or_default()))
        .unwrap()
}

/// Appends `marker` to the `order` list in the data store.
#[allow(dead_code)]
pub fn push_marker(store: &DataStore, marker: &str) {
    let mut seen = store
        .get("order")
        .and_then(|v| v.as_list().map(<[Value]>::to_vec))
        .unwrap_or_default();
    seen.push(Value::from(marker));
    store.set("order", Value::List(seen));
}

/// The markers recorded so far, in order.
#[allow(dead_code)]
pub fn markers(store: &DataStore) -> Vec<String> {
    store
        .get("order")
        .and_then(|v| {
            v.as_list()
                .map(|items| items.iter().filter_map(|i| i.as_str().map(String::from)).collect())
        })
        .unwrap_or_default()
}

/// A synchronous validator that records `marker` every time it runs.
#[allow(dead_code)]
pub fn recorder(marker: &'static str) -> impl Processor {
    FnProcessor::new(
        marker,
        Capabilities::validator().each(TypeSet::ANY),
        move |_value: &Value, ctx: &Context<'_>| {
            push_marker(ctx.data(), marker);
            Ok(None)
        },
    )
}

/// An asynchronous validator that sleeps before recording `marker`.
#[allow(dead_code)]
pub fn slow_recorder(marker: &'static str, millis: u64) -> impl Processor {
    AsyncFnProcessor::new(
        marker,
        Capabilities::validator().each(TypeSet::ANY),
        move |_value: Value, store: DataStore| async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            push_marker(&store, marker);
            Ok::<Option<Value>, ProcessError>(None)
        },
    )
}

/// A validator counting its invocations in the returned counter.
#[allow(dead_code)]
pub fn counting_validator(name: &'static str) -> (impl Processor, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let processor = FnProcessor::new(
        name,
        Capabilities::validator().each(TypeSet::ANY),
        move |_value: &Value, _ctx: &Context<'_>| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        },
    );
    (processor, calls)
}

#[allow(dead_code)]
pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Builds a tree by attaching `declarations` bottom-up, as decorators would.
#[allow(dead_code)]
pub fn tree_from(declarations: Vec<Pending>) -> Result<Tree, BuildError> {
    let mut queue = RegistrationQueue::new();
    for declaration in declarations.into_iter().rev() {
        queue.attach(declaration);
    }
    queue.finalize("test")
}

pub use kumitate::tree::Pending;
