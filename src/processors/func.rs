//! Closure adapters, so a hook does not need its own type.

use crate::arguments::ValueMap;
use crate::capability::Capabilities;
use crate::context::{Context, DataStore};
use crate::error::ProcessError;
use crate::node::{ProcessResult, Processor};
use crate::step::Step;
use crate::value::{TypeSet, Value};
use std::future::Future;

/// A synchronous processor backed by a closure.
pub struct FnProcessor<F> {
    name: String,
    caps: Capabilities,
    f: F,
}

impl<F> FnProcessor<F>
where
    F: Fn(&Value, &Context<'_>) -> ProcessResult + Send + Sync,
{
    pub fn new(name: impl Into<String>, caps: Capabilities, f: F) -> Self {
        Self {
            name: name.into(),
            caps,
            f,
        }
    }
}

type BoxedHook = Box<dyn Fn(&Value, &Context<'_>) -> ProcessResult + Send + Sync>;

impl FnProcessor<BoxedHook> {
    /// An element-wise validator over any type. The closure returns the
    /// failure message.
    pub fn check<C>(name: impl Into<String>, check: C) -> Self
    where
        C: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        Self::new(
            name,
            Capabilities::validator().each(TypeSet::ANY),
            Box::new(move |value: &Value, _ctx: &Context<'_>| {
                check(value).map(|_| None).map_err(ProcessError::Failed)
            }),
        )
    }

    /// An element-wise transformer over any type.
    pub fn map<M>(name: impl Into<String>, map: M) -> Self
    where
        M: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::new(
            name,
            Capabilities::transformer().each(TypeSet::ANY),
            Box::new(move |value: &Value, _ctx: &Context<'_>| {
                map(value).map(Some).map_err(ProcessError::Failed)
            }),
        )
    }
}

impl<F> Processor for FnProcessor<F>
where
    F: Fn(&Value, &Context<'_>) -> ProcessResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    fn process<'a>(&'a self, value: &'a Value, ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
        Step::ready((self.f)(value, ctx))
    }
}

/// An asynchronous processor backed by a closure.
///
/// The closure receives its own copy of the value and a handle to the data
/// store, and its future is awaited at the processor's chain position.
pub struct AsyncFnProcessor<F> {
    name: String,
    caps: Capabilities,
    f: F,
}

impl<F, Fut> AsyncFnProcessor<F>
where
    F: Fn(Value, DataStore) -> Fut + Send + Sync,
    Fut: Future<Output = ProcessResult> + Send + 'static,
{
    pub fn new(name: impl Into<String>, caps: Capabilities, f: F) -> Self {
        Self {
            name: name.into(),
            caps,
            f,
        }
    }
}

impl<F, Fut> Processor for AsyncFnProcessor<F>
where
    F: Fn(Value, DataStore) -> Fut + Send + Sync,
    Fut: Future<Output = ProcessResult> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    fn process<'a>(&'a self, value: &'a Value, ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
        Step::suspend((self.f)(value.clone(), ctx.data().clone()))
    }
}

/// A tag validator backed by a closure over the provided values of the tag.
pub struct FnTagCheck<F> {
    name: String,
    f: F,
}

impl<F> FnTagCheck<F>
where
    F: Fn(&ValueMap) -> Result<(), ProcessError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Processor for FnTagCheck<F>
where
    F: Fn(&ValueMap) -> Result<(), ProcessError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &Capabilities {
        static CAPS: Capabilities = Capabilities::validator().with_tags();
        &CAPS
    }

    fn process<'a>(&'a self, _value: &'a Value, _ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
        Step::ready(Err(ProcessError::new(format!(
            "'{}' only validates tags",
            self.name
        ))))
    }

    fn process_tag<'a>(&'a self, ctx: &'a Context<'a>) -> Step<'a, Result<(), ProcessError>> {
        Step::ready((self.f)(&ctx.provided_values()))
    }
}
