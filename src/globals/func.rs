use crate::context::DataStore;
use crate::error::ProcessError;
use crate::node::{Global, Scope};
use crate::step::Step;
use crate::value::Value;
use std::future::Future;

/// A synchronous global backed by a closure.
pub struct FnGlobal<F> {
    name: String,
    f: F,
}

impl<F> FnGlobal<F>
where
    F: Fn(&Scope<'_>) -> Result<Option<Value>, ProcessError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Global for FnGlobal<F>
where
    F: Fn(&Scope<'_>) -> Result<Option<Value>, ProcessError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process<'a>(&'a self, scope: &'a Scope<'a>) -> Step<'a, Result<Option<Value>, ProcessError>> {
        Step::ready((self.f)(scope))
    }
}

/// An asynchronous global. The closure gets a handle to the data store.
pub struct AsyncFnGlobal<F> {
    name: String,
    f: F,
}

impl<F, Fut> AsyncFnGlobal<F>
where
    F: Fn(DataStore) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Value>, ProcessError>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F, Fut> Global for AsyncFnGlobal<F>
where
    F: Fn(DataStore) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Value>, ProcessError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process<'a>(&'a self, scope: &'a Scope<'a>) -> Step<'a, Result<Option<Value>, ProcessError>> {
        Step::suspend((self.f)(scope.data().clone()))
    }
}
