//! Built-in globals and closure adapters.

use crate::context::DEBUG_KEY;
use crate::error::ProcessError;
use crate::node::{Global, Scope};
use crate::step::Step;
use crate::value::Value;

mod func;

pub use func::{AsyncFnGlobal, FnGlobal};

/// Turns on debug formatting for the rest of the invocation.
///
/// Place it first so every later node sees the flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugMode;

impl Global for DebugMode {
    fn name(&self) -> &str {
        "debug"
    }

    fn process<'a>(&'a self, scope: &'a Scope<'a>) -> Step<'a, Result<Option<Value>, ProcessError>> {
        scope.data().set(DEBUG_KEY, true);
        log::debug!("Debug mode enabled for '{}'", scope.tree().name());
        Step::ready(Ok(None))
    }
}

/// Logs the tree hierarchy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Visualize;

impl Global for Visualize {
    fn name(&self) -> &str {
        "visualize"
    }

    fn process<'a>(&'a self, scope: &'a Scope<'a>) -> Step<'a, Result<Option<Value>, ProcessError>> {
        log::info!("Command tree:\n{}", scope.tree().visualize());
        Step::ready(Ok(None))
    }
}
