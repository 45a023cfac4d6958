//! Lifecycle hooks: code that runs at fixed points of every invocation,
//! outside any source's chain.
//!
//! `Boot` hooks run once the tree has been reset, before any global or
//! source. `Init` hooks run after validation, right before values resolve.
//! `Error` hooks run when the invocation fails and can be filtered by
//! `ErrorKind`. `Exit` hooks always run last.

use crate::arguments::CallArgs;
use crate::context::DataStore;
use crate::error::{ErrorKind, PipelineError, ProcessError};
use crate::step::Step;
use crate::tree::Tree;
use std::fmt;
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    Boot,
    Init,
    Error,
    Exit,
}

impl HookPhase {
    /// Failures of teardown hooks are logged instead of aborting.
    pub fn is_teardown(self) -> bool {
        matches!(self, HookPhase::Error | HookPhase::Exit)
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookPhase::Boot => "boot",
            HookPhase::Init => "init",
            HookPhase::Error => "error",
            HookPhase::Exit => "exit",
        };
        f.write_str(name)
    }
}

/// What a hook sees.
#[derive(Debug, Clone, Copy)]
pub struct HookEvent<'a> {
    phase: HookPhase,
    tree: &'a Tree,
    call: &'a CallArgs,
    error: Option<&'a PipelineError>,
}

impl<'a> HookEvent<'a> {
    pub(crate) fn new(
        phase: HookPhase,
        tree: &'a Tree,
        call: &'a CallArgs,
        error: Option<&'a PipelineError>,
    ) -> Self {
        Self {
            phase,
            tree,
            call,
            error,
        }
    }

    pub fn phase(&self) -> HookPhase {
        self.phase
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    pub fn call_args(&self) -> &'a CallArgs {
        self.call
    }

    /// The error that failed the invocation. Set for `Error` hooks, and for
    /// `Exit` hooks after a failure.
    pub fn error(&self) -> Option<&'a PipelineError> {
        self.error
    }

    pub fn data(&self) -> &'a DataStore {
        self.tree.data()
    }
}

pub trait Hook: Send + Sync {
    fn name(&self) -> &str;

    fn run<'a>(&'a self, event: &'a HookEvent<'a>) -> Step<'a, Result<(), ProcessError>>;
}

/// A hook registered for one phase, with optional error filters.
pub struct HookNode {
    phase: HookPhase,
    include: Option<Vec<ErrorKind>>,
    exclude: Vec<ErrorKind>,
    hook: Box<dyn Hook>,
}

impl HookNode {
    fn new(phase: HookPhase, hook: impl Hook + 'static) -> Self {
        Self {
            phase,
            include: None,
            exclude: Vec::new(),
            hook: Box::new(hook),
        }
    }

    pub fn on_boot(hook: impl Hook + 'static) -> Self {
        Self::new(HookPhase::Boot, hook)
    }

    pub fn on_init(hook: impl Hook + 'static) -> Self {
        Self::new(HookPhase::Init, hook)
    }

    pub fn on_error(hook: impl Hook + 'static) -> Self {
        Self::new(HookPhase::Error, hook)
    }

    pub fn on_exit(hook: impl Hook + 'static) -> Self {
        Self::new(HookPhase::Exit, hook)
    }

    /// Limits an error hook to the given kinds. Repeat to allow several.
    pub fn include(mut self, kind: ErrorKind) -> Self {
        self.include.get_or_insert_with(Vec::new).push(kind);
        self
    }

    /// Skips an error hook for the given kind.
    pub fn exclude(mut self, kind: ErrorKind) -> Self {
        self.exclude.push(kind);
        self
    }

    pub fn phase(&self) -> HookPhase {
        self.phase
    }

    pub fn name(&self) -> &str {
        self.hook.name()
    }

    pub fn hook(&self) -> &dyn Hook {
        self.hook.as_ref()
    }

    /// Whether an error hook applies to `error`.
    pub fn matches(&self, error: &PipelineError) -> bool {
        let kind = error.kind();
        if let Some(include) = &self.include {
            if !include.contains(&kind) {
                return false;
            }
        }
        !self.exclude.contains(&kind)
    }
}

impl fmt::Debug for HookNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookNode")
            .field("phase", &self.phase)
            .field("name", &self.name())
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .finish()
    }
}

/// Runs every hook registered for the event's phase, in registration order.
///
/// A failing `Boot` or `Init` hook aborts the invocation. Teardown hooks
/// are all attempted; their failures are only logged.
pub(crate) async fn run_phase(
    hooks: &[HookNode],
    event: &HookEvent<'_>,
) -> Result<(), PipelineError> {
    for node in hooks.iter().filter(|h| h.phase == event.phase) {
        if event.phase == HookPhase::Error && !event.error.is_some_and(|e| node.matches(e)) {
            continue;
        }
        log::trace!("Running {} hook '{}'", event.phase, node.name());
        match node.hook.run(event).complete().await {
            Ok(()) => {}
            Err(err) if event.phase.is_teardown() => {
                log::error!(
                    "Hook '{}' failed during the {} phase: {}",
                    node.name(),
                    event.phase,
                    err
                );
            }
            Err(ProcessError::Exit(code)) => return Err(PipelineError::Exit(code)),
            Err(ProcessError::Failed(message)) => {
                return Err(PipelineError::Hook {
                    hook: node.name().to_string(),
                    phase: event.phase,
                    message,
                });
            }
        }
    }
    Ok(())
}

/// A synchronous hook backed by a closure.
pub struct FnHook<F> {
    name: String,
    f: F,
}

impl<F> FnHook<F>
where
    F: Fn(&HookEvent<'_>) -> Result<(), ProcessError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Hook for FnHook<F>
where
    F: Fn(&HookEvent<'_>) -> Result<(), ProcessError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run<'a>(&'a self, event: &'a HookEvent<'a>) -> Step<'a, Result<(), ProcessError>> {
        Step::ready((self.f)(event))
    }
}

/// An asynchronous hook. The closure gets the phase and a handle to the
/// data store.
pub struct AsyncFnHook<F> {
    name: String,
    f: F,
}

impl<F, Fut> AsyncFnHook<F>
where
    F: Fn(HookPhase, DataStore) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ProcessError>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F, Fut> Hook for AsyncFnHook<F>
where
    F: Fn(HookPhase, DataStore) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ProcessError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run<'a>(&'a self, event: &'a HookEvent<'a>) -> Step<'a, Result<(), ProcessError>> {
        Step::suspend((self.f)(event.phase(), event.data().clone()))
    }
}
