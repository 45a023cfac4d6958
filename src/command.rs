//! Declaring a command and driving it through its lifecycle.

use crate::arguments::{Arguments, CallArgs};
use crate::config::EngineConfig;
use crate::context::DEBUG_KEY;
use crate::dispatch;
use crate::error::{BuildError, PipelineError, ProcessError};
use crate::hooks::{self, HookEvent, HookNode, HookPhase};
use crate::node::{GlobalNode, Processor, ProcessorNode, Scope, SourceNode, TagNode};
use crate::step::Step;
use crate::tree::{Pending, RegistrationQueue, Tree, VisualNode};
use crate::value::Value;
use std::fmt;
use std::future::Future;

/// Where a command is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Declarations are being queued.
    Registration,
    /// The root has been finalized and the tree is built and checked.
    Initialization,
    /// Per-invocation checks: reset, boot hooks, early globals, required values.
    Validation,
    /// Sources, tags and delayed globals resolve, then the target runs.
    Runtime,
    Finished,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

type TargetFn<T> = Box<dyn Fn(Arguments) -> Step<'static, Result<T, ProcessError>> + Send + Sync>;

/// Collects declarations top to bottom, in the order a reader writes them.
pub struct CommandBuilder {
    name: String,
    declarations: Vec<Pending>,
    hooks: Vec<HookNode>,
    config: EngineConfig,
}

impl CommandBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declarations: Vec::new(),
            hooks: Vec::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn source(mut self, source: SourceNode) -> Self {
        self.declarations.push(Pending::Source(source));
        self
    }

    /// Attaches a processor to the most recently declared source or tag.
    pub fn process(self, processor: impl Processor + 'static) -> Self {
        self.process_with(ProcessorNode::new(processor))
    }

    /// Like `process`, for a node carrying extra arguments.
    pub fn process_with(mut self, processor: ProcessorNode) -> Self {
        self.declarations.push(Pending::Processor(processor));
        self
    }

    /// Declares a tag. Processors that follow attach to it.
    pub fn tag(mut self, name: impl Into<String>) -> Self {
        self.declarations.push(Pending::Tag(TagNode::new(name)));
        self
    }

    pub fn global(mut self, global: GlobalNode) -> Self {
        self.declarations.push(Pending::Global(global));
        self
    }

    /// Registers a lifecycle hook. Hooks of one phase run in the order they
    /// are declared.
    pub fn hook(mut self, hook: HookNode) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the command around a synchronous target.
    pub fn build<T, F>(self, target: F) -> Result<Command<T>, BuildError>
    where
        T: Send + 'static,
        F: Fn(Arguments) -> Result<T, ProcessError> + Send + Sync + 'static,
    {
        self.finish(Box::new(move |args| Step::ready(target(args))))
    }

    /// Builds the command around an asynchronous target.
    pub fn build_async<T, F, Fut>(self, target: F) -> Result<Command<T>, BuildError>
    where
        T: Send + 'static,
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ProcessError>> + Send + 'static,
    {
        self.finish(Box::new(move |args| Step::suspend(target(args))))
    }

    fn finish<T>(self, target: TargetFn<T>) -> Result<Command<T>, BuildError> {
        log::debug!(
            "[{}] {}: {} declarations",
            self.name,
            Phase::Registration,
            self.declarations.len()
        );

        // Attach bottom-up, the order decorators would apply in.
        let mut queue = RegistrationQueue::new();
        for declaration in self.declarations.into_iter().rev() {
            queue.attach(declaration);
        }

        log::debug!("[{}] {}", self.name, Phase::Initialization);
        let tree = queue.finalize(self.name)?;
        if self.config.log_tree {
            log::info!("Command tree:\n{}", tree.visualize());
        }

        Ok(Command {
            tree,
            hooks: self.hooks,
            config: self.config,
            target,
            phase: Phase::Initialization,
        })
    }
}

/// A built command: a validated tree plus the target its values are passed to.
pub struct Command<T> {
    tree: Tree,
    hooks: Vec<HookNode>,
    config: EngineConfig,
    target: TargetFn<T>,
    phase: Phase,
}

impl Command<()> {
    /// Starts declaring a command. `build` or `build_async` fixes the
    /// target type.
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(name)
    }
}

impl<T: Send + 'static> Command<T> {
    pub fn name(&self) -> &str {
        self.tree.name()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn hooks(&self) -> &[HookNode] {
        &self.hooks
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn visualize(&self) -> VisualNode {
        self.tree.visualize()
    }

    /// Runs one invocation: validation, then runtime, then the target.
    ///
    /// All per-invocation state is reset first, so a command can be invoked
    /// repeatedly. Error hooks run on failure and exit hooks always run; a
    /// failure in either never replaces the result.
    pub async fn invoke(&mut self, call: CallArgs) -> Result<T, PipelineError> {
        let result = self.run(&call).await;
        let error = result.as_ref().err();
        if let Some(err) = error {
            log::debug!("[{}] {}: {}", self.tree.name(), Phase::Failed, err);
            // Teardown phases log their own failures.
            let _ = self.fire(HookPhase::Error, &call, error).await;
        }
        let _ = self.fire(HookPhase::Exit, &call, error).await;

        self.phase = if result.is_ok() {
            Phase::Finished
        } else {
            Phase::Failed
        };
        result
    }

    /// Runs `invoke` to completion on an internal current-thread runtime.
    ///
    /// Must not be called from inside another tokio runtime.
    pub fn invoke_blocking(&mut self, call: CallArgs) -> Result<T, PipelineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PipelineError::Runtime(e.to_string()))?;
        runtime.block_on(self.invoke(call))
    }

    async fn fire(
        &self,
        phase: HookPhase,
        call: &CallArgs,
        error: Option<&PipelineError>,
    ) -> Result<(), PipelineError> {
        let event = HookEvent::new(phase, &self.tree, call, error);
        hooks::run_phase(&self.hooks, &event).await
    }

    async fn run(&mut self, call: &CallArgs) -> Result<T, PipelineError> {
        self.phase = Phase::Validation;
        log::debug!("[{}] {}", self.tree.name(), self.phase);

        let tree = &self.tree;
        tree.reset(call);
        if self.config.debug {
            tree.data().set(DEBUG_KEY, true);
        }
        self.fire(HookPhase::Boot, call, None).await?;

        let mut injected = Arguments::new();
        for global in tree.globals().iter().filter(|g| !g.is_delayed()) {
            let scope = Scope::early(tree);
            let produced = dispatch::run_global(global, &scope).await?;
            if let Some(name) = global.inject_name() {
                injected.insert(name, produced.unwrap_or(Value::Null));
            }
        }

        // Fail on absent required values before any chain runs.
        for source in tree.sources() {
            source.get_raw_value()?;
        }
        self.fire(HookPhase::Init, call, None).await?;

        self.phase = Phase::Runtime;
        let tree = &self.tree;
        log::debug!("[{}] {}", tree.name(), Phase::Runtime);

        let mut arguments = Arguments::new();
        for source in tree.sources() {
            let value = source.get_value(tree).await?;
            arguments.insert(source.name(), value);
        }

        for tag in tree.tags() {
            dispatch::run_tag_chain(tree, tag).await?;
        }

        for (name, value) in call.values() {
            if tree.source(name).is_none() {
                arguments.insert(name.as_str(), value.clone());
            }
        }
        arguments.extend(call.extras().clone());
        arguments.extend(injected);

        for global in tree.globals().iter().filter(|g| g.is_delayed()) {
            let produced = {
                let scope = Scope::delayed(tree, call, &arguments);
                dispatch::run_global(global, &scope).await?
            };
            if let Some(name) = global.inject_name() {
                arguments.insert(name, produced.unwrap_or(Value::Null));
            }
        }

        log::debug!(
            "[{}] Calling target with {} arguments",
            tree.name(),
            arguments.len()
        );
        (self.target)(arguments)
            .complete()
            .await
            .map_err(|err| match err {
                ProcessError::Exit(code) => PipelineError::Exit(code),
                ProcessError::Failed(message) => PipelineError::Target {
                    command: self.tree.name().to_string(),
                    message,
                },
            })
    }
}

impl<T> fmt::Debug for Command<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("tree", &self.tree)
            .field("hooks", &self.hooks)
            .field("config", &self.config)
            .field("phase", &self.phase)
            .finish()
    }
}
