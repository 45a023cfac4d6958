use crate::capability::{Capabilities, ProcessorKind};
use crate::context::Context;
use crate::error::ProcessError;
use crate::step::Step;
use crate::value::Value;
use std::fmt;

/// What a processing hook hands back: `Some` replaces the running value,
/// `None` keeps it.
pub type ProcessResult = Result<Option<Value>, ProcessError>;

/// Defines the contract for a validation or transformation step.
///
/// Implementations are stateless per invocation. The descriptor returned by
/// `capabilities` is checked against the owning source when the tree is built.
pub trait Processor: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &Capabilities;

    /// Processes the running value, or one element of it when the handling
    /// for the value's shape is `Each`.
    fn process<'a>(&'a self, value: &'a Value, ctx: &'a Context<'a>) -> Step<'a, ProcessResult>;

    /// Validates a tag's aggregate view, available through `ctx.tag_values()`.
    ///
    /// Only called when the descriptor declares tag support.
    fn process_tag<'a>(&'a self, ctx: &'a Context<'a>) -> Step<'a, Result<(), ProcessError>> {
        let _ = ctx;
        Step::ready(Err(ProcessError::new(format!(
            "'{}' does not validate tags",
            self.name()
        ))))
    }
}

/// A processor attached to a source or tag, with the extra arguments captured
/// at attachment time.
pub struct ProcessorNode {
    name: String,
    position: usize,
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
    processor: Box<dyn Processor>,
}

impl ProcessorNode {
    pub fn new(processor: impl Processor + 'static) -> Self {
        Self::from_boxed(Box::new(processor))
    }

    pub fn from_boxed(processor: Box<dyn Processor>) -> Self {
        Self {
            name: processor.name().to_string(),
            position: 0,
            args: Vec::new(),
            kwargs: Vec::new(),
            processor,
        }
    }

    /// Overrides the display name used in errors and visualization.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.push((key.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position within the owner's chain, starting at zero.
    pub fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn kwarg(&self, key: &str) -> Option<&Value> {
        self.kwargs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn kwargs(&self) -> &[(String, Value)] {
        &self.kwargs
    }

    pub fn capabilities(&self) -> &Capabilities {
        self.processor.capabilities()
    }

    pub fn kind(&self) -> ProcessorKind {
        self.capabilities().kind
    }

    pub fn processor(&self) -> &dyn Processor {
        self.processor.as_ref()
    }
}

impl fmt::Debug for ProcessorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorNode")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("kind", &self.kind())
            .field("args", &self.args)
            .field("kwargs", &self.kwargs)
            .finish()
    }
}
