use crate::arguments::{Arguments, CallArgs};
use crate::context::DataStore;
use crate::error::ProcessError;
use crate::node::{RootNode, SourceNode, TagNode};
use crate::step::Step;
use crate::tree::Tree;
use crate::value::Value;
use std::fmt;

/// A tree-scoped hook that observes or injects values.
pub trait Global: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the value to inject. Ignored in observer mode.
    fn process<'a>(&'a self, scope: &'a Scope<'a>) -> Step<'a, Result<Option<Value>, ProcessError>>;
}

/// Everything a global can see while it runs.
pub struct Scope<'a> {
    tree: &'a Tree,
    call: Option<&'a CallArgs>,
    arguments: Option<&'a Arguments>,
}

impl<'a> Scope<'a> {
    pub(crate) fn early(tree: &'a Tree) -> Self {
        Self {
            tree,
            call: None,
            arguments: None,
        }
    }

    pub(crate) fn delayed(tree: &'a Tree, call: &'a CallArgs, arguments: &'a Arguments) -> Self {
        Self {
            tree,
            call: Some(call),
            arguments: Some(arguments),
        }
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    pub fn root(&self) -> &'a RootNode {
        self.tree.root()
    }

    pub fn sources(&self) -> &'a [SourceNode] {
        self.tree.root().sources()
    }

    pub fn tags(&self) -> &'a [TagNode] {
        self.tree.tags()
    }

    pub fn globals(&self) -> &'a [GlobalNode] {
        self.tree.globals()
    }

    /// The raw call arguments. Only visible to delayed globals.
    pub fn call_args(&self) -> Option<&'a CallArgs> {
        self.call
    }

    /// The resolved arguments so far. Only visible to delayed globals.
    pub fn arguments(&self) -> Option<&'a Arguments> {
        self.arguments
    }

    pub fn data(&self) -> &'a DataStore {
        self.tree.data()
    }

    pub fn is_debug(&self) -> bool {
        self.tree.data().is_debug()
    }
}

/// A global attached to a tree.
///
/// With an injection name its result is passed to the target under that
/// name; without one it only observes. Delayed globals run right before the
/// target, the others before any source resolves.
pub struct GlobalNode {
    inject: Option<String>,
    delayed: bool,
    global: Box<dyn Global>,
}

impl GlobalNode {
    pub fn observer(global: impl Global + 'static) -> Self {
        Self {
            inject: None,
            delayed: false,
            global: Box::new(global),
        }
    }

    pub fn injecting(name: impl Into<String>, global: impl Global + 'static) -> Self {
        Self {
            inject: Some(name.into()),
            ..Self::observer(global)
        }
    }

    pub fn delayed(mut self) -> Self {
        self.delayed = true;
        self
    }

    /// The injection name, or the global's own name in observer mode.
    pub fn name(&self) -> &str {
        self.inject.as_deref().unwrap_or_else(|| self.global.name())
    }

    pub fn inject_name(&self) -> Option<&str> {
        self.inject.as_deref()
    }

    pub fn is_delayed(&self) -> bool {
        self.delayed
    }

    pub fn global(&self) -> &dyn Global {
        self.global.as_ref()
    }
}

impl fmt::Debug for GlobalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalNode")
            .field("global", &self.global.name())
            .field("inject", &self.inject)
            .field("delayed", &self.delayed)
            .finish()
    }
}
