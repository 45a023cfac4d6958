use crate::arguments::ValueProvider;
use crate::context::DataStore;
use crate::node::{GlobalNode, NodeKind, RootNode, SourceNode, TagNode};
use ahash::AHashMap;

mod builder;
pub mod queue;
pub mod visualize;

pub use queue::{Pending, RegistrationQueue};
pub use visualize::VisualNode;

/// A built, validated tree: the root with its sources, the tag registry, the
/// globals in registration order and the shared data store.
#[derive(Debug)]
pub struct Tree {
    root: RootNode,
    index: AHashMap<String, NodeKind>,
    tags: Vec<TagNode>,
    globals: Vec<GlobalNode>,
    data: DataStore,
}

impl Tree {
    pub fn root(&self) -> &RootNode {
        &self.root
    }

    pub fn name(&self) -> &str {
        self.root.name()
    }

    pub fn sources(&self) -> &[SourceNode] {
        self.root.sources()
    }

    pub fn source(&self, name: &str) -> Option<&SourceNode> {
        self.root.source(name)
    }

    pub fn tags(&self) -> &[TagNode] {
        &self.tags
    }

    pub fn tag(&self, name: &str) -> Option<&TagNode> {
        self.tags.iter().find(|t| t.name() == name)
    }

    pub fn globals(&self) -> &[GlobalNode] {
        &self.globals
    }

    pub fn data(&self) -> &DataStore {
        &self.data
    }

    /// What kind of node is registered under `name`.
    pub fn kind_of(&self, name: &str) -> Option<NodeKind> {
        if name == self.root.name() {
            return Some(NodeKind::Root);
        }
        self.index.get(name).copied()
    }

    /// Starts a fresh invocation: clears the data store, forgets every cached
    /// value and hands each source the raw value `provider` has for it.
    pub fn reset(&self, provider: &dyn ValueProvider) {
        self.data.clear();
        for source in self.root.sources() {
            source.reset();
            if let Some((value, provided)) = provider.raw_value(source) {
                source.set_raw_value(value, provided);
            }
        }
    }
}
