//! The per-execution view a processor gets of the tree.

use crate::arguments::ValueMap;
use crate::error::PipelineError;
use crate::node::{ProcessorNode, SourceNode, TagNode};
use crate::tree::Tree;
use crate::value::{IndexPath, Value};
use ahash::AHashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Data store key read by `is_debug`.
pub const DEBUG_KEY: &str = "debug";

/// Key-value store shared by every node of a tree for one invocation.
///
/// Cloning yields a handle to the same store.
#[derive(Debug, Clone, Default)]
pub struct DataStore(Arc<Mutex<AHashMap<String, Value>>>);

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AHashMap<String, Value>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.lock().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.lock().remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn is_debug(&self) -> bool {
        self.get(DEBUG_KEY).and_then(|v| v.as_bool()).unwrap_or(false)
    }
}

/// The node a processor is attached to.
#[derive(Debug, Clone, Copy)]
pub enum Owner<'a> {
    Source(&'a SourceNode),
    Tag(&'a TagNode),
}

impl<'a> Owner<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Owner::Source(source) => source.name(),
            Owner::Tag(tag) => tag.name(),
        }
    }

    pub fn processors(&self) -> &'a [ProcessorNode] {
        match self {
            Owner::Source(source) => source.processors(),
            Owner::Tag(tag) => tag.processors(),
        }
    }
}

/// Read-only view of the tree for the processor currently running, plus the
/// shared data store.
pub struct Context<'a> {
    tree: &'a Tree,
    owner: Owner<'a>,
    processor: &'a ProcessorNode,
    path: IndexPath,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        tree: &'a Tree,
        owner: Owner<'a>,
        processor: &'a ProcessorNode,
        path: IndexPath,
    ) -> Self {
        Self {
            tree,
            owner,
            processor,
            path,
        }
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    pub fn owner(&self) -> Owner<'a> {
        self.owner
    }

    pub fn owner_name(&self) -> &'a str {
        self.owner.name()
    }

    pub fn source(&self) -> Option<&'a SourceNode> {
        match self.owner {
            Owner::Source(source) => Some(source),
            Owner::Tag(_) => None,
        }
    }

    pub fn tag(&self) -> Option<&'a TagNode> {
        match self.owner {
            Owner::Tag(tag) => Some(tag),
            Owner::Source(_) => None,
        }
    }

    pub fn is_tag(&self) -> bool {
        self.tag().is_some()
    }

    pub fn processor(&self) -> &'a ProcessorNode {
        self.processor
    }

    /// Where in the running value the current element sits. Root for whole values.
    pub fn path(&self) -> &IndexPath {
        &self.path
    }

    pub fn args(&self) -> &'a [Value] {
        self.processor.args()
    }

    pub fn kwarg(&self, key: &str) -> Option<&'a Value> {
        self.processor.kwarg(key)
    }

    /// The other processors in the same chain, in order.
    pub fn siblings(&self) -> Vec<&'a ProcessorNode> {
        let position = self.processor.position();
        self.owner
            .processors()
            .iter()
            .filter(|p| p.position() != position)
            .collect()
    }

    pub fn source_named(&self, name: &str) -> Option<&'a SourceNode> {
        self.tree.source(name)
    }

    pub fn tag_named(&self, name: &str) -> Option<&'a TagNode> {
        self.tree.tag(name)
    }

    /// Peeks at another source's cached value without resolving it.
    pub fn resolved(&self, name: &str) -> Option<Value> {
        self.tree.source(name).and_then(SourceNode::resolved)
    }

    /// Resolves another source, running its chain if needed.
    pub async fn value_of(&self, name: &str) -> Result<Option<Value>, PipelineError> {
        match self.tree.source(name) {
            Some(source) => source.get_value(self.tree).await.map(Some),
            None => Ok(None),
        }
    }

    /// Whether the owning source's value was provided. Always false on tags.
    pub fn was_provided(&self) -> bool {
        self.source().is_some_and(SourceNode::was_provided)
    }

    /// The tags of the owning source.
    pub fn current_tags(&self) -> Vec<&'a str> {
        self.source()
            .map(|source| source.tag_names().collect())
            .unwrap_or_default()
    }

    /// Resolved values of the owning tag's sources. Empty on sources.
    pub fn tag_values(&self) -> ValueMap {
        self.tag()
            .map(|tag| tag.resolved_values(self.tree))
            .unwrap_or_default()
    }

    /// Like `tag_values`, limited to provided sources.
    pub fn provided_values(&self) -> ValueMap {
        self.tag()
            .map(|tag| tag.resolved_provided_values(self.tree))
            .unwrap_or_default()
    }

    /// Names of the sources in the tree whose values were not provided.
    pub fn missing_sources(&self) -> Vec<&'a str> {
        self.tree
            .root()
            .sources()
            .iter()
            .filter(|source| !source.was_provided())
            .map(SourceNode::name)
            .collect()
    }

    pub fn data(&self) -> &'a DataStore {
        self.tree.data()
    }

    pub fn is_debug(&self) -> bool {
        self.tree.data().is_debug()
    }
}
