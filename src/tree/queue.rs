use super::Tree;
use super::builder::TreeBuilder;
use crate::error::BuildError;
use crate::node::{GlobalNode, NodeKind, ProcessorNode, SourceNode, TagNode};

/// A node waiting for the root to be finalized.
#[derive(Debug)]
pub enum Pending {
    Source(SourceNode),
    Processor(ProcessorNode),
    Tag(TagNode),
    Global(GlobalNode),
}

impl Pending {
    pub fn kind(&self) -> NodeKind {
        match self {
            Pending::Source(_) => NodeKind::Source,
            Pending::Processor(_) => NodeKind::Processor,
            Pending::Tag(_) => NodeKind::Tag,
            Pending::Global(_) => NodeKind::Global,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Pending::Source(node) => node.name(),
            Pending::Processor(node) => node.name(),
            Pending::Tag(node) => node.name(),
            Pending::Global(node) => node.name(),
        }
    }
}

/// Buffers nodes in attachment order.
///
/// Attachments arrive innermost first (the last declared processor is
/// attached before the first), so the queue is reversed exactly once when
/// the root is finalized.
#[derive(Debug, Default)]
pub struct RegistrationQueue {
    pending: Vec<Pending>,
    finalized: bool,
}

impl RegistrationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, node: Pending) {
        log::trace!("Queued {} '{}'", node.kind(), node.name());
        self.pending.push(node);
    }

    pub fn attach_source(&mut self, source: SourceNode) {
        self.attach(Pending::Source(source));
    }

    pub fn attach_processor(&mut self, processor: ProcessorNode) {
        self.attach(Pending::Processor(processor));
    }

    pub fn attach_tag(&mut self, tag: TagNode) {
        self.attach(Pending::Tag(tag));
    }

    pub fn attach_global(&mut self, global: GlobalNode) {
        self.attach(Pending::Global(global));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queued node names in attachment order.
    pub fn names(&self) -> Vec<&str> {
        self.pending.iter().map(Pending::name).collect()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Reverses the queue into declaration order and builds the tree.
    ///
    /// A queue can be finalized once; later calls fail with `RootExists`.
    pub fn finalize(&mut self, root_name: impl Into<String>) -> Result<Tree, BuildError> {
        let root_name = root_name.into();
        if self.finalized {
            return Err(BuildError::RootExists(root_name));
        }
        self.finalized = true;

        let mut pending = std::mem::take(&mut self.pending);
        pending.reverse();
        log::debug!(
            "Finalizing root '{}' with {} queued nodes",
            root_name,
            pending.len()
        );
        TreeBuilder::new(root_name)?.build(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::IsPositive;

    #[test]
    fn finalize_restores_declaration_order() {
        let mut queue = RegistrationQueue::new();
        // Bottom-up, the way decorators apply.
        queue.attach_processor(ProcessorNode::new(IsPositive));
        queue.attach_source(SourceNode::option("second").default(1));
        queue.attach_source(SourceNode::option("first"));

        let tree = queue.finalize("cmd").unwrap();
        let names: Vec<_> = tree.sources().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(tree.source("second").unwrap().processors().len(), 1);
    }

    #[test]
    fn second_finalize_is_rejected() {
        let mut queue = RegistrationQueue::new();
        queue.attach_source(SourceNode::option("a"));
        assert!(queue.finalize("cmd").is_ok());
        assert_eq!(
            queue.finalize("cmd").unwrap_err(),
            BuildError::RootExists("cmd".to_string())
        );
    }
}
