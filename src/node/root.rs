use super::SourceNode;

/// The single root of a tree. Owns the sources in declaration order.
#[derive(Debug)]
pub struct RootNode {
    name: String,
    sources: Vec<SourceNode>,
}

impl RootNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sources: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sources(&self) -> &[SourceNode] {
        &self.sources
    }

    pub fn source(&self, name: &str) -> Option<&SourceNode> {
        self.sources.iter().find(|s| s.name() == name)
    }

    pub(crate) fn push_source(&mut self, source: SourceNode) -> usize {
        self.sources.push(source);
        self.sources.len() - 1
    }

    pub(crate) fn source_at_mut(&mut self, index: usize) -> &mut SourceNode {
        &mut self.sources[index]
    }
}
