use super::ProcessorNode;
use crate::arguments::ValueMap;
use crate::error::PipelineError;
use crate::tree::Tree;

/// A named grouping of sources for cross-parameter checks.
///
/// Sources name their tags; the tag only keeps back-references, filled in
/// when the tree is built.
#[derive(Debug)]
pub struct TagNode {
    name: String,
    sources: Vec<String>,
    processors: Vec<ProcessorNode>,
    declared: bool,
}

impl TagNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sources: Vec::new(),
            processors: Vec::new(),
            declared: true,
        }
    }

    /// A tag created because a source referenced it without a declaration.
    pub(crate) fn implicit(name: impl Into<String>) -> Self {
        Self {
            declared: false,
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_names(&self) -> &[String] {
        &self.sources
    }

    pub fn processors(&self) -> &[ProcessorNode] {
        &self.processors
    }

    pub fn is_declared(&self) -> bool {
        self.declared
    }

    pub(crate) fn link_source(&mut self, source: &str) {
        if !self.sources.iter().any(|s| s == source) {
            self.sources.push(source.to_string());
        }
    }

    pub(crate) fn push_processor(&mut self, mut processor: ProcessorNode) {
        processor.set_position(self.processors.len());
        self.processors.push(processor);
    }

    /// Resolves every tagged source and returns their values by name.
    pub async fn get_value(&self, tree: &Tree) -> Result<ValueMap, PipelineError> {
        self.collect(tree, false).await
    }

    /// Like `get_value`, limited to sources whose value was provided.
    pub async fn get_provided_values(&self, tree: &Tree) -> Result<ValueMap, PipelineError> {
        self.collect(tree, true).await
    }

    async fn collect(&self, tree: &Tree, provided_only: bool) -> Result<ValueMap, PipelineError> {
        let mut values = ValueMap::new();
        for name in &self.sources {
            let Some(source) = tree.source(name) else {
                continue;
            };
            let value = source.get_value(tree).await?;
            if !provided_only || source.was_provided() {
                values.insert(name.clone(), value);
            }
        }
        Ok(values)
    }

    /// The already resolved values of the tagged sources. Unresolved sources
    /// are skipped.
    pub fn resolved_values(&self, tree: &Tree) -> ValueMap {
        self.peek(tree, false)
    }

    pub fn resolved_provided_values(&self, tree: &Tree) -> ValueMap {
        self.peek(tree, true)
    }

    fn peek(&self, tree: &Tree, provided_only: bool) -> ValueMap {
        self.sources
            .iter()
            .filter_map(|name| tree.source(name))
            .filter(|source| !provided_only || source.was_provided())
            .filter_map(|source| Some((source.name().to_string(), source.resolved()?)))
            .collect()
    }
}
