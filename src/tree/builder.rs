use super::Tree;
use super::queue::Pending;
use crate::capability::ProcessorKind;
use crate::context::DataStore;
use crate::error::BuildError;
use crate::node::{GlobalNode, NodeKind, ProcessorNode, RootNode, SourceNode, TagNode};
use crate::value::{Value, ValueType};
use ahash::AHashMap;

/// The node subsequent processors attach to.
#[derive(Debug, Clone, Copy)]
enum Cursor {
    Empty,
    Source(usize),
    Tag(usize),
}

/// Replays a declaration-ordered queue into a validated `Tree`.
pub(super) struct TreeBuilder {
    root: RootNode,
    index: AHashMap<String, NodeKind>,
    tags: Vec<TagNode>,
    globals: Vec<GlobalNode>,
    cursor: Cursor,
}

impl TreeBuilder {
    pub(super) fn new(root_name: String) -> Result<Self, BuildError> {
        if root_name.is_empty() {
            return Err(BuildError::EmptyName("root"));
        }
        Ok(Self {
            root: RootNode::new(root_name),
            index: AHashMap::new(),
            tags: Vec::new(),
            globals: Vec::new(),
            cursor: Cursor::Empty,
        })
    }

    pub(super) fn build(mut self, pending: Vec<Pending>) -> Result<Tree, BuildError> {
        for node in pending {
            match node {
                Pending::Source(source) => self.add_source(source)?,
                Pending::Processor(processor) => self.add_processor(processor)?,
                Pending::Tag(tag) => self.add_tag(tag)?,
                Pending::Global(global) => self.add_global(global)?,
            }
        }

        self.link_tags()?;
        self.check_defaults()?;
        self.check_capabilities()?;

        log::debug!(
            "Built tree '{}': {} sources, {} tags, {} globals",
            self.root.name(),
            self.root.sources().len(),
            self.tags.len(),
            self.globals.len()
        );

        Ok(Tree {
            root: self.root,
            index: self.index,
            tags: self.tags,
            globals: self.globals,
            data: DataStore::new(),
        })
    }

    fn register(&mut self, name: &str, kind: NodeKind) -> Result<(), BuildError> {
        if let Some(existing) = self.index.get(name) {
            return Err(BuildError::NameExists {
                name: name.to_string(),
                existing: existing.label(),
                duplicate: kind.label(),
            });
        }
        self.index.insert(name.to_string(), kind);
        Ok(())
    }

    fn add_source(&mut self, source: SourceNode) -> Result<(), BuildError> {
        if source.name().is_empty() {
            return Err(BuildError::EmptyName("source"));
        }
        self.register(source.name(), NodeKind::Source)?;
        let index = self.root.push_source(source);
        self.cursor = Cursor::Source(index);
        Ok(())
    }

    fn add_tag(&mut self, tag: TagNode) -> Result<(), BuildError> {
        if tag.name().is_empty() {
            return Err(BuildError::EmptyName("tag"));
        }
        self.register(tag.name(), NodeKind::Tag)?;
        self.tags.push(tag);
        self.cursor = Cursor::Tag(self.tags.len() - 1);
        Ok(())
    }

    fn add_processor(&mut self, processor: ProcessorNode) -> Result<(), BuildError> {
        match self.cursor {
            Cursor::Empty => Err(BuildError::NoParent {
                processor: processor.name().to_string(),
            }),
            Cursor::Source(index) => {
                self.root.source_at_mut(index).push_processor(processor);
                Ok(())
            }
            Cursor::Tag(index) => {
                let tag = &mut self.tags[index];
                let caps = processor.capabilities();
                if caps.kind == ProcessorKind::Transformation {
                    return Err(BuildError::InvalidChildOnTag {
                        processor: processor.name().to_string(),
                        tag: tag.name().to_string(),
                    });
                }
                if !caps.supports_tags {
                    return Err(BuildError::UnsupportedOnTag {
                        processor: processor.name().to_string(),
                        tag: tag.name().to_string(),
                    });
                }
                tag.push_processor(processor);
                Ok(())
            }
        }
    }

    fn add_global(&mut self, global: GlobalNode) -> Result<(), BuildError> {
        if let Some(name) = global.inject_name() {
            if name.is_empty() {
                return Err(BuildError::EmptyName("global"));
            }
            self.register(name, NodeKind::Global)?;
        }
        self.globals.push(global);
        Ok(())
    }

    /// Fills in tag back-references, creating tags that sources name but
    /// nobody declared.
    fn link_tags(&mut self) -> Result<(), BuildError> {
        let links: Vec<(String, String)> = self
            .root
            .sources()
            .iter()
            .flat_map(|source| {
                source
                    .tag_names()
                    .map(|tag| (tag.to_string(), source.name().to_string()))
            })
            .collect();

        for (tag_name, source_name) in links {
            let position = match self.tags.iter().position(|t| t.name() == tag_name) {
                Some(position) => position,
                None => {
                    self.register(&tag_name, NodeKind::Tag)?;
                    log::warn!(
                        "Tag '{}' used by '{}' was never declared; creating it",
                        tag_name,
                        source_name
                    );
                    self.tags.push(TagNode::implicit(tag_name.as_str()));
                    self.tags.len() - 1
                }
            };
            self.tags[position].link_source(&source_name);
        }
        Ok(())
    }

    fn check_defaults(&self) -> Result<(), BuildError> {
        for source in self.root.sources() {
            let (Some(default), Some(declared)) = (source.default_value(), source.declared_type())
            else {
                continue;
            };
            if !default_fits(default, declared) {
                return Err(BuildError::DefaultTypeMismatch {
                    source_name: source.name().to_string(),
                    default: default.clone(),
                    expected: declared.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Threads the element type through every chain and checks each
    /// processor against the source's shape and the type reaching it.
    fn check_capabilities(&self) -> Result<(), BuildError> {
        for source in self.root.sources() {
            let shape = source.shape();
            let mut flowing = Some(source.element_type());
            for processor in source.processors() {
                let caps = processor.capabilities();
                caps.check(shape, flowing)
                    .map_err(|mismatch| BuildError::TypeMismatch {
                        processor: processor.name().to_string(),
                        source_name: source.name().to_string(),
                        position: processor.position(),
                        mismatch,
                    })?;
                flowing = caps.output_type(flowing);
            }
        }
        Ok(())
    }
}

/// Whether a default agrees with the declared element type. Integers are
/// accepted for floats and strings for paths.
fn default_fits(default: &Value, declared: ValueType) -> bool {
    match (default, default.element_type()) {
        (Value::Null, _) => true,
        (Value::List(items), None) if items.is_empty() => true,
        (_, None) => false,
        (_, Some(found)) => {
            found == declared
                || matches!(
                    (found, declared),
                    (ValueType::Int, ValueType::Float) | (ValueType::Str, ValueType::Path)
                )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fit_rules() {
        assert!(default_fits(&Value::Int(1), ValueType::Int));
        assert!(default_fits(&Value::Int(1), ValueType::Float));
        assert!(default_fits(&Value::from("a/b"), ValueType::Path));
        assert!(default_fits(&Value::from(vec![1, 2]), ValueType::Int));
        assert!(!default_fits(&Value::from("x"), ValueType::Int));
        assert!(!default_fits(&Value::Float(1.5), ValueType::Int));
    }
}
