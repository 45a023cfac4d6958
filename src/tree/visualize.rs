use super::Tree;
use crate::node::{NodeKind, ProcessorNode};
use serde::Serialize;
use std::fmt;

/// One node of the tree as plain name/kind records, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualNode {
    pub name: String,
    pub kind: NodeKind,
    pub children: Vec<VisualNode>,
}

impl VisualNode {
    fn leaf(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            children: Vec::new(),
        }
    }

    fn with_processors(name: &str, kind: NodeKind, processors: &[ProcessorNode]) -> Self {
        Self {
            children: processors
                .iter()
                .map(|p| VisualNode::leaf(p.name(), NodeKind::Processor))
                .collect(),
            ..VisualNode::leaf(name, kind)
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, prefix: &str, last: bool, top: bool) -> fmt::Result {
        if top {
            writeln!(f, "{} ({})", self.name, self.kind)?;
        } else {
            let branch = if last { "└── " } else { "├── " };
            writeln!(f, "{}{}{} ({})", prefix, branch, self.name, self.kind)?;
        }
        let child_prefix = match (top, last) {
            (true, _) => String::new(),
            (false, true) => format!("{}    ", prefix),
            (false, false) => format!("{}│   ", prefix),
        };
        for (i, child) in self.children.iter().enumerate() {
            child.render(f, &child_prefix, i + 1 == self.children.len(), false)?;
        }
        Ok(())
    }
}

impl fmt::Display for VisualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, "", true, true)
    }
}

impl Tree {
    /// The hierarchy as nested records: the root, then its sources, tags and
    /// globals, with processors under their owners.
    pub fn visualize(&self) -> VisualNode {
        let sources = self
            .sources()
            .iter()
            .map(|s| VisualNode::with_processors(s.name(), NodeKind::Source, s.processors()));
        let tags = self
            .tags()
            .iter()
            .map(|t| VisualNode::with_processors(t.name(), NodeKind::Tag, t.processors()));
        let globals = self
            .globals()
            .iter()
            .map(|g| VisualNode::leaf(g.name(), NodeKind::Global));

        VisualNode {
            name: self.name().to_string(),
            kind: NodeKind::Root,
            children: sources.chain(tags).chain(globals).collect(),
        }
    }
}
