use serde::{Deserialize, Serialize};
use std::fmt;

pub mod global;
pub mod processor;
pub mod root;
pub mod source;
pub mod tag;

pub use global::*;
pub use processor::*;
pub use root::*;
pub use source::*;
pub use tag::*;

/// The five kinds of node a tree is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Root,
    Source,
    Processor,
    Tag,
    Global,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Source => "source",
            NodeKind::Processor => "processor",
            NodeKind::Tag => "tag",
            NodeKind::Global => "global",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
