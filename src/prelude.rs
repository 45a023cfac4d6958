//! Prelude module for convenient imports
//!
//! Re-exports the types needed to declare, build and invoke a command.
//!
//! # Example
//!
//! ```rust,no_run
//! use kumitate::prelude::*;
//!
//! # fn run_example() -> Result<(), PipelineError> {
//! let mut command = Command::builder("tool")
//!     .source(SourceNode::option("level").value_type(ValueType::Int).default(1))
//!     .process(IsPositive)
//!     .build(|args: Arguments| Ok(args.get_int("level")))?;
//!
//! let level = command.invoke_blocking(CallArgs::new().with("level", 3))?;
//! assert_eq!(level, Some(3));
//! # Ok(())
//! # }
//! ```

// Declaring and running commands
pub use crate::command::{Command, CommandBuilder, Phase};
pub use crate::config::EngineConfig;

// Nodes and the tree
pub use crate::node::{
    Global, GlobalNode, NodeKind, ProcessResult, Processor, ProcessorNode, Scope, SourceKind,
    SourceNode, TagNode,
};
pub use crate::tree::{RegistrationQueue, Tree, VisualNode};

// Values flowing through chains
pub use crate::arguments::{Arguments, CallArgs, ValueMap, ValueProvider};
pub use crate::capability::{Capabilities, Handling, ProcessorKind};
pub use crate::context::{Context, DataStore};
pub use crate::step::Step;
pub use crate::value::{IndexPath, Shape, TypeSet, Value, ValueType};

// Built-ins
pub use crate::globals::{AsyncFnGlobal, DebugMode, FnGlobal, Visualize};
pub use crate::hooks::{AsyncFnHook, FnHook, Hook, HookEvent, HookNode, HookPhase};
pub use crate::processors::*;

// Error types
pub use crate::error::{BuildError, ErrorKind, PipelineError, ProcessError, ResolveError};
