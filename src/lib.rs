//! # Kumitate - Parameter Pipeline Engine
//!
//! **Kumitate** assembles command-line parameters into a tree and runs every
//! value through its own chain of validators and transformers before handing
//! the results to your code. Processors declare up front which value shapes
//! and types they handle, so a processor that cannot work on a parameter is
//! rejected when the tree is built rather than when a user hits it.
//!
//! ## Core Workflow
//!
//! 1.  **Declare**: Use `Command::builder` to list sources (positional
//!     arguments, options, environment variables), the processors that follow
//!     each one, tags grouping sources for cross-checks, and globals.
//! 2.  **Build**: `build` (or `build_async`) reassembles the declarations into
//!     a `Tree` and checks names, attachments and capabilities.
//! 3.  **Invoke**: Hand raw values to `invoke` / `invoke_blocking` (or parse
//!     them with `clap` through `run_from`). Each source resolves once, tags
//!     and globals run, and the target receives the resolved `Arguments`.
//!     Lifecycle hooks registered with `hook` run at boot, init, on error and
//!     at exit.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kumitate::prelude::*;
//!
//! fn main() -> Result<(), PipelineError> {
//!     let mut command = Command::builder("greet")
//!         .source(SourceNode::argument("name"))
//!         .process(Strip)
//!         .process(ToUppercase)
//!         .source(SourceNode::option("count").short('c').default(1))
//!         .process(IsPositive)
//!         .build(|args: Arguments| {
//!             let name = args.get_str("name").unwrap_or_default().to_string();
//!             let count = args.get_int("count").unwrap_or(1);
//!             Ok(format!("Hello {}! x{}", name, count))
//!         })?; // a `BuildError` converts into `PipelineError::Build`
//!
//!     let call = CallArgs::new().with("name", " world ").with("count", 3);
//!     println!("{}", command.invoke_blocking(call)?);
//!
//!     // Or straight from the command line:
//!     println!("{}", command.run_from(["greet", "kumitate", "-c", "2"])?);
//!     Ok(())
//! }
//! ```

pub mod arguments;
pub mod capability;
pub mod cli;
pub mod command;
pub mod config;
pub mod context;
mod dispatch;
pub mod error;
pub mod globals;
pub mod hooks;
pub mod node;
pub mod prelude;
pub mod processors;
pub mod step;
pub mod tree;
pub mod value;
