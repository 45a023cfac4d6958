//! Built-in processors and tag checks.
//!
//! These are ordinary implementations of [`Processor`](crate::node::Processor);
//! applications add their own the same way or through the closure adapters in
//! [`func`].

mod check;
pub mod func;
mod tag;
mod text;

pub use check::*;
pub use func::{AsyncFnProcessor, FnProcessor, FnTagCheck};
pub use tag::*;
pub use text::*;
