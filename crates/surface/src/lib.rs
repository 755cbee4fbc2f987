//! Surface syntax tree for the templating front end.
//!
//! This crate defines the full-sugar expression tree handed to us by the
//! parser: every syntactic convenience (dotted access, slices, object-addition
//! sugar, default-message asserts) is still present, and every node carries
//! the tokens it was built from. The `jsonnet-core` crate reduces this tree
//! to the core grammar the evaluator understands.

pub mod ast;
mod span;
mod token;

pub use span::{FileId, Pos, Span};
pub use token::*;

pub(crate) mod private {
  pub trait Sealed {}
}
