//! The core language.
//!
//! The surface tree from `jsonnet-surface` is reduced here to a minimal
//! grammar with a precise evaluation semantics: dotted access, slices,
//! equality, modulo and membership tests are rewritten into indexed access
//! or standard-library calls, asserts become conditional errors, and object
//! locals are compiled into per-field binding prologues. The evaluator only
//! ever sees this reduced tree.

mod core_ast;
mod desugar;
mod error;
mod format;

pub use crate::{core_ast::*, desugar::desugar, error::DesugarError};
