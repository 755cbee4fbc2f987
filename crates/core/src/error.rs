use jsonnet_surface::Span;
use thiserror::Error;

/// Aborts of the surface-to-core translation.
///
/// Each variant names a surface construct whose core translation is
/// intentionally not defined yet. These are translator limitations, not
/// input errors: a program using only supported constructs never fails to
/// translate, and all evaluation-time failures (asserts, unbound
/// parameters, `error` expressions) are represented as ordinary core nodes
/// instead of being raised here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DesugarError {
  /// `[x for x in xs]`
  #[error("array comprehensions are not yet supported (at {span})")]
  ArrayComp { span: Span },

  /// `{ [k]: v for k in ks }`
  #[error("object comprehensions are not yet supported (at {span})")]
  ObjectComp { span: Span },

  /// `import "file.libsonnet"`
  #[error("`import` expressions are not yet supported (at {span})")]
  Import { span: Span },

  /// `importstr "file.txt"`
  #[error("`importstr` expressions are not yet supported (at {span})")]
  ImportStr { span: Span },

  /// `a +: b` object fields
  #[error("`+` object field merging is not yet supported (at {span})")]
  FieldMerge { span: Span },
}

impl DesugarError {
  /// Span of the offending surface construct.
  pub fn span(&self) -> Span {
    match *self {
      DesugarError::ArrayComp { span }
      | DesugarError::ObjectComp { span }
      | DesugarError::Import { span }
      | DesugarError::ImportStr { span }
      | DesugarError::FieldMerge { span } => span,
    }
  }
}
