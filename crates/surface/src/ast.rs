//! The full-sugar expression tree.
//!
//! Every node keeps the tokens it was parsed from, so diagnostics further
//! down the pipeline can always point back into the source. The tree is
//! produced by the parser, consumed exactly once by the desugarer, and then
//! discarded.

use crate::{
  private,
  span::{FileId, Span},
  token::*,
};
use core::cmp;

pub(crate) trait SpanHelper {
  fn get_span(&self) -> Span;
}

impl<S: Spanned> SpanHelper for S {
  #[inline]
  fn get_span(&self) -> Span {
    <S as Spanned>::span(self)
  }
}

impl<S: Spanned> SpanHelper for Option<S> {
  #[inline]
  fn get_span(&self) -> Span {
    match self {
      None => Span::SYNTHETIC,
      Some(s) => <S as Spanned>::span(s),
    }
  }
}

impl<S: Spanned> SpanHelper for Vec<S> {
  fn get_span(&self) -> Span {
    let mut builder = SpanBuilder::new();
    for item in self {
      builder = builder.add(item);
    }
    builder.into()
  }
}

pub(crate) struct SpanBuilder {
  span: Span,
}

impl SpanBuilder {
  #[inline]
  pub(crate) const fn new() -> Self {
    Self {
      span: Span::SYNTHETIC,
    }
  }

  #[inline]
  pub(crate) fn add(mut self, spanned: &impl SpanHelper) -> Self {
    let first = self.span;
    let next = spanned.get_span();

    if first == Span::SYNTHETIC {
      self.span = next;
    } else if next == Span::SYNTHETIC {
      // keep what we have
    } else if first.file() == FileId::UNKNOWN && next.file() != FileId::UNKNOWN {
      self.span = next;
    } else {
      let start = cmp::min(first.start(), next.start());
      let end = cmp::max(first.end(), next.end());
      self.span = Span::new(next.file(), start, end);
    }

    self
  }
}

impl From<SpanBuilder> for Span {
  #[inline]
  fn from(builder: SpanBuilder) -> Span {
    builder.span
  }
}

macro_rules! ast_struct {
  (
    $(#[$m:meta])*
    pub struct $name:ident {$(
      $(#[$fm:meta])* pub $field:ident: $field_ty:ty,
    )*}
  ) => {
    $(#[$m])*
    #[derive(Debug, PartialEq, Clone)]
    pub struct $name {
      $(
        $(#[$fm])* pub $field: $field_ty,
      )*
    }

    impl private::Sealed for $name {}
    impl Spanned for $name {
      fn span(&self) -> Span {
        SpanBuilder::new()
          $(.add(&self.$field))*
          .into()
      }
    }
  };
}

macro_rules! ast_enum {
  (
    $(#[$m:meta])*
    pub enum $name:ident {$(
      $(#[$vm:meta])* $variant:ident($inner:ty),
    )*}
  ) => {
    $(#[$m])*
    #[derive(Debug, PartialEq, Clone)]
    pub enum $name {
      $(
        $(#[$vm])* $variant(Box<$inner>),
      )*
    }

    $(
      impl From<Box<$inner>> for $name {
        #[inline]
        fn from(node: Box<$inner>) -> Self {
          Self::$variant(node)
        }
      }

      impl From<$inner> for $name {
        #[inline]
        fn from(node: $inner) -> Self {
          Self::$variant(Box::new(node))
        }
      }
    )*

    impl private::Sealed for $name {}
    impl Spanned for $name {
      fn span(&self) -> Span {
        match self {
          $(Self::$variant(e) => Spanned::span(e.as_ref()),)*
        }
      }
    }
  };
}

macro_rules! define_operator {
  (
    $(#[$m:meta])*
    pub enum $name:ident {$(
      $(#[$vm:meta])* $variant:ident($inner:ty),
    )*}
  ) => {
    $(#[$m])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum $name {
      $(
        $(#[$vm])* $variant($inner),
      )*
    }

    $(
      impl From<$inner> for $name {
        #[inline]
        fn from(tok: $inner) -> Self {
          $name::$variant(tok)
        }
      }
    )*

    impl private::Sealed for $name {}
    impl Spanned for $name {
      fn span(&self) -> Span {
        match self {
          $(
            $name::$variant(t) => t.span(),
          )*
        }
      }
    }
  };
}

define_operator! {
  pub enum UnaryOperator {
    /// `!`
    Not(Not),

    /// `~`
    BitNeg(BitNeg),

    /// `+`
    Plus(Plus),

    /// `-`
    Minus(Minus),
  }
}

define_operator! {
  pub enum BinaryOperator {
    /// `*`
    Mul(Mul),

    /// `/`
    Div(Div),

    /// `%`
    Mod(Mod),

    /// `+`
    Plus(Plus),

    /// `-`
    Minus(Minus),

    /// `<<`
    ShiftLeft(ShiftLeft),

    /// `>>`
    ShiftRight(ShiftRight),

    /// `>`
    GreaterThan(GreaterThan),

    /// `>=`
    GreaterThanOrEqual(GreaterThanOrEqual),

    /// `<`
    LessThan(LessThan),

    /// `<=`
    LessThanOrEqual(LessThanOrEqual),

    /// `in`
    In(In),

    /// `==`
    Equal(Equal),

    /// `!=`
    NotEqual(NotEqual),

    /// `&`
    BitAnd(BitAnd),

    /// `^`
    BitXor(BitXor),

    /// `|`
    BitOr(BitOr),

    /// `&&`
    And(And),

    /// `||`
    Or(Or),
  }
}

define_operator! {
  /// Field visibility marker: `:`, `::` or `:::`.
  pub enum FieldVisibility {
    /// `:`
    Default(Colon),

    /// `::`
    Hidden(DoubleColon),

    /// `:::`
    Visible(TripleColon),
  }
}

ast_struct! {
  /// An identifier expression: `foo`.
  pub struct ExprIdent {
    pub token: Ident,
  }
}

ast_struct! {
  /// A `self` expression.
  pub struct ExprSelf {
    pub token: SelfValue,
  }
}

ast_struct! {
  /// A `$` expression, referring to the outermost object.
  pub struct ExprDollar {
    pub token: Dollar,
  }
}

ast_struct! {
  /// A `null` literal.
  pub struct ExprNull {
    pub token: Null,
  }
}

ast_struct! {
  /// A `true` literal.
  pub struct ExprTrue {
    pub token: True,
  }
}

ast_struct! {
  /// A `false` literal.
  pub struct ExprFalse {
    pub token: False,
  }
}

ast_struct! {
  /// A number literal.
  pub struct ExprNumber {
    pub token: Number,
  }
}

ast_struct! {
  /// A string literal: `"foo"`.
  pub struct ExprString {
    pub token: Str,
  }
}

impl ExprString {
  #[inline]
  pub fn kind(&self) -> StringKind {
    self.token.kind
  }
}

ast_struct! {
  /// A parenthesized expression: `(foo)`.
  pub struct ExprParen {
    pub left_paren_token: LeftParen,
    pub expr: Expr,
    pub right_paren_token: RightParen,
  }
}

ast_struct! {
  /// An error expression: `error "foo"`.
  pub struct ExprError {
    pub error_token: Error,
    pub expr: Expr,
  }
}

ast_struct! {
  /// An assert expression: `assert cond : "message"; <rest>`.
  pub struct ExprAssert {
    pub assert_token: Assert,
    pub cond: Expr,
    pub colon_token: Option<Colon>,
    pub msg: Option<Expr>,
    pub semi_colon_token: SemiColon,
    pub rest: Expr,
  }
}

ast_struct! {
  /// An if expression: `if "foo" then "bar" else "baz"`.
  pub struct ExprIf {
    pub if_token: If,
    pub cond: Expr,
    pub then_token: Then,
    pub if_true: Expr,
    pub else_token: Option<Else>,
    pub if_false: Option<Expr>,
  }
}

ast_struct! {
  /// A function expression: `function(x) x * x`.
  pub struct ExprFunction {
    pub function_token: Function,
    pub left_paren_token: LeftParen,
    pub params: Vec<Param>,
    pub right_paren_token: RightParen,
    pub body: Expr,
  }
}

ast_struct! {
  /// A function parameter: `x = "foo"`.
  pub struct Param {
    pub name: Ident,
    pub assign_token: Option<Assign>,
    pub default_value: Option<Expr>,
  }
}

ast_struct! {
  /// A positional function argument: `"foo"`.
  pub struct ArgPositional {
    pub value: Expr,
  }
}

ast_struct! {
  /// A named function argument: `x = "foo"`.
  pub struct ArgNamed {
    pub name: Ident,
    pub assign_token: Assign,
    pub value: Expr,
  }
}

ast_enum! {
  /// A function argument.
  pub enum Argument {
    Positional(ArgPositional),
    Named(ArgNamed),
  }
}

ast_struct! {
  /// An import expression: `import "foo.libsonnet"`.
  pub struct ExprImport {
    pub import_token: Import,
    pub file: Str,
  }
}

ast_struct! {
  /// An importstr expression: `importstr "foo.txt"`.
  pub struct ExprImportStr {
    pub import_str_token: ImportStr,
    pub file: Str,
  }
}

ast_struct! {
  /// A local expression: `local foo = "bar"; rest`.
  pub struct ExprLocal {
    pub local_token: Local,
    pub binds: Vec<Bind>,
    pub semi_colon_token: SemiColon,
    pub body: Expr,
  }
}

ast_struct! {
  /// A local value bind: `foo = "bar"`.
  pub struct BindValue {
    pub name: Ident,
    pub assign_token: Assign,
    pub body: Expr,
  }
}

ast_struct! {
  /// A local function bind: `foo(bar) = bar`.
  pub struct BindFunction {
    pub name: Ident,
    pub left_paren_token: LeftParen,
    pub params: Vec<Param>,
    pub right_paren_token: RightParen,
    pub assign_token: Assign,
    pub body: Expr,
  }
}

ast_enum! {
  /// A local bind.
  pub enum Bind {
    Value(BindValue),
    Function(BindFunction),
  }
}

ast_struct! {
  /// A unary expression: `-foo`.
  pub struct ExprUnary {
    pub operator: UnaryOperator,
    pub expr: Expr,
  }
}

ast_struct! {
  /// A binary expression: `a + b`.
  pub struct ExprBinary {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
  }
}

ast_struct! {
  /// An index expression: `a[b]`.
  pub struct ExprIndex {
    pub target: Expr,
    pub left_bracket_token: LeftBracket,
    pub index: Expr,
    pub right_bracket_token: RightBracket,
  }
}

ast_struct! {
  /// A slice expression: `a[b:c:d]`, any of the bounds optional.
  pub struct ExprSlice {
    pub target: Expr,
    pub left_bracket_token: LeftBracket,
    pub begin_index: Option<Expr>,
    pub end_colon_token: Option<Colon>,
    pub end_index: Option<Expr>,
    pub step_colon_token: Option<Colon>,
    pub step: Option<Expr>,
    pub right_bracket_token: RightBracket,
  }
}

ast_struct! {
  /// A field access expression: `a.b`.
  pub struct ExprFieldAccess {
    pub target: Expr,
    pub dot_token: Dot,
    pub field_name: Ident,
  }
}

ast_struct! {
  /// An apply expression: `a(b, c)`.
  pub struct ExprApply {
    pub target: Expr,
    pub left_paren_token: LeftParen,
    pub args: Vec<Argument>,
    pub right_paren_token: RightParen,
    pub tail_strict_token: Option<TailStrict>,
  }
}

ast_struct! {
  /// An object literal: `{ a: 1 }`.
  pub struct ExprObject {
    pub left_brace_token: LeftBrace,
    pub fields: Vec<ObjectField>,
    pub right_brace_token: RightBrace,
  }
}

ast_struct! {
  /// An object apply expression: `a { b: true }`.
  /// Sugar for `a + { b: true }`.
  pub struct ExprObjectApply {
    pub target: Expr,
    pub object: ExprObject,
  }
}

ast_struct! {
  /// An array literal: `[1, 2, 3]`.
  pub struct ExprArray {
    pub left_bracket_token: LeftBracket,
    pub items: Vec<Expr>,
    pub right_bracket_token: RightBracket,
  }
}

ast_struct! {
  /// An array comprehension: `[x for x in xs if x > 2]`.
  pub struct ExprArrayComp {
    pub left_bracket_token: LeftBracket,
    pub expr: Expr,
    pub specs: Vec<CompSpec>,
    pub right_bracket_token: RightBracket,
  }
}

ast_struct! {
  /// An object comprehension: `{ [k]: v for k in ks }`.
  pub struct ExprObjectComp {
    pub left_brace_token: LeftBrace,
    pub fields: Vec<ObjectField>,
    pub specs: Vec<CompSpec>,
    pub right_brace_token: RightBrace,
  }
}

ast_struct! {
  /// A super field access: `super.a`.
  pub struct ExprSuperField {
    pub super_token: Super,
    pub dot_token: Dot,
    pub field_name: Ident,
  }
}

ast_struct! {
  /// A computed super access: `super[a]`.
  pub struct ExprSuperIndex {
    pub super_token: Super,
    pub left_bracket_token: LeftBracket,
    pub index: Expr,
    pub right_bracket_token: RightBracket,
  }
}

ast_struct! {
  /// An in-super test: `a in super`.
  pub struct ExprInSuper {
    pub target: Expr,
    pub in_token: In,
    pub super_token: Super,
  }
}

ast_struct! {
  /// A comprehension for-spec: `for x in xs`.
  pub struct ForSpec {
    pub for_token: For,
    pub id: Ident,
    pub in_token: In,
    pub expr: Expr,
  }
}

ast_struct! {
  /// A comprehension if-spec: `if x > 2`.
  pub struct IfSpec {
    pub if_token: If,
    pub expr: Expr,
  }
}

ast_enum! {
  /// A comprehension specification.
  pub enum CompSpec {
    For(ForSpec),
    If(IfSpec),
  }
}

ast_struct! {
  /// An object-scoped local: `local foo = "bar"`.
  pub struct ObjectFieldLocal {
    pub local_token: Local,
    pub bind: Bind,
  }
}

ast_struct! {
  /// An object-scoped assert: `assert cond : "message"`.
  pub struct ObjectFieldAssert {
    pub assert_token: Assert,
    pub cond: Expr,
    pub colon_token: Option<Colon>,
    pub msg: Option<Expr>,
  }
}

ast_struct! {
  /// A value field: `foo: "bar"`, `"foo"+: "bar"`, `[foo]:: "bar"`.
  pub struct ObjectFieldValue {
    pub name: FieldName,
    pub plus_token: Option<Plus>,
    pub op: FieldVisibility,
    pub value: Expr,
  }
}

ast_struct! {
  /// A method field: `foo(x): x * 2`.
  pub struct ObjectFieldFunction {
    pub name: FieldName,
    pub left_paren_token: LeftParen,
    pub params: Vec<Param>,
    pub right_paren_token: RightParen,
    pub op: FieldVisibility,
    pub value: Expr,
  }
}

ast_enum! {
  /// An item of an object body. Locals, asserts and fields can be
  /// interleaved freely in the source; they form three logically
  /// independent groups.
  pub enum ObjectField {
    Local(ObjectFieldLocal),
    Assert(ObjectFieldAssert),
    Value(ObjectFieldValue),
    Function(ObjectFieldFunction),
  }
}

ast_struct! {
  /// A computed field name: `["foo" + "bar"]`.
  pub struct ComputedFieldName {
    pub left_bracket_token: LeftBracket,
    pub expr: Expr,
    pub right_bracket_token: RightBracket,
  }
}

ast_enum! {
  /// An object field name.
  pub enum FieldName {
    Ident(Ident),
    String(Str),
    Computed(ComputedFieldName),
  }
}

ast_enum! {
  /// An expression.
  pub enum Expr {
    Apply(ExprApply),
    Array(ExprArray),
    ArrayComp(ExprArrayComp),
    Assert(ExprAssert),
    Binary(ExprBinary),
    Dollar(ExprDollar),
    Error(ExprError),
    False(ExprFalse),
    FieldAccess(ExprFieldAccess),
    Function(ExprFunction),
    Ident(ExprIdent),
    If(ExprIf),
    Import(ExprImport),
    ImportStr(ExprImportStr),
    Index(ExprIndex),
    InSuper(ExprInSuper),
    Local(ExprLocal),
    Null(ExprNull),
    Number(ExprNumber),
    Object(ExprObject),
    ObjectApply(ExprObjectApply),
    ObjectComp(ExprObjectComp),
    Paren(ExprParen),
    SelfValue(ExprSelf),
    Slice(ExprSlice),
    String(ExprString),
    SuperField(ExprSuperField),
    SuperIndex(ExprSuperIndex),
    True(ExprTrue),
    Unary(ExprUnary),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn file() -> FileId {
    FileId::next()
  }

  #[test]
  fn spans_cover_all_tokens() {
    let f = file();
    let expr = ExprIf {
      if_token: If::new(f.span(0..2)),
      cond: ExprTrue {
        token: True::new(f.span(3..7)),
      }
      .into(),
      then_token: Then::new(f.span(8..12)),
      if_true: ExprNumber {
        token: Number::new(1.0, f.span(13..14)),
      }
      .into(),
      else_token: None,
      if_false: None,
    };

    assert_eq!(expr.span(), f.span(0..14));
  }

  #[test]
  fn synthetic_tokens_do_not_widen_spans() {
    let f = file();
    let expr = ExprError {
      error_token: Error::synthetic(),
      expr: ExprNull {
        token: Null::new(f.span(6..10)),
      }
      .into(),
    };

    assert_eq!(expr.span(), f.span(6..10));
    assert!(Error::synthetic().span().is_synthetic());
  }

  #[test]
  fn enum_conversions_box_the_node() {
    let f = file();
    let ident = ExprIdent {
      token: Ident::new("x", f.span(0..1)),
    };
    let expr: Expr = ident.clone().into();

    assert_eq!(expr, Expr::Ident(Box::new(ident)));
  }
}
