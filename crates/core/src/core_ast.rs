use derive_more::{From, TryInto};
use jsonnet_surface::{ast, Span};
use smol_str::SmolStr;

mod private {
  pub trait Sealed {}
}

/// Common trait implemented for all core language nodes.
pub trait CoreNode: private::Sealed {
  /// Original source span. `None` for nodes synthesized by the desugarer.
  fn span(&self) -> Option<Span>;
}

/// Types that can be converted into a `CoreExpr`.
pub trait IntoCoreExpr: private::Sealed + Sized {
  fn into_expr(self) -> CoreExpr;

  #[inline]
  fn into_boxed_expr(self) -> Box<CoreExpr> {
    Box::from(self.into_expr())
  }
}

// Makes the blanket impl cover CoreExpr
impl private::Sealed for CoreExpr {}
impl<T> IntoCoreExpr for T
where
  T: private::Sealed + Sized + Into<CoreExpr>,
{
  #[inline]
  fn into_expr(self) -> CoreExpr {
    self.into()
  }
}

impl private::Sealed for Box<CoreExpr> {}
impl IntoCoreExpr for Box<CoreExpr> {
  #[inline]
  fn into_expr(self) -> CoreExpr {
    *self
  }

  #[inline]
  fn into_boxed_expr(self) -> Box<CoreExpr> {
    self
  }
}

macro_rules! ast_ctor_param {
  (impl Box<CoreExpr>) => {impl IntoCoreExpr};
  (return Box<CoreExpr>) => {&CoreExpr};
  ($this:ident $fld:ident => Box<CoreExpr>) => {&$this.$fld};
  ($arg:ident Box<CoreExpr>) => {$arg.into_boxed_expr()};
  (impl Vec<$t:ty>) => {impl IntoIterator<Item = $t>};
  (return Vec<$t:ty>) => {&[$t]};
  ($this:ident $fld:ident => Vec<$t:ty>) => {&$this.$fld};
  ($arg:ident Vec<$t:ty>) => {$arg.into_iter().collect()};
  (return bool) => {bool};
  ($this:ident $fld:ident => bool) => {$this.$fld};
  (return SmolStr) => {&str};
  ($this:ident $fld:ident => SmolStr) => {&$this.$fld};
  (impl $t:ty) => {impl Into<$t>};
  (return $t:ty) => {&$t};
  ($this:ident $fld:ident => $t:ty) => {&$this.$fld};
  ($arg:ident $t:ty) => {$arg.into()};
}

macro_rules! ast_node {
  (
    $(#[$($m:tt)*])*
    pub struct $name:ident {
      $(
        $(#[$($fld_m:tt)*])*
        $fld:ident: ($($t:tt)*),
      )*
    }
  ) => {
    $(#[$($m)*])*
    #[derive(Debug, Clone, PartialEq)]
    pub struct $name {
      /// Original source span (if any)
      pub(crate) span: Option<Span>,
      $(
        $(#[$($fld_m)*])*
        pub(crate) $fld: $($t)*,
      )*
    }

    impl $name {
      pub fn new(
        $(
          $fld: ast_ctor_param!(impl $($t)*),
        )*
      ) -> Self {
        $name {
          span: None,
          $(
            $fld: ast_ctor_param!($fld $($t)*),
          )*
        }
      }

      pub fn new_from(
        span: Span,
        $(
          $fld: ast_ctor_param!(impl $($t)*),
        )*
      ) -> Self {
        $name {
          span: Some(span),
          $(
            $fld: ast_ctor_param!($fld $($t)*),
          )*
        }
      }

      #[allow(unused)]
      pub(crate) fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
      }

      $(
        #[inline]
        pub fn $fld(&self) -> ast_ctor_param!(return $($t)*) {
          ast_ctor_param!(self $fld => $($t)*)
        }
      )*
    }

    impl private::Sealed for $name {}
    impl CoreNode for $name {
      #[inline]
      fn span(&self) -> Option<Span> {
        self.span
      }
    }
  };

  (
    $(#[$($m:tt)*])*
    pub struct $name:ident;
  ) => {
    ast_node! {
      $(#[$($m)*])*
      pub struct $name {}
    }
  };
}

macro_rules! ast_op {
  (
    $(#[$($m:tt)*])*
    pub enum $name:ident {
      $(
        $(#[$($variant_m:tt)*])*
        $variant:ident,
      )+
    }
  ) => {
    $(#[$($m)*])*
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum $name {
      $($(#[$($variant_m)*])* $variant(Option<Span>),)*
    }

    impl private::Sealed for $name {}
    impl CoreNode for $name {
      #[inline]
      fn span(&self) -> Option<Span> {
        match self {
          $(
            $name::$variant(s) => *s,
          )*
        }
      }
    }

    impl $name {
      $(
        paste::item! {
          $(#[$($variant_m)*])*
          pub fn [< $variant:snake:lower >]() -> Self {
            $name::$variant(None)
          }
        }
      )*
    }
  };
}

/// Identifier
#[derive(Debug, Clone, PartialEq)]
pub struct CoreIdent {
  pub(crate) name: SmolStr,
  pub(crate) span: Option<Span>,
}

impl private::Sealed for CoreIdent {}
impl CoreNode for CoreIdent {
  fn span(&self) -> Option<Span> {
    self.span
  }
}

impl CoreIdent {
  pub fn new(name: impl Into<SmolStr>) -> Self {
    CoreIdent {
      name: name.into(),
      span: None,
    }
  }

  pub fn new_from(span: Span, name: impl Into<SmolStr>) -> Self {
    CoreIdent {
      name: name.into(),
      span: Some(span),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralToken {
  Null,
  True,
  False,
  String(SmolStr),
  Number(f64),
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum CoreLiteral<'a> {
  Null,
  Bool(bool),
  String(&'a str),
  Number(f64),
}

/// Literal expression
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralCoreExpr {
  pub(crate) span: Option<Span>,
  pub(crate) token: LiteralToken,
}

impl private::Sealed for LiteralCoreExpr {}
impl CoreNode for LiteralCoreExpr {
  fn span(&self) -> Option<Span> {
    self.span
  }
}

impl LiteralCoreExpr {
  pub(crate) fn new(token: LiteralToken) -> Self {
    LiteralCoreExpr { span: None, token }
  }

  pub(crate) fn new_from(span: Span, token: LiteralToken) -> Self {
    LiteralCoreExpr {
      span: Some(span),
      token,
    }
  }

  pub fn new_str(s: impl Into<SmolStr>) -> Self {
    LiteralCoreExpr::new(LiteralToken::String(s.into()))
  }

  pub fn new_str_from(span: Span, s: impl Into<SmolStr>) -> Self {
    LiteralCoreExpr::new_from(span, LiteralToken::String(s.into()))
  }

  pub fn new_number(number: f64) -> Self {
    LiteralCoreExpr::new(LiteralToken::Number(number))
  }

  pub fn new_number_from(span: Span, number: f64) -> Self {
    LiteralCoreExpr::new_from(span, LiteralToken::Number(number))
  }

  pub fn new_null() -> Self {
    LiteralCoreExpr::new(LiteralToken::Null)
  }

  pub fn new_null_from(span: Span) -> Self {
    LiteralCoreExpr::new_from(span, LiteralToken::Null)
  }

  pub fn new_true() -> Self {
    LiteralCoreExpr::new(LiteralToken::True)
  }

  pub fn new_true_from(span: Span) -> Self {
    LiteralCoreExpr::new_from(span, LiteralToken::True)
  }

  pub fn new_false() -> Self {
    LiteralCoreExpr::new(LiteralToken::False)
  }

  pub fn new_false_from(span: Span) -> Self {
    LiteralCoreExpr::new_from(span, LiteralToken::False)
  }

  pub(crate) fn with_span(mut self, span: Span) -> Self {
    self.span = Some(span);
    self
  }

  /// Get literal value
  pub fn value(&self) -> CoreLiteral<'_> {
    match &self.token {
      LiteralToken::Null => CoreLiteral::Null,
      LiteralToken::True => CoreLiteral::Bool(true),
      LiteralToken::False => CoreLiteral::Bool(false),
      LiteralToken::String(v) => CoreLiteral::String(v),
      LiteralToken::Number(v) => CoreLiteral::Number(*v),
    }
  }
}

ast_node! {
  /// Self expression
  pub struct SelfCoreExpr;
}

ast_node! {
  /// Super expression
  pub struct SuperCoreExpr;
}

ast_node! {
  /// Error expression
  pub struct ErrorCoreExpr {
    expr: (Box<CoreExpr>),
  }
}

impl ErrorCoreExpr {
  pub(crate) fn new_str(s: impl Into<SmolStr>) -> Self {
    ErrorCoreExpr::new(LiteralCoreExpr::new_str(s))
  }
}

ast_op! {
  /// Field visibility in the core grammar: the three markers carry through
  /// from the surface unchanged.
  pub enum CoreFieldVisibility {
    Default,
    Hidden,
    Visible,
  }
}

impl CoreFieldVisibility {
  pub fn from_token(tok: &ast::FieldVisibility) -> Self {
    match tok {
      ast::FieldVisibility::Default(t) => CoreFieldVisibility::Default(Some(t.span)),
      ast::FieldVisibility::Hidden(t) => CoreFieldVisibility::Hidden(Some(t.span)),
      ast::FieldVisibility::Visible(t) => CoreFieldVisibility::Visible(Some(t.span)),
    }
  }
}

ast_node! {
  /// Object field
  pub struct CoreObjectField {
    name: (CoreExpr),
    visibility: (CoreFieldVisibility),
    value: (CoreExpr),
  }
}

ast_node! {
  /// Object expression. Only asserts and fields: object locals have been
  /// compiled into the binding prologue of every member.
  pub struct ObjectCoreExpr {
    asserts: (Vec<CoreExpr>),
    fields: (Vec<CoreObjectField>),
  }
}

ast_node! {
  /// Member access expression
  pub struct MemberAccessCoreExpr {
    target: (Box<CoreExpr>),
    field_name: (Box<CoreExpr>),
  }
}

ast_node! {
  /// Local binding
  pub struct CoreLocalBind {
    ident: (CoreIdent),
    value: (CoreExpr),
  }
}

ast_node! {
  /// Local expression
  pub struct LocalCoreExpr {
    binds: (Vec<CoreLocalBind>),
    rest: (Box<CoreExpr>),
  }
}

ast_node! {
  /// If expression. Always ternary: a missing surface else-branch has been
  /// replaced with a synthetic null literal.
  pub struct IfCoreExpr {
    cond: (Box<CoreExpr>),
    if_true: (Box<CoreExpr>),
    if_false: (Box<CoreExpr>),
  }
}

ast_op! {
  /// Binary operator. `==`, `!=`, `%` and `in` are absent: they are
  /// rewritten into standard-library calls.
  pub enum CoreBinaryOperator {
    Mul,
    Div,
    Plus,
    Minus,
    ShiftLeft,
    ShiftRight,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
  }
}

impl CoreBinaryOperator {
  /// Maps an identity-translated surface operator. Operators that are
  /// rewritten (`==`, `!=`, `%`, `in`) have no core counterpart.
  pub fn from_token(tok: &ast::BinaryOperator) -> Option<Self> {
    use ast::BinaryOperator as Op;

    let op = match tok {
      Op::Mul(t) => CoreBinaryOperator::Mul(Some(t.span)),
      Op::Div(t) => CoreBinaryOperator::Div(Some(t.span)),
      Op::Plus(t) => CoreBinaryOperator::Plus(Some(t.span)),
      Op::Minus(t) => CoreBinaryOperator::Minus(Some(t.span)),
      Op::ShiftLeft(t) => CoreBinaryOperator::ShiftLeft(Some(t.span)),
      Op::ShiftRight(t) => CoreBinaryOperator::ShiftRight(Some(t.span)),
      Op::GreaterThan(t) => CoreBinaryOperator::GreaterThan(Some(t.span)),
      Op::GreaterThanOrEqual(t) => CoreBinaryOperator::GreaterThanOrEqual(Some(t.span)),
      Op::LessThan(t) => CoreBinaryOperator::LessThan(Some(t.span)),
      Op::LessThanOrEqual(t) => CoreBinaryOperator::LessThanOrEqual(Some(t.span)),
      Op::BitAnd(t) => CoreBinaryOperator::BitAnd(Some(t.span)),
      Op::BitXor(t) => CoreBinaryOperator::BitXor(Some(t.span)),
      Op::BitOr(t) => CoreBinaryOperator::BitOr(Some(t.span)),
      Op::And(t) => CoreBinaryOperator::And(Some(t.span)),
      Op::Or(t) => CoreBinaryOperator::Or(Some(t.span)),
      Op::Mod(_) | Op::Equal(_) | Op::NotEqual(_) | Op::In(_) => return None,
    };

    Some(op)
  }
}

ast_node! {
  /// Binary expression
  pub struct BinaryCoreExpr {
    lhs: (Box<CoreExpr>),
    op: (CoreBinaryOperator),
    rhs: (Box<CoreExpr>),
  }
}

ast_op! {
  /// Unary operator
  pub enum CoreUnaryOperator {
    Plus,
    Minus,
    Not,
    BitNeg,
  }
}

impl CoreUnaryOperator {
  pub fn from_token(tok: &ast::UnaryOperator) -> Self {
    match tok {
      ast::UnaryOperator::Plus(t) => CoreUnaryOperator::Plus(Some(t.span)),
      ast::UnaryOperator::Minus(t) => CoreUnaryOperator::Minus(Some(t.span)),
      ast::UnaryOperator::Not(t) => CoreUnaryOperator::Not(Some(t.span)),
      ast::UnaryOperator::BitNeg(t) => CoreUnaryOperator::BitNeg(Some(t.span)),
    }
  }
}

ast_node! {
  /// Unary expression
  pub struct UnaryCoreExpr {
    op: (CoreUnaryOperator),
    expr: (Box<CoreExpr>),
  }
}

ast_node! {
  /// Function param. Every parameter has a default value: parameters with
  /// no surface default get a synthesized error expression instead, which
  /// only fires if the parameter is forced while unbound.
  pub struct CoreFunctionParam {
    name: (CoreIdent),
    default_value: (CoreExpr),
  }
}

ast_node! {
  /// Function expression
  pub struct FunctionCoreExpr {
    params: (Vec<CoreFunctionParam>),
    body: (Box<CoreExpr>),
  }
}

ast_node! {
  /// Named call argument
  pub struct CoreNamedArg {
    name: (SmolStr),
    value: (CoreExpr),
  }
}

ast_node! {
  /// Apply expression
  pub struct ApplyCoreExpr {
    target: (Box<CoreExpr>),
    positionals: (Vec<CoreExpr>),
    named: (Vec<CoreNamedArg>),
    is_tailstrict: (bool),
  }
}

ast_node! {
  /// Array expression
  pub struct ArrayCoreExpr {
    items: (Vec<CoreExpr>),
  }
}

ast_node! {
  /// Ident expression
  pub struct IdentCoreExpr {
    ident: (CoreIdent),
  }
}

/// An expression in the core language
#[derive(Debug, Clone, PartialEq, From, TryInto)]
pub enum CoreExpr {
  Literal(LiteralCoreExpr),
  SelfValue(SelfCoreExpr),
  Super(SuperCoreExpr),
  Object(ObjectCoreExpr),
  Array(ArrayCoreExpr),
  MemberAccess(MemberAccessCoreExpr),
  Ident(IdentCoreExpr),
  Local(LocalCoreExpr),
  If(IfCoreExpr),
  Binary(BinaryCoreExpr),
  Unary(UnaryCoreExpr),
  Function(FunctionCoreExpr),
  Apply(ApplyCoreExpr),
  Error(ErrorCoreExpr),
}

impl CoreExpr {
  pub(crate) fn with_span(self, span: Span) -> Self {
    match self {
      CoreExpr::Literal(it) => CoreExpr::Literal(it.with_span(span)),
      CoreExpr::SelfValue(it) => CoreExpr::SelfValue(it.with_span(span)),
      CoreExpr::Super(it) => CoreExpr::Super(it.with_span(span)),
      CoreExpr::Object(it) => CoreExpr::Object(it.with_span(span)),
      CoreExpr::Array(it) => CoreExpr::Array(it.with_span(span)),
      CoreExpr::MemberAccess(it) => CoreExpr::MemberAccess(it.with_span(span)),
      CoreExpr::Ident(it) => CoreExpr::Ident(it.with_span(span)),
      CoreExpr::Local(it) => CoreExpr::Local(it.with_span(span)),
      CoreExpr::If(it) => CoreExpr::If(it.with_span(span)),
      CoreExpr::Binary(it) => CoreExpr::Binary(it.with_span(span)),
      CoreExpr::Unary(it) => CoreExpr::Unary(it.with_span(span)),
      CoreExpr::Function(it) => CoreExpr::Function(it.with_span(span)),
      CoreExpr::Apply(it) => CoreExpr::Apply(it.with_span(span)),
      CoreExpr::Error(it) => CoreExpr::Error(it.with_span(span)),
    }
  }
}

impl ArrayCoreExpr {
  pub fn new_empty() -> Self {
    ArrayCoreExpr::new(Vec::new())
  }
}
