use crate::{private, span::Span};
use smol_str::SmolStr;

/// Types that carry a source span.
pub trait Spanned: private::Sealed {
  fn span(&self) -> Span;
}

macro_rules! tokens {
  ($(
    $(#[$m:meta])*
    $name:ident => $text:literal,
  )*) => {
    $(
      $(#[$m])*
      #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
      pub struct $name {
        pub span: Span,
      }

      impl $name {
        pub const TEXT: &'static str = $text;

        #[inline]
        pub const fn new(span: Span) -> Self {
          $name { span }
        }

        /// Position-less token for injected nodes.
        #[inline]
        pub const fn synthetic() -> Self {
          $name { span: Span::SYNTHETIC }
        }
      }

      impl private::Sealed for $name {}
      impl Spanned for $name {
        #[inline]
        fn span(&self) -> Span {
          self.span
        }
      }
    )*
  };
}

tokens! {
  /// `assert`
  Assert => "assert",
  /// `else`
  Else => "else",
  /// `error`
  Error => "error",
  /// `false`
  False => "false",
  /// `for`
  For => "for",
  /// `function`
  Function => "function",
  /// `if`
  If => "if",
  /// `import`
  Import => "import",
  /// `importstr`
  ImportStr => "importstr",
  /// `in`
  In => "in",
  /// `local`
  Local => "local",
  /// `null`
  Null => "null",
  /// `self`
  SelfValue => "self",
  /// `super`
  Super => "super",
  /// `tailstrict`
  TailStrict => "tailstrict",
  /// `then`
  Then => "then",
  /// `true`
  True => "true",
  /// `$`
  Dollar => "$",
  /// `=`
  Assign => "=",
  /// `:`
  Colon => ":",
  /// `::`
  DoubleColon => "::",
  /// `:::`
  TripleColon => ":::",
  /// `;`
  SemiColon => ";",
  /// `,`
  Comma => ",",
  /// `.`
  Dot => ".",
  /// `{`
  LeftBrace => "{",
  /// `}`
  RightBrace => "}",
  /// `[`
  LeftBracket => "[",
  /// `]`
  RightBracket => "]",
  /// `(`
  LeftParen => "(",
  /// `)`
  RightParen => ")",
  /// `+`
  Plus => "+",
  /// `-`
  Minus => "-",
  /// `*`
  Mul => "*",
  /// `/`
  Div => "/",
  /// `%`
  Mod => "%",
  /// `!`
  Not => "!",
  /// `~`
  BitNeg => "~",
  /// `&`
  BitAnd => "&",
  /// `|`
  BitOr => "|",
  /// `^`
  BitXor => "^",
  /// `<<`
  ShiftLeft => "<<",
  /// `>>`
  ShiftRight => ">>",
  /// `<`
  LessThan => "<",
  /// `<=`
  LessThanOrEqual => "<=",
  /// `>`
  GreaterThan => ">",
  /// `>=`
  GreaterThanOrEqual => ">=",
  /// `==`
  Equal => "==",
  /// `!=`
  NotEqual => "!=",
  /// `&&`
  And => "&&",
  /// `||`
  Or => "||",
}

/// An identifier token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
  pub name: SmolStr,
  pub span: Span,
}

impl Ident {
  #[inline]
  pub fn new(name: impl Into<SmolStr>, span: Span) -> Self {
    Ident {
      name: name.into(),
      span,
    }
  }

  #[inline]
  pub fn name(&self) -> &str {
    &self.name
  }
}

impl private::Sealed for Ident {}
impl Spanned for Ident {
  #[inline]
  fn span(&self) -> Span {
    self.span
  }
}

/// A number token. The lexer has already parsed the literal text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number {
  pub value: f64,
  pub span: Span,
}

impl Number {
  #[inline]
  pub fn new(value: f64, span: Span) -> Self {
    Number { value, span }
  }
}

impl private::Sealed for Number {}
impl Spanned for Number {
  #[inline]
  fn span(&self) -> Span {
    self.span
  }
}

/// Quote style of a string token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
  Double,
  Single,
  VerbatimDouble,
  VerbatimSingle,
  Block,
}

/// A string token. `value` is the decoded content; `kind` records the quote
/// style the source used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Str {
  pub value: SmolStr,
  pub kind: StringKind,
  pub span: Span,
}

impl Str {
  #[inline]
  pub fn new(value: impl Into<SmolStr>, kind: StringKind, span: Span) -> Self {
    Str {
      value: value.into(),
      kind,
      span,
    }
  }

  #[inline]
  pub fn value(&self) -> &str {
    &self.value
  }
}

impl private::Sealed for Str {}
impl Spanned for Str {
  #[inline]
  fn span(&self) -> Span {
    self.span
  }
}
