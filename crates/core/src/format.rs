//! Single-line display of core trees.
//!
//! The output is meant for diagnostics and tests, not for re-parsing. Spans
//! are not printed, so two trees that differ only in source positions format
//! identically. Nested expressions that would otherwise be ambiguous on one
//! line (locals, conditionals, binaries, functions, errors) are wrapped in
//! parentheses.

use crate::core_ast::*;
use core::fmt::{self, Display, Formatter};

/// An operand position: parenthesizes the expression forms whose textual
/// extent is open-ended.
struct Atom<'a>(&'a CoreExpr);

impl Display for Atom<'_> {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.0 {
      CoreExpr::Local(_)
      | CoreExpr::If(_)
      | CoreExpr::Binary(_)
      | CoreExpr::Function(_)
      | CoreExpr::Error(_) => write!(f, "({})", self.0),
      e => Display::fmt(e, f),
    }
  }
}

impl Display for CoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      CoreExpr::Literal(it) => Display::fmt(it, f),
      CoreExpr::SelfValue(it) => Display::fmt(it, f),
      CoreExpr::Super(it) => Display::fmt(it, f),
      CoreExpr::Object(it) => Display::fmt(it, f),
      CoreExpr::Array(it) => Display::fmt(it, f),
      CoreExpr::MemberAccess(it) => Display::fmt(it, f),
      CoreExpr::Ident(it) => Display::fmt(it, f),
      CoreExpr::Local(it) => Display::fmt(it, f),
      CoreExpr::If(it) => Display::fmt(it, f),
      CoreExpr::Binary(it) => Display::fmt(it, f),
      CoreExpr::Unary(it) => Display::fmt(it, f),
      CoreExpr::Function(it) => Display::fmt(it, f),
      CoreExpr::Apply(it) => Display::fmt(it, f),
      CoreExpr::Error(it) => Display::fmt(it, f),
    }
  }
}

impl Display for LiteralCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.value() {
      CoreLiteral::Null => f.write_str("null"),
      CoreLiteral::Bool(true) => f.write_str("true"),
      CoreLiteral::Bool(false) => f.write_str("false"),
      CoreLiteral::String(s) => write!(f, "{:?}", s),
      CoreLiteral::Number(n) => write!(f, "{}", n),
    }
  }
}

impl Display for SelfCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.write_str("self")
  }
}

impl Display for SuperCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.write_str("super")
  }
}

impl Display for CoreIdent {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl Display for IdentCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    Display::fmt(self.ident(), f)
  }
}

impl Display for MemberAccessCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}[{}]", Atom(self.target()), self.field_name())
  }
}

impl Display for ErrorCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "error {}", Atom(self.expr()))
  }
}

impl Display for ObjectCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.write_str("{")?;

    let mut first = true;
    for assert in self.asserts() {
      if !first {
        f.write_str(", ")?;
      }
      first = false;
      write!(f, "assert {}", Atom(assert))?;
    }
    for field in self.fields() {
      if !first {
        f.write_str(", ")?;
      }
      first = false;
      Display::fmt(field, f)?;
    }

    f.write_str("}")
  }
}

impl Display for CoreObjectField {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "[{}]{} {}",
      self.name(),
      self.visibility(),
      Atom(self.value())
    )
  }
}

impl Display for CoreFieldVisibility {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      CoreFieldVisibility::Default(_) => f.write_str(":"),
      CoreFieldVisibility::Hidden(_) => f.write_str("::"),
      CoreFieldVisibility::Visible(_) => f.write_str(":::"),
    }
  }
}

impl Display for LocalCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.write_str("local ")?;
    let mut first = true;
    for bind in self.binds() {
      if !first {
        f.write_str(", ")?;
      }
      first = false;
      Display::fmt(bind, f)?;
    }

    write!(f, "; {}", self.rest())
  }
}

impl Display for CoreLocalBind {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{} = {}", self.ident(), Atom(self.value()))
  }
}

impl Display for IfCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "if {} then {} else {}",
      Atom(self.cond()),
      self.if_true(),
      self.if_false()
    )
  }
}

impl Display for BinaryCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{} {} {}", Atom(self.lhs()), self.op(), Atom(self.rhs()))
  }
}

impl Display for CoreBinaryOperator {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let s = match self {
      CoreBinaryOperator::Mul(_) => "*",
      CoreBinaryOperator::Div(_) => "/",
      CoreBinaryOperator::Plus(_) => "+",
      CoreBinaryOperator::Minus(_) => "-",
      CoreBinaryOperator::ShiftLeft(_) => "<<",
      CoreBinaryOperator::ShiftRight(_) => ">>",
      CoreBinaryOperator::GreaterThan(_) => ">",
      CoreBinaryOperator::GreaterThanOrEqual(_) => ">=",
      CoreBinaryOperator::LessThan(_) => "<",
      CoreBinaryOperator::LessThanOrEqual(_) => "<=",
      CoreBinaryOperator::BitAnd(_) => "&",
      CoreBinaryOperator::BitXor(_) => "^",
      CoreBinaryOperator::BitOr(_) => "|",
      CoreBinaryOperator::And(_) => "&&",
      CoreBinaryOperator::Or(_) => "||",
    };

    f.write_str(s)
  }
}

impl Display for UnaryCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}{}", self.op(), Atom(self.expr()))
  }
}

impl Display for CoreUnaryOperator {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let s = match self {
      CoreUnaryOperator::Plus(_) => "+",
      CoreUnaryOperator::Minus(_) => "-",
      CoreUnaryOperator::Not(_) => "!",
      CoreUnaryOperator::BitNeg(_) => "~",
    };

    f.write_str(s)
  }
}

impl Display for FunctionCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.write_str("function(")?;
    let mut first = true;
    for param in self.params() {
      if !first {
        f.write_str(", ")?;
      }
      first = false;
      Display::fmt(param, f)?;
    }

    write!(f, ") {}", self.body())
  }
}

impl Display for CoreFunctionParam {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{} = {}", self.name(), self.default_value())
  }
}

impl Display for ApplyCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}(", Atom(self.target()))?;

    let mut first = true;
    for arg in self.positionals() {
      if !first {
        f.write_str(", ")?;
      }
      first = false;
      Display::fmt(&Atom(arg), f)?;
    }
    for arg in self.named() {
      if !first {
        f.write_str(", ")?;
      }
      first = false;
      write!(f, "{}={}", arg.name(), Atom(arg.value()))?;
    }

    f.write_str(")")?;
    if self.is_tailstrict() {
      f.write_str(" tailstrict")?;
    }

    Ok(())
  }
}

impl Display for ArrayCoreExpr {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.write_str("[")?;
    let mut first = true;
    for item in self.items() {
      if !first {
        f.write_str(", ")?;
      }
      first = false;
      Display::fmt(&Atom(item), f)?;
    }

    f.write_str("]")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn literals() {
    assert_eq!(LiteralCoreExpr::new_null().into_expr().to_string(), "null");
    assert_eq!(LiteralCoreExpr::new_true().into_expr().to_string(), "true");
    assert_eq!(
      LiteralCoreExpr::new_number(2.5).into_expr().to_string(),
      "2.5"
    );
    assert_eq!(
      LiteralCoreExpr::new_str("a\"b").into_expr().to_string(),
      r#""a\"b""#
    );
  }

  #[test]
  fn open_ended_forms_are_parenthesized_in_operand_position() {
    let local = LocalCoreExpr::new(
      vec![CoreLocalBind::new(
        CoreIdent::new("x"),
        LiteralCoreExpr::new_number(1.0),
      )],
      IdentCoreExpr::new(CoreIdent::new("x")),
    );
    let access = MemberAccessCoreExpr::new(local, LiteralCoreExpr::new_str("f"));

    assert_eq!(access.into_expr().to_string(), r#"(local x = 1; x)["f"]"#);
  }

  #[test]
  fn apply_with_named_args_and_tailstrict() {
    let apply = ApplyCoreExpr::new(
      IdentCoreExpr::new(CoreIdent::new("f")),
      vec![LiteralCoreExpr::new_number(1.0).into_expr()],
      vec![CoreNamedArg::new("b", LiteralCoreExpr::new_number(2.0))],
      true,
    );

    assert_eq!(apply.into_expr().to_string(), "f(1, b=2) tailstrict");
  }

  #[test]
  fn object_lists_asserts_before_fields() {
    let object = ObjectCoreExpr::new(
      vec![LiteralCoreExpr::new_true().into_expr()],
      vec![CoreObjectField::new(
        LiteralCoreExpr::new_str("a").into_expr(),
        CoreFieldVisibility::hidden(),
        LiteralCoreExpr::new_number(1.0).into_expr(),
      )],
    );

    assert_eq!(
      object.into_expr().to_string(),
      r#"{assert true, ["a"]:: 1}"#
    );
  }
}
