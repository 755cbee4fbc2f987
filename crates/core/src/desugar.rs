//! Translation of the surface tree into the core language.
//!
//! One top-down recursive walk. The only state threaded through the walk is
//! [`Ctx`], an immutable by-value flag recording whether the current point is
//! lexically inside an object body; a fresh value is produced whenever a
//! nested object body is entered. Aside from that flag the translation is a
//! pure function of its input.

use crate::{core_ast::*, error::DesugarError};
use jsonnet_surface::{ast, Spanned};

const STD: &str = "std";
const ROOT: &str = "$";
const OUTER_SELF: &str = "$outerself";
const OUTER_SUPER: &str = "$outersuper";
const ASSERTION_FAILED: &str = "Assertion failed";
const PARAM_NOT_BOUND: &str = "Parameter not bound";

/// Translation context: are we lexically inside an object body?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ctx {
  in_object: bool,
}

impl Ctx {
  const NOT_IN_OBJECT: Ctx = Ctx { in_object: false };
  const IN_OBJECT: Ctx = Ctx { in_object: true };
}

trait Desugar<T> {
  fn desugar(self, ctx: Ctx) -> Result<T, DesugarError>;
}

/// Desugars a single surface expression into the core language.
///
/// This is a pure function of its input: translating the same tree twice
/// yields structurally identical core trees. The only failure mode is an
/// intentionally unsupported construct (comprehensions, imports, `+` field
/// merging); see [`DesugarError`]. Evaluation-time failures such as assertion
/// messages and unbound-parameter errors are represented as unevaluated core
/// nodes, never raised here.
pub fn desugar(expr: ast::Expr) -> Result<CoreExpr, DesugarError> {
  expr.desugar(Ctx::NOT_IN_OBJECT)
}

fn call_std_function(name: &'static str, args: Vec<CoreExpr>) -> CoreExpr {
  let std = IdentCoreExpr::new(CoreIdent::new(STD));
  let fn_expr = MemberAccessCoreExpr::new(std, LiteralCoreExpr::new_str(name));

  ApplyCoreExpr::new(fn_expr, args, Vec::<CoreNamedArg>::new(), false).into_expr()
}

fn param_not_bound_expr() -> CoreExpr {
  ErrorCoreExpr::new_str(PARAM_NOT_BOUND).into_expr()
}

impl Desugar<CoreExpr> for ast::Expr {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    match self {
      ast::Expr::Apply(it) => (*it).desugar(ctx),
      ast::Expr::Array(it) => (*it).desugar(ctx),
      ast::Expr::ArrayComp(it) => (*it).desugar(ctx),
      ast::Expr::Assert(it) => (*it).desugar(ctx),
      ast::Expr::Binary(it) => (*it).desugar(ctx),
      ast::Expr::Dollar(it) => (*it).desugar(ctx),
      ast::Expr::Error(it) => (*it).desugar(ctx),
      ast::Expr::False(it) => (*it).desugar(ctx),
      ast::Expr::FieldAccess(it) => (*it).desugar(ctx),
      ast::Expr::Function(it) => (*it).desugar(ctx),
      ast::Expr::Ident(it) => (*it).desugar(ctx),
      ast::Expr::If(it) => (*it).desugar(ctx),
      ast::Expr::Import(it) => (*it).desugar(ctx),
      ast::Expr::ImportStr(it) => (*it).desugar(ctx),
      ast::Expr::Index(it) => (*it).desugar(ctx),
      ast::Expr::InSuper(it) => (*it).desugar(ctx),
      ast::Expr::Local(it) => (*it).desugar(ctx),
      ast::Expr::Null(it) => (*it).desugar(ctx),
      ast::Expr::Number(it) => (*it).desugar(ctx),
      ast::Expr::Object(it) => (*it).desugar(ctx),
      ast::Expr::ObjectApply(it) => (*it).desugar(ctx),
      ast::Expr::ObjectComp(it) => (*it).desugar(ctx),
      ast::Expr::Paren(it) => (*it).desugar(ctx),
      ast::Expr::SelfValue(it) => (*it).desugar(ctx),
      ast::Expr::Slice(it) => (*it).desugar(ctx),
      ast::Expr::String(it) => (*it).desugar(ctx),
      ast::Expr::SuperField(it) => (*it).desugar(ctx),
      ast::Expr::SuperIndex(it) => (*it).desugar(ctx),
      ast::Expr::True(it) => (*it).desugar(ctx),
      ast::Expr::Unary(it) => (*it).desugar(ctx),
    }
  }
}

impl Desugar<CoreExpr> for ast::ExprIdent {
  fn desugar(self, _: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let ident = CoreIdent::new_from(self.token.span, self.token.name);

    Ok(IdentCoreExpr::new_from(span, ident).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprSelf {
  fn desugar(self, _: Ctx) -> Result<CoreExpr, DesugarError> {
    Ok(SelfCoreExpr::new_from(self.token.span).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprDollar {
  fn desugar(self, _: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();

    Ok(IdentCoreExpr::new_from(span, CoreIdent::new_from(self.token.span, ROOT)).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprNull {
  fn desugar(self, _: Ctx) -> Result<CoreExpr, DesugarError> {
    Ok(LiteralCoreExpr::new_null_from(self.token.span).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprTrue {
  fn desugar(self, _: Ctx) -> Result<CoreExpr, DesugarError> {
    Ok(LiteralCoreExpr::new_true_from(self.token.span).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprFalse {
  fn desugar(self, _: Ctx) -> Result<CoreExpr, DesugarError> {
    Ok(LiteralCoreExpr::new_false_from(self.token.span).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprNumber {
  fn desugar(self, _: Ctx) -> Result<CoreExpr, DesugarError> {
    Ok(LiteralCoreExpr::new_number_from(self.token.span, self.token.value).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprString {
  fn desugar(self, _: Ctx) -> Result<CoreExpr, DesugarError> {
    Ok(LiteralCoreExpr::new_str_from(self.token.span, self.token.value).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprParen {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    self.expr.desugar(ctx)
  }
}

impl Desugar<CoreExpr> for ast::ExprError {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let expr = self.expr.desugar(ctx)?;

    Ok(ErrorCoreExpr::new_from(span, expr).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprAssert {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let cond = self.cond.desugar(ctx)?;
    let rest = self.rest.desugar(ctx)?;

    // `assert c; rest` first reads as `assert c : "Assertion failed"; rest`.
    // The message stays unevaluated inside the error node either way.
    let if_false = match self.msg {
      None => ErrorCoreExpr::new_str(ASSERTION_FAILED),
      Some(msg) => ErrorCoreExpr::new(msg.desugar(ctx)?),
    };

    Ok(IfCoreExpr::new_from(span, cond, rest, if_false).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprIf {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let cond = self.cond.desugar(ctx)?;
    let if_true = self.if_true.desugar(ctx)?;
    let if_false = match self.if_false {
      None => LiteralCoreExpr::new_null().into_expr(),
      Some(e) => e.desugar(ctx)?,
    };

    Ok(IfCoreExpr::new_from(span, cond, if_true, if_false).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprFunction {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let params = self
      .params
      .into_iter()
      .map(|p| p.desugar(ctx))
      .collect::<Result<Vec<_>, _>>()?;
    let body = self.body.desugar(ctx)?;

    Ok(FunctionCoreExpr::new_from(span, params, body).into_expr())
  }
}

impl Desugar<CoreFunctionParam> for ast::Param {
  fn desugar(self, ctx: Ctx) -> Result<CoreFunctionParam, DesugarError> {
    let span = self.span();
    let name = CoreIdent::new_from(self.name.span, self.name.name);
    let default_value = match self.default_value {
      None => param_not_bound_expr(),
      Some(e) => e.desugar(ctx)?,
    };

    Ok(CoreFunctionParam::new_from(span, name, default_value))
  }
}

impl Desugar<CoreExpr> for ast::ExprImport {
  fn desugar(self, _: Ctx) -> Result<CoreExpr, DesugarError> {
    Err(DesugarError::Import { span: self.span() })
  }
}

impl Desugar<CoreExpr> for ast::ExprImportStr {
  fn desugar(self, _: Ctx) -> Result<CoreExpr, DesugarError> {
    Err(DesugarError::ImportStr { span: self.span() })
  }
}

impl Desugar<CoreExpr> for ast::ExprLocal {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let binds = self
      .binds
      .into_iter()
      .map(|b| b.desugar(ctx))
      .collect::<Result<Vec<_>, _>>()?;
    let rest = self.body.desugar(ctx)?;

    Ok(LocalCoreExpr::new_from(span, binds, rest).into_expr())
  }
}

impl Desugar<CoreLocalBind> for ast::Bind {
  fn desugar(self, ctx: Ctx) -> Result<CoreLocalBind, DesugarError> {
    match self {
      ast::Bind::Value(it) => (*it).desugar(ctx),
      ast::Bind::Function(it) => (*it).desugar(ctx),
    }
  }
}

impl Desugar<CoreLocalBind> for ast::BindValue {
  fn desugar(self, ctx: Ctx) -> Result<CoreLocalBind, DesugarError> {
    let span = self.span();
    let ident = CoreIdent::new_from(self.name.span, self.name.name);
    let value = self.body.desugar(ctx)?;

    Ok(CoreLocalBind::new_from(span, ident, value))
  }
}

impl Desugar<CoreLocalBind> for ast::BindFunction {
  fn desugar(self, ctx: Ctx) -> Result<CoreLocalBind, DesugarError> {
    let span = self.span();
    let ident = CoreIdent::new_from(self.name.span, self.name.name);
    let params = self
      .params
      .into_iter()
      .map(|p| p.desugar(ctx))
      .collect::<Result<Vec<_>, _>>()?;
    let body = self.body.desugar(ctx)?;
    let value = FunctionCoreExpr::new_from(span, params, body).into_expr();

    Ok(CoreLocalBind::new_from(span, ident, value))
  }
}

impl Desugar<CoreExpr> for ast::ExprUnary {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let op = CoreUnaryOperator::from_token(&self.operator);
    let expr = self.expr.desugar(ctx)?;

    Ok(UnaryCoreExpr::new_from(span, op, expr).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprBinary {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    use ast::BinaryOperator as Op;

    let span = self.span();
    let lhs = self.left.desugar(ctx)?;
    let rhs = self.right.desugar(ctx)?;

    Ok(match self.op {
      Op::NotEqual(_) => UnaryCoreExpr::new_from(
        span,
        CoreUnaryOperator::not(),
        call_std_function("equals", vec![lhs, rhs]),
      )
      .into_expr(),

      Op::Equal(_) => call_std_function("equals", vec![lhs, rhs]).with_span(span),

      Op::Mod(_) => call_std_function("mod", vec![lhs, rhs]).with_span(span),

      // The object operand goes first and hidden fields are included.
      Op::In(_) => call_std_function(
        "objectHasEx",
        vec![rhs, lhs, LiteralCoreExpr::new_true().into_expr()],
      )
      .with_span(span),

      op => match CoreBinaryOperator::from_token(&op) {
        Some(op) => BinaryCoreExpr::new_from(span, lhs, op, rhs).into_expr(),
        // The four rewritten operators are all matched above.
        None => unreachable!("no core form for {:?}", op),
      },
    })
  }
}

impl Desugar<CoreExpr> for ast::ExprIndex {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let target = self.target.desugar(ctx)?;
    let index = self.index.desugar(ctx)?;

    Ok(MemberAccessCoreExpr::new_from(span, target, index).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprFieldAccess {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let target = self.target.desugar(ctx)?;
    let field_name = LiteralCoreExpr::new_str_from(self.field_name.span, self.field_name.name);

    Ok(MemberAccessCoreExpr::new_from(span, target, field_name).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprSlice {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let target = self.target.desugar(ctx)?;

    // A missing bound becomes an explicit null argument, never an omitted one.
    let from = match self.begin_index {
      None => LiteralCoreExpr::new_null().into_expr(),
      Some(e) => e.desugar(ctx)?,
    };
    let to = match self.end_index {
      None => LiteralCoreExpr::new_null().into_expr(),
      Some(e) => e.desugar(ctx)?,
    };
    let step = match self.step {
      None => LiteralCoreExpr::new_null().into_expr(),
      Some(e) => e.desugar(ctx)?,
    };

    Ok(call_std_function("slice", vec![target, from, to, step]).with_span(span))
  }
}

impl Desugar<CoreExpr> for ast::ExprApply {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let target = self.target.desugar(ctx)?;

    let mut positionals = Vec::new();
    let mut named = Vec::new();
    for arg in self.args {
      match arg {
        ast::Argument::Positional(arg) => positionals.push(arg.value.desugar(ctx)?),
        ast::Argument::Named(arg) => {
          let arg_span = arg.span();
          let name = arg.name.name;
          let value = arg.value.desugar(ctx)?;

          named.push(CoreNamedArg::new_from(arg_span, name, value));
        }
      }
    }

    let is_tailstrict = self.tail_strict_token.is_some();

    Ok(ApplyCoreExpr::new_from(span, target, positionals, named, is_tailstrict).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprObjectApply {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let lhs = self.target.desugar(ctx)?;
    let rhs = self.object.desugar(ctx)?;

    Ok(BinaryCoreExpr::new_from(span, lhs, CoreBinaryOperator::plus(), rhs).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprArray {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let items = self
      .items
      .into_iter()
      .map(|item| item.desugar(ctx))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(ArrayCoreExpr::new_from(span, items).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprArrayComp {
  fn desugar(self, _: Ctx) -> Result<CoreExpr, DesugarError> {
    Err(DesugarError::ArrayComp { span: self.span() })
  }
}

impl Desugar<CoreExpr> for ast::ExprObjectComp {
  fn desugar(self, _: Ctx) -> Result<CoreExpr, DesugarError> {
    Err(DesugarError::ObjectComp { span: self.span() })
  }
}

impl Desugar<CoreExpr> for ast::ExprSuperField {
  fn desugar(self, _: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let target = SuperCoreExpr::new_from(self.super_token.span);
    let field_name = LiteralCoreExpr::new_str_from(self.field_name.span, self.field_name.name);

    Ok(MemberAccessCoreExpr::new_from(span, target, field_name).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprSuperIndex {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let target = SuperCoreExpr::new_from(self.super_token.span);
    let index = self.index.desugar(ctx)?;

    Ok(MemberAccessCoreExpr::new_from(span, target, index).into_expr())
  }
}

impl Desugar<CoreExpr> for ast::ExprInSuper {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let span = self.span();
    let key = self.target.desugar(ctx)?;
    let obj = SuperCoreExpr::new_from(self.super_token.span).into_expr();

    Ok(
      call_std_function(
        "objectHasEx",
        vec![obj, key, LiteralCoreExpr::new_true().into_expr()],
      )
      .with_span(span),
    )
  }
}

impl Desugar<CoreExpr> for ast::ExprObject {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    let object = desugar_object_body(self, ctx)?;

    if ctx.in_object {
      // Core self/super always resolve to the innermost enclosing object,
      // so a nested literal must capture the enclosing object's identity
      // before evaluation descends past the nesting boundary. The `$` name
      // space is reserved by the lexer and cannot collide with user code.
      let binds = vec![
        CoreLocalBind::new(CoreIdent::new(OUTER_SELF), SelfCoreExpr::new()),
        CoreLocalBind::new(CoreIdent::new(OUTER_SUPER), SuperCoreExpr::new()),
      ];

      Ok(LocalCoreExpr::new(binds, object).into_expr())
    } else {
      Ok(object.into_expr())
    }
  }
}

fn desugar_object_body(object: ast::ExprObject, ctx: Ctx) -> Result<ObjectCoreExpr, DesugarError> {
  let span = object.span();
  let mut locals = Vec::new();
  let mut asserts = Vec::new();
  let mut values = Vec::new();
  let mut functions = Vec::new();

  for field in object.fields {
    match field {
      ast::ObjectField::Local(it) => locals.push(*it),
      ast::ObjectField::Assert(it) => asserts.push(*it),
      ast::ObjectField::Value(it) => values.push(*it),
      ast::ObjectField::Function(it) => functions.push(*it),
    }
  }

  let mut binds = Vec::with_capacity(locals.len() + 1);
  if !ctx.in_object {
    // `$ = self` gives every member a handle on the object's identity that
    // survives `self` being rebound by object addition at evaluation time.
    // An enclosing object has already established it for nested literals.
    binds.push(CoreLocalBind::new(CoreIdent::new(ROOT), SelfCoreExpr::new()));
  }
  for local in locals {
    binds.push(local.bind.desugar(Ctx::IN_OBJECT)?);
  }

  let asserts = asserts
    .into_iter()
    .map(|assert| desugar_object_assert(assert, &binds))
    .collect::<Result<Vec<_>, _>>()?;

  let mut fields = Vec::with_capacity(values.len() + functions.len());
  for value in values {
    fields.push(desugar_value_field(value, &binds, ctx)?);
  }
  for function in functions {
    fields.push(desugar_function_field(function, &binds, ctx)?);
  }

  Ok(ObjectCoreExpr::new_from(span, asserts, fields))
}

fn desugar_object_assert(
  assert: ast::ObjectFieldAssert,
  binds: &[CoreLocalBind],
) -> Result<CoreExpr, DesugarError> {
  let span = assert.span();
  let cond = assert.cond.desugar(Ctx::IN_OBJECT)?;
  let if_true = LiteralCoreExpr::new_null();
  let if_false = match assert.msg {
    None => ErrorCoreExpr::new_str(ASSERTION_FAILED),
    Some(msg) => ErrorCoreExpr::new(msg.desugar(Ctx::IN_OBJECT)?),
  };

  Ok(in_binds(
    binds,
    IfCoreExpr::new_from(span, cond, if_true, if_false).into_expr(),
  ))
}

fn desugar_value_field(
  field: ast::ObjectFieldValue,
  binds: &[CoreLocalBind],
  ctx: Ctx,
) -> Result<CoreObjectField, DesugarError> {
  let span = field.span();
  if let Some(plus) = field.plus_token {
    return Err(DesugarError::FieldMerge { span: plus.span });
  }

  // Field names are evaluated outside the object; the value is inside.
  let name = field.name.desugar(ctx)?;
  let visibility = CoreFieldVisibility::from_token(&field.op);
  let value = field.value.desugar(Ctx::IN_OBJECT)?;

  Ok(CoreObjectField::new_from(
    span,
    name,
    visibility,
    in_binds(binds, value),
  ))
}

fn desugar_function_field(
  field: ast::ObjectFieldFunction,
  binds: &[CoreLocalBind],
  ctx: Ctx,
) -> Result<CoreObjectField, DesugarError> {
  let span = field.span();
  let name = field.name.desugar(ctx)?;
  let visibility = CoreFieldVisibility::from_token(&field.op);

  let params = field
    .params
    .into_iter()
    .map(|p| p.desugar(Ctx::IN_OBJECT))
    .collect::<Result<Vec<_>, _>>()?;
  let body = field.value.desugar(Ctx::IN_OBJECT)?;
  let value = FunctionCoreExpr::new_from(span, params, body).into_expr();

  Ok(CoreObjectField::new_from(
    span,
    name,
    visibility,
    in_binds(binds, value),
  ))
}

impl Desugar<CoreExpr> for ast::FieldName {
  fn desugar(self, ctx: Ctx) -> Result<CoreExpr, DesugarError> {
    match self {
      ast::FieldName::Ident(it) => {
        Ok(LiteralCoreExpr::new_str_from(it.span, it.name.clone()).into_expr())
      }
      ast::FieldName::String(it) => {
        Ok(LiteralCoreExpr::new_str_from(it.span, it.value.clone()).into_expr())
      }
      ast::FieldName::Computed(it) => it.expr.desugar(ctx),
    }
  }
}

/// Wraps `expr` in the object's binding prologue, making the object locals
/// (and the implicit `$`) visible to it.
fn in_binds(binds: &[CoreLocalBind], expr: CoreExpr) -> CoreExpr {
  if binds.is_empty() {
    expr
  } else {
    LocalCoreExpr::new(binds.iter().cloned(), expr).into_expr()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use jsonnet_surface::ast::*;
  use jsonnet_surface::{
    Assert as AssertToken, Assign, Colon, Dot, Dollar as DollarToken, FileId, For as ForToken,
    Function as FunctionToken, Ident as IdentToken, If as IfToken, Import as ImportToken,
    ImportStr as ImportStrToken, In as InToken, LeftBrace, LeftBracket, LeftParen,
    Local as LocalToken, Number as NumberToken, Plus as PlusToken, RightBrace, RightBracket,
    RightParen, SemiColon, Span, Str, StringKind, Super as SuperToken, TailStrict, Then,
  };
  use test_case::test_case;

  fn ident(name: &str) -> Expr {
    ExprIdent {
      token: IdentToken::new(name, Span::SYNTHETIC),
    }
    .into()
  }

  fn num(value: f64) -> Expr {
    ExprNumber {
      token: NumberToken::new(value, Span::SYNTHETIC),
    }
    .into()
  }

  fn string(value: &str) -> Expr {
    ExprString {
      token: Str::new(value, StringKind::Double, Span::SYNTHETIC),
    }
    .into()
  }

  fn bin(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    ExprBinary { left, op, right }.into()
  }

  fn object(fields: Vec<ObjectField>) -> ExprObject {
    ExprObject {
      left_brace_token: LeftBrace::synthetic(),
      fields,
      right_brace_token: RightBrace::synthetic(),
    }
  }

  fn value_field(name: &str, value: Expr) -> ObjectField {
    ObjectFieldValue {
      name: IdentToken::new(name, Span::SYNTHETIC).into(),
      plus_token: None,
      op: FieldVisibility::Default(Colon::synthetic()),
      value,
    }
    .into()
  }

  fn param(name: &str, default_value: Option<Expr>) -> Param {
    Param {
      name: IdentToken::new(name, Span::SYNTHETIC),
      assign_token: default_value.as_ref().map(|_| Assign::synthetic()),
      default_value,
    }
  }

  fn local_bind(name: &str, body: Expr) -> Bind {
    BindValue {
      name: IdentToken::new(name, Span::SYNTHETIC),
      assign_token: Assign::synthetic(),
      body,
    }
    .into()
  }

  fn text(expr: Expr) -> String {
    desugar(expr).unwrap().to_string()
  }

  #[test_case(BinaryOperator::Equal(jsonnet_surface::Equal::synthetic()), r#"std["equals"](a, b)"# ; "equal")]
  #[test_case(BinaryOperator::NotEqual(jsonnet_surface::NotEqual::synthetic()), r#"!std["equals"](a, b)"# ; "not equal")]
  #[test_case(BinaryOperator::Mod(jsonnet_surface::Mod::synthetic()), r#"std["mod"](a, b)"# ; "modulo")]
  #[test_case(BinaryOperator::In(InToken::synthetic()), r#"std["objectHasEx"](b, a, true)"# ; "membership")]
  #[test_case(BinaryOperator::Plus(PlusToken::synthetic()), "a + b" ; "plus is untouched")]
  #[test_case(BinaryOperator::Or(jsonnet_surface::Or::synthetic()), "a || b" ; "or is untouched")]
  #[test_case(BinaryOperator::LessThanOrEqual(jsonnet_surface::LessThanOrEqual::synthetic()), "a <= b" ; "comparison is untouched")]
  #[test_case(BinaryOperator::ShiftLeft(jsonnet_surface::ShiftLeft::synthetic()), "a << b" ; "shift is untouched")]
  fn binary_operator_rewrites(op: BinaryOperator, expected: &str) {
    let expr = bin(ident("a"), op, ident("b"));

    pretty_assertions::assert_eq!(text(expr), expected);
  }

  #[test]
  fn dotted_access_becomes_indexing() {
    let expr: Expr = ExprFieldAccess {
      target: ident("a"),
      dot_token: Dot::synthetic(),
      field_name: IdentToken::new("b", Span::SYNTHETIC),
    }
    .into();

    pretty_assertions::assert_eq!(text(expr), r#"a["b"]"#);
  }

  #[test]
  fn dotted_access_equals_indexing_by_a_string() {
    let dotted: Expr = ExprFieldAccess {
      target: ident("a"),
      dot_token: Dot::synthetic(),
      field_name: IdentToken::new("b", Span::SYNTHETIC),
    }
    .into();
    let indexed: Expr = ExprIndex {
      target: ident("a"),
      left_bracket_token: LeftBracket::synthetic(),
      index: string("b"),
      right_bracket_token: RightBracket::synthetic(),
    }
    .into();

    pretty_assertions::assert_eq!(desugar(dotted).unwrap(), desugar(indexed).unwrap());
  }

  #[test]
  fn computed_indexing_is_untouched() {
    let expr: Expr = ExprIndex {
      target: ident("a"),
      left_bracket_token: LeftBracket::synthetic(),
      index: ident("b"),
      right_bracket_token: RightBracket::synthetic(),
    }
    .into();

    pretty_assertions::assert_eq!(text(expr), "a[b]");
  }

  #[test]
  fn slice_fills_missing_bounds_with_null() {
    let expr: Expr = ExprSlice {
      target: ident("a"),
      left_bracket_token: LeftBracket::synthetic(),
      begin_index: Some(num(1.0)),
      end_colon_token: Some(Colon::synthetic()),
      end_index: None,
      step_colon_token: Some(Colon::synthetic()),
      step: Some(num(2.0)),
      right_bracket_token: RightBracket::synthetic(),
    }
    .into();

    pretty_assertions::assert_eq!(text(expr), r#"std["slice"](a, 1, null, 2)"#);
  }

  #[test]
  fn super_access_lowers_to_member_access() {
    let field: Expr = ExprSuperField {
      super_token: SuperToken::synthetic(),
      dot_token: Dot::synthetic(),
      field_name: IdentToken::new("a", Span::SYNTHETIC),
    }
    .into();
    let index: Expr = ExprSuperIndex {
      super_token: SuperToken::synthetic(),
      left_bracket_token: LeftBracket::synthetic(),
      index: ident("x"),
      right_bracket_token: RightBracket::synthetic(),
    }
    .into();

    pretty_assertions::assert_eq!(text(field), r#"super["a"]"#);
    pretty_assertions::assert_eq!(text(index), "super[x]");
  }

  #[test]
  fn in_super_uses_object_has_ex() {
    let expr: Expr = ExprInSuper {
      target: string("k"),
      in_token: InToken::synthetic(),
      super_token: SuperToken::synthetic(),
    }
    .into();

    pretty_assertions::assert_eq!(text(expr), r#"std["objectHasEx"](super, "k", true)"#);
  }

  #[test]
  fn dollar_becomes_the_root_ident() {
    let expr: Expr = ExprFieldAccess {
      target: ExprDollar {
        token: DollarToken::synthetic(),
      }
      .into(),
      dot_token: Dot::synthetic(),
      field_name: IdentToken::new("a", Span::SYNTHETIC),
    }
    .into();

    pretty_assertions::assert_eq!(text(expr), r#"$["a"]"#);
  }

  #[test]
  fn object_apply_becomes_addition() {
    let expr: Expr = ExprObjectApply {
      target: ident("a"),
      object: object(vec![value_field("b", num(1.0))]),
    }
    .into();

    pretty_assertions::assert_eq!(text(expr), r#"a + {["b"]: (local $ = self; 1)}"#);
  }

  #[test]
  fn if_without_else_returns_null() {
    let expr: Expr = ExprIf {
      if_token: IfToken::synthetic(),
      cond: ident("c"),
      then_token: Then::synthetic(),
      if_true: ident("t"),
      else_token: None,
      if_false: None,
    }
    .into();

    pretty_assertions::assert_eq!(text(expr), "if c then t else null");
  }

  fn assert_expr(msg: Option<Expr>) -> Expr {
    ExprAssert {
      assert_token: AssertToken::synthetic(),
      cond: ident("c"),
      colon_token: msg.as_ref().map(|_| Colon::synthetic()),
      msg,
      semi_colon_token: SemiColon::synthetic(),
      rest: ident("rest"),
    }
    .into()
  }

  #[test]
  fn assert_without_message_gets_the_default() {
    pretty_assertions::assert_eq!(
      text(assert_expr(None)),
      r#"if c then rest else error "Assertion failed""#
    );
  }

  #[test]
  fn assert_message_stays_unevaluated() {
    pretty_assertions::assert_eq!(
      text(assert_expr(Some(string("boom")))),
      r#"if c then rest else error "boom""#
    );
  }

  #[test]
  fn params_without_default_get_an_error_default() {
    let expr: Expr = ExprFunction {
      function_token: FunctionToken::synthetic(),
      left_paren_token: LeftParen::synthetic(),
      params: vec![param("a", None), param("b", Some(num(2.0)))],
      right_paren_token: RightParen::synthetic(),
      body: bin(
        ident("a"),
        BinaryOperator::Plus(PlusToken::synthetic()),
        ident("b"),
      ),
    }
    .into();

    pretty_assertions::assert_eq!(
      text(expr),
      r#"function(a = error "Parameter not bound", b = 2) a + b"#
    );
  }

  #[test]
  fn local_function_binds_desugar_to_functions() {
    let expr: Expr = ExprLocal {
      local_token: LocalToken::synthetic(),
      binds: vec![BindFunction {
        name: IdentToken::new("f", Span::SYNTHETIC),
        left_paren_token: LeftParen::synthetic(),
        params: vec![param("x", None)],
        right_paren_token: RightParen::synthetic(),
        assign_token: Assign::synthetic(),
        body: ident("x"),
      }
      .into()],
      semi_colon_token: SemiColon::synthetic(),
      body: ident("f"),
    }
    .into();

    pretty_assertions::assert_eq!(
      text(expr),
      r#"local f = (function(x = error "Parameter not bound") x); f"#
    );
  }

  #[test]
  fn parens_are_dropped() {
    let expr: Expr = ExprParen {
      left_paren_token: LeftParen::synthetic(),
      expr: ident("a"),
      right_paren_token: RightParen::synthetic(),
    }
    .into();

    pretty_assertions::assert_eq!(text(expr), "a");
  }

  #[test]
  fn apply_keeps_named_args_and_tailstrict() {
    let expr: Expr = ExprApply {
      target: ident("f"),
      left_paren_token: LeftParen::synthetic(),
      args: vec![
        ArgPositional { value: num(1.0) }.into(),
        ArgNamed {
          name: IdentToken::new("b", Span::SYNTHETIC),
          assign_token: Assign::synthetic(),
          value: num(2.0),
        }
        .into(),
      ],
      right_paren_token: RightParen::synthetic(),
      tail_strict_token: Some(TailStrict::synthetic()),
    }
    .into();

    pretty_assertions::assert_eq!(text(expr), "f(1, b=2) tailstrict");
  }

  #[test]
  fn empty_object_stays_empty() {
    pretty_assertions::assert_eq!(text(object(vec![]).into()), "{}");
  }

  #[test]
  fn root_object_binds_the_root_ident() {
    let expr: Expr = object(vec![value_field("a", num(1.0))]).into();

    pretty_assertions::assert_eq!(text(expr), r#"{["a"]: (local $ = self; 1)}"#);
  }

  #[test]
  fn nested_object_captures_the_outer_self_and_super() {
    let inner: Expr = object(vec![value_field(
      "b",
      ExprSuperField {
        super_token: SuperToken::synthetic(),
        dot_token: Dot::synthetic(),
        field_name: IdentToken::new("x", Span::SYNTHETIC),
      }
      .into(),
    )])
    .into();
    let expr: Expr = object(vec![value_field("a", inner)]).into();

    pretty_assertions::assert_eq!(
      text(expr),
      r#"{["a"]: (local $ = self; local $outerself = self, $outersuper = super; {["b"]: super["x"]})}"#
    );
  }

  #[test]
  fn object_locals_prefix_every_member() {
    let fields = vec![
      ObjectFieldLocal {
        local_token: LocalToken::synthetic(),
        bind: local_bind("x", num(1.0)),
      }
      .into(),
      ObjectFieldAssert {
        assert_token: AssertToken::synthetic(),
        cond: ident("x"),
        colon_token: None,
        msg: None,
      }
      .into(),
      value_field("a", ident("x")),
      ObjectFieldFunction {
        name: IdentToken::new("f", Span::SYNTHETIC).into(),
        left_paren_token: LeftParen::synthetic(),
        params: vec![param("p", None)],
        right_paren_token: RightParen::synthetic(),
        op: FieldVisibility::Default(Colon::synthetic()),
        value: ident("x"),
      }
      .into(),
    ];

    pretty_assertions::assert_eq!(
      text(object(fields).into()),
      concat!(
        r#"{assert (local $ = self, x = 1; if x then null else error "Assertion failed"), "#,
        r#"["a"]: (local $ = self, x = 1; x), "#,
        r#"["f"]: (local $ = self, x = 1; function(p = error "Parameter not bound") x)}"#,
      )
    );
  }

  #[test]
  fn field_names_evaluate_outside_the_object_scope() {
    let fields = vec![
      ObjectFieldLocal {
        local_token: LocalToken::synthetic(),
        bind: local_bind("x", num(1.0)),
      }
      .into(),
      ObjectFieldValue {
        name: ComputedFieldName {
          left_bracket_token: LeftBracket::synthetic(),
          expr: ident("x"),
          right_bracket_token: RightBracket::synthetic(),
        }
        .into(),
        plus_token: None,
        op: FieldVisibility::Default(Colon::synthetic()),
        value: num(2.0),
      }
      .into(),
    ];

    // The name sees the enclosing scope, not the object locals.
    pretty_assertions::assert_eq!(
      text(object(fields).into()),
      r#"{[x]: (local $ = self, x = 1; 2)}"#
    );
  }

  #[test]
  fn field_visibility_and_string_names_carry_through() {
    let fields = vec![ObjectFieldValue {
      name: Str::new("a b", StringKind::Double, Span::SYNTHETIC).into(),
      plus_token: None,
      op: FieldVisibility::Hidden(jsonnet_surface::DoubleColon::synthetic()),
      value: num(1.0),
    }
    .into()];

    pretty_assertions::assert_eq!(
      text(object(fields).into()),
      r#"{["a b"]:: (local $ = self; 1)}"#
    );
  }

  #[test]
  fn comprehensions_are_rejected() {
    let f = FileId::next();
    let comp: Expr = ExprArrayComp {
      left_bracket_token: LeftBracket::new(f.span(0..1)),
      expr: ident("x"),
      specs: vec![ForSpec {
        for_token: ForToken::new(f.span(3..6)),
        id: IdentToken::new("x", f.span(7..8)),
        in_token: InToken::new(f.span(9..11)),
        expr: ident("xs"),
      }
      .into()],
      right_bracket_token: RightBracket::new(f.span(14..15)),
    }
    .into();

    // The failure propagates out of nested positions; no partial tree survives.
    let expr: Expr = ExprArray {
      left_bracket_token: LeftBracket::synthetic(),
      items: vec![num(1.0), comp],
      right_bracket_token: RightBracket::synthetic(),
    }
    .into();

    pretty_assertions::assert_eq!(
      desugar(expr).unwrap_err(),
      DesugarError::ArrayComp { span: f.span(0..15) }
    );
  }

  #[test]
  fn object_comprehensions_are_rejected() {
    let expr: Expr = ExprObjectComp {
      left_brace_token: LeftBrace::synthetic(),
      fields: vec![],
      specs: vec![],
      right_brace_token: RightBrace::synthetic(),
    }
    .into();

    assert!(matches!(
      desugar(expr),
      Err(DesugarError::ObjectComp { .. })
    ));
  }

  #[test]
  fn imports_are_rejected() {
    let import: Expr = ExprImport {
      import_token: ImportToken::synthetic(),
      file: Str::new("a.libsonnet", StringKind::Double, Span::SYNTHETIC),
    }
    .into();
    let import_str: Expr = ExprImportStr {
      import_str_token: ImportStrToken::synthetic(),
      file: Str::new("a.txt", StringKind::Double, Span::SYNTHETIC),
    }
    .into();

    assert!(matches!(desugar(import), Err(DesugarError::Import { .. })));
    assert!(matches!(
      desugar(import_str),
      Err(DesugarError::ImportStr { .. })
    ));
  }

  #[test]
  fn merge_fields_are_rejected() {
    let f = FileId::next();
    let fields = vec![ObjectFieldValue {
      name: IdentToken::new("a", Span::SYNTHETIC).into(),
      plus_token: Some(PlusToken::new(f.span(1..2))),
      op: FieldVisibility::Default(Colon::synthetic()),
      value: num(1.0),
    }
    .into()];

    pretty_assertions::assert_eq!(
      desugar(object(fields).into()).unwrap_err(),
      DesugarError::FieldMerge { span: f.span(1..2) }
    );
  }

  #[test]
  fn desugaring_is_deterministic() {
    let expr: Expr = object(vec![value_field(
      "a",
      bin(
        ident("x"),
        BinaryOperator::Mod(jsonnet_surface::Mod::synthetic()),
        num(2.0),
      ),
    )])
    .into();

    pretty_assertions::assert_eq!(desugar(expr.clone()).unwrap(), desugar(expr).unwrap());
  }

  #[test]
  fn synthesized_nodes_carry_no_span() {
    let f = FileId::next();
    let expr: Expr = ExprIf {
      if_token: IfToken::new(f.span(0..2)),
      cond: ExprIdent {
        token: IdentToken::new("c", f.span(3..4)),
      }
      .into(),
      then_token: Then::new(f.span(5..9)),
      if_true: ExprIdent {
        token: IdentToken::new("t", f.span(10..11)),
      }
      .into(),
      else_token: None,
      if_false: None,
    }
    .into();

    let core = match desugar(expr).unwrap() {
      CoreExpr::If(it) => it,
      other => panic!("expected an if expression, got {}", other),
    };

    pretty_assertions::assert_eq!(core.span(), Some(f.span(0..11)));
    match core.if_false() {
      CoreExpr::Literal(lit) => {
        pretty_assertions::assert_eq!(lit.value(), CoreLiteral::Null);
        pretty_assertions::assert_eq!(lit.span(), None);
      }
      other => panic!("expected a synthesized null, got {}", other),
    }
  }
}
