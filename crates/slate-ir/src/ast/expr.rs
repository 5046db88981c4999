//! Expression nodes.

use slate_core::{Span, Value};

use crate::ast::{BinaryOp, Ident, UnaryOp};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value
    Literal(LiteralExpr<'ast>),
    /// Variable or parameter reference
    Ident(Ident<'ast>),
    /// Field access (`a.b`)
    Field(&'ast FieldExpr<'ast>),
    /// Index access (`a[i]`)
    Index(&'ast IndexExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Function, method or keyword call
    Call(&'ast CallExpr<'ast>),
    /// Struct/class construction
    New(&'ast NewExpr<'ast>),
    /// List literal (`[a, b, c]`)
    List(ListExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::Field(e) => e.span,
            Self::Index(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Call(e) => e.span,
            Self::New(e) => e.span,
            Self::List(e) => e.span,
        }
    }

    /// The call node, if this expression is a call.
    pub fn as_call(&self) -> Option<&'ast CallExpr<'ast>> {
        match self {
            Self::Call(call) => Some(call),
            _ => None,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    /// The literal kind
    pub kind: LiteralKind<'ast>,
    /// Source location
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// Boolean literal
    Bool(bool),
    /// String literal
    Str(&'ast str),
}

impl LiteralKind<'_> {
    /// The value this literal evaluates to.
    pub fn to_value(&self) -> Value {
        match self {
            LiteralKind::Int(v) => Value::Int(*v),
            LiteralKind::Float(v) => Value::float(*v),
            LiteralKind::Bool(v) => Value::Bool(*v),
            LiteralKind::Str(v) => Value::string(*v),
        }
    }
}

/// Field access: `object.field`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldExpr<'ast> {
    /// The object being accessed
    pub object: Expr<'ast>,
    /// The field name
    pub field: Ident<'ast>,
    /// Source location
    pub span: Span,
}

/// Index access: `object[index]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    /// The list or string being indexed
    pub object: Expr<'ast>,
    /// The index
    pub index: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    /// Left operand
    pub left: Expr<'ast>,
    /// Operator
    pub op: BinaryOp,
    /// Right operand
    pub right: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    /// Operator
    pub op: UnaryOp,
    /// Operand
    pub operand: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A call.
///
/// Covers free function calls (`f(x)`), namespace-qualified calls
/// (`math.abs(x)` where `math` is not a variable), method calls
/// (`obj.m(x)`), list pseudo-methods (`items.Push(x)`) and the `type(x)`
/// keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    /// Expression before the dot, if any
    pub receiver: Option<Expr<'ast>>,
    /// Called name
    pub name: Ident<'ast>,
    /// Explicit namespace supplied by the parser (e.g. from `using ... as`)
    pub target_namespace: Option<&'ast str>,
    /// Arguments
    pub args: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// Object construction: `new Point(1, 2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    /// Struct or class name
    pub type_name: Ident<'ast>,
    /// Positional arguments
    pub args: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// A list literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListExpr<'ast> {
    /// Elements in order
    pub elements: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}
