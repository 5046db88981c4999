//! Static type inference over expressions.
//!
//! [`CompilationContext::infer`] is total over the expression variants and
//! reads the symbol and variable tables only, so it can be called as often
//! as argument matching and overload keys need it.

use slate_core::{CompileError, Span};
use slate_ir::{BinaryOp, Expr, Ident, LiteralKind, UnaryOp};

use crate::context::CompilationContext;
use crate::resolve::CallTarget;
use crate::types::{self, ANY, BOOL, FLOAT, INT, STRING, VOID};

/// Built-in read-only field on strings and lists.
pub const LENGTH: &str = "Length";

/// How a field access is carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAccess {
    /// `Length` of a string or list
    Length,
    /// A declared field of a struct or class
    Field { index: usize, ty: String },
}

impl FieldAccess {
    pub fn ty(&self) -> &str {
        match self {
            FieldAccess::Length => INT,
            FieldAccess::Field { ty, .. } => ty,
        }
    }
}

/// Type of a literal.
pub fn literal_type(kind: &LiteralKind<'_>) -> &'static str {
    match kind {
        LiteralKind::Int(_) => INT,
        LiteralKind::Float(_) => FLOAT,
        LiteralKind::Bool(_) => BOOL,
        LiteralKind::Str(_) => STRING,
    }
}

/// Result type of a binary operator.
///
/// Comparisons yield `bool`. Otherwise both operands must agree; operands
/// of different types yield `any`.
pub fn binary_result_type(op: BinaryOp, left: &str, right: &str) -> String {
    if op.is_comparison() {
        BOOL.to_string()
    } else if left == right {
        left.to_string()
    } else {
        ANY.to_string()
    }
}

impl<'ast> CompilationContext<'ast> {
    /// The static type of an expression.
    pub fn infer(&self, expr: &Expr<'ast>) -> Result<String, CompileError> {
        match expr {
            Expr::Literal(literal) => Ok(literal_type(&literal.kind).to_string()),
            Expr::Ident(ident) => self
                .scope
                .lookup(ident.name)
                .map(|variable| variable.ty.clone())
                .ok_or_else(|| CompileError::UnknownVariable {
                    name: ident.name.to_string(),
                    span: ident.span,
                }),
            Expr::Field(field) => {
                let object = self.infer(&field.object)?;
                Ok(self.field_access(&object, &field.field)?.ty().to_string())
            }
            Expr::Index(index) => {
                let object = self.infer(&index.object)?;
                index_type(&object, index.span)
            }
            Expr::Binary(binary) => {
                let left = self.infer(&binary.left)?;
                let right = self.infer(&binary.right)?;
                Ok(binary_result_type(binary.op, &left, &right))
            }
            Expr::Unary(unary) => match unary.op {
                UnaryOp::Not => Ok(BOOL.to_string()),
                UnaryOp::Neg => self.infer(&unary.operand),
            },
            Expr::Call(call) => match self.resolve_call(call)? {
                CallTarget::TypeOf => Ok(STRING.to_string()),
                CallTarget::List(method) => {
                    if !method.yields_value() {
                        return Ok(VOID.to_string());
                    }
                    let Some(receiver) = &call.receiver else {
                        return Err(CompileError::Internal {
                            message: "list method without receiver".to_string(),
                            span: call.span,
                        });
                    };
                    let list = self.infer(receiver)?;
                    Ok(types::element_type(&list).unwrap_or(ANY).to_string())
                }
                CallTarget::Function(id) | CallTarget::Method(id) => {
                    Ok(self.symbols.function(id).return_type.clone())
                }
            },
            Expr::New(new) => {
                let name = new.type_name.name;
                if self.symbols.resolve_type(name).is_some() {
                    Ok(name.to_string())
                } else {
                    Err(CompileError::UnknownType {
                        name: name.to_string(),
                        span: new.type_name.span,
                    })
                }
            }
            Expr::List(list) => match list.elements.first() {
                Some(first) => Ok(types::list_of(&self.infer(first)?)),
                None => Ok(types::list_of(ANY)),
            },
        }
    }

    /// Resolve a field of a value of type `object`.
    pub fn field_access(&self, object: &str, field: &Ident<'_>) -> Result<FieldAccess, CompileError> {
        if field.name == LENGTH && (object == STRING || types::is_list(object)) {
            return Ok(FieldAccess::Length);
        }
        let Some(ty) = self.symbols.resolve_type(object) else {
            return Err(CompileError::UnknownField {
                type_name: object.to_string(),
                field: field.name.to_string(),
                span: field.span,
            });
        };
        match ty.field(field.name) {
            Some((index, info)) => Ok(FieldAccess::Field {
                index,
                ty: info.ty.clone(),
            }),
            None => Err(CompileError::UnknownField {
                type_name: object.to_string(),
                field: field.name.to_string(),
                span: field.span,
            }),
        }
    }
}

/// Element type produced by indexing a value of type `object`.
pub fn index_type(object: &str, span: Span) -> Result<String, CompileError> {
    if let Some(element) = types::element_type(object) {
        return Ok(element.to_string());
    }
    match object {
        STRING => Ok(STRING.to_string()),
        ANY => Ok(ANY.to_string()),
        _ => Err(CompileError::InvalidOperation {
            message: format!("cannot index a value of type '{}'", object),
            span,
        }),
    }
}
