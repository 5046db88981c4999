//! Expression compiler.
//!
//! The [`ExprCompiler`] lowers one expression tree, leaving its value on
//! the stack, and returns its static type. Types come from the same rules
//! as [`CompilationContext::infer`], so lowering and inference agree.
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = ExprCompiler::new(ctx, emitter);
//! let ty = compiler.check(&expr, "int")?;
//! ```

pub(crate) mod access;
pub(crate) mod calls;
pub(crate) mod construct;
pub(crate) mod operators;

use slate_core::CompileError;
use slate_ir::Expr;

use crate::bytecode::OpCode;
use crate::context::CompilationContext;
use crate::emit::InstructionEmitter;
use crate::expr_info::ExprInfo;
use crate::types;

type Result<T> = std::result::Result<T, CompileError>;

/// Lowers expressions to instructions.
pub struct ExprCompiler<'a, 'ast> {
    /// Compilation context with symbols and the active scope
    ctx: &'a mut CompilationContext<'ast>,
    /// Instruction emitter
    emitter: &'a mut InstructionEmitter,
}

impl<'a, 'ast> ExprCompiler<'a, 'ast> {
    /// Create a new expression compiler.
    pub fn new(ctx: &'a mut CompilationContext<'ast>, emitter: &'a mut InstructionEmitter) -> Self {
        Self { ctx, emitter }
    }

    /// Lower an expression.
    pub fn compile(&mut self, expr: &Expr<'ast>) -> Result<ExprInfo> {
        match expr {
            Expr::Literal(literal) => {
                self.emitter.emit_push(literal.kind.to_value());
                Ok(ExprInfo::value(crate::infer::literal_type(&literal.kind)))
            }
            Expr::Ident(ident) => access::compile_ident(self, ident),
            Expr::Field(field) => access::compile_field(self, field),
            Expr::Index(index) => access::compile_index(self, index),
            Expr::Binary(binary) => operators::compile_binary(self, expr, binary),
            Expr::Unary(unary) => operators::compile_unary(self, expr, unary),
            Expr::Call(call) => calls::compile_call(self, *call),
            Expr::New(new) => construct::compile_new(self, *new),
            Expr::List(list) => construct::compile_list(self, list),
        }
    }

    /// Lower an expression that must leave a value.
    pub fn compile_value(&mut self, expr: &Expr<'ast>) -> Result<String> {
        let info = self.compile(expr)?;
        if !info.has_value {
            return Err(CompileError::InvalidOperation {
                message: "expression does not produce a value".to_string(),
                span: expr.span(),
            });
        }
        Ok(info.ty)
    }

    /// Lower an expression and require its type to be usable as `expected`.
    pub fn check(&mut self, expr: &Expr<'ast>, expected: &str) -> Result<String> {
        let found = self.compile_value(expr)?;
        if !types::compatible(expected, &found) {
            return Err(CompileError::TypeMismatch {
                expected: expected.to_string(),
                found,
                span: expr.span(),
            });
        }
        Ok(found)
    }

    /// Lower a value that is about to be stored.
    ///
    /// Structs are values: a struct read from existing storage is copied so
    /// the store does not alias it. Fresh results of `new` and calls are
    /// stored as they are.
    pub fn compile_owned(&mut self, expr: &Expr<'ast>) -> Result<String> {
        let ty = self.compile_value(expr)?;
        let fresh = matches!(expr, Expr::New(_) | Expr::Call(_));
        if !fresh && self.ctx.symbols.resolve_struct(&ty).is_some() {
            self.emitter.emit(OpCode::Copy);
        }
        Ok(ty)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the compilation context (immutable).
    pub fn ctx(&self) -> &CompilationContext<'ast> {
        self.ctx
    }

    /// Get the compilation context (mutable).
    pub fn ctx_mut(&mut self) -> &mut CompilationContext<'ast> {
        self.ctx
    }

    /// Get the instruction emitter.
    pub fn emitter(&mut self) -> &mut InstructionEmitter {
        self.emitter
    }
}
