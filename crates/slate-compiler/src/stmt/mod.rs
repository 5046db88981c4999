//! Statement compiler.
//!
//! The [`StmtCompiler`] lowers statements inside a function body or the
//! global setup section. Every statement leaves the stack as it found it,
//! apart from a declaration, which leaves exactly one value: the new
//! variable's slot.
//!
//! Errors do not stop lowering. A failed statement is recorded in the
//! diagnostics and the next one is compiled, so one pass reports as much
//! as possible.
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = StmtCompiler::new(ctx, emitter);
//! compiler.compile(&stmt);
//! ```

mod assign;
mod block;
mod for_stmt;
mod if_stmt;
mod return_stmt;
mod var_decl;
mod while_stmt;

use slate_core::{CompileError, Span};
use slate_ir::{ExprStmt, Stmt};

use crate::bytecode::OpCode;
use crate::context::CompilationContext;
use crate::debug_info::{SourceCodeLocation, StackSlot};
use crate::emit::InstructionEmitter;
use crate::expr::ExprCompiler;

type Result<T> = std::result::Result<T, CompileError>;

/// Lowers statements to instructions.
pub struct StmtCompiler<'a, 'ast> {
    /// Compilation context with symbols and the active scope
    ctx: &'a mut CompilationContext<'ast>,
    /// Instruction emitter
    emitter: &'a mut InstructionEmitter,
}

impl<'a, 'ast> StmtCompiler<'a, 'ast> {
    /// Create a new statement compiler.
    pub fn new(ctx: &'a mut CompilationContext<'ast>, emitter: &'a mut InstructionEmitter) -> Self {
        Self { ctx, emitter }
    }

    /// Compile a statement.
    ///
    /// Errors are recorded rather than returned. The instruction range the
    /// statement produced is recorded in the debug information together
    /// with the variables visible at its start.
    pub fn compile(&mut self, stmt: &Stmt<'ast>) {
        let start = self.emitter.current_offset();
        let stack_layout = if self.emitter.is_blocked() {
            Vec::new()
        } else {
            self.stack_layout()
        };

        let result = match stmt {
            Stmt::Expr(expr_stmt) => self.compile_expr_stmt(expr_stmt),
            Stmt::VarDecl(var_decl) => self.compile_var_decl(var_decl),
            Stmt::Assign(assign) => self.compile_assign(assign),
            Stmt::Return(ret) => self.compile_return(ret),
            Stmt::Break(brk) => self.compile_break(brk),
            Stmt::Block(block) => {
                self.compile_block(block);
                Ok(())
            }
            Stmt::If(if_stmt) => self.compile_if(if_stmt),
            Stmt::While(while_stmt) => self.compile_while(while_stmt),
            Stmt::For(for_stmt) => self.compile_for(for_stmt),
        };

        if let Err(error) = result {
            self.ctx.error(error);
        }
        self.record_statement(start, stmt.span(), stack_layout);
    }

    /// Compile a sequence of statements.
    pub fn compile_all(&mut self, stmts: &[Stmt<'ast>]) {
        for stmt in stmts {
            self.compile(stmt);
        }
    }

    /// Compile an expression statement.
    ///
    /// A value the expression leaves behind is discarded.
    fn compile_expr_stmt(&mut self, expr_stmt: &ExprStmt<'ast>) -> Result<()> {
        let info = self.expr_compiler().compile(&expr_stmt.expr)?;
        if info.has_value {
            self.emitter.emit(OpCode::Pop);
        }
        Ok(())
    }

    fn record_statement(&mut self, start: usize, span: Span, stack_layout: Vec<StackSlot>) {
        if self.emitter.is_blocked() {
            return;
        }
        let location = SourceCodeLocation {
            instructions: start..self.emitter.current_offset(),
            file: self.ctx.current_file.clone(),
            span,
            stack_layout,
        };
        self.ctx.debug_info.record_statement(location);
    }

    fn stack_layout(&self) -> Vec<StackSlot> {
        self.ctx
            .scope
            .params()
            .iter()
            .chain(self.ctx.scope.locals())
            .map(|variable| StackSlot {
                name: variable.name.clone(),
                offset: variable.stack_offset,
                ty: variable.ty.clone(),
            })
            .collect()
    }

    /// Create an expression compiler sharing this compiler's state.
    fn expr_compiler(&mut self) -> ExprCompiler<'_, 'ast> {
        ExprCompiler::new(self.ctx, self.emitter)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the compilation context (immutable).
    pub fn ctx(&self) -> &CompilationContext<'ast> {
        self.ctx
    }

    /// Get the instruction emitter.
    pub fn emitter(&mut self) -> &mut InstructionEmitter {
        self.emitter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompilerOptions;
    use bumpalo::Bump;
    use slate_core::Span;
    use slate_ir::AstBuilder;

    #[test]
    fn expression_values_are_discarded() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::unoptimized());
        let mut emitter = InstructionEmitter::new(false, false);

        StmtCompiler::new(&mut ctx, &mut emitter).compile(&b.expr(b.int(1)));

        let ops: Vec<_> = emitter.instructions().iter().map(|i| i.op).collect();
        assert_eq!(ops, vec![OpCode::Push, OpCode::Pop]);
    }

    #[test]
    fn errors_are_recorded_and_lowering_continues() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::default());
        let mut emitter = InstructionEmitter::new(false, false);

        let stmts = [b.expr(b.var_ref("missing")), b.expr(b.int(2))];
        StmtCompiler::new(&mut ctx, &mut emitter).compile_all(&stmts);

        assert_eq!(ctx.diagnostics.errors().len(), 1);
        assert!(matches!(
            ctx.diagnostics.errors()[0].detail,
            CompileError::UnknownVariable { .. }
        ));
        assert_eq!(emitter.instructions().len(), 2);
    }

    #[test]
    fn statements_record_their_range_and_layout() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.set_file("main.sl");
        ctx.scope.push_frame();
        ctx.scope.declare_local("x", "int", false, Span::default());
        let mut emitter = InstructionEmitter::new(false, false);
        emitter.emit(OpCode::Nop);

        StmtCompiler::new(&mut ctx, &mut emitter).compile(&b.at(7).expr(b.var_ref("x")));

        let location = &ctx.debug_info.statements()[0];
        assert_eq!(location.instructions, 1..3);
        assert_eq!(location.file, "main.sl");
        assert_eq!(location.span.line, 7);
        assert_eq!(location.stack_layout.len(), 1);
        assert_eq!(location.stack_layout[0].name, "x");
    }
}
