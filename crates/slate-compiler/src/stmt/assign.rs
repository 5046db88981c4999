//! Plain and compound assignment.
//!
//! Compound forms read the current value once, apply the operator and
//! store the result through the same path a plain assignment uses.

use slate_core::{CompileError, Value};
use slate_ir::{AssignStmt, Expr, FieldExpr, Ident, IndexExpr};

use super::{Result, StmtCompiler};
use crate::bytecode::OpCode;
use crate::expr::access::{emit_field_load, emit_load, emit_load_slot};
use crate::expr::operators::{binary_opcode, operand_types};
use crate::infer::{FieldAccess, index_type};
use crate::types::{self, INT};

impl<'a, 'ast> StmtCompiler<'a, 'ast> {
    /// Compile an assignment statement.
    pub(super) fn compile_assign(&mut self, assign: &AssignStmt<'ast>) -> Result<()> {
        match &assign.target {
            Expr::Ident(ident) => self.assign_variable(ident, assign),
            Expr::Field(field) => self.assign_field(field, assign),
            Expr::Index(index) => self.assign_index(index, assign),
            other => Err(CompileError::InvalidOperation {
                message: "left side of an assignment must be a variable, field or element"
                    .to_string(),
                span: other.span(),
            }),
        }
    }

    fn assign_variable(&mut self, ident: &Ident<'ast>, assign: &AssignStmt<'ast>) -> Result<()> {
        let Some(variable) = self.ctx.scope.lookup(ident.name).cloned() else {
            return Err(CompileError::UnknownVariable {
                name: ident.name.to_string(),
                span: ident.span,
            });
        };

        if variable.is_heap_indirected {
            emit_load_slot(self.emitter, &variable);
        }
        if !assign.op.is_simple() {
            emit_load(self.emitter, &variable);
        }
        self.lower_assigned_value(assign, &variable.ty)?;

        let slot = Value::Int(variable.stack_offset);
        if variable.is_heap_indirected {
            self.emitter.emit(OpCode::StoreHeap);
        } else if variable.is_global {
            self.emitter.emit_with(OpCode::StoreGlobal, slot);
        } else {
            self.emitter.emit_with(OpCode::StoreLocal, slot);
        }
        self.emitter.tag_last(ident.name);
        Ok(())
    }

    fn assign_field(&mut self, field: &FieldExpr<'ast>, assign: &AssignStmt<'ast>) -> Result<()> {
        let object = self.expr_compiler().compile_value(&field.object)?;
        let access = self.ctx.field_access(&object, &field.field)?;
        let FieldAccess::Field { index, ty } = &access else {
            return Err(CompileError::InvalidOperation {
                message: format!("'{}' is read-only", field.field.name),
                span: field.field.span,
            });
        };

        if !assign.op.is_simple() {
            self.emitter.emit(OpCode::Dup);
            emit_field_load(self.emitter, &access, field.field.name);
        }
        self.lower_assigned_value(assign, ty)?;
        self.emitter.emit_with2(
            OpCode::StoreField,
            Value::Int(*index as i64),
            Value::string(field.field.name),
        );
        Ok(())
    }

    fn assign_index(&mut self, index: &IndexExpr<'ast>, assign: &AssignStmt<'ast>) -> Result<()> {
        let object = self.expr_compiler().compile_value(&index.object)?;
        let element = index_type(&object, index.span)?;
        self.expr_compiler().check(&index.index, INT)?;

        if !assign.op.is_simple() {
            self.emitter.emit_with(OpCode::Pick, Value::Int(1));
            self.emitter.emit_with(OpCode::Pick, Value::Int(1));
            self.emitter.emit(OpCode::LoadIndex);
        }
        self.lower_assigned_value(assign, &element)?;
        self.emitter.emit(OpCode::StoreIndex);
        Ok(())
    }

    /// Push the value to store, applying the compound operator to the
    /// current value already on the stack.
    fn lower_assigned_value(&mut self, assign: &AssignStmt<'ast>, target: &str) -> Result<()> {
        let mut compiler = self.expr_compiler();
        let found = match assign.op.binary_op() {
            Some(op) => {
                let right = compiler.compile_value(&assign.value)?;
                let ty = operand_types(&mut compiler, op, target, &right, assign.span);
                compiler.emitter().emit(binary_opcode(op));
                ty
            }
            None => compiler.compile_owned(&assign.value)?,
        };

        if !types::compatible(target, &found) {
            return Err(CompileError::TypeMismatch {
                expected: target.to_string(),
                found,
                span: assign.value.span(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompilationContext;
    use crate::emit::InstructionEmitter;
    use crate::options::CompilerOptions;
    use crate::symbols::TypeKind;
    use bumpalo::Bump;
    use slate_core::Span;
    use slate_ir::{AssignOp, AstBuilder};

    fn ops(emitter: &InstructionEmitter) -> Vec<OpCode> {
        emitter.instructions().iter().map(|i| i.op).collect()
    }

    #[test]
    fn local_global_and_heap_stores() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.scope.declare_global("g", "int", Span::default()).unwrap();
        ctx.scope.push_frame();
        ctx.scope.declare_local("x", "int", false, Span::default());
        ctx.scope.declare_local("h", "int", true, Span::default());
        let mut emitter = InstructionEmitter::new(false, false);
        let mut compiler = StmtCompiler::new(&mut ctx, &mut emitter);

        compiler.compile(&b.assign(b.var_ref("x"), b.int(1)));
        compiler.compile(&b.assign(b.var_ref("g"), b.int(2)));
        compiler.compile(&b.assign(b.var_ref("h"), b.int(3)));

        assert_eq!(
            ops(&emitter),
            vec![
                OpCode::Push,
                OpCode::StoreLocal,
                OpCode::Push,
                OpCode::StoreGlobal,
                OpCode::LoadLocal,
                OpCode::Push,
                OpCode::StoreHeap,
            ]
        );
        assert!(ctx.diagnostics.errors().is_empty());
    }

    #[test]
    fn compound_assignment_reads_first() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.scope.push_frame();
        ctx.scope.declare_local("n", "int", false, Span::default());
        let mut emitter = InstructionEmitter::new(false, false);

        StmtCompiler::new(&mut ctx, &mut emitter).compile(&b.compound_assign(
            b.var_ref("n"),
            AssignOp::AddAssign,
            b.int(5),
        ));

        assert_eq!(
            ops(&emitter),
            vec![OpCode::LoadLocal, OpCode::Push, OpCode::Add, OpCode::StoreLocal]
        );
    }

    #[test]
    fn field_and_element_targets() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let decl = arena.alloc(b.type_decl("Box", &[("w", "int")], &[]));
        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.symbols.register_type(decl, TypeKind::Class, "m").unwrap();
        ctx.scope.push_frame();
        ctx.scope.declare_local("bx", "Box", false, Span::default());
        ctx.scope.declare_local("xs", "int[]", false, Span::default());
        let mut emitter = InstructionEmitter::new(false, false);
        let mut compiler = StmtCompiler::new(&mut ctx, &mut emitter);

        compiler.compile(&b.compound_assign(
            b.field(b.var_ref("bx"), "w"),
            AssignOp::MulAssign,
            b.int(2),
        ));
        compiler.compile(&b.assign(b.index(b.var_ref("xs"), b.int(0)), b.int(9)));

        assert_eq!(
            ops(&emitter),
            vec![
                OpCode::LoadLocal,
                OpCode::Dup,
                OpCode::LoadField,
                OpCode::Push,
                OpCode::Mul,
                OpCode::StoreField,
                OpCode::LoadLocal,
                OpCode::Push,
                OpCode::Push,
                OpCode::StoreIndex,
            ]
        );
    }

    #[test]
    fn rejected_targets() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.scope.push_frame();
        ctx.scope.declare_local("xs", "int[]", false, Span::default());
        ctx.scope.declare_local("s", "string", false, Span::default());
        let mut emitter = InstructionEmitter::new(false, false);
        let mut compiler = StmtCompiler::new(&mut ctx, &mut emitter);

        compiler.compile(&b.assign(b.int(1), b.int(2)));
        compiler.compile(&b.assign(b.field(b.var_ref("xs"), "Length"), b.int(0)));
        compiler.compile(&b.assign(b.var_ref("s"), b.int(0)));

        let errors = ctx.diagnostics.errors();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0].detail, CompileError::InvalidOperation { .. }));
        assert!(matches!(errors[1].detail, CompileError::InvalidOperation { .. }));
        assert!(matches!(errors[2].detail, CompileError::TypeMismatch { .. }));
    }
}
