//! Return and break statements.
//!
//! Both leave their scopes early, so they pop the locals that are live at
//! that point before jumping. Returns jump to the function's shared tail,
//! which holds the single `Return` instruction.

use slate_core::{CompileError, Value};
use slate_ir::{BreakStmt, ReturnStmt};

use super::{Result, StmtCompiler};
use crate::bytecode::OpCode;
use crate::types;

impl<'a, 'ast> StmtCompiler<'a, 'ast> {
    /// Compile a return statement.
    ///
    /// The value goes into the caller-reserved return slot. A bare return
    /// leaves the slot at its default.
    pub(super) fn compile_return(&mut self, ret: &ReturnStmt<'ast>) -> Result<()> {
        let Some(frame) = &self.ctx.function else {
            return Err(CompileError::ReturnOutsideFunction { span: ret.span });
        };
        let return_type = frame.return_type.clone();
        let slot = frame.return_slot();

        if let Some(value) = &ret.value {
            let found = self.expr_compiler().compile_owned(value)?;
            if !types::compatible(&return_type, &found) {
                return Err(CompileError::TypeMismatch {
                    expected: return_type,
                    found,
                    span: value.span(),
                });
            }
            self.emitter.emit_with(OpCode::StoreLocal, Value::Int(slot));
            self.emitter.tag_last("return value");
        }

        let live = self.ctx.scope.locals_in_frames_from(0);
        self.emitter.emit_pops(live);
        let label = self.emitter.emit_jump(OpCode::Jump);
        self.emitter.tag_last("return");
        if let Some(frame) = &mut self.ctx.function {
            frame.return_labels.push(label);
        }
        Ok(())
    }

    /// Compile a break statement.
    ///
    /// Only the locals declared inside the loop are popped.
    pub(super) fn compile_break(&mut self, brk: &BreakStmt) -> Result<()> {
        let Some(depth) = self.emitter.loop_scope_depth() else {
            return Err(CompileError::BreakOutsideLoop { span: brk.span });
        };
        let live = self.ctx.scope.locals_in_frames_from(depth);
        self.emitter.emit_pops(live);
        self.emitter.emit_break();
        self.emitter.tag_last("break");
        Ok(())
    }
}
