//! If / elseif / else chains.

use slate_ir::{Expr, IfStmt};

use super::{Result, StmtCompiler};
use crate::bytecode::OpCode;
use crate::fold;
use crate::types::BOOL;

impl<'a, 'ast> StmtCompiler<'a, 'ast> {
    /// Compile an if chain.
    ///
    /// With folding and trimming enabled a branch whose condition is
    /// constant `false` is checked but not emitted, and a constant `true`
    /// branch makes everything after it unreachable.
    pub(super) fn compile_if(&mut self, if_stmt: &IfStmt<'ast>) -> Result<()> {
        let mut end_jumps = Vec::new();
        let mut taken = false;
        let count = if_stmt.branches.len();

        for (i, branch) in if_stmt.branches.iter().enumerate() {
            if taken {
                self.compile_unreachable(&branch.body);
                continue;
            }
            match self.trimmable_condition(&branch.condition) {
                Some(false) => {
                    self.compile_unreachable(&branch.body);
                    continue;
                }
                Some(true) => {
                    self.compile_block(&branch.body);
                    taken = true;
                    continue;
                }
                None => {}
            }

            self.lower_condition(&branch.condition);
            let next = self.emitter.emit_jump(OpCode::JumpIfFalse);
            self.compile_block(&branch.body);
            let is_last = i + 1 == count && if_stmt.else_block.is_none();
            if !is_last {
                end_jumps.push(self.emitter.emit_jump(OpCode::Jump));
            }
            self.emitter.patch_jump(next);
        }

        if let Some(else_block) = &if_stmt.else_block {
            if taken {
                self.compile_unreachable(else_block);
            } else {
                self.compile_block(else_block);
            }
        }
        for label in end_jumps {
            self.emitter.patch_jump(label);
        }
        Ok(())
    }

    /// Push a condition, which must be a `bool`.
    ///
    /// A bad condition is recorded and lowering carries on with the body.
    pub(super) fn lower_condition(&mut self, condition: &Expr<'ast>) {
        if let Err(error) = self.expr_compiler().check(condition, BOOL) {
            self.ctx.error(error);
        }
    }

    /// The value of a condition when control flow may be cut on it.
    pub(super) fn trimmable_condition(&self, condition: &Expr<'ast>) -> Option<bool> {
        let options = &self.ctx.options;
        if !(options.folds_constants() && options.trims_unreachable()) {
            return None;
        }
        fold::try_fold(condition)?.as_bool()
    }
}
