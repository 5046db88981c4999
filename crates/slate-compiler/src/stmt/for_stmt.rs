//! For loops.

use slate_core::CompileWarning;
use slate_ir::{ForStmt, walk};

use super::{Result, StmtCompiler};
use crate::bytecode::OpCode;
use crate::fold;

impl<'a, 'ast> StmtCompiler<'a, 'ast> {
    /// Compile a for loop.
    ///
    /// ```text
    ///     <init>
    /// start:
    ///     <condition>
    ///     JumpIfFalse end
    ///     <body>
    ///     <step>
    ///     Jump start
    /// end:
    ///     Pop (init locals)
    /// ```
    ///
    /// The initializer lives in a scope of its own around the loop, so a
    /// `break` leaves its variables for the final pops.
    pub(super) fn compile_for(&mut self, for_stmt: &ForStmt<'ast>) -> Result<()> {
        let always = match &for_stmt.condition {
            None => true,
            Some(condition) => fold::folds_to_bool(condition, true),
        };
        if always && !walk::body_breaks(&for_stmt.body) {
            self.ctx.warn(CompileWarning::InfiniteLoop {
                span: for_stmt.span,
            });
        }

        self.ctx.scope.push_frame();
        if let Some(init) = &for_stmt.init {
            self.compile(init);
        }

        self.emitter.enter_loop(self.ctx.scope.depth());
        let loop_start = self.emitter.current_offset();
        let exit = match &for_stmt.condition {
            Some(condition) => {
                self.lower_condition(condition);
                let label = self.emitter.emit_jump(OpCode::JumpIfFalse);
                self.emitter.tag_last("loop exit");
                Some(label)
            }
            None => None,
        };

        self.compile_block(&for_stmt.body);
        if let Some(step) = &for_stmt.step {
            self.compile(step);
        }
        self.emitter.emit_jump_back(loop_start);
        if let Some(exit) = exit {
            self.emitter.patch_jump(exit);
        }
        self.emitter.exit_loop();
        self.close_frame();
        Ok(())
    }
}
