//! While loops.

use slate_core::CompileWarning;
use slate_ir::{WhileStmt, walk};

use super::{Result, StmtCompiler};
use crate::bytecode::OpCode;
use crate::fold;

impl<'a, 'ast> StmtCompiler<'a, 'ast> {
    /// Compile a while loop.
    ///
    /// ```text
    /// start:
    ///     <condition>
    ///     JumpIfFalse end
    ///     <body>
    ///     Jump start
    /// end:
    /// ```
    ///
    /// A condition known to be `true` is not emitted when folding is on;
    /// a loop known never to run is checked but not emitted when trimming
    /// is on too.
    pub(super) fn compile_while(&mut self, while_stmt: &WhileStmt<'ast>) -> Result<()> {
        let constant = fold::try_fold(&while_stmt.condition).and_then(|v| v.as_bool());
        if constant == Some(true) && !walk::body_breaks(&while_stmt.body) {
            self.ctx.warn(CompileWarning::InfiniteLoop {
                span: while_stmt.span,
            });
        }

        self.emitter.enter_loop(self.ctx.scope.depth());

        if self.trimmable_condition(&while_stmt.condition) == Some(false) {
            self.compile_unreachable(&while_stmt.body);
            self.emitter.exit_loop();
            return Ok(());
        }

        let loop_start = self.emitter.current_offset();
        let exit = if self.ctx.options.folds_constants() && constant == Some(true) {
            None
        } else {
            self.lower_condition(&while_stmt.condition);
            let label = self.emitter.emit_jump(OpCode::JumpIfFalse);
            self.emitter.tag_last("loop exit");
            Some(label)
        };

        self.compile_block(&while_stmt.body);
        self.emitter.emit_jump_back(loop_start);
        if let Some(exit) = exit {
            self.emitter.patch_jump(exit);
        }
        self.emitter.exit_loop();
        Ok(())
    }
}
