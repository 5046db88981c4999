//! Block statements and scope cleanup.

use slate_core::Note;
use slate_ir::Block;

use super::StmtCompiler;

impl<'a, 'ast> StmtCompiler<'a, 'ast> {
    /// Compile a block in its own scope.
    ///
    /// Locals declared in the block are popped when it ends.
    pub fn compile_block(&mut self, block: &Block<'ast>) {
        self.ctx.scope.push_frame();
        self.compile_all(block.stmts);
        self.close_frame();
    }

    /// Close the innermost scope, popping the locals it declared.
    pub fn close_frame(&mut self) {
        let removed = self.ctx.scope.pop_frame();
        if !removed.is_empty() {
            self.emitter.emit_pops(removed.len());
            let names: Vec<&str> = removed.iter().map(|v| v.name.as_str()).collect();
            self.emitter.tag_last(format!("drop {}", names.join(", ")));
        }
    }

    /// Type check a block without emitting it.
    pub(super) fn compile_unreachable(&mut self, block: &Block<'ast>) {
        self.emitter.block();
        self.compile_block(block);
        self.emitter.unblock();
        self.ctx.note(Note::UnreachableCode { span: block.span });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::OpCode;
    use crate::context::CompilationContext;
    use crate::emit::InstructionEmitter;
    use crate::options::CompilerOptions;
    use bumpalo::Bump;
    use slate_ir::AstBuilder;

    #[test]
    fn locals_are_popped_at_block_end() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::unoptimized());
        let mut emitter = InstructionEmitter::new(false, false);

        let block = b.block(&[
            b.var(Some("int"), "a", Some(b.int(1))),
            b.var(Some("int"), "b", Some(b.int(2))),
        ]);
        StmtCompiler::new(&mut ctx, &mut emitter).compile_block(&block);

        let ops: Vec<_> = emitter.instructions().iter().map(|i| i.op).collect();
        assert_eq!(ops, vec![OpCode::Push, OpCode::Push, OpCode::Pop, OpCode::Pop]);
        assert!(ctx.scope.locals().is_empty());
    }

    #[test]
    fn unreachable_blocks_are_still_checked() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::default());
        let mut emitter = InstructionEmitter::new(false, false);

        let block = b.block(&[b.expr(b.var_ref("nope"))]);
        StmtCompiler::new(&mut ctx, &mut emitter).compile_unreachable(&block);

        assert!(emitter.instructions().is_empty());
        assert_eq!(ctx.diagnostics.errors().len(), 1);
        assert_eq!(ctx.diagnostics.notes().len(), 1);
        assert!(ctx.debug_info.statements().is_empty());
    }
}
