//! Variable declarations, local and global.

use slate_core::CompileError;
use slate_ir::VarDeclStmt;

use super::{Result, StmtCompiler};
use crate::bytecode::OpCode;
use crate::types::{self, ANY};

impl<'a, 'ast> StmtCompiler<'a, 'ast> {
    /// Compile a local declaration.
    ///
    /// The initializer's value becomes the variable's slot, so the variable
    /// is declared only after the initializer is lowered. A declaration
    /// always leaves one value on the stack, even when it has errors.
    pub(super) fn compile_var_decl(&mut self, decl: &VarDeclStmt<'ast>) -> Result<()> {
        if let Err(error) = self
            .ctx
            .scope
            .check_redeclaration(decl.name.name, decl.name.span)
        {
            self.ctx.error(error);
        }

        let ty = self.lower_initializer(decl);
        if decl.is_heap {
            self.emitter.emit(OpCode::HeapAlloc);
        }
        self.ctx
            .scope
            .declare_local(decl.name.name, &ty, decl.is_heap, decl.name.span);
        self.emitter.tag_last(decl.name.name);
        Ok(())
    }

    /// Compile a global declaration in the setup section.
    ///
    /// A rejected global's value is popped again so later globals keep
    /// their absolute indices.
    pub fn compile_global(&mut self, decl: &VarDeclStmt<'ast>) {
        let ty = self.lower_initializer(decl);
        match self.ctx.scope.declare_global(decl.name.name, &ty, decl.name.span) {
            Ok(_) => self.emitter.tag_last(decl.name.name),
            Err(error) => {
                self.ctx.error(error);
                self.emitter.emit(OpCode::Pop);
            }
        }
    }

    /// Push the initial value and return the variable's type.
    ///
    /// Exactly one value is pushed on every path.
    fn lower_initializer(&mut self, decl: &VarDeclStmt<'ast>) -> String {
        if let Some(declared) = decl.ty {
            if !self.ctx.symbols.is_known_type(declared) {
                self.ctx.error(CompileError::UnknownType {
                    name: declared.to_string(),
                    span: decl.span,
                });
            }
        }
        let fallback = decl.ty.unwrap_or(ANY).to_string();

        let Some(init) = &decl.init else {
            if decl.ty.is_none() {
                self.ctx.error(CompileError::InvalidOperation {
                    message: format!(
                        "cannot infer the type of '{}' without an initializer",
                        decl.name.name
                    ),
                    span: decl.span,
                });
            }
            self.emitter.emit_push_default(&fallback);
            return fallback;
        };

        let start = self.emitter.current_offset();
        match self.expr_compiler().compile_owned(init) {
            Ok(found) => match decl.ty {
                Some(declared) => {
                    if !types::compatible(declared, &found) {
                        self.ctx.error(CompileError::TypeMismatch {
                            expected: declared.to_string(),
                            found,
                            span: init.span(),
                        });
                    }
                    declared.to_string()
                }
                None => found,
            },
            Err(error) => {
                self.ctx.error(error);
                self.discard_from(start);
                self.emitter.emit_push_default(&fallback);
                fallback
            }
        }
    }

    /// Drop a partly lowered initializer: its instructions, the calls it
    /// left pending and any debug ranges reaching into it.
    fn discard_from(&mut self, start: usize) {
        let removed = self.emitter.truncate(start);
        if removed.is_empty() {
            return;
        }
        self.ctx.backpatch.discard_from(start);
        self.ctx.debug_info.remove_instructions(removed);
    }
}
