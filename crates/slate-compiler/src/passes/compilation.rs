//! Compilation Pass (Pass 3) - Lay out the program and lower every body.
//!
//! The pass writes one flat instruction array:
//!
//! ```text
//! ┌──────────────────────┐
//! │ global setup         │  one pushed slot per global, in order
//! ├──────────────────────┤
//! │ entry calls          │  PushDefault ret, Call, Pop per entry function
//! ├──────────────────────┤
//! │ global teardown      │  one Pop per global
//! ├──────────────────────┤
//! │ Exit                 │
//! ├──────────────────────┤
//! │ functions...         │  each ending in the shared return tail
//! └──────────────────────┘
//! ```
//!
//! Calls emitted before their target's entry is known are patched in one
//! sweep once every function has been lowered.

use slate_core::{CompileError, FatalError};
use slate_ir::FunctionAttributes;

use crate::backpatch::{CallSite, resolve_pending_calls};
use crate::bytecode::OpCode;
use crate::context::CompilationContext;
use crate::emit::InstructionEmitter;
use crate::expr::calls::emit_call;
use crate::function_compiler::compile_function;
use crate::passes::registration::GlobalDecl;
use crate::program::CompiledProgram;
use crate::stmt::StmtCompiler;
use crate::symbols::{FunctionId, TypeKind};

/// Pass 3: emit the program.
pub struct CompilationPass<'a, 'ast> {
    ctx: &'a mut CompilationContext<'ast>,
    emitter: InstructionEmitter,
}

impl<'a, 'ast> CompilationPass<'a, 'ast> {
    /// Create a new compilation pass.
    pub fn new(ctx: &'a mut CompilationContext<'ast>) -> Self {
        let emitter =
            InstructionEmitter::new(ctx.options.emit_comments, ctx.options.emit_debug_tags);
        Self { ctx, emitter }
    }

    /// Emit the whole program and move the symbol tables into it.
    ///
    /// Recoverable problems stay in the context's diagnostics; only a call
    /// that cannot be patched aborts.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, globals: &[GlobalDecl<'ast>]) -> Result<CompiledProgram, FatalError> {
        let global_setup_index = self.emitter.current_offset();
        self.emitter.comment("global setup");
        for global in globals {
            self.ctx.set_file(&global.file);
            StmtCompiler::new(self.ctx, &mut self.emitter).compile_global(global.decl);
        }

        self.emit_entry_calls();

        self.emitter.comment("global teardown");
        let global_teardown_index = self.emitter.current_offset();
        self.emitter.emit_pops(self.ctx.scope.globals().len());
        self.emitter.emit(OpCode::Exit);

        let compiled: Vec<FunctionId> = self
            .ctx
            .symbols
            .function_ids()
            .filter(|id| self.ctx.symbols.function(*id).is_compiled())
            .collect();
        for id in &compiled {
            if let Err(error) = compile_function(self.ctx, &mut self.emitter, *id) {
                self.ctx.error(error);
            }
        }

        let mut instructions = self.emitter.finish();
        let patched = resolve_pending_calls(self.ctx, &mut instructions)?;
        tracing::debug!(
            instructions = instructions.len(),
            functions = compiled.len(),
            patched,
            "compilation complete"
        );

        let symbols = std::mem::take(&mut self.ctx.symbols);
        let (functions, types, function_offsets) = symbols.into_parts();
        let (structs, classes): (Vec<_>, Vec<_>) = types
            .into_iter()
            .partition(|ty| ty.kind == TypeKind::Struct);

        Ok(CompiledProgram {
            instructions,
            function_offsets,
            functions,
            structs,
            classes,
            global_setup_index,
            global_teardown_index,
            debug_info: std::mem::take(&mut self.ctx.debug_info),
        })
    }

    /// Call every entry function once, in registration order.
    fn emit_entry_calls(&mut self) {
        let entries: Vec<FunctionId> = self
            .ctx
            .symbols
            .function_ids()
            .filter(|id| {
                let function = self.ctx.symbols.function(*id);
                function.attributes.contains(FunctionAttributes::ENTRY) && function.is_compiled()
            })
            .collect();

        for id in entries {
            let function = self.ctx.symbols.function(id);
            if !function.params.is_empty() || function.is_method() {
                let error = CompileError::InvalidOperation {
                    message: format!(
                        "entry function '{}' must be a free function without parameters",
                        function.readable
                    ),
                    span: function.span,
                };
                let file = function.source_file.clone();
                self.ctx.set_file(&file);
                self.ctx.error(error);
                continue;
            }

            let return_type = function.return_type.clone();
            self.emitter.comment(format!("entry {}", function.readable));
            self.emitter.emit_push_default(&return_type);
            emit_call(self.ctx, &mut self.emitter, id, CallSite::Direct(id), 0);
            self.emitter.emit(OpCode::Pop);
        }
    }
}
