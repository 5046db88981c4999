//! Function compiler for lowering one function body.
//!
//! This module provides [`FunctionCompiler`] which emits a single
//! function's instructions into the program's shared buffer. It handles:
//!
//! - Recording the entry instruction before the body, so recursive and
//!   later calls resolve directly
//! - Binding parameters (and `this` for methods) to negative offsets
//! - Lowering the body with [`StmtCompiler`]
//! - Funnelling every `return` into one shared tail
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = FunctionCompiler::new(ctx, emitter, id)?;
//! compiler.setup_parameters();
//! compiler.compile_body();
//! let range = compiler.finish()?;
//! ```

use std::ops::Range;

use slate_core::{CompileError, Value};
use slate_ir::{FunctionDecl, walk};

use crate::bytecode::OpCode;
use crate::context::{CompilationContext, FunctionFrame};
use crate::debug_info::FunctionInformation;
use crate::emit::InstructionEmitter;
use crate::stmt::StmtCompiler;
use crate::symbols::FunctionId;

type Result<T> = std::result::Result<T, CompileError>;

/// Lowers a single function body.
pub struct FunctionCompiler<'a, 'ast> {
    /// Compilation context with symbols and the active scope
    ctx: &'a mut CompilationContext<'ast>,
    /// Shared instruction emitter
    emitter: &'a mut InstructionEmitter,
    /// The function being compiled
    id: FunctionId,
    /// Its declaration
    decl: &'ast FunctionDecl<'ast>,
    /// Index of the function's first instruction
    entry: usize,
}

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// Start compiling a function at the emitter's current position.
    pub fn new(
        ctx: &'a mut CompilationContext<'ast>,
        emitter: &'a mut InstructionEmitter,
        id: FunctionId,
    ) -> Result<Self> {
        let function = ctx.symbols.function(id);
        let Some(decl) = ctx.symbols.decl(id) else {
            return Err(CompileError::Internal {
                message: format!("'{}' has no body to compile", function.readable),
                span: function.span,
            });
        };
        let file = function.source_file.clone();
        let header = match &function.owner {
            Some(owner) => format!("{}.{}", owner, function.readable),
            None => function.readable.clone(),
        };
        ctx.set_file(&file);

        let entry = emitter.current_offset();
        ctx.symbols.set_entry(id, entry);
        emitter.comment(header);
        tracing::debug!(function = %ctx.symbols.function(id).readable, entry, "compiling function");

        Ok(Self {
            ctx,
            emitter,
            id,
            decl,
            entry,
        })
    }

    /// Bind parameters and open the function frame.
    ///
    /// Two parameters with the same name are reported; the later one
    /// shadows the earlier.
    pub fn setup_parameters(&mut self) {
        let params = self.decl.params;
        for (i, param) in params.iter().enumerate() {
            if let Some(original) = params[..i].iter().find(|p| p.name.name == param.name.name) {
                self.ctx.error(CompileError::VariableRedeclaration {
                    name: param.name.name.to_string(),
                    original_span: original.name.span,
                    new_span: param.name.span,
                });
            }
        }

        let function = self.ctx.symbols.function(self.id);
        let owner = function.owner.clone();
        let return_type = function.return_type.clone();
        self.ctx.scope.begin_function(
            owner.as_deref(),
            params.iter().map(|p| (p.name.name, p.ty)),
            self.decl.span,
        );
        self.ctx.symbols.function_mut(self.id).frame_size =
            walk::count_declarations(&self.decl.body);
        self.ctx.begin_function(FunctionFrame {
            id: self.id,
            param_count: params.len(),
            is_method: owner.is_some(),
            return_type,
            return_labels: Vec::new(),
        });
    }

    /// Lower the body.
    ///
    /// Falling off the end pops the body's locals and returns the default
    /// value the caller reserved.
    pub fn compile_body(&mut self) {
        let mut stmts = StmtCompiler::new(self.ctx, self.emitter);
        stmts.compile_block(&self.decl.body);
    }

    /// Emit the shared tail and record the function's debug information.
    ///
    /// Returns the function's instruction range.
    pub fn finish(self) -> Result<Range<usize>> {
        let Some(frame) = self.ctx.end_function() else {
            return Err(CompileError::Internal {
                message: "function frame was not opened".to_string(),
                span: self.decl.span,
            });
        };

        let tail = self.emitter.current_offset();
        for label in &frame.return_labels {
            self.emitter.patch_jump_to(*label, tail);
        }
        self.emitter
            .emit_with(OpCode::Return, Value::Int(frame.argument_slots() as i64));

        let function = self.ctx.symbols.function(self.id);
        let range = self.entry..self.emitter.current_offset();
        self.ctx.debug_info.record_function(FunctionInformation {
            instructions: range.clone(),
            identifier: function.offset_key(),
            readable_signature: function.readable.clone(),
            file: function.source_file.clone(),
        });
        Ok(range)
    }

    /// The function being compiled.
    pub fn id(&self) -> FunctionId {
        self.id
    }
}

/// Compile a whole function: parameters, body and tail.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_function<'ast>(
    ctx: &mut CompilationContext<'ast>,
    emitter: &mut InstructionEmitter,
    id: FunctionId,
) -> Result<Range<usize>> {
    let mut compiler = FunctionCompiler::new(ctx, emitter, id)?;
    compiler.setup_parameters();
    compiler.compile_body();
    compiler.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompilerOptions;
    use bumpalo::Bump;
    use slate_ir::AstBuilder;

    fn ops(emitter: &InstructionEmitter) -> Vec<OpCode> {
        emitter.instructions().iter().map(|i| i.op).collect()
    }

    #[test]
    fn returns_share_one_tail() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let body = [
            b.var(Some("int"), "a", Some(b.var_ref("x"))),
            b.if_(b.var_ref("flag"), &[b.ret(Some(b.var_ref("a")))], None),
            b.ret(Some(b.int(0))),
        ];
        let decl = arena.alloc(b.function(
            "pick",
            &[("x", "int"), ("flag", "bool")],
            "int",
            &body,
        ));

        let mut ctx = CompilationContext::new(CompilerOptions::default());
        let id = ctx.symbols.register_function(decl, "main.sl").unwrap();
        let mut emitter = InstructionEmitter::new(false, false);
        let range = compile_function(&mut ctx, &mut emitter, id).unwrap();

        assert!(ctx.diagnostics.errors().is_empty());
        assert_eq!(
            ops(&emitter),
            vec![
                OpCode::LoadLocal,   // a = x
                OpCode::LoadLocal,   // flag
                OpCode::JumpIfFalse,
                OpCode::LoadLocal,   // return a
                OpCode::StoreLocal,
                OpCode::Pop,
                OpCode::Jump,
                OpCode::Push,        // return 0
                OpCode::StoreLocal,
                OpCode::Pop,
                OpCode::Jump,
                OpCode::Pop,         // fall-through cleanup
                OpCode::Return,
            ]
        );
        let code = emitter.instructions();
        assert_eq!(code[0].int_operand(), Some(-3));
        assert_eq!(code[4].int_operand(), Some(-4));
        assert_eq!(code[6].target(6), Some(12));
        assert_eq!(code[10].target(10), Some(12));
        assert_eq!(code[12].int_operand(), Some(2));
        assert_eq!(range, 0..13);
        assert_eq!(ctx.symbols.function(id).entry, Some(0));
        assert_eq!(ctx.symbols.function(id).frame_size, 1);
        assert_eq!(ctx.debug_info.functions()[0].identifier, "pick,int,bool");
    }

    #[test]
    fn methods_see_this() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let get = b.function("get", &[], "int", &[b.ret(Some(b.field(b.var_ref("this"), "n")))]);
        let decl = arena.alloc(b.type_decl("Counter", &[("n", "int")], &[get]));

        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.symbols
            .register_type(decl, crate::symbols::TypeKind::Class, "main.sl")
            .unwrap();
        let id = ctx.symbols.resolve_type("Counter").unwrap().method("get").unwrap();
        let mut emitter = InstructionEmitter::new(false, false);
        compile_function(&mut ctx, &mut emitter, id).unwrap();

        let code = emitter.instructions();
        assert_eq!(code[0].op, OpCode::LoadLocal);
        assert_eq!(code[0].int_operand(), Some(-2));
        assert_eq!(code[2].op, OpCode::StoreLocal);
        assert_eq!(code[2].int_operand(), Some(-3));
        assert_eq!(code.last().unwrap().int_operand(), Some(1));
    }

    #[test]
    fn duplicate_parameter_names() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let decl = arena.alloc(b.function("f", &[("a", "int"), ("a", "int")], "void", &[]));

        let mut ctx = CompilationContext::new(CompilerOptions::default());
        let id = ctx.symbols.register_function(decl, "main.sl").unwrap();
        let mut emitter = InstructionEmitter::new(false, false);
        compile_function(&mut ctx, &mut emitter, id).unwrap();

        assert!(matches!(
            ctx.diagnostics.errors()[0].detail,
            CompileError::VariableRedeclaration { .. }
        ));
        assert_eq!(ops(&emitter), vec![OpCode::Return]);
    }

    #[test]
    fn comments_name_the_function() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let decl = arena.alloc(b.function("main", &[], "void", &[]));

        let mut ctx = CompilationContext::new(CompilerOptions::default());
        let id = ctx.symbols.register_function(decl, "main.sl").unwrap();
        let mut emitter = InstructionEmitter::new(true, false);
        compile_function(&mut ctx, &mut emitter, id).unwrap();

        assert_eq!(ops(&emitter), vec![OpCode::Comment, OpCode::Return]);
        assert_eq!(emitter.instructions()[0].operand0, Some(Value::string("main()")));
    }
}
