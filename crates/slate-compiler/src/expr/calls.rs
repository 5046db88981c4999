//! Function, method and intrinsic calls.
//!
//! A compiled callee is invoked by reserving its return slot, pushing the
//! receiver for methods, pushing the arguments and emitting `Call`. When
//! the callee has no entry instruction yet the call is left unpatched and
//! recorded in the backpatch table.

use slate_core::{CompileError, Value};
use slate_ir::CallExpr;

use super::{ExprCompiler, Result};
use crate::backpatch::CallSite;
use crate::bytecode::{Instruction, OpCode};
use crate::context::CompilationContext;
use crate::emit::InstructionEmitter;
use crate::expr_info::ExprInfo;
use crate::resolve::{CallTarget, ListMethod};
use crate::symbols::FunctionId;
use crate::types::{self, ANY, INT, STRING};

/// Compile a call expression.
pub fn compile_call<'ast>(
    compiler: &mut ExprCompiler<'_, 'ast>,
    call: &'ast CallExpr<'ast>,
) -> Result<ExprInfo> {
    match compiler.ctx.resolve_call(call)? {
        CallTarget::TypeOf => {
            let Some(arg) = call.args.first() else {
                return Err(CompileError::Internal {
                    message: "type() resolved without an argument".to_string(),
                    span: call.span,
                });
            };
            compiler.compile_value(arg)?;
            compiler.emitter.emit(OpCode::TypeOf);
            Ok(ExprInfo::value(STRING))
        }
        CallTarget::List(method) => compile_list_method(compiler, call, method),
        CallTarget::Function(id) => compile_function_call(compiler, call, id, false),
        CallTarget::Method(id) => compile_function_call(compiler, call, id, true),
    }
}

fn compile_list_method<'ast>(
    compiler: &mut ExprCompiler<'_, 'ast>,
    call: &'ast CallExpr<'ast>,
    method: ListMethod,
) -> Result<ExprInfo> {
    let Some(receiver) = &call.receiver else {
        return Err(CompileError::Internal {
            message: format!("list method '{}' without receiver", method.name()),
            span: call.span,
        });
    };
    let list = compiler.compile_value(receiver)?;
    let element = types::element_type(&list).unwrap_or(ANY).to_string();

    match (method, call.args) {
        (ListMethod::Push, [value]) => {
            compiler.check(value, &element)?;
        }
        (ListMethod::Add, [index, value]) => {
            compiler.check(index, INT)?;
            compiler.check(value, &element)?;
        }
        (ListMethod::Remove, [index]) => {
            compiler.check(index, INT)?;
        }
        (ListMethod::Pull, []) => {}
        _ => {
            return Err(CompileError::ArgumentCountMismatch {
                name: method.name().to_string(),
                expected: method.arity(),
                got: call.args.len(),
                span: call.span,
            });
        }
    }

    compiler.emitter.emit(method.opcode());
    if method.yields_value() {
        Ok(ExprInfo::value(element))
    } else {
        Ok(ExprInfo::none())
    }
}

fn compile_function_call<'ast>(
    compiler: &mut ExprCompiler<'_, 'ast>,
    call: &'ast CallExpr<'ast>,
    id: FunctionId,
    is_method: bool,
) -> Result<ExprInfo> {
    let function = compiler.ctx.symbols.function(id);
    let return_type = function.return_type.clone();
    let builtin = function.builtin.clone();
    let slots = function.argument_slots();

    if let Some(name) = builtin {
        for arg in call.args {
            compiler.compile_value(arg)?;
        }
        compiler.emitter.emit_with2(
            OpCode::CallBuiltin,
            Value::Str(name),
            Value::Int(call.args.len() as i64),
        );
        return Ok(ExprInfo::value(return_type));
    }

    compiler.emitter.emit_push_default(&return_type);
    if is_method {
        if let Some(receiver) = &call.receiver {
            compiler.compile_value(receiver)?;
        }
    }
    for arg in call.args {
        compiler.compile_value(arg)?;
    }
    emit_call(compiler.ctx, compiler.emitter, id, CallSite::Expr(call), slots);
    Ok(ExprInfo::value(return_type))
}

/// Emit a `Call` to a compiled function.
///
/// Resolves the displacement now if the callee already has an entry
/// instruction, otherwise records the call for backpatching.
pub(crate) fn emit_call<'ast>(
    ctx: &mut CompilationContext<'ast>,
    emitter: &mut InstructionEmitter,
    id: FunctionId,
    site: CallSite<'ast>,
    slots: usize,
) -> Option<usize> {
    let function = ctx.symbols.function(id);
    let readable = function.readable.clone();
    let entry = function.entry;
    let index = emitter.current_offset();
    let argc = Value::Int(slots as i64);

    let emitted = match entry {
        Some(entry) => emitter.emit_with2(
            OpCode::Call,
            Value::Int(entry as i64 - index as i64),
            argc,
        ),
        None => {
            let instruction = Instruction {
                operand1: Some(argc),
                ..Instruction::new(OpCode::Call)
            };
            let emitted = emitter.emit_instruction(instruction);
            if let Some(at) = emitted {
                ctx.backpatch
                    .record(at, site, readable.clone(), &ctx.scope, &ctx.current_file);
            }
            emitted
        }
    };
    emitter.tag_last(readable);
    emitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompilerOptions;
    use bumpalo::Bump;
    use slate_core::Span;
    use slate_ir::AstBuilder;

    fn ops(emitter: &InstructionEmitter) -> Vec<OpCode> {
        emitter.instructions().iter().map(|i| i.op).collect()
    }

    #[test]
    fn forward_call_is_recorded() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let callee = arena.alloc(b.function("later", &[("v", "int")], "int", &[]));

        let mut ctx = CompilationContext::new(CompilerOptions::unoptimized());
        ctx.symbols.register_function(callee, "main.sl").unwrap();
        let mut emitter = InstructionEmitter::new(false, false);

        let info = ExprCompiler::new(&mut ctx, &mut emitter)
            .compile(&b.call("later", &[b.int(4)]))
            .unwrap();

        assert_eq!(info.ty, "int");
        assert_eq!(ops(&emitter), vec![OpCode::PushDefault, OpCode::Push, OpCode::Call]);
        assert_eq!(emitter.instructions()[2].operand0, None);
        assert_eq!(ctx.backpatch.len(), 1);
        assert_eq!(ctx.backpatch.pending()[0].instruction, 2);
    }

    #[test]
    fn known_entry_is_patched_immediately() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let callee = arena.alloc(b.function("early", &[], "void", &[]));

        let mut ctx = CompilationContext::new(CompilerOptions::default());
        let id = ctx.symbols.register_function(callee, "main.sl").unwrap();
        ctx.symbols.set_entry(id, 0);

        let mut emitter = InstructionEmitter::new(false, false);
        emitter.emit(OpCode::Nop);
        ExprCompiler::new(&mut ctx, &mut emitter)
            .compile(&b.call("early", &[]))
            .unwrap();

        let call = &emitter.instructions()[2];
        assert_eq!(call.op, OpCode::Call);
        assert_eq!(call.target(2), Some(0));
        assert!(ctx.backpatch.is_empty());
    }

    #[test]
    fn builtins_use_call_builtin() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.symbols
            .register_builtin("print", "void", &["string"], "main.sl", Span::default())
            .unwrap();
        let mut emitter = InstructionEmitter::new(false, false);

        ExprCompiler::new(&mut ctx, &mut emitter)
            .compile(&b.call("print", &[b.str("hi")]))
            .unwrap();

        assert_eq!(ops(&emitter), vec![OpCode::Push, OpCode::CallBuiltin]);
        assert_eq!(emitter.instructions()[1].operand0, Some(Value::string("print")));
    }

    #[test]
    fn method_call_pushes_receiver() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let scale = b.function("scale", &[("by", "int")], "void", &[]);
        let decl = arena.alloc(b.type_decl("Shape", &[], &[scale]));

        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.symbols
            .register_type(decl, crate::symbols::TypeKind::Class, "m")
            .unwrap();
        ctx.scope.push_frame();
        ctx.scope.declare_local("s", "Shape", false, Span::default());
        let mut emitter = InstructionEmitter::new(false, false);

        ExprCompiler::new(&mut ctx, &mut emitter)
            .compile(&b.method_call(b.var_ref("s"), "scale", &[b.int(2)]))
            .unwrap();

        assert_eq!(
            ops(&emitter),
            vec![OpCode::PushDefault, OpCode::LoadLocal, OpCode::Push, OpCode::Call]
        );
        assert_eq!(emitter.instructions()[3].operand1, Some(Value::Int(2)));
    }

    #[test]
    fn list_methods() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.scope.push_frame();
        ctx.scope.declare_local("xs", "int[]", false, Span::default());
        let mut emitter = InstructionEmitter::new(false, false);
        let mut compiler = ExprCompiler::new(&mut ctx, &mut emitter);

        let push = compiler
            .compile(&b.method_call(b.var_ref("xs"), "Push", &[b.int(1)]))
            .unwrap();
        assert!(!push.has_value);

        let pull = compiler
            .compile(&b.method_call(b.var_ref("xs"), "Pull", &[]))
            .unwrap();
        assert_eq!(pull, ExprInfo::value("int"));

        let bad = compiler.compile(&b.method_call(b.var_ref("xs"), "Push", &[b.str("no")]));
        assert!(matches!(bad, Err(CompileError::TypeMismatch { .. })));

        assert_eq!(
            ops(&emitter)[..6],
            [
                OpCode::LoadLocal,
                OpCode::Push,
                OpCode::ListPush,
                OpCode::LoadLocal,
                OpCode::ListPull,
                OpCode::LoadLocal,
            ]
        );
    }
}
