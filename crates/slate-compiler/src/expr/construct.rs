//! Object construction and list literals.

use slate_core::{CompileError, Value};
use slate_ir::{ListExpr, NewExpr};

use super::{ExprCompiler, Result};
use crate::backpatch::CallSite;
use crate::bytecode::OpCode;
use crate::expr::calls::emit_call;
use crate::expr_info::ExprInfo;
use crate::symbols::TypeKind;
use crate::types::{self, ANY, VOID, call_id, readable_signature};

/// Name of the class initializer method.
pub const INIT: &str = "init";

/// Compile `new Type(args)`.
///
/// - a builtin constructor hook replaces allocation with `CallBuiltin`
/// - a class with an `init` method gets it called on the fresh object
/// - otherwise the arguments initialise fields in declaration order
pub fn compile_new<'ast>(
    compiler: &mut ExprCompiler<'_, 'ast>,
    new: &'ast NewExpr<'ast>,
) -> Result<ExprInfo> {
    let name = new.type_name.name;
    let arg_types = new
        .args
        .iter()
        .map(|arg| compiler.ctx.infer(arg))
        .collect::<Result<Vec<_>>>()?;

    let Some(ty) = compiler.ctx.symbols.resolve_type(name) else {
        return Err(CompileError::UnknownType {
            name: name.to_string(),
            span: new.type_name.span,
        });
    };
    let hook = ty.builtin_constructor.clone();
    let kind = ty.kind;
    let field_types: Vec<String> = ty.fields.iter().map(|f| f.ty.clone()).collect();
    let init = ty.method(&call_id(INIT, &arg_types));
    let has_init = ty
        .methods
        .values()
        .any(|id| compiler.ctx.symbols.function(*id).name == INIT);

    if let Some(hook) = hook {
        for arg in new.args {
            compiler.compile_value(arg)?;
        }
        compiler.emitter.emit_with2(
            OpCode::CallBuiltin,
            Value::Str(hook),
            Value::Int(new.args.len() as i64),
        );
        return Ok(ExprInfo::value(name));
    }

    if kind == TypeKind::Class && has_init {
        let Some(init) = init else {
            return Err(CompileError::UnknownMethod {
                type_name: name.to_string(),
                signature: readable_signature(INIT, &arg_types),
                span: new.span,
            });
        };
        let slots = compiler.ctx.symbols.function(init).argument_slots();
        compiler
            .emitter
            .emit_with2(OpCode::New, Value::string(name), Value::Int(0));
        compiler.emitter.emit_push_default(VOID);
        compiler.emitter.emit_with(OpCode::Pick, Value::Int(1));
        for arg in new.args {
            compiler.compile_value(arg)?;
        }
        emit_call(compiler.ctx, compiler.emitter, init, CallSite::Direct(init), slots);
        compiler.emitter.emit(OpCode::Pop);
        return Ok(ExprInfo::value(name));
    }

    if new.args.len() > field_types.len() {
        return Err(CompileError::ArgumentCountMismatch {
            name: name.to_string(),
            expected: field_types.len(),
            got: new.args.len(),
            span: new.span,
        });
    }
    for (arg, field_type) in new.args.iter().zip(&field_types) {
        compiler.check(arg, field_type)?;
    }
    compiler.emitter.emit_with2(
        OpCode::New,
        Value::string(name),
        Value::Int(new.args.len() as i64),
    );
    Ok(ExprInfo::value(name))
}

/// Compile a list literal.
///
/// All elements must have the type of the first one.
pub fn compile_list<'ast>(
    compiler: &mut ExprCompiler<'_, 'ast>,
    list: &ListExpr<'ast>,
) -> Result<ExprInfo> {
    let element_types = list
        .elements
        .iter()
        .map(|element| compiler.ctx.infer(element))
        .collect::<Result<Vec<_>>>()?;
    let element_type = element_types
        .first()
        .cloned()
        .unwrap_or_else(|| ANY.to_string());

    for (element, ty) in list.elements.iter().zip(&element_types) {
        if !types::compatible(&element_type, ty) {
            return Err(CompileError::TypeMismatch {
                expected: element_type,
                found: ty.clone(),
                span: element.span(),
            });
        }
    }

    compiler
        .emitter
        .emit_with(OpCode::ListNew, Value::string(element_type.as_str()));
    for element in list.elements {
        compiler.compile_value(element)?;
        compiler.emitter.emit(OpCode::ListAppend);
    }
    Ok(ExprInfo::value(types::list_of(&element_type)))
}
