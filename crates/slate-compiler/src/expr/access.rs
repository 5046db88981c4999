//! Variable, field and index reads.

use slate_core::{CompileError, Value};
use slate_ir::{FieldExpr, Ident, IndexExpr};

use super::{ExprCompiler, Result};
use crate::bytecode::OpCode;
use crate::emit::InstructionEmitter;
use crate::expr_info::ExprInfo;
use crate::infer::{FieldAccess, index_type};
use crate::scope::CompiledVariable;
use crate::types::INT;

/// Compile an identifier read.
pub fn compile_ident<'ast>(
    compiler: &mut ExprCompiler<'_, 'ast>,
    ident: &Ident<'ast>,
) -> Result<ExprInfo> {
    let Some(variable) = compiler.ctx.scope.lookup(ident.name).cloned() else {
        return Err(CompileError::UnknownVariable {
            name: ident.name.to_string(),
            span: ident.span,
        });
    };
    emit_load(compiler.emitter, &variable);
    Ok(ExprInfo::value(variable.ty))
}

/// Push the value of a variable.
pub(crate) fn emit_load(emitter: &mut InstructionEmitter, variable: &CompiledVariable) {
    emit_load_slot(emitter, variable);
    if variable.is_heap_indirected {
        emitter.emit(OpCode::LoadHeap);
    }
}

/// Push the slot content of a variable; the heap pointer for heap variables.
pub(crate) fn emit_load_slot(emitter: &mut InstructionEmitter, variable: &CompiledVariable) {
    let op = if variable.is_global {
        OpCode::LoadGlobal
    } else {
        OpCode::LoadLocal
    };
    emitter.emit_with(op, Value::Int(variable.stack_offset));
}

/// Compile `object.field`.
pub fn compile_field<'ast>(
    compiler: &mut ExprCompiler<'_, 'ast>,
    field: &FieldExpr<'ast>,
) -> Result<ExprInfo> {
    let object = compiler.compile_value(&field.object)?;
    let access = compiler.ctx.field_access(&object, &field.field)?;
    emit_field_load(compiler.emitter, &access, field.field.name);
    Ok(ExprInfo::value(access.ty()))
}

pub(crate) fn emit_field_load(emitter: &mut InstructionEmitter, access: &FieldAccess, name: &str) {
    match access {
        FieldAccess::Length => {
            emitter.emit(OpCode::Length);
        }
        FieldAccess::Field { index, .. } => {
            emitter.emit_with2(OpCode::LoadField, Value::Int(*index as i64), Value::string(name));
        }
    }
}

/// Compile `object[index]`.
pub fn compile_index<'ast>(
    compiler: &mut ExprCompiler<'_, 'ast>,
    index: &IndexExpr<'ast>,
) -> Result<ExprInfo> {
    let object = compiler.compile_value(&index.object)?;
    let element = index_type(&object, index.span)?;
    compiler.check(&index.index, INT)?;
    compiler.emitter.emit(OpCode::LoadIndex);
    Ok(ExprInfo::value(element))
}
