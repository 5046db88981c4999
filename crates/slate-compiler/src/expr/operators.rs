//! Binary and unary operators.

use slate_core::{CompileError, CompileWarning, Note, Span, Value};
use slate_ir::{BinaryExpr, BinaryOp, Expr, UnaryExpr, UnaryOp};

use super::{ExprCompiler, Result};
use crate::bytecode::OpCode;
use crate::expr_info::ExprInfo;
use crate::fold;
use crate::infer::binary_result_type;
use crate::types::{ANY, BOOL, FLOAT, INT};

/// Opcode implementing a binary operator.
pub fn binary_opcode(op: BinaryOp) -> OpCode {
    match op {
        BinaryOp::Add => OpCode::Add,
        BinaryOp::Sub => OpCode::Sub,
        BinaryOp::Mul => OpCode::Mul,
        BinaryOp::Div => OpCode::Div,
        BinaryOp::Mod => OpCode::Mod,
        BinaryOp::Less => OpCode::Less,
        BinaryOp::Greater => OpCode::Greater,
        BinaryOp::LessEqual => OpCode::LessEqual,
        BinaryOp::GreaterEqual => OpCode::GreaterEqual,
        BinaryOp::Equal => OpCode::Equal,
        BinaryOp::NotEqual => OpCode::NotEqual,
        BinaryOp::BitwiseAnd => OpCode::BitAnd,
        BinaryOp::BitwiseOr => OpCode::BitOr,
        BinaryOp::BitwiseXor => OpCode::BitXor,
    }
}

/// Warn about mismatched operand types and return the result type.
pub(crate) fn operand_types(
    compiler: &mut ExprCompiler<'_, '_>,
    op: BinaryOp,
    left: &str,
    right: &str,
    span: Span,
) -> String {
    if left != right && left != ANY && right != ANY {
        compiler.ctx.warn(CompileWarning::OperandTypeMismatch {
            op: op.as_str().to_string(),
            left: left.to_string(),
            right: right.to_string(),
            span,
        });
    }
    binary_result_type(op, left, right)
}

/// Replace a constant expression with its value when folding is enabled.
///
/// Only the emitted code changes: callers report the same static type as
/// the unfolded expression would have.
fn try_push_folded(compiler: &mut ExprCompiler<'_, '_>, expr: &Expr<'_>) -> Option<Value> {
    if !compiler.ctx.options.folds_constants() {
        return None;
    }
    let value = fold::try_fold(expr)?;
    compiler.emitter.emit_push(value.clone());
    compiler.ctx.note(Note::PredictedValue {
        value: value.clone(),
        span: expr.span(),
    });
    Some(value)
}

/// Compile a binary operation.
pub fn compile_binary<'ast>(
    compiler: &mut ExprCompiler<'_, 'ast>,
    expr: &Expr<'ast>,
    binary: &BinaryExpr<'ast>,
) -> Result<ExprInfo> {
    if try_push_folded(compiler, expr).is_some() {
        let left = compiler.ctx.infer(&binary.left)?;
        let right = compiler.ctx.infer(&binary.right)?;
        let ty = operand_types(compiler, binary.op, &left, &right, binary.span);
        return Ok(ExprInfo::value(ty));
    }

    let left = compiler.compile_value(&binary.left)?;
    let right = compiler.compile_value(&binary.right)?;
    let ty = operand_types(compiler, binary.op, &left, &right, binary.span);
    compiler.emitter.emit(binary_opcode(binary.op));
    Ok(ExprInfo::value(ty))
}

/// Compile a unary operation.
pub fn compile_unary<'ast>(
    compiler: &mut ExprCompiler<'_, 'ast>,
    expr: &Expr<'ast>,
    unary: &UnaryExpr<'ast>,
) -> Result<ExprInfo> {
    if try_push_folded(compiler, expr).is_some() {
        return Ok(ExprInfo::value(compiler.ctx.infer(expr)?));
    }

    match unary.op {
        UnaryOp::Not => {
            compiler.check(&unary.operand, BOOL)?;
            compiler.emitter.emit(OpCode::Not);
            Ok(ExprInfo::value(BOOL))
        }
        UnaryOp::Neg => {
            let ty = compiler.compile_value(&unary.operand)?;
            if !matches!(ty.as_str(), INT | FLOAT | ANY) {
                return Err(CompileError::InvalidOperation {
                    message: format!("cannot negate a value of type '{}'", ty),
                    span: unary.span,
                });
            }
            compiler.emitter.emit(OpCode::Negate);
            Ok(ExprInfo::value(ty))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompilationContext;
    use crate::emit::InstructionEmitter;
    use crate::options::CompilerOptions;
    use bumpalo::Bump;
    use slate_core::Span;
    use slate_ir::AstBuilder;

    #[test]
    fn mismatched_operands_warn() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.scope.push_frame();
        ctx.scope.declare_local("i", "int", false, Span::default());
        ctx.scope.declare_local("f", "float", false, Span::default());

        let mut emitter = InstructionEmitter::new(false, false);
        let expr = b.binary(b.var_ref("i"), BinaryOp::Mul, b.var_ref("f"));
        let info = ExprCompiler::new(&mut ctx, &mut emitter).compile(&expr).unwrap();

        assert_eq!(info.ty, "any");
        assert_eq!(ctx.diagnostics.warnings().len(), 1);
        assert!(ctx.diagnostics.errors().is_empty());
        assert_eq!(emitter.instructions()[2].op, OpCode::Mul);
    }

    #[test]
    fn folded_mismatch_still_warns() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::default());
        let mut emitter = InstructionEmitter::new(false, false);

        let expr = b.binary(b.int(2), BinaryOp::Mul, b.float(1.5));
        let info = ExprCompiler::new(&mut ctx, &mut emitter).compile(&expr).unwrap();

        assert_eq!(info.ty, "any");
        assert_eq!(emitter.instructions().len(), 1);
        assert_eq!(emitter.instructions()[0].operand0, Some(Value::float(3.0)));
        assert_eq!(ctx.diagnostics.warnings().len(), 1);
    }

    #[test]
    fn partial_fold_keeps_variable_operand() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.scope.push_frame();
        ctx.scope.declare_local("x", "int", false, Span::default());

        let mut emitter = InstructionEmitter::new(false, false);
        let expr = b.binary(
            b.var_ref("x"),
            BinaryOp::Add,
            b.binary(b.int(2), BinaryOp::Mul, b.int(4)),
        );
        ExprCompiler::new(&mut ctx, &mut emitter).compile(&expr).unwrap();

        let ops: Vec<_> = emitter.instructions().iter().map(|i| i.op).collect();
        assert_eq!(ops, vec![OpCode::LoadLocal, OpCode::Push, OpCode::Add]);
        assert_eq!(emitter.instructions()[1].operand0, Some(Value::Int(8)));
    }

    #[test]
    fn folding_keeps_static_types() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let exprs = [
            b.binary(b.int(2), BinaryOp::Mul, b.float(1.5)),
            b.binary(b.int(7), BinaryOp::Div, b.int(2)),
            b.binary(b.int(1), BinaryOp::Less, b.float(2.0)),
            b.unary(UnaryOp::Neg, b.float(1.0)),
            b.unary(UnaryOp::Not, b.bool(true)),
        ];

        for expr in &exprs {
            let mut types = Vec::new();
            for options in [CompilerOptions::default(), CompilerOptions::unoptimized()] {
                let mut ctx = CompilationContext::new(options);
                let mut emitter = InstructionEmitter::new(false, false);
                let info = ExprCompiler::new(&mut ctx, &mut emitter).compile(expr).unwrap();
                assert_eq!(info.ty, ctx.infer(expr).unwrap());
                types.push(info.ty);
            }
            assert_eq!(types[0], types[1]);
        }
    }

    #[test]
    fn negation_needs_a_number() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::unoptimized());
        let mut emitter = InstructionEmitter::new(false, false);
        let mut compiler = ExprCompiler::new(&mut ctx, &mut emitter);

        assert!(compiler.compile(&b.unary(UnaryOp::Neg, b.str("a"))).is_err());
        assert!(compiler.compile(&b.unary(UnaryOp::Not, b.int(1))).is_err());
        assert!(compiler.compile(&b.unary(UnaryOp::Neg, b.int(1))).is_ok());
    }
}
