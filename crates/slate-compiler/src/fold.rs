//! Constant folding.
//!
//! [`try_fold`] evaluates expressions built only from literals and the
//! supported operators. Anything that reads a variable, field, call or list
//! does not fold. Integer arithmetic is checked: an overflow or a division
//! by zero leaves the expression to the runtime.

use slate_core::Value;
use slate_ir::{BinaryOp, Expr, UnaryOp};

/// The value of a fully constant expression.
pub fn try_fold(expr: &Expr<'_>) -> Option<Value> {
    match expr {
        Expr::Literal(literal) => Some(literal.kind.to_value()),
        Expr::Binary(binary) => {
            let left = try_fold(&binary.left)?;
            let right = try_fold(&binary.right)?;
            fold_binary(binary.op, &left, &right)
        }
        Expr::Unary(unary) => {
            let operand = try_fold(&unary.operand)?;
            fold_unary(unary.op, &operand)
        }
        Expr::Ident(_)
        | Expr::Field(_)
        | Expr::Index(_)
        | Expr::Call(_)
        | Expr::New(_)
        | Expr::List(_) => None,
    }
}

/// Whether an expression folds to the boolean `value`.
pub fn folds_to_bool(expr: &Expr<'_>, value: bool) -> bool {
    try_fold(expr) == Some(Value::Bool(value))
}

/// Apply a binary operator to two constants.
pub fn fold_binary(op: BinaryOp, left: &Value, right: &Value) -> Option<Value> {
    use BinaryOp::*;

    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            let value = match op {
                Add => Value::Int(a.checked_add(b)?),
                Sub => Value::Int(a.checked_sub(b)?),
                Mul => Value::Int(a.checked_mul(b)?),
                Div => Value::Int(a.checked_div(b)?),
                Mod => Value::Int(a.checked_rem(b)?),
                BitwiseAnd => Value::Int(a & b),
                BitwiseOr => Value::Int(a | b),
                BitwiseXor => Value::Int(a ^ b),
                Less => Value::Bool(a < b),
                Greater => Value::Bool(a > b),
                LessEqual => Value::Bool(a <= b),
                GreaterEqual => Value::Bool(a >= b),
                Equal => Value::Bool(a == b),
                NotEqual => Value::Bool(a != b),
            };
            Some(value)
        }
        (Value::Float(a), Value::Float(b)) => fold_float(op, a.0, b.0),
        (Value::Int(a), Value::Float(b)) => fold_float(op, *a as f64, b.0),
        (Value::Float(a), Value::Int(b)) => fold_float(op, a.0, *b as f64),
        (Value::Bool(a), Value::Bool(b)) => {
            let (a, b) = (*a, *b);
            match op {
                Equal => Some(Value::Bool(a == b)),
                NotEqual => Some(Value::Bool(a != b)),
                BitwiseAnd => Some(Value::Bool(a & b)),
                BitwiseOr => Some(Value::Bool(a | b)),
                BitwiseXor => Some(Value::Bool(a ^ b)),
                _ => None,
            }
        }
        (Value::Str(a), Value::Str(b)) => match op {
            Add => Some(Value::Str(format!("{}{}", a, b))),
            Equal => Some(Value::Bool(a == b)),
            NotEqual => Some(Value::Bool(a != b)),
            _ => None,
        },
        _ => None,
    }
}

fn fold_float(op: BinaryOp, a: f64, b: f64) -> Option<Value> {
    use BinaryOp::*;

    let value = match op {
        Add => Value::float(a + b),
        Sub => Value::float(a - b),
        Mul => Value::float(a * b),
        Div if b == 0.0 => return None,
        Div => Value::float(a / b),
        Mod if b == 0.0 => return None,
        Mod => Value::float(a % b),
        Less => Value::Bool(a < b),
        Greater => Value::Bool(a > b),
        LessEqual => Value::Bool(a <= b),
        GreaterEqual => Value::Bool(a >= b),
        Equal => Value::Bool(a == b),
        NotEqual => Value::Bool(a != b),
        BitwiseAnd | BitwiseOr | BitwiseXor => return None,
    };
    Some(value)
}

/// Apply a unary operator to a constant.
pub fn fold_unary(op: UnaryOp, operand: &Value) -> Option<Value> {
    match (op, operand) {
        (UnaryOp::Not, Value::Bool(v)) => Some(Value::Bool(!v)),
        (UnaryOp::Neg, Value::Int(v)) => Some(Value::Int(v.checked_neg()?)),
        (UnaryOp::Neg, Value::Float(v)) => Some(Value::float(-v.0)),
        _ => None,
    }
}
