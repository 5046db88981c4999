//! Result of lowering an expression.

use crate::types::VOID;

/// Type of a lowered expression and whether it left a value on the stack.
///
/// Every expression leaves exactly one value except the list pseudo-methods
/// `Push`, `Add` and `Remove`, which consume their operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprInfo {
    /// The static type of the expression.
    pub ty: String,
    /// Whether one value was pushed.
    pub has_value: bool,
}

impl ExprInfo {
    /// An expression that left one value of type `ty`.
    pub fn value(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            has_value: true,
        }
    }

    /// An expression that left nothing on the stack.
    pub fn none() -> Self {
        Self {
            ty: VOID.to_string(),
            has_value: false,
        }
    }
}
