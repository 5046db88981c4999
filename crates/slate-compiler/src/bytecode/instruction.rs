//! A single emitted instruction.

use std::fmt;

use slate_core::Value;

use super::OpCode;

/// An opcode with up to two typed operands and an optional tag.
///
/// Instructions are addressed by their index in the final array. Jump and
/// call operands hold a displacement relative to the instruction itself.
/// The tag has no execution effect; it exists for tooling only.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub op: OpCode,
    pub operand0: Option<Value>,
    pub operand1: Option<Value>,
    pub tag: Option<String>,
}

impl Instruction {
    /// An instruction without operands.
    pub fn new(op: OpCode) -> Self {
        Self {
            op,
            operand0: None,
            operand1: None,
            tag: None,
        }
    }

    /// An instruction with one operand.
    pub fn with(op: OpCode, operand0: Value) -> Self {
        Self {
            operand0: Some(operand0),
            ..Self::new(op)
        }
    }

    /// An instruction with two operands.
    pub fn with2(op: OpCode, operand0: Value, operand1: Value) -> Self {
        Self {
            operand0: Some(operand0),
            operand1: Some(operand1),
            ..Self::new(op)
        }
    }

    /// The integer in operand0, if present.
    pub fn int_operand(&self) -> Option<i64> {
        self.operand0.as_ref().and_then(Value::as_int)
    }

    /// The absolute target of a jump or call, if the operand is set.
    pub fn target(&self, index: usize) -> Option<usize> {
        if !self.op.is_relative() {
            return None;
        }
        let displacement = self.int_operand()?;
        let target = index as i64 + displacement;
        usize::try_from(target).ok()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op.name())?;
        if let Some(operand) = &self.operand0 {
            write!(f, " {}", operand)?;
        }
        if let Some(operand) = &self.operand1 {
            write!(f, " {}", operand)?;
        }
        if let Some(tag) = &self.tag {
            write!(f, " ; {}", tag)?;
        }
        Ok(())
    }
}
