//! Bytecode operation codes.
//!
//! The target is a stack machine. Most operations pop their inputs from the
//! stack and push a result. Operands are carried on the [`Instruction`]
//! rather than inline, so every opcode is a single byte.
//!
//! [`Instruction`]: super::Instruction

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Bytecode operation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Meta
    // =========================================================================
    /// Does nothing.
    Nop = 0,
    /// Human-readable annotation, never executed.
    /// Operand0: string text
    Comment,

    // =========================================================================
    // Stack Operations
    // =========================================================================
    /// Push a constant.
    /// Operand0: the value
    Push,
    /// Push the default value of a type.
    /// Operand0: type name
    PushDefault,
    /// Pop top of stack.
    Pop,
    /// Duplicate top of stack.
    Dup,
    /// Copy the value at a depth to the top (0 = top).
    /// Operand0: int depth
    Pick,
    /// Replace the struct on top of the stack with a shallow copy.
    Copy,

    // =========================================================================
    // Variables
    // =========================================================================
    /// Push a base-pointer-relative slot.
    /// Operand0: int offset
    LoadLocal,
    /// Pop into a base-pointer-relative slot.
    /// Operand0: int offset
    StoreLocal,
    /// Push an absolute stack slot.
    /// Operand0: int index
    LoadGlobal,
    /// Pop into an absolute stack slot.
    /// Operand0: int index
    StoreGlobal,
    /// Move the value on top into a new heap cell, pushing a pointer to it.
    HeapAlloc,
    /// Replace a heap pointer on top with the value it points to.
    LoadHeap,
    /// Pop a value and a heap pointer; store the value through the pointer.
    StoreHeap,

    // =========================================================================
    // Objects and Lists
    // =========================================================================
    /// Replace an object with one of its fields.
    /// Operand0: int field index, Operand1: field name
    LoadField,
    /// Pop a value and an object; store the field.
    /// Operand0: int field index, Operand1: field name
    StoreField,
    /// Pop an index and a list/string; push the element.
    LoadIndex,
    /// Pop a value, an index and a list; store the element.
    StoreIndex,
    /// Replace a list or string with its length.
    Length,
    /// Pop initial field values and allocate an instance.
    /// Operand0: type name, Operand1: int argument count
    New,
    /// Push an empty list.
    /// Operand0: element type name
    ListNew,
    /// Pop a value and append it to the list below, leaving the list.
    ListAppend,
    /// Pop a value and a list; append the value.
    ListPush,
    /// Pop a list; remove its last element and push it.
    ListPull,
    /// Pop a value, an index and a list; insert at the index.
    ListInsert,
    /// Pop an index and a list; remove the element at the index.
    ListRemove,
    /// Replace the top value with the name of its runtime type.
    TypeOf,

    // =========================================================================
    // Arithmetic, Comparison and Logic
    // =========================================================================
    /// a + b
    Add,
    /// a - b
    Sub,
    /// a * b
    Mul,
    /// a / b
    Div,
    /// a % b
    Mod,
    /// a < b
    Less,
    /// a > b
    Greater,
    /// a <= b
    LessEqual,
    /// a >= b
    GreaterEqual,
    /// a == b
    Equal,
    /// a != b
    NotEqual,
    /// a & b
    BitAnd,
    /// a | b
    BitOr,
    /// a ^ b
    BitXor,
    /// !a
    Not,
    /// -a
    Negate,

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// Unconditional jump.
    /// Operand0: int displacement relative to this instruction
    Jump,
    /// Pop a bool; jump if it is false.
    /// Operand0: int displacement relative to this instruction
    JumpIfFalse,
    /// Call a compiled function.
    /// Operand0: int displacement to the entry, Operand1: int argument count
    Call,
    /// Call a host function; pops the arguments, pushes the result.
    /// Operand0: host binding name, Operand1: int argument count
    CallBuiltin,
    /// Return to the caller, discarding arguments.
    /// Operand0: int number of argument slots (receiver included)
    Return,
    /// Stop the program.
    Exit,
}

impl OpCode {
    /// Whether operand0 of this opcode is a relative displacement.
    pub fn is_relative(&self) -> bool {
        matches!(self, OpCode::Jump | OpCode::JumpIfFalse | OpCode::Call)
    }

    /// Get the name of this opcode for debugging.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Nop => "NOP",
            OpCode::Comment => "COMMENT",
            OpCode::Push => "PUSH",
            OpCode::PushDefault => "PUSH_DEFAULT",
            OpCode::Pop => "POP",
            OpCode::Dup => "DUP",
            OpCode::Pick => "PICK",
            OpCode::Copy => "COPY",
            OpCode::LoadLocal => "LOAD_LOCAL",
            OpCode::StoreLocal => "STORE_LOCAL",
            OpCode::LoadGlobal => "LOAD_GLOBAL",
            OpCode::StoreGlobal => "STORE_GLOBAL",
            OpCode::HeapAlloc => "HEAP_ALLOC",
            OpCode::LoadHeap => "LOAD_HEAP",
            OpCode::StoreHeap => "STORE_HEAP",
            OpCode::LoadField => "LOAD_FIELD",
            OpCode::StoreField => "STORE_FIELD",
            OpCode::LoadIndex => "LOAD_INDEX",
            OpCode::StoreIndex => "STORE_INDEX",
            OpCode::Length => "LENGTH",
            OpCode::New => "NEW",
            OpCode::ListNew => "LIST_NEW",
            OpCode::ListAppend => "LIST_APPEND",
            OpCode::ListPush => "LIST_PUSH",
            OpCode::ListPull => "LIST_PULL",
            OpCode::ListInsert => "LIST_INSERT",
            OpCode::ListRemove => "LIST_REMOVE",
            OpCode::TypeOf => "TYPE_OF",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Mod => "MOD",
            OpCode::Less => "LESS",
            OpCode::Greater => "GREATER",
            OpCode::LessEqual => "LESS_EQUAL",
            OpCode::GreaterEqual => "GREATER_EQUAL",
            OpCode::Equal => "EQUAL",
            OpCode::NotEqual => "NOT_EQUAL",
            OpCode::BitAnd => "BIT_AND",
            OpCode::BitOr => "BIT_OR",
            OpCode::BitXor => "BIT_XOR",
            OpCode::Not => "NOT",
            OpCode::Negate => "NEGATE",
            OpCode::Jump => "JUMP",
            OpCode::JumpIfFalse => "JUMP_IF_FALSE",
            OpCode::Call => "CALL",
            OpCode::CallBuiltin => "CALL_BUILTIN",
            OpCode::Return => "RETURN",
            OpCode::Exit => "EXIT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_repr() {
        assert_eq!(u8::from(OpCode::Nop), 0);
        assert_eq!(u8::from(OpCode::Comment), 1);
    }

    #[test]
    fn opcode_from_u8() {
        assert_eq!(OpCode::try_from(0u8), Ok(OpCode::Nop));
        assert_eq!(OpCode::try_from(u8::from(OpCode::Exit)), Ok(OpCode::Exit));
        assert!(OpCode::try_from(u8::from(OpCode::Exit) + 1).is_err());
    }

    #[test]
    fn opcode_name() {
        assert_eq!(OpCode::Push.name(), "PUSH");
        assert_eq!(OpCode::JumpIfFalse.name(), "JUMP_IF_FALSE");
        assert_eq!(OpCode::CallBuiltin.name(), "CALL_BUILTIN");
    }

    #[test]
    fn relative_operands() {
        assert!(OpCode::Jump.is_relative());
        assert!(OpCode::Call.is_relative());
        assert!(!OpCode::CallBuiltin.is_relative());
        assert!(!OpCode::LoadLocal.is_relative());
    }
}
