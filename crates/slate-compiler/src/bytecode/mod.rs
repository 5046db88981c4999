//! Bytecode types for the Slate compiler.
//!
//! - [`OpCode`] - The instruction set
//! - [`Instruction`] - An opcode with its operands and optional tag

mod instruction;
mod opcode;

pub use instruction::Instruction;
pub use opcode::OpCode;
