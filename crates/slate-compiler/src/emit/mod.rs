//! Instruction emitter for the Slate compiler.
//!
//! The [`InstructionEmitter`] appends instructions to one growable buffer
//! that becomes the program's final instruction array. It owns three gates:
//!
//! - comments: `Comment` pseudo-instructions are dropped when disabled
//! - debug tags: instruction tags are dropped when disabled
//! - generation blocked: while blocked nothing is appended at all
//!
//! # Example
//!
//! ```
//! use slate_compiler::bytecode::OpCode;
//! use slate_compiler::emit::InstructionEmitter;
//! use slate_core::Value;
//!
//! let mut emitter = InstructionEmitter::new(false, false);
//! emitter.emit_push(Value::Bool(true));
//! let label = emitter.emit_jump(OpCode::JumpIfFalse);
//! emitter.emit_push(Value::Int(1));
//! emitter.emit(OpCode::Pop);
//! emitter.patch_jump(label);
//!
//! let code = emitter.finish();
//! assert_eq!(code[1].int_operand(), Some(3));
//! ```

mod jumps;

use std::ops::Range;

use slate_core::Value;

use crate::bytecode::{Instruction, OpCode};
use jumps::LoopStack;

/// Emits instructions into a single flat buffer.
#[derive(Debug)]
pub struct InstructionEmitter {
    /// The instructions emitted so far
    code: Vec<Instruction>,

    /// Keep `Comment` pseudo-instructions
    comments: bool,

    /// Keep instruction tags
    debug_tags: bool,

    /// Nesting depth of blocked generation
    blocked: u32,

    /// Break bookkeeping for control flow
    loops: LoopStack,
}

impl InstructionEmitter {
    /// Create a new emitter.
    pub fn new(comments: bool, debug_tags: bool) -> Self {
        Self {
            code: Vec::new(),
            comments,
            debug_tags,
            blocked: 0,
            loops: LoopStack::new(),
        }
    }

    // ==========================================================================
    // Generation Gate
    // ==========================================================================

    /// Suppress all emission until the matching [`unblock`](Self::unblock).
    pub fn block(&mut self) {
        self.blocked += 1;
    }

    /// Undo one [`block`](Self::block).
    pub fn unblock(&mut self) {
        self.blocked = self.blocked.saturating_sub(1);
    }

    /// Whether emission is currently suppressed.
    pub fn is_blocked(&self) -> bool {
        self.blocked > 0
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Append an instruction, returning its index unless generation is blocked.
    pub fn emit_instruction(&mut self, instruction: Instruction) -> Option<usize> {
        if self.is_blocked() {
            return None;
        }
        self.code.push(instruction);
        Some(self.code.len() - 1)
    }

    /// Emit an opcode with no operands.
    pub fn emit(&mut self, op: OpCode) -> Option<usize> {
        self.emit_instruction(Instruction::new(op))
    }

    /// Emit an opcode with one operand.
    pub fn emit_with(&mut self, op: OpCode, operand: Value) -> Option<usize> {
        self.emit_instruction(Instruction::with(op, operand))
    }

    /// Emit an opcode with two operands.
    pub fn emit_with2(&mut self, op: OpCode, operand0: Value, operand1: Value) -> Option<usize> {
        self.emit_instruction(Instruction::with2(op, operand0, operand1))
    }

    /// Push a constant.
    pub fn emit_push(&mut self, value: Value) -> Option<usize> {
        self.emit_with(OpCode::Push, value)
    }

    /// Push the default value of a type.
    pub fn emit_push_default(&mut self, ty: &str) -> Option<usize> {
        self.emit_with(OpCode::PushDefault, Value::string(ty))
    }

    /// Emit `count` pops.
    pub fn emit_pops(&mut self, count: usize) {
        for _ in 0..count {
            self.emit(OpCode::Pop);
        }
    }

    /// Emit a comment when comments are enabled.
    pub fn comment(&mut self, text: impl Into<String>) {
        if self.comments {
            self.emit_with(OpCode::Comment, Value::Str(text.into()));
        }
    }

    /// Tag the most recent instruction when debug tags are enabled.
    pub fn tag_last(&mut self, tag: impl Into<String>) {
        if !self.debug_tags || self.is_blocked() {
            return;
        }
        if let Some(last) = self.code.last_mut() {
            last.tag = Some(tag.into());
        }
    }

    /// Overwrite operand0 of an emitted instruction.
    pub fn set_operand(&mut self, index: usize, value: Value) -> bool {
        match self.code.get_mut(index) {
            Some(instruction) => {
                instruction.operand0 = Some(value);
                true
            }
            None => false,
        }
    }

    // ==========================================================================
    // Jumps and Control Flow
    // ==========================================================================

    /// Emit a forward jump whose displacement is fixed to `0` until patched.
    pub fn emit_jump(&mut self, op: OpCode) -> JumpLabel {
        JumpLabel(self.emit_with(op, Value::Int(0)))
    }

    /// Patch a forward jump to the current position.
    pub fn patch_jump(&mut self, label: JumpLabel) {
        self.patch_jump_to(label, self.current_offset());
    }

    /// Patch a forward jump to a given position.
    pub fn patch_jump_to(&mut self, label: JumpLabel, target: usize) {
        if let Some(index) = label.0 {
            self.set_operand(index, Value::Int(target as i64 - index as i64));
        }
    }

    /// Emit a backward jump to `target`.
    pub fn emit_jump_back(&mut self, target: usize) -> Option<usize> {
        let index = self.current_offset();
        self.emit_with(OpCode::Jump, Value::Int(target as i64 - index as i64))
    }

    /// Index the next instruction will get.
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    // ==========================================================================
    // Loop Control
    // ==========================================================================

    /// Enter a loop context.
    ///
    /// `scope_depth` is the number of variable frames open outside the body.
    pub fn enter_loop(&mut self, scope_depth: usize) {
        self.loops.enter_loop(scope_depth);
    }

    /// Exit a loop context, patching all break jumps to the current position.
    pub fn exit_loop(&mut self) {
        let break_labels = self.loops.exit_loop();
        for label in break_labels {
            self.patch_jump(label);
        }
    }

    /// Emit a break jump for the innermost loop.
    ///
    /// Returns `false` (and emits nothing) outside any loop.
    pub fn emit_break(&mut self) -> bool {
        if !self.loops.in_loop() {
            return false;
        }
        let label = self.emit_jump(OpCode::Jump);
        self.loops.add_break(label);
        true
    }

    /// Check if currently inside a loop.
    pub fn in_loop(&self) -> bool {
        self.loops.in_loop()
    }

    /// Scope depth recorded when the innermost loop was entered.
    pub fn loop_scope_depth(&self) -> Option<usize> {
        self.loops.scope_depth()
    }

    /// Get current loop nesting depth.
    pub fn loop_depth(&self) -> usize {
        self.loops.loop_depth()
    }

    // ==========================================================================
    // Finalization
    // ==========================================================================

    /// Drop every instruction from `len` on, returning the removed range.
    pub fn truncate(&mut self, len: usize) -> Range<usize> {
        let end = self.code.len();
        self.code.truncate(len);
        len.min(end)..end
    }

    /// The instructions emitted so far.
    pub fn instructions(&self) -> &[Instruction] {
        &self.code
    }

    /// Mutable access for late patching.
    pub fn instructions_mut(&mut self) -> &mut [Instruction] {
        &mut self.code
    }

    /// Finish and return the instruction array.
    pub fn finish(self) -> Vec<Instruction> {
        self.code
    }
}

/// A forward jump that needs patching.
///
/// Holds `None` when the jump was requested while generation was blocked;
/// patching such a label does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpLabel(pub(crate) Option<usize>);

impl JumpLabel {
    /// Index of the jump instruction, if one was emitted.
    pub fn index(&self) -> Option<usize> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_and_patch() {
        let mut emitter = InstructionEmitter::new(false, false);

        emitter.emit_push(Value::Bool(true));
        let label = emitter.emit_jump(OpCode::JumpIfFalse);
        emitter.emit_push(Value::Int(1));
        emitter.patch_jump(label);
        emitter.emit(OpCode::Exit);

        let code = emitter.finish();
        assert_eq!(code[1].op, OpCode::JumpIfFalse);
        assert_eq!(code[1].int_operand(), Some(2));
        assert_eq!(code[1].target(1), Some(3));
    }

    #[test]
    fn jump_back_is_negative() {
        let mut emitter = InstructionEmitter::new(false, false);
        let start = emitter.current_offset();
        emitter.emit(OpCode::Nop);
        emitter.emit(OpCode::Nop);
        emitter.emit_jump_back(start);

        let code = emitter.finish();
        assert_eq!(code[2].int_operand(), Some(-2));
    }

    #[test]
    fn blocked_generation_emits_nothing() {
        let mut emitter = InstructionEmitter::new(true, true);
        emitter.block();
        assert_eq!(emitter.emit(OpCode::Pop), None);
        let label = emitter.emit_jump(OpCode::Jump);
        emitter.comment("hidden");
        emitter.patch_jump(label);
        emitter.unblock();

        assert!(emitter.instructions().is_empty());
        assert_eq!(emitter.emit(OpCode::Pop), Some(0));
    }

    #[test]
    fn comments_and_tags_follow_toggles() {
        let mut off = InstructionEmitter::new(false, false);
        off.comment("function main()");
        off.emit(OpCode::Pop);
        off.tag_last("cleanup");
        assert_eq!(off.instructions().len(), 1);
        assert_eq!(off.instructions()[0].tag, None);

        let mut on = InstructionEmitter::new(true, true);
        on.comment("function main()");
        on.emit(OpCode::Pop);
        on.tag_last("cleanup");
        assert_eq!(on.instructions()[0].op, OpCode::Comment);
        assert_eq!(on.instructions()[1].tag.as_deref(), Some("cleanup"));
    }

    #[test]
    fn break_outside_loop() {
        let mut emitter = InstructionEmitter::new(false, false);
        assert!(!emitter.emit_break());
        assert!(emitter.instructions().is_empty());
    }

    #[test]
    fn nested_loop_breaks_patch_to_their_own_exit() {
        let mut emitter = InstructionEmitter::new(false, false);

        emitter.enter_loop(0);
        emitter.enter_loop(1);
        assert_eq!(emitter.loop_depth(), 2);
        assert!(emitter.emit_break()); // index 0, inner
        emitter.exit_loop(); // inner exit at 1
        emitter.emit(OpCode::Nop); // index 1
        assert!(emitter.emit_break()); // index 2, outer
        emitter.exit_loop(); // outer exit at 3

        let code = emitter.finish();
        assert_eq!(code[0].target(0), Some(1));
        assert_eq!(code[2].target(2), Some(3));
    }
}
