//! Loop bookkeeping for `break`.
//!
//! Tracks a stack of loop contexts so nested loops patch their own break
//! jumps, and remembers how deep the variable scope was when each loop
//! started so a `break` knows which locals to pop.

use super::JumpLabel;

/// Manages pending break jumps per loop.
#[derive(Debug, Default)]
pub struct LoopStack {
    /// Stack of loop contexts (innermost last)
    loops: Vec<LoopContext>,
}

/// Context for a single loop.
#[derive(Debug)]
struct LoopContext {
    /// Scope frame depth outside the loop body
    scope_depth: usize,
    /// Pending break jumps to patch when loop exits
    break_labels: Vec<JumpLabel>,
}

impl LoopStack {
    /// Create an empty loop stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new loop context.
    pub fn enter_loop(&mut self, scope_depth: usize) {
        self.loops.push(LoopContext {
            scope_depth,
            break_labels: Vec::new(),
        });
    }

    /// Exit the current loop context.
    ///
    /// Returns the break labels that need to be patched to jump past the loop.
    pub fn exit_loop(&mut self) -> Vec<JumpLabel> {
        self.loops
            .pop()
            .map(|ctx| ctx.break_labels)
            .unwrap_or_default()
    }

    /// Check if we're currently inside a loop.
    pub fn in_loop(&self) -> bool {
        !self.loops.is_empty()
    }

    /// Add a break label to be patched when the loop exits.
    pub fn add_break(&mut self, label: JumpLabel) {
        if let Some(ctx) = self.loops.last_mut() {
            ctx.break_labels.push(label);
        }
    }

    /// Scope depth recorded for the innermost loop.
    pub fn scope_depth(&self) -> Option<usize> {
        self.loops.last().map(|ctx| ctx.scope_depth)
    }

    /// Get the current loop nesting depth.
    pub fn loop_depth(&self) -> usize {
        self.loops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stack_not_in_loop() {
        let loops = LoopStack::new();
        assert!(!loops.in_loop());
        assert_eq!(loops.loop_depth(), 0);
        assert_eq!(loops.scope_depth(), None);
    }

    #[test]
    fn nested_loops() {
        let mut loops = LoopStack::new();
        loops.enter_loop(1);
        loops.enter_loop(3);

        assert_eq!(loops.loop_depth(), 2);
        assert_eq!(loops.scope_depth(), Some(3));

        loops.exit_loop();
        assert_eq!(loops.scope_depth(), Some(1));
    }

    #[test]
    fn exit_loop_returns_breaks() {
        let mut loops = LoopStack::new();
        loops.enter_loop(0);
        loops.add_break(JumpLabel(Some(4)));
        loops.add_break(JumpLabel(Some(9)));

        let breaks = loops.exit_loop();
        assert_eq!(breaks.len(), 2);
        assert!(!loops.in_loop());
    }

    #[test]
    fn exit_without_loop_is_empty() {
        let mut loops = LoopStack::new();
        assert!(loops.exit_loop().is_empty());
    }
}
