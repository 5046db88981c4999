//! Side table mapping instructions back to source.
//!
//! Records are appended while lowering and never changed afterwards,
//! except by [`DebugInfo::remove_instructions`] when a later pass deletes
//! instructions. Runtime stack traces and source mapping read them after
//! compilation.

use std::ops::Range;

use slate_core::Span;

/// A live variable slot at the start of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSlot {
    pub name: String,
    pub offset: i64,
    pub ty: String,
}

/// The instructions one statement lowered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCodeLocation {
    pub instructions: Range<usize>,
    pub file: String,
    pub span: Span,
    /// Locals and parameters visible when the statement started.
    pub stack_layout: Vec<StackSlot>,
}

/// The instructions one function lowered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInformation {
    pub instructions: Range<usize>,
    /// Offset-table key of the function.
    pub identifier: String,
    pub readable_signature: String,
    pub file: String,
}

/// Statement and function records of one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugInfo {
    statements: Vec<SourceCodeLocation>,
    functions: Vec<FunctionInformation>,
}

impl DebugInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_statement(&mut self, location: SourceCodeLocation) {
        self.statements.push(location);
    }

    pub fn record_function(&mut self, information: FunctionInformation) {
        self.functions.push(information);
    }

    pub fn statements(&self) -> &[SourceCodeLocation] {
        &self.statements
    }

    pub fn functions(&self) -> &[FunctionInformation] {
        &self.functions
    }

    /// The innermost statement covering an instruction.
    pub fn statement_at(&self, index: usize) -> Option<&SourceCodeLocation> {
        self.statements
            .iter()
            .filter(|s| s.instructions.contains(&index))
            .min_by_key(|s| s.instructions.len())
    }

    /// Renumber every range after the instructions in `removed` were
    /// deleted. Ranges overlapping the removal shrink; later ones move down.
    ///
    /// Statement lowering calls this when it rolls back a failed
    /// initializer; later passes that delete instructions use it too.
    pub fn remove_instructions(&mut self, removed: Range<usize>) {
        if removed.is_empty() {
            return;
        }
        let shift = |index: usize| {
            if index <= removed.start {
                index
            } else if index >= removed.end {
                index - removed.len()
            } else {
                removed.start
            }
        };
        let ranges = self
            .statements
            .iter_mut()
            .map(|s| &mut s.instructions)
            .chain(self.functions.iter_mut().map(|f| &mut f.instructions));
        for range in ranges {
            *range = shift(range.start)..shift(range.end);
        }
    }

    /// The function containing an instruction.
    pub fn function_at(&self, index: usize) -> Option<&FunctionInformation> {
        self.functions
            .iter()
            .find(|f| f.instructions.contains(&index))
    }
}
