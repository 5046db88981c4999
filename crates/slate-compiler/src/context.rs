//! Compilation context: all mutable state of one compilation.
//!
//! A [`CompilationContext`] is created per compilation and passed by
//! reference through every pass. Nothing is kept in statics, so any number
//! of compilations can run in one process.

use slate_core::{CompileError, CompileWarning, Diagnostics, Note};

use crate::backpatch::BackpatchTable;
use crate::debug_info::DebugInfo;
use crate::emit::JumpLabel;
use crate::options::CompilerOptions;
use crate::scope::VariableTable;
use crate::symbols::{FunctionId, SymbolTable};

/// Per-function lowering state.
#[derive(Debug)]
pub struct FunctionFrame {
    /// The function being compiled
    pub id: FunctionId,
    /// Declared parameter count (receiver excluded)
    pub param_count: usize,
    /// Whether a receiver sits below the arguments
    pub is_method: bool,
    /// Declared return type
    pub return_type: String,
    /// Return jumps that funnel into the shared tail
    pub return_labels: Vec<JumpLabel>,
}

impl FunctionFrame {
    /// Offset of the caller-reserved return slot.
    pub fn return_slot(&self) -> i64 {
        -2 - self.param_count as i64 - i64::from(self.is_method)
    }

    /// Argument slots `Return` discards.
    pub fn argument_slots(&self) -> usize {
        self.param_count + usize::from(self.is_method)
    }
}

/// Mutable state of one in-flight compilation.
#[derive(Debug)]
pub struct CompilationContext<'ast> {
    pub options: CompilerOptions,
    pub symbols: SymbolTable<'ast>,
    pub scope: VariableTable,
    pub diagnostics: Diagnostics,
    pub backpatch: BackpatchTable<'ast>,
    pub debug_info: DebugInfo,
    /// Set while a function body is being lowered
    pub function: Option<FunctionFrame>,
    /// Source file of the code being processed
    pub current_file: String,
}

impl<'ast> CompilationContext<'ast> {
    /// Create a fresh context.
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            symbols: SymbolTable::new(),
            scope: VariableTable::new(),
            diagnostics: Diagnostics::new(),
            backpatch: BackpatchTable::new(),
            debug_info: DebugInfo::new(),
            function: None,
            current_file: String::new(),
        }
    }

    /// Switch the file diagnostics are attributed to.
    pub fn set_file(&mut self, file: &str) {
        if self.current_file != file {
            self.current_file = file.to_string();
        }
    }

    /// Record an error against the current file.
    pub fn error(&mut self, error: CompileError) {
        tracing::trace!(file = %self.current_file, %error, "compile error");
        self.diagnostics.error(Some(&self.current_file), error);
    }

    /// Record a warning against the current file.
    pub fn warn(&mut self, warning: CompileWarning) {
        self.diagnostics.warn(Some(&self.current_file), warning);
    }

    /// Record a note against the current file.
    pub fn note(&mut self, note: Note) {
        self.diagnostics.note(Some(&self.current_file), note);
    }

    /// Start lowering a function body.
    pub fn begin_function(&mut self, frame: FunctionFrame) {
        self.function = Some(frame);
    }

    /// Finish lowering a function body.
    pub fn end_function(&mut self) -> Option<FunctionFrame> {
        self.scope.end_function();
        self.function.take()
    }
}
