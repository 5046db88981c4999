//! Variable scopes for statement lowering.
//!
//! The [`VariableTable`] tracks parameters, live locals and globals. Locals
//! are kept in declaration order, which always matches lexical nesting, so
//! leaving a block removes exactly the most recently declared entries.
//! Each open block owns a scope frame: the count of locals it introduced.

use slate_core::{CompileError, Span};

// ============================================================================
// Types
// ============================================================================

/// A variable visible to the code being lowered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompiledVariable {
    /// Variable name
    pub name: String,
    /// Base-pointer-relative offset, or the absolute index for globals
    pub stack_offset: i64,
    /// Static type
    pub ty: String,
    /// Global variables use absolute addressing
    pub is_global: bool,
    /// The slot holds a pointer to a heap cell
    pub is_heap_indirected: bool,
    /// Where the variable was declared
    pub span: Span,
}

/// The parameter and local tables at one point of lowering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeSnapshot {
    pub params: Vec<CompiledVariable>,
    pub locals: Vec<CompiledVariable>,
    pub frames: Vec<usize>,
    /// Number of globals declared at that point
    pub globals: usize,
}

// ============================================================================
// VariableTable
// ============================================================================

/// Parameters, locals and globals of the code being lowered.
#[derive(Debug, Default)]
pub struct VariableTable {
    /// Parameters of the current function, `this` first for methods
    params: Vec<CompiledVariable>,
    /// Live locals in declaration order
    locals: Vec<CompiledVariable>,
    /// Locals introduced per open block (innermost last)
    frames: Vec<usize>,
    /// Globals in declaration order
    globals: Vec<CompiledVariable>,
    /// Globals hidden from lookup after this many, while a snapshot is restored
    global_limit: Option<usize>,
}

impl VariableTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset parameters and locals for a new function body.
    ///
    /// `params` are `(name, type)` pairs. The receiver of a method is bound
    /// as `this` at offset `-2 - N`; parameter `i` of `N` lives at `i - 1 - N`.
    pub fn begin_function<'p>(
        &mut self,
        receiver: Option<&str>,
        params: impl ExactSizeIterator<Item = (&'p str, &'p str)>,
        span: Span,
    ) {
        self.locals.clear();
        self.frames.clear();
        self.params.clear();

        let count = params.len() as i64;
        if let Some(owner) = receiver {
            self.params.push(CompiledVariable {
                name: "this".to_string(),
                stack_offset: -2 - count,
                ty: owner.to_string(),
                is_global: false,
                is_heap_indirected: false,
                span,
            });
        }
        for (i, (name, ty)) in params.enumerate() {
            self.params.push(CompiledVariable {
                name: name.to_string(),
                stack_offset: i as i64 - 1 - count,
                ty: ty.to_string(),
                is_global: false,
                is_heap_indirected: false,
                span,
            });
        }
    }

    /// Drop parameters and locals after a function body.
    pub fn end_function(&mut self) {
        self.params.clear();
        self.locals.clear();
        self.frames.clear();
    }

    // ==========================================================================
    // Frames
    // ==========================================================================

    /// Open a block.
    pub fn push_frame(&mut self) {
        self.frames.push(0);
    }

    /// Close the innermost block.
    ///
    /// Returns the removed locals, most recently declared first.
    pub fn pop_frame(&mut self) -> Vec<CompiledVariable> {
        let count = self.frames.pop().unwrap_or(0);
        let keep = self.locals.len().saturating_sub(count);
        let mut removed = self.locals.split_off(keep);
        removed.reverse();
        removed
    }

    /// Number of open blocks.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Locals introduced by blocks at `depth` and deeper.
    pub fn locals_in_frames_from(&self, depth: usize) -> usize {
        self.frames.iter().skip(depth).sum()
    }

    // ==========================================================================
    // Declaration
    // ==========================================================================

    /// Check a name against the innermost block and the parameters.
    pub fn check_redeclaration(&self, name: &str, span: Span) -> Result<(), CompileError> {
        let in_frame = self.frames.last().copied().unwrap_or(0);
        let start = self.locals.len() - in_frame.min(self.locals.len());
        let existing = self.locals[start..]
            .iter()
            .chain(self.params.iter())
            .find(|v| v.name == name);
        match existing {
            Some(original) => Err(CompileError::VariableRedeclaration {
                name: name.to_string(),
                original_span: original.span,
                new_span: span,
            }),
            None => Ok(()),
        }
    }

    /// Declare a local in the innermost block.
    ///
    /// The variable occupies the next free slot, which is where the value
    /// pushed by its initializer lands. Declaration always succeeds so the
    /// slot accounting stays consistent; call
    /// [`check_redeclaration`](Self::check_redeclaration) first to report
    /// duplicates.
    pub fn declare_local(
        &mut self,
        name: &str,
        ty: &str,
        is_heap_indirected: bool,
        span: Span,
    ) -> CompiledVariable {
        let variable = CompiledVariable {
            name: name.to_string(),
            stack_offset: self.locals.len() as i64,
            ty: ty.to_string(),
            is_global: false,
            is_heap_indirected,
            span,
        };
        self.locals.push(variable.clone());
        match self.frames.last_mut() {
            Some(count) => *count += 1,
            None => self.frames.push(1),
        }
        variable
    }

    /// Declare a global at the next absolute index.
    pub fn declare_global(&mut self, name: &str, ty: &str, span: Span) -> Result<CompiledVariable, CompileError> {
        if let Some(original) = self.globals.iter().find(|g| g.name == name) {
            return Err(CompileError::VariableRedeclaration {
                name: name.to_string(),
                original_span: original.span,
                new_span: span,
            });
        }
        let variable = CompiledVariable {
            name: name.to_string(),
            stack_offset: self.globals.len() as i64,
            ty: ty.to_string(),
            is_global: true,
            is_heap_indirected: false,
            span,
        };
        self.globals.push(variable.clone());
        Ok(variable)
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Find a variable: parameters, then locals newest first, then globals.
    pub fn lookup(&self, name: &str) -> Option<&CompiledVariable> {
        self.params
            .iter()
            .find(|v| v.name == name)
            .or_else(|| self.locals.iter().rev().find(|v| v.name == name))
            .or_else(|| self.visible_globals().iter().find(|v| v.name == name))
    }

    /// Whether a name refers to any variable.
    pub fn is_variable(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Live locals in declaration order.
    pub fn locals(&self) -> &[CompiledVariable] {
        &self.locals
    }

    /// Parameters in order.
    pub fn params(&self) -> &[CompiledVariable] {
        &self.params
    }

    /// Globals in declaration order.
    pub fn globals(&self) -> &[CompiledVariable] {
        &self.globals
    }

    /// Globals lookup can see: all of them, or only those declared before
    /// the restored snapshot was taken.
    pub fn visible_globals(&self) -> &[CompiledVariable] {
        match self.global_limit {
            Some(limit) => &self.globals[..limit.min(self.globals.len())],
            None => &self.globals,
        }
    }

    // ==========================================================================
    // Snapshots
    // ==========================================================================

    /// Capture the parameter and local tables and the global count.
    pub fn snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot {
            params: self.params.clone(),
            locals: self.locals.clone(),
            frames: self.frames.clone(),
            globals: self.visible_globals().len(),
        }
    }

    /// Replace the parameter and local tables with a snapshot.
    ///
    /// Globals declared after the snapshot was taken stay hidden from
    /// lookup until a snapshot covering them is restored.
    pub fn restore(&mut self, snapshot: &ScopeSnapshot) {
        self.params = snapshot.params.clone();
        self.locals = snapshot.locals.clone();
        self.frames = snapshot.frames.clone();
        self.global_limit = (snapshot.globals < self.globals.len()).then_some(snapshot.globals);
    }
}
