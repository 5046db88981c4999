//! Compiler configuration.

use bitflags::bitflags;

bitflags! {
    /// Optimizations the code generator may apply.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Optimizations: u8 {
        /// Replace literal-only operator trees with their value.
        const FOLD_CONSTANTS = 1 << 0;
        /// Skip code behind conditions known to be false.
        const TRIM_UNREACHABLE = 1 << 1;
        /// Remove functions nothing calls.
        const ELIMINATE_DEAD_FUNCTIONS = 1 << 2;
    }
}

impl Default for Optimizations {
    fn default() -> Self {
        Self::all()
    }
}

/// Options for one compilation.
///
/// # Example
///
/// ```
/// use slate_compiler::{CompilerOptions, Optimizations};
///
/// let options = CompilerOptions::default()
///     .with_optimizations(Optimizations::FOLD_CONSTANTS)
///     .with_comments(true);
/// assert!(options.folds_constants());
/// assert!(!options.eliminates_dead_functions());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Enabled optimizations.
    pub optimizations: Optimizations,
    /// Emit `Comment` pseudo-instructions.
    pub emit_comments: bool,
    /// Attach free-text tags to instructions.
    pub emit_debug_tags: bool,
    /// Upper bound on dead-function elimination rounds.
    pub max_dead_code_iterations: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            optimizations: Optimizations::default(),
            emit_comments: false,
            emit_debug_tags: false,
            max_dead_code_iterations: 16,
        }
    }
}

impl CompilerOptions {
    /// Options with every optimization disabled.
    pub fn unoptimized() -> Self {
        Self::default().with_optimizations(Optimizations::empty())
    }

    /// Replace the optimization set.
    pub fn with_optimizations(mut self, optimizations: Optimizations) -> Self {
        self.optimizations = optimizations;
        self
    }

    /// Toggle comment emission.
    pub fn with_comments(mut self, enabled: bool) -> Self {
        self.emit_comments = enabled;
        self
    }

    /// Toggle debug tags.
    pub fn with_debug_tags(mut self, enabled: bool) -> Self {
        self.emit_debug_tags = enabled;
        self
    }

    /// Set the dead-function elimination round limit.
    pub fn with_max_dead_code_iterations(mut self, iterations: usize) -> Self {
        self.max_dead_code_iterations = iterations;
        self
    }

    pub fn folds_constants(&self) -> bool {
        self.optimizations.contains(Optimizations::FOLD_CONSTANTS)
    }

    pub fn trims_unreachable(&self) -> bool {
        self.optimizations.contains(Optimizations::TRIM_UNREACHABLE)
    }

    pub fn eliminates_dead_functions(&self) -> bool {
        self.optimizations
            .contains(Optimizations::ELIMINATE_DEAD_FUNCTIONS)
    }
}
