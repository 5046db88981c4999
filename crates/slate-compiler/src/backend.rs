//! The bytecode generator as a [`Backend`].

use slate_core::{Diagnostics, FatalError};
use slate_ir::{Backend, SourceSet};

use crate::context::CompilationContext;
use crate::options::CompilerOptions;
use crate::passes::{CompilationPass, DeadCodePass, RegistrationPass};
use crate::program::CompiledProgram;

/// A compiled program with everything reported while producing it.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub program: CompiledProgram,
    pub diagnostics: Diagnostics,
}

impl CompileOutput {
    /// Whether the program may be executed: no errors were reported.
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Lowers a [`SourceSet`] to stack bytecode.
///
/// Each call to [`Backend::compile`] uses a fresh context, so one backend
/// can compile any number of source sets.
#[derive(Debug, Clone, Default)]
pub struct BytecodeBackend {
    options: CompilerOptions,
}

impl BytecodeBackend {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }
}

impl<'ast> Backend<'ast> for BytecodeBackend {
    type Output = CompileOutput;
    type Error = FatalError;

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn compile(&mut self, sources: &SourceSet<'ast>) -> Result<CompileOutput, FatalError> {
        let mut ctx = CompilationContext::new(self.options.clone());

        let registration = RegistrationPass::new(&mut ctx).run(sources)?;
        let dead_code = DeadCodePass::new(&mut ctx).run(&registration.globals);
        tracing::debug!(
            iterations = dead_code.iterations,
            removed = dead_code.removed.len(),
            "dead function elimination complete"
        );
        let program = CompilationPass::new(&mut ctx).run(&registration.globals)?;

        Ok(CompileOutput {
            program,
            diagnostics: std::mem::take(&mut ctx.diagnostics),
        })
    }
}
