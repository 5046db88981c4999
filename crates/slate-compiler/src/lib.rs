//! Slate Compiler
//!
//! The code generation core: lowers the `slate-ir` tree of a set of source
//! files to one flat array of stack-machine instructions.
//!
//! ## Architecture
//!
//! - **Imports**: collect the root file and every file it reaches through `using`
//! - **Pass 1 (Registration)**: register types, functions, builtins and globals
//! - **Pass 2 (Dead functions)**: drop functions nothing can call
//! - **Pass 3 (Compilation)**: lay out the program, lower every body and
//!   patch forward calls
//!
//! ## Modules
//!
//! - [`bytecode`]: Opcodes and instructions
//! - [`context`]: Mutable state of one compilation
//! - [`emit`]: Instruction emitter with jump patching and loop bookkeeping
//! - [`expr`]: Expression lowering
//! - [`stmt`]: Statement lowering
//! - [`function_compiler`]: Per-function driver
//! - [`symbols`]: Function and type tables
//! - [`scope`]: Parameter, local and global variable table
//! - [`backpatch`]: Calls waiting for their target's address
//! - [`debug_info`]: Instruction to source mapping
//! - [`imports`]: Import loading and suggestions
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use slate_compiler::{Compiler, CompilerOptions, NoImports};
//! use slate_ir::{AstBuilder, FunctionAttributes, FunctionDecl};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let main = FunctionDecl {
//!     attributes: FunctionAttributes::ENTRY,
//!     ..b.function("main", &[], "void", &[])
//! };
//! let program = b.program(&[b.fn_item(main)]);
//!
//! let compiler = Compiler::new(CompilerOptions::default());
//! let output = compiler.compile("main.sl", program, &mut NoImports).unwrap();
//! assert!(output.is_valid());
//! ```

pub mod backend;
pub mod backpatch;
pub mod bytecode;
pub mod context;
pub mod debug_info;
pub mod emit;
pub mod expr;
mod expr_info;
pub mod fold;
pub mod function_compiler;
pub mod imports;
pub mod infer;
mod options;
pub mod passes;
pub mod program;
pub mod resolve;
pub mod scope;
pub mod stmt;
pub mod symbols;
pub mod types;

pub use backend::{BytecodeBackend, CompileOutput};
pub use bytecode::{Instruction, OpCode};
pub use context::CompilationContext;
pub use debug_info::{DebugInfo, FunctionInformation, SourceCodeLocation, StackSlot};
pub use emit::{InstructionEmitter, JumpLabel};
pub use expr::ExprCompiler;
pub use expr_info::ExprInfo;
pub use imports::{ImportResolution, ImportResolver, NoImports, load_sources};
pub use options::{CompilerOptions, Optimizations};
pub use program::CompiledProgram;
pub use stmt::StmtCompiler;
pub use symbols::{CompiledFunction, CompiledType, FunctionId, TypeKind};

pub use slate_core::{CompileError, CompileWarning, Diagnostics, FatalError, Note};

use slate_ir::{Backend, Program, SourceSet};

/// The main compiler entry point.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    /// Compile an already collected set of files.
    pub fn compile_sources(&self, sources: &SourceSet<'_>) -> Result<CompileOutput, FatalError> {
        BytecodeBackend::new(self.options.clone()).compile(sources)
    }

    /// Load `program` and its imports through `resolver`, then compile.
    ///
    /// Import warnings come first in the returned diagnostics.
    pub fn compile<'ast, R>(
        &self,
        root_path: &str,
        program: Program<'ast>,
        resolver: &mut R,
    ) -> Result<CompileOutput, FatalError>
    where
        R: ImportResolver<'ast> + ?Sized,
    {
        let mut diagnostics = Diagnostics::new();
        let sources = load_sources(root_path, program, resolver, &mut diagnostics)?;
        let mut output = BytecodeBackend::new(self.options.clone()).compile(&sources)?;
        diagnostics.extend(output.diagnostics);
        output.diagnostics = diagnostics;
        Ok(output)
    }
}
