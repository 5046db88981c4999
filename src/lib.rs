//! Slate
//!
//! Source-to-bytecode compiler core for the Slate scripting language. The
//! external parser builds a [`ir::Program`] per file in a [`bumpalo::Bump`]
//! arena; this crate turns it and its imports into a
//! [`compiler::CompiledProgram`].
//!
//! - [`core`]: spans, values and diagnostics
//! - [`ir`]: the intermediate tree and the `Backend` trait
//! - [`compiler`]: the bytecode backend
//!
//! # Example
//!
//! ```
//! use slate::prelude::*;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let body = [b.ret(Some(b.binary(b.int(2), BinaryOp::Mul, b.int(21))))];
//! let answer = FunctionDecl {
//!     attributes: FunctionAttributes::EXPORT,
//!     ..b.function("answer", &[], "int", &body)
//! };
//! let program = b.program(&[b.fn_item(answer)]);
//!
//! let output = Compiler::default()
//!     .compile("main.sl", program, &mut NoImports)
//!     .unwrap();
//! assert!(output.is_valid());
//! assert!(output.program.entry_of("answer").is_some());
//! ```

pub use slate_compiler as compiler;
pub use slate_core as core;
pub use slate_ir as ir;

pub mod prelude {
    pub use bumpalo::Bump;
    pub use slate_compiler::{
        BytecodeBackend, CompileOutput, CompiledProgram, Compiler, CompilerOptions,
        ImportResolution, ImportResolver, Instruction, NoImports, OpCode, Optimizations,
    };
    pub use slate_core::{CompileError, CompileWarning, Diagnostics, FatalError, Note, Span, Value};
    pub use slate_ir::{
        AstBuilder, Backend, BinaryOp, FunctionAttributes, FunctionDecl, Program, SourceSet,
    };
}
