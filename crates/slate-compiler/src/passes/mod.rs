//! Compiler passes.
//!
//! - [`registration`]: Pass 1 - register types, functions, builtins and globals
//! - [`dead_code`]: Pass 2 - drop functions nothing can call
//! - [`compilation`]: Pass 3 - lay out the program and lower every body

pub mod compilation;
pub mod dead_code;
pub mod registration;

pub use compilation::CompilationPass;
pub use dead_code::{DeadCodeOutput, DeadCodePass};
pub use registration::{GlobalDecl, RegistrationOutput, RegistrationPass};
