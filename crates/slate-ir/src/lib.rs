//! Intermediate tree for the Slate compiler.
//!
//! The external parser produces a [`Program`] per source file. All nodes
//! live in a [`bumpalo::Bump`] arena and are immutable once built, so any
//! number of code generators can walk the same tree through the
//! [`Backend`] trait.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use slate_ir::{AstBuilder, BinaryOp, SourceSet};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//!
//! let body = [b.ret(Some(b.binary(b.int(1), BinaryOp::Add, b.int(2))))];
//! let main = b.function("main", &[], "int", &body);
//! let program = b.program(&[b.fn_item(main)]);
//!
//! let sources = SourceSet::new("main.sl", program);
//! assert_eq!(sources.len(), 1);
//! ```

pub mod ast;
pub mod backend;
pub mod source;

pub use ast::*;
pub use backend::Backend;
pub use source::{SourceSet, SourceUnit};
