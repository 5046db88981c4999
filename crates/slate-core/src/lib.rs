//! Core types shared by every Slate compiler crate.
//!
//! - [`Span`]: source positions attached to IR nodes and diagnostics
//! - [`Value`]: literal, folded and operand values
//! - [`error`]: the fatal/compile/warning/note taxonomy
//! - [`Diagnostics`]: the collected, non-fatal diagnostics channel

pub mod diagnostics;
pub mod error;
pub mod span;
pub mod value;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{CompileError, CompileWarning, FatalError, Note};
pub use span::Span;
pub use value::Value;
