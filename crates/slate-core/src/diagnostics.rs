//! The diagnostics channel a compilation reports through.
//!
//! Recoverable problems do not abort the compilation. They are appended to
//! one of three lists (errors, warnings, notes) together with the source
//! file they were found in, and compilation continues best-effort. Any
//! error makes the produced artifact invalid for execution.

use std::fmt;

use crate::{CompileError, CompileWarning, Note};

/// The severity level of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The artifact is not executable.
    Error,
    /// A potential problem that does not affect validity.
    Warning,
    /// Information about what the compiler did.
    Info,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Error => write!(f, "error"),
            DiagnosticKind::Warning => write!(f, "warning"),
            DiagnosticKind::Info => write!(f, "info"),
        }
    }
}

/// A single diagnostic with the source file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic<T> {
    /// The typed payload.
    pub detail: T,
    /// The source file or section name, if known.
    pub section: Option<String>,
}

impl<T> Diagnostic<T> {
    /// Create a diagnostic.
    pub fn new(detail: T, section: Option<&str>) -> Self {
        Self {
            detail,
            section: section.map(str::to_string),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Diagnostic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.section {
            Some(section) => write!(f, "{}: {}", section, self.detail),
            None => write!(f, "{}", self.detail),
        }
    }
}

/// All recoverable diagnostics of one compilation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    errors: Vec<Diagnostic<CompileError>>,
    warnings: Vec<Diagnostic<CompileWarning>>,
    notes: Vec<Diagnostic<Note>>,
}

impl Diagnostics {
    /// Creates a new, empty diagnostics collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn error(&mut self, section: Option<&str>, error: CompileError) {
        self.errors.push(Diagnostic::new(error, section));
    }

    /// Record a warning.
    pub fn warn(&mut self, section: Option<&str>, warning: CompileWarning) {
        self.warnings.push(Diagnostic::new(warning, section));
    }

    /// Record an informational note.
    pub fn note(&mut self, section: Option<&str>, note: Note) {
        self.notes.push(Diagnostic::new(note, section));
    }

    /// Errors in the order they were recorded.
    pub fn errors(&self) -> &[Diagnostic<CompileError>] {
        &self.errors
    }

    /// Warnings in the order they were recorded.
    pub fn warnings(&self) -> &[Diagnostic<CompileWarning>] {
        &self.warnings
    }

    /// Notes in the order they were recorded.
    pub fn notes(&self) -> &[Diagnostic<Note>] {
        &self.notes
    }

    /// Returns `true` if any error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if any recorded error is a compiler bug.
    pub fn has_internal_errors(&self) -> bool {
        self.errors.iter().any(|e| e.detail.is_internal())
    }

    /// Returns `true` if any warning was recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns `true` if nothing was recorded at all.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.notes.is_empty()
    }

    /// Total number of diagnostics.
    pub fn count(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.notes.len()
    }

    /// Move all diagnostics of `other` into this collection.
    pub fn extend(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.notes.extend(other.notes);
    }

    /// Every diagnostic rendered as `(kind, message)`, errors first.
    pub fn iter(&self) -> impl Iterator<Item = (DiagnosticKind, String)> + '_ {
        let errors = self
            .errors
            .iter()
            .map(|d| (DiagnosticKind::Error, d.to_string()));
        let warnings = self
            .warnings
            .iter()
            .map(|d| (DiagnosticKind::Warning, d.to_string()));
        let notes = self
            .notes
            .iter()
            .map(|d| (DiagnosticKind::Info, d.to_string()));
        errors.chain(warnings).chain(notes)
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (kind, message) in self.iter() {
            writeln!(f, "{}: {}", kind, message)?;
        }
        Ok(())
    }
}
