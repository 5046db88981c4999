//! Error types for the Slate compiler.
//!
//! ## Error Hierarchy
//!
//! ```text
//! FatalError      - aborts the compilation, no artifact is produced
//! CompileError    - collected; the artifact exists but is not executable
//! CompileWarning  - collected; does not affect validity
//! Note            - informational (predictions, trimmed code, removed functions)
//! ```
//!
//! `CompileError::Internal` marks a bug in the compiler rather than in the
//! input program; use [`CompileError::is_internal`] to tell them apart.

use std::fmt;

use thiserror::Error;

use crate::{Span, Value};

// ============================================================================
// Fatal Errors
// ============================================================================

/// Errors that abort the whole compilation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FatalError {
    /// A `#`-directive could not be understood.
    #[error("at {span}: malformed compile tag '#{kind} {text}': {reason}")]
    MalformedCompileTag {
        /// Tag kind (the word after `#`).
        kind: String,
        /// Raw tag text.
        text: String,
        /// What is wrong with it.
        reason: String,
        /// Where the tag appeared.
        span: Span,
    },

    /// The import resolver found a file but could not read or parse it.
    #[error("at {span}: cannot import '{path}': {message}")]
    Import {
        /// The `using` path.
        path: String,
        /// Resolver-provided reason.
        message: String,
        /// Where the `using` appeared.
        span: Span,
    },

    /// An invariant the compiler relies on did not hold.
    #[error("internal compiler error: {message}")]
    Internal {
        /// Description of the violated invariant.
        message: String,
    },
}

// ============================================================================
// Compile Errors
// ============================================================================

/// Recoverable errors collected while compiling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A function, struct or class was declared twice.
    #[error("at {span}: duplicate {kind} '{name}'")]
    DuplicateDefinition {
        /// "function", "struct" or "class".
        kind: &'static str,
        /// Call ID or type name of the duplicate.
        name: String,
        /// Where the second declaration is.
        span: Span,
    },

    /// A referenced variable could not be found.
    #[error("at {span}: unknown variable '{name}'")]
    UnknownVariable {
        /// The variable name that wasn't found.
        name: String,
        /// Where the variable was referenced.
        span: Span,
    },

    /// No function matches a call's signature.
    #[error("at {span}: unknown function '{signature}'")]
    UnknownFunction {
        /// Readable signature of the call site.
        signature: String,
        /// Where the function was called.
        span: Span,
    },

    /// A type has no method with the call's signature.
    #[error("at {span}: type '{type_name}' has no method '{signature}'")]
    UnknownMethod {
        /// The receiver type.
        type_name: String,
        /// Readable signature of the call site.
        signature: String,
        /// Where the method was called.
        span: Span,
    },

    /// A referenced type could not be found.
    #[error("at {span}: unknown type '{name}'")]
    UnknownType {
        /// The type name that wasn't found.
        name: String,
        /// Where the type was referenced.
        span: Span,
    },

    /// A field access names a field the type does not have.
    #[error("at {span}: type '{type_name}' has no field '{field}'")]
    UnknownField {
        /// The object's type.
        type_name: String,
        /// The missing field.
        field: String,
        /// Where the access occurred.
        span: Span,
    },

    /// A call passes the wrong number of arguments.
    #[error("at {span}: '{name}' expects {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        /// Function name.
        name: String,
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        got: usize,
        /// Where the call occurred.
        span: Span,
    },

    /// A method was called without a receiver.
    #[error("at {span}: '{signature}' is a method of '{owner}' and needs a receiver")]
    MethodCalledAsFunction {
        /// Readable signature.
        signature: String,
        /// Type declaring the method.
        owner: String,
        /// Where the call occurred.
        span: Span,
    },

    /// A free function was called through a receiver.
    #[error("at {span}: '{signature}' is a function, not a method")]
    FunctionCalledAsMethod {
        /// Readable signature.
        signature: String,
        /// Where the call occurred.
        span: Span,
    },

    /// A protected function was called from another file.
    #[error("at {span}: '{signature}' is protected and only callable from '{file}'")]
    ProtectedAccess {
        /// Readable signature.
        signature: String,
        /// The file that declares the function.
        file: String,
        /// Where the call occurred.
        span: Span,
    },

    /// `break` with no enclosing loop.
    #[error("at {span}: break statement not inside a loop")]
    BreakOutsideLoop {
        /// Where the break occurred.
        span: Span,
    },

    /// `return` outside of any function body.
    #[error("at {span}: return statement outside of a function")]
    ReturnOutsideFunction {
        /// Where the return occurred.
        span: Span,
    },

    /// A value's type does not fit where it is used.
    #[error("at {span}: expected '{expected}', found '{found}'")]
    TypeMismatch {
        /// Required type.
        expected: String,
        /// Actual type.
        found: String,
        /// Where the mismatch occurred.
        span: Span,
    },

    /// A variable was declared twice in the same block.
    #[error("at {new_span}: variable '{name}' redeclared (originally declared at {original_span})")]
    VariableRedeclaration {
        /// The variable name.
        name: String,
        /// Where the variable was originally declared.
        original_span: Span,
        /// Where the redeclaration occurred.
        new_span: Span,
    },

    /// An operation that is not valid for its operands.
    #[error("at {span}: {message}")]
    InvalidOperation {
        /// Description of what's invalid.
        message: String,
        /// Where the operation occurred.
        span: Span,
    },

    /// A compiler bug surfaced while lowering this program.
    #[error("at {span}: internal compiler error: {message}")]
    Internal {
        /// Description of the violated invariant.
        message: String,
        /// Where lowering was when it happened.
        span: Span,
    },
}

impl CompileError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompileError::DuplicateDefinition { span, .. } => *span,
            CompileError::UnknownVariable { span, .. } => *span,
            CompileError::UnknownFunction { span, .. } => *span,
            CompileError::UnknownMethod { span, .. } => *span,
            CompileError::UnknownType { span, .. } => *span,
            CompileError::UnknownField { span, .. } => *span,
            CompileError::ArgumentCountMismatch { span, .. } => *span,
            CompileError::MethodCalledAsFunction { span, .. } => *span,
            CompileError::FunctionCalledAsMethod { span, .. } => *span,
            CompileError::ProtectedAccess { span, .. } => *span,
            CompileError::BreakOutsideLoop { span } => *span,
            CompileError::ReturnOutsideFunction { span } => *span,
            CompileError::TypeMismatch { span, .. } => *span,
            CompileError::VariableRedeclaration { new_span, .. } => *new_span,
            CompileError::InvalidOperation { span, .. } => *span,
            CompileError::Internal { span, .. } => *span,
        }
    }

    /// Whether this error reports a compiler bug rather than a user mistake.
    pub fn is_internal(&self) -> bool {
        matches!(self, CompileError::Internal { .. })
    }
}

// ============================================================================
// Warnings
// ============================================================================

/// Non-blocking problems.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileWarning {
    /// The two operands of a binary operator infer to different types.
    #[error("at {span}: operands of '{op}' have different types '{left}' and '{right}'")]
    OperandTypeMismatch {
        /// Operator text.
        op: String,
        /// Left operand type.
        left: String,
        /// Right operand type.
        right: String,
        /// Where the operator is.
        span: Span,
    },

    /// A loop whose condition is always true and whose body never breaks.
    #[error("at {span}: infinite loop: condition is always true and the body never breaks")]
    InfiniteLoop {
        /// Where the loop is.
        span: Span,
    },

    /// A file was imported more than once.
    #[error("at {span}: '{path}' is already imported")]
    DuplicateImport {
        /// Resolved path.
        path: String,
        /// Where the second `using` is.
        span: Span,
    },

    /// A `using` could not be resolved.
    #[error("at {span}: cannot resolve import '{path}'{}", did_you_mean(.suggestion))]
    UnresolvedImport {
        /// The `using` path.
        path: String,
        /// Nearest sibling file name, if any.
        suggestion: Option<String>,
        /// Where the `using` is.
        span: Span,
    },

    /// A `#`-directive of a kind the compiler does not know.
    #[error("at {span}: unknown compile tag '#{kind}' ignored")]
    UnknownCompileTag {
        /// Tag kind.
        kind: String,
        /// Where the tag is.
        span: Span,
    },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{}'?)", name),
        None => String::new(),
    }
}

impl CompileWarning {
    /// Get the span where this warning occurred.
    pub fn span(&self) -> Span {
        match self {
            CompileWarning::OperandTypeMismatch { span, .. } => *span,
            CompileWarning::InfiniteLoop { span } => *span,
            CompileWarning::DuplicateImport { span, .. } => *span,
            CompileWarning::UnresolvedImport { span, .. } => *span,
            CompileWarning::UnknownCompileTag { span, .. } => *span,
        }
    }
}

// ============================================================================
// Notes
// ============================================================================

/// Informational messages about what the compiler did.
#[derive(Debug, Clone, PartialEq)]
pub enum Note {
    /// A constant expression was replaced by its value.
    PredictedValue {
        /// The folded value.
        value: Value,
        /// Where the expression is.
        span: Span,
    },

    /// A block was proven unreachable and not emitted.
    UnreachableCode {
        /// Where the block starts.
        span: Span,
    },

    /// A function with no callers was removed before emission.
    UnusedFunction {
        /// Readable signature of the removed function.
        signature: String,
        /// Where the function was declared.
        span: Span,
    },
}

impl Note {
    /// Get the span this note refers to.
    pub fn span(&self) -> Span {
        match self {
            Note::PredictedValue { span, .. } => *span,
            Note::UnreachableCode { span } => *span,
            Note::UnusedFunction { span, .. } => *span,
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Note::PredictedValue { value, span } => {
                write!(f, "at {}: predicted value: {}", span, value)
            }
            Note::UnreachableCode { span } => {
                write!(f, "at {}: unreachable code not compiled", span)
            }
            Note::UnusedFunction { signature, span } => {
                write!(f, "at {}: unused function '{}' is not compiled", span, signature)
            }
        }
    }
}
