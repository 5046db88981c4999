//! Node definitions of the intermediate tree.
//!
//! Statements and expressions are closed enums; every pass matches on them
//! exhaustively. Large variants are stored behind `&'ast` references so the
//! enums stay small and `Copy`.

pub mod builder;
pub mod decl;
pub mod expr;
pub mod ops;
pub mod stmt;
pub mod walk;

pub use builder::AstBuilder;
pub use decl::*;
pub use expr::*;
pub use ops::*;
pub use stmt::*;

use slate_core::Span;

/// An identifier with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    /// The identifier text.
    pub name: &'ast str,
    /// Source location
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    /// Create a new identifier.
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// One parsed source file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Program<'ast> {
    /// Top-level items in source order.
    pub items: &'ast [Item<'ast>],
}

impl<'ast> Program<'ast> {
    /// Create a program from its items.
    pub fn new(items: &'ast [Item<'ast>]) -> Self {
        Self { items }
    }

    /// An empty program.
    pub fn empty() -> Self {
        Self { items: &[] }
    }

    /// All function declarations.
    pub fn functions(&self) -> impl Iterator<Item = &'ast FunctionDecl<'ast>> + 'ast {
        self.items.iter().filter_map(|item| match item {
            Item::Function(f) => Some(*f),
            _ => None,
        })
    }

    /// All `using` directives.
    pub fn usings(&self) -> impl Iterator<Item = &'ast UsingDecl<'ast>> + 'ast {
        self.items.iter().filter_map(|item| match item {
            Item::Using(u) => Some(u),
            _ => None,
        })
    }
}
