//! Statement nodes.

use slate_core::Span;

use crate::ast::expr::Expr;
use crate::ast::{AssignOp, Ident};

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// Expression statement (expr;)
    Expr(ExprStmt<'ast>),
    /// Variable declaration
    VarDecl(&'ast VarDeclStmt<'ast>),
    /// Assignment (plain or compound)
    Assign(&'ast AssignStmt<'ast>),
    /// Return statement
    Return(ReturnStmt<'ast>),
    /// Break statement
    Break(BreakStmt),
    /// Block statement
    Block(Block<'ast>),
    /// If / elseif / else chain
    If(&'ast IfStmt<'ast>),
    /// While loop
    While(&'ast WhileStmt<'ast>),
    /// For loop
    For(&'ast ForStmt<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(s) => s.span,
            Self::VarDecl(s) => s.span,
            Self::Assign(s) => s.span,
            Self::Return(s) => s.span,
            Self::Break(s) => s.span,
            Self::Block(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::For(s) => s.span,
        }
    }
}

/// An expression evaluated for its side effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    /// The expression
    pub expr: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A variable declaration.
///
/// Examples:
/// - `int x = 5;`
/// - `var items = [1, 2];` (type inferred, `ty` is `None`)
/// - `heap Point p = new Point(1, 2);`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclStmt<'ast> {
    /// Declared type, `None` to infer from the initializer
    pub ty: Option<&'ast str>,
    /// Variable name
    pub name: Ident<'ast>,
    /// Optional initializer
    pub init: Option<Expr<'ast>>,
    /// Whether the slot holds a heap pointer
    pub is_heap: bool,
    /// Source location
    pub span: Span,
}

/// An assignment to a variable, field or list element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignStmt<'ast> {
    /// Left-hand side (`Ident`, `Field` or `Index`)
    pub target: Expr<'ast>,
    /// Operator
    pub op: AssignOp,
    /// Right-hand side
    pub value: Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A return statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    /// Optional return value
    pub value: Option<Expr<'ast>>,
    /// Source location
    pub span: Span,
}

/// A break statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakStmt {
    /// Source location
    pub span: Span,
}

/// A block of statements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    /// Statements in the block
    pub stmts: &'ast [Stmt<'ast>],
    /// Source location
    pub span: Span,
}

impl Block<'_> {
    /// An empty block.
    pub fn empty(span: Span) -> Self {
        Block { stmts: &[], span }
    }
}

/// One `if`/`elseif` arm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionalBranch<'ast> {
    /// Branch condition
    pub condition: Expr<'ast>,
    /// Branch body
    pub body: Block<'ast>,
}

/// An `if` / `elseif` / `else` chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    /// The `if` arm followed by every `elseif` arm
    pub branches: &'ast [ConditionalBranch<'ast>],
    /// Optional `else` body
    pub else_block: Option<Block<'ast>>,
    /// Source location
    pub span: Span,
}

/// A while loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    /// Loop condition
    pub condition: Expr<'ast>,
    /// Loop body
    pub body: Block<'ast>,
    /// Source location
    pub span: Span,
}

/// A for loop: `for (init; condition; step) body`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    /// Initializer statement
    pub init: Option<Stmt<'ast>>,
    /// Condition (absent means always true)
    pub condition: Option<Expr<'ast>>,
    /// Step statement run after each iteration
    pub step: Option<Stmt<'ast>>,
    /// Loop body
    pub body: Block<'ast>,
    /// Source location
    pub span: Span,
}
