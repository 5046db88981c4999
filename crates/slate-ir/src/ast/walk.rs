//! Read-only traversal of statement and expression trees.
//!
//! Implement [`Visitor`] and override the hooks you care about; the
//! default methods recurse into every child.

use crate::ast::{Block, Expr, Stmt};

/// A tree visitor. Default methods walk every child node.
pub trait Visitor<'ast> {
    /// Called for every statement.
    fn visit_stmt(&mut self, stmt: &Stmt<'ast>) {
        walk_stmt(self, stmt);
    }

    /// Called for every expression.
    fn visit_expr(&mut self, expr: &Expr<'ast>) {
        walk_expr(self, expr);
    }
}

/// Visit every statement of a block.
pub fn walk_block<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, block: &Block<'ast>) {
    for stmt in block.stmts {
        visitor.visit_stmt(stmt);
    }
}

/// Visit the children of a statement.
pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, stmt: &Stmt<'ast>) {
    match stmt {
        Stmt::Expr(s) => visitor.visit_expr(&s.expr),
        Stmt::VarDecl(s) => {
            if let Some(init) = &s.init {
                visitor.visit_expr(init);
            }
        }
        Stmt::Assign(s) => {
            visitor.visit_expr(&s.target);
            visitor.visit_expr(&s.value);
        }
        Stmt::Return(s) => {
            if let Some(value) = &s.value {
                visitor.visit_expr(value);
            }
        }
        Stmt::Break(_) => {}
        Stmt::Block(block) => walk_block(visitor, block),
        Stmt::If(s) => {
            for branch in s.branches {
                visitor.visit_expr(&branch.condition);
                walk_block(visitor, &branch.body);
            }
            if let Some(else_block) = &s.else_block {
                walk_block(visitor, else_block);
            }
        }
        Stmt::While(s) => {
            visitor.visit_expr(&s.condition);
            walk_block(visitor, &s.body);
        }
        Stmt::For(s) => {
            if let Some(init) = &s.init {
                visitor.visit_stmt(init);
            }
            if let Some(condition) = &s.condition {
                visitor.visit_expr(condition);
            }
            if let Some(step) = &s.step {
                visitor.visit_stmt(step);
            }
            walk_block(visitor, &s.body);
        }
    }
}

/// Visit the children of an expression.
pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &Expr<'ast>) {
    match expr {
        Expr::Literal(_) | Expr::Ident(_) => {}
        Expr::Field(e) => visitor.visit_expr(&e.object),
        Expr::Index(e) => {
            visitor.visit_expr(&e.object);
            visitor.visit_expr(&e.index);
        }
        Expr::Binary(e) => {
            visitor.visit_expr(&e.left);
            visitor.visit_expr(&e.right);
        }
        Expr::Unary(e) => visitor.visit_expr(&e.operand),
        Expr::Call(call) => {
            if let Some(receiver) = &call.receiver {
                visitor.visit_expr(receiver);
            }
            for arg in call.args {
                visitor.visit_expr(arg);
            }
        }
        Expr::New(e) => {
            for arg in e.args {
                visitor.visit_expr(arg);
            }
        }
        Expr::List(e) => {
            for element in e.elements {
                visitor.visit_expr(element);
            }
        }
    }
}

/// Number of variable declarations anywhere inside a block.
pub fn count_declarations(block: &Block<'_>) -> usize {
    struct Counter(usize);

    impl<'ast> Visitor<'ast> for Counter {
        fn visit_stmt(&mut self, stmt: &Stmt<'ast>) {
            if let Stmt::VarDecl(_) = stmt {
                self.0 += 1;
            }
            walk_stmt(self, stmt);
        }
    }

    let mut counter = Counter(0);
    walk_block(&mut counter, block);
    counter.0
}

/// Whether a `break` targets the loop whose body this is.
///
/// Breaks inside nested loops belong to those loops and are not counted.
pub fn body_breaks(block: &Block<'_>) -> bool {
    struct Finder(bool);

    impl<'ast> Visitor<'ast> for Finder {
        fn visit_stmt(&mut self, stmt: &Stmt<'ast>) {
            match stmt {
                Stmt::Break(_) => self.0 = true,
                Stmt::While(_) | Stmt::For(_) => {}
                _ => walk_stmt(self, stmt),
            }
        }

        fn visit_expr(&mut self, _expr: &Expr<'ast>) {}
    }

    let mut finder = Finder(false);
    walk_block(&mut finder, block);
    finder.0
}
