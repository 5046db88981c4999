//! Arena-backed constructors for the intermediate tree.
//!
//! The parser and the tests build trees through [`AstBuilder`] instead of
//! spelling out node structs. Every node gets the builder's current line
//! as its span; call [`AstBuilder::at`] to move it.

use std::cell::Cell;

use bumpalo::Bump;
use slate_core::Span;

use crate::ast::*;

/// Builds intermediate tree nodes in an arena.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    line: Cell<u32>,
}

impl<'ast> AstBuilder<'ast> {
    /// Create a builder that allocates into `arena`, starting at line 1.
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            line: Cell::new(1),
        }
    }

    /// Set the line stamped on subsequently built nodes.
    pub fn at(&self, line: u32) -> &Self {
        self.line.set(line);
        self
    }

    /// The span new nodes receive.
    pub fn span(&self) -> Span {
        Span::point(self.line.get(), 1)
    }

    /// The underlying arena.
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    fn text(&self, text: &str) -> &'ast str {
        self.arena.alloc_str(text)
    }

    fn exprs(&self, exprs: &[Expr<'ast>]) -> &'ast [Expr<'ast>] {
        self.arena.alloc_slice_copy(exprs)
    }

    fn stmts(&self, stmts: &[Stmt<'ast>]) -> &'ast [Stmt<'ast>] {
        self.arena.alloc_slice_copy(stmts)
    }

    /// An identifier.
    pub fn ident(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.text(name), self.span())
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn literal(&self, kind: LiteralKind<'ast>) -> Expr<'ast> {
        Expr::Literal(LiteralExpr {
            kind,
            span: self.span(),
        })
    }

    /// Integer literal.
    pub fn int(&self, value: i64) -> Expr<'ast> {
        self.literal(LiteralKind::Int(value))
    }

    /// Float literal.
    pub fn float(&self, value: f64) -> Expr<'ast> {
        self.literal(LiteralKind::Float(value))
    }

    /// Boolean literal.
    pub fn bool(&self, value: bool) -> Expr<'ast> {
        self.literal(LiteralKind::Bool(value))
    }

    /// String literal.
    pub fn str(&self, value: &str) -> Expr<'ast> {
        self.literal(LiteralKind::Str(self.text(value)))
    }

    /// Variable, parameter or namespace reference.
    pub fn var_ref(&self, name: &str) -> Expr<'ast> {
        Expr::Ident(self.ident(name))
    }

    /// `object.field`
    pub fn field(&self, object: Expr<'ast>, field: &str) -> Expr<'ast> {
        Expr::Field(self.arena.alloc(FieldExpr {
            object,
            field: self.ident(field),
            span: self.span(),
        }))
    }

    /// `object[index]`
    pub fn index(&self, object: Expr<'ast>, index: Expr<'ast>) -> Expr<'ast> {
        Expr::Index(self.arena.alloc(IndexExpr {
            object,
            index,
            span: self.span(),
        }))
    }

    /// `left op right`
    pub fn binary(&self, left: Expr<'ast>, op: BinaryOp, right: Expr<'ast>) -> Expr<'ast> {
        Expr::Binary(self.arena.alloc(BinaryExpr {
            left,
            op,
            right,
            span: self.span(),
        }))
    }

    /// `op operand`
    pub fn unary(&self, op: UnaryOp, operand: Expr<'ast>) -> Expr<'ast> {
        Expr::Unary(self.arena.alloc(UnaryExpr {
            op,
            operand,
            span: self.span(),
        }))
    }

    fn call_node(
        &self,
        receiver: Option<Expr<'ast>>,
        target_namespace: Option<&str>,
        name: &str,
        args: &[Expr<'ast>],
    ) -> Expr<'ast> {
        Expr::Call(self.arena.alloc(CallExpr {
            receiver,
            name: self.ident(name),
            target_namespace: target_namespace.map(|ns| self.text(ns)),
            args: self.exprs(args),
            span: self.span(),
        }))
    }

    /// `name(args)`
    pub fn call(&self, name: &str, args: &[Expr<'ast>]) -> Expr<'ast> {
        self.call_node(None, None, name, args)
    }

    /// `receiver.name(args)`
    pub fn method_call(&self, receiver: Expr<'ast>, name: &str, args: &[Expr<'ast>]) -> Expr<'ast> {
        self.call_node(Some(receiver), None, name, args)
    }

    /// `a.b.name(args)` where `path` is `"a.b"`.
    ///
    /// The path becomes a chain of identifier/field nodes, exactly what the
    /// parser produces for a dotted call.
    pub fn path_call(&self, path: &str, name: &str, args: &[Expr<'ast>]) -> Expr<'ast> {
        let mut parts = path.split('.');
        let receiver = parts.next().map(|first| {
            parts.fold(self.var_ref(first), |object, part| self.field(object, part))
        });
        self.call_node(receiver, None, name, args)
    }

    /// A call carrying an explicit target namespace.
    pub fn ns_call(&self, namespace: &str, name: &str, args: &[Expr<'ast>]) -> Expr<'ast> {
        self.call_node(None, Some(namespace), name, args)
    }

    /// `new type_name(args)`
    pub fn new_obj(&self, type_name: &str, args: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::New(self.arena.alloc(NewExpr {
            type_name: self.ident(type_name),
            args: self.exprs(args),
            span: self.span(),
        }))
    }

    /// `[elements]`
    pub fn list(&self, elements: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::List(ListExpr {
            elements: self.exprs(elements),
            span: self.span(),
        })
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    /// Expression statement.
    pub fn expr(&self, expr: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Expr(ExprStmt {
            expr,
            span: self.span(),
        })
    }

    /// Variable declaration node.
    pub fn var_decl(
        &self,
        ty: Option<&str>,
        name: &str,
        init: Option<Expr<'ast>>,
        is_heap: bool,
    ) -> &'ast VarDeclStmt<'ast> {
        self.arena.alloc(VarDeclStmt {
            ty: ty.map(|t| self.text(t)),
            name: self.ident(name),
            init,
            is_heap,
            span: self.span(),
        })
    }

    /// `ty name = init;`
    pub fn var(&self, ty: Option<&str>, name: &str, init: Option<Expr<'ast>>) -> Stmt<'ast> {
        Stmt::VarDecl(self.var_decl(ty, name, init, false))
    }

    /// `heap ty name = init;`
    pub fn heap_var(&self, ty: Option<&str>, name: &str, init: Option<Expr<'ast>>) -> Stmt<'ast> {
        Stmt::VarDecl(self.var_decl(ty, name, init, true))
    }

    /// `target = value;`
    pub fn assign(&self, target: Expr<'ast>, value: Expr<'ast>) -> Stmt<'ast> {
        self.compound_assign(target, AssignOp::Assign, value)
    }

    /// `target op= value;`
    pub fn compound_assign(&self, target: Expr<'ast>, op: AssignOp, value: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Assign(self.arena.alloc(AssignStmt {
            target,
            op,
            value,
            span: self.span(),
        }))
    }

    /// `return value;`
    pub fn ret(&self, value: Option<Expr<'ast>>) -> Stmt<'ast> {
        Stmt::Return(ReturnStmt {
            value,
            span: self.span(),
        })
    }

    /// `break;`
    pub fn brk(&self) -> Stmt<'ast> {
        Stmt::Break(BreakStmt { span: self.span() })
    }

    /// A block.
    pub fn block(&self, stmts: &[Stmt<'ast>]) -> Block<'ast> {
        Block {
            stmts: self.stmts(stmts),
            span: self.span(),
        }
    }

    /// A nested block statement.
    pub fn block_stmt(&self, block: Block<'ast>) -> Stmt<'ast> {
        Stmt::Block(block)
    }

    /// `if (condition) { then } else { otherwise }`
    pub fn if_(
        &self,
        condition: Expr<'ast>,
        then: &[Stmt<'ast>],
        otherwise: Option<&[Stmt<'ast>]>,
    ) -> Stmt<'ast> {
        self.if_chain(&[(condition, then)], otherwise)
    }

    /// `if (...) {...} elseif (...) {...} else {...}`
    pub fn if_chain(
        &self,
        branches: &[(Expr<'ast>, &[Stmt<'ast>])],
        otherwise: Option<&[Stmt<'ast>]>,
    ) -> Stmt<'ast> {
        let branches: Vec<ConditionalBranch<'ast>> = branches
            .iter()
            .map(|(condition, body)| ConditionalBranch {
                condition: *condition,
                body: self.block(body),
            })
            .collect();
        Stmt::If(self.arena.alloc(IfStmt {
            branches: self.arena.alloc_slice_copy(&branches),
            else_block: otherwise.map(|stmts| self.block(stmts)),
            span: self.span(),
        }))
    }

    /// `while (condition) { body }`
    pub fn while_(&self, condition: Expr<'ast>, body: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::While(self.arena.alloc(WhileStmt {
            condition,
            body: self.block(body),
            span: self.span(),
        }))
    }

    /// `for (init; condition; step) { body }`
    pub fn for_(
        &self,
        init: Option<Stmt<'ast>>,
        condition: Option<Expr<'ast>>,
        step: Option<Stmt<'ast>>,
        body: &[Stmt<'ast>],
    ) -> Stmt<'ast> {
        Stmt::For(self.arena.alloc(ForStmt {
            init,
            condition,
            step,
            body: self.block(body),
            span: self.span(),
        }))
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    /// A parameter.
    pub fn param(&self, name: &str, ty: &str) -> Param<'ast> {
        Param {
            name: self.ident(name),
            ty: self.text(ty),
        }
    }

    /// A function declaration with no attributes.
    ///
    /// `params` are `(name, type)` pairs.
    pub fn function(
        &self,
        name: &str,
        params: &[(&str, &str)],
        return_type: &str,
        body: &[Stmt<'ast>],
    ) -> FunctionDecl<'ast> {
        let params: Vec<Param<'ast>> = params.iter().map(|(n, t)| self.param(n, t)).collect();
        FunctionDecl {
            name: self.ident(name),
            namespace: None,
            params: self.arena.alloc_slice_copy(&params),
            return_type: self.text(return_type),
            attributes: FunctionAttributes::empty(),
            builtin: None,
            body: self.block(body),
            span: self.span(),
        }
    }

    /// A struct or class declaration. `fields` are `(name, type)` pairs.
    pub fn type_decl(
        &self,
        name: &str,
        fields: &[(&str, &str)],
        methods: &[FunctionDecl<'ast>],
    ) -> TypeDecl<'ast> {
        let fields: Vec<FieldDecl<'ast>> = fields
            .iter()
            .map(|(n, t)| FieldDecl {
                name: self.ident(n),
                ty: self.text(t),
            })
            .collect();
        TypeDecl {
            name: self.ident(name),
            fields: self.arena.alloc_slice_copy(&fields),
            methods: self.arena.alloc_slice_copy(methods),
            builtin_constructor: None,
            span: self.span(),
        }
    }

    /// Function item.
    pub fn fn_item(&self, decl: FunctionDecl<'ast>) -> Item<'ast> {
        Item::Function(self.arena.alloc(decl))
    }

    /// Struct item.
    pub fn struct_item(&self, decl: TypeDecl<'ast>) -> Item<'ast> {
        Item::Struct(self.arena.alloc(decl))
    }

    /// Class item.
    pub fn class_item(&self, decl: TypeDecl<'ast>) -> Item<'ast> {
        Item::Class(self.arena.alloc(decl))
    }

    /// Global variable item.
    pub fn global(&self, ty: Option<&str>, name: &str, init: Option<Expr<'ast>>) -> Item<'ast> {
        Item::GlobalVar(self.var_decl(ty, name, init, false))
    }

    /// `#kind text`
    pub fn tag(&self, kind: &str, text: &str) -> Item<'ast> {
        Item::CompileTag(CompileTag {
            kind: self.text(kind),
            text: self.text(text),
            span: self.span(),
        })
    }

    /// `using "path";`
    pub fn using(&self, path: &str) -> Item<'ast> {
        Item::Using(UsingDecl {
            path: self.text(path),
            span: self.span(),
        })
    }

    /// A program from items.
    pub fn program(&self, items: &[Item<'ast>]) -> Program<'ast> {
        Program::new(self.arena.alloc_slice_copy(items))
    }
}
