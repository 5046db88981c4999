//! Declaration nodes: functions, structs, classes, globals, compile tags
//! and `using` directives.

use bitflags::bitflags;
use slate_core::Span;

use crate::ast::stmt::{Block, VarDeclStmt};
use crate::ast::Ident;

/// A top-level item in a source file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'ast> {
    /// Function declaration
    Function(&'ast FunctionDecl<'ast>),
    /// Struct declaration (value type)
    Struct(&'ast TypeDecl<'ast>),
    /// Class declaration (reference type)
    Class(&'ast TypeDecl<'ast>),
    /// Global variable declaration
    GlobalVar(&'ast VarDeclStmt<'ast>),
    /// `#`-directive
    CompileTag(CompileTag<'ast>),
    /// `using "path";`
    Using(UsingDecl<'ast>),
}

impl<'ast> Item<'ast> {
    /// Get the span of this item.
    pub fn span(&self) -> Span {
        match self {
            Self::Function(d) => d.span,
            Self::Struct(d) => d.span,
            Self::Class(d) => d.span,
            Self::GlobalVar(d) => d.span,
            Self::CompileTag(d) => d.span,
            Self::Using(d) => d.span,
        }
    }
}

bitflags! {
    /// Attributes attached to a function declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionAttributes: u8 {
        /// Visible to hosts that load the compiled program.
        const EXPORT = 1 << 0;
        /// Called automatically when the program starts.
        const ENTRY = 1 << 1;
        /// Invoked by the runtime when an error escapes.
        const CATCH = 1 << 2;
        /// Only callable from its own source file.
        const PROTECTED = 1 << 3;
    }
}

impl FunctionAttributes {
    /// Attributes that keep a function alive without any caller.
    pub fn is_root(&self) -> bool {
        self.intersects(Self::ENTRY | Self::CATCH | Self::EXPORT)
    }
}

/// A function parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    /// Parameter name
    pub name: Ident<'ast>,
    /// Parameter type name
    pub ty: &'ast str,
}

/// A function or method declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    /// Function name
    pub name: Ident<'ast>,
    /// Namespace the function is declared in
    pub namespace: Option<&'ast str>,
    /// Parameters
    pub params: &'ast [Param<'ast>],
    /// Return type name (`void` when nothing is returned)
    pub return_type: &'ast str,
    /// Attribute set
    pub attributes: FunctionAttributes,
    /// Host binding name when the body is supplied by the host
    pub builtin: Option<&'ast str>,
    /// Body
    pub body: Block<'ast>,
    /// Source location
    pub span: Span,
}

impl<'ast> FunctionDecl<'ast> {
    /// Parameter type names in order.
    pub fn param_types(&self) -> impl Iterator<Item = &'ast str> + 'ast {
        self.params.iter().map(|p| p.ty)
    }

    /// Name prefixed by the namespace, if any.
    pub fn qualified_name(&self) -> String {
        match self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name.name),
            None => self.name.name.to_string(),
        }
    }
}

/// A field of a struct or class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl<'ast> {
    /// Field name
    pub name: Ident<'ast>,
    /// Field type name
    pub ty: &'ast str,
}

/// A struct or class declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeDecl<'ast> {
    /// Type name
    pub name: Ident<'ast>,
    /// Fields in declaration order
    pub fields: &'ast [FieldDecl<'ast>],
    /// Methods
    pub methods: &'ast [FunctionDecl<'ast>],
    /// Host hook that constructs instances instead of a plain allocation
    pub builtin_constructor: Option<&'ast str>,
    /// Source location
    pub span: Span,
}

/// A `#`-directive such as `#bf print void string`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompileTag<'ast> {
    /// The word after `#`
    pub kind: &'ast str,
    /// Everything after the kind
    pub text: &'ast str,
    /// Source location
    pub span: Span,
}

/// A `using "path";` directive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsingDecl<'ast> {
    /// The path as written
    pub path: &'ast str,
    /// Source location
    pub span: Span,
}
