//! Call target resolution.
//!
//! A call site resolves to a compiled function, a method of the receiver's
//! type, a list pseudo-method or the `type(x)` intrinsic. Free function
//! keys are tried in a fixed order and the first key that names a function
//! wins:
//!
//! 1. the bare name
//! 2. the namespace path walked from the receiver, then the name
//! 3. the call's target namespace, then the name
//! 4. the target namespace, the namespace path, then the name
//!
//! Overloads are matched by exact Call ID only; there is no conversion
//! ranking.

use slate_core::{CompileError, Span};
use slate_ir::{CallExpr, Expr, FunctionAttributes};

use crate::bytecode::OpCode;
use crate::context::CompilationContext;
use crate::scope::VariableTable;
use crate::symbols::FunctionId;
use crate::types::{self, call_id, readable_signature};

/// Name of the type-of intrinsic.
pub const TYPE_OF: &str = "type";

/// Pseudo-methods available on every list value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMethod {
    /// `Push(v)`: append
    Push,
    /// `Pull()`: remove and yield the last element
    Pull,
    /// `Add(i, v)`: insert at an index
    Add,
    /// `Remove(i)`: remove at an index
    Remove,
}

impl ListMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Push" => Some(ListMethod::Push),
            "Pull" => Some(ListMethod::Pull),
            "Add" => Some(ListMethod::Add),
            "Remove" => Some(ListMethod::Remove),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ListMethod::Push => "Push",
            ListMethod::Pull => "Pull",
            ListMethod::Add => "Add",
            ListMethod::Remove => "Remove",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            ListMethod::Pull => 0,
            ListMethod::Push | ListMethod::Remove => 1,
            ListMethod::Add => 2,
        }
    }

    pub fn opcode(&self) -> OpCode {
        match self {
            ListMethod::Push => OpCode::ListPush,
            ListMethod::Pull => OpCode::ListPull,
            ListMethod::Add => OpCode::ListInsert,
            ListMethod::Remove => OpCode::ListRemove,
        }
    }

    /// Only `Pull` leaves a value on the stack.
    pub fn yields_value(&self) -> bool {
        matches!(self, ListMethod::Pull)
    }
}

/// What a call expression invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTarget {
    Function(FunctionId),
    Method(FunctionId),
    List(ListMethod),
    TypeOf,
}

/// The dotted namespace path a receiver expression spells, if any.
///
/// Only chains of identifiers and field accesses qualify, and only when the
/// root identifier is not a parameter, local or global.
pub fn namespace_path(expr: &Expr<'_>, scope: &VariableTable) -> Option<String> {
    match expr {
        Expr::Ident(ident) if !scope.is_variable(ident.name) => Some(ident.name.to_string()),
        Expr::Field(field) => namespace_path(&field.object, scope)
            .map(|path| format!("{}.{}", path, field.field.name)),
        _ => None,
    }
}

impl<'ast> CompilationContext<'ast> {
    /// Resolve what a call expression invokes in the current scope.
    ///
    /// Reads the symbol and variable tables only.
    pub fn resolve_call(&self, call: &CallExpr<'ast>) -> Result<CallTarget, CompileError> {
        let name = call.name.name;
        if call.receiver.is_none() && call.target_namespace.is_none() && name == TYPE_OF {
            if call.args.len() != 1 {
                return Err(CompileError::ArgumentCountMismatch {
                    name: TYPE_OF.to_string(),
                    expected: 1,
                    got: call.args.len(),
                    span: call.span,
                });
            }
            return Ok(CallTarget::TypeOf);
        }

        let arg_types = call
            .args
            .iter()
            .map(|arg| self.infer(arg))
            .collect::<Result<Vec<_>, _>>()?;

        match &call.receiver {
            Some(receiver) => match namespace_path(receiver, &self.scope) {
                Some(path) => self.resolve_free(call, Some(&path), &arg_types),
                None => self.resolve_method(call, receiver, &arg_types),
            },
            None => self.resolve_free(call, None, &arg_types),
        }
    }

    fn resolve_free(
        &self,
        call: &CallExpr<'ast>,
        path: Option<&str>,
        arg_types: &[String],
    ) -> Result<CallTarget, CompileError> {
        let name = call.name.name;
        let mut candidates = vec![name.to_string()];
        if let Some(path) = path {
            candidates.push(format!("{}.{}", path, name));
        }
        if let Some(target) = call.target_namespace {
            candidates.push(format!("{}.{}", target, name));
            if let Some(path) = path {
                candidates.push(format!("{}.{}.{}", target, path, name));
            }
        }

        for qualified in &candidates {
            if let Some(id) = self.symbols.function_by_call_id(&call_id(qualified, arg_types)) {
                self.check_access(id, call.span)?;
                return Ok(CallTarget::Function(id));
            }
        }

        let shown = candidates.last().map(String::as_str).unwrap_or(name);
        let signature = readable_signature(shown, arg_types);

        for qualified in &candidates {
            let named = self.symbols.functions_named(qualified);
            if let Some(first) = named.first() {
                let arity_differs = named
                    .iter()
                    .all(|id| self.symbols.function(*id).params.len() != arg_types.len());
                if arity_differs {
                    return Err(CompileError::ArgumentCountMismatch {
                        name: qualified.clone(),
                        expected: self.symbols.function(*first).params.len(),
                        got: arg_types.len(),
                        span: call.span,
                    });
                }
            }
        }

        if let Some(owner) = self.symbols.find_method_owner(&call_id(name, arg_types)) {
            return Err(CompileError::MethodCalledAsFunction {
                signature,
                owner: owner.name.clone(),
                span: call.span,
            });
        }

        Err(CompileError::UnknownFunction {
            signature,
            span: call.span,
        })
    }

    fn resolve_method(
        &self,
        call: &CallExpr<'ast>,
        receiver: &Expr<'ast>,
        arg_types: &[String],
    ) -> Result<CallTarget, CompileError> {
        let name = call.name.name;
        let receiver_type = self.infer(receiver)?;

        if types::is_list(&receiver_type) {
            if let Some(method) = ListMethod::from_name(name) {
                if method.arity() != arg_types.len() {
                    return Err(CompileError::ArgumentCountMismatch {
                        name: method.name().to_string(),
                        expected: method.arity(),
                        got: arg_types.len(),
                        span: call.span,
                    });
                }
                return Ok(CallTarget::List(method));
            }
        }

        let key = call_id(name, arg_types);
        let signature = readable_signature(name, arg_types);

        if let Some(ty) = self.symbols.resolve_type(&receiver_type) {
            if let Some(id) = ty.method(&key) {
                self.check_access(id, call.span)?;
                return Ok(CallTarget::Method(id));
            }

            let arities: Vec<usize> = ty
                .methods
                .values()
                .map(|id| self.symbols.function(*id))
                .filter(|f| f.name == name)
                .map(|f| f.params.len())
                .collect();
            if !arities.is_empty() && !arities.contains(&arg_types.len()) {
                return Err(CompileError::ArgumentCountMismatch {
                    name: format!("{}.{}", ty.name, name),
                    expected: arities.iter().copied().min().unwrap_or(0),
                    got: arg_types.len(),
                    span: call.span,
                });
            }
        }

        if self.symbols.function_by_call_id(&key).is_some() {
            return Err(CompileError::FunctionCalledAsMethod {
                signature,
                span: call.span,
            });
        }

        Err(CompileError::UnknownMethod {
            type_name: receiver_type,
            signature,
            span: call.span,
        })
    }

    /// Protected functions are callable only from their own file.
    fn check_access(&self, id: FunctionId, span: Span) -> Result<(), CompileError> {
        let function = self.symbols.function(id);
        if function.attributes.contains(FunctionAttributes::PROTECTED)
            && function.source_file != self.current_file
        {
            return Err(CompileError::ProtectedAccess {
                signature: function.readable.clone(),
                file: function.source_file.clone(),
                span,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompilerOptions;
    use crate::symbols::TypeKind;
    use bumpalo::Bump;
    use slate_ir::{AstBuilder, FunctionDecl};

    fn call_of<'a>(expr: Expr<'a>) -> &'a CallExpr<'a> {
        match expr {
            Expr::Call(call) => call,
            _ => panic!("not a call"),
        }
    }

    #[test]
    fn resolves_by_call_id() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let add = arena.alloc(b.function("add", &[("a", "int"), ("b", "int")], "int", &[]));

        let mut ctx = CompilationContext::new(CompilerOptions::default());
        let id = ctx.symbols.register_function(add, "main.sl").unwrap();

        let call = call_of(b.call("add", &[b.int(1), b.int(2)]));
        assert_eq!(ctx.resolve_call(call), Ok(CallTarget::Function(id)));

        let wrong_types = call_of(b.call("add", &[b.int(1), b.str("x")]));
        assert!(matches!(
            ctx.resolve_call(wrong_types),
            Err(CompileError::UnknownFunction { .. })
        ));

        let wrong_arity = call_of(b.call("add", &[b.int(1)]));
        assert!(matches!(
            ctx.resolve_call(wrong_arity),
            Err(CompileError::ArgumentCountMismatch { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn namespace_path_and_target_namespace() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let abs = arena.alloc(FunctionDecl {
            namespace: Some("math"),
            ..b.function("abs", &[("v", "int")], "int", &[])
        });

        let mut ctx = CompilationContext::new(CompilerOptions::default());
        let id = ctx.symbols.register_function(abs, "math.sl").unwrap();

        let via_path = call_of(b.path_call("math", "abs", &[b.int(-1)]));
        assert_eq!(ctx.resolve_call(via_path), Ok(CallTarget::Function(id)));

        let via_target = call_of(b.ns_call("math", "abs", &[b.int(-1)]));
        assert_eq!(ctx.resolve_call(via_target), Ok(CallTarget::Function(id)));
    }

    #[test]
    fn bare_name_wins_over_namespace() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let bare = arena.alloc(b.function("f", &[], "int", &[]));
        let namespaced = arena.alloc(FunctionDecl {
            namespace: Some("ns"),
            ..b.function("f", &[], "int", &[])
        });

        let mut ctx = CompilationContext::new(CompilerOptions::default());
        let bare_id = ctx.symbols.register_function(bare, "a").unwrap();
        ctx.symbols.register_function(namespaced, "a").unwrap();

        let call = call_of(b.ns_call("ns", "f", &[]));
        assert_eq!(ctx.resolve_call(call), Ok(CallTarget::Function(bare_id)));
    }

    #[test]
    fn method_misuse() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let area = b.function("area", &[], "int", &[]);
        let rect = arena.alloc(b.type_decl("Rect", &[], &[area]));
        let helper = arena.alloc(b.function("helper", &[], "int", &[]));

        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.symbols.register_type(rect, TypeKind::Class, "a").unwrap();
        ctx.symbols.register_function(helper, "a").unwrap();
        ctx.scope.push_frame();
        ctx.scope.declare_local("r", "Rect", false, Span::default());

        let as_function = call_of(b.call("area", &[]));
        assert!(matches!(
            ctx.resolve_call(as_function),
            Err(CompileError::MethodCalledAsFunction { ref owner, .. }) if owner == "Rect"
        ));

        let as_method = call_of(b.method_call(b.var_ref("r"), "helper", &[]));
        assert!(matches!(
            ctx.resolve_call(as_method),
            Err(CompileError::FunctionCalledAsMethod { .. })
        ));

        let method = call_of(b.method_call(b.var_ref("r"), "area", &[]));
        assert!(matches!(ctx.resolve_call(method), Ok(CallTarget::Method(_))));
    }

    #[test]
    fn protected_functions_stay_in_their_file() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let secret = arena.alloc(FunctionDecl {
            attributes: FunctionAttributes::PROTECTED,
            ..b.function("secret", &[], "int", &[])
        });

        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.symbols.register_function(secret, "lib.sl").unwrap();
        let call = call_of(b.call("secret", &[]));

        ctx.set_file("lib.sl");
        assert!(ctx.resolve_call(call).is_ok());

        ctx.set_file("main.sl");
        assert!(matches!(
            ctx.resolve_call(call),
            Err(CompileError::ProtectedAccess { ref file, .. }) if file == "lib.sl"
        ));
    }

    #[test]
    fn list_pseudo_methods() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut ctx = CompilationContext::new(CompilerOptions::default());
        ctx.scope.push_frame();
        ctx.scope.declare_local("xs", "int[]", false, Span::default());

        let push = call_of(b.method_call(b.var_ref("xs"), "Push", &[b.int(1)]));
        assert_eq!(ctx.resolve_call(push), Ok(CallTarget::List(ListMethod::Push)));

        let bad = call_of(b.method_call(b.var_ref("xs"), "Add", &[b.int(1)]));
        assert!(matches!(
            ctx.resolve_call(bad),
            Err(CompileError::ArgumentCountMismatch { expected: 2, .. })
        ));

        let type_of = call_of(b.call("type", &[b.var_ref("xs")]));
        assert_eq!(ctx.resolve_call(type_of), Ok(CallTarget::TypeOf));
    }

    #[test]
    fn local_variables_are_not_namespaces() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut scope = VariableTable::new();
        scope.push_frame();
        scope.declare_local("a", "int", false, Span::default());

        let chain = b.field(b.var_ref("x"), "y");
        assert_eq!(namespace_path(&chain, &scope).as_deref(), Some("x.y"));
        assert_eq!(namespace_path(&b.var_ref("a"), &scope), None);
    }
}
