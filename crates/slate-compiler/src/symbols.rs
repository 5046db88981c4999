//! Symbol tables: functions, structs and classes of one compilation.
//!
//! Functions are stored in one vector and addressed by [`FunctionId`].
//! Free functions are keyed by their qualified Call ID; methods live in
//! their owning type's method table. Registration never renames or
//! replaces an existing entry: the first declaration of a key wins and
//! later duplicates are reported.

use rustc_hash::FxHashMap;
use slate_core::{CompileError, Span};
use slate_ir::{FunctionAttributes, FunctionDecl, TypeDecl};

use crate::types::{self, call_id, readable_signature};

/// Index of a function in the [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

impl FunctionId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A parameter descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: String,
}

/// A registered function or method.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    /// Qualified name (`ns.name`), without the owner for methods.
    pub name: String,
    /// Identity key.
    pub call_id: String,
    /// `name(T1, T2)`
    pub readable: String,
    pub params: Vec<ParamInfo>,
    pub return_type: String,
    pub attributes: FunctionAttributes,
    /// Host binding name; such functions never get a compiled body.
    pub builtin: Option<String>,
    /// Declaring type for methods.
    pub owner: Option<String>,
    /// Calls from other live functions after dead-function elimination.
    pub reference_count: usize,
    /// Index of the first instruction once compiled.
    pub entry: Option<usize>,
    /// Local slots hoisted from the body.
    pub frame_size: usize,
    pub source_file: String,
    pub span: Span,
    /// Removed by dead-function elimination.
    pub eliminated: bool,
}

impl CompiledFunction {
    /// Whether this is a method.
    pub fn is_method(&self) -> bool {
        self.owner.is_some()
    }

    /// Key in the global function offset table.
    pub fn offset_key(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}.{}", owner, self.call_id),
            None => self.call_id.clone(),
        }
    }

    /// Whether this function gets instructions.
    pub fn is_compiled(&self) -> bool {
        self.builtin.is_none() && !self.eliminated
    }

    /// Number of stack slots the caller pushes besides the return slot.
    pub fn argument_slots(&self) -> usize {
        self.params.len() + usize::from(self.is_method())
    }
}

/// Whether a type has value or reference semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Struct,
    Class,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Struct => "struct",
            TypeKind::Class => "class",
        }
    }
}

/// A field descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub ty: String,
}

/// A registered struct or class.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledType {
    pub name: String,
    pub kind: TypeKind,
    /// Fields in declaration order.
    pub fields: Vec<FieldInfo>,
    /// Call ID to method.
    pub methods: FxHashMap<String, FunctionId>,
    /// Call ID to entry instruction, filled as methods are compiled.
    pub method_offsets: FxHashMap<String, usize>,
    /// Host hook used instead of a plain allocation.
    pub builtin_constructor: Option<String>,
    pub source_file: String,
    pub span: Span,
}

impl CompiledType {
    /// Index and type of a field.
    pub fn field(&self, name: &str) -> Option<(usize, &FieldInfo)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    /// Method by Call ID.
    pub fn method(&self, call_id: &str) -> Option<FunctionId> {
        self.methods.get(call_id).copied()
    }
}

/// All functions and types known to one compilation.
#[derive(Debug, Default)]
pub struct SymbolTable<'ast> {
    functions: Vec<CompiledFunction>,
    decls: Vec<Option<&'ast FunctionDecl<'ast>>>,
    by_call_id: FxHashMap<String, FunctionId>,
    by_name: FxHashMap<String, Vec<FunctionId>>,
    types: FxHashMap<String, CompiledType>,
    type_order: Vec<String>,
    function_offsets: FxHashMap<String, usize>,
}

impl<'ast> SymbolTable<'ast> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    fn push_function(
        &mut self,
        function: CompiledFunction,
        decl: Option<&'ast FunctionDecl<'ast>>,
    ) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(function);
        self.decls.push(decl);
        id
    }

    fn describe(
        decl: &FunctionDecl<'_>,
        owner: Option<&str>,
        source_file: &str,
    ) -> CompiledFunction {
        let name = decl.qualified_name();
        let params: Vec<ParamInfo> = decl
            .params
            .iter()
            .map(|p| ParamInfo {
                name: p.name.name.to_string(),
                ty: p.ty.to_string(),
            })
            .collect();
        CompiledFunction {
            call_id: call_id(&name, params.iter().map(|p| &p.ty)),
            readable: readable_signature(&name, params.iter().map(|p| &p.ty)),
            name,
            params,
            return_type: decl.return_type.to_string(),
            attributes: decl.attributes,
            builtin: decl.builtin.map(str::to_string),
            owner: owner.map(str::to_string),
            reference_count: 0,
            entry: None,
            frame_size: 0,
            source_file: source_file.to_string(),
            span: decl.span,
            eliminated: false,
        }
    }

    /// Register a free function.
    ///
    /// A second declaration with the same Call ID is rejected and the first
    /// one is kept.
    pub fn register_function(
        &mut self,
        decl: &'ast FunctionDecl<'ast>,
        source_file: &str,
    ) -> Result<FunctionId, CompileError> {
        let function = Self::describe(decl, None, source_file);
        self.insert_free(function, Some(decl))
    }

    /// Register a host function declared through a compile tag.
    pub fn register_builtin(
        &mut self,
        name: &str,
        return_type: &str,
        param_types: &[&str],
        source_file: &str,
        span: Span,
    ) -> Result<FunctionId, CompileError> {
        let params: Vec<ParamInfo> = param_types
            .iter()
            .enumerate()
            .map(|(i, ty)| ParamInfo {
                name: format!("arg{}", i),
                ty: ty.to_string(),
            })
            .collect();
        let function = CompiledFunction {
            name: name.to_string(),
            call_id: call_id(name, param_types),
            readable: readable_signature(name, param_types),
            params,
            return_type: return_type.to_string(),
            attributes: FunctionAttributes::empty(),
            builtin: Some(name.to_string()),
            owner: None,
            reference_count: 0,
            entry: None,
            frame_size: 0,
            source_file: source_file.to_string(),
            span,
            eliminated: false,
        };
        self.insert_free(function, None)
    }

    fn insert_free(
        &mut self,
        function: CompiledFunction,
        decl: Option<&'ast FunctionDecl<'ast>>,
    ) -> Result<FunctionId, CompileError> {
        if self.by_call_id.contains_key(&function.call_id) {
            return Err(CompileError::DuplicateDefinition {
                kind: "function",
                name: function.readable,
                span: function.span,
            });
        }
        let call_id = function.call_id.clone();
        let name = function.name.clone();
        let id = self.push_function(function, decl);
        self.by_call_id.insert(call_id, id);
        self.by_name.entry(name).or_default().push(id);
        Ok(id)
    }

    /// Register a struct or class together with its methods.
    ///
    /// Struct and class names share one namespace. Duplicate methods inside
    /// the type are reported through the returned error list; a duplicate
    /// type is rejected as a whole.
    pub fn register_type(
        &mut self,
        decl: &'ast TypeDecl<'ast>,
        kind: TypeKind,
        source_file: &str,
    ) -> Result<Vec<CompileError>, CompileError> {
        let name = decl.name.name.to_string();
        if self.types.contains_key(&name) {
            return Err(CompileError::DuplicateDefinition {
                kind: kind.as_str(),
                name,
                span: decl.span,
            });
        }

        let mut compiled = CompiledType {
            name: name.clone(),
            kind,
            fields: decl
                .fields
                .iter()
                .map(|f| FieldInfo {
                    name: f.name.name.to_string(),
                    ty: f.ty.to_string(),
                })
                .collect(),
            methods: FxHashMap::default(),
            method_offsets: FxHashMap::default(),
            builtin_constructor: decl.builtin_constructor.map(str::to_string),
            source_file: source_file.to_string(),
            span: decl.span,
        };

        let mut errors = Vec::new();
        for method in decl.methods {
            let function = Self::describe(method, Some(&name), source_file);
            if compiled.methods.contains_key(&function.call_id) {
                errors.push(CompileError::DuplicateDefinition {
                    kind: "method",
                    name: format!("{}.{}", name, function.readable),
                    span: method.span,
                });
                continue;
            }
            let call_id = function.call_id.clone();
            let id = self.push_function(function, Some(method));
            compiled.methods.insert(call_id, id);
        }

        self.types.insert(name.clone(), compiled);
        self.type_order.push(name);
        Ok(errors)
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Free function by qualified Call ID.
    pub fn function_by_call_id(&self, call_id: &str) -> Option<FunctionId> {
        self.by_call_id.get(call_id).copied()
    }

    /// Free functions with a qualified name, any arity.
    pub fn functions_named(&self, name: &str) -> &[FunctionId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A function by id.
    pub fn function(&self, id: FunctionId) -> &CompiledFunction {
        &self.functions[id.index()]
    }

    /// Mutable access to a function.
    pub fn function_mut(&mut self, id: FunctionId) -> &mut CompiledFunction {
        &mut self.functions[id.index()]
    }

    /// The declaration behind a function, if it has a body to compile.
    pub fn decl(&self, id: FunctionId) -> Option<&'ast FunctionDecl<'ast>> {
        self.decls.get(id.index()).copied().flatten()
    }

    /// All function ids in registration order.
    pub fn function_ids(&self) -> impl Iterator<Item = FunctionId> + '_ {
        (0..self.functions.len()).map(|i| FunctionId(i as u32))
    }

    /// All functions in registration order.
    pub fn functions(&self) -> &[CompiledFunction] {
        &self.functions
    }

    /// A struct or class by name.
    pub fn resolve_type(&self, name: &str) -> Option<&CompiledType> {
        self.types.get(name)
    }

    /// A struct by name.
    pub fn resolve_struct(&self, name: &str) -> Option<&CompiledType> {
        self.resolve_type(name).filter(|t| t.kind == TypeKind::Struct)
    }

    /// A class by name.
    pub fn resolve_class(&self, name: &str) -> Option<&CompiledType> {
        self.resolve_type(name).filter(|t| t.kind == TypeKind::Class)
    }

    /// Types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &CompiledType> + '_ {
        self.type_order.iter().filter_map(|name| self.types.get(name))
    }

    /// The first type declaring a method with this Call ID.
    pub fn find_method_owner(&self, call_id: &str) -> Option<&CompiledType> {
        self.types().find(|t| t.methods.contains_key(call_id))
    }

    /// Whether a type name is known (primitive, list of known, or user type).
    pub fn is_known_type(&self, ty: &str) -> bool {
        match types::element_type(ty) {
            Some(element) => self.is_known_type(element),
            None => types::is_primitive(ty) || self.types.contains_key(ty),
        }
    }

    // ==========================================================================
    // Addresses
    // ==========================================================================

    /// Record the entry instruction of a function.
    pub fn set_entry(&mut self, id: FunctionId, entry: usize) {
        let function = &mut self.functions[id.index()];
        function.entry = Some(entry);
        let key = function.offset_key();
        let owner = function.owner.clone();
        let call_id = function.call_id.clone();
        self.function_offsets.insert(key, entry);
        if let Some(ty) = owner.and_then(|o| self.types.get_mut(&o)) {
            ty.method_offsets.insert(call_id, entry);
        }
    }

    /// The global offset table.
    pub fn function_offsets(&self) -> &FxHashMap<String, usize> {
        &self.function_offsets
    }

    /// Mark a function as removed and drop its body.
    pub fn eliminate(&mut self, id: FunctionId) {
        self.functions[id.index()].eliminated = true;
        self.decls[id.index()] = None;
    }

    /// Split into the owned parts that go into the compiled program.
    pub fn into_parts(
        self,
    ) -> (
        Vec<CompiledFunction>,
        Vec<CompiledType>,
        FxHashMap<String, usize>,
    ) {
        let mut types = self.types;
        let ordered = self
            .type_order
            .iter()
            .filter_map(|name| types.remove(name))
            .collect();
        (self.functions, ordered, self.function_offsets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use slate_ir::AstBuilder;

    #[test]
    fn duplicate_function_keeps_first() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let first = arena.alloc(b.function("add", &[("a", "int")], "int", &[]));
        let second = arena.alloc(b.at(5).function("add", &[("b", "int")], "float", &[]));

        let mut symbols = SymbolTable::new();
        let id = symbols.register_function(first, "main.sl").unwrap();
        let err = symbols.register_function(second, "lib.sl").unwrap_err();

        assert!(matches!(err, CompileError::DuplicateDefinition { span, .. } if span.line == 5));
        assert_eq!(symbols.function_by_call_id("add,int"), Some(id));
        assert_eq!(symbols.function(id).return_type, "int");
    }

    #[test]
    fn overloads_by_parameter_types() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let int_version = arena.alloc(b.function("show", &[("v", "int")], "void", &[]));
        let str_version = arena.alloc(b.function("show", &[("v", "string")], "void", &[]));

        let mut symbols = SymbolTable::new();
        symbols.register_function(int_version, "a").unwrap();
        symbols.register_function(str_version, "a").unwrap();

        assert!(symbols.function_by_call_id("show,int").is_some());
        assert!(symbols.function_by_call_id("show,string").is_some());
        assert_eq!(symbols.functions_named("show").len(), 2);
    }

    #[test]
    fn struct_and_class_share_names() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let s = arena.alloc(b.type_decl("Foo", &[("a", "int")], &[]));
        let c = arena.alloc(b.type_decl("Foo", &[], &[]));

        let mut symbols = SymbolTable::new();
        symbols.register_type(s, TypeKind::Struct, "a").unwrap();
        assert!(symbols.register_type(c, TypeKind::Class, "b").is_err());
        assert!(symbols.resolve_struct("Foo").is_some());
        assert!(symbols.resolve_class("Foo").is_none());
    }

    #[test]
    fn methods_are_keyed_by_owner() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let area = b.function("area", &[], "int", &[]);
        let decl = arena.alloc(b.type_decl("Rect", &[("w", "int"), ("h", "int")], &[area]));

        let mut symbols = SymbolTable::new();
        symbols.register_type(decl, TypeKind::Class, "a").unwrap();

        let rect = symbols.resolve_class("Rect").unwrap();
        let id = rect.method("area").unwrap();
        assert_eq!(rect.field("h").map(|(i, _)| i), Some(1));
        assert!(symbols.function_by_call_id("area").is_none());

        symbols.set_entry(id, 12);
        assert_eq!(symbols.function_offsets().get("Rect.area"), Some(&12));
        assert_eq!(
            symbols.resolve_class("Rect").unwrap().method_offsets.get("area"),
            Some(&12)
        );
    }

    #[test]
    fn known_types() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let decl = arena.alloc(b.type_decl("Point", &[], &[]));
        let mut symbols = SymbolTable::new();
        symbols.register_type(decl, TypeKind::Struct, "a").unwrap();

        assert!(symbols.is_known_type("int"));
        assert!(symbols.is_known_type("Point[][]"));
        assert!(!symbols.is_known_type("Pointe"));
    }

    #[test]
    fn builtin_registration() {
        let mut symbols = SymbolTable::new();
        let id = symbols
            .register_builtin("print", "void", &["string"], "main.sl", Span::point(1, 1))
            .unwrap();
        let f = symbols.function(id);
        assert_eq!(f.call_id, "print,string");
        assert_eq!(f.builtin.as_deref(), Some("print"));
        assert!(!f.is_compiled());
        assert!(symbols.decl(id).is_none());
    }
}
