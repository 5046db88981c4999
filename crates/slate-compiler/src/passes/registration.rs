//! Registration Pass (Pass 1) - Register all declarations before any body
//! is lowered.
//!
//! ## Responsibilities
//!
//! - Register structs and classes (with their methods) from every unit
//! - Register free functions
//! - Register host functions declared through `#bf` compile tags
//! - Collect global variable declarations in source order
//! - Check every parameter, return and field type names a known type
//!
//! Types are registered across all units first so functions in any file
//! can name types declared in any other. The first declaration of a name
//! wins; later ones are reported as duplicates.

use slate_core::{CompileError, CompileWarning, FatalError};
use slate_ir::{CompileTag, Item, SourceSet, TypeDecl, VarDeclStmt};

use crate::context::CompilationContext;
use crate::symbols::TypeKind;

/// Compile tag kind declaring a host function.
pub const BUILTIN_FUNCTION_TAG: &str = "bf";

/// A global variable declaration and the file it came from.
#[derive(Debug, Clone)]
pub struct GlobalDecl<'ast> {
    pub decl: &'ast VarDeclStmt<'ast>,
    pub file: String,
}

/// Output of the registration pass.
#[derive(Debug, Default)]
pub struct RegistrationOutput<'ast> {
    /// Number of structs and classes registered.
    pub types_registered: usize,
    /// Number of free functions registered.
    pub functions_registered: usize,
    /// Number of host functions registered from compile tags.
    pub builtins_registered: usize,
    /// Global declarations in unit order, then source order.
    pub globals: Vec<GlobalDecl<'ast>>,
}

/// Pass 1: register every declaration of every unit.
pub struct RegistrationPass<'a, 'ast> {
    ctx: &'a mut CompilationContext<'ast>,
    output: RegistrationOutput<'ast>,
}

impl<'a, 'ast> RegistrationPass<'a, 'ast> {
    /// Create a new registration pass.
    pub fn new(ctx: &'a mut CompilationContext<'ast>) -> Self {
        Self {
            ctx,
            output: RegistrationOutput::default(),
        }
    }

    /// Run the pass over all units.
    ///
    /// Only a malformed compile tag aborts; everything else is collected
    /// as diagnostics.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, sources: &SourceSet<'ast>) -> Result<RegistrationOutput<'ast>, FatalError> {
        for unit in sources {
            self.ctx.set_file(&unit.path);
            for item in unit.program.items {
                match item {
                    Item::Struct(decl) => self.register_type(*decl, TypeKind::Struct),
                    Item::Class(decl) => self.register_type(*decl, TypeKind::Class),
                    _ => {}
                }
            }
        }

        for unit in sources {
            self.ctx.set_file(&unit.path);
            for item in unit.program.items {
                match item {
                    Item::Function(decl) => {
                        match self.ctx.symbols.register_function(*decl, &unit.path) {
                            Ok(_) => self.output.functions_registered += 1,
                            Err(error) => self.ctx.error(error),
                        }
                    }
                    Item::CompileTag(tag) => self.register_tag(tag, &unit.path)?,
                    Item::GlobalVar(decl) => self.output.globals.push(GlobalDecl {
                        decl: *decl,
                        file: unit.path.clone(),
                    }),
                    Item::Struct(_) | Item::Class(_) | Item::Using(_) => {}
                }
            }
        }

        self.check_signatures();

        tracing::debug!(
            types = self.output.types_registered,
            functions = self.output.functions_registered,
            builtins = self.output.builtins_registered,
            globals = self.output.globals.len(),
            "registration complete"
        );
        Ok(self.output)
    }

    fn register_type(&mut self, decl: &'ast TypeDecl<'ast>, kind: TypeKind) {
        let file = self.ctx.current_file.clone();
        match self.ctx.symbols.register_type(decl, kind, &file) {
            Ok(method_errors) => {
                self.output.types_registered += 1;
                for error in method_errors {
                    self.ctx.error(error);
                }
            }
            Err(error) => self.ctx.error(error),
        }
    }

    /// Handle a `#`-directive.
    ///
    /// `#bf <name> <returnType> <paramType>...` declares a host function.
    fn register_tag(&mut self, tag: &CompileTag<'ast>, file: &str) -> Result<(), FatalError> {
        if tag.kind != BUILTIN_FUNCTION_TAG {
            self.ctx.warn(CompileWarning::UnknownCompileTag {
                kind: tag.kind.to_string(),
                span: tag.span,
            });
            return Ok(());
        }

        let text = tag.text.trim().trim_end_matches(';');
        let words: Vec<&str> = text.split_whitespace().collect();
        let [name, return_type, params @ ..] = words.as_slice() else {
            return Err(FatalError::MalformedCompileTag {
                kind: tag.kind.to_string(),
                text: tag.text.to_string(),
                reason: "expected '<name> <returnType> <paramType>...'".to_string(),
                span: tag.span,
            });
        };

        match self
            .ctx
            .symbols
            .register_builtin(name, return_type, params, file, tag.span)
        {
            Ok(_) => self.output.builtins_registered += 1,
            Err(error) => self.ctx.error(error),
        }
        Ok(())
    }

    /// Report unknown type names in signatures and fields.
    fn check_signatures(&mut self) {
        let symbols = &self.ctx.symbols;
        let mut unknown = Vec::new();

        for function in symbols.functions() {
            let names = function.params.iter().map(|p| &p.ty);
            for ty in names.chain(std::iter::once(&function.return_type)) {
                if !symbols.is_known_type(ty) {
                    unknown.push((function.source_file.clone(), ty.clone(), function.span));
                }
            }
        }
        for ty in symbols.types() {
            for field in &ty.fields {
                if !symbols.is_known_type(&field.ty) {
                    unknown.push((ty.source_file.clone(), field.ty.clone(), ty.span));
                }
            }
        }

        for (file, name, span) in unknown {
            self.ctx.set_file(&file);
            self.ctx.error(CompileError::UnknownType { name, span });
        }
    }
}
