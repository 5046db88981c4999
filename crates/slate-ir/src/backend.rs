//! The contract between the intermediate tree and code generators.

use crate::source::SourceSet;

/// A code generator that consumes a complete [`SourceSet`].
///
/// The tree is immutable, so one set can be fed to several backends
/// (e.g. the bytecode generator and a native one) without re-parsing.
pub trait Backend<'ast> {
    /// What a successful compilation produces.
    type Output;
    /// What aborts a compilation.
    type Error;

    /// Generate code for every unit in `sources`.
    fn compile(&mut self, sources: &SourceSet<'ast>) -> Result<Self::Output, Self::Error>;
}
