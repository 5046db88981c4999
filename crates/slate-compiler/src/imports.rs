//! Gathering the files a compilation consumes.
//!
//! Starting from the root program, every `using` directive is handed to an
//! [`ImportResolver`] supplied by the host (which owns file access and the
//! external parser). Imports are followed depth-first in source order and
//! each resolved path is loaded once.

use std::path::Path;

use rustc_hash::FxHashSet;
use slate_core::{CompileWarning, Diagnostics, FatalError};
use slate_ir::{Program, SourceSet};

/// Largest edit distance still offered as a suggestion.
const SUGGESTION_DISTANCE: usize = 3;

/// What a resolver found for one `using` path.
#[derive(Debug, Clone)]
pub enum ImportResolution<'ast> {
    /// The file was found and parsed.
    Resolved {
        /// Canonical path; two `using`s naming the same file must agree.
        path: String,
        program: Program<'ast>,
    },
    /// No such file. Compilation continues without it.
    NotFound { suggestion: Option<String> },
    /// The file exists but could not be read or parsed.
    Failed { message: String },
}

/// Host hook turning `using` paths into parsed programs.
pub trait ImportResolver<'ast> {
    /// Resolve `path` as written in the file `importer`.
    fn resolve(&mut self, path: &str, importer: &str) -> ImportResolution<'ast>;
}

impl<'ast, F> ImportResolver<'ast> for F
where
    F: FnMut(&str, &str) -> ImportResolution<'ast>,
{
    fn resolve(&mut self, path: &str, importer: &str) -> ImportResolution<'ast> {
        self(path, importer)
    }
}

/// A resolver for hosts without files: every import is unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImports;

impl<'ast> ImportResolver<'ast> for NoImports {
    fn resolve(&mut self, _path: &str, _importer: &str) -> ImportResolution<'ast> {
        ImportResolution::NotFound { suggestion: None }
    }
}

/// Collect the root and everything it imports.
///
/// Re-importing a loaded file and missing files are warnings; a resolver
/// failure aborts.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn load_sources<'ast, R>(
    root_path: &str,
    program: Program<'ast>,
    resolver: &mut R,
    diagnostics: &mut Diagnostics,
) -> Result<SourceSet<'ast>, FatalError>
where
    R: ImportResolver<'ast> + ?Sized,
{
    let mut loader = Loader {
        resolver,
        diagnostics,
        sources: SourceSet::new(root_path, program),
        visited: FxHashSet::default(),
    };
    loader.visited.insert(root_path.to_string());
    loader.follow(root_path, program)?;
    tracing::debug!(files = loader.sources.len(), "sources loaded");
    Ok(loader.sources)
}

struct Loader<'r, 'ast, R: ?Sized> {
    resolver: &'r mut R,
    diagnostics: &'r mut Diagnostics,
    sources: SourceSet<'ast>,
    visited: FxHashSet<String>,
}

impl<'r, 'ast, R> Loader<'r, 'ast, R>
where
    R: ImportResolver<'ast> + ?Sized,
{
    fn follow(&mut self, importer: &str, program: Program<'ast>) -> Result<(), FatalError> {
        for using in program.usings() {
            match self.resolver.resolve(using.path, importer) {
                ImportResolution::Resolved { path, program } => {
                    if !self.visited.insert(path.clone()) {
                        self.diagnostics.warn(
                            Some(importer),
                            CompileWarning::DuplicateImport {
                                path,
                                span: using.span,
                            },
                        );
                        continue;
                    }
                    tracing::trace!(%path, importer, "import resolved");
                    self.sources.push(path.clone(), program);
                    self.follow(&path, program)?;
                }
                ImportResolution::NotFound { suggestion } => {
                    self.diagnostics.warn(
                        Some(importer),
                        CompileWarning::UnresolvedImport {
                            path: using.path.to_string(),
                            suggestion,
                            span: using.span,
                        },
                    );
                }
                ImportResolution::Failed { message } => {
                    return Err(FatalError::Import {
                        path: using.path.to_string(),
                        message,
                        span: using.span,
                    });
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Suggestions
// ============================================================================

/// The candidate closest to `name`, if any is within the distance cap.
/// Ties go to the earliest candidate.
pub fn nearest_match<I, S>(candidates: I, name: &str) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut best: Option<(usize, String)> = None;
    for candidate in candidates {
        let candidate = candidate.as_ref();
        let distance = levenshtein(candidate, name);
        if distance > SUGGESTION_DISTANCE {
            continue;
        }
        if best.as_ref().is_none_or(|(d, _)| distance < *d) {
            best = Some((distance, candidate.to_string()));
        }
    }
    best.map(|(_, candidate)| candidate)
}

/// Suggest a file next to `path` whose stem is close to `path`'s stem.
pub fn sibling_suggestion(path: &str) -> Option<String> {
    let path = Path::new(path);
    let stem = path.file_stem()?.to_str()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut stems: Vec<String> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            entry
                .path()
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .filter(|candidate| candidate != stem)
        .collect();
    stems.sort();
    nearest_match(&stems, stem)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != *cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }
    row[b.len()]
}
