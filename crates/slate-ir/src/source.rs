//! The set of source files one compilation consumes.

use crate::ast::Program;

/// One parsed file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit<'ast> {
    /// Resolved path of the file.
    pub path: String,
    /// Its intermediate tree.
    pub program: Program<'ast>,
}

/// Every file reachable from the root through `using`.
///
/// The root comes first, imports follow in discovery order, and each path
/// appears at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSet<'ast> {
    units: Vec<SourceUnit<'ast>>,
}

impl<'ast> SourceSet<'ast> {
    /// A set holding only the root file.
    pub fn new(root_path: impl Into<String>, program: Program<'ast>) -> Self {
        Self {
            units: vec![SourceUnit {
                path: root_path.into(),
                program,
            }],
        }
    }

    /// Add an imported file. Returns `false` if the path is already present.
    pub fn push(&mut self, path: impl Into<String>, program: Program<'ast>) -> bool {
        let path = path.into();
        if self.contains(&path) {
            return false;
        }
        self.units.push(SourceUnit { path, program });
        true
    }

    /// Whether a file with this path is in the set.
    pub fn contains(&self, path: &str) -> bool {
        self.units.iter().any(|u| u.path == path)
    }

    /// The root file.
    pub fn root(&self) -> &SourceUnit<'ast> {
        &self.units[0]
    }

    /// All files, root first.
    pub fn units(&self) -> &[SourceUnit<'ast>] {
        &self.units
    }

    /// Iterate over all files, root first.
    pub fn iter(&self) -> std::slice::Iter<'_, SourceUnit<'ast>> {
        self.units.iter()
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Always `false`: a set holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl<'a, 'ast> IntoIterator for &'a SourceSet<'ast> {
    type Item = &'a SourceUnit<'ast>;
    type IntoIter = std::slice::Iter<'a, SourceUnit<'ast>>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_first_and_no_duplicates() {
        let mut set = SourceSet::new("main.sl", Program::empty());
        assert!(set.push("lib.sl", Program::empty()));
        assert!(!set.push("lib.sl", Program::empty()));
        assert!(!set.push("main.sl", Program::empty()));

        assert_eq!(set.len(), 2);
        assert_eq!(set.root().path, "main.sl");
        let paths: Vec<_> = set.iter().map(|u| u.path.as_str()).collect();
        assert_eq!(paths, vec!["main.sl", "lib.sl"]);
    }
}
