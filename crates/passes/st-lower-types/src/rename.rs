//! Rename records from structural paths to flat names
//!
//! The expression rewriter looks up every `root.field[index]...` access here
//! to find the ground signal that replaced it.

use crate::error::LowerError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use st_ir::Orientation;
use std::fmt;

/// One step into an aggregate
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Selector {
    /// Bundle field by name
    Field(String),
    /// Vector element by index
    Index(usize),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, ".{name}"),
            Self::Index(idx) => write!(f, "[{idx}]"),
        }
    }
}

/// Position inside a declaration's type, from the root down
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct StructuralPath(Vec<Selector>);

impl StructuralPath {
    /// The empty path, naming the declaration itself
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend the path by a field access
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push(Selector::Field(name.into()));
        self
    }

    /// Extend the path by an index
    #[must_use]
    pub fn index(mut self, idx: usize) -> Self {
        self.0.push(Selector::Index(idx));
        self
    }

    /// Push a selector in place
    pub fn push(&mut self, selector: Selector) {
        self.0.push(selector);
    }

    /// Pop the last selector
    pub fn pop(&mut self) -> Option<Selector> {
        self.0.pop()
    }

    /// Selectors from the root down
    #[must_use]
    pub fn selectors(&self) -> &[Selector] {
        &self.0
    }

    /// Whether `prefix` is an ancestor of (or equal to) this path
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for StructuralPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for selector in &self.0 {
            selector.fmt(f)?;
        }
        Ok(())
    }
}

/// Where a structural path ended up after lowering
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RenameTarget {
    /// Flat ground signal name
    pub name: String,
    /// Orientation relative to the root declaration
    pub orientation: Orientation,
}

/// Rename records for one module
///
/// Entries are kept in emission order per declaration, so expanding an
/// aggregate path yields leaves in the same order as the lowered
/// declarations.
#[derive(Debug, Clone, Default)]
pub struct RenameTable {
    roots: IndexMap<String, IndexMap<StructuralPath, RenameTarget>>,
}

impl RenameTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where `root` + `path` was lowered to
    ///
    /// # Errors
    ///
    /// Returns `LowerError::DuplicateRename` if the entry already exists;
    /// entries are written once and never overwritten.
    pub fn record(
        &mut self,
        root: &str,
        path: StructuralPath,
        name: String,
        orientation: Orientation,
    ) -> Result<(), LowerError> {
        let entries = self.roots.entry(root.to_string()).or_default();
        if entries.contains_key(&path) {
            return Err(LowerError::DuplicateRename {
                root: root.to_string(),
                path,
            });
        }
        entries.insert(path, RenameTarget { name, orientation });
        Ok(())
    }

    /// Mark `root` as lowered even if it produced no entries
    pub(crate) fn declare(&mut self, root: &str) {
        self.roots.entry(root.to_string()).or_default();
    }

    /// Flat signal for a ground path
    #[must_use]
    pub fn get(&self, root: &str, path: &StructuralPath) -> Option<&RenameTarget> {
        self.roots.get(root)?.get(path)
    }

    /// Every ground entry at or below `path`, in emission order
    ///
    /// Used to rewrite a connection of a whole aggregate into one connection
    /// per ground signal.
    #[must_use]
    pub fn expand(&self, root: &str, path: &StructuralPath) -> Vec<(&StructuralPath, &RenameTarget)> {
        self.roots.get(root).map_or_else(Vec::new, |entries| {
            entries
                .iter()
                .filter(|(entry_path, _)| entry_path.starts_with(path))
                .collect()
        })
    }

    /// Whether `root` has been lowered into this table
    #[must_use]
    pub fn is_lowered(&self, root: &str) -> bool {
        self.roots.contains_key(root)
    }

    /// Total number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.values().map(IndexMap::len).sum()
    }

    /// Whether the table has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries as `(root, path, target)`, declarations in the order they
    /// were lowered
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StructuralPath, &RenameTarget)> {
        self.roots.iter().flat_map(|(root, entries)| {
            entries
                .iter()
                .map(move |(path, target)| (root.as_str(), path, target))
        })
    }
}
