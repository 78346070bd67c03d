//! Flat name allocation
//!
//! A flat name is the root name joined with every selector on the path to a
//! leaf. Each aggregate level picks its own join separator: `_` normally,
//! `__` when the names under that level would collide with something. Two
//! independent checks pick the escaped separator:
//!
//! - the namespace check, run once per declaration, escapes only the join
//!   between the root and its immediate children;
//! - the sibling check, run for every aggregate member of a bundle or vector,
//!   escapes only that member's join to its own children.
//!
//! Ground members are never renamed; they are the fixed names aggregate
//! siblings must avoid. Separators are decided bottom-up over a [`NameTree`]
//! before anything is emitted, so a failed lowering leaves no trace in the
//! namespace.

use crate::config::LowerTypesConfig;
use crate::error::LowerError;
use crate::rename::{Selector, StructuralPath};
use rustc_hash::FxHashSet;
use st_ir::{Orientation, Type};
use st_namespace::Namespace;
use std::fmt;
use std::iter;
use tracing::debug;

/// Join between an aggregate's name and its children's selectors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Separator(usize);

impl Separator {
    /// Single `_`
    pub const DEFAULT: Self = Self(1);
    /// Double `__`, the first escape
    pub const ESCAPED: Self = Self(2);

    /// One `_` longer
    #[must_use]
    const fn widen(self) -> Self {
        Self(self.0 + 1)
    }

    /// Whether this separator differs from the default
    #[must_use]
    pub const fn is_escaped(self) -> bool {
        self.0 > Self::DEFAULT.0
    }

    fn join(self, prefix: &str, selector: &str) -> String {
        let mut name = String::with_capacity(prefix.len() + self.0 + selector.len());
        name.push_str(prefix);
        name.extend(iter::repeat_n('_', self.0));
        name.push_str(selector);
        name
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.0 {
            f.write_str("_")?;
        }
        Ok(())
    }
}

/// A declaration's type annotated with the separator chosen at each level
#[derive(Debug)]
pub(crate) struct NameTree<'ty> {
    /// Type at this position
    pub ty: &'ty Type,
    /// Join between this node's name and its children
    pub separator: Separator,
    /// How the node is split
    pub shape: Shape<'ty>,
}

/// Structure of a [`NameTree`] node
#[derive(Debug)]
pub(crate) enum Shape<'ty> {
    /// Emitted as one signal: a ground type, or an aggregate the policy keeps
    Leaf,
    /// Bundle members in declaration order
    Bundle(Vec<Member<'ty>>),
    /// Every element shares one subtree, and so one set of separators
    Vector {
        /// Element subtree
        element: Box<NameTree<'ty>>,
        /// Number of elements
        size: usize,
    },
}

/// A bundle field inside a [`NameTree`]
#[derive(Debug)]
pub(crate) struct Member<'ty> {
    /// Field name
    pub name: &'ty str,
    /// The field's own orientation
    pub orientation: Orientation,
    /// Field subtree
    pub node: NameTree<'ty>,
}

/// Which separators to use when listing names
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Naming {
    /// `_` at every level, as if nothing had been escaped
    Default,
    /// The separators decided so far
    Resolved,
}

impl<'ty> NameTree<'ty> {
    fn is_leaf(&self) -> bool {
        matches!(self.shape, Shape::Leaf)
    }

    /// Push the flat names of every leaf below this node onto `out`
    ///
    /// `prefix` is this node's own name and `join` the separator between it
    /// and its children; the levels below use `naming`.
    fn leaf_names(&self, prefix: &str, join: Separator, naming: Naming, out: &mut Vec<String>) {
        match &self.shape {
            Shape::Leaf => out.push(prefix.to_string()),
            Shape::Bundle(members) => {
                for member in members {
                    let name = join.join(prefix, member.name);
                    let below = member.node.separator_for(naming);
                    member.node.leaf_names(&name, below, naming, out);
                }
            }
            Shape::Vector { element, size } => {
                let below = element.separator_for(naming);
                for idx in 0..*size {
                    let name = join.join(prefix, &idx.to_string());
                    element.leaf_names(&name, below, naming, out);
                }
            }
        }
    }

    fn separator_for(&self, naming: Naming) -> Separator {
        match naming {
            Naming::Default => Separator::DEFAULT,
            Naming::Resolved => self.separator,
        }
    }

    /// Names the node would produce with `join` at its own level
    fn resolved_names(&self, prefix: &str, join: Separator) -> Vec<String> {
        let mut names = Vec::new();
        self.leaf_names(prefix, join, Naming::Resolved, &mut names);
        names
    }

    /// Candidate names for this node with the default join at its own level
    ///
    /// The default-separator names are always candidates. If a deeper level
    /// was escaped, the names it actually resolved to are candidates too.
    fn candidates(&self, prefix: &str) -> Vec<String> {
        let mut names = Vec::new();
        self.leaf_names(prefix, Separator::DEFAULT, Naming::Default, &mut names);
        let resolved = self.resolved_names(prefix, Separator::DEFAULT);
        if resolved != names {
            names.extend(resolved);
        }
        names
    }
}

/// Build the name tree for a declaration's type
///
/// Separators below the root are decided here by the sibling check. The
/// root's own separator starts as the default; see [`escape_root`].
///
/// # Errors
///
/// Returns `LowerError::UnresolvedType` if an unresolved type occurs
/// anywhere, and `LowerError::PolicyViolation` if `require_ground` is set but
/// the policy keeps an aggregate intact.
pub(crate) fn build<'ty>(
    root: &str,
    ty: &'ty Type,
    config: &LowerTypesConfig,
    require_ground: bool,
) -> Result<NameTree<'ty>, LowerError> {
    let mut path = StructuralPath::root();
    Builder {
        root,
        config,
        require_ground,
    }
    .build(ty, &mut path)
}

struct Builder<'cfg> {
    root: &'cfg str,
    config: &'cfg LowerTypesConfig,
    require_ground: bool,
}

impl Builder<'_> {
    fn build<'ty>(&self, ty: &'ty Type, path: &mut StructuralPath) -> Result<NameTree<'ty>, LowerError> {
        if ty.contains_unknown() && !self.config.lowers(ty) {
            return Err(self.unresolved(ty, path));
        }

        let shape = match ty {
            Type::Ground(_) => Shape::Leaf,
            Type::Unknown => return Err(self.unresolved(ty, path)),
            Type::Bundle { .. } | Type::Vector { .. } if !self.config.lowers(ty) => {
                if self.require_ground {
                    return Err(LowerError::PolicyViolation {
                        root: self.root.to_string(),
                        path: path.clone(),
                        construct: if matches!(ty, Type::Bundle { .. }) {
                            "bundle"
                        } else {
                            "vector"
                        },
                    });
                }
                Shape::Leaf
            }
            Type::Bundle { fields } => {
                let mut members = Vec::with_capacity(fields.len());
                for field in fields {
                    path.push(Selector::Field(field.name.clone()));
                    let node = self.build(&field.ty, path)?;
                    path.pop();
                    members.push(Member {
                        name: &field.name,
                        orientation: field.orientation,
                        node,
                    });
                }
                escape_bundle_members(&mut members);
                Shape::Bundle(members)
            }
            Type::Vector { element, size } => {
                path.push(Selector::Index(0));
                let mut element = self.build(element, path)?;
                path.pop();
                escape_vector_element(&mut element, *size);
                Shape::Vector {
                    element: Box::new(element),
                    size: *size,
                }
            }
        };

        Ok(NameTree {
            ty,
            separator: Separator::DEFAULT,
            shape,
        })
    }

    /// Point at the placeholder itself, not at the aggregate holding it
    fn unresolved(&self, ty: &Type, path: &StructuralPath) -> LowerError {
        let mut path = path.clone();
        locate_unknown(ty, &mut path);
        LowerError::UnresolvedType {
            root: self.root.to_string(),
            path,
        }
    }
}

fn locate_unknown(ty: &Type, path: &mut StructuralPath) -> bool {
    match ty {
        Type::Unknown => true,
        Type::Ground(_) => false,
        Type::Bundle { fields } => fields.iter().any(|field| {
            path.push(Selector::Field(field.name.clone()));
            let found = locate_unknown(&field.ty, path);
            if !found {
                path.pop();
            }
            found
        }),
        Type::Vector { element, .. } => {
            path.push(Selector::Index(0));
            let found = locate_unknown(element, path);
            if !found {
                path.pop();
            }
            found
        }
    }
}

/// Sibling check for the members of one bundle
///
/// Ground members keep their literal names. Each aggregate member, in
/// declaration order, is compared against those and against the names of the
/// aggregate members before it.
fn escape_bundle_members(members: &mut [Member<'_>]) {
    let mut taken: FxHashSet<String> = members
        .iter()
        .filter(|member| member.node.is_leaf())
        .map(|member| member.name.to_string())
        .collect();

    for member in members.iter_mut().filter(|member| !member.node.is_leaf()) {
        let separator = choose_separator(&member.node, member.name, |names| {
            names.iter().any(|name| taken.contains(name))
        });
        if separator.is_escaped() {
            debug!(field = member.name, %separator, "escaped field to avoid a sibling collision");
        }
        member.node.separator = separator;
        taken.extend(member.node.resolved_names(member.name, separator));
    }
}

/// Sibling check for the elements of one vector
///
/// All elements share the element subtree, so one separator is chosen for
/// the whole vector, against the names of every index together.
fn escape_vector_element(element: &mut NameTree<'_>, size: usize) {
    if element.is_leaf() || size < 2 {
        return;
    }

    let mut separator = Separator::DEFAULT;
    'retry: loop {
        let mut taken: FxHashSet<String> = FxHashSet::default();
        for idx in 0..size {
            let index = idx.to_string();
            let names = if separator == Separator::DEFAULT {
                element.candidates(&index)
            } else {
                element.resolved_names(&index, separator)
            };
            if names.iter().any(|name| taken.contains(name)) {
                separator = if separator == Separator::DEFAULT {
                    Separator::ESCAPED
                } else {
                    separator.widen()
                };
                continue 'retry;
            }
            taken.extend(element.resolved_names(&index, separator));
        }
        break;
    }

    if separator.is_escaped() {
        debug!(%separator, "escaped vector elements to avoid an index collision");
    }
    element.separator = separator;
}

/// Namespace check for a whole declaration
///
/// If any candidate name of the declaration is already taken, only the join
/// between the root and its children is escaped. Deeper levels keep the
/// separators the sibling check gave them.
pub(crate) fn escape_root(tree: &mut NameTree<'_>, root: &str, namespace: &Namespace) {
    if tree.is_leaf() {
        return;
    }
    let separator = choose_separator(tree, root, |names| {
        namespace.contains_any(names.iter().map(String::as_str))
    });
    if separator.is_escaped() {
        debug!(root, %separator, "escaped declaration to avoid a namespace collision");
    }
    tree.separator = separator;
}

/// Smallest separator for `node`'s own level whose names do not `collide`
///
/// The default is kept unless one of its candidates collides. The escaped
/// separator is then widened until the actual names are all free.
fn choose_separator(node: &NameTree<'_>, prefix: &str, collide: impl Fn(&[String]) -> bool) -> Separator {
    if !collide(&node.candidates(prefix)) {
        return Separator::DEFAULT;
    }
    let mut separator = Separator::ESCAPED;
    while collide(&node.resolved_names(prefix, separator)) {
        separator = separator.widen();
    }
    separator
}
