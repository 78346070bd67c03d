//! Error types for type lowering
//!
//! Every variant is an internal invariant violation: the pass runs after type
//! resolution and is scheduled by a driver that knows the policy, so reaching
//! one of these means the caller is broken, not the input program.

use crate::rename::StructuralPath;

/// Errors raised while lowering aggregate types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LowerError {
    /// An unresolved type reached the pass
    #[error("unresolved type at `{root}{path}`; type lowering requires inferred types")]
    UnresolvedType {
        /// Declaration being lowered
        root: String,
        /// Location of the placeholder inside the declaration
        path: StructuralPath,
    },

    /// A ground result was required but the policy keeps an aggregate intact
    #[error("`{root}{path}` is a {construct}, which the lowering policy leaves intact, but a ground type is required here")]
    PolicyViolation {
        /// Declaration being lowered
        root: String,
        /// Location of the aggregate inside the declaration
        path: StructuralPath,
        /// `"bundle"` or `"vector"`
        construct: &'static str,
    },

    /// A rename entry was written twice
    #[error("rename for `{root}{path}` recorded twice")]
    DuplicateRename {
        /// Declaration the entry belongs to
        root: String,
        /// Path of the entry
        path: StructuralPath,
    },
}
