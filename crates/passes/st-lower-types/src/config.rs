//! Lowering policy

use serde::{Deserialize, Serialize};
use st_ir::Type;

/// Which aggregate constructs the pass destructures
///
/// A construct that is not lowered stays intact and is named as if it were
/// a single ground signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowerTypesConfig {
    /// Destructure bundle-typed signals
    pub lower_bundles: bool,
    /// Destructure vector-typed signals
    pub lower_vecs: bool,
}

impl Default for LowerTypesConfig {
    fn default() -> Self {
        Self {
            lower_bundles: true,
            lower_vecs: true,
        }
    }
}

impl LowerTypesConfig {
    /// Lower bundles but keep vectors intact
    #[must_use]
    pub fn bundles_only() -> Self {
        Self {
            lower_bundles: true,
            lower_vecs: false,
        }
    }

    /// Whether `ty` is split into its parts under this policy
    #[must_use]
    pub fn lowers(&self, ty: &Type) -> bool {
        match ty {
            Type::Bundle { .. } => self.lower_bundles,
            Type::Vector { .. } => self.lower_vecs,
            Type::Ground(_) | Type::Unknown => false,
        }
    }
}
