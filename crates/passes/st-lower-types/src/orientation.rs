//! Orientation composition

use st_ir::Orientation;

/// Orientation of a field relative to the root declaration
///
/// Flips compose by XOR: a flipped field inside a flipped parent points the
/// same way as the root. Vector indexing never flips, so element orientation
/// is the vector's own.
#[must_use]
pub const fn compose(parent: Orientation, field: Orientation) -> Orientation {
    match (parent, field) {
        (Orientation::Normal, other) | (other, Orientation::Normal) => other,
        (Orientation::Flipped, Orientation::Flipped) => Orientation::Normal,
    }
}
