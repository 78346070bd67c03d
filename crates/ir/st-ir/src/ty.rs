//! Signal types
//!
//! Every type that reaches lowering is fully resolved: ground types carry a
//! kind and an optional width, aggregates are bundles (records) or vectors
//! (fixed-size arrays). `Unknown` stands in for a type that inference never
//! resolved and is rejected by every pass that expects resolved types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Orientation of a signal relative to its enclosing declaration
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Data flows the same way as the parent
    #[default]
    Normal,
    /// Data flows against the parent
    Flipped,
}

impl Orientation {
    /// The opposite orientation
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Normal => Self::Flipped,
            Self::Flipped => Self::Normal,
        }
    }

    /// Whether this orientation is flipped
    #[must_use]
    pub const fn is_flipped(self) -> bool {
        matches!(self, Self::Flipped)
    }
}

/// Kind of a scalar signal
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum GroundKind {
    /// Unsigned integer
    UInt,
    /// Signed integer
    SInt,
    /// Clock
    Clock,
    /// Synchronous or inferred reset
    Reset,
    /// Asynchronous reset
    AsyncReset,
    /// Bidirectional analog wire
    Analog,
}

impl GroundKind {
    /// Keyword used in the textual form
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::UInt => "UInt",
            Self::SInt => "SInt",
            Self::Clock => "Clock",
            Self::Reset => "Reset",
            Self::AsyncReset => "AsyncReset",
            Self::Analog => "Analog",
        }
    }

    /// Whether the kind is written with a `<width>` suffix
    #[must_use]
    pub const fn has_width(self) -> bool {
        matches!(self, Self::UInt | Self::SInt | Self::Analog)
    }
}

/// A scalar type
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroundType {
    /// Kind of scalar
    pub kind: GroundKind,
    /// Bit width, `None` when not yet inferred
    #[serde(default)]
    pub width: Option<u32>,
}

impl GroundType {
    /// Create a ground type
    #[must_use]
    pub const fn new(kind: GroundKind, width: Option<u32>) -> Self {
        Self { kind, width }
    }
}

impl fmt::Display for GroundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.keyword())?;
        if let (true, Some(width)) = (self.kind.has_width(), self.width) {
            write!(f, "<{width}>")?;
        }
        Ok(())
    }
}

/// A named field of a bundle
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name, unique within its bundle
    pub name: String,
    /// The field's own orientation relative to the bundle
    #[serde(default)]
    pub orientation: Orientation,
    /// Field type
    pub ty: Type,
}

impl Field {
    /// Create a non-flipped field
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            orientation: Orientation::Normal,
            ty,
        }
    }

    /// Create a flipped field
    pub fn flipped(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            orientation: Orientation::Flipped,
            ty,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.orientation.is_flipped() {
            f.write_str("flip ")?;
        }
        write!(f, "{} : {}", self.name, self.ty)
    }
}

/// A signal type
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Type {
    /// Scalar type
    Ground(GroundType),
    /// Record of named, individually oriented fields
    Bundle {
        /// Fields in declaration order
        fields: Vec<Field>,
    },
    /// Fixed-size array
    Vector {
        /// Element type
        element: Box<Type>,
        /// Number of elements
        size: usize,
    },
    /// Placeholder for a type that was never resolved
    Unknown,
}

impl Type {
    /// `UInt<width>`
    #[must_use]
    pub const fn uint(width: u32) -> Self {
        Self::Ground(GroundType::new(GroundKind::UInt, Some(width)))
    }

    /// `SInt<width>`
    #[must_use]
    pub const fn sint(width: u32) -> Self {
        Self::Ground(GroundType::new(GroundKind::SInt, Some(width)))
    }

    /// `Clock`
    #[must_use]
    pub const fn clock() -> Self {
        Self::Ground(GroundType::new(GroundKind::Clock, None))
    }

    /// Bundle from fields in declaration order
    #[must_use]
    pub fn bundle(fields: Vec<Field>) -> Self {
        Self::Bundle { fields }
    }

    /// Vector of `size` elements
    #[must_use]
    pub fn vector(element: Self, size: usize) -> Self {
        Self::Vector {
            element: Box::new(element),
            size,
        }
    }

    /// Whether this is a scalar type
    #[must_use]
    pub const fn is_ground(&self) -> bool {
        matches!(self, Self::Ground(_))
    }

    /// Whether this is a bundle or a vector
    #[must_use]
    pub const fn is_aggregate(&self) -> bool {
        matches!(self, Self::Bundle { .. } | Self::Vector { .. })
    }

    /// Whether an unresolved placeholder occurs anywhere in this type
    #[must_use]
    pub fn contains_unknown(&self) -> bool {
        match self {
            Self::Ground(_) => false,
            Self::Bundle { fields } => fields.iter().any(|field| field.ty.contains_unknown()),
            Self::Vector { element, .. } => element.contains_unknown(),
            Self::Unknown => true,
        }
    }

    /// Number of scalar signals this type destructures into
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Ground(_) | Self::Unknown => 1,
            Self::Bundle { fields } => fields.iter().map(|field| field.ty.leaf_count()).sum(),
            Self::Vector { element, size } => element.leaf_count() * size,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ground(ground) => ground.fmt(f),
            Self::Bundle { fields } => {
                f.write_str("{")?;
                for (idx, field) in fields.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    field.fmt(f)?;
                }
                f.write_str("}")
            }
            Self::Vector { element, size } => write!(f, "{element}[{size}]"),
            Self::Unknown => f.write_str("?"),
        }
    }
}
