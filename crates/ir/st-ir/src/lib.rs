//! Intermediate representation for Strata hardware modules
//!
//! Signals are typed with [`Type`]: ground (scalar) types, bundles of named
//! fields and fixed-size vectors. Modules hold ports and body declarations
//! whose types may be arbitrarily nested aggregates until the type lowering
//! pass replaces them with ground-typed declarations.
//!
//! Types have a compact textual form, `{a : UInt<1>, flip b : SInt<4>[2]}`,
//! produced by `Display` and read back by [`parse_type`].

pub mod error;
pub mod module;
pub mod parse;
pub mod ty;

pub use error::ParseError;
pub use module::{Circuit, Decl, DeclKind, Direction, Module, Port};
pub use parse::parse_type;
pub use ty::{Field, GroundKind, GroundType, Orientation, Type};
