//! Aggregate type lowering
//!
//! Replaces bundle- and vector-typed ports and declarations with ground-typed
//! ones, because later stages and the emitted netlist only understand scalar
//! wires. `io : {flip req : UInt<1>, data : UInt<8>[2]}` becomes
//! `io_req`, `io_data_0` and `io_data_1`.
//!
//! # Architecture
//!
//! - **Name allocation** (`names`): decides the separator at every level so
//!   flat names never collide with the module's namespace or with each other
//! - **Destructurer** ([`Destructurer`]): walks one declaration and emits its
//!   ground leaves in declaration order with composed orientations
//! - **Rename table** ([`RenameTable`]): maps each `root` + structural path to
//!   its flat name for the expression rewriter
//! - **Drivers** ([`lower_module`], [`lower_circuit`]): lower ports, then body
//!   declarations, threading one namespace per module
//!
//! # Usage
//!
//! ```rust,ignore
//! use st_lower_types::{Declaration, Destructurer, LowerTypesConfig, RenameTable};
//! use st_namespace::Namespace;
//!
//! let mut namespace = Namespace::new();
//! let mut renames = RenameTable::new();
//! let leaves = Destructurer::new(LowerTypesConfig::default())
//!     .destruct(&Declaration::new("a", ty), &mut namespace, &mut renames)?;
//! ```

pub mod config;
pub mod destruct;
pub mod error;
mod names;
pub mod module;
pub mod orientation;
pub mod rename;

pub use config::LowerTypesConfig;
pub use destruct::{Declaration, Destructurer, Leaf};
pub use error::LowerError;
pub use module::{LoweredCircuit, LoweredModule, lower_circuit, lower_module};
pub use orientation::compose;
pub use rename::{RenameTable, RenameTarget, Selector, StructuralPath};
