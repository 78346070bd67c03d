//! Circuits, modules and the declarations they contain

use crate::ty::{Orientation, Type};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a module port
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Driven from outside the module
    Input,
    /// Driven by the module
    Output,
}

impl Direction {
    /// The opposite direction
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }

    /// Direction of a sub-signal with the given orientation
    #[must_use]
    pub const fn oriented(self, orientation: Orientation) -> Self {
        match orientation {
            Orientation::Normal => self,
            Orientation::Flipped => self.flip(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// A module port
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: Direction,
    /// Port type
    pub ty: Type,
}

impl Port {
    /// Create a port
    pub fn new(name: impl Into<String>, direction: Direction, ty: Type) -> Self {
        Self {
            name: name.into(),
            direction,
            ty,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} : {}", self.direction, self.name, self.ty)
    }
}

/// Kind of a body declaration
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    /// Combinational wire
    Wire,
    /// Clocked register
    Register,
    /// Named intermediate value
    Node,
    /// Child module instance
    Instance,
    /// Memory
    Memory,
}

impl DeclKind {
    /// Keyword used in the textual form
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Wire => "wire",
            Self::Register => "reg",
            Self::Node => "node",
            Self::Instance => "inst",
            Self::Memory => "mem",
        }
    }

    /// Whether declarations of this kind are replaced by their ground parts
    ///
    /// Instances and memories keep their aggregate interface here; their
    /// ports are lowered where the child module or memory is lowered.
    #[must_use]
    pub const fn is_lowerable(self) -> bool {
        matches!(self, Self::Wire | Self::Register | Self::Node)
    }
}

/// A declaration inside a module body
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    /// Declared name
    pub name: String,
    /// What is being declared
    pub kind: DeclKind,
    /// Declared type
    pub ty: Type,
}

impl Decl {
    /// Create a declaration
    pub fn new(name: impl Into<String>, kind: DeclKind, ty: Type) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
        }
    }
}

impl fmt::Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} : {}", self.kind.keyword(), self.name, self.ty)
    }
}

/// A hardware module
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Module name
    pub name: String,
    /// Ports in declaration order
    #[serde(default)]
    pub ports: Vec<Port>,
    /// Body declarations in source order
    #[serde(default)]
    pub body: Vec<Decl>,
}

impl Module {
    /// Create an empty module
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ports: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Add a port
    #[must_use]
    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    /// Add a body declaration
    #[must_use]
    pub fn with_decl(mut self, decl: Decl) -> Self {
        self.body.push(decl);
        self
    }

    /// Every name the module declares, ports first
    pub fn declared_names(&self) -> impl Iterator<Item = &str> {
        self.ports
            .iter()
            .map(|port| port.name.as_str())
            .chain(self.body.iter().map(|decl| decl.name.as_str()))
    }
}

/// A set of modules
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Circuit name
    pub name: String,
    /// Modules in source order
    #[serde(default)]
    pub modules: Vec<Module>,
}
