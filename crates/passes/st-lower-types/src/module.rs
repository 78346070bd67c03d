//! Lowering whole modules and circuits
//!
//! Each module gets its own namespace and rename table: flat names only have
//! to be unique within the module that declares them.

use crate::config::LowerTypesConfig;
use crate::destruct::{Declaration, Destructurer};
use crate::error::LowerError;
use crate::rename::RenameTable;
use indexmap::IndexMap;
use st_ir::{Circuit, Decl, DeclKind, Module, Port};
use st_namespace::Namespace;
use tracing::debug;

/// A module after type lowering
#[derive(Debug, Clone)]
pub struct LoweredModule {
    /// The module with aggregate ports and declarations replaced
    pub module: Module,
    /// Where every original port and declaration path ended up
    pub renames: RenameTable,
    /// Every name in use in the lowered module
    pub namespace: Namespace,
}

/// A circuit after type lowering
#[derive(Debug, Clone)]
pub struct LoweredCircuit {
    /// Circuit name
    pub name: String,
    /// Lowered modules by name, in circuit order
    pub modules: IndexMap<String, LoweredModule>,
}

/// Lower every port and declaration of a module
///
/// The namespace is seeded with every name the module declares. Ports are
/// lowered first, then body declarations in source order, so a port keeps
/// its plain names whenever a later wire would collide with it. A flipped
/// port leaf has its direction reversed. Registers must lower to ground
/// signals. Instances and memories are kept as they are.
///
/// # Errors
///
/// Returns the first [`LowerError`] hit; the module is not partially lowered.
pub fn lower_module(module: &Module, config: &LowerTypesConfig) -> Result<LoweredModule, LowerError> {
    let destructurer = Destructurer::new(*config);
    let mut namespace: Namespace = module.declared_names().collect();
    let mut renames = RenameTable::new();
    let mut lowered = Module::new(module.name.clone());

    for port in &module.ports {
        let decl = Declaration::new(port.name.clone(), port.ty.clone());
        for leaf in destructurer.destruct(&decl, &mut namespace, &mut renames)? {
            lowered.ports.push(Port::new(
                leaf.name,
                port.direction.oriented(leaf.orientation),
                leaf.ty,
            ));
        }
    }

    for item in &module.body {
        if !item.kind.is_lowerable() {
            lowered.body.push(item.clone());
            continue;
        }
        let decl = Declaration::new(item.name.clone(), item.ty.clone());
        let leaves = if item.kind == DeclKind::Register {
            destructurer.destruct_ground(&decl, &mut namespace, &mut renames)?
        } else {
            destructurer.destruct(&decl, &mut namespace, &mut renames)?
        };
        lowered
            .body
            .extend(leaves.into_iter().map(|leaf| Decl::new(leaf.name, item.kind, leaf.ty)));
    }

    debug!(
        module = %module.name,
        ports = lowered.ports.len(),
        declarations = lowered.body.len(),
        "lowered module types"
    );

    Ok(LoweredModule {
        module: lowered,
        renames,
        namespace,
    })
}

/// Lower every module of a circuit independently
///
/// # Errors
///
/// Returns the first [`LowerError`] hit in any module.
pub fn lower_circuit(circuit: &Circuit, config: &LowerTypesConfig) -> Result<LoweredCircuit, LowerError> {
    let mut modules = IndexMap::with_capacity(circuit.modules.len());
    for module in &circuit.modules {
        modules.insert(module.name.clone(), lower_module(module, config)?);
    }
    Ok(LoweredCircuit {
        name: circuit.name.clone(),
        modules,
    })
}
