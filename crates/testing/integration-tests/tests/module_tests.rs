//! Lowering whole modules and rewriting aggregate accesses

use expect_test::expect;
use st_ir::{Circuit, Decl, DeclKind, Direction, Field, Module, Port, Type, parse_type};
use st_lower_types::{LowerError, LowerTypesConfig, StructuralPath, lower_circuit, lower_module};

fn memory_bus() -> Module {
    let ty = |text: &str| parse_type(text).unwrap();
    Module::new("Bus")
        .with_port(Port::new("clk", Direction::Input, ty("Clock")))
        .with_port(Port::new(
            "io",
            Direction::Output,
            ty("{flip req:{addr:8, data:{lo:4, hi:4}[2]}, resp:8, io_resp:1}"),
        ))
        .with_decl(Decl::new("state", DeclKind::Register, ty("{busy:1, count:4}")))
        .with_decl(Decl::new("io_req", DeclKind::Wire, ty("{addr:8}")))
        .with_decl(Decl::new("mem", DeclKind::Memory, ty("8[16]")))
        .with_decl(Decl::new("sum", DeclKind::Node, ty("SInt<9>")))
}

fn render(module: &Module) -> String {
    let mut out = String::new();
    for port in &module.ports {
        out.push_str(&port.to_string());
        out.push('\n');
    }
    for decl in &module.body {
        out.push_str(&decl.to_string());
        out.push('\n');
    }
    out
}

#[test]
fn test_lower_module_snapshot() {
    let lowered = lower_module(&memory_bus(), &LowerTypesConfig::default()).unwrap();
    expect![[r#"
        input clk : Clock
        input io_req_addr : UInt<8>
        input io_req_data_0_lo : UInt<4>
        input io_req_data_0_hi : UInt<4>
        input io_req_data_1_lo : UInt<4>
        input io_req_data_1_hi : UInt<4>
        output io_resp : UInt<8>
        output io_io_resp : UInt<1>
        reg state_busy : UInt<1>
        reg state_count : UInt<4>
        wire io_req__addr : UInt<8>
        mem mem : UInt<8>[16]
        node sum : SInt<9>
    "#]]
    .assert_eq(&render(&lowered.module));
}

#[test]
fn test_expand_whole_port_field() {
    let lowered = lower_module(&memory_bus(), &LowerTypesConfig::default()).unwrap();
    let names: Vec<_> = lowered
        .renames
        .expand("io", &StructuralPath::root().field("req").field("data").index(1))
        .into_iter()
        .map(|(path, target)| format!("io{path} -> {}", target.name))
        .collect();
    assert_eq!(
        names,
        ["io.req.data[1].lo -> io_req_data_1_lo", "io.req.data[1].hi -> io_req_data_1_hi"]
    );
    assert_eq!(lowered.renames.expand("io", &StructuralPath::root()).len(), 7);
    assert!(lowered.renames.expand("mem", &StructuralPath::root()).is_empty());
}

#[test]
fn test_module_namespace_holds_every_name() {
    let lowered = lower_module(&memory_bus(), &LowerTypesConfig::default()).unwrap();
    for name in ["clk", "io", "io_req", "io_req__addr", "state_busy", "mem", "sum"] {
        assert!(lowered.namespace.contains(name), "{name} missing");
    }
}

#[test]
fn test_unresolved_type_names_its_location() {
    let module = Module::new("m").with_decl(Decl::new(
        "w",
        DeclKind::Wire,
        Type::bundle(vec![Field::new(
            "a",
            Type::vector(Type::Unknown, 2),
        )]),
    ));
    let err = lower_module(&module, &LowerTypesConfig::default()).unwrap_err();
    assert_eq!(
        err,
        LowerError::UnresolvedType {
            root: "w".to_string(),
            path: StructuralPath::root().field("a").index(0),
        }
    );
}

#[test]
fn test_circuit_lowers_modules_in_order() {
    let circuit = Circuit {
        name: "Top".to_string(),
        modules: vec![memory_bus(), Module::new("Empty")],
    };
    let lowered = lower_circuit(&circuit, &LowerTypesConfig::bundles_only()).unwrap();
    assert_eq!(lowered.name, "Top");
    let names: Vec<_> = lowered.modules.keys().map(String::as_str).collect();
    assert_eq!(names, ["Bus", "Empty"]);

    let bus = &lowered.modules["Bus"].module;
    assert_eq!(
        bus.ports[2].to_string(),
        "input io_req_data : {lo : UInt<4>, hi : UInt<4>}[2]"
    );
    assert!(lowered.modules["Empty"].renames.is_empty());
}
