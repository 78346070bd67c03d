//! Properties every lowering must satisfy

use rustc_hash::FxHashSet;
use st_ir::{Orientation, Type, parse_type};
use st_lower_types::{Declaration, Destructurer, Leaf, RenameTable, Selector, StructuralPath, compose};
use st_namespace::Namespace;

const TYPES: &[&str] = &[
    "{a:1,b:1}",
    "{a:1,b:{c:1}}",
    "{a:1,b:1[2]}",
    "{a:1,b:{c:1},b_c:1}",
    "{flip a:{flip b:1, c:{d:SInt<2>}[3]}, a_c_0_d:1, a_b:Clock}",
    "{x:{y_z:1}, x_y:{z:1}, x_y_z:1}",
    "{p:{q:1}, p_q:1}[3]",
    "{_:{_:1}, __:1}",
    "{b:{c:1}[2], b_c_1:1, b_c:{x:1}}",
];

fn lower(name: &str, ty: &str, namespace: &mut Namespace, renames: &mut RenameTable) -> Vec<Leaf> {
    let decl = Declaration::new(name, parse_type(ty).unwrap());
    Destructurer::default()
        .destruct(&decl, namespace, renames)
        .unwrap()
}

/// Orientation of the leaf at `path`, composed field by field
fn expected_orientation(ty: &Type, path: &StructuralPath) -> Orientation {
    let mut ty = ty;
    let mut orientation = Orientation::Normal;
    for selector in path.selectors() {
        match (selector, ty) {
            (Selector::Field(name), Type::Bundle { fields }) => {
                let field = fields.iter().find(|field| &field.name == name).unwrap();
                orientation = compose(orientation, field.orientation);
                ty = &field.ty;
            }
            (Selector::Index(_), Type::Vector { element, .. }) => ty = element,
            (selector, ty) => panic!("path step {selector} does not fit {ty}"),
        }
    }
    orientation
}

#[test]
fn test_lowering_is_deterministic() {
    for ty in TYPES {
        let reserved: Namespace = ["a_a", "a_b_c", "a__a"].into_iter().collect();
        let first = lower("a", ty, &mut reserved.clone(), &mut RenameTable::new());
        let second = lower("a", ty, &mut reserved.clone(), &mut RenameTable::new());
        assert_eq!(first, second, "{ty}");
    }
}

#[test]
fn test_leaf_names_are_unique_and_new() {
    for ty in TYPES {
        for reserved in [&[][..], &["a_a"][..], &["a_b_c", "a__b_c"][..]] {
            let mut namespace: Namespace = reserved.iter().copied().collect();
            let before = namespace.clone();
            let leaves = lower("a", ty, &mut namespace, &mut RenameTable::new());

            let mut seen = FxHashSet::default();
            for leaf in &leaves {
                assert!(seen.insert(leaf.name.as_str()), "{ty}: {} emitted twice", leaf.name);
                assert!(!before.contains(&leaf.name), "{ty}: {} was already taken", leaf.name);
                assert!(namespace.contains(&leaf.name), "{ty}: {} not registered", leaf.name);
            }
            assert_eq!(namespace.len(), before.len() + leaves.len(), "{ty}");
        }
    }
}

#[test]
fn test_namespace_only_grows() {
    let mut namespace: Namespace = ["keep", "a_b"].into_iter().collect();
    let mut renames = RenameTable::new();
    lower("a", "{b:1, c:{d:1}}", &mut namespace, &mut renames);
    assert!(namespace.contains("keep"));
    assert!(namespace.contains("a_b"));
    assert!(namespace.contains("a__b"));
    assert!(namespace.contains("a__c_d"));
}

#[test]
fn test_declarations_sharing_a_namespace_never_collide() {
    let mut namespace = Namespace::new();
    let mut renames = RenameTable::new();
    let mut all = FxHashSet::default();
    for (name, ty) in [
        ("a", "{b:{c:1}}"),
        ("a_b", "{c:1}"),
        ("a_b_c", "{x:1}[2]"),
        ("a__b", "{c:1}"),
        ("a_b__c", "{x:1}"),
    ] {
        for leaf in lower(name, ty, &mut namespace, &mut renames) {
            assert!(all.insert(leaf.name.clone()), "{name}: {} collides", leaf.name);
        }
    }
    assert_eq!(renames.len(), all.len());
}

#[test]
fn test_ground_declarations_keep_their_name() {
    for ty in ["1", "SInt<8>", "Clock", "AsyncReset", "Analog<3>"] {
        let mut namespace: Namespace = ["w", "w_0"].into_iter().collect();
        let mut renames = RenameTable::new();
        let leaves = lower("w", ty, &mut namespace, &mut renames);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].name, "w");
        assert_eq!(leaves[0].ty, parse_type(ty).unwrap());
        assert_eq!(renames.get("w", &StructuralPath::root()).unwrap().name, "w");
    }
}

#[test]
fn test_orientation_follows_every_flip_on_the_path() {
    for ty in TYPES {
        let parsed = parse_type(ty).unwrap();
        let mut renames = RenameTable::new();
        let leaves = lower("a", ty, &mut Namespace::new(), &mut renames);
        assert_eq!(renames.len(), leaves.len(), "{ty}");

        for ((_, path, target), leaf) in renames.iter().zip(&leaves) {
            assert_eq!(target.name, leaf.name);
            assert_eq!(target.orientation, leaf.orientation);
            assert_eq!(leaf.orientation, expected_orientation(&parsed, path), "{ty}{path}");
        }
    }
}

#[test]
fn test_leaf_count_matches_type() {
    for ty in TYPES {
        let parsed = parse_type(ty).unwrap();
        let leaves = lower("a", ty, &mut Namespace::new(), &mut RenameTable::new());
        assert_eq!(leaves.len(), parsed.leaf_count(), "{ty}");
        assert!(leaves.iter().all(|leaf| leaf.ty.is_ground()), "{ty}");
    }
}
