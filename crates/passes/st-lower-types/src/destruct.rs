//! Destructuring one declaration into ground signals

use crate::config::LowerTypesConfig;
use crate::error::LowerError;
use crate::names::{self, NameTree, Separator, Shape};
use crate::orientation::compose;
use crate::rename::{RenameTable, Selector, StructuralPath};
use serde::{Deserialize, Serialize};
use st_ir::{Orientation, Type};
use st_namespace::Namespace;
use std::fmt;
use tracing::{debug, trace};

/// A declaration to be lowered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Root name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Orientation of the whole declaration, normally [`Orientation::Normal`]
    pub orientation: Orientation,
}

impl Declaration {
    /// Create a non-flipped declaration
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            orientation: Orientation::Normal,
        }
    }

    /// Set the declaration's orientation
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

/// One signal produced by lowering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    /// Flat name
    pub name: String,
    /// Orientation relative to the root declaration
    pub orientation: Orientation,
    /// Ground type, or an aggregate the policy keeps intact
    pub ty: Type,
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.orientation.is_flipped() {
            f.write_str("flip ")?;
        }
        write!(f, "{} : {}", self.name, self.ty)
    }
}

/// Splits aggregate declarations into ground leaves under one policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Destructurer {
    config: LowerTypesConfig,
}

impl Destructurer {
    /// Create a destructurer with the given policy
    #[must_use]
    pub const fn new(config: LowerTypesConfig) -> Self {
        Self { config }
    }

    /// Lower one declaration
    ///
    /// Returns the leaves in declaration and index order. Every leaf name is
    /// registered in `namespace` and a rename entry is recorded for every
    /// leaf. Nothing is registered or recorded if an error is returned.
    ///
    /// # Errors
    ///
    /// Returns `LowerError::UnresolvedType` if the type still contains an
    /// unresolved placeholder, or `LowerError::DuplicateRename` if the
    /// declaration was already lowered into `renames`.
    pub fn destruct(
        &self,
        decl: &Declaration,
        namespace: &mut Namespace,
        renames: &mut RenameTable,
    ) -> Result<Vec<Leaf>, LowerError> {
        self.run(decl, namespace, renames, false)
    }

    /// Lower one declaration that must end up as ground signals only
    ///
    /// # Errors
    ///
    /// As [`Destructurer::destruct`], and `LowerError::PolicyViolation` if the
    /// policy keeps some aggregate inside the declaration intact.
    pub fn destruct_ground(
        &self,
        decl: &Declaration,
        namespace: &mut Namespace,
        renames: &mut RenameTable,
    ) -> Result<Vec<Leaf>, LowerError> {
        self.run(decl, namespace, renames, true)
    }

    fn run(
        &self,
        decl: &Declaration,
        namespace: &mut Namespace,
        renames: &mut RenameTable,
        require_ground: bool,
    ) -> Result<Vec<Leaf>, LowerError> {
        if renames.is_lowered(&decl.name) {
            return Err(LowerError::DuplicateRename {
                root: decl.name.clone(),
                path: StructuralPath::root(),
            });
        }

        let mut tree = names::build(&decl.name, &decl.ty, &self.config, require_ground)?;
        names::escape_root(&mut tree, &decl.name, namespace);

        let mut emitter = Emitter {
            root: &decl.name,
            path: StructuralPath::root(),
            leaves: Vec::with_capacity(decl.ty.leaf_count()),
        };
        emitter.emit(&tree, decl.name.clone(), tree.separator, decl.orientation);

        renames.declare(&decl.name);
        for (path, leaf) in &emitter.leaves {
            namespace.insert(leaf.name.clone());
            renames.record(&decl.name, path.clone(), leaf.name.clone(), leaf.orientation)?;
        }

        debug!(root = %decl.name, leaves = emitter.leaves.len(), "destructured declaration");
        Ok(emitter.leaves.into_iter().map(|(_, leaf)| leaf).collect())
    }
}

/// Walks a resolved [`NameTree`] and produces leaves in order
struct Emitter<'a> {
    root: &'a str,
    path: StructuralPath,
    leaves: Vec<(StructuralPath, Leaf)>,
}

impl Emitter<'_> {
    fn emit(&mut self, node: &NameTree<'_>, name: String, join: Separator, orientation: Orientation) {
        match &node.shape {
            Shape::Leaf => {
                trace!(root = self.root, path = %self.path, %name, "leaf");
                self.leaves.push((
                    self.path.clone(),
                    Leaf {
                        name,
                        orientation,
                        ty: node.ty.clone(),
                    },
                ));
            }
            Shape::Bundle(members) => {
                for member in members {
                    self.path.push(Selector::Field(member.name.to_string()));
                    let child = format!("{name}{join}{}", member.name);
                    let child_orientation = compose(orientation, member.orientation);
                    self.emit(&member.node, child, member.node.separator, child_orientation);
                    self.path.pop();
                }
            }
            Shape::Vector { element, size } => {
                for idx in 0..*size {
                    self.path.push(Selector::Index(idx));
                    let child = format!("{name}{join}{idx}");
                    self.emit(element, child, element.separator, orientation);
                    self.path.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use st_ir::{Field, parse_type};

    fn lower_leaves(ty: &str, config: LowerTypesConfig) -> Vec<Leaf> {
        let decl = Declaration::new("a", parse_type(ty).unwrap());
        Destructurer::new(config)
            .destruct(&decl, &mut Namespace::new(), &mut RenameTable::new())
            .unwrap()
    }

    fn lower_with(ty: &str, namespace: &mut Namespace, config: LowerTypesConfig) -> Vec<String> {
        let decl = Declaration::new("a", parse_type(ty).unwrap());
        let mut renames = RenameTable::new();
        Destructurer::new(config)
            .destruct(&decl, namespace, &mut renames)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn lower(ty: &str) -> Vec<String> {
        lower_with(ty, &mut Namespace::new(), LowerTypesConfig::default())
    }

    #[test]
    fn test_flat_bundle() {
        assert_eq!(lower("{a:1,b:1}"), ["a_a : UInt<1>", "a_b : UInt<1>"]);
    }

    #[test]
    fn test_flipped_field() {
        assert_eq!(lower("{flip a:1, b:1}"), ["flip a_a : UInt<1>", "a_b : UInt<1>"]);
    }

    #[test]
    fn test_nested_request_response() {
        let leaves = lower("{flip valid:1, bits:{addr:8, data:{x:2, y:SInt<3>}[2]}, flip ready:Clock}");
        expect![[r#"
            flip a_valid : UInt<1>
            a_bits_addr : UInt<8>
            a_bits_data_0_x : UInt<2>
            a_bits_data_0_y : SInt<3>
            a_bits_data_1_x : UInt<2>
            a_bits_data_1_y : SInt<3>
            flip a_ready : Clock
        "#]]
        .assert_eq(&(leaves.join("\n") + "\n"));
    }

    #[test]
    fn test_double_flip_cancels() {
        assert_eq!(
            lower("{flip a:{flip b:1, c:1}}"),
            ["a_a_b : UInt<1>", "flip a_a_c : UInt<1>"]
        );
    }

    #[test]
    fn test_vector_inherits_orientation() {
        assert_eq!(
            lower("{flip v:2[2]}"),
            ["flip a_v_0 : UInt<2>", "flip a_v_1 : UInt<2>"]
        );
    }

    #[test]
    fn test_ground_declaration_keeps_name() {
        let mut namespace: Namespace = ["a"].into_iter().collect();
        let leaves = lower_with("SInt<4>", &mut namespace, LowerTypesConfig::default());
        assert_eq!(leaves, ["a : SInt<4>"]);
    }

    #[test]
    fn test_empty_aggregates_produce_nothing() {
        assert!(lower("{}").is_empty());
        assert!(lower("{x:1}[0]").is_empty());
    }

    #[test]
    fn test_vectors_kept_by_policy() {
        let leaves = lower_with(
            "{a:1,b:1[2]}",
            &mut Namespace::new(),
            LowerTypesConfig::bundles_only(),
        );
        assert_eq!(leaves, ["a_a : UInt<1>", "a_b : UInt<1>[2]"]);
    }

    #[test]
    fn test_outermost_kept_aggregate_is_one_leaf() {
        let config = LowerTypesConfig {
            lower_bundles: false,
            lower_vecs: true,
        };
        let leaves = lower_with("{x:1,y:2}[2]", &mut Namespace::new(), config);
        assert_eq!(leaves, ["a_0 : {x : UInt<1>, y : UInt<2>}", "a_1 : {x : UInt<1>, y : UInt<2>}"]);

        let leaves = lower_with("{x:1}", &mut Namespace::new(), config);
        assert_eq!(leaves, ["a : {x : UInt<1>}"]);
    }

    #[test]
    fn test_records_renames_and_namespace() {
        let decl = Declaration::new("io", parse_type("{flip in:{x:1}, out:1[2]}").unwrap());
        let mut namespace = Namespace::new();
        let mut renames = RenameTable::new();
        Destructurer::default()
            .destruct(&decl, &mut namespace, &mut renames)
            .unwrap();

        let path = StructuralPath::root().field("in").field("x");
        let target = renames.get("io", &path).unwrap();
        assert_eq!(target.name, "io_in_x");
        assert_eq!(target.orientation, Orientation::Flipped);
        assert_eq!(
            renames.get("io", &StructuralPath::root().field("out").index(1)).unwrap().name,
            "io_out_1"
        );
        for name in ["io_in_x", "io_out_0", "io_out_1"] {
            assert!(namespace.contains(name), "{name} not registered");
        }
        assert_eq!(renames.len(), 3);
    }

    #[test]
    fn test_error_leaves_state_untouched() {
        let decl = Declaration::new("w", Type::bundle(vec![
            Field::new("a", Type::uint(1)),
            Field::new("b", Type::Unknown),
        ]));
        let mut namespace = Namespace::new();
        let mut renames = RenameTable::new();
        let err = Destructurer::default()
            .destruct(&decl, &mut namespace, &mut renames)
            .unwrap_err();
        assert!(matches!(err, LowerError::UnresolvedType { .. }));
        assert!(namespace.is_empty());
        assert!(renames.is_empty());
    }

    #[test]
    fn test_leaf_json_reads_back() {
        let leaves = lower_leaves("{x:1, flip y:{z:Clock}[2]}", LowerTypesConfig::bundles_only());
        let json = serde_json::to_string(&leaves[0]).unwrap();
        assert_eq!(
            json,
            r#"{"name":"a_x","orientation":"normal","ty":{"type":"ground","kind":"UInt","width":1}}"#
        );
        for leaf in &leaves {
            let json = serde_json::to_string(leaf).unwrap();
            assert_eq!(&serde_json::from_str::<Leaf>(&json).unwrap(), leaf);
        }
    }

    #[test]
    fn test_empty_declaration_cannot_be_lowered_twice() {
        let decl = Declaration::new("e", parse_type("{x:1}[0]").unwrap());
        let mut namespace = Namespace::new();
        let mut renames = RenameTable::new();
        let destructurer = Destructurer::default();
        assert!(destructurer.destruct(&decl, &mut namespace, &mut renames).unwrap().is_empty());
        assert!(renames.is_lowered("e"));
        assert!(renames.is_empty());
        let err = destructurer
            .destruct(&decl, &mut namespace, &mut renames)
            .unwrap_err();
        assert!(matches!(err, LowerError::DuplicateRename { .. }));
    }

    #[test]
    fn test_lowering_twice_is_rejected() {
        let decl = Declaration::new("a", parse_type("{x:1}").unwrap());
        let mut namespace = Namespace::new();
        let mut renames = RenameTable::new();
        let destructurer = Destructurer::default();
        destructurer.destruct(&decl, &mut namespace, &mut renames).unwrap();
        let err = destructurer
            .destruct(&decl, &mut namespace, &mut renames)
            .unwrap_err();
        assert!(matches!(err, LowerError::DuplicateRename { .. }));
    }

    #[test]
    fn test_flipped_declaration() {
        let decl = Declaration::new("p", parse_type("{flip a:1, b:1}").unwrap())
            .with_orientation(Orientation::Flipped);
        let leaves = Destructurer::default()
            .destruct(&decl, &mut Namespace::new(), &mut RenameTable::new())
            .unwrap();
        let rendered: Vec<_> = leaves.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["p_a : UInt<1>", "flip p_b : UInt<1>"]);
    }
}
