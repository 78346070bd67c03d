//! Integration test utilities for Strata
//!
//! Lowering cases live as TOML files under `fixtures/`:
//!
//! ```toml
//! name = "a"
//! type = "{a:1, b:1}"
//! reserved = ["a_a"]
//! expected = ["a__a : UInt<1>", "a__b : UInt<1>"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use st_ir::parse_type;
use st_lower_types::{Declaration, Destructurer, LowerTypesConfig, RenameTable};
use st_namespace::Namespace;
use std::fs;
use std::path::{Path, PathBuf};

/// One lowering case
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Fixture {
    /// File the case was read from
    #[serde(skip)]
    pub path: PathBuf,
    /// Declaration name
    pub name: String,
    /// Declaration type in bracketed notation
    #[serde(rename = "type")]
    pub ty: String,
    /// Names already taken in the enclosing module
    #[serde(default)]
    pub reserved: Vec<String>,
    /// Lowering policy
    #[serde(default)]
    pub policy: LowerTypesConfig,
    /// Serialized leaves, in order
    pub expected: Vec<String>,
}

impl Fixture {
    /// Read one fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid case
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture: {}", path.display()))?;
        let mut fixture: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse fixture: {}", path.display()))?;
        fixture.path = path.to_path_buf();
        Ok(fixture)
    }

    /// Read every `.toml` fixture in a directory, sorted by file name
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or any fixture cannot be read
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Vec<Self>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();
        paths.iter().map(|path| Self::from_file(path)).collect()
    }

    /// Lower the case and return the serialized leaves
    ///
    /// # Errors
    ///
    /// Returns an error if the type does not parse or lowering fails
    pub fn run(&self) -> Result<Vec<String>> {
        let ty = parse_type(&self.ty)
            .map_err(|err| anyhow::anyhow!("{}: {err}", self.path.display()))?;
        let mut namespace: Namespace = self.reserved.iter().cloned().collect();
        let leaves = Destructurer::new(self.policy)
            .destruct(
                &Declaration::new(self.name.clone(), ty),
                &mut namespace,
                &mut RenameTable::new(),
            )
            .with_context(|| format!("Failed to lower fixture: {}", self.path.display()))?;
        Ok(leaves.iter().map(ToString::to_string).collect())
    }
}

/// Directory holding the fixture files
#[must_use]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Lower `ty` as a declaration named `name` against `reserved` and return the
/// flat names, with `flip ` prefixed to flipped leaves
///
/// # Panics
///
/// Panics if the type does not parse or lowering fails; meant for tests.
#[must_use]
#[allow(clippy::unwrap_used, reason = "test helper")]
pub fn lower_names(name: &str, ty: &str, reserved: &[&str]) -> Vec<String> {
    let mut namespace: Namespace = reserved.iter().copied().collect();
    let decl = Declaration::new(name, parse_type(ty).unwrap());
    Destructurer::default()
        .destruct(&decl, &mut namespace, &mut RenameTable::new())
        .unwrap()
        .into_iter()
        .map(|leaf| {
            if leaf.orientation.is_flipped() {
                format!("flip {}", leaf.name)
            } else {
                leaf.name
            }
        })
        .collect()
}
