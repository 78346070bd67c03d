//! Lowering policy files

use anyhow::{Context, Result};
use st_lower_types::LowerTypesConfig;
use std::fs;
use std::path::Path;

/// Policy file contents
///
/// ```toml
/// [lower-types]
/// lower-bundles = true
/// lower-vecs = false
/// ```
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PolicyFile {
    #[serde(default)]
    lower_types: Policy,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct Policy {
    lower_bundles: bool,
    lower_vecs: bool,
}

impl Default for Policy {
    fn default() -> Self {
        let config = LowerTypesConfig::default();
        Self {
            lower_bundles: config.lower_bundles,
            lower_vecs: config.lower_vecs,
        }
    }
}

/// Load the lowering policy, or the default policy when no file is given
pub fn load(path: Option<&Path>) -> Result<LowerTypesConfig> {
    let Some(path) = path else {
        return Ok(LowerTypesConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read policy file: {}", path.display()))?;
    parse(&contents).with_context(|| format!("Failed to parse policy file: {}", path.display()))
}

fn parse(contents: &str) -> Result<LowerTypesConfig> {
    let file: PolicyFile = toml::from_str(contents)?;
    Ok(LowerTypesConfig {
        lower_bundles: file.lower_types.lower_bundles,
        lower_vecs: file.lower_types.lower_vecs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = parse("[lower-types]\nlower-vecs = false\n").unwrap();
        assert_eq!(config, LowerTypesConfig::bundles_only());
        assert_eq!(parse("").unwrap(), LowerTypesConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[lower-types]\nlower-bundles = false").unwrap();
        let config = load(Some(file.path())).unwrap();
        assert!(!config.lower_bundles);
        assert!(config.lower_vecs);
    }

    #[test]
    fn test_invalid_value_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[lower-types]\nlower-bundles = \"yes\"").unwrap();
        let err = load(Some(file.path())).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse policy file"));
    }
}
