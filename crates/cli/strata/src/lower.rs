//! Lower command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use miette::Report as MietteReport;
use serde::Serialize;
use st_lower_types::{Declaration, Destructurer, Leaf, LowerTypesConfig, RenameTable};
use st_namespace::Namespace;
use tracing::info;

/// Output switches for the lower command
pub struct Options {
    /// Print the rename table after the leaves
    pub show_renames: bool,
    /// Print JSON instead of text
    pub json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    leaves: &'a [Leaf],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    renames: Vec<RenameRow<'a>>,
}

#[derive(Serialize)]
struct RenameRow<'a> {
    path: String,
    name: &'a str,
    flipped: bool,
}

pub fn lower(
    name: &str,
    ty: &str,
    reserved: &[String],
    config: LowerTypesConfig,
    options: Options,
) -> Result<()> {
    let ty = st_ir::parse_type(ty).map_err(|err| anyhow::anyhow!("{:?}", MietteReport::new(err)))?;

    let mut namespace: Namespace = reserved.iter().cloned().collect();
    namespace.insert(name);
    let mut renames = RenameTable::new();

    let decl = Declaration::new(name, ty);
    let leaves = Destructurer::new(config)
        .destruct(&decl, &mut namespace, &mut renames)
        .with_context(|| format!("Failed to lower `{name}`"))?;
    info!(root = name, leaves = leaves.len(), reserved = reserved.len(), "lowered declaration");

    let rows: Vec<RenameRow<'_>> = if options.show_renames {
        renames
            .iter()
            .map(|(root, path, target)| RenameRow {
                path: format!("{root}{path}"),
                name: &target.name,
                flipped: target.orientation.is_flipped(),
            })
            .collect()
    } else {
        Vec::new()
    };

    if options.json {
        let report = Report {
            leaves: &leaves,
            renames: rows,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for leaf in &leaves {
        if leaf.ty.is_aggregate() {
            println!("{leaf} {}", "(kept by policy)".dimmed());
        } else {
            println!("{leaf}");
        }
    }
    if !rows.is_empty() {
        println!();
        println!("{}", "Renames:".bold());
        for row in &rows {
            let flip = if row.flipped { " (flipped)" } else { "" };
            println!("  {} {} {}{}", row.path, "->".dimmed(), row.name.green(), flip);
        }
    }

    Ok(())
}
