//! Check command implementation

use anyhow::Result;
use colored::Colorize;
use miette::Report;

pub fn check(ty: &str) -> Result<()> {
    match st_ir::parse_type(ty) {
        Ok(parsed) => {
            println!("{} {}", "Type:".bold(), parsed);
            println!("{} {}", "Ground signals:".bold(), parsed.leaf_count());
            Ok(())
        }
        Err(err) => {
            eprintln!("{:?}", Report::new(err));
            anyhow::bail!("Check failed");
        }
    }
}
