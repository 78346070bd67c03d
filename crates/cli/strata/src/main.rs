//! Strata command line
//!
//! Front end for inspecting how aggregate types are lowered

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "CLI tool needs to print to stdout/stderr"
)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

mod check;
mod config;
mod lower;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Strata hardware IR tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Log lowering decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower one declaration and print its ground signals
    Lower {
        /// Declaration name
        name: String,

        /// Declaration type, e.g. "{a : UInt<1>, flip b : UInt<2>[4]}"
        #[arg(value_name = "TYPE")]
        ty: String,

        /// Name already in use in the enclosing module
        #[arg(long = "reserve", value_name = "NAME")]
        reserved: Vec<String>,

        /// Lowering policy file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Keep bundles intact
        #[arg(long)]
        no_lower_bundles: bool,

        /// Keep vectors intact
        #[arg(long)]
        no_lower_vecs: bool,

        /// Also print the rename table
        #[arg(long)]
        renames: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Parse a type and print its normal form
    Check {
        /// Type to check
        #[arg(value_name = "TYPE")]
        ty: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Lower {
            name,
            ty,
            reserved,
            config,
            no_lower_bundles,
            no_lower_vecs,
            renames,
            json,
        } => {
            let mut policy = config::load(config.as_deref())?;
            if no_lower_bundles {
                policy.lower_bundles = false;
            }
            if no_lower_vecs {
                policy.lower_vecs = false;
            }
            let options = lower::Options {
                show_renames: renames,
                json,
            };
            lower::lower(&name, &ty, &reserved, policy, options)?;
        }
        Commands::Check { ty } => {
            check::check(&ty)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
