//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};

use super::commands::{config::ConfigArgs, packages::PackagesArgs, simulate::SimulateArgs};

#[derive(Parser, Debug)]
#[command(name = "bilan")]
#[command(about = "Bilan - progression engine for skills-assessment questionnaires", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the package catalog, or show one package
    Packages(PackagesArgs),

    /// Show or validate the effective configuration
    Config(ConfigArgs),

    /// Run a complete session with the built-in deterministic collaborators
    Simulate(SimulateArgs),
}
