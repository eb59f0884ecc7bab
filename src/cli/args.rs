//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Preflight - decide whether a feature's prerequisites are ready.
#[derive(Debug, Parser)]
#[command(name = "preflight")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print only the final result
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check whether a feature is ready given reported prerequisites
    Check(CheckArgs),

    /// Probe which modules an interpreter can import
    Probe(ProbeArgs),

    /// Compare two version strings
    Compare(CompareArgs),
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CheckArgs {
    /// Feature requirements file (YAML)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Report a prerequisite version (repeatable)
    #[arg(long = "prerequisite", value_name = "KIND=VERSION")]
    pub prerequisites: Vec<String>,

    /// Report a prerequisite by running its interpreter (repeatable)
    #[arg(long = "interpreter", value_name = "KIND=PATH")]
    pub interpreters: Vec<String>,

    /// Report a capability status for a prerequisite (repeatable)
    #[arg(long = "capability", value_name = "KIND:NAME=STATUS")]
    pub capabilities: Vec<String>,

    /// Mark a reported prerequisite as not valid (repeatable)
    #[arg(long = "invalid", value_name = "KIND")]
    pub invalid: Vec<String>,

    /// Search root for bundled resources; replaces the file's roots (repeatable)
    #[arg(long = "search-root", value_name = "DIR")]
    pub search_roots: Vec<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `probe` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ProbeArgs {
    /// Interpreter to run
    #[arg(long, default_value = "python3")]
    pub interpreter: PathBuf,

    /// Modules to import
    #[arg(required = true)]
    pub modules: Vec<String>,

    /// Print statuses as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `compare` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompareArgs {
    /// Left-hand version
    pub left: String,

    /// Right-hand version
    pub right: String,
}
