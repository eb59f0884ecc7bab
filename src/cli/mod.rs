//! Command-line interface for Preflight.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{CheckArgs, Cli, Commands, CompareArgs, ProbeArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
