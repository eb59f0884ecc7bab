//! Preflight - decide whether a feature's external prerequisites are ready.
//!
//! A feature that wraps external tools (an interpreter with third-party
//! modules, a separately installed binary, bundled helper scripts) cannot
//! run until all of them are configured, recent enough and complete.
//! Preflight collects independently reported prerequisite snapshots and
//! turns them into one consistent go/no-go result per report.
//!
//! # Modules
//!
//! - [`assets`] - Locating bundled resources in search roots
//! - [`capability`] - Capability statuses, classification and probes
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Feature requirement loading and validation
//! - [`coordinator`] - Reconciliation, results and the readiness bus
//! - [`error`] - Error types and result aliases
//! - [`prerequisite`] - Prerequisite identities and snapshots
//! - [`ui`] - Terminal output
//! - [`version`] - Version ordering
//!
//! # Example
//!
//! ```
//! use preflight::version::compare;
//! use std::cmp::Ordering;
//!
//! assert_eq!(compare("3.10", "3.9"), Ordering::Greater);
//! assert_eq!(compare("20180101", "20180924"), Ordering::Less);
//! ```
//!
//! For coordinator usage, see [`coordinator::ReadinessCoordinator`] and the
//! integration tests.

pub mod assets;
pub mod capability;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod prerequisite;
pub mod ui;
pub mod version;

pub use error::{PreflightError, Result};
