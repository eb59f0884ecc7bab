//! Feature requirement configuration.
//!
//! A feature declares its prerequisites, capabilities, bundled resources
//! and search roots in YAML. This module defines that schema and loads it.
//!
//! # Example
//!
//! ```
//! use preflight::config::FeatureRequirements;
//! use preflight::capability::Capability;
//!
//! let req = FeatureRequirements::builder("dbsplit")
//!     .prerequisite_at_least("python", "3.9.0")
//!     .prerequisite_at_least("msfragger", "20180924")
//!     .capability(Capability::required("numpy", "python"))
//!     .resource("msfragger_pep_split.py")
//!     .search_root("tools")
//!     .build()
//!     .unwrap();
//! assert_eq!(req.prerequisites.len(), 2);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{anchor_search_roots, load_requirements, parse_requirements};
pub use schema::{FeatureRequirements, FeatureRequirementsBuilder, PrerequisiteRequirement};
