//! Capability detection and classification.
//!
//! A capability is a named sub-dependency a feature needs from one of its
//! prerequisites, typically a library importable by an interpreter. Each is
//! classified into exactly one [`CapabilityStatus`].
//!
//! # Modules
//!
//! - [`status`] - Capability and status types
//! - [`probe`] - The [`EnvironmentProbe`] seam and a Python module probe
//! - [`classifier`] - Grouping statuses into a pass/fail verdict

pub mod classifier;
pub mod probe;
pub mod status;

pub use classifier::{classify, classify_with, CapabilityGroup, Classification};
pub use probe::{EnvironmentProbe, PythonModuleProbe};
pub use status::{Capability, CapabilityStatus};
