//! Prerequisite identities and snapshots.
//!
//! A prerequisite is an independently-reported external condition, such as
//! "which Python interpreter is configured" or "which tool build is
//! installed". Producers report a [`PrerequisiteSnapshot`] whenever they
//! learn something new; the coordinator replaces the previous snapshot of
//! that kind wholesale.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::capability::{CapabilityStatus, EnvironmentProbe};

/// Name of a prerequisite, e.g. `python` or `msfragger`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrerequisiteKind(String);

impl PrerequisiteKind {
    /// Create a kind from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The kind's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrerequisiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrerequisiteKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PrerequisiteKind {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// The latest known state of one prerequisite.
///
/// Snapshots are immutable once handed to the coordinator. Build one with
/// the `with_*` methods, then deliver it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrerequisiteSnapshot {
    version: Option<String>,
    valid: bool,
    location: Option<PathBuf>,
    capabilities: BTreeMap<String, CapabilityStatus>,
}

impl Default for PrerequisiteSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl PrerequisiteSnapshot {
    /// An empty, valid snapshot with no version reported.
    pub fn new() -> Self {
        Self {
            version: None,
            valid: true,
            location: None,
            capabilities: BTreeMap::new(),
        }
    }

    /// Snapshot reporting `version`.
    pub fn versioned(version: impl Into<String>) -> Self {
        Self::new().with_version(version)
    }

    /// Set the reported version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set where the prerequisite lives on disk.
    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Record the status of one capability provided by this prerequisite.
    pub fn with_capability(mut self, name: impl Into<String>, status: CapabilityStatus) -> Self {
        self.capabilities.insert(name.into(), status);
        self
    }

    /// Record many capability statuses at once.
    pub fn with_capabilities(
        mut self,
        statuses: impl IntoIterator<Item = (String, CapabilityStatus)>,
    ) -> Self {
        self.capabilities.extend(statuses);
        self
    }

    /// Mark the prerequisite as configured but unusable.
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }

    /// The reported version, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Whether the producer considers this prerequisite usable.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Where the prerequisite lives on disk, if reported.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// All reported capability statuses.
    pub fn capabilities(&self) -> &BTreeMap<String, CapabilityStatus> {
        &self.capabilities
    }
}

/// A snapshot answers capability questions from what its producer reported.
/// Capabilities it never mentioned are [`CapabilityStatus::Unknown`].
impl EnvironmentProbe for PrerequisiteSnapshot {
    fn probe(&self, capability: &str) -> CapabilityStatus {
        self.capabilities
            .get(capability)
            .copied()
            .unwrap_or(CapabilityStatus::Unknown)
    }
}
