//! Capability status types.
//!
//! Each capability check produces a `CapabilityStatus` describing whether
//! the named dependency can be used by the feature.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::prerequisite::PrerequisiteKind;

/// The result of probing a single capability.
///
/// Variant order is the diagnostic severity order: a report lists missing
/// capabilities first, then broken ones, then ones that could not be probed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityStatus {
    /// Installed and loads cleanly.
    Present,

    /// Not installed.
    Absent,

    /// Installed, but loading it fails (e.g. an import error from a broken
    /// native extension).
    PresentWithError,

    /// Could not be determined, e.g. the runtime that owns it could not be
    /// started.
    Unknown,
}

impl CapabilityStatus {
    /// Whether the capability can be used.
    pub fn is_present(&self) -> bool {
        matches!(self, CapabilityStatus::Present)
    }

    /// Short label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            CapabilityStatus::Present => "Installed",
            CapabilityStatus::Absent => "Missing",
            CapabilityStatus::PresentWithError => "Error loading module",
            CapabilityStatus::Unknown => "N/A",
        }
    }
}

impl fmt::Display for CapabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CapabilityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" | "installed" => Ok(Self::Present),
            "absent" | "missing" => Ok(Self::Absent),
            "present_with_error" | "error" | "broken" => Ok(Self::PresentWithError),
            "unknown" | "n/a" => Ok(Self::Unknown),
            _ => Err(format!("unknown capability status: {}", s)),
        }
    }
}

/// A named dependency the feature needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Name the provider's runtime knows it by (e.g. `numpy`).
    pub name: String,

    /// Prerequisite whose runtime provides the capability.
    pub provider: PrerequisiteKind,

    /// Optional capabilities are reported but never block readiness.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl Capability {
    /// A required capability.
    pub fn required(name: impl Into<String>, provider: impl Into<PrerequisiteKind>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            required: true,
        }
    }

    /// An optional capability.
    pub fn optional(name: impl Into<String>, provider: impl Into<PrerequisiteKind>) -> Self {
        Self {
            required: false,
            ..Self::required(name, provider)
        }
    }
}
