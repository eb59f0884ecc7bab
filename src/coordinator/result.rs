//! Readiness results and the diagnostic taxonomy.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::assets::ResourceId;
use crate::capability::CapabilityGroup;
use crate::prerequisite::PrerequisiteKind;

/// One prerequisite below its minimum version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionShortfall {
    /// The offending prerequisite.
    pub prerequisite: PrerequisiteKind,
    /// Version it reported, if any.
    pub found: Option<String>,
    /// Lowest acceptable version.
    pub minimum: String,
}

impl fmt::Display for VersionShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}+ is required (found {})",
            self.prerequisite,
            self.minimum,
            self.found.as_deref().unwrap_or("no version")
        )
    }
}

/// Why a feature is not ready.
///
/// Every variant is fixable by the user (configure, upgrade, install) and
/// travels only as the reason of a [`ReadinessResult::NotReady`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadinessError {
    /// A prerequisite has not been reported yet, or was reported unusable.
    #[error("{}", describe_incomplete(.missing, .invalid))]
    ConfigurationIncomplete {
        missing: Vec<PrerequisiteKind>,
        invalid: Vec<PrerequisiteKind>,
    },

    /// A prerequisite's version is below the configured minimum.
    #[error("Minimum version not met: {}", join(.shortfalls, "; "))]
    VersionTooOld { shortfalls: Vec<VersionShortfall> },

    /// A required capability is not present.
    #[error("Required capabilities unavailable: {}", join(.groups, "; "))]
    CapabilityUnavailable { groups: Vec<CapabilityGroup> },

    /// One or more bundled resources could not be found.
    #[error("Missing assets in search roots: {}", join(.missing, "; "))]
    AssetMissing { missing: Vec<ResourceId> },
}

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

fn describe_incomplete(missing: &[PrerequisiteKind], invalid: &[PrerequisiteKind]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!(
            "Prerequisites not yet configured: {}",
            join(missing, ", ")
        ));
    }
    if !invalid.is_empty() {
        parts.push(format!("Prerequisites not valid: {}", join(invalid, ", ")));
    }
    if parts.is_empty() {
        "Prerequisites not yet configured".to_string()
    } else {
        parts.join("; ")
    }
}

impl ReadinessError {
    /// Stable machine-readable category.
    pub fn kind(&self) -> &'static str {
        match self {
            ReadinessError::ConfigurationIncomplete { .. } => "configuration_incomplete",
            ReadinessError::VersionTooOld { .. } => "version_too_old",
            ReadinessError::CapabilityUnavailable { .. } => "capability_unavailable",
            ReadinessError::AssetMissing { .. } => "asset_missing",
        }
    }

    /// One line per individual deficiency.
    ///
    /// Capabilities render as `name: Status`, e.g. `numpy: Missing`.
    pub fn violations(&self) -> Vec<String> {
        match self {
            ReadinessError::ConfigurationIncomplete { missing, invalid } => missing
                .iter()
                .map(|k| format!("{}: not configured", k))
                .chain(invalid.iter().map(|k| format!("{}: not valid", k)))
                .collect(),
            ReadinessError::VersionTooOld { shortfalls } => {
                shortfalls.iter().map(ToString::to_string).collect()
            }
            ReadinessError::CapabilityUnavailable { groups } => groups
                .iter()
                .flat_map(|group| {
                    group
                        .names
                        .iter()
                        .map(move |name| format!("{}: {}", name, group.status))
                })
                .collect(),
            ReadinessError::AssetMissing { missing } => {
                missing.iter().map(ToString::to_string).collect()
            }
        }
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReadinessResult {
    /// Every check passed; `asset` is the feature's primary resource.
    Ready { asset: PathBuf },
    /// At least one check failed.
    NotReady { reason: ReadinessError },
}

impl ReadinessResult {
    /// Whether the feature is usable.
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadinessResult::Ready { .. })
    }

    /// The primary asset, when ready.
    pub fn asset(&self) -> Option<&Path> {
        match self {
            ReadinessResult::Ready { asset } => Some(asset),
            ReadinessResult::NotReady { .. } => None,
        }
    }

    /// The failure, when not ready.
    pub fn reason(&self) -> Option<&ReadinessError> {
        match self {
            ReadinessResult::Ready { .. } => None,
            ReadinessResult::NotReady { reason } => Some(reason),
        }
    }
}

impl fmt::Display for ReadinessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessResult::Ready { asset } => write!(f, "Ready ({})", asset.display()),
            ReadinessResult::NotReady { reason } => write!(f, "Not ready: {}", reason),
        }
    }
}

/// A published result.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessEvent {
    /// Position in publish order, starting at 1.
    pub sequence: u64,
    /// The pass outcome.
    pub result: ReadinessResult,
    /// When the pass completed.
    pub evaluated_at: DateTime<Utc>,
}
