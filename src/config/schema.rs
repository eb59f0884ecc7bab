//! Requirement schema definitions.
//!
//! These structs map to the YAML file that declares what a feature needs.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::assets::ResourceId;
use crate::capability::Capability;
use crate::error::{PreflightError, Result};
use crate::prerequisite::PrerequisiteKind;
use crate::version::Version;

/// Everything one feature needs before it can run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureRequirements {
    /// Feature name (for display and logging)
    pub feature: String,

    /// Prerequisites that must be reported, in check order
    pub prerequisites: Vec<PrerequisiteRequirement>,

    /// Capabilities provided by those prerequisites
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<Capability>,

    /// Bundled resources; the first one is the primary asset
    pub resources: Vec<ResourceId>,

    /// Directories searched for resources, in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_roots: Vec<PathBuf>,
}

/// One prerequisite and its version bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteRequirement {
    /// Which prerequisite
    pub kind: PrerequisiteKind,

    /// Lowest acceptable version, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
}

impl FeatureRequirements {
    /// Start building requirements for `feature`.
    pub fn builder(feature: impl Into<String>) -> FeatureRequirementsBuilder {
        FeatureRequirementsBuilder {
            inner: FeatureRequirements {
                feature: feature.into(),
                ..Default::default()
            },
        }
    }

    /// Whether `kind` is a declared prerequisite.
    pub fn declares(&self, kind: &PrerequisiteKind) -> bool {
        self.prerequisites.iter().any(|p| &p.kind == kind)
    }

    /// Check internal consistency.
    ///
    /// Rejects empty names, duplicate prerequisite kinds, unparsable minimum
    /// versions, capabilities whose provider is undeclared, and an empty
    /// resource list.
    pub fn validate(&self) -> Result<()> {
        if self.feature.trim().is_empty() {
            return Err(invalid("feature name must not be empty"));
        }

        let mut seen = HashSet::new();
        for prereq in &self.prerequisites {
            if prereq.kind.as_str().trim().is_empty() {
                return Err(invalid("prerequisite kind must not be empty"));
            }
            if !seen.insert(&prereq.kind) {
                return Err(invalid(format!(
                    "duplicate prerequisite '{}'",
                    prereq.kind
                )));
            }
            if let Some(min) = &prereq.min_version {
                if Version::parse(min).is_none() {
                    return Err(invalid(format!(
                        "min_version '{}' for '{}' is not a version",
                        min, prereq.kind
                    )));
                }
            }
        }

        for cap in &self.capabilities {
            if cap.name.trim().is_empty() {
                return Err(invalid("capability name must not be empty"));
            }
            if !self.declares(&cap.provider) {
                return Err(invalid(format!(
                    "capability '{}' names undeclared provider '{}'",
                    cap.name, cap.provider
                )));
            }
        }

        if self.resources.is_empty() {
            return Err(invalid("at least one resource is required"));
        }
        if self.resources.iter().any(|r| r.as_str().trim().is_empty()) {
            return Err(invalid("resource ids must not be empty"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> PreflightError {
    PreflightError::ConfigValidationError {
        message: message.into(),
    }
}

/// Builder for [`FeatureRequirements`].
#[derive(Debug, Clone)]
pub struct FeatureRequirementsBuilder {
    inner: FeatureRequirements,
}

impl FeatureRequirementsBuilder {
    /// Require `kind` with no version bound.
    pub fn prerequisite(mut self, kind: impl Into<PrerequisiteKind>) -> Self {
        self.inner.prerequisites.push(PrerequisiteRequirement {
            kind: kind.into(),
            min_version: None,
        });
        self
    }

    /// Require `kind` at `min_version` or newer.
    pub fn prerequisite_at_least(
        mut self,
        kind: impl Into<PrerequisiteKind>,
        min_version: impl Into<String>,
    ) -> Self {
        self.inner.prerequisites.push(PrerequisiteRequirement {
            kind: kind.into(),
            min_version: Some(min_version.into()),
        });
        self
    }

    /// Add a capability.
    pub fn capability(mut self, capability: Capability) -> Self {
        self.inner.capabilities.push(capability);
        self
    }

    /// Add a bundled resource.
    pub fn resource(mut self, id: impl Into<ResourceId>) -> Self {
        self.inner.resources.push(id.into());
        self
    }

    /// Add a search root.
    pub fn search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.inner.search_roots.push(root.into());
        self
    }

    /// Validate and finish.
    pub fn build(self) -> Result<FeatureRequirements> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}
