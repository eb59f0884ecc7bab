//! Capability classification.
//!
//! Turns per-capability probe answers into a grouping suitable for
//! diagnostics and a single verdict. Pure: the probe is the only source of
//! information, and nothing is cached between calls.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::probe::EnvironmentProbe;
use super::status::{Capability, CapabilityStatus};

/// Capabilities sharing one failing status, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityGroup {
    /// The shared status.
    pub status: CapabilityStatus,
    /// Capability names with that status.
    pub names: Vec<String>,
}

impl fmt::Display for CapabilityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.status.label(), self.names.join(", "))
    }
}

/// Status of every classified capability.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    entries: Vec<(Capability, CapabilityStatus)>,
}

impl Classification {
    /// Status of the capability called `name`, if it was classified.
    pub fn status_of(&self, name: &str) -> Option<CapabilityStatus> {
        self.entries
            .iter()
            .find(|(cap, _)| cap.name == name)
            .map(|(_, status)| *status)
    }

    /// Every capability grouped by status, severity order, declaration
    /// order within a group.
    pub fn by_status(&self) -> BTreeMap<CapabilityStatus, Vec<&Capability>> {
        let mut groups: BTreeMap<CapabilityStatus, Vec<&Capability>> = BTreeMap::new();
        for (cap, status) in &self.entries {
            groups.entry(*status).or_default().push(cap);
        }
        groups
    }

    /// Optional capabilities that are not present.
    pub fn degraded_optional(&self) -> Vec<(&Capability, CapabilityStatus)> {
        self.entries
            .iter()
            .filter(|(cap, status)| !cap.required && !status.is_present())
            .map(|(cap, status)| (cap, *status))
            .collect()
    }

    /// `Ok` when every required capability is present; otherwise the
    /// violators grouped by severity.
    pub fn verdict(&self) -> Result<(), Vec<CapabilityGroup>> {
        let violations: Vec<CapabilityGroup> = self
            .by_status()
            .into_iter()
            .filter(|(status, _)| !status.is_present())
            .filter_map(|(status, caps)| {
                let names: Vec<String> = caps
                    .into_iter()
                    .filter(|cap| cap.required)
                    .map(|cap| cap.name.clone())
                    .collect();
                (!names.is_empty()).then_some(CapabilityGroup { status, names })
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Number of classified capabilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was classified.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Classify `capabilities` with a single probe.
pub fn classify(capabilities: &[Capability], probe: &dyn EnvironmentProbe) -> Classification {
    classify_with(capabilities, |cap| probe.probe(&cap.name))
}

/// Classify `capabilities`, asking `status_of` for each one.
///
/// Used when different capabilities are answered by different probes, e.g.
/// one per providing prerequisite.
pub fn classify_with<F>(capabilities: &[Capability], mut status_of: F) -> Classification
where
    F: FnMut(&Capability) -> CapabilityStatus,
{
    let entries = capabilities
        .iter()
        .map(|cap| (cap.clone(), status_of(cap)))
        .collect();
    Classification { entries }
}
