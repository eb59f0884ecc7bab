//! The checks run by one reconciliation pass.
//!
//! Ordered cheapest and most fundamental first: configuration completeness,
//! then versions, then capabilities, then the filesystem. The first failing
//! check ends the pass, so the user always sees the most basic problem.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, warn};

use crate::assets::{self, ResolvedAssets};
use crate::capability::{classify_with, CapabilityStatus, EnvironmentProbe};
use crate::config::FeatureRequirements;
use crate::prerequisite::{PrerequisiteKind, PrerequisiteSnapshot};
use crate::version::meets_minimum;

use super::result::{ReadinessError, VersionShortfall};

/// Latest snapshot per prerequisite kind.
pub type Snapshots = HashMap<PrerequisiteKind, Arc<PrerequisiteSnapshot>>;

/// Run every check against `snapshots`, stopping at the first failure.
pub fn run_checks(
    requirements: &FeatureRequirements,
    snapshots: &Snapshots,
    probe: Option<&dyn EnvironmentProbe>,
    search_roots: &[PathBuf],
) -> Result<ResolvedAssets, ReadinessError> {
    check_configured(requirements, snapshots)?;
    check_versions(requirements, snapshots)?;
    check_capabilities(requirements, snapshots, probe)?;
    check_assets(requirements, search_roots)
}

/// Every declared prerequisite must be reported and valid.
pub fn check_configured(
    requirements: &FeatureRequirements,
    snapshots: &Snapshots,
) -> Result<(), ReadinessError> {
    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    for prereq in &requirements.prerequisites {
        match snapshots.get(&prereq.kind) {
            None => missing.push(prereq.kind.clone()),
            Some(snapshot) if !snapshot.is_valid() => invalid.push(prereq.kind.clone()),
            Some(_) => {}
        }
    }

    if missing.is_empty() && invalid.is_empty() {
        Ok(())
    } else {
        Err(ReadinessError::ConfigurationIncomplete { missing, invalid })
    }
}

/// Every reported version must meet its minimum. Assumes completeness.
pub fn check_versions(
    requirements: &FeatureRequirements,
    snapshots: &Snapshots,
) -> Result<(), ReadinessError> {
    let shortfalls: Vec<VersionShortfall> = requirements
        .prerequisites
        .iter()
        .filter_map(|prereq| {
            let minimum = prereq.min_version.as_deref()?;
            let found = snapshots.get(&prereq.kind).and_then(|s| s.version());
            (!meets_minimum(found, minimum)).then(|| VersionShortfall {
                prerequisite: prereq.kind.clone(),
                found: found.map(String::from),
                minimum: minimum.to_string(),
            })
        })
        .collect();

    if shortfalls.is_empty() {
        Ok(())
    } else {
        Err(ReadinessError::VersionTooOld { shortfalls })
    }
}

/// Every required capability must be present.
///
/// With an injected `probe`, it answers for all capabilities. Otherwise
/// each capability is answered by its provider's snapshot.
pub fn check_capabilities(
    requirements: &FeatureRequirements,
    snapshots: &Snapshots,
    probe: Option<&dyn EnvironmentProbe>,
) -> Result<(), ReadinessError> {
    let classification = classify_with(&requirements.capabilities, |cap| match probe {
        Some(probe) => probe.probe(&cap.name),
        None => snapshots
            .get(&cap.provider)
            .map(|snapshot| snapshot.probe(&cap.name))
            .unwrap_or(CapabilityStatus::Unknown),
    });

    for (cap, status) in classification.degraded_optional() {
        warn!(
            "Optional capability '{}' from {} is unavailable: {}",
            cap.name, cap.provider, status
        );
    }

    classification
        .verdict()
        .map_err(|groups| ReadinessError::CapabilityUnavailable { groups })
}

/// Every bundled resource must resolve in the search roots.
pub fn check_assets(
    requirements: &FeatureRequirements,
    search_roots: &[PathBuf],
) -> Result<ResolvedAssets, ReadinessError> {
    assets::resolve(&requirements.resources, search_roots).map_err(|missing| {
        let searched: Vec<String> = missing
            .searched()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        error!(
            "{} is missing assets, looked in:\n{}",
            requirements.feature,
            searched.join("\n")
        );
        ReadinessError::AssetMissing {
            missing: missing.missing().to_vec(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use std::fs;
    use tempfile::TempDir;

    fn requirements() -> FeatureRequirements {
        FeatureRequirements::builder("dbsplit")
            .prerequisite_at_least("python", "3.9.0")
            .prerequisite_at_least("msfragger", "20180924")
            .capability(Capability::required("numpy", "python"))
            .resource("split.py")
            .build()
            .unwrap()
    }

    fn snapshots(entries: &[(&str, PrerequisiteSnapshot)]) -> Snapshots {
        entries
            .iter()
            .map(|(k, s)| (PrerequisiteKind::from(*k), Arc::new(s.clone())))
            .collect()
    }

    fn python_ok() -> PrerequisiteSnapshot {
        PrerequisiteSnapshot::versioned("3.9.0").with_capability("numpy", CapabilityStatus::Present)
    }

    #[test]
    fn incomplete_lists_all_missing_in_declared_order() {
        let err = check_configured(&requirements(), &Snapshots::new()).unwrap_err();
        assert_eq!(
            err,
            ReadinessError::ConfigurationIncomplete {
                missing: vec!["python".into(), "msfragger".into()],
                invalid: vec![],
            }
        );
    }

    #[test]
    fn invalid_snapshot_counts_as_incomplete() {
        let snaps = snapshots(&[
            ("python", python_ok()),
            ("msfragger", PrerequisiteSnapshot::versioned("20190101").invalid()),
        ]);
        let err = check_configured(&requirements(), &snaps).unwrap_err();
        assert_eq!(err.violations(), vec!["msfragger: not valid"]);
    }

    #[test]
    fn version_check_collects_every_shortfall() {
        let snaps = snapshots(&[
            ("python", PrerequisiteSnapshot::versioned("3.8.10")),
            ("msfragger", PrerequisiteSnapshot::versioned("20180101")),
        ]);
        let ReadinessError::VersionTooOld { shortfalls } =
            check_versions(&requirements(), &snaps).unwrap_err()
        else {
            panic!("Expected VersionTooOld");
        };
        assert_eq!(shortfalls.len(), 2);
        assert_eq!(shortfalls[1].prerequisite, PrerequisiteKind::from("msfragger"));
        assert_eq!(shortfalls[1].minimum, "20180924");
    }

    #[test]
    fn missing_or_garbled_version_fails_version_check() {
        let snaps = snapshots(&[
            ("python", PrerequisiteSnapshot::new()),
            ("msfragger", PrerequisiteSnapshot::versioned("garbled")),
        ]);
        let err = check_versions(&requirements(), &snaps).unwrap_err();
        assert_eq!(err.kind(), "version_too_old");
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn capabilities_come_from_provider_snapshot() {
        let snaps = snapshots(&[
            ("python", PrerequisiteSnapshot::versioned("3.9.0")),
            ("msfragger", PrerequisiteSnapshot::versioned("20190101")),
        ]);
        let err = check_capabilities(&requirements(), &snaps, None).unwrap_err();
        assert_eq!(err.violations(), vec!["numpy: N/A"]);
    }

    #[test]
    fn injected_probe_overrides_snapshots() {
        let snaps = snapshots(&[("python", python_ok())]);
        let probe = |_: &str| CapabilityStatus::Absent;
        let err = check_capabilities(&requirements(), &snaps, Some(&probe)).unwrap_err();
        assert_eq!(err.violations(), vec!["numpy: Missing"]);
    }

    #[test]
    fn assets_resolve_or_report() {
        let temp = TempDir::new().unwrap();
        let roots = vec![temp.path().to_path_buf()];
        let err = check_assets(&requirements(), &roots).unwrap_err();
        assert_eq!(err.violations(), vec!["split.py"]);

        fs::write(temp.path().join("split.py"), "").unwrap();
        let resolved = check_assets(&requirements(), &roots).unwrap();
        assert_eq!(resolved.primary(), Some(temp.path().join("split.py").as_path()));
    }

    #[test]
    fn run_checks_stops_at_first_failure() {
        // python would fail its version check, but msfragger is absent.
        let snaps = snapshots(&[("python", PrerequisiteSnapshot::versioned("2.7"))]);
        let err = run_checks(&requirements(), &snaps, None, &[]).unwrap_err();
        assert_eq!(err.kind(), "configuration_incomplete");
    }
}
