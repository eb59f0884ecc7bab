//! Check command implementation.
//!
//! The `preflight check` command loads a feature's requirements, delivers
//! every reported prerequisite to a coordinator in the order given, and
//! prints the result of the final pass.

use crate::capability::{CapabilityStatus, PythonModuleProbe};
use crate::cli::args::CheckArgs;
use crate::config::{load_requirements, FeatureRequirements};
use crate::coordinator::{ReadinessCoordinator, ReadinessResult};
use crate::error::{PreflightError, Result};
use crate::prerequisite::{PrerequisiteKind, PrerequisiteSnapshot};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The check command implementation.
pub struct CheckCommand {
    args: CheckArgs,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(args: CheckArgs) -> Self {
        Self { args }
    }

    /// Assemble one snapshot per reported kind, in first-mention order.
    fn collect_snapshots(
        &self,
        requirements: &FeatureRequirements,
    ) -> Result<Vec<(PrerequisiteKind, PrerequisiteSnapshot)>> {
        let mut reports: Vec<(PrerequisiteKind, PrerequisiteSnapshot)> = Vec::new();

        for input in &self.args.prerequisites {
            let (kind, version) = split_pair(input, '=', "KIND=VERSION")?;
            let snapshot = entry(&mut reports, kind);
            *snapshot = snapshot.clone().with_version(version);
        }

        for input in &self.args.interpreters {
            let (kind, path) = split_pair(input, '=', "KIND=PATH")?;
            let probed = probe_interpreter(requirements, &PrerequisiteKind::from(kind), path);
            *entry(&mut reports, kind) = probed;
        }

        for input in &self.args.capabilities {
            let (target, status) = split_pair(input, '=', "KIND:NAME=STATUS")?;
            let (kind, name) = split_pair(target, ':', "KIND:NAME=STATUS")?;
            let status: CapabilityStatus =
                status
                    .parse()
                    .map_err(|message| PreflightError::InvalidPrerequisite {
                        input: input.clone(),
                        message,
                    })?;
            let kind = PrerequisiteKind::from(kind);
            let snapshot = reports
                .iter_mut()
                .find(|(k, _)| *k == kind)
                .map(|(_, s)| s)
                .ok_or_else(|| PreflightError::InvalidPrerequisite {
                    input: input.clone(),
                    message: format!("'{}' has not been reported", kind),
                })?;
            *snapshot = snapshot.clone().with_capability(name, status);
        }

        for kind in &self.args.invalid {
            let snapshot = entry(&mut reports, kind);
            *snapshot = snapshot.clone().invalid();
        }

        Ok(reports)
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let requirements = load_requirements(&self.args.config)?;
        let reports = self.collect_snapshots(&requirements)?;

        for (kind, _) in &reports {
            if !requirements.declares(kind) {
                ui.warning(&format!(
                    "'{}' is not a prerequisite of {}; ignoring",
                    kind, requirements.feature
                ));
            }
        }

        let mut builder = ReadinessCoordinator::builder(requirements);
        if !self.args.search_roots.is_empty() {
            builder = builder.search_roots(self.args.search_roots.clone());
        }
        let coordinator = builder.build()?;
        let feature = coordinator.requirements().feature.clone();

        let result = reports
            .into_iter()
            .fold(None, |_, (kind, snapshot)| {
                Some(coordinator.update(kind, snapshot))
            })
            .unwrap_or_else(|| coordinator.revalidate());

        if self.args.json {
            let json = serde_json::to_string_pretty(&result).map_err(anyhow::Error::from)?;
            ui.raw(&json);
        } else {
            ui.show_header(&feature);
            report(ui, &feature, &result);
        }

        Ok(if result.is_ready() {
            CommandResult::success()
        } else {
            CommandResult::failure(1)
        })
    }
}

fn report(ui: &mut dyn UserInterface, feature: &str, result: &ReadinessResult) {
    match result {
        ReadinessResult::Ready { asset } => {
            ui.success(&format!("{} is ready ({})", feature, asset.display()));
        }
        ReadinessResult::NotReady { reason } => {
            ui.error(&format!("{} is not ready: {}", feature, reason.kind()));
            for violation in reason.violations() {
                ui.message(&format!("  - {}", violation));
            }
        }
    }
}

fn entry<'a>(
    reports: &'a mut Vec<(PrerequisiteKind, PrerequisiteSnapshot)>,
    kind: &str,
) -> &'a mut PrerequisiteSnapshot {
    let kind = PrerequisiteKind::from(kind);
    let index = match reports.iter().position(|(k, _)| *k == kind) {
        Some(index) => index,
        None => {
            reports.push((kind, PrerequisiteSnapshot::new()));
            reports.len() - 1
        }
    };
    &mut reports[index].1
}

fn split_pair<'a>(input: &'a str, sep: char, expected: &str) -> Result<(&'a str, &'a str)> {
    match input.split_once(sep) {
        Some((left, right)) if !left.trim().is_empty() && !right.trim().is_empty() => {
            Ok((left.trim(), right.trim()))
        }
        _ => Err(PreflightError::InvalidPrerequisite {
            input: input.to_string(),
            message: format!("expected {}", expected),
        }),
    }
}

/// Snapshot of an interpreter prerequisite, probing the capabilities it
/// provides. An interpreter that reports no version is not valid.
fn probe_interpreter(
    requirements: &FeatureRequirements,
    kind: &PrerequisiteKind,
    path: &str,
) -> PrerequisiteSnapshot {
    let probe = PythonModuleProbe::new(path);
    let modules = requirements
        .capabilities
        .iter()
        .filter(|cap| &cap.provider == kind)
        .map(|cap| cap.name.as_str());

    let snapshot = PrerequisiteSnapshot::new()
        .with_location(path)
        .with_capabilities(probe.probe_all(modules));

    match probe.interpreter_version() {
        Some(version) => snapshot.with_version(version),
        None => snapshot.invalid(),
    }
}
