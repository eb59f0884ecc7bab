//! Probe command implementation.
//!
//! The `preflight probe` command asks an interpreter which modules it can
//! import and prints one status per module.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::capability::{CapabilityStatus, PythonModuleProbe};
use crate::cli::args::ProbeArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The probe command implementation.
pub struct ProbeCommand {
    args: ProbeArgs,
}

#[derive(Serialize)]
struct ProbeReport<'a> {
    interpreter: String,
    version: Option<String>,
    modules: &'a BTreeMap<String, CapabilityStatus>,
}

impl ProbeCommand {
    /// Create a new probe command.
    pub fn new(args: ProbeArgs) -> Self {
        Self { args }
    }
}

impl Command for ProbeCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let probe = PythonModuleProbe::new(&self.args.interpreter);
        let version = probe.interpreter_version();
        let statuses = probe.probe_all(self.args.modules.iter().map(String::as_str));

        if self.args.json {
            let report = ProbeReport {
                interpreter: self.args.interpreter.display().to_string(),
                version,
                modules: &statuses,
            };
            let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
            ui.raw(&json);
        } else {
            match &version {
                Some(v) => ui.show_header(&format!("{} {}", self.args.interpreter.display(), v)),
                None => ui.warning(&format!(
                    "Could not determine the version of {}",
                    self.args.interpreter.display()
                )),
            }
            for (name, status) in &statuses {
                let line = format!("{}: {}", name, status);
                if status.is_present() {
                    ui.success(&line);
                } else {
                    ui.error(&line);
                }
            }
        }

        Ok(if statuses.values().all(CapabilityStatus::is_present) {
            CommandResult::success()
        } else {
            CommandResult::failure(1)
        })
    }
}
