//! Environment probes.
//!
//! An [`EnvironmentProbe`] answers one question: what is the status of the
//! capability with this name? The coordinator never inspects runtimes
//! itself; it asks a probe. Snapshots implement the trait from what their
//! producer reported, closures implement it for ad-hoc wiring, and
//! [`PythonModuleProbe`] asks a real interpreter.
//!
//! # Example
//!
//! ```no_run
//! use preflight::capability::{EnvironmentProbe, PythonModuleProbe};
//!
//! let probe = PythonModuleProbe::new("python3");
//! println!("python {:?}", probe.interpreter_version());
//! println!("numpy: {}", probe.probe("numpy"));
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use super::status::CapabilityStatus;
use crate::version::extract_version;

/// Source of capability statuses.
pub trait EnvironmentProbe: Send + Sync {
    /// Status of the capability called `capability`.
    fn probe(&self, capability: &str) -> CapabilityStatus;
}

impl<F> EnvironmentProbe for F
where
    F: Fn(&str) -> CapabilityStatus + Send + Sync,
{
    fn probe(&self, capability: &str) -> CapabilityStatus {
        self(capability)
    }
}

/// Probes Python modules by importing them in a child interpreter.
#[derive(Debug, Clone)]
pub struct PythonModuleProbe {
    interpreter: PathBuf,
}

impl PythonModuleProbe {
    /// Probe modules with the interpreter at `interpreter`.
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    /// The interpreter this probe runs.
    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// The interpreter's version, from `--version`.
    ///
    /// Old interpreters print the banner to stderr, so both streams are
    /// searched. `None` when the interpreter cannot be run.
    pub fn interpreter_version(&self) -> Option<String> {
        let output = Command::new(&self.interpreter)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| debug!("Could not run {}: {}", self.interpreter.display(), e))
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        extract_version(&stdout)
            .or_else(|| extract_version(&stderr))
            .map(String::from)
    }

    /// Probe every module in `names`.
    pub fn probe_all<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> BTreeMap<String, CapabilityStatus> {
        names
            .into_iter()
            .map(|name| (name.to_string(), self.probe(name)))
            .collect()
    }
}

/// Module names are dotted identifiers; anything else is never handed to
/// the interpreter.
fn is_module_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

impl EnvironmentProbe for PythonModuleProbe {
    fn probe(&self, capability: &str) -> CapabilityStatus {
        if !is_module_name(capability) {
            debug!("Refusing to probe invalid module name '{}'", capability);
            return CapabilityStatus::Unknown;
        }

        let output = match Command::new(&self.interpreter)
            .arg("-c")
            .arg(format!("import {}", capability))
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                debug!(
                    "Could not run {} to probe '{}': {}",
                    self.interpreter.display(),
                    capability,
                    e
                );
                return CapabilityStatus::Unknown;
            }
        };

        if output.status.success() {
            return CapabilityStatus::Present;
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("ModuleNotFoundError") || stderr.contains("No module named") {
            CapabilityStatus::Absent
        } else {
            debug!("Importing '{}' failed: {}", capability, stderr.trim());
            CapabilityStatus::PresentWithError
        }
    }
}
