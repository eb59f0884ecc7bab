//! The readiness coordinator.
//!
//! Producers report prerequisite snapshots from any thread. Each report
//! triggers one reconciliation pass: the snapshot is stored, every check is
//! re-run against the latest snapshot of *every* prerequisite, and exactly
//! one result is published. A single mutex makes each pass atomic; a pass
//! triggered while another runs waits, then validates the freshest state.
//!
//! Readiness reads never block on a pass. They are false from the moment a
//! pass is triggered until a pass with no other trigger pending succeeds.
//!
//! # Example
//!
//! ```
//! use preflight::capability::{Capability, CapabilityStatus};
//! use preflight::config::FeatureRequirements;
//! use preflight::coordinator::ReadinessCoordinator;
//! use preflight::prerequisite::PrerequisiteSnapshot;
//!
//! let req = FeatureRequirements::builder("dbsplit")
//!     .prerequisite_at_least("python", "3.9.0")
//!     .prerequisite_at_least("msfragger", "20180924")
//!     .capability(Capability::required("numpy", "python"))
//!     .resource("msfragger_pep_split.py")
//!     .build()
//!     .unwrap();
//! let coordinator = ReadinessCoordinator::new(req).unwrap();
//!
//! let result = coordinator.update(
//!     "python",
//!     PrerequisiteSnapshot::versioned("3.9.0")
//!         .with_capability("numpy", CapabilityStatus::Present),
//! );
//! // msfragger has not reported yet.
//! assert!(!result.is_ready());
//! assert!(!coordinator.is_ready());
//! ```

use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::assets::ResolvedAssets;
use crate::capability::EnvironmentProbe;
use crate::config::FeatureRequirements;
use crate::error::Result;
use crate::prerequisite::{PrerequisiteKind, PrerequisiteSnapshot};

use super::bus::ReadinessBus;
use super::checks::{run_checks, Snapshots};
use super::result::{ReadinessError, ReadinessEvent, ReadinessResult};

/// Where the coordinator is in its cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    /// No pass has run yet.
    #[default]
    Uninitialized,
    /// A pass is in progress.
    Reconciling,
    /// The last pass succeeded with these assets.
    Ready(ResolvedAssets),
    /// The last pass failed.
    NotReady,
}

#[derive(Debug, Default)]
struct CoordinatorState {
    snapshots: Snapshots,
    phase: Phase,
}

/// Readiness as seen by readers that must not wait for a pass.
#[derive(Debug, Default)]
struct ReadyView {
    /// Triggers that have not finished their pass yet.
    pending: usize,
    /// Primary asset of the last pass, when it succeeded.
    asset: Option<PathBuf>,
}

impl ReadyView {
    fn ready_asset(&self) -> Option<&Path> {
        if self.pending == 0 {
            self.asset.as_deref()
        } else {
            None
        }
    }
}

/// Marks one trigger as pending until dropped.
struct PendingPass<'a> {
    view: &'a Mutex<ReadyView>,
}

impl Drop for PendingPass<'_> {
    fn drop(&mut self) {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        view.pending = view.pending.saturating_sub(1);
    }
}

/// Decides whether one feature is usable from independently reported
/// prerequisites.
pub struct ReadinessCoordinator {
    requirements: FeatureRequirements,
    search_roots: Vec<PathBuf>,
    probe: Option<Arc<dyn EnvironmentProbe>>,
    state: Mutex<CoordinatorState>,
    view: Mutex<ReadyView>,
    bus: ReadinessBus,
}

impl std::fmt::Debug for ReadinessCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadinessCoordinator")
            .field("feature", &self.requirements.feature)
            .field("search_roots", &self.search_roots)
            .field("external_probe", &self.probe.is_some())
            .finish_non_exhaustive()
    }
}

impl ReadinessCoordinator {
    /// Coordinator using the requirements' own search roots and answering
    /// capability questions from provider snapshots.
    pub fn new(requirements: FeatureRequirements) -> Result<Self> {
        Self::builder(requirements).build()
    }

    /// Start configuring a coordinator.
    pub fn builder(requirements: FeatureRequirements) -> ReadinessCoordinatorBuilder {
        ReadinessCoordinatorBuilder {
            search_roots: requirements.search_roots.clone(),
            requirements,
            probe: None,
        }
    }

    fn lock_view(&self) -> MutexGuard<'_, ReadyView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear readiness before waiting for the state lock, so no reader
    /// sees the previous result while this trigger is outstanding.
    fn begin_pass(&self) -> PendingPass<'_> {
        let mut view = self.lock_view();
        view.pending += 1;
        view.asset = None;
        PendingPass { view: &self.view }
    }

    fn lock_state(&self) -> MutexGuard<'_, CoordinatorState> {
        // State is only ever replaced as whole values, so a pass that
        // panicked leaves nothing half-written.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The requirements this coordinator enforces.
    pub fn requirements(&self) -> &FeatureRequirements {
        &self.requirements
    }

    /// Directories searched for bundled resources.
    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    /// Replace the snapshot for `kind` and run a reconciliation pass.
    ///
    /// Delivering the same snapshot twice is safe: each delivery runs one
    /// pass and publishes one result.
    pub fn update(
        &self,
        kind: impl Into<PrerequisiteKind>,
        snapshot: PrerequisiteSnapshot,
    ) -> ReadinessResult {
        let kind = kind.into();
        let _pending = self.begin_pass();
        let mut state = self.lock_state();
        debug!(
            "{}: received {} (version {:?}, valid={})",
            self.requirements.feature,
            kind,
            snapshot.version(),
            snapshot.is_valid()
        );
        state.snapshots.insert(kind, Arc::new(snapshot));
        self.reconcile(&mut state)
    }

    /// Forget the snapshot for `kind` and run a reconciliation pass.
    pub fn remove(&self, kind: &PrerequisiteKind) -> ReadinessResult {
        let _pending = self.begin_pass();
        let mut state = self.lock_state();
        state.snapshots.remove(kind);
        self.reconcile(&mut state)
    }

    /// Run a reconciliation pass against the current snapshots, e.g. after
    /// assets were installed into a search root.
    pub fn revalidate(&self) -> ReadinessResult {
        let _pending = self.begin_pass();
        let mut state = self.lock_state();
        self.reconcile(&mut state)
    }

    /// One full pass. Must be called with the state lock held.
    fn reconcile(&self, state: &mut CoordinatorState) -> ReadinessResult {
        state.phase = Phase::Reconciling;
        debug!(
            "{}: reconciling with {}/{} prerequisites reported",
            self.requirements.feature,
            state.snapshots.len(),
            self.requirements.prerequisites.len()
        );

        let outcome = run_checks(
            &self.requirements,
            &state.snapshots,
            self.probe.as_deref(),
            &self.search_roots,
        );

        let (phase, result) = match outcome {
            Ok(assets) => match assets.primary().map(Path::to_path_buf) {
                Some(asset) => (Phase::Ready(assets), ReadinessResult::Ready { asset }),
                None => (
                    Phase::NotReady,
                    ReadinessResult::NotReady {
                        reason: ReadinessError::AssetMissing {
                            missing: Vec::new(),
                        },
                    },
                ),
            },
            Err(reason) => (Phase::NotReady, ReadinessResult::NotReady { reason }),
        };

        let was_ready = self
            .bus
            .latest()
            .is_some_and(|event| event.result.is_ready());
        match (&result, was_ready) {
            (ReadinessResult::Ready { asset }, false) => {
                info!("{} is ready ({})", self.requirements.feature, asset.display())
            }
            (ReadinessResult::NotReady { reason }, true) => {
                info!("{} is no longer ready: {}", self.requirements.feature, reason)
            }
            (ReadinessResult::NotReady { reason }, false) => {
                debug!("{} not ready: {}", self.requirements.feature, reason)
            }
            (ReadinessResult::Ready { .. }, true) => {}
        }

        state.phase = phase;
        self.lock_view().asset = result.asset().map(Path::to_path_buf);
        self.bus.publish(result.clone());
        result
    }

    /// Whether the last pass succeeded and no trigger is pending.
    ///
    /// `false` before any pass and while any pass is pending or running.
    /// Never waits for an in-flight pass.
    pub fn is_ready(&self) -> bool {
        self.lock_view().ready_asset().is_some()
    }

    /// The last published result.
    ///
    /// Before any prerequisite has been reported this is a
    /// `ConfigurationIncomplete` result naming every prerequisite, without
    /// publishing anything.
    pub fn last_result(&self) -> ReadinessResult {
        match self.bus.latest() {
            Some(event) => event.result,
            None => ReadinessResult::NotReady {
                reason: ReadinessError::ConfigurationIncomplete {
                    missing: self
                        .requirements
                        .prerequisites
                        .iter()
                        .map(|p| p.kind.clone())
                        .collect(),
                    invalid: Vec::new(),
                },
            },
        }
    }

    /// The last published event, if any.
    pub fn last_event(&self) -> Option<ReadinessEvent> {
        self.bus.latest()
    }

    /// Primary asset from the last pass, when [`is_ready`](Self::is_ready).
    pub fn primary_asset(&self) -> Option<PathBuf> {
        self.lock_view().ready_asset().map(Path::to_path_buf)
    }

    /// Every resolved asset from the last successful pass, when the last
    /// pass succeeded. Waits for an in-flight pass.
    pub fn resolved_assets(&self) -> Option<ResolvedAssets> {
        match &self.lock_state().phase {
            Phase::Ready(assets) => Some(assets.clone()),
            _ => None,
        }
    }

    /// Phase after the last completed pass. Waits for an in-flight pass.
    pub fn phase(&self) -> Phase {
        self.lock_state().phase.clone()
    }

    /// The stored snapshot for `kind`. Waits for an in-flight pass.
    pub fn snapshot(&self, kind: &PrerequisiteKind) -> Option<Arc<PrerequisiteSnapshot>> {
        self.lock_state().snapshots.get(kind).cloned()
    }

    /// Subscribe to published results; see [`ReadinessBus::subscribe`].
    pub fn subscribe(&self) -> Receiver<ReadinessEvent> {
        self.bus.subscribe()
    }

    /// The bus results are published on.
    pub fn bus(&self) -> &ReadinessBus {
        &self.bus
    }
}

/// Builder for [`ReadinessCoordinator`].
pub struct ReadinessCoordinatorBuilder {
    requirements: FeatureRequirements,
    search_roots: Vec<PathBuf>,
    probe: Option<Arc<dyn EnvironmentProbe>>,
}

impl ReadinessCoordinatorBuilder {
    /// Replace the search roots supplied by the requirements.
    pub fn search_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.search_roots = roots;
        self
    }

    /// Answer every capability question with `probe` instead of the
    /// provider snapshots.
    pub fn probe(mut self, probe: Arc<dyn EnvironmentProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Validate the requirements and build.
    pub fn build(self) -> Result<ReadinessCoordinator> {
        self.requirements.validate()?;
        Ok(ReadinessCoordinator {
            requirements: self.requirements,
            search_roots: self.search_roots,
            probe: self.probe,
            state: Mutex::new(CoordinatorState::default()),
            view: Mutex::new(ReadyView::default()),
            bus: ReadinessBus::new(),
        })
    }
}
