//! Integration tests for readiness coordination.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use preflight::assets::ResourceId;
use preflight::capability::{Capability, CapabilityStatus};
use preflight::config::FeatureRequirements;
use preflight::coordinator::{ReadinessCoordinator, ReadinessError, ReadinessResult};
use preflight::prerequisite::PrerequisiteSnapshot;
use tempfile::TempDir;

fn requirements(roots: &[&Path]) -> FeatureRequirements {
    let mut builder = FeatureRequirements::builder("dbsplit")
        .prerequisite_at_least("interpreter", "3.9.0")
        .prerequisite_at_least("tool", "20180924")
        .capability(Capability::required("numpy", "interpreter"))
        .resource("script.py");
    for root in roots {
        builder = builder.search_root(*root);
    }
    builder.build().unwrap()
}

fn interpreter(numpy: CapabilityStatus) -> PrerequisiteSnapshot {
    PrerequisiteSnapshot::versioned("3.9.0").with_capability("numpy", numpy)
}

fn reason(result: &ReadinessResult) -> &ReadinessError {
    result.reason().expect("expected a NotReady result")
}

#[test]
fn nothing_delivered_is_configuration_incomplete() {
    let coordinator = ReadinessCoordinator::new(requirements(&[])).unwrap();

    assert!(!coordinator.is_ready());
    assert!(coordinator.last_event().is_none());
    let result = coordinator.last_result();
    assert_eq!(reason(&result).kind(), "configuration_incomplete");

    let result = coordinator.revalidate();
    assert_eq!(
        reason(&result),
        &ReadinessError::ConfigurationIncomplete {
            missing: vec!["interpreter".into(), "tool".into()],
            invalid: vec![],
        }
    );
}

#[test]
fn old_tool_build_is_version_too_old() {
    let coordinator = ReadinessCoordinator::new(requirements(&[])).unwrap();
    coordinator.update("interpreter", interpreter(CapabilityStatus::Present));
    let result = coordinator.update("tool", PrerequisiteSnapshot::versioned("20180101"));

    let ReadinessError::VersionTooOld { shortfalls } = reason(&result) else {
        panic!("Expected VersionTooOld, got {}", result);
    };
    assert_eq!(shortfalls.len(), 1);
    assert_eq!(shortfalls[0].prerequisite.as_str(), "tool");
    assert_eq!(shortfalls[0].minimum, "20180924");
    assert_eq!(shortfalls[0].found.as_deref(), Some("20180101"));
}

#[test]
fn absent_module_is_capability_unavailable() {
    let coordinator = ReadinessCoordinator::new(requirements(&[])).unwrap();
    coordinator.update("tool", PrerequisiteSnapshot::versioned("20190101"));
    let result = coordinator.update("interpreter", interpreter(CapabilityStatus::Absent));

    let err = reason(&result);
    assert_eq!(err.kind(), "capability_unavailable");
    assert_eq!(err.violations(), vec!["numpy: Missing"]);
}

#[test]
fn asset_in_second_root_is_ready() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    fs::write(second.path().join("script.py"), "print('split')").unwrap();

    let coordinator =
        ReadinessCoordinator::new(requirements(&[first.path(), second.path()])).unwrap();
    coordinator.update("interpreter", interpreter(CapabilityStatus::Present));
    let result = coordinator.update("tool", PrerequisiteSnapshot::versioned("20180924"));

    let expected = second.path().join("script.py");
    assert_eq!(result, ReadinessResult::Ready { asset: expected.clone() });
    assert!(coordinator.is_ready());
    assert_eq!(coordinator.primary_asset(), Some(expected.clone()));
    let assets = coordinator.resolved_assets().unwrap();
    assert_eq!(
        assets.get(&ResourceId::from("script.py")),
        Some(expected.as_path())
    );
}

#[test]
fn asset_in_no_root_is_asset_missing() {
    let first = TempDir::new().unwrap();
    let coordinator = ReadinessCoordinator::new(requirements(&[first.path()])).unwrap();
    coordinator.update("interpreter", interpreter(CapabilityStatus::Present));
    let result = coordinator.update("tool", PrerequisiteSnapshot::versioned("20180924"));

    assert_eq!(
        reason(&result),
        &ReadinessError::AssetMissing {
            missing: vec![ResourceId::from("script.py")],
        }
    );
    assert!(coordinator.primary_asset().is_none());
    assert!(coordinator.resolved_assets().is_none());
}

#[test]
fn installing_asset_then_revalidating_becomes_ready() {
    let root = TempDir::new().unwrap();
    let coordinator = ReadinessCoordinator::new(requirements(&[root.path()])).unwrap();
    coordinator.update("interpreter", interpreter(CapabilityStatus::Present));
    assert!(!coordinator
        .update("tool", PrerequisiteSnapshot::versioned("20180924"))
        .is_ready());

    fs::write(root.path().join("script.py"), "").unwrap();
    assert!(coordinator.revalidate().is_ready());
}

#[test]
fn duplicate_delivery_is_idempotent() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("script.py"), "").unwrap();
    let coordinator = ReadinessCoordinator::new(requirements(&[root.path()])).unwrap();
    coordinator.update("interpreter", interpreter(CapabilityStatus::Present));

    let before = coordinator.bus().published_count();
    let first = coordinator.update("tool", PrerequisiteSnapshot::versioned("20190101"));
    assert_eq!(coordinator.bus().published_count(), before + 1);
    let second = coordinator.update("tool", PrerequisiteSnapshot::versioned("20190101"));
    assert_eq!(coordinator.bus().published_count(), before + 2);

    assert_eq!(first, second);
    assert!(second.is_ready());
}

#[test]
fn absent_prerequisite_short_circuits_version_check() {
    let coordinator = ReadinessCoordinator::new(requirements(&[])).unwrap();
    // Far too old, but the tool has not reported at all.
    let result = coordinator.update("interpreter", PrerequisiteSnapshot::versioned("2.7.18"));

    assert_eq!(
        reason(&result),
        &ReadinessError::ConfigurationIncomplete {
            missing: vec!["tool".into()],
            invalid: vec![],
        }
    );
}

#[test]
fn removing_a_prerequisite_revokes_readiness() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("script.py"), "").unwrap();
    let coordinator = ReadinessCoordinator::new(requirements(&[root.path()])).unwrap();
    coordinator.update("interpreter", interpreter(CapabilityStatus::Present));
    assert!(coordinator
        .update("tool", PrerequisiteSnapshot::versioned("20190101"))
        .is_ready());

    let result = coordinator.remove(&"tool".into());
    assert_eq!(reason(&result).violations(), vec!["tool: not configured"]);
    assert!(!coordinator.is_ready());
    assert!(coordinator.snapshot(&"tool".into()).is_none());
}

#[test]
fn late_subscriber_receives_last_result_first() {
    let coordinator = ReadinessCoordinator::new(requirements(&[])).unwrap();
    coordinator.update("interpreter", interpreter(CapabilityStatus::Present));
    let published = coordinator.update("tool", PrerequisiteSnapshot::versioned("20180101"));

    let rx = coordinator.subscribe();
    let sticky = rx.try_recv().unwrap();
    assert_eq!(sticky.sequence, 2);
    assert_eq!(sticky.result, published);

    let next = coordinator.update("tool", PrerequisiteSnapshot::versioned("20180101").invalid());
    let event = rx.try_recv().unwrap();
    assert_eq!(event.sequence, 3);
    assert_eq!(event.result, next);
    assert!(rx.try_recv().is_err());
}

#[test]
fn concurrent_updates_settle_on_latest_snapshots() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("script.py"), "").unwrap();
    let coordinator = Arc::new(ReadinessCoordinator::new(requirements(&[root.path()])).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || {
                for _ in 0..25 {
                    if i % 2 == 0 {
                        coordinator.update("interpreter", interpreter(CapabilityStatus::Present));
                    } else {
                        coordinator.update("tool", PrerequisiteSnapshot::versioned("20190101"));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(coordinator.bus().published_count(), 200);
    assert!(coordinator.is_ready());
    assert_eq!(coordinator.last_event().unwrap().sequence, 200);
}

#[test]
fn concurrent_passes_never_interleave() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("script.py"), "").unwrap();

    let in_flight = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let probe = {
        let in_flight = Arc::clone(&in_flight);
        let overlaps = Arc::clone(&overlaps);
        move |_: &str| {
            if in_flight.swap(true, Ordering::SeqCst) {
                overlaps.fetch_add(1, Ordering::SeqCst);
            }
            thread::yield_now();
            in_flight.store(false, Ordering::SeqCst);
            CapabilityStatus::Present
        }
    };

    let coordinator = Arc::new(
        ReadinessCoordinator::builder(requirements(&[root.path()]))
            .probe(Arc::new(probe))
            .build()
            .unwrap(),
    );
    coordinator.update("interpreter", PrerequisiteSnapshot::versioned("3.9.0"));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || {
                for _ in 0..50 {
                    coordinator.update("tool", PrerequisiteSnapshot::versioned("20190101"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert!(coordinator.is_ready());
}

#[test]
fn not_ready_while_a_pass_is_in_flight() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("script.py"), "").unwrap();

    // When armed, the next capability lookup signals entry, waits for
    // release, then reports the module missing.
    type Gate = Arc<Mutex<Option<(Sender<()>, Receiver<()>)>>>;
    let gate: Gate = Arc::new(Mutex::new(None));
    let capabilities = {
        let gate = Arc::clone(&gate);
        move |_: &str| {
            let armed = gate.lock().unwrap().take();
            match armed {
                Some((entered, release)) => {
                    entered.send(()).unwrap();
                    release.recv().unwrap();
                    CapabilityStatus::Absent
                }
                None => CapabilityStatus::Present,
            }
        }
    };

    let coordinator = Arc::new(
        ReadinessCoordinator::builder(requirements(&[root.path()]))
            .probe(Arc::new(capabilities))
            .build()
            .unwrap(),
    );
    coordinator.update("interpreter", PrerequisiteSnapshot::versioned("3.9.0"));
    coordinator.update("tool", PrerequisiteSnapshot::versioned("20190101"));
    assert!(coordinator.is_ready());
    let asset = root.path().join("script.py");
    assert_eq!(coordinator.primary_asset(), Some(asset));

    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    *gate.lock().unwrap() = Some((entered_tx, release_rx));

    let worker = {
        let coordinator = Arc::clone(&coordinator);
        thread::spawn(move || {
            coordinator.update("interpreter", PrerequisiteSnapshot::versioned("3.9.1"))
        })
    };

    entered_rx.recv().unwrap();
    assert!(!coordinator.is_ready());
    assert!(coordinator.primary_asset().is_none());

    release_tx.send(()).unwrap();
    let result = worker.join().unwrap();
    assert_eq!(reason(&result).violations(), vec!["numpy: Missing"]);
    assert!(!coordinator.is_ready());
    assert!(coordinator.primary_asset().is_none());
    assert_eq!(coordinator.last_result(), result);
}

#[test]
fn later_snapshot_replaces_earlier_one() {
    let coordinator = ReadinessCoordinator::new(requirements(&[])).unwrap();
    coordinator.update("interpreter", interpreter(CapabilityStatus::Present));
    coordinator.update("tool", PrerequisiteSnapshot::versioned("20180101"));
    let result = coordinator.update("tool", PrerequisiteSnapshot::versioned("20190101"));

    // Versions now pass; the pass moves on to assets.
    assert_eq!(reason(&result).kind(), "asset_missing");
    assert_eq!(
        coordinator.snapshot(&"tool".into()).unwrap().version(),
        Some("20190101")
    );
}
