//! Sticky fan-out of readiness results.
//!
//! The bus remembers the last published event and hands it to anyone who
//! asks, including subscribers that join after it was published. Each
//! subscriber gets its own channel; a subscriber that drops its receiver is
//! pruned on the next publish.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use super::result::{ReadinessEvent, ReadinessResult};

#[derive(Debug, Default)]
struct BusState {
    last: Option<ReadinessEvent>,
    published: u64,
    subscribers: Vec<Sender<ReadinessEvent>>,
}

/// Last-value cache plus fan-out channel for readiness events.
#[derive(Debug, Default)]
pub struct ReadinessBus {
    state: Mutex<BusState>,
}

impl ReadinessBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        // Every write replaces whole values, so a poisoned guard still
        // holds a consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish `result`, returning the event as delivered.
    pub fn publish(&self, result: ReadinessResult) -> ReadinessEvent {
        let mut state = self.lock();
        state.published += 1;
        let event = ReadinessEvent {
            sequence: state.published,
            result,
            evaluated_at: Utc::now(),
        };
        state
            .subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
        state.last = Some(event.clone());
        event
    }

    /// The most recently published event.
    pub fn latest(&self) -> Option<ReadinessEvent> {
        self.lock().last.clone()
    }

    /// Subscribe to future events.
    ///
    /// If anything has been published, the receiver starts with the latest
    /// event.
    pub fn subscribe(&self) -> Receiver<ReadinessEvent> {
        let (tx, rx) = mpsc::channel();
        let mut state = self.lock();
        if let Some(last) = &state.last {
            // The receiver is alive in this scope, so the send cannot fail.
            let _ = tx.send(last.clone());
        }
        state.subscribers.push(tx);
        rx
    }

    /// Total number of events published.
    pub fn published_count(&self) -> u64 {
        self.lock().published
    }

    /// Number of live subscribers as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::result::ReadinessError;
    use std::path::PathBuf;

    fn ready(path: &str) -> ReadinessResult {
        ReadinessResult::Ready {
            asset: PathBuf::from(path),
        }
    }

    fn not_ready() -> ReadinessResult {
        ReadinessResult::NotReady {
            reason: ReadinessError::ConfigurationIncomplete {
                missing: vec!["python".into()],
                invalid: vec![],
            },
        }
    }

    #[test]
    fn empty_bus_has_no_latest() {
        let bus = ReadinessBus::new();
        assert!(bus.latest().is_none());
        assert_eq!(bus.published_count(), 0);
    }

    #[test]
    fn publish_assigns_increasing_sequence() {
        let bus = ReadinessBus::new();
        assert_eq!(bus.publish(not_ready()).sequence, 1);
        assert_eq!(bus.publish(ready("/a")).sequence, 2);
        assert_eq!(bus.latest().unwrap().sequence, 2);
        assert!(bus.latest().unwrap().result.is_ready());
    }

    #[test]
    fn subscribers_receive_every_publish_in_order() {
        let bus = ReadinessBus::new();
        let rx = bus.subscribe();
        bus.publish(not_ready());
        bus.publish(ready("/a"));

        let received: Vec<u64> = rx.try_iter().map(|e| e.sequence).collect();
        assert_eq!(received, vec![1, 2]);
    }

    #[test]
    fn late_subscriber_gets_last_value_first() {
        let bus = ReadinessBus::new();
        bus.publish(not_ready());
        bus.publish(ready("/a"));

        let rx = bus.subscribe();
        let first = rx.try_recv().unwrap();
        assert_eq!(first.sequence, 2);
        assert!(rx.try_recv().is_err());

        bus.publish(not_ready());
        assert_eq!(rx.try_recv().unwrap().sequence, 3);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = ReadinessBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(not_ready());
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.try_recv().unwrap().sequence, 1);
    }
}
