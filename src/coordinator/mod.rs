//! Readiness coordination.
//!
//! This module turns a stream of independent prerequisite reports into one
//! consistent go/no-go decision per report.
//!
//! # Modules
//!
//! - [`readiness`] - The coordinator and its reconciliation state machine
//! - [`checks`] - The ordered checks of a reconciliation pass
//! - [`result`] - Results, events and the diagnostic taxonomy
//! - [`bus`] - Sticky fan-out of published results

pub mod bus;
pub mod checks;
pub mod readiness;
pub mod result;

pub use bus::ReadinessBus;
pub use readiness::{Phase, ReadinessCoordinator, ReadinessCoordinatorBuilder};
pub use result::{ReadinessError, ReadinessEvent, ReadinessResult, VersionShortfall};
