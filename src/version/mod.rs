//! Version parsing and ordering.
//!
//! Prerequisites report versions in whatever form their tools print them:
//! dotted releases (`3.9.0`, `3.4-RC1`), date builds (`20180924`), or
//! either of those wrapped in prose (`Python 3.9.0`, `MSFragger-3.4`).
//! This module turns them into a single total order.
//!
//! # Modules
//!
//! - [`compare`] - The [`Version`] type and the total-order comparator
//! - [`extract`] - Pulling a version token out of free-form tool output

pub mod compare;
pub mod extract;

pub use compare::{compare, meets_minimum, Scheme, UnparsableVersion, Version};
pub use extract::extract_version;
