//! Bundled asset resolution.
//!
//! A feature ships resources (scripts, models, lookup tables) that must be
//! found on disk before it can run. Deployment decides where they may live
//! by supplying ordered search roots; this module only looks.
//!
//! # Modules
//!
//! - [`resolver`] - Resource ids and the first-match resolver

pub mod resolver;

pub use resolver::{resolve, MissingAssets, ResolvedAssets, ResourceId};
