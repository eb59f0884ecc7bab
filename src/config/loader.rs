//! Requirement file loading.
//!
//! Relative search roots in a requirements file are relative to the file's
//! own directory, so a feature definition can ship next to its assets.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::schema::FeatureRequirements;
use crate::error::{PreflightError, Result};

/// Load, anchor and validate a requirements file.
pub fn load_requirements(path: &Path) -> Result<FeatureRequirements> {
    if !path.exists() {
        return Err(PreflightError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    let mut requirements = parse_requirements(&content, path)?;

    if let Some(base) = path.parent() {
        anchor_search_roots(&mut requirements, base);
    }

    requirements.validate()?;
    debug!(
        "Loaded requirements for '{}' from {} ({} prerequisites, {} capabilities, {} resources)",
        requirements.feature,
        path.display(),
        requirements.prerequisites.len(),
        requirements.capabilities.len(),
        requirements.resources.len()
    );
    Ok(requirements)
}

/// Parse YAML content. `path` is only used for error reporting.
pub fn parse_requirements(content: &str, path: &Path) -> Result<FeatureRequirements> {
    serde_yaml::from_str(content).map_err(|e| PreflightError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Make relative search roots relative to `base`.
pub fn anchor_search_roots(requirements: &mut FeatureRequirements, base: &Path) {
    for root in &mut requirements.search_roots {
        if root.is_relative() {
            *root = base.join(&*root);
        }
    }
}
