//! Resource resolution against ordered search roots.
//!
//! For each required resource, roots are tried in order and the first match
//! wins. The final path component matches case-insensitively, with
//! Unicode case folding; directory components must match exactly. Absent files and unreadable directories
//! are ordinary outcomes, never errors.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Logical name of a bundled resource, relative to a search root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    /// Create an id. Leading separators are dropped so `/tools/x.py` and
    /// `tools/x.py` name the same resource.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim_start_matches(['/', '\\']);
        if trimmed.len() == id.len() {
            Self(id)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// The id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id as a relative path.
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

/// Every required resource, resolved, in the order they were required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAssets {
    entries: Vec<(ResourceId, PathBuf)>,
}

impl ResolvedAssets {
    /// Location of `id`, if it was required.
    pub fn get(&self, id: &ResourceId) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(resolved, _)| resolved == id)
            .map(|(_, path)| path.as_path())
    }

    /// Location of the first required resource.
    pub fn primary(&self) -> Option<&Path> {
        self.entries.first().map(|(_, path)| path.as_path())
    }

    /// Iterate id/location pairs in required order.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, &Path)> {
        self.entries.iter().map(|(id, path)| (id, path.as_path()))
    }

    /// Number of resolved resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was required.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resources that could not be found in any search root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAssets {
    missing: Vec<ResourceId>,
    searched: Vec<PathBuf>,
}

impl MissingAssets {
    /// Every unresolved id, in required order.
    pub fn missing(&self) -> &[ResourceId] {
        &self.missing
    }

    /// Every candidate location that was tried for the unresolved ids.
    pub fn searched(&self) -> &[PathBuf] {
        &self.searched
    }
}

impl fmt::Display for MissingAssets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.missing.iter().map(ResourceId::as_str).collect();
        write!(f, "Missing assets: {}", names.join("; "))
    }
}

/// Resolve every id in `required` against `roots`.
///
/// Reports all unresolved ids at once rather than stopping at the first.
pub fn resolve(required: &[ResourceId], roots: &[PathBuf]) -> Result<ResolvedAssets, MissingAssets> {
    let mut entries = Vec::with_capacity(required.len());
    let mut missing = Vec::new();
    let mut searched = Vec::new();

    for id in required {
        match roots.iter().find_map(|root| locate(root, id)) {
            Some(path) => entries.push((id.clone(), path)),
            None => {
                missing.push(id.clone());
                searched.extend(roots.iter().map(|root| root.join(id.as_path())));
            }
        }
    }

    if missing.is_empty() {
        Ok(ResolvedAssets { entries })
    } else {
        Err(MissingAssets { missing, searched })
    }
}

/// Find `id` under `root`, matching the file name case-insensitively.
fn locate(root: &Path, id: &ResourceId) -> Option<PathBuf> {
    let candidate = root.join(id.as_path());
    if candidate.is_file() {
        return Some(candidate);
    }

    let wanted = candidate.file_name()?.to_string_lossy().to_lowercase();
    let dir = candidate.parent()?;
    let entries = fs::read_dir(dir).ok()?;

    // Several names may differ only in case on case-sensitive filesystems;
    // take the lexicographically first for a stable answer.
    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().to_lowercase() == wanted)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    matches.sort();
    matches.into_iter().next()
}
