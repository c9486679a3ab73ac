//! Linked-children manifest (`.mrvc/children.json`).
//!
//! The manifest records which child repositories are linked beneath this
//! one. Insertion order is preserved and is the order children are embedded
//! in super-commits.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MrvcError, MrvcResult};
use crate::fsutil;

/// One linked child repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChildEntry {
    /// Slash path relative to the parent root.
    pub path: String,
    /// The child's declared repository name.
    #[serde(rename = "repoName")]
    pub repo_name: String,
}

/// The ordered children manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChildrenFile {
    pub children: Vec<ChildEntry>,
}

impl ChildrenFile {
    /// Load the manifest, or return an empty one when the file is absent.
    pub fn load(path: &Path) -> MrvcResult<Self> {
        if !fsutil::file_exists(path) {
            return Ok(Self::default());
        }
        fsutil::read_json(path)
    }

    /// Save the manifest atomically.
    pub fn save(&self, path: &Path) -> MrvcResult<()> {
        fsutil::write_json(path, self)
    }

    /// Append a child, enforcing uniqueness of both path and name.
    pub fn insert(&mut self, path: String, repo_name: String) -> MrvcResult<()> {
        if self.children.iter().any(|c| c.path == path) {
            return Err(MrvcError::AlreadyLinked(path));
        }
        if self.children.iter().any(|c| c.repo_name == repo_name) {
            return Err(MrvcError::NameConflict(repo_name));
        }
        self.children.push(ChildEntry { path, repo_name });
        Ok(())
    }
}
