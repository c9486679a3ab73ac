//! The MRVC object model.
//!
//! Four object kinds live in the content-addressed store: blobs (raw file
//! bytes, no struct needed), trees, commits, and super-commits. Field order
//! in these structs is the canonical wire order; the codec hashes the exact
//! serialized bytes, so reordering a field changes every downstream hash.

use serde::{Deserialize, Serialize};

/// Repository metadata, written once at init (`.mrvc/metadata.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metadata {
    /// Declared repository name.
    pub name: String,
    /// Repository author.
    pub author: String,
    /// Creation time as a decimal string of Unix epoch milliseconds.
    pub created_at: String,
}

/// Whether a tree entry points at a blob or a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Blob,
    Tree,
}

/// A single directory entry inside a tree object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeEntry {
    /// Entry basename. Never contains slashes.
    pub name: String,
    pub entry_type: EntryType,
    /// Hex hash of the child object.
    pub hash: String,
}

/// A tree object: the entries of one directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeObject {
    pub entries: Vec<TreeEntry>,
}

impl TreeObject {
    /// Insert an entry, replacing any prior entry with the same
    /// `(name, entry_type)` pair.
    pub fn add_or_replace(&mut self, entry: TreeEntry) {
        for existing in &mut self.entries {
            if existing.name == entry.name && existing.entry_type == entry.entry_type {
                *existing = entry;
                return;
            }
        }
        self.entries.push(entry);
    }
}

/// A commit object: one root tree plus an optional parent commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitObject {
    /// Hex hash of the root tree.
    pub tree: String,
    /// Hex hash of the parent commit, empty for the first commit.
    pub parent: String,
    pub message: String,
    pub author: String,
    /// Decimal string of Unix epoch milliseconds.
    pub timestamp: String,
}

/// Which head of a child repository a super-commit captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildRefKind {
    /// The child's HEAD_SUPER.
    Super,
    /// The child's HEAD. The child had no super-commit of its own.
    Commit,
}

/// A child repository reference embedded in a super-commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChildRef {
    /// Slash path of the child, relative to the parent root.
    pub path: String,
    /// The child's declared repository name.
    #[serde(rename = "repoName")]
    pub repo_name: String,
    /// The captured head hash: HEAD_SUPER when present, else HEAD.
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "type")]
    pub kind: ChildRefKind,
}

/// A super-commit object: this repo's current commit plus the head of every
/// linked child, in manifest order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuperCommitObject {
    /// Hex hash of this repository's commit at super-commit time.
    pub self_head: String,
    pub children: Vec<ChildRef>,
    pub message: String,
    pub author: String,
    /// Decimal string of Unix epoch milliseconds.
    pub timestamp: String,
}
