//! Working-tree and super-commit status.
//!
//! Status is a pure read with two sections: the working tree compared
//! against the HEAD commit, and the last super-commit's children
//! re-validated against what is currently on disk.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::MrvcResult;
use crate::model::{ChildRefKind, EntryType, TreeObject};
use crate::object::ObjectStore;

/// Section A: the working tree compared against the HEAD commit.
#[derive(Debug, Clone, Serialize)]
pub enum CommitStatus {
    /// No commits exist yet.
    NoCommits,
    /// Working tree matches HEAD exactly.
    Clean,
    /// Labelled change groups, each sorted by path.
    Changes {
        modified: Vec<String>,
        deleted: Vec<String>,
        untracked: Vec<String>,
    },
}

impl CommitStatus {
    pub fn render(&self) -> String {
        match self {
            CommitStatus::NoCommits => "No commits yet.".to_string(),
            CommitStatus::Clean => "clean".to_string(),
            CommitStatus::Changes {
                modified,
                deleted,
                untracked,
            } => {
                let groups = [
                    ("Modified", modified),
                    ("Deleted", deleted),
                    ("Untracked", untracked),
                ];
                let mut out = String::new();
                for (label, paths) in groups {
                    if paths.is_empty() {
                        continue;
                    }
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(label);
                    out.push_str(":\n");
                    for path in paths {
                        out.push_str("  ");
                        out.push_str(path);
                        out.push('\n');
                    }
                }
                out
            }
        }
    }
}

/// One child's cross-check result in Section B.
#[derive(Debug, Clone, Serialize)]
pub struct ChildCheck {
    pub path: String,
    pub repo_name: String,
    /// The head hash recorded by the super-commit.
    pub reference: String,
    pub kind: ChildRefKind,
    /// Why validation failed, when it did.
    pub problem: Option<String>,
}

impl ChildCheck {
    pub fn is_ok(&self) -> bool {
        self.problem.is_none()
    }
}

/// Section B: the last super-commit's children validated against disk.
#[derive(Debug, Clone, Serialize)]
pub enum SuperStatus {
    /// No super-commits exist yet.
    NoSuperCommits,
    /// Per-child validation results, in super-commit order.
    Children {
        super_hash: String,
        checks: Vec<ChildCheck>,
    },
}

impl SuperStatus {
    pub fn render(&self) -> String {
        match self {
            SuperStatus::NoSuperCommits => "No super commits yet.".to_string(),
            SuperStatus::Children { super_hash, checks } => {
                let mut out = format!("Super commit {}:\n", &super_hash[..12]);
                for check in checks {
                    let line = match &check.problem {
                        Some(problem) => format!(
                            "  ✗ {} ({}): {problem}\n",
                            check.path, check.repo_name
                        ),
                        None => {
                            let kind = match check.kind {
                                ChildRefKind::Super => "super",
                                ChildRefKind::Commit => "commit",
                            };
                            let mut line = format!(
                                "  ✓ {} ({}) {kind} {}\n",
                                check.path,
                                check.repo_name,
                                &check.reference[..12]
                            );
                            if check.kind == ChildRefKind::Commit {
                                line.pop();
                                line.push_str(" (warning: child has no super-commit)\n");
                            }
                            line
                        }
                    };
                    out.push_str(&line);
                }
                out
            }
        }
    }
}

/// The full two-section status report.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub commit: CommitStatus,
    pub super_commit: SuperStatus,
}

impl StatusReport {
    /// Render both sections for terminal output.
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.commit.render(), self.super_commit.render())
    }
}

/// Flatten a stored tree into `relative_path -> blob_hash` via preorder
/// traversal.
pub fn flatten_tree(
    store: &ObjectStore,
    tree_hash: &str,
    prefix: &str,
    out: &mut BTreeMap<String, String>,
) -> MrvcResult<()> {
    let tree: TreeObject = serde_json::from_slice(&store.load(tree_hash)?)?;
    for entry in &tree.entries {
        let path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{prefix}/{}", entry.name)
        };
        match entry.entry_type {
            EntryType::Blob => {
                out.insert(path, entry.hash.clone());
            }
            EntryType::Tree => flatten_tree(store, &entry.hash, &path, out)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_tree;
    use crate::model::TreeEntry;
    use tempfile::tempdir;

    #[test]
    fn test_render_no_commits() {
        assert_eq!(CommitStatus::NoCommits.render(), "No commits yet.");
    }

    #[test]
    fn test_render_clean() {
        assert_eq!(CommitStatus::Clean.render(), "clean");
    }

    #[test]
    fn test_render_single_group_exact() {
        let status = CommitStatus::Changes {
            modified: vec!["a.txt".to_string()],
            deleted: vec![],
            untracked: vec![],
        };
        assert_eq!(status.render(), "Modified:\n  a.txt\n");
    }

    #[test]
    fn test_render_group_order() {
        let status = CommitStatus::Changes {
            modified: vec!["m.txt".to_string()],
            deleted: vec!["d.txt".to_string()],
            untracked: vec!["u.txt".to_string()],
        };
        assert_eq!(
            status.render(),
            "Modified:\n  m.txt\n\nDeleted:\n  d.txt\n\nUntracked:\n  u.txt\n"
        );
    }

    #[test]
    fn test_render_super_sections() {
        assert_eq!(
            SuperStatus::NoSuperCommits.render(),
            "No super commits yet."
        );

        let status = SuperStatus::Children {
            super_hash: "f".repeat(64),
            checks: vec![
                ChildCheck {
                    path: "libs/a".to_string(),
                    repo_name: "a".to_string(),
                    reference: "1".repeat(64),
                    kind: ChildRefKind::Super,
                    problem: None,
                },
                ChildCheck {
                    path: "libs/b".to_string(),
                    repo_name: "b".to_string(),
                    reference: "2".repeat(64),
                    kind: ChildRefKind::Commit,
                    problem: None,
                },
                ChildCheck {
                    path: "libs/c".to_string(),
                    repo_name: "c".to_string(),
                    reference: "3".repeat(64),
                    kind: ChildRefKind::Commit,
                    problem: Some("repository directory missing".to_string()),
                },
            ],
        };
        let text = status.render();
        assert!(text.contains("✓ libs/a (a) super"));
        assert!(text.contains("✓ libs/b (b) commit"));
        assert!(text.contains("warning: child has no super-commit"));
        assert!(text.contains("✗ libs/c (c): repository directory missing"));
    }

    #[test]
    fn test_flatten_tree_nested() {
        let dir = tempdir().unwrap();
        let store = ObjectStore::new(dir.path());

        let leaf = TreeObject {
            entries: vec![TreeEntry {
                name: "z.txt".to_string(),
                entry_type: EntryType::Blob,
                hash: "b".repeat(64),
            }],
        };
        let (leaf_hash, leaf_bytes) = encode_tree(&leaf).unwrap();
        store.save(&leaf_hash, &leaf_bytes).unwrap();

        let root = TreeObject {
            entries: vec![
                TreeEntry {
                    name: "a.txt".to_string(),
                    entry_type: EntryType::Blob,
                    hash: "a".repeat(64),
                },
                TreeEntry {
                    name: "sub".to_string(),
                    entry_type: EntryType::Tree,
                    hash: leaf_hash,
                },
            ],
        };
        let (root_hash, root_bytes) = encode_tree(&root).unwrap();
        store.save(&root_hash, &root_bytes).unwrap();

        let mut map = BTreeMap::new();
        flatten_tree(&store, &root_hash, "", &mut map).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map["a.txt"], "a".repeat(64));
        assert_eq!(map["sub/z.txt"], "b".repeat(64));
    }
}
