//! Canonical serialization of store objects.
//!
//! Object hashes are computed over the exact bytes produced here: the
//! serde_json pretty encoding (two-space indent, UTF-8, struct declaration
//! field order, no trailing newline). Any change to field order or
//! formatting changes every downstream hash.

use serde::Serialize;

use crate::error::MrvcResult;
use crate::hash::hash_bytes;
use crate::model::{CommitObject, SuperCommitObject, TreeObject};

/// Encode a tree and return its content address and canonical bytes.
///
/// Entries are sorted by name ascending before encoding, so the caller's
/// insertion order never reaches the wire.
pub fn encode_tree(tree: &TreeObject) -> MrvcResult<(String, Vec<u8>)> {
    let mut sorted = tree.clone();
    sorted.entries.sort_by(|a, b| a.name.cmp(&b.name));
    encode(&sorted)
}

/// Encode a commit and return its content address and canonical bytes.
pub fn encode_commit(commit: &CommitObject) -> MrvcResult<(String, Vec<u8>)> {
    encode(commit)
}

/// Encode a super-commit and return its content address and canonical bytes.
pub fn encode_supercommit(sc: &SuperCommitObject) -> MrvcResult<(String, Vec<u8>)> {
    encode(sc)
}

fn encode<T: Serialize>(value: &T) -> MrvcResult<(String, Vec<u8>)> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let hash = hash_bytes(&bytes);
    Ok((hash, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChildRef, ChildRefKind, EntryType, TreeEntry};

    fn entry(name: &str, entry_type: EntryType, hash: &str) -> TreeEntry {
        TreeEntry {
            name: name.to_string(),
            entry_type,
            hash: hash.to_string(),
        }
    }

    #[test]
    fn test_encode_tree_sorts_entries() {
        let tree = TreeObject {
            entries: vec![
                entry("z.txt", EntryType::Blob, "h1"),
                entry("a.txt", EntryType::Blob, "h2"),
            ],
        };
        let (_, bytes) = encode_tree(&tree).unwrap();
        let reparsed: TreeObject = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(reparsed.entries[0].name, "a.txt");
        assert_eq!(reparsed.entries[1].name, "z.txt");
    }

    #[test]
    fn test_encode_tree_order_independent() {
        let forward = TreeObject {
            entries: vec![
                entry("a.txt", EntryType::Blob, "h1"),
                entry("b.txt", EntryType::Blob, "h2"),
            ],
        };
        let reversed = TreeObject {
            entries: vec![
                entry("b.txt", EntryType::Blob, "h2"),
                entry("a.txt", EntryType::Blob, "h1"),
            ],
        };
        let (h1, _) = encode_tree(&forward).unwrap();
        let (h2, _) = encode_tree(&reversed).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_encode_commit_deterministic() {
        let commit = CommitObject {
            tree: "t".repeat(64),
            parent: String::new(),
            message: "m".to_string(),
            author: "a".to_string(),
            timestamp: "1700000000000".to_string(),
        };
        let (h1, b1) = encode_commit(&commit).unwrap();
        let (h2, b2) = encode_commit(&commit).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(b1, b2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_commit_bytes_are_pretty_json_in_field_order() {
        let commit = CommitObject {
            tree: "aa".to_string(),
            parent: String::new(),
            message: "msg".to_string(),
            author: "alice".to_string(),
            timestamp: "0".to_string(),
        };
        let (_, bytes) = encode_commit(&commit).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("{\n  \"tree\""));
        let tree_pos = text.find("\"tree\"").unwrap();
        let parent_pos = text.find("\"parent\"").unwrap();
        let message_pos = text.find("\"message\"").unwrap();
        assert!(tree_pos < parent_pos && parent_pos < message_pos);
        // The empty parent is serialized, not omitted.
        assert!(text.contains("\"parent\": \"\""));
    }

    #[test]
    fn test_encode_supercommit_wire_form() {
        let sc = SuperCommitObject {
            self_head: "s".repeat(64),
            children: vec![ChildRef {
                path: "libs/child".to_string(),
                repo_name: "child".to_string(),
                reference: "r".repeat(64),
                kind: ChildRefKind::Super,
            }],
            message: "snapshot".to_string(),
            author: "alice".to_string(),
            timestamp: "1700000000000".to_string(),
        };
        let (hash, bytes) = encode_supercommit(&sc).unwrap();
        assert_eq!(hash, hash_bytes(&bytes));
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("{\n  \"self_head\""));
        assert!(text.contains("\"repoName\": \"child\""));
        assert!(text.contains("\"type\": \"super\""));
    }
}
