//! Bottom-up tree construction.
//!
//! Turns a flat list of working-tree file paths into a forest of tree
//! objects, one per directory. Directories are hashed deepest-first so that
//! every parent body references fully formed child hashes; the result is
//! deterministic regardless of input order.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::codec::encode_tree;
use crate::error::{MrvcError, MrvcResult};
use crate::hash::hash_file;
use crate::model::{EntryType, TreeEntry, TreeObject};
use crate::object::ObjectStore;

/// Build and store blob and tree objects for every directory containing
/// `files`, plus all intermediate directories up to `repo_root`.
///
/// `files` are absolute normalized slash paths under `repo_root`. Returns
/// the `directory -> tree_hash` map; the root's entry is always present,
/// an empty tree when `files` is empty.
pub fn build_trees(
    store: &ObjectStore,
    repo_root: &str,
    files: &[String],
) -> MrvcResult<BTreeMap<String, String>> {
    let mut trees: BTreeMap<String, TreeObject> = BTreeMap::new();
    let mut children: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    trees.entry(repo_root.to_string()).or_default();

    for file in files {
        let blob_hash = hash_file(Path::new(file))?;
        store.save_file(&blob_hash, Path::new(file))?;

        let dir = parent_dir(file, repo_root);
        trees
            .entry(dir.clone())
            .or_default()
            .add_or_replace(TreeEntry {
                name: basename(file).to_string(),
                entry_type: EntryType::Blob,
                hash: blob_hash,
            });

        // Walk the parent closure up to the root so every intermediate
        // directory gets a tree.
        let mut current = dir;
        while current != repo_root {
            let parent = parent_dir(&current, repo_root);
            trees.entry(parent.clone()).or_default();
            children
                .entry(parent.clone())
                .or_default()
                .insert(current.clone());
            if parent == current {
                break;
            }
            current = parent;
        }
    }

    // Deepest directories first: a child always has more separators than
    // its parent, so its hash exists by the time the parent is encoded.
    let mut dirs: Vec<String> = trees.keys().cloned().collect();
    dirs.sort_by_key(|d| Reverse(d.matches('/').count()));

    let mut hashes: BTreeMap<String, String> = BTreeMap::new();
    for dir in dirs {
        let mut tree = trees.remove(&dir).unwrap_or_default();
        if let Some(subdirs) = children.get(&dir) {
            for child in subdirs {
                let child_hash = hashes
                    .get(child)
                    .cloned()
                    .ok_or_else(|| MrvcError::ObjectNotFound(child.clone()))?;
                tree.add_or_replace(TreeEntry {
                    name: basename(child).to_string(),
                    entry_type: EntryType::Tree,
                    hash: child_hash,
                });
            }
        }
        let (hash, bytes) = encode_tree(&tree)?;
        store.save(&hash, &bytes)?;
        hashes.insert(dir, hash);
    }

    Ok(hashes)
}

/// The containing directory of a slash path, clamped to `repo_root`.
fn parent_dir(path: &str, repo_root: &str) -> String {
    match path.rfind('/') {
        Some(idx) if idx > 0 => {
            let parent = &path[..idx];
            if parent.len() < repo_root.len() {
                repo_root.to_string()
            } else {
                parent.to_string()
            }
        }
        _ => repo_root.to_string(),
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn setup(dir: &Path) -> (ObjectStore, String) {
        let store = ObjectStore::new(&dir.join("objects"));
        let root = crate::fsutil::normalize_path(dir);
        (store, root)
    }

    fn write_file(root: &Path, rel: &str, content: &str) -> String {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        crate::fsutil::normalize_path(&path)
    }

    fn load_tree(store: &ObjectStore, hash: &str) -> TreeObject {
        serde_json::from_slice(&store.load(hash).unwrap()).unwrap()
    }

    #[test]
    fn test_single_file_at_root() {
        let dir = tempdir().unwrap();
        let (store, root) = setup(dir.path());
        let file = write_file(dir.path(), "a.txt", "hi\n");

        let hashes = build_trees(&store, &root, &[file]).unwrap();
        assert_eq!(hashes.len(), 1);

        let tree = load_tree(&store, &hashes[&root]);
        assert_eq!(tree.entries.len(), 1);
        assert_eq!(tree.entries[0].name, "a.txt");
        assert_eq!(tree.entries[0].entry_type, EntryType::Blob);
        assert_eq!(
            tree.entries[0].hash,
            "98ea6e4f216f2fb4b69fff9b3a44842c38686ca685f3f55dc48c5d3fb1107be4"
        );
    }

    #[test]
    fn test_nested_path_builds_intermediate_trees() {
        let dir = tempdir().unwrap();
        let (store, root) = setup(dir.path());
        let file = write_file(dir.path(), "x/y/z.txt", "k");

        let hashes = build_trees(&store, &root, &[file]).unwrap();
        assert_eq!(hashes.len(), 3);

        let root_tree = load_tree(&store, &hashes[&root]);
        assert_eq!(root_tree.entries.len(), 1);
        assert_eq!(root_tree.entries[0].name, "x");
        assert_eq!(root_tree.entries[0].entry_type, EntryType::Tree);
        assert_eq!(root_tree.entries[0].hash, hashes[&format!("{root}/x")]);

        let x_tree = load_tree(&store, &hashes[&format!("{root}/x")]);
        assert_eq!(x_tree.entries.len(), 1);
        assert_eq!(x_tree.entries[0].name, "y");
        assert_eq!(x_tree.entries[0].entry_type, EntryType::Tree);

        let y_tree = load_tree(&store, &hashes[&format!("{root}/x/y")]);
        assert_eq!(y_tree.entries[0].name, "z.txt");
        assert_eq!(y_tree.entries[0].entry_type, EntryType::Blob);
    }

    #[test]
    fn test_input_order_independent() {
        let dir = tempdir().unwrap();
        let (store, root) = setup(dir.path());
        let a = write_file(dir.path(), "sub/a.txt", "aaa");
        let b = write_file(dir.path(), "sub/b.txt", "bbb");
        let c = write_file(dir.path(), "top.txt", "ccc");

        let forward = build_trees(&store, &root, &[a.clone(), b.clone(), c.clone()]).unwrap();
        let reversed = build_trees(&store, &root, &[c, b, a]).unwrap();
        assert_eq!(forward[&root], reversed[&root]);
    }

    #[test]
    fn test_duplicate_file_entry_replaced() {
        let dir = tempdir().unwrap();
        let (store, root) = setup(dir.path());
        let file = write_file(dir.path(), "a.txt", "v1");

        let hashes = build_trees(&store, &root, &[file.clone(), file]).unwrap();
        let tree = load_tree(&store, &hashes[&root]);
        assert_eq!(tree.entries.len(), 1);
    }

    #[test]
    fn test_empty_input_yields_empty_root_tree() {
        let dir = tempdir().unwrap();
        let (store, root) = setup(dir.path());

        let hashes = build_trees(&store, &root, &[]).unwrap();
        assert_eq!(hashes.len(), 1);

        let tree = load_tree(&store, &hashes[&root]);
        assert!(tree.entries.is_empty());
    }

    #[test]
    fn test_entries_sorted_by_name() {
        let dir = tempdir().unwrap();
        let (store, root) = setup(dir.path());
        let z = write_file(dir.path(), "z.txt", "z");
        let a = write_file(dir.path(), "a.txt", "a");
        let sub = write_file(dir.path(), "m/n.txt", "n");

        let hashes = build_trees(&store, &root, &[z, sub, a]).unwrap();
        let tree = load_tree(&store, &hashes[&root]);
        let names: Vec<&str> = tree.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "m", "z.txt"]);
    }
}
