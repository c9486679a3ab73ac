//! Repository — the main entry point for MRVC operations.
//!
//! A Repository ties together the object store, tree builder, children
//! manifest, and status computation. HEAD and HEAD_SUPER are advanced last
//! in every mutating operation, after all referenced objects are persisted.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use log::info;

use crate::children::{ChildEntry, ChildrenFile};
use crate::codec::{encode_commit, encode_supercommit};
use crate::error::{MrvcError, MrvcResult};
use crate::fsutil::{self, WalkOptions, MRVC_DIR};
use crate::hash::hash_file;
use crate::lock::RepoLock;
use crate::model::{ChildRef, ChildRefKind, CommitObject, Metadata, SuperCommitObject};
use crate::object::ObjectStore;
use crate::status::{self, ChildCheck, CommitStatus, StatusReport, SuperStatus};
use crate::tree;

/// An MRVC repository rooted at the directory containing `.mrvc/`.
pub struct Repository {
    /// Root of the working directory (where `.mrvc/` lives).
    root: PathBuf,
    /// Path to the `.mrvc/` directory.
    mrvc_dir: PathBuf,
    /// Content-addressable object store.
    objects: ObjectStore,
}

impl Repository {
    /// Default lock timeout for mutating operations.
    const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

    /// Initialize a new MRVC repository in the given directory.
    ///
    /// Creates `.mrvc/` with its object store, an empty HEAD, and the
    /// repository metadata.
    pub fn init(root: &Path, name: &str, author: &str) -> MrvcResult<Self> {
        let mrvc_dir = root.join(MRVC_DIR);

        if mrvc_dir.exists() {
            return Err(MrvcError::AlreadyInitialized);
        }

        fs::create_dir_all(mrvc_dir.join("objects"))?;
        fs::write(mrvc_dir.join("HEAD"), "")?;

        let meta = Metadata {
            name: name.to_string(),
            author: author.to_string(),
            created_at: now_millis(),
        };
        fsutil::write_json(&mrvc_dir.join("metadata.json"), &meta)?;

        Self::open(root)
    }

    /// Open an existing MRVC repository.
    pub fn open(root: &Path) -> MrvcResult<Self> {
        let mrvc_dir = root.join(MRVC_DIR);

        if !fsutil::is_dir(&mrvc_dir) {
            return Err(MrvcError::NotARepository);
        }

        let objects = ObjectStore::new(&mrvc_dir.join("objects"));

        Ok(Self {
            root: root.to_path_buf(),
            mrvc_dir,
            objects,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Repository metadata as written at init.
    pub fn metadata(&self) -> MrvcResult<Metadata> {
        fsutil::read_json(&self.mrvc_dir.join("metadata.json"))
    }

    /// Current commit hash, empty when no commits exist.
    pub fn read_head(&self) -> MrvcResult<String> {
        read_pointer(&self.mrvc_dir.join("HEAD"))
    }

    /// Current super-commit hash, empty when none exists.
    pub fn read_head_super(&self) -> MrvcResult<String> {
        read_pointer(&self.mrvc_dir.join("HEAD_SUPER"))
    }

    fn lock(&self) -> MrvcResult<RepoLock> {
        RepoLock::acquire(&self.mrvc_dir, Self::LOCK_TIMEOUT)
    }

    /// Snapshot the given files as a new commit and advance HEAD.
    ///
    /// `["*"]` commits the whole working tree, honoring `.mrvcignore` and
    /// skipping nested repositories. Explicit paths must exist and resolve
    /// inside the repository root.
    pub fn commit(&self, message: &str, author: &str, files: &[String]) -> MrvcResult<String> {
        if files.is_empty() {
            return Err(MrvcError::NothingToCommit);
        }
        let _lock = self.lock()?;

        let root_norm = fsutil::normalize_path(&self.root);
        let files = if files.len() == 1 && files[0] == "*" {
            fsutil::list_files(&self.root, WalkOptions::full())?
        } else {
            let mut normalized = Vec::with_capacity(files.len());
            for f in files {
                let norm = fsutil::normalize_path(Path::new(f));
                if !fsutil::file_exists(Path::new(&norm)) {
                    return Err(MrvcError::MissingFile(norm));
                }
                if fsutil::relative_slash(&root_norm, &norm).is_none() {
                    return Err(MrvcError::OutsideRepository(norm));
                }
                normalized.push(norm);
            }
            normalized
        };

        let tree_hashes = tree::build_trees(&self.objects, &root_norm, &files)?;
        let root_tree = tree_hashes
            .get(&root_norm)
            .cloned()
            .ok_or_else(|| MrvcError::ObjectNotFound(root_norm.clone()))?;

        let commit = CommitObject {
            tree: root_tree,
            parent: self.read_head()?,
            message: message.to_string(),
            author: author.to_string(),
            timestamp: now_millis(),
        };
        let (hash, bytes) = encode_commit(&commit)?;
        self.objects.save(&hash, &bytes)?;

        // All objects are durable at this point; advancing HEAD is the
        // final, atomic step.
        fsutil::atomic_write(&self.mrvc_dir.join("HEAD"), hash.as_bytes())?;
        info!("commit created: {hash}");
        Ok(hash)
    }

    /// Compute the two-section status report. Pure read; mutates nothing.
    pub fn status(&self) -> MrvcResult<StatusReport> {
        Ok(StatusReport {
            commit: self.commit_status()?,
            super_commit: self.super_status()?,
        })
    }

    fn commit_status(&self) -> MrvcResult<CommitStatus> {
        let head = self.read_head()?;
        if head.is_empty() {
            return Ok(CommitStatus::NoCommits);
        }

        let commit: CommitObject = serde_json::from_slice(&self.objects.load(&head)?)?;
        let mut head_files = BTreeMap::new();
        status::flatten_tree(&self.objects, &commit.tree, "", &mut head_files)?;

        let root_norm = fsutil::normalize_path(&self.root);
        let working = fsutil::list_files(&self.root, WalkOptions::full())?;

        let mut modified = Vec::new();
        let mut untracked = Vec::new();
        let mut seen = BTreeSet::new();

        for abs in &working {
            let Some(rel) = fsutil::relative_slash(&root_norm, abs) else {
                continue;
            };
            seen.insert(rel.clone());

            match head_files.get(&rel) {
                None => untracked.push(rel),
                Some(head_hash) => {
                    let current = hash_file(Path::new(abs))?;
                    if &current != head_hash {
                        modified.push(rel);
                    }
                }
            }
        }

        let deleted: Vec<String> = head_files
            .keys()
            .filter(|path| !seen.contains(*path))
            .cloned()
            .collect();

        if modified.is_empty() && deleted.is_empty() && untracked.is_empty() {
            return Ok(CommitStatus::Clean);
        }

        modified.sort();
        untracked.sort();
        Ok(CommitStatus::Changes {
            modified,
            deleted,
            untracked,
        })
    }

    fn super_status(&self) -> MrvcResult<SuperStatus> {
        let head_super = self.read_head_super()?;
        if head_super.is_empty() {
            return Ok(SuperStatus::NoSuperCommits);
        }

        let sc: SuperCommitObject = serde_json::from_slice(&self.objects.load(&head_super)?)?;
        let checks = sc
            .children
            .iter()
            .map(|child| ChildCheck {
                path: child.path.clone(),
                repo_name: child.repo_name.clone(),
                reference: child.reference.clone(),
                kind: child.kind,
                problem: self.check_child(child).err().map(|e| e.to_string()),
            })
            .collect();

        Ok(SuperStatus::Children {
            super_hash: head_super,
            checks,
        })
    }

    /// Best-effort validation of one super-commit child against disk.
    fn check_child(&self, child: &ChildRef) -> MrvcResult<()> {
        let child_mrvc = self.root.join(&child.path).join(MRVC_DIR);
        if !fsutil::is_dir(&child_mrvc) {
            return Err(MrvcError::NotAChildRepository(child.path.clone()));
        }
        let meta: Metadata = fsutil::read_json(&child_mrvc.join("metadata.json"))?;
        if meta.name != child.repo_name {
            return Err(MrvcError::RepoIdentityMismatch {
                expected: child.repo_name.clone(),
                found: meta.name,
            });
        }
        let child_store = ObjectStore::new(&child_mrvc.join("objects"));
        if !child_store.exists(&child.reference) {
            return Err(MrvcError::ObjectNotFound(child.reference.clone()));
        }
        Ok(())
    }

    /// Link a child repository beneath this one.
    ///
    /// The child must be an initialized repository whose path resolves
    /// inside the parent root. Both the path and the child's declared name
    /// must be unique among linked children.
    pub fn link(&self, child_path: &str) -> MrvcResult<()> {
        if child_path.is_empty() {
            return Err(MrvcError::Other("child path cannot be empty".to_string()));
        }
        let _lock = self.lock()?;

        let child_abs = fsutil::normalize_path(Path::new(child_path));
        let child_mrvc = Path::new(&child_abs).join(MRVC_DIR);
        if !fsutil::is_dir(&child_mrvc) || !fsutil::file_exists(&child_mrvc.join("metadata.json")) {
            return Err(MrvcError::NotAChildRepository(child_abs));
        }
        let meta: Metadata = fsutil::read_json(&child_mrvc.join("metadata.json"))?;

        let root_norm = fsutil::normalize_path(&self.root);
        let child_rel = fsutil::relative_slash(&root_norm, &child_abs)
            .ok_or_else(|| MrvcError::PathEscapesParent(child_abs.clone()))?;
        if child_rel.is_empty() {
            return Err(MrvcError::Other(
                "cannot link a repository to itself".to_string(),
            ));
        }

        let children_path = self.mrvc_dir.join("children.json");
        let mut manifest = ChildrenFile::load(&children_path)?;
        manifest.insert(child_rel, meta.name)?;
        manifest.save(&children_path)
    }

    /// Record a coordinated snapshot of this repository and every linked
    /// child, and advance HEAD_SUPER.
    ///
    /// Any child failing validation aborts the whole operation before
    /// HEAD_SUPER is touched.
    pub fn super_commit(&self, message: &str, author: &str) -> MrvcResult<String> {
        let _lock = self.lock()?;

        let self_head = self.read_head()?;
        if self_head.is_empty() {
            return Err(MrvcError::SelfHasNoCommits);
        }

        let manifest = ChildrenFile::load(&self.mrvc_dir.join("children.json"))?;
        let mut children = Vec::with_capacity(manifest.children.len());
        for entry in &manifest.children {
            children.push(self.capture_child(entry)?);
        }

        let sc = SuperCommitObject {
            self_head,
            children,
            message: message.to_string(),
            author: author.to_string(),
            timestamp: now_millis(),
        };
        let (hash, bytes) = encode_supercommit(&sc)?;
        self.objects.save(&hash, &bytes)?;

        fsutil::atomic_write(&self.mrvc_dir.join("HEAD_SUPER"), hash.as_bytes())?;
        info!("super commit created: {hash}");
        Ok(hash)
    }

    /// Validate a linked child and capture its current head.
    ///
    /// Prefers the child's HEAD_SUPER when one exists; falls back to its
    /// HEAD otherwise.
    fn capture_child(&self, entry: &ChildEntry) -> MrvcResult<ChildRef> {
        let child_mrvc = self.root.join(&entry.path).join(MRVC_DIR);
        if !fsutil::is_dir(&child_mrvc) || !fsutil::file_exists(&child_mrvc.join("metadata.json")) {
            return Err(MrvcError::NotAChildRepository(entry.path.clone()));
        }
        let meta: Metadata = fsutil::read_json(&child_mrvc.join("metadata.json"))?;
        if meta.name != entry.repo_name {
            return Err(MrvcError::RepoIdentityMismatch {
                expected: entry.repo_name.clone(),
                found: meta.name,
            });
        }

        let head = read_pointer(&child_mrvc.join("HEAD"))?;
        if head.is_empty() {
            return Err(MrvcError::ChildHasNoCommits(entry.path.clone()));
        }
        let head_super = read_pointer(&child_mrvc.join("HEAD_SUPER"))?;

        let (reference, kind) = if head_super.is_empty() {
            (head, ChildRefKind::Commit)
        } else {
            (head_super, ChildRefKind::Super)
        };

        let child_store = ObjectStore::new(&child_mrvc.join("objects"));
        if !child_store.exists(&reference) {
            return Err(MrvcError::ObjectNotFound(reference));
        }

        Ok(ChildRef {
            path: entry.path.clone(),
            repo_name: entry.repo_name.clone(),
            reference,
            kind,
        })
    }
}

/// Read a pointer file (HEAD / HEAD_SUPER). Missing or blank files mean
/// "no commits yet" and yield the empty string.
fn read_pointer(path: &Path) -> MrvcResult<String> {
    if !path.exists() {
        return Ok(String::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(content.trim().to_string())
}

/// Current time as a decimal string of Unix epoch milliseconds.
fn now_millis() -> String {
    Utc::now().timestamp_millis().to_string()
}
