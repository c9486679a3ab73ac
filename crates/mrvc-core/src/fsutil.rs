//! Filesystem adapter: path normalization, JSON files, and the
//! working-tree walk.
//!
//! All repository paths are handled as absolute, slash-separated strings;
//! [`normalize_path`] is the single entry point that produces them.

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path};

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{MrvcError, MrvcResult};
use crate::ignore::{IgnorePatterns, IGNORE_FILE};

/// The repository metadata directory name.
pub const MRVC_DIR: &str = ".mrvc";

/// Options controlling [`list_files`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkOptions {
    /// Skip any `.mrvc` directory subtree and the root `.mrvcignore` file.
    pub ignore_mrvc: bool,
    /// Skip any directory below the root that contains its own `.mrvc`.
    pub ignore_nested_repos: bool,
    /// Filter files through the `.mrvcignore` patterns.
    pub apply_ignore_patterns: bool,
}

impl WalkOptions {
    /// The filter used by wildcard commits and status scans.
    pub fn full() -> Self {
        WalkOptions {
            ignore_mrvc: true,
            ignore_nested_repos: true,
            apply_ignore_patterns: true,
        }
    }
}

pub fn is_dir(path: &Path) -> bool {
    path.is_dir()
}

pub fn file_exists(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Write data to a file atomically using temp-file-then-rename.
///
/// On POSIX, `rename()` within the same filesystem is atomic: either the
/// old file or the new file is visible, never a partial write. The temp
/// file is fsynced before renaming so the data is durable on disk.
pub fn atomic_write(path: &Path, data: &[u8]) -> MrvcResult<()> {
    let tmp = path.with_extension("tmp");
    let mut file = File::create(&tmp)?;
    file.write_all(data)?;
    file.sync_data()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a JSON file into a value. A missing file is an error.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> MrvcResult<T> {
    if !file_exists(path) {
        return Err(MrvcError::MissingFile(normalize_path(path)));
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Write a value as pretty JSON with a trailing newline, atomically.
/// Parent directories are created as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> MrvcResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    atomic_write(path, &bytes)
}

/// Normalize a path to an absolute, lexically clean, slash-separated string.
///
/// Relative input is resolved against the process working directory.
/// `.` and `..` components are removed without touching the filesystem, so
/// the path does not have to exist and symlinks are not resolved.
/// Empty input stays empty.
pub fn normalize_path(path: &Path) -> String {
    if path.as_os_str().is_empty() {
        return String::new();
    }
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut stack: Vec<String> = Vec::new();
    for comp in abs.components() {
        match comp {
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                stack.pop();
            }
            Component::Normal(c) => stack.push(c.to_string_lossy().into_owned()),
        }
    }
    format!("/{}", stack.join("/"))
}

/// Root-relative slash path, or `None` when `abs` does not live under
/// `root`. Equal paths yield the empty string.
pub fn relative_slash(root: &str, abs: &str) -> Option<String> {
    if abs == root {
        return Some(String::new());
    }
    let prefix = if root.ends_with('/') {
        root.to_string()
    } else {
        format!("{root}/")
    };
    abs.strip_prefix(&prefix).map(str::to_string)
}

/// Enumerate files under `root` honoring the walk options.
///
/// Returns absolute normalized paths in sorted order. Unreadable entries
/// below the root are skipped best-effort; a failure to read the root
/// itself propagates.
pub fn list_files(root: &Path, options: WalkOptions) -> MrvcResult<Vec<String>> {
    let patterns = if options.apply_ignore_patterns {
        IgnorePatterns::load(root)
    } else {
        IgnorePatterns::default()
    };
    let root_norm = normalize_path(root);

    let mut files = Vec::new();
    let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
        if e.depth() == 0 || !e.file_type().is_dir() {
            return true;
        }
        if options.ignore_mrvc && e.file_name().to_string_lossy() == MRVC_DIR {
            return false;
        }
        if options.ignore_nested_repos && e.path().join(MRVC_DIR).is_dir() {
            return false;
        }
        true
    });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                if err.depth() == 0 {
                    return Err(match err.into_io_error() {
                        Some(io_err) => MrvcError::Io(io_err),
                        None => MrvcError::Other("cannot walk repository root".to_string()),
                    });
                }
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if options.ignore_mrvc
            && entry.depth() == 1
            && entry.file_name().to_string_lossy() == IGNORE_FILE
        {
            continue;
        }

        let norm = normalize_path(entry.path());
        if options.apply_ignore_patterns {
            if let Some(rel) = relative_slash(&root_norm, &norm) {
                if patterns.is_ignored(&rel) {
                    continue;
                }
            }
        }
        files.push(norm);
    }

    files.sort();
    Ok(files)
}
