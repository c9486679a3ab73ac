//! Content-addressable object store.
//!
//! Objects are stored under `.mrvc/objects/` in a two-level fan-out: the
//! first two hex characters of the hash name the directory, the remaining
//! characters name the file. Objects are write-once and never mutated.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{MrvcError, MrvcResult};
use crate::hash::hash_bytes;

/// The object store manages content-addressed storage on disk.
pub struct ObjectStore {
    /// Root path: `.mrvc/objects/`
    root: PathBuf,
}

impl ObjectStore {
    /// Create a new ObjectStore rooted at the given path.
    pub fn new(objects_dir: &Path) -> Self {
        Self {
            root: objects_dir.to_path_buf(),
        }
    }

    /// Write an object under its precomputed hash.
    ///
    /// Saving a hash that already exists is a no-op, not an error.
    pub fn save(&self, hash: &str, data: &[u8]) -> MrvcResult<()> {
        let path = self.object_path(hash)?;
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, data)?;
        Ok(())
    }

    /// Stream a file's bytes into the store under a precomputed hash,
    /// without buffering the whole file in memory.
    pub fn save_file(&self, hash: &str, source: &Path) -> MrvcResult<()> {
        let dest = self.object_path(hash)?;
        if dest.exists() {
            return Ok(());
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut src = File::open(source)?;
        let mut dst = File::create(&dest)?;
        io::copy(&mut src, &mut dst)?;
        Ok(())
    }

    /// Hash bytes, save them, and return the content address.
    pub fn store(&self, data: &[u8]) -> MrvcResult<String> {
        let hash = hash_bytes(data);
        self.save(&hash, data)?;
        Ok(hash)
    }

    /// Retrieve an object by its hash.
    pub fn load(&self, hash: &str) -> MrvcResult<Vec<u8>> {
        let path = self.object_path(hash)?;
        if !path.exists() {
            return Err(MrvcError::ObjectNotFound(hash.to_string()));
        }
        Ok(fs::read(&path)?)
    }

    /// Check if an object exists.
    pub fn exists(&self, hash: &str) -> bool {
        self.object_path(hash).map(|p| p.exists()).unwrap_or(false)
    }

    /// Get the filesystem path for an object hash.
    ///
    /// Uses 2-char prefix directories: hash `abcdef...` -> `ab/cdef...`.
    /// Hashes shorter than 3 characters are invalid.
    fn object_path(&self, hash: &str) -> MrvcResult<PathBuf> {
        if hash.len() < 3 || !hash.is_ascii() {
            return Err(MrvcError::InvalidHash(hash.to_string()));
        }
        let (prefix, rest) = hash.split_at(2);
        Ok(self.root.join(prefix).join(rest))
    }
}
