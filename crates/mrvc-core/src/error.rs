//! Error types for MRVC operations.

use std::fmt;
use std::io;

/// All possible MRVC errors.
#[derive(Debug)]
pub enum MrvcError {
    /// The directory is not an MRVC repository.
    NotARepository,
    /// An MRVC repository already exists here.
    AlreadyInitialized,
    /// An I/O error occurred.
    Io(io::Error),
    /// JSON serialization/deserialization failed.
    Json(serde_json::Error),
    /// A file given to commit does not exist on disk.
    MissingFile(String),
    /// A path resolves outside the repository root.
    OutsideRepository(String),
    /// An object hash is malformed.
    InvalidHash(String),
    /// An object with the given hash was not found in the store.
    ObjectNotFound(String),
    /// Commit was invoked with no files.
    NothingToCommit,
    /// Super-commit requires at least one commit in this repository.
    SelfHasNoCommits,
    /// A linked child repository has no commits yet.
    ChildHasNoCommits(String),
    /// The path does not contain a valid child repository.
    NotAChildRepository(String),
    /// The child path is already linked.
    AlreadyLinked(String),
    /// Another linked child already uses this repository name.
    NameConflict(String),
    /// The child path resolves outside the parent repository root.
    PathEscapesParent(String),
    /// A child's declared name does not match the recorded one.
    RepoIdentityMismatch { expected: String, found: String },
    /// Could not acquire the repository lock within the timeout.
    LockTimeout,
    /// Generic error with a message.
    Other(String),
}

impl fmt::Display for MrvcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MrvcError::NotARepository => write!(f, "not an MRVC repository (missing .mrvc/)"),
            MrvcError::AlreadyInitialized => write!(f, "repository already initialized"),
            MrvcError::Io(e) => write!(f, "I/O error: {e}"),
            MrvcError::Json(e) => write!(f, "JSON error: {e}"),
            MrvcError::MissingFile(path) => write!(f, "file does not exist: {path}"),
            MrvcError::OutsideRepository(path) => {
                write!(f, "path is outside the repository: {path}")
            }
            MrvcError::InvalidHash(hash) => write!(f, "invalid object hash: {hash:?}"),
            MrvcError::ObjectNotFound(hash) => write!(f, "object not found: {hash}"),
            MrvcError::NothingToCommit => write!(f, "no files to commit"),
            MrvcError::SelfHasNoCommits => {
                write!(f, "repository has no commits; commit before super-commit")
            }
            MrvcError::ChildHasNoCommits(path) => {
                write!(f, "child repository has no commits: {path}")
            }
            MrvcError::NotAChildRepository(path) => {
                write!(f, "not an MRVC repository: {path}")
            }
            MrvcError::AlreadyLinked(path) => write!(f, "child is already linked: {path}"),
            MrvcError::NameConflict(name) => {
                write!(f, "a linked child already uses the name: {name}")
            }
            MrvcError::PathEscapesParent(path) => {
                write!(f, "child must be inside the parent repository: {path}")
            }
            MrvcError::RepoIdentityMismatch { expected, found } => {
                write!(f, "child name mismatch: expected {expected:?}, found {found:?}")
            }
            MrvcError::LockTimeout => write!(f, "could not acquire repository lock within timeout"),
            MrvcError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for MrvcError {}

impl From<io::Error> for MrvcError {
    fn from(e: io::Error) -> Self {
        MrvcError::Io(e)
    }
}

impl From<serde_json::Error> for MrvcError {
    fn from(e: serde_json::Error) -> Self {
        MrvcError::Json(e)
    }
}

/// Convenience alias for Results in MRVC.
pub type MrvcResult<T> = Result<T, MrvcError>;
