//! mrvc-core — Core library for MRVC, a content-addressed multi-repository
//! version control system.
//!
//! MRVC captures immutable snapshots of a working tree in a
//! content-addressed object store, and coordinated snapshots ("super
//! commits") across a parent repository and the child repositories linked
//! beneath it, so a parent snapshot records a consistent state of the whole
//! forest.

pub mod children;
pub mod codec;
pub mod error;
pub mod fsutil;
pub mod hash;
pub mod ignore;
pub mod lock;
pub mod model;
pub mod object;
pub mod repo;
pub mod status;
pub mod tree;

pub use error::{MrvcError, MrvcResult};
pub use repo::Repository;
