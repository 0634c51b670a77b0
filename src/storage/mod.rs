//! Persisted form of the class index: a manifest plus one JSON shard per
//! package.

pub mod error;
pub mod manifest;
pub mod persistence;
pub mod shard;

pub use error::{StorageError, StorageResult};
pub use manifest::{CorpusManifest, PackageLists};
pub use persistence::IndexPersistence;
pub use shard::PackageShard;
