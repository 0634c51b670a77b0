//! On-disk layout of the class index
//!
//! ```text
//! <index>/manifest.json
//! <index>/primary/<package>.json
//! <index>/secondary/<package>.json
//! ```

use super::{CorpusManifest, PackageShard, StorageError, StorageResult};
use crate::types::Namespace;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "manifest.json";

/// Reads and writes the manifest and package shards under one directory
#[derive(Debug, Clone)]
pub struct IndexPersistence {
    base_path: PathBuf,
}

impl IndexPersistence {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.base_path.join(MANIFEST_FILE)
    }

    pub fn namespace_dir(&self, namespace: Namespace) -> PathBuf {
        self.base_path.join(namespace.as_str())
    }

    pub fn shard_path(&self, namespace: Namespace, package: &str) -> PathBuf {
        self.namespace_dir(namespace).join(format!("{package}.json"))
    }

    /// Check if a built index exists
    pub fn exists(&self) -> bool {
        self.manifest_path().exists()
    }

    /// Overwrite the shard of `package` in `namespace`
    #[must_use = "Save errors should be handled to ensure data is persisted"]
    pub fn save_shard(&self, namespace: Namespace, shard: &PackageShard) -> StorageResult<PathBuf> {
        let dir = self.namespace_dir(namespace);
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = self.shard_path(namespace, &shard.package);
        write_json(&path, shard)?;
        Ok(path)
    }

    /// Load a shard. `Ok(None)` when no shard was written for the package.
    pub fn load_shard(
        &self,
        namespace: Namespace,
        package: &str,
    ) -> StorageResult<Option<PackageShard>> {
        read_json(&self.shard_path(namespace, package))
    }

    /// Write the manifest through a temp file and rename, so readers see
    /// either no manifest or a complete one.
    #[must_use = "Save errors should be handled to ensure data is persisted"]
    pub fn save_manifest(&self, manifest: &CorpusManifest) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path).map_err(|source| StorageError::Io {
            path: self.base_path.clone(),
            source,
        })?;

        let path = self.manifest_path();
        let temp_path = self
            .base_path
            .join(format!(".{MANIFEST_FILE}.{}.tmp", std::process::id()));
        if let Err(e) = write_json(&temp_path, manifest) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        fs::rename(&temp_path, &path).map_err(|source| {
            let _ = fs::remove_file(&temp_path);
            StorageError::Io { path, source }
        })
    }

    /// Mark the index as not built. Shards written afterwards are invisible
    /// until the next `save_manifest`.
    pub fn remove_manifest(&self) -> StorageResult<()> {
        let path = self.manifest_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    /// Load the manifest. `Ok(None)` when the index was never built.
    pub fn load_manifest(&self) -> StorageResult<Option<CorpusManifest>> {
        read_json(&self.manifest_path())
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, json).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&json)
        .map(Some)
        .map_err(|source| StorageError::Serialization {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassDeclaration, ClassKind};
    use tempfile::TempDir;

    fn declaration(path: &str) -> ClassDeclaration {
        ClassDeclaration {
            kind: ClassKind::Class,
            super_type: None,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            source_path: path.to_string(),
        }
    }

    #[test]
    fn test_shard_layout_and_order() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = IndexPersistence::new(temp_dir.path());

        let mut shard = PackageShard::new("net.minecraft.block");
        shard.insert("Zeta".to_string(), declaration("net/minecraft/block/Zeta.java"));
        shard.insert("Alpha".to_string(), declaration("net/minecraft/block/Alpha.java"));

        let path = persistence.save_shard(Namespace::Primary, &shard).unwrap();
        assert_eq!(
            path,
            temp_dir.path().join("primary").join("net.minecraft.block.json")
        );

        let loaded = persistence
            .load_shard(Namespace::Primary, "net.minecraft.block")
            .unwrap()
            .unwrap();
        let names: Vec<_> = loaded.classes.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_missing_files_are_none() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = IndexPersistence::new(temp_dir.path());

        assert!(!persistence.exists());
        assert!(persistence.load_manifest().unwrap().is_none());
        assert!(
            persistence
                .load_shard(Namespace::Secondary, "net.fabricmc")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_corrupt_manifest_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = IndexPersistence::new(temp_dir.path());
        fs::write(persistence.manifest_path(), "{ not json").unwrap();

        let err = persistence.load_manifest().unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_manifest_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = IndexPersistence::new(temp_dir.path().join("index"));
        let manifest = CorpusManifest::new("1.21", None, vec!["net.a".to_string()], vec![]);

        persistence.save_manifest(&manifest).unwrap();
        assert!(persistence.exists());
        assert_eq!(persistence.load_manifest().unwrap(), Some(manifest));
    }

    #[test]
    fn test_remove_manifest_marks_index_unbuilt() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = IndexPersistence::new(temp_dir.path());
        persistence
            .save_manifest(&CorpusManifest::new("1.21", None, vec![], vec![]))
            .unwrap();
        assert!(persistence.exists());

        persistence.remove_manifest().unwrap();
        assert!(!persistence.exists());
        assert!(persistence.load_manifest().unwrap().is_none());

        // Removing twice is fine
        persistence.remove_manifest().unwrap();
    }

    #[test]
    fn test_manifest_save_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = IndexPersistence::new(temp_dir.path());
        let manifest = CorpusManifest::new("1.21", None, vec!["net.a".to_string()], vec![]);
        persistence.save_manifest(&manifest).unwrap();
        persistence.save_manifest(&manifest).unwrap();

        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![MANIFEST_FILE]);
    }
}
