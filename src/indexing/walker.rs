//! File system walker for discovering source files to index
//!
//! This module provides directory traversal with support for:
//! - .gitignore and .classdexignore rules
//! - Extension filtering from settings
//! - Hidden file handling
//! - Deterministic, file name sorted order

use crate::Settings;
use crate::error::{IndexError, IndexResult};
use ignore::WalkBuilder;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Walks a corpus root to find source files to index
#[derive(Debug)]
pub struct FileWalker {
    settings: Arc<Settings>,
}

impl FileWalker {
    /// Create a new file walker with the given settings
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Walk a directory and return its source files in file name order.
    ///
    /// A missing root yields no files. Entries that vanish mid-walk are
    /// dropped; any other traversal failure is yielded as `FileRead`.
    pub fn walk(&self, root: &Path) -> impl Iterator<Item = IndexResult<PathBuf>> {
        let mut builder = WalkBuilder::new(root);

        builder
            .hidden(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .follow_links(false)
            .max_depth(None)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        builder.add_custom_ignore_filename(".classdexignore");

        let extensions = self.settings.indexing.extensions.clone();
        let root = root.to_path_buf();

        builder.build().filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => return walk_error(&root, err).map(Err),
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return None;
            }
            let path = entry.path();

            let file_name = path.file_name()?.to_str()?;
            if file_name.starts_with('.') {
                return None;
            }

            let extension = path.extension()?.to_str()?;
            extensions
                .iter()
                .any(|ext| ext == extension)
                .then(|| Ok(path.to_path_buf()))
        })
    }

    /// Collect every source file under `root`, failing on the first
    /// traversal error
    pub fn collect_files(&self, root: &Path) -> IndexResult<Vec<PathBuf>> {
        self.walk(root).collect()
    }

    /// Count files that would be indexed (useful for dry runs)
    pub fn count_files(&self, root: &Path) -> usize {
        self.walk(root).filter(Result::is_ok).count()
    }
}

/// `None` for not-found, otherwise a `FileRead` naming the failing path
fn walk_error(root: &Path, err: ignore::Error) -> Option<IndexError> {
    if err.io_error().is_some_and(|e| e.kind() == io::ErrorKind::NotFound) {
        return None;
    }
    let path = error_path(&err).unwrap_or(root).to_path_buf();
    let source = match err.into_io_error() {
        Some(source) => source,
        None => io::Error::other(format!("walk failed under '{}'", root.display())),
    };
    Some(IndexError::FileRead { path, source })
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        _ => None,
    }
}

/// Path of `path` relative to `root`, `/` separated on every platform
pub fn relative_source_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
