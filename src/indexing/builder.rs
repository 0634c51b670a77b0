//! Builds the sharded class index from one or two source trees.

use super::progress::{BuildSummary, ProgressCallback, percent, stage};
use super::walker::{FileWalker, relative_source_path};
use crate::error::{IndexError, IndexResult};
use crate::parsing::{DeclarationParser, PatternParser};
use crate::storage::{CorpusManifest, IndexPersistence, PackageShard};
use crate::types::{Namespace, ParsedDeclaration};
use crate::Settings;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How often (in files) the parse stage reports progress
const PROGRESS_INTERVAL: usize = 500;

/// Source roots to index. The secondary tree is optional.
#[derive(Debug, Clone)]
pub struct CorpusRoots {
    pub primary: PathBuf,
    pub secondary: Option<PathBuf>,
}

impl CorpusRoots {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            primary: settings.resolve(&settings.corpus.primary_root),
            secondary: settings
                .corpus
                .secondary_root
                .as_ref()
                .map(|root| settings.resolve(root)),
        }
    }

    fn iter(&self) -> impl Iterator<Item = (Namespace, &Path)> {
        std::iter::once((Namespace::Primary, self.primary.as_path())).chain(
            self.secondary
                .as_deref()
                .map(|root| (Namespace::Secondary, root)),
        )
    }
}

/// Version labels written to the manifest
#[derive(Debug, Clone)]
pub struct CorpusVersions {
    pub primary: String,
    pub secondary: Option<String>,
}

impl CorpusVersions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            primary: settings.corpus.version.clone(),
            secondary: settings.corpus.secondary_version.clone(),
        }
    }
}

enum FileOutcome {
    Parsed(ParsedDeclaration),
    Skipped(String),
}

/// Walks, parses and persists. Running it twice over an unchanged tree
/// produces byte-identical shard files.
pub struct IndexBuilder {
    settings: Arc<Settings>,
    parser: Arc<dyn DeclarationParser>,
    persistence: IndexPersistence,
}

impl IndexBuilder {
    /// Builder writing to the configured index directory
    pub fn new(settings: Arc<Settings>) -> Self {
        let persistence = IndexPersistence::new(settings.index_dir());
        Self::with_persistence(settings, persistence)
    }

    pub fn with_persistence(settings: Arc<Settings>, persistence: IndexPersistence) -> Self {
        Self {
            settings,
            parser: Arc::new(PatternParser::new()),
            persistence,
        }
    }

    /// Swap the declaration parser
    pub fn with_parser(mut self, parser: Arc<dyn DeclarationParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn persistence(&self) -> &IndexPersistence {
        &self.persistence
    }

    /// Index every root and write shards plus manifest.
    ///
    /// Shards of the same name are overwritten; shards of packages that no
    /// longer exist are left on disk but dropped from the manifest. The old
    /// manifest is removed before the first shard is written, so a build
    /// that fails part way leaves an index that reads as not built.
    pub fn build(
        &self,
        roots: &CorpusRoots,
        versions: &CorpusVersions,
        progress: Option<&ProgressCallback<'_>>,
    ) -> IndexResult<BuildSummary> {
        let report = |stage: &str, pct: u8, message: &str| {
            if let Some(callback) = progress {
                callback(stage, pct, message);
            }
        };

        let mut summary = BuildSummary::new();
        let walker = FileWalker::new(self.settings.clone());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.indexing.parallel_threads)
            .build()
            .map_err(|e| IndexError::ThreadPool {
                reason: e.to_string(),
            })?;

        let mut shards: BTreeMap<(Namespace, String), PackageShard> = BTreeMap::new();

        for (namespace, root) in roots.iter() {
            if !root.is_dir() {
                tracing::warn!(
                    "[index] {namespace} root '{}' does not exist, indexing zero files",
                    root.display()
                );
            }

            report(
                stage::SCAN,
                0,
                &format!("Scanning {namespace} sources in {}", root.display()),
            );
            let files = walker.collect_files(root)?;
            summary.files_scanned += files.len();
            tracing::info!("[index] {} {namespace} source files found", files.len());

            let total = files.len();
            let done = AtomicUsize::new(0);
            let outcomes: Vec<FileOutcome> = pool.install(|| {
                files
                    .par_iter()
                    .map(|path| {
                        let outcome = self.parse_file(root, path);
                        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                        if n % PROGRESS_INTERVAL == 0 || n == total {
                            report(
                                stage::PARSE,
                                percent(n, total),
                                &format!("Parsed {n}/{total} {namespace} files"),
                            );
                        }
                        outcome
                    })
                    .collect::<IndexResult<Vec<_>>>()
            })?;

            // Outcomes are in walk order, so shard class order is stable
            for (path, outcome) in files.into_iter().zip(outcomes) {
                match outcome {
                    FileOutcome::Parsed(parsed) => {
                        let package = parsed.package_bucket().to_string();
                        shards
                            .entry((namespace, package.clone()))
                            .or_insert_with(|| PackageShard::new(package))
                            .insert(parsed.simple_name, parsed.declaration);
                    }
                    FileOutcome::Skipped(reason) => {
                        tracing::debug!("[index] skipped {}: {reason}", path.display());
                        summary.add_skipped(path, reason);
                    }
                }
            }
        }

        self.persistence.remove_manifest()?;

        let shard_total = shards.len();
        let mut primary = Vec::new();
        let mut secondary = Vec::new();

        for (written, ((namespace, package), shard)) in shards.into_iter().enumerate() {
            self.persistence.save_shard(namespace, &shard)?;
            summary.class_count += shard.len();

            match namespace {
                Namespace::Primary => primary.push(package),
                Namespace::Secondary => secondary.push(package),
            }

            let written = written + 1;
            if written % PROGRESS_INTERVAL == 0 || written == shard_total {
                report(
                    stage::WRITE,
                    percent(written, shard_total),
                    &format!("Wrote {written}/{shard_total} package shards"),
                );
            }
        }

        let manifest = CorpusManifest::new(
            versions.primary.clone(),
            versions.secondary.clone(),
            primary,
            secondary,
        );
        self.persistence.save_manifest(&manifest)?;

        summary.packages_indexed = manifest.package_count();
        summary.stop_timing();

        tracing::info!(
            "[index] {} classes in {} packages ({} files scanned, {} skipped) in {:.2}s",
            summary.class_count,
            summary.packages_indexed,
            summary.files_scanned,
            summary.files_skipped,
            summary.elapsed.as_secs_f64()
        );
        report(stage::DONE, 100, "Index build complete");

        Ok(summary)
    }

    /// Only non-UTF-8 content and files without a type declaration are
    /// skipped; a file that cannot be read fails the build.
    fn parse_file(&self, root: &Path, path: &Path) -> IndexResult<FileOutcome> {
        let bytes = fs::read(path).map_err(|source| IndexError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let Ok(text) = String::from_utf8(bytes) else {
            return Ok(FileOutcome::Skipped("not valid UTF-8".to_string()));
        };

        let source_path = relative_source_path(root, path);
        Ok(match self.parser.parse(&text, &source_path) {
            Some(parsed) => FileOutcome::Parsed(parsed),
            None => FileOutcome::Skipped("no type declaration".to_string()),
        })
    }
}
