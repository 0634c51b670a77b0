use super::ingest::{IngestSummary, Ingestor};
use super::store::{CallGraphStats, CallGraphStore, DEFAULT_SEARCH_LIMIT, MethodRef};
use crate::Settings;
use crate::error::{CallGraphError, CallGraphResult};
use crate::indexing::ProgressCallback;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Owns the read handle of one call graph store.
///
/// The handle is opened on first use. Re-ingestion runs under the same lock,
/// closing the handle first, so queries never observe a half written store.
pub struct CallGraphSession {
    path: PathBuf,
    batch_size: usize,
    result_limit: usize,
    store: Mutex<Option<CallGraphStore>>,
}

impl CallGraphSession {
    pub fn new(settings: &Settings) -> Self {
        Self::with_path(settings.call_graph_store())
            .with_batch_size(settings.call_graph.batch_size)
            .with_result_limit(settings.call_graph.result_limit)
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            batch_size: super::ingest::DEFAULT_BATCH_SIZE,
            result_limit: super::store::MAX_RESULTS,
            store: Mutex::new(None),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_initialized(&self) -> bool {
        self.path.is_file()
    }

    fn with_store<R>(
        &self,
        f: impl FnOnce(&CallGraphStore) -> CallGraphResult<R>,
    ) -> CallGraphResult<R> {
        let mut guard = self.store.lock();
        if guard.is_none() {
            let store = CallGraphStore::open(&self.path)?.with_result_limit(self.result_limit);
            *guard = Some(store);
        }
        match guard.as_ref() {
            Some(store) => f(store),
            None => Err(CallGraphError::NotInitialized {
                path: self.path.clone(),
            }),
        }
    }

    pub fn find_callers(&self, type_name: &str, method: &str) -> CallGraphResult<Vec<MethodRef>> {
        self.with_store(|store| store.find_callers(type_name, method))
    }

    pub fn find_callees(&self, type_name: &str, method: &str) -> CallGraphResult<Vec<MethodRef>> {
        self.with_store(|store| store.find_callees(type_name, method))
    }

    /// Fuzzy method search; `limit` defaults to 50 and never exceeds 100
    pub fn search_methods(&self, query: &str, limit: Option<usize>) -> CallGraphResult<Vec<MethodRef>> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        self.with_store(|store| store.search_methods(query, limit))
    }

    /// Aggregate counts, `None` when nothing was ingested yet
    pub fn stats(&self) -> CallGraphResult<Option<CallGraphStats>> {
        match self.with_store(|store| store.stats()) {
            Ok(stats) => Ok(Some(stats)),
            Err(e) if e.is_not_initialized() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Rebuild the store from `raw_dump`. Blocks queries until done.
    pub fn reingest(
        &self,
        raw_dump: &Path,
        progress: Option<&ProgressCallback<'_>>,
    ) -> CallGraphResult<IngestSummary> {
        let mut guard = self.store.lock();
        // Drop the read handle before the store file is replaced
        *guard = None;

        Ingestor::new(&self.path)
            .with_batch_size(self.batch_size)
            .ingest(raw_dump, progress)
    }
}
