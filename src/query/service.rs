//! Hands out one shared [`IndexSession`], building the index first if it
//! does not exist yet.

use super::IndexSession;
use crate::Settings;
use crate::error::{ErrorContext, IndexError, IndexResult};
use crate::indexing::{CorpusRoots, CorpusVersions, IndexBuilder};
use crate::lazy::LazyInit;
use crate::storage::IndexPersistence;
use std::sync::Arc;

pub struct QueryService {
    settings: Arc<Settings>,
    session: LazyInit<IndexSession>,
}

impl QueryService {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            session: LazyInit::new(),
        }
    }

    /// The session. The first caller builds the index when no manifest
    /// exists; concurrent callers wait for that same build.
    pub async fn session(&self) -> IndexResult<Arc<IndexSession>> {
        let settings = self.settings.clone();
        self.session
            .get_or_init(|| async move {
                let persistence = IndexPersistence::new(settings.index_dir());
                if !persistence.exists() {
                    let roots = CorpusRoots::from_settings(&settings);
                    if !roots.primary.is_dir() {
                        return Err(IndexError::ConfigError {
                            reason: format!(
                                "no index at '{}' and primary root '{}' does not exist",
                                persistence.base_path().display(),
                                roots.primary.display()
                            ),
                        });
                    }

                    tracing::info!(
                        "[query] no index at {}, building it first",
                        persistence.base_path().display()
                    );
                    let versions = CorpusVersions::from_settings(&settings);
                    let builder = IndexBuilder::with_persistence(settings.clone(), persistence);
                    tokio::task::spawn_blocking(move || builder.build(&roots, &versions, None))
                        .await
                        .context("index build task failed")??;
                }

                Ok::<_, IndexError>(IndexSession::new(&settings))
            })
            .await
    }
}
