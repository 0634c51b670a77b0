//! Error types for the class index and the call graph store
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages. Absence of a queried
//! entity is never an error: query operations return `None` or an empty
//! collection instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or persisting the class index
#[derive(Error, Debug)]
pub enum IndexError {
    /// A source file or directory under a corpus root could not be read
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Storage errors
    #[error("Failed to persist index to '{path}': {source}")]
    PersistenceError {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    /// Thread pool setup for parallel parsing failed
    #[error("Failed to start parser thread pool: {reason}")]
    ThreadPool { reason: String },

    /// Initialization was attempted while a previous attempt failed
    #[error("Initialization failed: {reason}")]
    InitFailed { reason: String },

    /// General errors for cases where we need to preserve existing behavior
    #[error("{0}")]
    General(String),
}

impl IndexError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::PersistenceError { .. } => "PERSISTENCE_ERROR",
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::ThreadPool { .. } => "THREAD_POOL_ERROR",
            Self::InitFailed { .. } => "INIT_FAILED",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::PersistenceError { .. } => vec![
                "Check disk space and permissions in the index directory",
                "The index is incomplete; run 'classdex index' again once the cause is fixed",
            ],
            Self::FileRead { .. } => vec![
                "Check read permissions on the corpus sources",
                "Add unreadable paths to .classdexignore to leave them out of the index",
            ],
            Self::ConfigError { .. } => vec![
                "Run 'classdex config' to inspect the effective settings",
                "Run 'classdex init --force' to regenerate the settings file",
            ],
            Self::ThreadPool { .. } => vec!["Lower indexing.parallel_threads in settings.toml"],
            _ => vec![],
        }
    }
}

/// Errors raised by call graph ingestion and queries
#[derive(Error, Debug)]
pub enum CallGraphError {
    /// The store has not been ingested yet
    #[error("Call graph store '{path}' is not initialized. Run ingestion first")]
    NotInitialized { path: PathBuf },

    #[error("Failed to read call dump '{path}': {source}")]
    DumpRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to prepare store location '{path}': {source}")]
    StoreIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl CallGraphError {
    pub fn status_code(&self) -> String {
        match self {
            Self::NotInitialized { .. } => "NOT_INITIALIZED",
            Self::DumpRead { .. } => "DUMP_READ_ERROR",
            Self::StoreIo { .. } => "STORE_IO_ERROR",
            Self::Sqlite(_) => "SQLITE_ERROR",
        }
        .to_string()
    }

    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::NotInitialized { .. } => vec![
                "Run 'classdex ingest <dump>' to build the call graph store",
                "Check call_graph.store_path in settings.toml",
            ],
            Self::DumpRead { .. } => vec!["Check that the call dump exists and is readable"],
            Self::StoreIo { .. } | Self::Sqlite(_) => vec![
                "Check disk space and permissions next to the store",
                "Re-run ingestion; it rebuilds the store from scratch",
            ],
        }
    }

    /// True when the store simply does not exist yet
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized { .. })
    }
}

/// Result type alias for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Result type alias for call graph operations
pub type CallGraphResult<T> = Result<T, CallGraphError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, msg: &str) -> Result<T, IndexError>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> Result<T, IndexError> {
        self.map_err(|e| IndexError::General(format!("{msg}: {e}")))
    }
}
