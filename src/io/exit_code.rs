//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - operation completed, results found (or no results is acceptable)
//! - `1`: General error - unspecified failure
//! - `3-125`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::{CallGraphError, IndexError};
use crate::storage::StorageError;
use rusqlite::ErrorCode;

/// Standard exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Entity not found but command executed successfully (code 3)
    NotFound = 3,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,

    /// Persisted index or store is unreadable (code 7)
    IndexCorrupted = 7,

    /// Call graph store has not been ingested (code 9)
    NotInitialized = 9,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// Map an `IndexError` to the exit code scripts can branch on.
    pub fn from_error(error: &IndexError) -> Self {
        match error {
            IndexError::FileRead { .. } => ExitCode::IoError,
            IndexError::PersistenceError { source, .. } => {
                match source.downcast_ref::<StorageError>() {
                    Some(storage) if storage.is_corrupt() => ExitCode::IndexCorrupted,
                    _ => ExitCode::IoError,
                }
            }
            IndexError::ConfigError { .. } => ExitCode::ConfigError,
            _ => ExitCode::GeneralError,
        }
    }

    /// Map a `CallGraphError` to its exit code.
    pub fn from_call_graph_error(error: &CallGraphError) -> Self {
        match error {
            CallGraphError::NotInitialized { .. } => ExitCode::NotInitialized,
            CallGraphError::DumpRead { .. } | CallGraphError::StoreIo { .. } => ExitCode::IoError,
            CallGraphError::Sqlite(rusqlite::Error::SqliteFailure(failure, _))
                if matches!(failure.code, ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase) =>
            {
                ExitCode::IndexCorrupted
            }
            CallGraphError::Sqlite(_) => ExitCode::GeneralError,
        }
    }

    /// Get a human-readable description of the exit code.
    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::NotFound => "Not found",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
            ExitCode::IndexCorrupted => "Index corrupted",
            ExitCode::NotInitialized => "Call graph not initialized",
        }
    }
}
