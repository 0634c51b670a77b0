//! Output handling for the CLI.
//!
//! This module provides:
//! - Unified output formatting (text, JSON)
//! - Consistent error reporting and exit codes

pub mod exit_code;
pub mod format;
pub mod output;

pub use exit_code::ExitCode;
pub use format::{ErrorDetails, ErrorReport, JsonResponse, OutputFormat};
pub use output::OutputManager;
