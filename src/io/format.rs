//! Format definitions for CLI output.
//!
//! Provides structured format types for consistent JSON responses.

use crate::error::{CallGraphError, IndexError};
use crate::io::exit_code::ExitCode;
use serde::{Deserialize, Serialize};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// JSON for tool integration
    Json,
}

impl OutputFormat {
    /// Create format from JSON flag.
    #[must_use]
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }

    /// Check if format is JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Standard JSON response format.
///
/// Provides consistent structure for both success and error responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResponse<T = serde_json::Value>
where
    T: Serialize,
{
    /// Status: "success" or "error"
    pub status: String,

    /// Result code (e.g., "OK", "NOT_FOUND", "NOT_INITIALIZED")
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Actual data payload (only for success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details and suggestions (only for errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,

    /// Exit code for shell scripts
    pub exit_code: u8,
}

/// Error details for JSON responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Recovery suggestions
    pub suggestions: Vec<String>,
}

/// Library error flattened for display
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
    pub suggestions: Vec<String>,
    pub exit_code: ExitCode,
}

impl From<&IndexError> for ErrorReport {
    fn from(error: &IndexError) -> Self {
        Self {
            code: error.status_code(),
            message: error.to_string(),
            suggestions: error
                .recovery_suggestions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exit_code: ExitCode::from_error(error),
        }
    }
}

impl From<&CallGraphError> for ErrorReport {
    fn from(error: &CallGraphError) -> Self {
        Self {
            code: error.status_code(),
            message: error.to_string(),
            suggestions: error
                .recovery_suggestions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exit_code: ExitCode::from_call_graph_error(error),
        }
    }
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    /// Create a success response with data.
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            code: "OK".to_string(),
            message: "Operation completed successfully".to_string(),
            data: Some(data),
            error: None,
            exit_code: ExitCode::Success as u8,
        }
    }
}

impl JsonResponse<serde_json::Value> {
    /// Create a not found response.
    pub fn not_found(entity: &str, name: &str) -> Self {
        Self {
            status: "error".to_string(),
            code: "NOT_FOUND".to_string(),
            message: format!("{entity} '{name}' not found"),
            data: None,
            error: Some(ErrorDetails {
                suggestions: vec![
                    "Check the spelling and the package name".to_string(),
                    "Run 'classdex index' if the corpus changed".to_string(),
                ],
            }),
            exit_code: ExitCode::NotFound as u8,
        }
    }

    /// Create an error response from a library error.
    pub fn from_report(report: &ErrorReport) -> Self {
        Self {
            status: "error".to_string(),
            code: report.code.clone(),
            message: report.message.clone(),
            data: None,
            error: Some(ErrorDetails {
                suggestions: report.suggestions.clone(),
            }),
            exit_code: report.exit_code as u8,
        }
    }
}
