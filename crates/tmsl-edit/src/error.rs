//! Error types for definition edits.

use thiserror::Error;

/// Errors from table extraction and measure edits.
#[derive(Debug, Error)]
pub enum EditError {
    /// Definition text is not valid JSON even after normalization.
    #[error("definition is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// No whole-model content to extract from.
    #[error("no model content found in the definition")]
    NoModel,

    /// Model body has no usable `tables` array.
    #[error("model has no 'tables' array")]
    NoTables,

    /// The requested table does not exist in the model.
    #[error("table '{name}' not found; available tables: {}", .available.join(", "))]
    TableNotFound { name: String, available: Vec<String> },

    /// The payload is not a single-table `createOrReplace` script.
    #[error("payload is not a single-table createOrReplace script")]
    NotTablePayload,

    /// Payload content does not have the shape the edit needs.
    #[error("malformed table payload: {reason}")]
    Malformed { reason: String },
}

/// Result type for edit operations.
pub type Result<T> = std::result::Result<T, EditError>;
