//! Error types for the drive_bridge crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller-supplied ids that are checked before they reach a URL or body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdField {
    FileId,
    FolderId,
    ParentFolderId,
}

impl IdField {
    /// Option name as the caller spells it.
    pub fn name(self) -> &'static str {
        match self {
            IdField::FileId => "fileId",
            IdField::FolderId => "folderId",
            IdField::ParentFolderId => "parentFolderId",
        }
    }

    fn code(self) -> &'static str {
        match self {
            IdField::FileId => "INVALID_FILE_ID_FORMAT",
            IdField::FolderId => "INVALID_FOLDER_ID_FORMAT",
            IdField::ParentFolderId => "INVALID_PARENT_FOLDER_ID_FORMAT",
        }
    }
}

/// Errors that can occur when talking to Google Drive.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Access token is required")]
    MissingToken,

    #[error("Invalid access token format")]
    InvalidToken,

    #[error("Client not initialized. Call initialize() with an access token first.")]
    NotInitialized,

    #[error("Invalid {} format", .field.name())]
    InvalidIdFormat { field: IdField },

    #[error("{field} is required")]
    MissingArgument { field: &'static str },

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Failed to parse response JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Method not implemented: {0}")]
    UnknownMethod(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

impl DriveError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> String {
        match self {
            DriveError::MissingToken => "MISSING_TOKEN".to_string(),
            DriveError::InvalidToken => "INVALID_TOKEN".to_string(),
            DriveError::NotInitialized => "NOT_INITIALIZED".to_string(),
            DriveError::InvalidIdFormat { field } => field.code().to_string(),
            DriveError::MissingArgument { field } => {
                format!("MISSING_{}", screaming_snake(field))
            }
            DriveError::RequestFailed(_) => "REQUEST_FAILED".to_string(),
            DriveError::Http { status, .. } => format!("HTTP_{}", status),
            DriveError::Parse(_) => "PARSE_ERROR".to_string(),
            DriveError::UnknownMethod(_) => "UNIMPLEMENTED".to_string(),
            DriveError::InvalidOptions(_) => "INVALID_OPTIONS".to_string(),
        }
    }

    /// HTTP-like status reported alongside the code. Zero when no status applies.
    pub fn status(&self) -> u16 {
        match self {
            DriveError::MissingToken
            | DriveError::InvalidToken
            | DriveError::InvalidIdFormat { .. }
            | DriveError::MissingArgument { .. }
            | DriveError::InvalidOptions(_) => 400,
            DriveError::NotInitialized => 401,
            DriveError::Http { status, .. } => *status,
            DriveError::UnknownMethod(_) => 501,
            DriveError::RequestFailed(_) | DriveError::Parse(_) => 0,
        }
    }

    /// Convert into the `{code, message, status}` shape handed to callers.
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.code(),
            message: self.to_string(),
            status: self.status(),
        }
    }
}

/// Error shape returned across the method-call surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub status: u16,
}

impl From<DriveError> for ErrorPayload {
    fn from(err: DriveError) -> Self {
        err.to_payload()
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// "mimeType" -> "MIME_TYPE"
fn screaming_snake(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for (i, ch) in camel.chars().enumerate() {
        if ch.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(ch.to_ascii_uppercase());
    }
    out
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;
