//! Error types for Google Drive provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Google Drive provider errors
#[derive(Error, Debug)]
pub enum GoogleDriveError {
    /// Token rejected (401) or access denied (403)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// File or folder does not exist or is not visible to the token
    #[error("File not found: {file_id}")]
    FileNotFound { file_id: String },

    /// API request returned an error
    #[error("Google Drive API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Still rate limited after all retries
    #[error("Rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Google Drive operations
pub type Result<T> = std::result::Result<T, GoogleDriveError>;

impl GoogleDriveError {
    /// Classify a non-success HTTP status for `resource`.
    pub fn from_status(status_code: u16, resource: &str, body: &[u8]) -> Self {
        let message = String::from_utf8_lossy(body).to_string();
        match status_code {
            404 => GoogleDriveError::FileNotFound {
                file_id: resource.to_string(),
            },
            401 | 403 => GoogleDriveError::AuthenticationFailed(message),
            _ => GoogleDriveError::ApiError {
                status_code,
                message,
            },
        }
    }
}

impl From<GoogleDriveError> for BridgeError {
    fn from(error: GoogleDriveError) -> Self {
        match error {
            GoogleDriveError::FileNotFound { file_id } => BridgeError::NotFound(file_id),
            GoogleDriveError::BridgeError(e) => e,
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}
