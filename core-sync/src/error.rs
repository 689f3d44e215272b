use bridge_traits::BridgeError;
use core_hierarchy::HierarchyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Sync route {0} not found")]
    RouteNotFound(String),

    #[error("Invalid sync route {route_id}: {reason}")]
    InvalidRoute { route_id: String, reason: String },

    #[error("Remote item not found: {0}")]
    RemoteNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Remote call timed out after {0} ms")]
    Timeout(u64),

    #[error("Invalid sync configuration: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),
}

impl From<BridgeError> for SyncError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::NotFound(resource) => SyncError::RemoteNotFound(resource),
            other => SyncError::Provider(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(error: serde_json::Error) -> Self {
        SyncError::Serialization(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
