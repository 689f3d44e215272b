use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Sync error: {0}")]
    Sync(#[from] core_sync::SyncError),
}

impl CoreError {
    /// Whether the failure means the requested route does not exist.
    pub fn is_route_not_found(&self) -> bool {
        matches!(self, CoreError::Sync(core_sync::SyncError::RouteNotFound(_)))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
