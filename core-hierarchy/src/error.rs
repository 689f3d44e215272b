use thiserror::Error;

#[derive(Error, Debug)]
pub enum HierarchyError {
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Item {0} is not a folder")]
    NotAFolder(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HierarchyError>;
