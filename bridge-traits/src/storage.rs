//! Remote Storage Abstractions
//!
//! Provides the platform-agnostic contract the synchronization engine uses to
//! read a hierarchical remote store (folders containing files and folders).
//! The engine only ever reads: listing a folder, reading a folder's own
//! metadata, and downloading the text content of a single file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

/// MIME type used by folder-aware providers to mark directories.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// A single entry returned by a remote storage provider
///
/// Providers convert their native resource representation into this shape.
/// Timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub description: Option<String>,
    pub size: Option<u64>,
    pub created_at: Option<i64>,
    pub modified_at: Option<i64>,
    pub is_folder: bool,
    pub parent_ids: Vec<String>,
    pub md5_checksum: Option<String>,
    /// Provider-specific extra fields
    pub metadata: HashMap<String, String>,
}

impl RemoteItem {
    /// Create a bare folder entry.
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            description: None,
            size: None,
            created_at: None,
            modified_at: None,
            is_folder: true,
            parent_ids: Vec::new(),
            md5_checksum: None,
            metadata: HashMap::new(),
        }
    }

    /// Create a bare file entry.
    pub fn file(
        id: impl Into<String>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: Some(mime_type.into()),
            description: None,
            size: None,
            created_at: None,
            modified_at: None,
            is_folder: false,
            parent_ids: Vec::new(),
            md5_checksum: None,
            metadata: HashMap::new(),
        }
    }

    /// Set the parent folder id.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_ids.push(parent_id.into());
        self
    }
}

/// Remote hierarchical storage trait
///
/// Abstracts read access to a cloud folder tree:
/// - Google Drive: `files.get` / `files.list` with a parent query
/// - Test fakes: in-memory trees
///
/// Implementations should map a missing resource to
/// [`BridgeError::NotFound`](crate::error::BridgeError::NotFound) and every
/// other failure to an opaque error. Retry and backoff belong in the
/// implementation, not in callers.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::StorageProvider;
///
/// async fn count_children(provider: &dyn StorageProvider, id: &str) -> Result<usize> {
///     let children = provider.get_folder_contents(id).await?;
///     Ok(children.len())
/// }
/// ```
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Fetch the metadata of a folder itself
    async fn get_folder(&self, folder_id: &str) -> Result<RemoteItem>;

    /// List the direct children of a folder
    ///
    /// Implementations handle pagination and return the complete listing.
    async fn get_folder_contents(&self, folder_id: &str) -> Result<Vec<RemoteItem>>;

    /// Download the text content of a file
    async fn get_file_content(&self, file_id: &str) -> Result<String>;

    /// Classify a listed item as a folder
    fn is_folder(&self, item: &RemoteItem) -> bool {
        item.is_folder || item.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}
