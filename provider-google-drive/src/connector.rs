//! Google Drive API connector implementation
//!
//! Implements the `StorageProvider` trait for Google Drive API v3.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use bridge_traits::storage::{RemoteItem, StorageProvider, FOLDER_MIME_TYPE};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::GoogleDriveError;
use crate::types::{DriveFile, FilesListResponse, GOOGLE_DOC_MIME_TYPE};

/// Google Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Maximum results per page (Google Drive API limit)
const MAX_PAGE_SIZE: u32 = 1000;

/// Fields to request for file resources
const FILE_FIELDS: &str =
    "id,name,mimeType,description,size,createdTime,modifiedTime,md5Checksum,parents,trashed";

/// Attempts per request before giving up on 429/5xx responses
const MAX_ATTEMPTS: u32 = 3;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The connector owns retries; the HTTP client makes one attempt per call.
fn single_attempt() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        ..RetryPolicy::default()
    }
}

/// Google Drive API connector
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::GoogleDriveConnector;
/// use bridge_traits::storage::StorageProvider;
///
/// let connector = GoogleDriveConnector::new(http_client, access_token);
/// let children = connector.get_folder_contents("1AbC...").await?;
/// ```
pub struct GoogleDriveConnector {
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token with `drive.readonly` scope
    access_token: String,

    base_url: String,
}

impl GoogleDriveConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: String) -> Self {
        Self {
            http_client,
            access_token,
            base_url: DRIVE_API_BASE.to_string(),
        }
    }

    /// Point the connector at another API root, e.g. a local emulator.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Parse RFC 3339 timestamp to Unix timestamp
    fn parse_timestamp(rfc3339: Option<&str>) -> Option<i64> {
        DateTime::parse_from_rfc3339(rfc3339?)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).timestamp())
    }

    fn convert_file(drive_file: DriveFile) -> RemoteItem {
        let mut metadata = HashMap::new();
        metadata.insert("trashed".to_string(), drive_file.trashed.to_string());

        RemoteItem {
            is_folder: drive_file.mime_type == FOLDER_MIME_TYPE,
            created_at: Self::parse_timestamp(drive_file.created_time.as_deref()),
            modified_at: Self::parse_timestamp(drive_file.modified_time.as_deref()),
            size: drive_file.size.and_then(|s| s.parse().ok()),
            id: drive_file.id,
            name: drive_file.name,
            mime_type: Some(drive_file.mime_type),
            description: drive_file.description,
            parent_ids: drive_file.parents,
            md5_checksum: drive_file.md5_checksum,
            metadata,
        }
    }

    /// GET `url`, retrying rate limits and server errors with backoff.
    ///
    /// `resource` names the file or folder in not-found errors.
    #[instrument(skip(self), fields(url = %url))]
    async fn get_with_retry(&self, url: String, resource: &str) -> Result<HttpResponse> {
        let mut attempt = 0;

        loop {
            let request = HttpRequest::new(HttpMethod::Get, url.clone())
                .bearer_token(&self.access_token)
                .header("Accept", "application/json")
                .timeout(REQUEST_TIMEOUT);

            match self.http_client.execute_with_retry(request, single_attempt()).await {
                Ok(response) if response.is_success() => {
                    debug!(status = response.status, "API request succeeded");
                    return Ok(response);
                }
                Ok(response) if response.status == 429 || response.is_server_error() => {
                    attempt += 1;
                    if attempt >= MAX_ATTEMPTS {
                        warn!(status = response.status, attempts = attempt, "API request failed");
                        let error = if response.status == 429 {
                            GoogleDriveError::RateLimitExceeded { attempts: attempt }
                        } else {
                            GoogleDriveError::from_status(response.status, resource, &response.body)
                        };
                        return Err(error.into());
                    }
                    self.backoff(attempt, &format!("status {}", response.status)).await;
                }
                Ok(response) => {
                    debug!(status = response.status, "API request rejected");
                    return Err(
                        GoogleDriveError::from_status(response.status, resource, &response.body).into(),
                    );
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_ATTEMPTS {
                        warn!(error = %e, attempts = attempt, "API request failed");
                        return Err(e);
                    }
                    self.backoff(attempt, &e.to_string()).await;
                }
            }
        }
    }

    async fn backoff(&self, attempt: u32, reason: &str) {
        let backoff_ms = 100u64 * 2u64.pow(attempt);
        warn!(
            "API request failed (attempt {}/{}): {}, retrying in {}ms",
            attempt, MAX_ATTEMPTS, reason, backoff_ms
        );
        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
    }

    async fn get_file(&self, file_id: &str) -> Result<DriveFile> {
        let url = format!(
            "{}/files/{}?fields={}",
            self.base_url,
            urlencoding::encode(file_id),
            FILE_FIELDS
        );
        let response = self.get_with_retry(url, file_id).await?;

        serde_json::from_slice(&response.body).map_err(|e| {
            GoogleDriveError::ParseError(format!("Failed to parse file metadata: {}", e)).into()
        })
    }
}

#[async_trait]
impl StorageProvider for GoogleDriveConnector {
    #[instrument(skip(self))]
    async fn get_folder(&self, folder_id: &str) -> Result<RemoteItem> {
        let folder = self.get_file(folder_id).await?;
        Ok(Self::convert_file(folder))
    }

    #[instrument(skip(self))]
    async fn get_folder_contents(&self, folder_id: &str) -> Result<Vec<RemoteItem>> {
        let query = format!("'{}' in parents and trashed=false", folder_id.replace('\'', "\\'"));
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/files?q={}&pageSize={}&fields=nextPageToken,incompleteSearch,files({})",
                self.base_url,
                urlencoding::encode(&query),
                MAX_PAGE_SIZE,
                FILE_FIELDS
            );
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let response = self.get_with_retry(url, folder_id).await?;
            let page: FilesListResponse = serde_json::from_slice(&response.body).map_err(|e| {
                GoogleDriveError::ParseError(format!("Failed to parse files list response: {}", e))
            })?;

            if page.incomplete_search {
                warn!(folder_id, "Google Drive reported an incomplete search");
            }
            items.extend(page.files.into_iter().map(Self::convert_file));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(folder_id, count = items.len(), "Listed folder");
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn get_file_content(&self, file_id: &str) -> Result<String> {
        let file = self.get_file(file_id).await?;
        let encoded_id = urlencoding::encode(file_id);

        let url = if file.mime_type == GOOGLE_DOC_MIME_TYPE {
            format!(
                "{}/files/{}/export?mimeType={}",
                self.base_url,
                encoded_id,
                urlencoding::encode("text/plain")
            )
        } else {
            format!("{}/files/{}?alt=media", self.base_url, encoded_id)
        };

        let response = self.get_with_retry(url, file_id).await?;
        Ok(String::from_utf8_lossy(&response.body).into_owned())
    }
}
