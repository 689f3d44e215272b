//! # Core Configuration Module
//!
//! Provides configuration management for the publishing core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the host-provided bridges and settings the sync engine
//! needs. It enforces fail-fast validation so a misconfigured host learns about
//! a missing capability at startup rather than during the first sync.
//!
//! ## Required Settings
//!
//! - `database_path` - SQLite file holding routes, snapshots and sync logs
//! - `drive_access_token` - OAuth bearer token for the Google Drive API
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//! - `LoggerSink` - Host log forwarding (optional)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .database_path("/var/lib/publisher/routes.db")
//!     .drive_access_token(std::env::var("DRIVE_TOKEN")?)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! Without the `desktop-shims` feature an `HttpClient` must be injected;
//! building without one fails with [`Error::CapabilityMissing`] and a message
//! describing how to provide it.

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, LoggerSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default number of pooled SQLite connections.
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 5;

/// Core configuration for the publishing core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Maximum number of pooled database connections
    pub max_db_connections: u32,

    /// OAuth bearer token used by the Google Drive provider
    pub drive_access_token: String,

    /// HTTP client used by remote storage providers
    pub http_client: Arc<dyn HttpClient>,

    /// Optional host logger receiving component log entries
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("database_path", &self.database_path)
            .field("max_db_connections", &self.max_db_connections)
            .field("drive_access_token", &"[REDACTED]")
            .field("http_client", &"HttpClient { ... }")
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Database path is not empty
    /// - Drive access token is not blank
    /// - Connection pool size is within 1..=64
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        if self.drive_access_token.trim().is_empty() {
            return Err(Error::Config(
                "Drive access token cannot be empty".to_string(),
            ));
        }

        if self.max_db_connections == 0 || self.max_db_connections > 64 {
            return Err(Error::Config(format!(
                "Database connection pool size must be between 1 and 64, got {}",
                self.max_db_connections
            )));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required to reach the remote storage provider. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Other hosts: inject an implementation with .http_client()."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new()
        .map_err(|e| Error::Internal(format!("Failed to create default HTTP client: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Builder for constructing a [`CoreConfig`] with validation.
#[derive(Default)]
pub struct CoreConfigBuilder {
    database_path: Option<PathBuf>,
    max_db_connections: Option<u32>,
    drive_access_token: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
}

impl CoreConfigBuilder {
    /// Sets the SQLite database path.
    pub fn database_path(mut self, path: impl AsRef<Path>) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the maximum number of pooled connections (default 5).
    pub fn max_db_connections(mut self, connections: u32) -> Self {
        self.max_db_connections = Some(connections);
        self
    }

    /// Sets the Google Drive OAuth bearer token.
    pub fn drive_access_token(mut self, token: impl Into<String>) -> Self {
        self.drive_access_token = Some(token.into());
        self
    }

    /// Injects an HTTP client, overriding any platform default.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Injects a host logger sink.
    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - A required setting is missing
    /// - No `HttpClient` is injected and no platform default exists
    /// - Configuration values are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let database_path = self.database_path.ok_or_else(|| {
            Error::Config("Database path is required. Use .database_path() to set it.".to_string())
        })?;

        let drive_access_token = self.drive_access_token.ok_or_else(|| {
            Error::Config(
                "Drive access token is required. Use .drive_access_token() to set it.".to_string(),
            )
        })?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let config = CoreConfig {
            database_path,
            max_db_connections: self.max_db_connections.unwrap_or(DEFAULT_MAX_DB_CONNECTIONS),
            drive_access_token,
            http_client,
            logger_sink: self.logger_sink,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{ConsoleLogger, HttpRequest, HttpResponse, RetryPolicy};

    struct StubHttpClient;

    #[async_trait]
    impl HttpClient for StubHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Ok(HttpResponse {
                status: 200,
                headers: Default::default(),
                body: Default::default(),
            })
        }

        async fn execute_with_retry(
            &self,
            request: HttpRequest,
            _policy: RetryPolicy,
        ) -> BridgeResult<HttpResponse> {
            self.execute(request).await
        }
    }

    fn builder_with_client() -> CoreConfigBuilder {
        CoreConfig::builder().http_client(Arc::new(StubHttpClient))
    }

    #[test]
    fn test_builder_requires_database_path() {
        let result = builder_with_client().drive_access_token("token").build();

        match result {
            Err(Error::Config(message)) => assert!(message.contains("Database path")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_requires_drive_token() {
        let result = builder_with_client().database_path("routes.db").build();

        match result {
            Err(Error::Config(message)) => assert!(message.contains("Drive access token")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_rejects_blank_token() {
        let result = builder_with_client()
            .database_path("routes.db")
            .drive_access_token("   ")
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_rejects_zero_connections() {
        let result = builder_with_client()
            .database_path("routes.db")
            .drive_access_token("token")
            .max_db_connections(0)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_with_injected_bridges() {
        let config = builder_with_client()
            .database_path("routes.db")
            .drive_access_token("token")
            .logger_sink(Arc::new(ConsoleLogger::default()))
            .build()
            .unwrap();

        assert_eq!(config.database_path, PathBuf::from("routes.db"));
        assert_eq!(config.max_db_connections, DEFAULT_MAX_DB_CONNECTIONS);
        assert!(config.logger_sink.is_some());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = builder_with_client()
            .database_path("routes.db")
            .drive_access_token("ya29.very-secret")
            .build()
            .unwrap();

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_http_client_is_capability_error() {
        let result = CoreConfig::builder()
            .database_path("routes.db")
            .drive_access_token("token")
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, message }) => {
                assert_eq!(capability, "HttpClient");
                assert!(message.contains("desktop-shims"));
            }
            other => panic!("expected missing capability, got {:?}", other),
        }
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_desktop_default_http_client() {
        let config = CoreConfig::builder()
            .database_path("routes.db")
            .drive_access_token("token")
            .build();
        assert!(config.is_ok());
    }
}
