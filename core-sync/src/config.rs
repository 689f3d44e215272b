//! Sync pipeline configuration.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How sidecar (`_copy`) content is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataFormat {
    /// Sniff the content shape
    #[default]
    Auto,
    Json,
    Yaml,
    /// `key: value` lines
    Text,
}

impl MetadataFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataFormat::Auto => "auto",
            MetadataFormat::Json => "json",
            MetadataFormat::Yaml => "yaml",
            MetadataFormat::Text => "text",
        }
    }
}

impl fmt::Display for MetadataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataFormat {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(MetadataFormat::Auto),
            "json" => Ok(MetadataFormat::Json),
            "yaml" | "yml" => Ok(MetadataFormat::Yaml),
            "text" | "txt" => Ok(MetadataFormat::Text),
            other => Err(SyncError::Config(format!("Unknown metadata format: {}", other))),
        }
    }
}

/// Sync pipeline configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Deepest level that is listed; folders at this depth keep no children
    pub max_depth: u32,

    /// Keep items whose name ends in `_hidden`
    pub include_hidden: bool,

    /// Parser used for sidecar content
    pub metadata_format: MetadataFormat,

    /// Run the sidecar association pass
    pub associate_metadata: bool,

    /// Delay between successful syncs of one route
    pub sync_interval: Duration,

    /// Upper bound for a single provider call
    pub fetch_timeout: Duration,

    /// Sibling folders listed concurrently during a build
    pub max_concurrent_fetches: usize,

    /// How often the scheduler looks for due routes
    pub scheduler_tick: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            include_hidden: false,
            metadata_format: MetadataFormat::Auto,
            associate_metadata: true,
            sync_interval: Duration::from_secs(24 * 60 * 60),
            fetch_timeout: Duration::from_secs(30),
            max_concurrent_fetches: 4,
            scheduler_tick: Duration::from_secs(60),
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_fetches == 0 {
            return Err(SyncError::Config(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(SyncError::Config("fetch_timeout must be positive".to_string()));
        }
        if self.sync_interval.is_zero() {
            return Err(SyncError::Config("sync_interval must be positive".to_string()));
        }
        if self.scheduler_tick.is_zero() {
            return Err(SyncError::Config("scheduler_tick must be positive".to_string()));
        }
        Ok(())
    }

    /// Sync interval as a chrono duration for timestamp arithmetic.
    pub fn sync_interval_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.sync_interval).unwrap_or_else(|_| chrono::Duration::days(1))
    }
}
