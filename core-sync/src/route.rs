//! # Sync Routes
//!
//! A route binds an identifier to one or more remote root folders and holds
//! the last synchronized snapshot of that forest. Routes are created by the
//! host, mutated only by the sync service and never deleted by the core.
//!
//! Every sync run leaves one [`SyncLogRecord`] behind, successful or not.

use crate::error::{Result, SyncError};
use chrono::{DateTime, Utc};
use core_hierarchy::SnapshotItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a sync route, chosen by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Wrap a host identifier; blank identifiers are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(SyncError::InvalidRoute {
                route_id: id,
                reason: "route id must not be blank".to_string(),
            });
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RouteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Delay before a freshly created route is first due.
pub fn initial_sync_delay() -> chrono::Duration {
    chrono::Duration::hours(24)
}

/// A persisted sync route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRoute {
    pub id: RouteId,
    /// Remote folders whose trees form the snapshot, in output order
    pub root_folder_ids: Vec<String>,
    /// Inactive routes are never picked up by the scheduler
    pub active: bool,
    /// Last successfully built forest
    pub snapshot: Vec<SnapshotItem>,
    /// Incremented on every successful save
    pub snapshot_version: u32,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_sync_attempt: Option<DateTime<Utc>>,
    pub next_sync_due: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SyncRoute {
    /// New active route with an empty snapshot, first due 24 hours after `now`.
    pub fn new(id: RouteId, root_folder_ids: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            root_folder_ids,
            active: true,
            snapshot: Vec::new(),
            snapshot_version: 0,
            last_updated: None,
            last_sync_attempt: None,
            next_sync_due: now + initial_sync_delay(),
            created_at: now,
        }
    }

    /// Whether the scheduler should run this route at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.active && self.next_sync_due <= now
    }

    /// Reject routes a sync run cannot process.
    pub fn validate(&self) -> Result<()> {
        if self.root_folder_ids.is_empty() {
            return Err(SyncError::InvalidRoute {
                route_id: self.id.to_string(),
                reason: "no root folders configured".to_string(),
            });
        }
        if let Some(blank) = self.root_folder_ids.iter().position(|id| id.trim().is_empty()) {
            return Err(SyncError::InvalidRoute {
                route_id: self.id.to_string(),
                reason: format!("root folder #{} is blank", blank),
            });
        }
        Ok(())
    }
}

/// Timestamps written together with a new snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotTimestamps {
    pub last_updated: DateTime<Utc>,
    pub next_sync_due: DateTime<Utc>,
}

/// Operation label used in sync log records.
pub const SYNC_OPERATION: &str = "sync";

/// One audit entry per sync run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLogRecord {
    pub id: Uuid,
    pub route_id: RouteId,
    pub operation: String,
    pub success: bool,
    pub error_message: Option<String>,
    /// Serialized snapshot size in bytes
    pub payload_size: Option<u64>,
    pub processing_time_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl SyncLogRecord {
    pub fn success(
        route_id: RouteId,
        payload_size: u64,
        processing_time_ms: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            route_id,
            operation: SYNC_OPERATION.to_string(),
            success: true,
            error_message: None,
            payload_size: Some(payload_size),
            processing_time_ms: Some(processing_time_ms),
            created_at: now,
        }
    }

    pub fn failure(
        route_id: RouteId,
        error_message: impl Into<String>,
        processing_time_ms: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            route_id,
            operation: SYNC_OPERATION.to_string(),
            success: false,
            error_message: Some(error_message.into()),
            payload_size: None,
            processing_time_ms: Some(processing_time_ms),
            created_at: now,
        }
    }
}
