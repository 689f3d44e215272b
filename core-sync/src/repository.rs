//! # Route Repository
//!
//! Persistence for sync routes and their audit log.
//!
//! The snapshot is stored as JSON text; timestamps are epoch milliseconds.

use crate::error::{Result, SyncError};
use crate::route::{RouteId, SnapshotTimestamps, SyncLogRecord, SyncRoute};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_hierarchy::snapshot::{from_json, to_json};
use core_hierarchy::SnapshotItem;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

/// Storage of sync routes and sync log records
#[async_trait]
pub trait RouteRepository: Send + Sync {
    /// Load a route by id
    async fn find_route(&self, id: &RouteId) -> Result<Option<SyncRoute>>;

    /// Store a new route
    ///
    /// # Errors
    ///
    /// Fails if a route with the same id already exists.
    async fn insert_route(&self, route: &SyncRoute) -> Result<()>;

    /// Record the start of a sync run
    async fn mark_sync_attempt(&self, id: &RouteId, at: DateTime<Utc>) -> Result<()>;

    /// Replace the snapshot, bump its version and return the stored route
    async fn save_route_snapshot(
        &self,
        id: &RouteId,
        snapshot: &[SnapshotItem],
        timestamps: SnapshotTimestamps,
    ) -> Result<SyncRoute>;

    /// Append an audit record
    async fn append_log(&self, record: &SyncLogRecord) -> Result<()>;

    /// Active routes with `next_sync_due <= now`, earliest due first
    async fn list_due_routes(&self, now: DateTime<Utc>) -> Result<Vec<SyncRoute>>;

    /// Most recent log records of a route, newest first
    async fn list_logs(&self, id: &RouteId, limit: u32) -> Result<Vec<SyncLogRecord>>;
}

/// SQLite implementation of [`RouteRepository`]
pub struct SqliteRouteRepository {
    pool: SqlitePool,
}

impl SqliteRouteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(column: &str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| SyncError::Database(format!("Invalid {} timestamp: {}", column, millis)))
}

fn from_optional_millis(column: &str, millis: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    millis.map(|value| from_millis(column, value)).transpose()
}

#[derive(Debug, FromRow)]
struct SyncRouteRow {
    id: String,
    root_folder_ids: String,
    active: bool,
    snapshot: String,
    snapshot_version: i64,
    last_updated: Option<i64>,
    last_sync_attempt: Option<i64>,
    next_sync_due: i64,
    created_at: i64,
}

impl TryFrom<SyncRouteRow> for SyncRoute {
    type Error = SyncError;

    fn try_from(row: SyncRouteRow) -> Result<Self> {
        let root_folder_ids: Vec<String> = serde_json::from_str(&row.root_folder_ids)?;
        let snapshot = from_json(&row.snapshot)?;

        Ok(SyncRoute {
            id: RouteId::new(row.id)?,
            root_folder_ids,
            active: row.active,
            snapshot,
            snapshot_version: u32::try_from(row.snapshot_version).unwrap_or(u32::MAX),
            last_updated: from_optional_millis("last_updated", row.last_updated)?,
            last_sync_attempt: from_optional_millis("last_sync_attempt", row.last_sync_attempt)?,
            next_sync_due: from_millis("next_sync_due", row.next_sync_due)?,
            created_at: from_millis("created_at", row.created_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct SyncLogRow {
    id: String,
    route_id: String,
    operation: String,
    success: bool,
    error_message: Option<String>,
    payload_size: Option<i64>,
    processing_time_ms: Option<i64>,
    created_at: i64,
}

impl TryFrom<SyncLogRow> for SyncLogRecord {
    type Error = SyncError;

    fn try_from(row: SyncLogRow) -> Result<Self> {
        Ok(SyncLogRecord {
            id: Uuid::parse_str(&row.id).map_err(|e| SyncError::Database(e.to_string()))?,
            route_id: RouteId::new(row.route_id)?,
            operation: row.operation,
            success: row.success,
            error_message: row.error_message,
            payload_size: row.payload_size.map(|size| size.max(0) as u64),
            processing_time_ms: row.processing_time_ms.map(|ms| ms.max(0) as u64),
            created_at: from_millis("created_at", row.created_at)?,
        })
    }
}

const ROUTE_COLUMNS: &str = "id, root_folder_ids, active, snapshot, snapshot_version, \
     last_updated, last_sync_attempt, next_sync_due, created_at";

#[async_trait]
impl RouteRepository for SqliteRouteRepository {
    async fn find_route(&self, id: &RouteId) -> Result<Option<SyncRoute>> {
        let row = sqlx::query_as::<_, SyncRouteRow>(&format!(
            "SELECT {} FROM sync_routes WHERE id = ?",
            ROUTE_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SyncError::Database(e.to_string()))?;

        row.map(SyncRoute::try_from).transpose()
    }

    async fn insert_route(&self, route: &SyncRoute) -> Result<()> {
        let root_folder_ids = serde_json::to_string(&route.root_folder_ids)?;
        let snapshot = to_json(&route.snapshot)?;

        sqlx::query(
            r#"
            INSERT INTO sync_routes (
                id, root_folder_ids, active, snapshot, snapshot_version,
                last_updated, last_sync_attempt, next_sync_due, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(route.id.as_str())
        .bind(root_folder_ids)
        .bind(route.active)
        .bind(snapshot)
        .bind(i64::from(route.snapshot_version))
        .bind(route.last_updated.map(to_millis))
        .bind(route.last_sync_attempt.map(to_millis))
        .bind(to_millis(route.next_sync_due))
        .bind(to_millis(route.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| SyncError::Database(e.to_string()))?;

        Ok(())
    }

    async fn mark_sync_attempt(&self, id: &RouteId, at: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query("UPDATE sync_routes SET last_sync_attempt = ? WHERE id = ?")
            .bind(to_millis(at))
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| SyncError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(SyncError::RouteNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn save_route_snapshot(
        &self,
        id: &RouteId,
        snapshot: &[SnapshotItem],
        timestamps: SnapshotTimestamps,
    ) -> Result<SyncRoute> {
        let json = to_json(snapshot)?;

        let result = sqlx::query(
            r#"
            UPDATE sync_routes SET
                snapshot = ?,
                snapshot_version = snapshot_version + 1,
                last_updated = ?,
                next_sync_due = ?
            WHERE id = ?
            "#,
        )
        .bind(json)
        .bind(to_millis(timestamps.last_updated))
        .bind(to_millis(timestamps.next_sync_due))
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| SyncError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(SyncError::RouteNotFound(id.to_string()));
        }

        self.find_route(id)
            .await?
            .ok_or_else(|| SyncError::RouteNotFound(id.to_string()))
    }

    async fn append_log(&self, record: &SyncLogRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sync_logs (
                id, route_id, operation, success, error_message,
                payload_size, processing_time_ms, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.route_id.as_str())
        .bind(&record.operation)
        .bind(record.success)
        .bind(&record.error_message)
        .bind(record.payload_size.map(|size| size as i64))
        .bind(record.processing_time_ms.map(|ms| ms as i64))
        .bind(to_millis(record.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| SyncError::Database(e.to_string()))?;

        Ok(())
    }

    async fn list_due_routes(&self, now: DateTime<Utc>) -> Result<Vec<SyncRoute>> {
        let rows = sqlx::query_as::<_, SyncRouteRow>(&format!(
            "SELECT {} FROM sync_routes WHERE active = 1 AND next_sync_due <= ? \
             ORDER BY next_sync_due ASC, id ASC",
            ROUTE_COLUMNS
        ))
        .bind(to_millis(now))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SyncError::Database(e.to_string()))?;

        rows.into_iter().map(SyncRoute::try_from).collect()
    }

    async fn list_logs(&self, id: &RouteId, limit: u32) -> Result<Vec<SyncLogRecord>> {
        let rows = sqlx::query_as::<_, SyncLogRow>(
            r#"
            SELECT id, route_id, operation, success, error_message,
                   payload_size, processing_time_ms, created_at
            FROM sync_logs
            WHERE route_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(id.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SyncError::Database(e.to_string()))?;

        rows.into_iter().map(SyncLogRecord::try_from).collect()
    }
}
