//! # Core Sync
//!
//! I/O side of the publishing pipeline: fetching remote trees, merging
//! sidecar metadata, persisting route snapshots and scheduling syncs.
//!
//! ## Components
//!
//! - [`HierarchyBuilder`] - Fetches a remote folder tree into a sorted hierarchy
//! - [`MetadataAssociator`] - Merges `_copy` sidecar files into their targets
//! - [`SyncService`] - One full sync run for a route
//! - [`SyncScheduler`] - Periodic batches over due routes
//! - [`RouteRepository`] - Route and sync log persistence (SQLite via `sqlx`)
//!
//! The pure passes (tags, previews, validation, snapshots) live in
//! `core-hierarchy`.

pub mod builder;
pub mod config;
pub mod db;
pub mod error;
pub mod metadata_associator;
pub mod repository;
pub mod route;
pub mod scheduler;
pub mod service;

pub use builder::{BuildStats, HierarchyBuilder};
pub use config::{MetadataFormat, SyncConfig};
pub use error::{Result, SyncError};
pub use metadata_associator::{AssociationStats, MetadataAssociator};
pub use repository::{RouteRepository, SqliteRouteRepository};
pub use route::{RouteId, SnapshotTimestamps, SyncLogRecord, SyncRoute};
pub use scheduler::{SchedulerSummary, SyncScheduler};
pub use service::{SyncOutcome, SyncService};
