//! # Sync Service
//!
//! One full pipeline run for a route:
//!
//! ```text
//! load route → mark attempt → build forest → associate sidecars
//!     → group previews → save snapshot → validate → log outcome
//! ```
//!
//! Provider and persistence failures abort the run, leave the stored snapshot
//! untouched and are recorded as a failed [`SyncLogRecord`]. Validation
//! findings never block a save.

use crate::builder::{BuildStats, HierarchyBuilder};
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::metadata_associator::{AssociationStats, MetadataAssociator};
use crate::repository::RouteRepository;
use crate::route::{RouteId, SnapshotTimestamps, SyncLogRecord, SyncRoute};
use bridge_traits::{Clock, StorageProvider};
use chrono::{DateTime, Utc};
use core_hierarchy::snapshot::to_json;
use core_hierarchy::{GroupingStats, PreviewGrouper, StructureValidator, ValidationReport};
use core_runtime::ComponentLogger;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Result of a successful route sync.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Route as stored after the save
    pub route: SyncRoute,
    pub processing_time_ms: u64,
    /// Serialized snapshot size in bytes
    pub payload_size: u64,
    pub validation: ValidationReport,
    pub build: BuildStats,
    pub association: AssociationStats,
    pub grouping: GroupingStats,
}

pub struct SyncService {
    repository: Arc<dyn RouteRepository>,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
    builder: HierarchyBuilder,
    associator: MetadataAssociator,
    grouper: PreviewGrouper,
    validator: StructureValidator,
    logger: ComponentLogger,
}

impl SyncService {
    /// Wire the pipeline stages; every stage logs under its own component.
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        repository: Arc<dyn RouteRepository>,
        clock: Arc<dyn Clock>,
        config: SyncConfig,
        logger: ComponentLogger,
    ) -> Self {
        let builder = HierarchyBuilder::new(
            provider.clone(),
            config.clone(),
            logger.for_component("hierarchy_builder"),
        );
        let associator = MetadataAssociator::new(
            provider,
            config.metadata_format,
            config.fetch_timeout,
            logger.for_component("metadata_associator"),
        );

        Self {
            repository,
            clock,
            builder,
            associator,
            grouper: PreviewGrouper::new(logger.for_component("preview_grouper")),
            validator: StructureValidator::new(logger.for_component("structure_validator")),
            logger: logger.for_component("sync_service"),
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<dyn RouteRepository> {
        &self.repository
    }

    /// Create and store a route that is first due 24 hours from now.
    pub async fn create_route(&self, id: RouteId, root_folder_ids: Vec<String>) -> Result<SyncRoute> {
        let route = SyncRoute::new(id, root_folder_ids, self.clock.now());
        route.validate()?;
        self.repository.insert_route(&route).await?;

        self.logger.info_with(
            "Sync route created",
            &[
                ("route_id", route.id.to_string()),
                ("roots", route.root_folder_ids.len().to_string()),
            ],
        );
        Ok(route)
    }

    /// Run the pipeline for one route.
    ///
    /// # Returns
    ///
    /// The stored route with its new snapshot, plus counters from each stage.
    ///
    /// # Errors
    ///
    /// - [`SyncError::RouteNotFound`] if the route does not exist
    /// - [`SyncError::InvalidRoute`] if it has no usable root folders
    /// - provider errors ([`SyncError::RemoteNotFound`], [`SyncError::Provider`],
    ///   [`SyncError::Timeout`]) from the build
    /// - [`SyncError::Database`] if the snapshot cannot be saved
    ///
    /// A failed log record is appended in every error case.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let outcome = service.sync_route(&RouteId::new("site")?).await?;
    /// println!("v{} in {} ms", outcome.route.snapshot_version, outcome.processing_time_ms);
    /// ```
    #[instrument(skip(self), fields(route_id = %route_id))]
    pub async fn sync_route(&self, route_id: &RouteId) -> Result<SyncOutcome> {
        let started = Instant::now();
        let now = self.clock.now();

        match self.run_pipeline(route_id, now, started).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                self.logger.error_with(
                    "Route sync failed",
                    &[
                        ("route_id", route_id.to_string()),
                        ("error", error.to_string()),
                        ("elapsed_ms", elapsed_ms.to_string()),
                    ],
                );

                let record =
                    SyncLogRecord::failure(route_id.clone(), error.to_string(), elapsed_ms, self.clock.now());
                if let Err(log_error) = self.repository.append_log(&record).await {
                    self.logger.warn_with(
                        "Failed to record sync failure",
                        &[("error", log_error.to_string())],
                    );
                }
                Err(error)
            }
        }
    }

    async fn run_pipeline(
        &self,
        route_id: &RouteId,
        now: DateTime<Utc>,
        started: Instant,
    ) -> Result<SyncOutcome> {
        let route = self
            .repository
            .find_route(route_id)
            .await?
            .ok_or_else(|| SyncError::RouteNotFound(route_id.to_string()))?;
        route.validate()?;

        self.repository.mark_sync_attempt(route_id, now).await?;

        let (mut hierarchy, build) = self.builder.build_forest(&route.root_folder_ids).await?;

        let association = if self.config.associate_metadata {
            self.associator.associate(&mut hierarchy).await
        } else {
            AssociationStats::default()
        };

        let grouping = self.grouper.group(&mut hierarchy);

        let snapshot = hierarchy.to_snapshot();
        let payload_size = to_json(&snapshot)?.len() as u64;
        let timestamps = SnapshotTimestamps {
            last_updated: now,
            next_sync_due: now + self.config.sync_interval_chrono(),
        };
        let route = self
            .repository
            .save_route_snapshot(route_id, &snapshot, timestamps)
            .await?;

        let validation = self.validator.validate(&hierarchy);
        if !validation.is_clean() {
            self.logger.warn_with(
                "Synced hierarchy has structure issues",
                &[
                    ("route_id", route_id.to_string()),
                    ("errors", validation.error_count().to_string()),
                    ("warnings", validation.warning_count().to_string()),
                ],
            );
        }

        let processing_time_ms = started.elapsed().as_millis() as u64;
        let record = SyncLogRecord::success(
            route_id.clone(),
            payload_size,
            processing_time_ms,
            self.clock.now(),
        );
        // Snapshot is already saved; the run stays a success
        if let Err(log_error) = self.repository.append_log(&record).await {
            self.logger.warn_with(
                "Failed to record sync success",
                &[
                    ("route_id", route_id.to_string()),
                    ("error", log_error.to_string()),
                ],
            );
        }

        self.logger.info_with(
            "Route synced",
            &[
                ("route_id", route_id.to_string()),
                ("version", route.snapshot_version.to_string()),
                ("items", build.item_count.to_string()),
                ("payload_bytes", payload_size.to_string()),
                ("elapsed_ms", processing_time_ms.to_string()),
            ],
        );

        Ok(SyncOutcome {
            route,
            processing_time_ms,
            payload_size,
            validation,
            build,
            association,
            grouping,
        })
    }

    /// Most recent log records of a route, newest first.
    pub async fn route_history(&self, route_id: &RouteId, limit: u32) -> Result<Vec<SyncLogRecord>> {
        self.repository.list_logs(route_id, limit).await
    }
}
