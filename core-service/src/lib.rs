//! Publishing core façade and bootstrap helpers.
//!
//! This crate wires host-provided bridges (HTTP, remote storage, clock, log
//! sink) and the SQLite route store into the sync pipeline, and exposes the
//! operations a host calls: create a route, sync it now, run due syncs, read
//! history, or start the background scheduler.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{Clock, LoggerSink, StorageProvider, SystemClock};
use core_hierarchy::ValidationReport;
use core_runtime::config::CoreConfig;
use core_runtime::logging::strip_path;
use core_runtime::ComponentLogger;
use core_sync::db::{create_pool, DatabaseConfig};
use core_sync::{
    RouteId, RouteRepository, SchedulerSummary, SqliteRouteRepository, SyncConfig, SyncLogRecord,
    SyncOutcome, SyncRoute, SyncScheduler, SyncService,
};
use provider_google_drive::GoogleDriveConnector;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Aggregated handle to everything the sync pipeline talks to.
pub struct CoreDependencies {
    pub storage: Arc<dyn StorageProvider>,
    pub repository: Arc<dyn RouteRepository>,
    pub clock: Arc<dyn Clock>,
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit handles.
    pub fn new(
        storage: Arc<dyn StorageProvider>,
        repository: Arc<dyn RouteRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            repository,
            clock,
            logger_sink: None,
        }
    }

    pub fn with_logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }
}

/// Summary of one route sync, as returned to hosts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSyncResult {
    pub route: SyncRoute,
    pub processing_time_ms: u64,
    pub payload_size: u64,
    pub item_count: usize,
    pub sidecars_merged: usize,
    pub previews_attached: usize,
    pub validation: ValidationReport,
}

impl From<SyncOutcome> for RouteSyncResult {
    fn from(outcome: SyncOutcome) -> Self {
        Self {
            processing_time_ms: outcome.processing_time_ms,
            payload_size: outcome.payload_size,
            item_count: outcome.build.item_count,
            sidecars_merged: outcome.association.merged,
            previews_attached: outcome.grouping.previews_attached,
            validation: outcome.validation,
            route: outcome.route,
        }
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct PublishingCore {
    service: Arc<SyncService>,
    scheduler: Arc<SyncScheduler>,
    repository: Arc<dyn RouteRepository>,
    logger: ComponentLogger,
}

impl PublishingCore {
    /// Assemble the pipeline from explicit dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Sync`] if `sync_config` is invalid.
    pub fn with_dependencies(deps: CoreDependencies, sync_config: SyncConfig) -> Result<Self> {
        sync_config.validate()?;

        let logger = ComponentLogger::new("publishing_core").with_optional_sink(deps.logger_sink);
        let service = Arc::new(SyncService::new(
            deps.storage,
            deps.repository.clone(),
            deps.clock.clone(),
            sync_config,
            logger.for_component("sync_service"),
        ));
        let scheduler = Arc::new(SyncScheduler::new(
            service.clone(),
            deps.clock,
            logger.for_component("sync_scheduler"),
        ));

        Ok(Self {
            service,
            scheduler,
            repository: deps.repository,
            logger,
        })
    }

    /// Open the route store at `config.database_path` and sync from Google Drive.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the database cannot be
    /// opened and migrated.
    pub async fn bootstrap(config: CoreConfig, sync_config: SyncConfig) -> Result<Self> {
        config.validate()?;

        let database = DatabaseConfig::new(config.database_path.clone())
            .max_connections(config.max_db_connections);
        let pool = create_pool(database).await.map_err(|e| {
            CoreError::InitializationFailed(format!("route store unavailable: {}", e))
        })?;

        let storage = Arc::new(GoogleDriveConnector::new(
            config.http_client.clone(),
            config.drive_access_token.clone(),
        ));
        let mut deps = CoreDependencies::new(
            storage,
            Arc::new(SqliteRouteRepository::new(pool)),
            Arc::new(SystemClock),
        );
        deps.logger_sink = config.logger_sink.clone();

        let core = Self::with_dependencies(deps, sync_config)?;
        let database_path = config.database_path.to_string_lossy();
        core.logger.info_with(
            "Publishing core ready",
            &[("database", strip_path(&database_path).to_string())],
        );
        Ok(core)
    }

    /// Register a route, first due 24 hours from now.
    pub async fn create_route(&self, route_id: &str, root_folder_ids: Vec<String>) -> Result<SyncRoute> {
        let id = RouteId::new(route_id)?;
        Ok(self.service.create_route(id, root_folder_ids).await?)
    }

    pub async fn get_route(&self, route_id: &str) -> Result<Option<SyncRoute>> {
        let id = RouteId::new(route_id)?;
        Ok(self.repository.find_route(&id).await?)
    }

    /// Sync one route now.
    ///
    /// # Errors
    ///
    /// Provider and persistence failures are returned after being logged; the
    /// stored snapshot is left as it was.
    pub async fn sync_route(&self, route_id: &str) -> Result<RouteSyncResult> {
        let id = RouteId::new(route_id)?;
        let outcome = self.service.sync_route(&id).await?;
        Ok(outcome.into())
    }

    /// Sync every due route; never fails as a whole.
    pub async fn sync_due_routes(&self) -> SchedulerSummary {
        self.scheduler.sync_due_routes().await
    }

    /// Most recent sync log records of a route, newest first.
    pub async fn route_history(&self, route_id: &str, limit: u32) -> Result<Vec<SyncLogRecord>> {
        let id = RouteId::new(route_id)?;
        Ok(self.service.route_history(&id, limit).await?)
    }

    /// Run the scheduler on the current tokio runtime until `token` is cancelled.
    pub fn spawn_scheduler(&self, token: CancellationToken) -> JoinHandle<()> {
        let scheduler = self.scheduler.clone();
        tokio::spawn(async move { scheduler.run(token).await })
    }
}
