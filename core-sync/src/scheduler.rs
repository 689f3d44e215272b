//! # Sync Scheduler
//!
//! Runs every due route once per batch. Routes are processed one at a time and
//! a failing route only bumps the failure count; the batch itself never fails.

use crate::route::RouteId;
use crate::service::SyncService;
use bridge_traits::Clock;
use core_runtime::ComponentLogger;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Counts from one scheduler batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerSummary {
    pub success_count: usize,
    pub failed_count: usize,
}

impl SchedulerSummary {
    pub fn total(&self) -> usize {
        self.success_count + self.failed_count
    }
}

pub struct SyncScheduler {
    service: Arc<SyncService>,
    clock: Arc<dyn Clock>,
    logger: ComponentLogger,
}

impl SyncScheduler {
    pub fn new(service: Arc<SyncService>, clock: Arc<dyn Clock>, logger: ComponentLogger) -> Self {
        Self {
            service,
            clock,
            logger,
        }
    }

    /// Sync every active route whose next sync is due.
    ///
    /// A failure to list due routes is logged and reported as an empty batch.
    #[instrument(skip(self))]
    pub async fn sync_due_routes(&self) -> SchedulerSummary {
        let now = self.clock.now();
        let due = match self.service.repository().list_due_routes(now).await {
            Ok(routes) => routes,
            Err(error) => {
                self.logger.error_with(
                    "Failed to list due routes",
                    &[("error", error.to_string())],
                );
                return SchedulerSummary::default();
            }
        };

        let route_ids: Vec<RouteId> = due.into_iter().map(|route| route.id).collect();
        let mut summary = SchedulerSummary::default();

        for route_id in &route_ids {
            match self.service.sync_route(route_id).await {
                Ok(_) => summary.success_count += 1,
                Err(_) => summary.failed_count += 1,
            }
        }

        if summary.total() > 0 {
            self.logger.info_with(
                "Scheduled sync batch finished",
                &[
                    ("succeeded", summary.success_count.to_string()),
                    ("failed", summary.failed_count.to_string()),
                ],
            );
        }
        summary
    }

    /// Run batches every `scheduler_tick` until the token is cancelled.
    ///
    /// The first batch runs immediately. A batch in progress is finished
    /// before cancellation is observed.
    pub async fn run(&self, cancellation: CancellationToken) {
        let tick = self.service.config().scheduler_tick;
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.logger.info_with(
            "Sync scheduler started",
            &[("tick_secs", tick.as_secs().to_string())],
        );

        loop {
            tokio::select! {
                _ = cancellation.cancelled() => break,
                _ = interval.tick() => {
                    self.sync_due_routes().await;
                }
            }
        }

        self.logger.info("Sync scheduler stopped");
    }
}
