//! Host-facing behavior of the publishing core façade.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{BridgeError, FixedClock, LogEntry, LoggerSink, RemoteItem, StorageProvider};
use chrono::{TimeZone, Utc};
use core_service::{CoreDependencies, PublishingCore};
use core_sync::db::create_in_memory_pool;
use core_sync::{SqliteRouteRepository, SyncConfig};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One folder with a page and its preview.
struct SingleFolder;

#[async_trait]
impl StorageProvider for SingleFolder {
    async fn get_folder(&self, folder_id: &str) -> BridgeResult<RemoteItem> {
        match folder_id {
            "root" => Ok(RemoteItem::folder("root", "Website")),
            other => Err(BridgeError::NotFound(other.to_string())),
        }
    }

    async fn get_folder_contents(&self, folder_id: &str) -> BridgeResult<Vec<RemoteItem>> {
        match folder_id {
            "root" => Ok(vec![
                RemoteItem::file("deck-p1", "deck-P1.png", "image/png"),
                RemoteItem::file("deck", "deck.pdf", "application/pdf"),
            ]),
            other => Err(BridgeError::NotFound(other.to_string())),
        }
    }

    async fn get_file_content(&self, file_id: &str) -> BridgeResult<String> {
        Err(BridgeError::NotFound(file_id.to_string()))
    }
}

#[derive(Default)]
struct CollectingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for CollectingSink {
    async fn log(&self, entry: LogEntry) -> BridgeResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

async fn core_with(config: SyncConfig) -> (PublishingCore, Arc<FixedClock>, Arc<CollectingSink>) {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()));
    let sink = Arc::new(CollectingSink::default());
    let repository = Arc::new(SqliteRouteRepository::new(create_in_memory_pool().await.unwrap()));

    let deps = CoreDependencies::new(Arc::new(SingleFolder), repository, clock.clone())
        .with_logger_sink(sink.clone());
    let core = PublishingCore::with_dependencies(deps, config).unwrap();
    (core, clock, sink)
}

#[tokio::test]
async fn sync_route_returns_host_summary() {
    let (core, _, sink) = core_with(SyncConfig::default()).await;
    core.create_route("site", vec!["root".to_string()]).await.unwrap();

    let result = core.sync_route("site").await.unwrap();

    assert_eq!(result.route.snapshot_version, 1);
    assert_eq!(result.item_count, 3);
    assert_eq!(result.previews_attached, 1);
    assert!(result.payload_size > 0);

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("processingTimeMs").is_some());
    assert_eq!(json["route"]["snapshot"][0]["children"][0]["id"], "deck");

    let history = core.route_history("site", 5).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].success);

    // Give spawned sink deliveries a chance to run
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!sink.entries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_route_surfaces_not_found() {
    let (core, _, _) = core_with(SyncConfig::default()).await;

    let error = core.sync_route("nope").await.unwrap_err();

    assert!(error.is_route_not_found());
    assert!(core.get_route("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn due_routes_are_synced_in_batch() {
    let (core, clock, _) = core_with(SyncConfig::default()).await;
    core.create_route("site", vec!["root".to_string()]).await.unwrap();
    core.create_route("broken", vec!["missing".to_string()]).await.unwrap();

    assert_eq!(core.sync_due_routes().await.total(), 0);

    clock.advance(chrono::Duration::hours(24));
    let summary = core.sync_due_routes().await;

    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.failed_count, 1);
    let broken = core.get_route("broken").await.unwrap().unwrap();
    assert!(broken.snapshot.is_empty());
}

#[tokio::test]
async fn invalid_sync_config_is_rejected() {
    let repository = Arc::new(SqliteRouteRepository::new(create_in_memory_pool().await.unwrap()));
    let deps = CoreDependencies::new(
        Arc::new(SingleFolder),
        repository,
        Arc::new(FixedClock::new(Utc::now())),
    );
    let config = SyncConfig {
        max_concurrent_fetches: 0,
        ..SyncConfig::default()
    };

    assert!(PublishingCore::with_dependencies(deps, config).is_err());
}

#[tokio::test]
async fn spawned_scheduler_stops_on_cancel() {
    let config = SyncConfig {
        scheduler_tick: Duration::from_millis(10),
        ..SyncConfig::default()
    };
    let (core, clock, _) = core_with(config).await;
    core.create_route("site", vec!["root".to_string()]).await.unwrap();
    clock.advance(chrono::Duration::hours(25));

    let token = CancellationToken::new();
    let handle = core.spawn_scheduler(token.clone());
    tokio::time::sleep(Duration::from_millis(100)).await;
    token.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    let route = core.get_route("site").await.unwrap().unwrap();
    assert_eq!(route.snapshot_version, 1);
}
