//! Shared fakes for core-sync integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::{error::Result, BridgeError, FixedClock, RemoteItem, StorageProvider};
use chrono::{DateTime, TimeZone, Utc};
use core_runtime::ComponentLogger;
use core_sync::db::create_in_memory_pool;
use core_sync::{SqliteRouteRepository, SyncConfig, SyncService};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

// ============================================================================
// In-memory remote tree
// ============================================================================

#[derive(Default)]
struct TreeState {
    folders: HashMap<String, RemoteItem>,
    listings: HashMap<String, Vec<RemoteItem>>,
    contents: HashMap<String, String>,
    failing: HashSet<String>,
}

/// Remote storage backed by maps; folders can be switched to fail.
#[derive(Default)]
pub struct InMemoryDrive {
    state: Mutex<TreeState>,
}

impl InMemoryDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_folder(&self, parent: Option<&str>, id: &str, name: &str) -> &Self {
        let mut item = RemoteItem::folder(id, name);
        if let Some(parent) = parent {
            item = item.with_parent(parent);
        }
        let mut state = self.state.lock().unwrap();
        state.folders.insert(id.to_string(), item.clone());
        state.listings.entry(id.to_string()).or_default();
        if let Some(parent) = parent {
            state.listings.entry(parent.to_string()).or_default().push(item);
        }
        self
    }

    pub fn add_file(&self, parent: &str, id: &str, name: &str, content: &str) -> &Self {
        let item = RemoteItem::file(id, name, "text/plain").with_parent(parent);
        let mut state = self.state.lock().unwrap();
        state.listings.entry(parent.to_string()).or_default().push(item);
        state.contents.insert(id.to_string(), content.to_string());
        self
    }

    /// Make every call touching `id` fail with a provider error.
    pub fn fail_on(&self, id: &str) {
        self.state.lock().unwrap().failing.insert(id.to_string());
    }

    fn check(&self, id: &str) -> Result<()> {
        if self.state.lock().unwrap().failing.contains(id) {
            return Err(BridgeError::OperationFailed(format!("HTTP 503 error for {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for InMemoryDrive {
    async fn get_folder(&self, folder_id: &str) -> Result<RemoteItem> {
        self.check(folder_id)?;
        self.state
            .lock()
            .unwrap()
            .folders
            .get(folder_id)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(folder_id.to_string()))
    }

    async fn get_folder_contents(&self, folder_id: &str) -> Result<Vec<RemoteItem>> {
        self.check(folder_id)?;
        self.state
            .lock()
            .unwrap()
            .listings
            .get(folder_id)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(folder_id.to_string()))
    }

    async fn get_file_content(&self, file_id: &str) -> Result<String> {
        self.check(file_id)?;
        self.state
            .lock()
            .unwrap()
            .contents
            .get(file_id)
            .cloned()
            .ok_or_else(|| BridgeError::NotFound(file_id.to_string()))
    }
}

// ============================================================================
// Service wiring
// ============================================================================

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

pub struct Harness {
    pub drive: Arc<InMemoryDrive>,
    pub clock: Arc<FixedClock>,
    pub repository: Arc<SqliteRouteRepository>,
    pub service: Arc<SyncService>,
}

impl Harness {
    pub fn clock_now(&self) -> DateTime<Utc> {
        bridge_traits::Clock::now(self.clock.as_ref())
    }
}

pub async fn harness(drive: InMemoryDrive, config: SyncConfig) -> Harness {
    let drive = Arc::new(drive);
    let clock = Arc::new(FixedClock::new(start_time()));
    let repository = Arc::new(SqliteRouteRepository::new(
        create_in_memory_pool().await.unwrap(),
    ));
    let service = Arc::new(SyncService::new(
        drive.clone(),
        repository.clone(),
        clock.clone(),
        config,
        ComponentLogger::new("sync_service"),
    ));

    Harness {
        drive,
        clock,
        repository,
        service,
    }
}

/// A small publishing site with tabs, previews and a sidecar.
pub fn publishing_site() -> InMemoryDrive {
    let drive = InMemoryDrive::new();
    drive
        .add_folder(None, "site", "Website")
        .add_folder(Some("site"), "menu", "01_tabs_Menu")
        .add_folder(Some("menu"), "home", "01_tab_Home")
        .add_file("home", "welcome", "welcome.md", "# Welcome")
        .add_folder(Some("site"), "docs", "02_Docs")
        .add_file("docs", "report", "report.pdf", "")
        .add_file("docs", "report-p1", "report-P1.pdf", "")
        .add_file("docs", "report-copy", "report_copy.txt", "title: Annual Report\ndescription: Figures for 2023")
        .add_file("site", "draft", "ideas_hidden.md", "")
        .add_folder(None, "media", "Media")
        .add_file("media", "report-p2", "report-P2.jpg", "");
    drive
}
