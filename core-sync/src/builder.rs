//! # Hierarchy Builder
//!
//! Fetches a remote folder tree through a [`StorageProvider`] and turns it
//! into a sorted [`Hierarchy`].
//!
//! ## Fetching
//!
//! Each folder is listed once. Subfolders are listed concurrently and
//! results are kept in listing order. One semaphore sized by
//! `SyncConfig::max_concurrent_fetches` is shared by the whole build, so at
//! most that many listings are in flight at any depth. Every provider call runs under `SyncConfig::fetch_timeout`.
//! The first failure aborts the whole build.
//!
//! ## Depth
//!
//! Roots are depth 0. A folder at `max_depth` is not listed: it keeps no
//! children and is flagged `max_depth_reached`.

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use bridge_traits::{RemoteItem, StorageProvider};
use core_hierarchy::names::is_hidden_name;
use core_hierarchy::{Hierarchy, HierarchyItem, NodeId};
use core_runtime::ComponentLogger;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt, TryStreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::instrument;

/// Counters for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub item_count: usize,
    pub file_count: usize,
    pub folder_count: usize,
    /// Deepest depth present in the result
    pub max_depth: u32,
    pub elapsed: Duration,
}

impl BuildStats {
    fn absorb(&mut self, other: BuildStats) {
        self.item_count += other.item_count;
        self.file_count += other.file_count;
        self.folder_count += other.folder_count;
        self.max_depth = self.max_depth.max(other.max_depth);
    }
}

/// A fetched subtree, before it is placed in the arena.
#[derive(Debug)]
struct FetchedNode {
    remote: RemoteItem,
    is_folder: bool,
    depth: u32,
    max_depth_reached: bool,
    children: Vec<FetchedNode>,
}

pub struct HierarchyBuilder {
    provider: Arc<dyn StorageProvider>,
    config: SyncConfig,
    logger: ComponentLogger,
}

impl HierarchyBuilder {
    pub fn new(provider: Arc<dyn StorageProvider>, config: SyncConfig, logger: ComponentLogger) -> Self {
        Self {
            provider,
            config,
            logger,
        }
    }

    /// Build the tree rooted at one remote folder.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::RemoteNotFound`] if the root or any listed folder
    /// is missing, [`SyncError::Timeout`] if a call exceeds the fetch timeout,
    /// and [`SyncError::Provider`] for any other provider failure.
    pub async fn build(&self, root_folder_id: &str) -> Result<(Hierarchy, BuildStats)> {
        self.build_forest(&[root_folder_id.to_string()]).await
    }

    /// Build one tree per root into a shared arena, roots in the given order.
    #[instrument(skip(self), fields(roots = root_folder_ids.len()))]
    pub async fn build_forest(&self, root_folder_ids: &[String]) -> Result<(Hierarchy, BuildStats)> {
        let started = Instant::now();
        let mut hierarchy = Hierarchy::new();
        let mut stats = BuildStats::default();
        let permits = Semaphore::new(self.config.max_concurrent_fetches.max(1));

        for root_id in root_folder_ids {
            let root = self.with_timeout(self.provider.get_folder(root_id)).await?;
            let node = self.fetch_folder(root, 0, &permits).await?;

            let root_stats = insert_tree(&mut hierarchy, None, node)?;
            self.logger.debug_with(
                "Fetched root folder",
                &[
                    ("root_id", root_id.clone()),
                    ("items", root_stats.item_count.to_string()),
                ],
            );
            stats.absorb(root_stats);
        }

        hierarchy.sort_all();
        stats.elapsed = started.elapsed();

        self.logger.info_with(
            "Hierarchy built",
            &[
                ("items", stats.item_count.to_string()),
                ("folders", stats.folder_count.to_string()),
                ("files", stats.file_count.to_string()),
                ("max_depth", stats.max_depth.to_string()),
                ("elapsed_ms", stats.elapsed.as_millis().to_string()),
            ],
        );
        Ok((hierarchy, stats))
    }

    /// List a folder and its descendants.
    fn fetch_folder<'a>(
        &'a self,
        remote: RemoteItem,
        depth: u32,
        permits: &'a Semaphore,
    ) -> BoxFuture<'a, Result<FetchedNode>> {
        async move {
            if depth >= self.config.max_depth {
                return Ok(FetchedNode {
                    remote,
                    is_folder: true,
                    depth,
                    max_depth_reached: true,
                    children: Vec::new(),
                });
            }

            // Held only for the listing call; children acquire their own
            let listing = {
                let _permit = permits
                    .acquire()
                    .await
                    .map_err(|e| SyncError::Provider(e.to_string()))?;
                self.with_timeout(self.provider.get_folder_contents(&remote.id))
                    .await?
            };

            let visible: Vec<RemoteItem> = listing
                .into_iter()
                .filter(|child| self.config.include_hidden || !is_hidden_name(&child.name))
                .collect();

            let children = futures::stream::iter(visible)
                .map(|child| self.fetch_child(child, depth + 1, permits))
                .buffered(self.config.max_concurrent_fetches.max(1))
                .try_collect::<Vec<_>>()
                .await?;

            Ok(FetchedNode {
                remote,
                is_folder: true,
                depth,
                max_depth_reached: false,
                children,
            })
        }
        .boxed()
    }

    fn fetch_child<'a>(
        &'a self,
        child: RemoteItem,
        depth: u32,
        permits: &'a Semaphore,
    ) -> BoxFuture<'a, Result<FetchedNode>> {
        if self.provider.is_folder(&child) {
            return self.fetch_folder(child, depth, permits);
        }
        futures::future::ready(Ok(FetchedNode {
            remote: child,
            is_folder: false,
            depth,
            max_depth_reached: false,
            children: Vec::new(),
        }))
        .boxed()
    }

    async fn with_timeout<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = bridge_traits::error::Result<T>>,
    {
        let limit = self.config.fetch_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result.map_err(SyncError::from),
            Err(_) => {
                self.logger.warn_with(
                    "Remote call timed out",
                    &[("timeout_ms", limit.as_millis().to_string())],
                );
                Err(SyncError::Timeout(limit.as_millis() as u64))
            }
        }
    }
}

/// Place a fetched subtree in the arena; returns its counters.
fn insert_tree(hierarchy: &mut Hierarchy, parent: Option<NodeId>, node: FetchedNode) -> Result<BuildStats> {
    let mut item = HierarchyItem::from_remote(&node.remote, node.is_folder, node.depth);
    if let Some(details) = item.folder_details_mut() {
        details.max_depth_reached = node.max_depth_reached;
    }

    let id = match parent {
        Some(parent) => hierarchy.add_child(parent, item)?,
        None => hierarchy.add_root(item),
    };

    let mut stats = BuildStats {
        item_count: 1,
        file_count: usize::from(!node.is_folder),
        folder_count: usize::from(node.is_folder),
        max_depth: node.depth,
        elapsed: Duration::ZERO,
    };
    for child in node.children {
        stats.absorb(insert_tree(hierarchy, Some(id), child)?);
    }
    Ok(stats)
}
