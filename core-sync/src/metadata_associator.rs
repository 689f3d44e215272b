//! # Sidecar Metadata
//!
//! A file tagged `_copy` (`Brochure_copy.txt`) carries metadata for the
//! sibling file with the same base name (`Brochure.pdf`). The associator
//! downloads each sidecar, parses it and merges the result into the target's
//! metadata map. A second pass promotes well-known keys:
//!
//! - `title`, else `displayName`, replaces the display name
//! - `description` fills the remote description when it is unset
//!
//! Sidecar problems never fail the run: a missing target, a failed download or
//! empty content skips that sidecar with a warning, and unparseable content
//! becomes `{ "description": <content> }`.

use crate::config::MetadataFormat;
use crate::error::SyncError;
use bridge_traits::StorageProvider;
use core_hierarchy::names::strip_extension;
use core_hierarchy::{Hierarchy, NodeId, SuffixTag};
use core_runtime::ComponentLogger;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

const COPY_MARKER: &str = "_copy";

/// A `key:` line with nothing after the colon opens a YAML block.
static YAML_BLOCK_KEY: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[\w-]+:[ \t]*\r?\n").ok());

/// Counters reported by one association pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssociationStats {
    /// Files carrying the `copy` suffix
    pub sidecars_found: usize,
    /// Sidecars whose content reached a target
    pub merged: usize,
    /// Sidecars dropped with a warning
    pub skipped: usize,
}

pub struct MetadataAssociator {
    provider: Arc<dyn StorageProvider>,
    format: MetadataFormat,
    fetch_timeout: Duration,
    logger: ComponentLogger,
}

impl MetadataAssociator {
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        format: MetadataFormat,
        fetch_timeout: Duration,
        logger: ComponentLogger,
    ) -> Self {
        Self {
            provider,
            format,
            fetch_timeout,
            logger,
        }
    }

    /// Merge every sidecar into its target, then apply the special keys.
    pub async fn associate(&self, hierarchy: &mut Hierarchy) -> AssociationStats {
        let mut stats = AssociationStats::default();

        let sidecars: Vec<NodeId> = hierarchy
            .pre_order()
            .into_iter()
            .filter(|id| {
                hierarchy
                    .get(*id)
                    .is_some_and(|item| item.is_file() && item.has_suffix(SuffixTag::Copy))
            })
            .collect();
        stats.sidecars_found = sidecars.len();

        for sidecar in sidecars {
            if self.merge_sidecar(hierarchy, sidecar).await {
                stats.merged += 1;
            } else {
                stats.skipped += 1;
            }
        }

        apply_special_metadata(hierarchy);

        self.logger.debug_with(
            "Metadata association finished",
            &[
                ("sidecars", stats.sidecars_found.to_string()),
                ("merged", stats.merged.to_string()),
                ("skipped", stats.skipped.to_string()),
            ],
        );
        stats
    }

    async fn merge_sidecar(&self, hierarchy: &mut Hierarchy, sidecar: NodeId) -> bool {
        let Some(item) = hierarchy.get(sidecar) else {
            return false;
        };
        let sidecar_id = item.id.clone();
        let sidecar_name = item.name.clone();

        let Some(target) = find_target(hierarchy, sidecar) else {
            self.logger.warn_with(
                "No file matches metadata sidecar",
                &[("sidecar", sidecar_name)],
            );
            return false;
        };

        let content = match self.fetch_content(&sidecar_id).await {
            Ok(content) if !content.trim().is_empty() => content,
            Ok(_) => {
                self.logger
                    .warn_with("Metadata sidecar is empty", &[("sidecar", sidecar_name)]);
                return false;
            }
            Err(error) => {
                self.logger.warn_with(
                    "Failed to fetch metadata sidecar",
                    &[("sidecar", sidecar_name), ("error", error.to_string())],
                );
                return false;
            }
        };

        let parsed = parse_metadata(&content, self.format);
        if let Some(item) = hierarchy.get_mut(target) {
            item.metadata.extend(parsed);
        }
        true
    }

    async fn fetch_content(&self, file_id: &str) -> crate::error::Result<String> {
        match tokio::time::timeout(self.fetch_timeout, self.provider.get_file_content(file_id)).await {
            Ok(result) => result.map_err(SyncError::from),
            Err(_) => Err(SyncError::Timeout(self.fetch_timeout.as_millis() as u64)),
        }
    }
}

/// Base name a sidecar points at: `_copy` and the extension removed.
pub fn sidecar_base_name(name: &str) -> &str {
    if let Some(without_marker) = name.strip_suffix(COPY_MARKER) {
        return strip_extension(without_marker);
    }
    let stem = strip_extension(name);
    stem.strip_suffix(COPY_MARKER).unwrap_or(stem)
}

/// Sibling file in the same parent whose extension-stripped name matches.
fn find_target(hierarchy: &Hierarchy, sidecar: NodeId) -> Option<NodeId> {
    let item = hierarchy.get(sidecar)?;
    let base = sidecar_base_name(&item.name);
    let parent = item.parent()?;

    hierarchy.children(parent).iter().copied().find(|candidate| {
        *candidate != sidecar
            && hierarchy
                .get(*candidate)
                .is_some_and(|other| other.is_file() && strip_extension(&other.name) == base)
    })
}

/// Parse sidecar content; content that fails to parse becomes a description.
pub fn parse_metadata(content: &str, format: MetadataFormat) -> Map<String, Value> {
    let format = match format {
        MetadataFormat::Auto => sniff_format(content),
        explicit => explicit,
    };

    let parsed = match format {
        MetadataFormat::Json => parse_json(content),
        MetadataFormat::Yaml => parse_yaml(content),
        MetadataFormat::Text | MetadataFormat::Auto => parse_key_values(content),
    };

    parsed.unwrap_or_else(|| {
        let mut fallback = Map::new();
        fallback.insert(
            "description".to_string(),
            Value::String(content.trim().to_string()),
        );
        fallback
    })
}

/// JSON if it opens with `{`, YAML if a line is a bare `key:`, else text.
pub fn sniff_format(content: &str) -> MetadataFormat {
    if content.trim_start().starts_with('{') {
        return MetadataFormat::Json;
    }
    let has_block_key = YAML_BLOCK_KEY
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(content));
    if has_block_key {
        MetadataFormat::Yaml
    } else {
        MetadataFormat::Text
    }
}

fn parse_json(content: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(content).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn parse_yaml(content: &str) -> Option<Map<String, Value>> {
    let document: serde_yaml::Value = serde_yaml::from_str(content).ok()?;
    match serde_json::to_value(document).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// `key: value` per line; lines without a key are ignored.
fn parse_key_values(content: &str) -> Option<Map<String, Value>> {
    let map: Map<String, Value> = content
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            let key = key.trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                return None;
            }
            Some((key.to_string(), Value::String(value.trim().to_string())))
        })
        .collect();

    (!map.is_empty()).then_some(map)
}

fn string_value<'a>(metadata: &'a std::collections::BTreeMap<String, Value>, key: &str) -> Option<&'a str> {
    metadata
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Promote `title`/`displayName` and `description` on every visible item.
pub fn apply_special_metadata(hierarchy: &mut Hierarchy) {
    for id in hierarchy.pre_order() {
        let Some(item) = hierarchy.get_mut(id) else {
            continue;
        };
        if item.metadata.is_empty() {
            continue;
        }

        let title = string_value(&item.metadata, "title")
            .or_else(|| string_value(&item.metadata, "displayName"))
            .map(str::to_string);
        if let Some(title) = title {
            item.display_name = title;
        }

        let has_description = item
            .remote
            .description
            .as_deref()
            .is_some_and(|description| !description.is_empty());
        if !has_description {
            if let Some(description) = string_value(&item.metadata, "description") {
                item.remote.description = Some(description.to_string());
            }
        }
    }
}
