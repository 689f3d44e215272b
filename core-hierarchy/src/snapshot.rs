//! # Snapshot Serialization
//!
//! The persisted form of a hierarchy is a plain nested JSON document: an
//! ordered list of root items, each carrying its children and, for files, its
//! attached previews. No arena ids leak into the document, so a snapshot can
//! be rebuilt into an equivalent [`Hierarchy`] by any later load.
//!
//! Previews record the remote id of the folder they were listed in
//! (`folderId`), so a preview grouped across folders keeps that folder as its
//! parent after a reload.

use crate::error::{HierarchyError, Result};
use crate::model::{FileDetails, FolderDetails, Hierarchy, HierarchyItem, ItemKind, NodeId, RemoteMetadata};
use crate::tags::{PrefixTag, SuffixTag};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    File,
    Folder,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Serialized form of one [`HierarchyItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotItem {
    pub id: String,
    pub name: String,
    pub original_name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub depth: u32,
    pub order: u32,
    #[serde(default)]
    pub prefix_tags: Vec<PrefixTag>,
    #[serde(default)]
    pub suffix_tags: Vec<SuffixTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub parent_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5_checksum: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    #[serde(default)]
    pub children: Vec<SnapshotItem>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub max_depth_reached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preview_items: Vec<SnapshotItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_preview_of: Option<String>,
    /// Remote id of the folder a preview was listed in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
}

impl Hierarchy {
    /// Serializable copy of every root tree, previews nested under principals.
    pub fn to_snapshot(&self) -> Vec<SnapshotItem> {
        self.roots()
            .iter()
            .filter_map(|id| self.snapshot_item(*id))
            .collect()
    }

    fn snapshot_item(&self, id: NodeId) -> Option<SnapshotItem> {
        let item = self.get(id)?;
        let remote = &item.remote;

        let mut snapshot = SnapshotItem {
            id: item.id.clone(),
            name: item.name.clone(),
            original_name: item.original_name.clone(),
            display_name: item.display_name.clone(),
            item_type: ItemType::Folder,
            depth: item.depth,
            order: item.order,
            prefix_tags: item.prefix_tags.clone(),
            suffix_tags: item.suffix_tags.clone(),
            description: remote.description.clone(),
            mime_type: remote.mime_type.clone(),
            parent_ids: remote.parent_ids.clone(),
            created_at: remote.created_at,
            modified_at: remote.modified_at,
            size: remote.size,
            md5_checksum: remote.md5_checksum.clone(),
            metadata: item.metadata.clone(),
            children: Vec::new(),
            max_depth_reached: false,
            preview_pattern: None,
            base_name: None,
            preview_items: Vec::new(),
            is_preview_of: None,
            folder_id: None,
        };

        match &item.kind {
            ItemKind::Folder(details) => {
                snapshot.max_depth_reached = details.max_depth_reached;
                snapshot.children = details
                    .children
                    .iter()
                    .filter_map(|child| self.snapshot_item(*child))
                    .collect();
            }
            ItemKind::File(details) => {
                snapshot.item_type = ItemType::File;
                snapshot.preview_pattern = details.preview_pattern.clone();
                snapshot.base_name = details.base_name.clone();
                snapshot.is_preview_of = details.is_preview_of.clone();
                if details.is_preview_of.is_some() {
                    snapshot.folder_id = item
                        .parent()
                        .and_then(|parent| self.get(parent))
                        .map(|folder| folder.id.clone());
                }
                snapshot.preview_items = details
                    .preview_items
                    .iter()
                    .filter_map(|preview| self.snapshot_item(*preview))
                    .collect();
            }
        }

        Some(snapshot)
    }

    /// Rebuild a hierarchy from its serialized form.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::InvalidSnapshot`] when the document breaks a
    /// structural rule: a file with children, a folder with preview fields, or
    /// an item that both has previews and is a preview.
    pub fn from_snapshot(roots: &[SnapshotItem]) -> Result<Self> {
        let mut hierarchy = Hierarchy::new();
        let mut preview_folders = Vec::new();
        for root in roots {
            let item = restore_item(root)?;
            let id = hierarchy.add_root(item);
            hierarchy.restore_nested(id, root, &mut preview_folders)?;
        }

        // Folders may appear after the principal, so links are resolved last
        for (preview, folder_id) in preview_folders {
            let folder = hierarchy
                .find(&folder_id)
                .filter(|id| hierarchy.get(*id).is_some_and(HierarchyItem::is_folder));
            if let Some(folder) = folder {
                hierarchy.relink_detached(preview, folder);
            }
        }
        Ok(hierarchy)
    }

    fn restore_nested(
        &mut self,
        id: NodeId,
        snapshot: &SnapshotItem,
        preview_folders: &mut Vec<(NodeId, String)>,
    ) -> Result<()> {
        for child in &snapshot.children {
            let child_id = self.add_child(id, restore_item(child)?)?;
            self.restore_nested(child_id, child, preview_folders)?;
        }

        if snapshot.preview_items.is_empty() {
            return Ok(());
        }

        let parent = self.get(id).and_then(HierarchyItem::parent);
        let mut previews = Vec::with_capacity(snapshot.preview_items.len());
        for preview in &snapshot.preview_items {
            let preview_id = self.add_detached(restore_item(preview)?, parent);
            self.restore_nested(preview_id, preview, preview_folders)?;
            if let Some(folder_id) = &preview.folder_id {
                preview_folders.push((preview_id, folder_id.clone()));
            }
            previews.push(preview_id);
        }

        if let Some(details) = self.get_mut(id).and_then(HierarchyItem::file_details_mut) {
            details.preview_items = previews;
        }
        Ok(())
    }
}

fn restore_item(snapshot: &SnapshotItem) -> Result<HierarchyItem> {
    let kind = match snapshot.item_type {
        ItemType::Folder => {
            if !snapshot.preview_items.is_empty() || snapshot.is_preview_of.is_some() {
                return Err(HierarchyError::InvalidSnapshot(format!(
                    "Folder {} carries preview fields",
                    snapshot.id
                )));
            }
            ItemKind::Folder(FolderDetails {
                children: Vec::new(),
                max_depth_reached: snapshot.max_depth_reached,
            })
        }
        ItemType::File => {
            if !snapshot.children.is_empty() {
                return Err(HierarchyError::InvalidSnapshot(format!(
                    "File {} has children",
                    snapshot.id
                )));
            }
            if snapshot.is_preview_of.is_some() && !snapshot.preview_items.is_empty() {
                return Err(HierarchyError::InvalidSnapshot(format!(
                    "File {} is a preview and has previews",
                    snapshot.id
                )));
            }
            ItemKind::File(FileDetails {
                preview_pattern: snapshot.preview_pattern.clone(),
                base_name: snapshot.base_name.clone(),
                preview_items: Vec::new(),
                is_preview_of: snapshot.is_preview_of.clone(),
            })
        }
    };

    let mut item = match kind {
        ItemKind::Folder(_) => HierarchyItem::folder(&snapshot.id, &snapshot.name, snapshot.depth),
        ItemKind::File(_) => HierarchyItem::file(&snapshot.id, &snapshot.name, snapshot.depth),
    };

    // Stored values win over re-derived ones; metadata may have changed them
    item.kind = kind;
    item.original_name = snapshot.original_name.clone();
    item.display_name = snapshot.display_name.clone();
    item.order = snapshot.order;
    item.prefix_tags = snapshot.prefix_tags.clone();
    item.suffix_tags = snapshot.suffix_tags.clone();
    item.metadata = snapshot.metadata.clone();
    item.remote = RemoteMetadata {
        description: snapshot.description.clone(),
        mime_type: snapshot.mime_type.clone(),
        parent_ids: snapshot.parent_ids.clone(),
        created_at: snapshot.created_at,
        modified_at: snapshot.modified_at,
        size: snapshot.size,
        md5_checksum: snapshot.md5_checksum.clone(),
    };
    Ok(item)
}

/// Serialize a snapshot to its stored JSON text.
pub fn to_json(snapshot: &[SnapshotItem]) -> Result<String> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Parse stored JSON text; blank text is an empty snapshot.
pub fn from_json(json: &str) -> Result<Vec<SnapshotItem>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_snapshot() -> Vec<SnapshotItem> {
        let document = json!([{
            "id": "root",
            "name": "Site",
            "originalName": "Site",
            "displayName": "Site",
            "type": "folder",
            "depth": 0,
            "order": 0,
            "children": [{
                "id": "doc",
                "name": "01_report.pdf",
                "originalName": "01_report.pdf",
                "displayName": "Quarterly Report",
                "type": "file",
                "depth": 1,
                "order": 1,
                "prefixTags": ["order"],
                "mimeType": "application/pdf",
                "metadata": {"title": "Quarterly Report"},
                "baseName": "01_report.pdf",
                "previewItems": [{
                    "id": "p1",
                    "name": "01_report-P1.png",
                    "originalName": "01_report-P1.png",
                    "displayName": "01_report-P1.png",
                    "type": "file",
                    "depth": 1,
                    "order": 1,
                    "prefixTags": ["order"],
                    "previewPattern": "P1",
                    "baseName": "01_report.png",
                    "isPreviewOf": "doc",
                    "folderId": "root"
                }]
            }]
        }]);
        serde_json::from_value(document).unwrap()
    }

    #[test]
    fn test_snapshot_round_trip_through_hierarchy() {
        let snapshot = sample_snapshot();

        let hierarchy = Hierarchy::from_snapshot(&snapshot).unwrap();

        assert_eq!(hierarchy.len(), 3);
        assert_eq!(hierarchy.to_snapshot(), snapshot);
    }

    #[test]
    fn test_previews_are_detached_after_restore() {
        let hierarchy = Hierarchy::from_snapshot(&sample_snapshot()).unwrap();
        let root = hierarchy.roots()[0];

        assert_eq!(hierarchy.children(root).len(), 1);
        let doc = hierarchy.get(hierarchy.find("doc").unwrap()).unwrap();
        assert_eq!(doc.display_name, "Quarterly Report");
        assert!(doc.has_previews());
        assert!(hierarchy.get(hierarchy.find("p1").unwrap()).unwrap().is_preview());
    }

    #[test]
    fn test_preview_keeps_its_listed_folder() {
        let mut snapshot = sample_snapshot();
        let mut media = snapshot[0].clone();
        media.id = "media".to_string();
        media.name = "Media".to_string();
        media.original_name = "Media".to_string();
        media.display_name = "Media".to_string();
        media.children.clear();
        snapshot.push(media);
        snapshot[0].children[0].preview_items[0].folder_id = Some("media".to_string());

        let hierarchy = Hierarchy::from_snapshot(&snapshot).unwrap();

        let p1 = hierarchy.get(hierarchy.find("p1").unwrap()).unwrap();
        assert_eq!(p1.parent(), hierarchy.find("media"));
        assert!(hierarchy.children(hierarchy.find("media").unwrap()).is_empty());
        assert_eq!(hierarchy.to_snapshot(), snapshot);
    }

    #[test]
    fn test_file_with_children_is_rejected() {
        let mut snapshot = sample_snapshot();
        let child = snapshot[0].children[0].clone();
        snapshot[0].children[0].children.push(child);

        let result = Hierarchy::from_snapshot(&snapshot);
        assert!(matches!(result, Err(HierarchyError::InvalidSnapshot(_))));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = to_json(&sample_snapshot()).unwrap();
        assert!(json.contains(r#""type":"folder""#));
        assert!(json.contains(r#""isPreviewOf":"doc""#));
        assert!(json.contains(r#""prefixTags":["order"]"#));
        assert!(!json.contains("maxDepthReached"));
    }

    #[test]
    fn test_blank_json_is_empty_snapshot() {
        assert!(from_json("").unwrap().is_empty());
        assert!(from_json("[]").unwrap().is_empty());
        assert!(matches!(from_json("{"), Err(HierarchyError::Serialization(_))));
    }
}
