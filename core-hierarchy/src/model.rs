//! # Hierarchy Model
//!
//! A synchronized folder tree is stored as an arena: every item lives in one
//! `Vec` and refers to other items by [`NodeId`]. Folders own an ordered list
//! of child ids; files own an ordered list of attached preview ids. Items that
//! were folded into a principal file stay in the arena but are no longer
//! listed as anyone's child, which keeps the visible tree and the preview
//! relation independent of each other.

use crate::error::{HierarchyError, Result};
use crate::sort::compare_items;
use crate::tags::{extract_tags, PrefixTag, SuffixTag};
use bridge_traits::RemoteItem;
use serde_json::Value;
use std::collections::BTreeMap;

/// Index of an item inside a [`Hierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Attributes reported by the remote provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoteMetadata {
    pub description: Option<String>,
    /// Only recorded for files
    pub mime_type: Option<String>,
    pub parent_ids: Vec<String>,
    /// Unix seconds
    pub created_at: Option<i64>,
    /// Unix seconds
    pub modified_at: Option<i64>,
    pub size: Option<u64>,
    pub md5_checksum: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FolderDetails {
    pub children: Vec<NodeId>,
    /// Set when the depth limit stopped the build before listing this folder
    pub max_depth_reached: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileDetails {
    /// `P<n>` label when the name matches the preview pattern
    pub preview_pattern: Option<String>,
    /// Name used to group previews with their principal
    pub base_name: Option<String>,
    /// Attached previews ordered by pattern number
    pub preview_items: Vec<NodeId>,
    /// Remote id of the principal this item is a preview of
    pub is_preview_of: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Folder(FolderDetails),
    File(FileDetails),
}

/// One folder or file of a synchronized tree.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyItem {
    /// Remote identifier
    pub id: String,
    /// Raw name as listed by the provider
    pub name: String,
    /// Raw name at build time, kept when `name`-derived fields are overridden
    pub original_name: String,
    /// Name with tags stripped, or a title promoted from sidecar metadata
    pub display_name: String,
    /// Root items have depth 0
    pub depth: u32,
    /// Value of the numeric name prefix, 0 when absent
    pub order: u32,
    pub prefix_tags: Vec<PrefixTag>,
    pub suffix_tags: Vec<SuffixTag>,
    pub remote: RemoteMetadata,
    pub metadata: BTreeMap<String, Value>,
    pub kind: ItemKind,
    parent: Option<NodeId>,
}

impl HierarchyItem {
    fn new(id: String, name: String, depth: u32, kind: ItemKind) -> Self {
        let tags = extract_tags(&name);
        Self {
            id,
            original_name: name.clone(),
            display_name: tags.display_name,
            name,
            depth,
            order: tags.order.unwrap_or(0),
            prefix_tags: tags.prefix_tags,
            suffix_tags: tags.suffix_tags,
            remote: RemoteMetadata::default(),
            metadata: BTreeMap::new(),
            kind,
            parent: None,
        }
    }

    /// Folder item with tags derived from `name`.
    pub fn folder(id: impl Into<String>, name: impl Into<String>, depth: u32) -> Self {
        Self::new(
            id.into(),
            name.into(),
            depth,
            ItemKind::Folder(FolderDetails::default()),
        )
    }

    /// File item with tags derived from `name`.
    pub fn file(id: impl Into<String>, name: impl Into<String>, depth: u32) -> Self {
        Self::new(
            id.into(),
            name.into(),
            depth,
            ItemKind::File(FileDetails::default()),
        )
    }

    /// Item built from a provider listing entry.
    pub fn from_remote(remote: &RemoteItem, is_folder: bool, depth: u32) -> Self {
        let mut item = if is_folder {
            Self::folder(remote.id.clone(), remote.name.clone(), depth)
        } else {
            Self::file(remote.id.clone(), remote.name.clone(), depth)
        };

        item.remote = RemoteMetadata {
            description: remote.description.clone(),
            mime_type: if is_folder {
                None
            } else {
                remote.mime_type.clone()
            },
            parent_ids: remote.parent_ids.clone(),
            created_at: remote.created_at,
            modified_at: remote.modified_at,
            size: remote.size,
            md5_checksum: remote.md5_checksum.clone(),
        };
        item
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ItemKind::Folder(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, ItemKind::File(_))
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn has_prefix(&self, tag: PrefixTag) -> bool {
        self.prefix_tags.contains(&tag)
    }

    pub fn has_suffix(&self, tag: SuffixTag) -> bool {
        self.suffix_tags.contains(&tag)
    }

    /// Whether the name carried a numeric ordering prefix.
    pub fn has_order(&self) -> bool {
        self.has_prefix(PrefixTag::Order)
    }

    pub fn folder_details(&self) -> Option<&FolderDetails> {
        match &self.kind {
            ItemKind::Folder(details) => Some(details),
            ItemKind::File(_) => None,
        }
    }

    pub fn folder_details_mut(&mut self) -> Option<&mut FolderDetails> {
        match &mut self.kind {
            ItemKind::Folder(details) => Some(details),
            ItemKind::File(_) => None,
        }
    }

    pub fn file_details(&self) -> Option<&FileDetails> {
        match &self.kind {
            ItemKind::File(details) => Some(details),
            ItemKind::Folder(_) => None,
        }
    }

    pub fn file_details_mut(&mut self) -> Option<&mut FileDetails> {
        match &mut self.kind {
            ItemKind::File(details) => Some(details),
            ItemKind::Folder(_) => None,
        }
    }

    /// Child ids; always empty for files.
    pub fn children(&self) -> &[NodeId] {
        self.folder_details()
            .map(|details| details.children.as_slice())
            .unwrap_or_default()
    }

    pub fn is_preview(&self) -> bool {
        self.file_details()
            .is_some_and(|details| details.is_preview_of.is_some())
    }

    pub fn has_previews(&self) -> bool {
        self.file_details()
            .is_some_and(|details| !details.preview_items.is_empty())
    }

    pub fn max_depth_reached(&self) -> bool {
        self.folder_details()
            .is_some_and(|details| details.max_depth_reached)
    }
}

/// Arena holding one or more rooted trees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hierarchy {
    items: Vec<HierarchyItem>,
    roots: Vec<NodeId>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, mut item: HierarchyItem, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.items.len());
        item.parent = parent;
        self.items.push(item);
        id
    }

    /// Append a new root tree.
    pub fn add_root(&mut self, item: HierarchyItem) -> NodeId {
        let id = self.push(item, None);
        self.roots.push(id);
        id
    }

    /// Append `item` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, item: HierarchyItem) -> Result<NodeId> {
        match self.items.get(parent.0) {
            Some(parent_item) if parent_item.is_folder() => {}
            Some(parent_item) => return Err(HierarchyError::NotAFolder(parent_item.id.clone())),
            None => {
                return Err(HierarchyError::InvalidSnapshot(format!(
                    "Unknown parent node {}",
                    parent.0
                )))
            }
        }

        let id = self.push(item, Some(parent));
        if let Some(details) = self.items[parent.0].folder_details_mut() {
            details.children.push(id);
        }
        Ok(id)
    }

    /// Store an item that is reachable only through a principal's preview list.
    pub(crate) fn add_detached(&mut self, item: HierarchyItem, parent: Option<NodeId>) -> NodeId {
        self.push(item, parent)
    }

    /// Point a detached preview at the folder it was listed in.
    pub(crate) fn relink_detached(&mut self, id: NodeId, parent: NodeId) {
        if let Some(item) = self.items.get_mut(id.0) {
            item.parent = Some(parent);
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&HierarchyItem> {
        self.items.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut HierarchyItem> {
        self.items.get_mut(id.0)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of `id`; empty for files and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(HierarchyItem::children).unwrap_or_default()
    }

    /// Number of items in the arena, detached previews included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &HierarchyItem)> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (NodeId(index), item))
    }

    /// First item carrying the given remote id.
    pub fn find(&self, remote_id: &str) -> Option<NodeId> {
        self.items
            .iter()
            .position(|item| item.id == remote_id)
            .map(NodeId)
    }

    /// Ids of the visible tree in pre-order, roots in insertion order.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.items.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// Keep only the children of `id` for which `keep` returns true.
    pub fn retain_children<F>(&mut self, id: NodeId, mut keep: F)
    where
        F: FnMut(&HierarchyItem) -> bool,
    {
        let Some(details) = self.items.get_mut(id.0).and_then(HierarchyItem::folder_details_mut)
        else {
            return;
        };
        let children = std::mem::take(&mut details.children);

        let kept: Vec<NodeId> = children
            .into_iter()
            .filter(|child| self.items.get(child.0).map(&mut keep).unwrap_or(false))
            .collect();

        if let Some(details) = self.items[id.0].folder_details_mut() {
            details.children = kept;
        }
    }

    /// Sort the direct children of `id` with the display ordering.
    pub fn sort_children(&mut self, id: NodeId) {
        let Some(details) = self.items.get_mut(id.0).and_then(HierarchyItem::folder_details_mut)
        else {
            return;
        };
        let mut children = std::mem::take(&mut details.children);

        children.sort_by(|a, b| compare_items(&self.items[a.0], &self.items[b.0]));

        if let Some(details) = self.items[id.0].folder_details_mut() {
            details.children = children;
        }
    }

    /// Sort every folder's children.
    pub fn sort_all(&mut self) {
        for index in 0..self.items.len() {
            self.sort_children(NodeId(index));
        }
    }
}
