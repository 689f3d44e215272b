//! # Preview Grouping
//!
//! Files named `<base>-P<n>.<ext>` are previews of the file sharing their
//! base name. Grouping runs over the whole forest, so a preview may live in a
//! different folder than its principal. After grouping, previews are reachable
//! only through the principal's `preview_items` list.

use crate::model::{Hierarchy, NodeId};
use crate::names::strip_extension;
use crate::preview::detect_preview;
use core_runtime::ComponentLogger;
use std::collections::HashMap;

/// Counters reported by one grouping pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Files visited in the visible tree
    pub files_scanned: usize,
    /// Buckets that produced a principal with previews
    pub groups_formed: usize,
    /// Previews attached across all groups
    pub previews_attached: usize,
}

pub struct PreviewGrouper {
    logger: ComponentLogger,
}

impl PreviewGrouper {
    pub fn new(logger: ComponentLogger) -> Self {
        Self { logger }
    }

    /// Attach preview files to their principals and hide them from the tree.
    ///
    /// Running the grouper again on grouped data changes nothing: previews
    /// are no longer visible, so every remaining bucket has a single member.
    pub fn group(&self, hierarchy: &mut Hierarchy) -> GroupingStats {
        let mut stats = GroupingStats::default();
        let buckets = self.annotate_and_bucket(hierarchy, &mut stats);

        for (base, members) in buckets {
            if members.len() < 2 {
                continue;
            }
            stats.previews_attached += self.attach_bucket(hierarchy, &base, &members);
            stats.groups_formed += 1;
        }

        self.remove_previews_from_tree(hierarchy);

        self.logger.debug_with(
            "Preview grouping finished",
            &[
                ("files_scanned", stats.files_scanned.to_string()),
                ("groups_formed", stats.groups_formed.to_string()),
                ("previews_attached", stats.previews_attached.to_string()),
            ],
        );
        stats
    }

    /// Record the preview match on every visible file and bucket files by
    /// extension-stripped base name, keeping first-seen order.
    fn annotate_and_bucket(
        &self,
        hierarchy: &mut Hierarchy,
        stats: &mut GroupingStats,
    ) -> Vec<(String, Vec<NodeId>)> {
        let mut buckets: Vec<(String, Vec<NodeId>)> = Vec::new();
        let mut bucket_index: HashMap<String, usize> = HashMap::new();

        for id in hierarchy.pre_order() {
            let Some(item) = hierarchy.get_mut(id) else {
                continue;
            };
            let found = detect_preview(&item.name);
            let Some(details) = item.file_details_mut() else {
                continue;
            };
            stats.files_scanned += 1;

            details.preview_pattern = found.is_preview.then(|| found.pattern.clone());
            let key = strip_extension(&found.base_name).to_string();
            details.base_name = Some(found.base_name);

            match bucket_index.get(&key) {
                Some(&index) => buckets[index].1.push(id),
                None => {
                    bucket_index.insert(key.clone(), buckets.len());
                    buckets.push((key, vec![id]));
                }
            }
        }
        buckets
    }

    /// Attach every non-principal member of a bucket; returns how many.
    fn attach_bucket(&self, hierarchy: &mut Hierarchy, base: &str, members: &[NodeId]) -> usize {
        let is_preview = |id: &NodeId| {
            hierarchy
                .get(*id)
                .and_then(|item| item.file_details())
                .is_some_and(|details| details.preview_pattern.is_some())
        };

        let plain: Vec<NodeId> = members.iter().copied().filter(|id| !is_preview(id)).collect();
        let principal = match plain.as_slice() {
            [only] => *only,
            _ => members[0],
        };

        if plain.len() > 1 {
            self.logger.warn_with(
                "Several non-preview files share a base name; attaching them to the first",
                &[("base_name", base.to_string())],
            );
        }

        let mut attached: Vec<NodeId> = members
            .iter()
            .copied()
            .filter(|id| *id != principal)
            .collect();
        // Stable: unnumbered members keep their order after the numbered ones
        attached.sort_by_key(|id| {
            let number = hierarchy
                .get(*id)
                .and_then(|item| detect_preview(&item.name).number);
            (number.is_none(), number)
        });

        let Some(principal_id) = hierarchy.get(principal).map(|item| item.id.clone()) else {
            return 0;
        };

        for id in &attached {
            if let Some(details) = hierarchy.get_mut(*id).and_then(|item| item.file_details_mut()) {
                details.is_preview_of = Some(principal_id.clone());
                details.preview_items.clear();
            }
        }

        if let Some(details) = hierarchy
            .get_mut(principal)
            .and_then(|item| item.file_details_mut())
        {
            details.is_preview_of = None;
            details.preview_items = attached.clone();
        }

        attached.len()
    }

    /// Drop previews from their parents' children; folders are always kept.
    fn remove_previews_from_tree(&self, hierarchy: &mut Hierarchy) {
        let folders: Vec<NodeId> = hierarchy
            .pre_order()
            .into_iter()
            .filter(|id| hierarchy.get(*id).is_some_and(|item| item.is_folder()))
            .collect();

        for folder in folders {
            hierarchy.retain_children(folder, |child| !child.is_preview() || child.has_previews());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HierarchyItem;

    fn grouper() -> PreviewGrouper {
        PreviewGrouper::new(ComponentLogger::new("preview_grouper"))
    }

    fn child_names(hierarchy: &Hierarchy, id: NodeId) -> Vec<String> {
        hierarchy
            .children(id)
            .iter()
            .map(|child| hierarchy.get(*child).unwrap().name.clone())
            .collect()
    }

    fn preview_names(hierarchy: &Hierarchy, remote_id: &str) -> Vec<String> {
        let principal = hierarchy.get(hierarchy.find(remote_id).unwrap()).unwrap();
        principal
            .file_details()
            .unwrap()
            .preview_items
            .iter()
            .map(|id| hierarchy.get(*id).unwrap().name.clone())
            .collect()
    }

    #[test]
    fn test_previews_across_folders_attach_to_principal() {
        let mut hierarchy = Hierarchy::new();
        let root = hierarchy.add_root(HierarchyItem::folder("root", "Site", 0));
        let a = hierarchy
            .add_child(root, HierarchyItem::folder("a", "A", 1))
            .unwrap();
        let b = hierarchy
            .add_child(root, HierarchyItem::folder("b", "B", 1))
            .unwrap();
        hierarchy
            .add_child(a, HierarchyItem::file("p2", "report-P2.jpg", 2))
            .unwrap();
        hierarchy
            .add_child(a, HierarchyItem::file("main", "report.pdf", 2))
            .unwrap();
        hierarchy
            .add_child(b, HierarchyItem::file("p1", "report-P1.pdf", 2))
            .unwrap();

        let stats = grouper().group(&mut hierarchy);

        assert_eq!(stats.groups_formed, 1);
        assert_eq!(stats.previews_attached, 2);
        assert_eq!(preview_names(&hierarchy, "main"), vec!["report-P1.pdf", "report-P2.jpg"]);
        assert_eq!(child_names(&hierarchy, a), vec!["report.pdf"]);
        assert!(child_names(&hierarchy, b).is_empty());

        let p1 = hierarchy.get(hierarchy.find("p1").unwrap()).unwrap();
        let details = p1.file_details().unwrap();
        assert_eq!(details.is_preview_of.as_deref(), Some("main"));
        assert_eq!(details.preview_pattern.as_deref(), Some("P1"));
        assert_eq!(details.base_name.as_deref(), Some("report.pdf"));
    }

    #[test]
    fn test_regrouping_is_a_no_op() {
        let mut hierarchy = Hierarchy::new();
        let root = hierarchy.add_root(HierarchyItem::folder("root", "Site", 0));
        for (id, name) in [("main", "deck.pdf"), ("p1", "deck-P1.png"), ("other", "notes.txt")] {
            hierarchy
                .add_child(root, HierarchyItem::file(id, name, 1))
                .unwrap();
        }

        grouper().group(&mut hierarchy);
        let once = hierarchy.clone();
        let stats = grouper().group(&mut hierarchy);

        assert_eq!(stats.groups_formed, 0);
        assert_eq!(hierarchy, once);
    }

    #[test]
    fn test_previews_without_principal_use_first_member() {
        let mut hierarchy = Hierarchy::new();
        let root = hierarchy.add_root(HierarchyItem::folder("root", "Site", 0));
        for (id, name) in [("p3", "tour-P3.jpg"), ("p1", "tour-P1.jpg")] {
            hierarchy
                .add_child(root, HierarchyItem::file(id, name, 1))
                .unwrap();
        }

        grouper().group(&mut hierarchy);

        // The first member becomes the principal and stays visible
        assert_eq!(child_names(&hierarchy, root), vec!["tour-P3.jpg"]);
        assert_eq!(preview_names(&hierarchy, "p3"), vec!["tour-P1.jpg"]);
    }

    #[test]
    fn test_single_files_are_annotated_only() {
        let mut hierarchy = Hierarchy::new();
        let root = hierarchy.add_root(HierarchyItem::folder("root", "Site", 0));
        hierarchy
            .add_child(root, HierarchyItem::file("solo", "solo-P4.png", 1))
            .unwrap();

        let stats = grouper().group(&mut hierarchy);

        assert_eq!(stats.files_scanned, 1);
        assert_eq!(stats.groups_formed, 0);
        let item = hierarchy.get(hierarchy.find("solo").unwrap()).unwrap();
        assert_eq!(item.file_details().unwrap().preview_pattern.as_deref(), Some("P4"));
        assert_eq!(child_names(&hierarchy, root), vec!["solo-P4.png"]);
    }
}
