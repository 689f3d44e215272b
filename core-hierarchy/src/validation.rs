//! # Structure Validation
//!
//! Read-only checks of the naming conventions over the visible tree. Issues
//! are advisory: the validator never mutates the hierarchy and always visits
//! every item.

use crate::model::{Hierarchy, HierarchyItem, NodeId};
use crate::tags::{PrefixTag, SuffixTag, EXCLUSIVE_PREFIX_PAIRS, EXCLUSIVE_SUFFIX_PAIRS};
use core_runtime::ComponentLogger;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DuplicateTag,
    ExclusiveTags,
    EmptyFolder,
    EmptyTabs,
    TabsWithoutTab,
    StrayTabsChild,
    AccordionWithoutSection,
    ContainerTagOnFile,
    OrphanTab,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: Severity,
    pub kind: IssueKind,
    pub message: String,
    pub item_id: String,
    pub item_name: String,
}

impl ValidationIssue {
    fn new(severity: Severity, kind: IssueKind, item: &HierarchyItem, message: String) -> Self {
        Self {
            severity,
            kind,
            message,
            item_id: item.id.clone(),
            item_name: item.name.clone(),
        }
    }
}

/// Issues found by one validation run, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub struct StructureValidator {
    logger: ComponentLogger,
}

impl StructureValidator {
    pub fn new(logger: ComponentLogger) -> Self {
        Self { logger }
    }

    /// Validate every visible item of the forest.
    pub fn validate(&self, hierarchy: &Hierarchy) -> ValidationReport {
        let mut report = ValidationReport::default();

        for id in hierarchy.pre_order() {
            if let Some(item) = hierarchy.get(id) {
                check_item(hierarchy, id, item, &mut report.issues);
            }
        }

        self.logger.debug_with(
            "Structure validation finished",
            &[
                ("errors", report.error_count().to_string()),
                ("warnings", report.warning_count().to_string()),
            ],
        );
        report
    }
}

fn duplicates<T: Copy + Eq + Hash>(tags: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    tags.iter()
        .copied()
        .filter(|tag| !seen.insert(*tag) && reported.insert(*tag))
        .collect()
}

fn check_item(
    hierarchy: &Hierarchy,
    id: NodeId,
    item: &HierarchyItem,
    issues: &mut Vec<ValidationIssue>,
) {
    for tag in duplicates(&item.prefix_tags) {
        issues.push(ValidationIssue::new(
            Severity::Error,
            IssueKind::DuplicateTag,
            item,
            format!("Duplicate prefix tag '{}' in '{}'", tag, item.name),
        ));
    }
    for tag in duplicates(&item.suffix_tags) {
        issues.push(ValidationIssue::new(
            Severity::Error,
            IssueKind::DuplicateTag,
            item,
            format!("Duplicate suffix tag '{}' in '{}'", tag, item.name),
        ));
    }

    for (a, b) in EXCLUSIVE_PREFIX_PAIRS {
        if item.has_prefix(*a) && item.has_prefix(*b) {
            issues.push(ValidationIssue::new(
                Severity::Error,
                IssueKind::ExclusiveTags,
                item,
                format!("Tags '{}' and '{}' cannot be combined", a, b),
            ));
        }
    }
    for (a, b) in EXCLUSIVE_SUFFIX_PAIRS {
        if item.has_suffix(*a) && item.has_suffix(*b) {
            issues.push(ValidationIssue::new(
                Severity::Error,
                IssueKind::ExclusiveTags,
                item,
                format!("Tags '{}' and '{}' cannot be combined", a, b),
            ));
        }
    }

    if item.is_folder() {
        check_folder(hierarchy, id, item, issues);
    } else {
        for tag in item.prefix_tags.iter().filter(|tag| tag.is_container_only()) {
            issues.push(ValidationIssue::new(
                Severity::Error,
                IssueKind::ContainerTagOnFile,
                item,
                format!("Tag '{}' is only valid on folders", tag),
            ));
        }
    }

    if item.has_prefix(PrefixTag::Tab) {
        let parent_is_tabs = item
            .parent()
            .and_then(|parent| hierarchy.get(parent))
            .map(|parent| parent.has_prefix(PrefixTag::Tabs));
        // Roots have no parent to check
        if parent_is_tabs == Some(false) {
            issues.push(ValidationIssue::new(
                Severity::Error,
                IssueKind::OrphanTab,
                item,
                "Tab item must be placed directly inside a tabs folder".to_string(),
            ));
        }
    }
}

fn check_folder(
    hierarchy: &Hierarchy,
    id: NodeId,
    item: &HierarchyItem,
    issues: &mut Vec<ValidationIssue>,
) {
    let children: Vec<&HierarchyItem> = hierarchy
        .children(id)
        .iter()
        .filter_map(|child| hierarchy.get(*child))
        .collect();

    if children.is_empty() {
        // Unlisted because of the depth limit, not actually empty
        if item.max_depth_reached() {
            return;
        }
        if item.has_prefix(PrefixTag::Tabs) {
            issues.push(ValidationIssue::new(
                Severity::Error,
                IssueKind::EmptyTabs,
                item,
                "Tabs folder has no content".to_string(),
            ));
            return;
        }
        issues.push(ValidationIssue::new(
            Severity::Warning,
            IssueKind::EmptyFolder,
            item,
            "Folder is empty".to_string(),
        ));
    }

    if item.has_prefix(PrefixTag::Tabs) {
        if !children.iter().any(|child| child.has_prefix(PrefixTag::Tab)) {
            issues.push(ValidationIssue::new(
                Severity::Error,
                IssueKind::TabsWithoutTab,
                item,
                "Tabs folder must contain at least one tab item".to_string(),
            ));
        }
        for child in children
            .iter()
            .filter(|child| !child.has_prefix(PrefixTag::Tab) && !child.has_suffix(SuffixTag::Hidden))
        {
            issues.push(ValidationIssue::new(
                Severity::Warning,
                IssueKind::StrayTabsChild,
                item,
                format!("'{}' inside a tabs folder is not a tab", child.name),
            ));
        }
    }

    if item.has_prefix(PrefixTag::Accordion)
        && !children
            .iter()
            .any(|child| child.has_prefix(PrefixTag::Section))
    {
        issues.push(ValidationIssue::new(
            Severity::Error,
            IssueKind::AccordionWithoutSection,
            item,
            "Accordion folder must contain at least one section item".to_string(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> StructureValidator {
        StructureValidator::new(ComponentLogger::new("structure_validator"))
    }

    fn single_root(item: HierarchyItem) -> (Hierarchy, NodeId) {
        let mut hierarchy = Hierarchy::new();
        let root = hierarchy.add_root(item);
        (hierarchy, root)
    }

    #[test]
    fn test_empty_tabs_folder_reports_one_error() {
        let (hierarchy, _) = single_root(HierarchyItem::folder("menu", "tabs_Menu", 0));

        let report = validator().validate(&hierarchy);

        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].item_id, "menu");
        assert_eq!(errors[0].kind, IssueKind::EmptyTabs);
        assert_eq!(report.warning_count(), 0);
    }

    #[test]
    fn test_tabs_with_stray_child_warns() {
        let (mut hierarchy, root) = single_root(HierarchyItem::folder("menu", "tabs_Menu", 0));
        hierarchy
            .add_child(root, HierarchyItem::folder("home", "tab_Home", 1))
            .unwrap();
        hierarchy
            .add_child(root, HierarchyItem::file("notes", "notes.txt", 1))
            .unwrap();
        hierarchy
            .add_child(hierarchy.find("home").unwrap(), HierarchyItem::file("w", "welcome.md", 2))
            .unwrap();

        let report = validator().validate(&hierarchy);

        assert!(!report.has_errors(), "{:?}", report.issues);
        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, IssueKind::StrayTabsChild);
    }

    #[test]
    fn test_hidden_child_of_tabs_is_not_stray() {
        let (mut hierarchy, root) = single_root(HierarchyItem::folder("menu", "tabs_Menu", 0));
        hierarchy
            .add_child(root, HierarchyItem::file("home", "tab_Home.md", 1))
            .unwrap();
        hierarchy
            .add_child(root, HierarchyItem::file("draft", "scratch_hidden.md", 1))
            .unwrap();

        assert!(validator().validate(&hierarchy).is_clean());
    }

    #[test]
    fn test_tabs_without_tab_child() {
        let (mut hierarchy, root) = single_root(HierarchyItem::folder("menu", "tabs_Menu", 0));
        hierarchy
            .add_child(root, HierarchyItem::file("a", "about.md", 1))
            .unwrap();

        let report = validator().validate(&hierarchy);
        let kinds: Vec<IssueKind> = report.issues.iter().map(|issue| issue.kind).collect();
        assert_eq!(kinds, vec![IssueKind::TabsWithoutTab, IssueKind::StrayTabsChild]);
    }

    #[test]
    fn test_duplicate_and_exclusive_tags() {
        let (hierarchy, _) = single_root(HierarchyItem::file("f", "tab_tab_Home_private_public.md", 0));

        let report = validator().validate(&hierarchy);
        let kinds: Vec<IssueKind> = report.issues.iter().map(|issue| issue.kind).collect();

        assert_eq!(kinds, vec![IssueKind::DuplicateTag, IssueKind::ExclusiveTags]);
    }

    #[test]
    fn test_container_tag_on_file() {
        let (hierarchy, _) = single_root(HierarchyItem::file("f", "accordion_FAQ.md", 0));

        let report = validator().validate(&hierarchy);

        assert_eq!(report.error_count(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::ContainerTagOnFile);
    }

    #[test]
    fn test_accordion_without_section() {
        let (mut hierarchy, root) = single_root(HierarchyItem::folder("faq", "accordion_FAQ", 0));
        hierarchy
            .add_child(root, HierarchyItem::file("q", "question.md", 1))
            .unwrap();

        let report = validator().validate(&hierarchy);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::AccordionWithoutSection);
    }

    #[test]
    fn test_orphan_tab() {
        let (mut hierarchy, root) = single_root(HierarchyItem::folder("root", "Site", 0));
        hierarchy
            .add_child(root, HierarchyItem::file("t", "tab_Pricing.md", 1))
            .unwrap();

        let report = validator().validate(&hierarchy);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.issues[0].kind, IssueKind::OrphanTab);
        assert_eq!(report.issues[0].item_id, "t");
    }

    #[test]
    fn test_root_tab_is_not_orphan() {
        let (mut hierarchy, root) = single_root(HierarchyItem::folder("root", "tab_Root", 0));
        hierarchy
            .add_child(root, HierarchyItem::file("a", "a.md", 1))
            .unwrap();
        assert!(validator().validate(&hierarchy).is_clean());
    }

    #[test]
    fn test_depth_limited_folder_is_not_empty() {
        let mut item = HierarchyItem::folder("deep", "Deep", 0);
        item.folder_details_mut().unwrap().max_depth_reached = true;
        let (hierarchy, _) = single_root(item);

        assert!(validator().validate(&hierarchy).is_clean());
    }

    #[test]
    fn test_empty_folder_warning() {
        let (hierarchy, _) = single_root(HierarchyItem::folder("e", "Empty", 0));
        let report = validator().validate(&hierarchy);
        assert_eq!(report.warning_count(), 1);
        assert!(!report.has_errors());
    }

    #[test]
    fn test_validation_does_not_mutate() {
        let (mut hierarchy, root) = single_root(HierarchyItem::folder("menu", "tabs_Menu", 0));
        hierarchy
            .add_child(root, HierarchyItem::file("n", "notes.txt", 1))
            .unwrap();
        let before = hierarchy.clone();

        validator().validate(&hierarchy);

        assert_eq!(hierarchy, before);
    }
}
