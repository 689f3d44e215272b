//! Display ordering of siblings.
//!
//! 1. Folders before files.
//! 2. Items with a numeric prefix before items without, ascending by number.
//! 3. Remaining ties by a case-insensitive name comparison in which lowercase
//!    sorts before uppercase when the names differ only by case.

use crate::model::HierarchyItem;
use std::cmp::Ordering;

pub fn compare_items(a: &HierarchyItem, b: &HierarchyItem) -> Ordering {
    b.is_folder()
        .cmp(&a.is_folder())
        .then_with(|| match (a.has_order(), b.has_order()) {
            (true, true) => a.order.cmp(&b.order),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => Ordering::Equal,
        })
        .then_with(|| locale_compare(&a.name, &b.name))
}

/// Case-insensitive comparison with a deterministic case tiebreak.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Stable in-place sort of sibling items.
pub fn sort_siblings(items: &mut [HierarchyItem]) {
    items.sort_by(compare_items);
}
