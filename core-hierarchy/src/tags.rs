//! # Name Tag Extraction
//!
//! Item names carry their presentation semantics:
//!
//! ```text
//! 02_tabs_Products_featured
//! ^^ ^^^^^          ^^^^^^^^
//! |  |              suffix tag "featured"
//! |  prefix tag "tabs"
//! ordering prefix (order = 2)
//! ```
//!
//! Both vocabularies are closed. [`extract_tags`] strips every recognised
//! marker and repeats until nothing else matches, so a doubled marker such as
//! `tab_tab_Home` yields the tag twice and the resulting display name never
//! yields tags again.

use crate::names::split_extension;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static ORDER_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^([0-9]+)[_\-\s]").ok());

/// Semantic markers found at the start of (or inside) a name as `<tag>_`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixTag {
    /// Numeric ordering prefix such as `03_`
    Order,
    Tabs,
    Tab,
    Accordion,
    Section,
    Gallery,
    Video,
    Image,
    Download,
    Link,
    Card,
    Meta,
    Info,
}

impl PrefixTag {
    /// Markers matched textually, in matching order. `tabs` precedes `tab`.
    pub const MARKERS: [PrefixTag; 12] = [
        PrefixTag::Tabs,
        PrefixTag::Tab,
        PrefixTag::Accordion,
        PrefixTag::Section,
        PrefixTag::Gallery,
        PrefixTag::Video,
        PrefixTag::Image,
        PrefixTag::Download,
        PrefixTag::Link,
        PrefixTag::Card,
        PrefixTag::Meta,
        PrefixTag::Info,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PrefixTag::Order => "order",
            PrefixTag::Tabs => "tabs",
            PrefixTag::Tab => "tab",
            PrefixTag::Accordion => "accordion",
            PrefixTag::Section => "section",
            PrefixTag::Gallery => "gallery",
            PrefixTag::Video => "video",
            PrefixTag::Image => "image",
            PrefixTag::Download => "download",
            PrefixTag::Link => "link",
            PrefixTag::Card => "card",
            PrefixTag::Meta => "meta",
            PrefixTag::Info => "info",
        }
    }

    /// Tags that only make sense on folders.
    pub fn is_container_only(self) -> bool {
        matches!(self, PrefixTag::Tabs | PrefixTag::Accordion)
    }
}

impl fmt::Display for PrefixTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrefixTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        std::iter::once(PrefixTag::Order)
            .chain(PrefixTag::MARKERS)
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| format!("Unknown prefix tag: {}", s))
    }
}

/// Behavioral markers found at the end of a name (or its stem) as `_<tag>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuffixTag {
    Hidden,
    Featured,
    Draft,
    Archived,
    New,
    Private,
    Public,
    /// Sidecar file carrying metadata for a sibling
    Copy,
    Expanded,
    Collapsed,
    Pinned,
}

impl SuffixTag {
    pub const ALL: [SuffixTag; 11] = [
        SuffixTag::Hidden,
        SuffixTag::Featured,
        SuffixTag::Draft,
        SuffixTag::Archived,
        SuffixTag::New,
        SuffixTag::Private,
        SuffixTag::Public,
        SuffixTag::Copy,
        SuffixTag::Expanded,
        SuffixTag::Collapsed,
        SuffixTag::Pinned,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SuffixTag::Hidden => "hidden",
            SuffixTag::Featured => "featured",
            SuffixTag::Draft => "draft",
            SuffixTag::Archived => "archived",
            SuffixTag::New => "new",
            SuffixTag::Private => "private",
            SuffixTag::Public => "public",
            SuffixTag::Copy => "copy",
            SuffixTag::Expanded => "expanded",
            SuffixTag::Collapsed => "collapsed",
            SuffixTag::Pinned => "pinned",
        }
    }
}

impl fmt::Display for SuffixTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuffixTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SuffixTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| format!("Unknown suffix tag: {}", s))
    }
}

/// Prefix tags that must not appear together on one item.
pub const EXCLUSIVE_PREFIX_PAIRS: &[(PrefixTag, PrefixTag)] = &[
    (PrefixTag::Tab, PrefixTag::Tabs),
    (PrefixTag::Accordion, PrefixTag::Tabs),
];

/// Suffix tags that must not appear together on one item.
pub const EXCLUSIVE_SUFFIX_PAIRS: &[(SuffixTag, SuffixTag)] = &[
    (SuffixTag::Expanded, SuffixTag::Collapsed),
    (SuffixTag::Private, SuffixTag::Public),
    (SuffixTag::Draft, SuffixTag::Archived),
];

/// Result of parsing one name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedTags {
    /// Value of the first numeric prefix, if any
    pub order: Option<u32>,
    /// Prefix tags in the order they were matched, duplicates included
    pub prefix_tags: Vec<PrefixTag>,
    /// Suffix tags in the order they were matched, duplicates included
    pub suffix_tags: Vec<SuffixTag>,
    /// Name with every matched marker removed
    pub display_name: String,
}

impl ExtractedTags {
    pub fn is_empty(&self) -> bool {
        self.prefix_tags.is_empty() && self.suffix_tags.is_empty()
    }
}

fn take_order_prefix(name: &str) -> Option<(u32, &str)> {
    let captures = ORDER_PREFIX.as_ref()?.captures(name)?;
    let matched = captures.get(0)?;
    // Only ASCII digits were captured, so a parse failure means overflow
    let value = captures.get(1)?.as_str().parse::<u32>().unwrap_or(u32::MAX);
    Some((value, &name[matched.end()..]))
}

fn strip_suffix_marker(name: &str, marker: &str) -> Option<String> {
    if let Some(rest) = name.strip_suffix(marker) {
        return Some(rest.to_string());
    }

    match split_extension(name) {
        (stem, Some(ext)) => stem
            .strip_suffix(marker)
            .map(|rest| format!("{}.{}", rest, ext)),
        _ => None,
    }
}

/// Parse a raw item name into ordering value, tags and display name.
///
/// # Example
///
/// ```
/// use core_hierarchy::tags::{extract_tags, PrefixTag, SuffixTag};
///
/// let tags = extract_tags("01_tab_Overview_featured");
/// assert_eq!(tags.order, Some(1));
/// assert_eq!(tags.prefix_tags, vec![PrefixTag::Order, PrefixTag::Tab]);
/// assert_eq!(tags.suffix_tags, vec![SuffixTag::Featured]);
/// assert_eq!(tags.display_name, "Overview");
/// ```
pub fn extract_tags(name: &str) -> ExtractedTags {
    let mut extracted = ExtractedTags::default();
    let mut working = name.trim().to_string();

    loop {
        let mut changed = false;

        if let Some((value, rest)) = take_order_prefix(&working) {
            if extracted.order.is_none() {
                extracted.order = Some(value);
                extracted.prefix_tags.push(PrefixTag::Order);
            }
            working = rest.to_string();
            changed = true;
        }

        for tag in PrefixTag::MARKERS {
            let marker = format!("{}_", tag.as_str());
            if working.contains(&marker) {
                extracted.prefix_tags.push(tag);
                working = working.replacen(&marker, "", 1);
                changed = true;
            }
        }

        for tag in SuffixTag::ALL {
            let marker = format!("_{}", tag.as_str());
            if let Some(rest) = strip_suffix_marker(&working, &marker) {
                extracted.suffix_tags.push(tag);
                working = rest;
                changed = true;
            }
        }

        let trimmed = working.trim();
        if trimmed.len() != working.len() {
            working = trimmed.to_string();
            changed = true;
        }

        if !changed {
            break;
        }
    }

    extracted.display_name = working;
    extracted
}

/// Display name of `name` with every marker removed.
pub fn strip_tags(name: &str) -> String {
    extract_tags(name).display_name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_has_no_tags() {
        let tags = extract_tags("Annual Report");
        assert!(tags.is_empty());
        assert_eq!(tags.order, None);
        assert_eq!(tags.display_name, "Annual Report");
    }

    #[test]
    fn test_numeric_prefix_variants() {
        for name in ["07_Intro", "07-Intro", "07 Intro"] {
            let tags = extract_tags(name);
            assert_eq!(tags.order, Some(7), "{}", name);
            assert_eq!(tags.prefix_tags, vec![PrefixTag::Order]);
            assert_eq!(tags.display_name, "Intro");
        }
    }

    #[test]
    fn test_numeric_without_separator_is_not_order() {
        let tags = extract_tags("2024Report");
        assert_eq!(tags.order, None);
        assert_eq!(tags.display_name, "2024Report");
    }

    #[test]
    fn test_non_ascii_digits_are_not_order() {
        let tags = extract_tags("٣_Intro");
        assert_eq!(tags.order, None);
        assert!(tags.prefix_tags.is_empty());
        assert_eq!(tags.display_name, "٣_Intro");
    }

    #[test]
    fn test_order_overflow_saturates() {
        let tags = extract_tags("99999999999_Big");
        assert_eq!(tags.order, Some(u32::MAX));
    }

    #[test]
    fn test_only_first_numeric_prefix_sets_order() {
        let tags = extract_tags("01_tab_02_Pricing");
        assert_eq!(tags.order, Some(1));
        assert_eq!(tags.prefix_tags, vec![PrefixTag::Order, PrefixTag::Tab]);
        assert_eq!(tags.display_name, "Pricing");
    }

    #[test]
    fn test_tabs_is_not_read_as_tab() {
        let tags = extract_tags("tabs_Menu");
        assert_eq!(tags.prefix_tags, vec![PrefixTag::Tabs]);
        assert_eq!(tags.display_name, "Menu");
    }

    #[test]
    fn test_doubled_marker_is_recorded_twice() {
        let tags = extract_tags("tab_tab_Home");
        assert_eq!(tags.prefix_tags, vec![PrefixTag::Tab, PrefixTag::Tab]);
        assert_eq!(tags.display_name, "Home");
    }

    #[test]
    fn test_multiple_suffixes() {
        let tags = extract_tags("Roadmap_draft_hidden");
        assert_eq!(tags.suffix_tags, vec![SuffixTag::Hidden, SuffixTag::Draft]);
        assert_eq!(tags.display_name, "Roadmap");
    }

    #[test]
    fn test_suffix_before_extension() {
        let tags = extract_tags("report_copy.txt");
        assert_eq!(tags.suffix_tags, vec![SuffixTag::Copy]);
        assert_eq!(tags.display_name, "report.txt");
    }

    #[test]
    fn test_strip_tags_is_idempotent() {
        for name in [
            "01_tabs_Products_featured",
            "tab_tab_Home",
            "03_accordion_FAQ_expanded",
            "gallery_01_Photos_new",
            "image_Hero_public.png",
            "  05_ section_Details ",
        ] {
            let stripped = strip_tags(name);
            let again = extract_tags(&stripped);
            assert!(again.is_empty(), "{} -> {} re-yields tags", name, stripped);
            assert_eq!(again.order, None);
            assert_eq!(again.display_name, stripped);
        }
    }

    #[test]
    fn test_tag_round_trip_through_strings() {
        for tag in PrefixTag::MARKERS {
            assert_eq!(tag.as_str().parse::<PrefixTag>().unwrap(), tag);
        }
        for tag in SuffixTag::ALL {
            assert_eq!(tag.to_string().parse::<SuffixTag>().unwrap(), tag);
        }
        assert!("sidebar".parse::<PrefixTag>().is_err());
    }

    #[test]
    fn test_tags_serialize_lowercase() {
        let json = serde_json::to_string(&vec![PrefixTag::Accordion]).unwrap();
        assert_eq!(json, r#"["accordion"]"#);
        let json = serde_json::to_string(&SuffixTag::Collapsed).unwrap();
        assert_eq!(json, r#""collapsed""#);
    }

    #[test]
    fn test_container_only_tags() {
        assert!(PrefixTag::Tabs.is_container_only());
        assert!(PrefixTag::Accordion.is_container_only());
        assert!(!PrefixTag::Tab.is_container_only());
    }
}
