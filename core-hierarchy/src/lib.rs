//! # Core Hierarchy
//!
//! Pure domain model of a synchronized remote folder tree:
//! - [`tags`]: naming-convention vocabulary and extraction
//! - [`preview`]: `-P<n>` preview detection
//! - [`model`]: arena-backed [`Hierarchy`] of folders and files
//! - [`sort`]: deterministic sibling ordering
//! - [`grouping`]: attaching preview files to their principal
//! - [`validation`]: advisory structure checks
//! - [`snapshot`]: persisted JSON form
//!
//! Nothing in this crate performs I/O; fetching and persistence live in
//! `core-sync`.

pub mod error;
pub mod grouping;
pub mod model;
pub mod names;
pub mod preview;
pub mod snapshot;
pub mod sort;
pub mod tags;
pub mod validation;

pub use error::{HierarchyError, Result};
pub use grouping::{GroupingStats, PreviewGrouper};
pub use model::{FileDetails, FolderDetails, Hierarchy, HierarchyItem, ItemKind, NodeId, RemoteMetadata};
pub use preview::{detect_preview, PreviewMatch};
pub use snapshot::{ItemType, SnapshotItem};
pub use tags::{extract_tags, strip_tags, ExtractedTags, PrefixTag, SuffixTag};
pub use validation::{IssueKind, Severity, StructureValidator, ValidationIssue, ValidationReport};
