//! # Google Drive Provider
//!
//! Implements `StorageProvider` for Google Drive API v3.
//!
//! ## Overview
//!
//! - Folder metadata via `files.get`
//! - Complete folder listings via paginated `files.list` parent queries
//! - Text content via `alt=media`, or `export` for Google Docs
//! - Retry with exponential backoff on rate limits and server errors
//!
//! A 404 from the API surfaces as `BridgeError::NotFound`.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::GoogleDriveConnector;
pub use error::{GoogleDriveError, Result};
