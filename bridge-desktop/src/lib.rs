//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop and server hosts
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`, with bounded retry and exponential backoff
//!
//! Storage providers (Google Drive) build on top of the `HttpClient` and live
//! in their own crates.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! let drive = GoogleDriveConnector::new(http_client, access_token);
//! ```

mod http;

pub use http::ReqwestHttpClient;
