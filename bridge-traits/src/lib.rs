//! # Host Bridge Traits
//!
//! Abstraction traits between the synchronization core and the outside world.
//!
//! ## Overview
//!
//! The core never talks to a cloud API, the network stack or the wall clock
//! directly. Each capability is a trait defined here and implemented by an
//! adapter crate (`bridge-desktop`, `provider-google-drive`) or by a test fake.
//!
//! ## Traits
//!
//! ### Remote storage
//! - [`StorageProvider`](storage::StorageProvider) - Read-only access to a remote folder tree
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry and timeouts
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic schedules
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to a host pipeline
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Adapters must
//! map "resource does not exist" to `BridgeError::NotFound` so the core can
//! tell it apart from transient failures; everything else is opaque.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single adapter instance can be
//! shared across the builder's concurrent folder fetches.

pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use storage::{RemoteItem, StorageProvider, FOLDER_MIME_TYPE};
pub use time::{Clock, ConsoleLogger, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
