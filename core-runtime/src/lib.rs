//! # Core Runtime Module
//!
//! Provides the ambient runtime infrastructure shared by the publishing core:
//! - Logging and tracing infrastructure
//! - Injectable per-component loggers
//! - Configuration management
//!
//! ## Overview
//!
//! Every other core crate depends on this one for its logging conventions and
//! for the validated [`config::CoreConfig`] that carries host-provided bridges.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
pub use logging::ComponentLogger;
