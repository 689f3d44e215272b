//! Integration tests for the logging system

use async_trait::async_trait;
use bridge_traits::error::Result as SinkResult;
use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{redact_if_sensitive, strip_path, LogFormat, LoggingConfig};
use core_runtime::ComponentLogger;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for RecordingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

#[test]
fn test_config_chaining() {
    // Logging can only be initialized once per process, so only the builder is exercised
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}

#[test]
fn test_format_selection() {
    let config = LoggingConfig::default();

    #[cfg(debug_assertions)]
    assert_eq!(config.format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(config.format, LogFormat::Json);
}

#[test]
fn test_token_fields_are_redacted() {
    assert_eq!(redact_if_sensitive("drive_access_token", "ya29.abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("client_secret", "s3cr3t"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("folder_id", "1AbC"), "1AbC");
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/var/lib/publisher/routes.db"), "routes.db");
    assert_eq!(strip_path("D:\\publisher\\routes.db"), "routes.db");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_component_loggers_share_host_sink() {
    let sink = Arc::new(RecordingSink::default());
    let builder_logger = ComponentLogger::new("hierarchy_builder").with_sink(sink.clone());
    let grouper_logger = builder_logger.for_component("preview_grouper");

    builder_logger.info_with("Folder fetched", &[("folder_id", "root".to_string())]);
    grouper_logger.warn("Ambiguous preview bucket");

    let entries = sink.entries.lock().unwrap();
    let targets: Vec<&str> = entries.iter().map(|e| e.target.as_str()).collect();
    assert_eq!(targets, vec!["hierarchy_builder", "preview_grouper"]);
    assert_eq!(entries[0].fields.get("folder_id"), Some(&"root".to_string()));
}
