#![allow(dead_code)]

pub use nest_tracker::replay::{RecordingSink, SharedDialog};
use nest_tracker::{ApiConfig, NestTracker};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Tracker wired to a dialog the test controls and a sink it can inspect.
pub fn tracker() -> (NestTracker, SharedDialog, RecordingSink) {
    init_tracing();
    let dialog = SharedDialog::new();
    let sink = RecordingSink::new();
    let tracker = NestTracker::new(Box::new(dialog.clone()), Box::new(sink.clone()));
    (tracker, dialog, sink)
}

/// Client settings pointed at a mock server, with fast retries.
pub fn test_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        user_agent: "Nest-Tracker-Test/1.0".to_string(),
        timeout_seconds: 5,
        max_retries: 2,
        retry_delay_ms: 10,
        page_size: 28,
    }
}
