use serde::{Deserialize, Serialize};
use std::env;
pub use interfaces::defs::{DialogWidget, ItemCatalog, ItemId, ItemObservation, ItemRecord, ObservationSink, TransformedState};

pub const DEFAULT_API_URL: &str = "https://global-nest-tracker-6e3101149673.herokuapp.com/";
pub const DEFAULT_PAGE_SIZE: u32 = 28;

/// One page of listing results: the service's total count plus the records
/// on this page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPage {
    pub total: u64,
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            user_agent: "Global-Nest-Tracker/1.0".to_string(),
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_ms: 500,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by `NEST_TRACKER_*` environment variables.
    /// Unparsable numeric values fall back to the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("NEST_TRACKER_API_URL") {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        if let Some(timeout) = env::var("NEST_TRACKER_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()) {
            config.timeout_seconds = timeout;
        }
        if let Some(retries) = env::var("NEST_TRACKER_MAX_RETRIES").ok().and_then(|v| v.parse().ok()) {
            config.max_retries = retries;
        }

        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid script line {line}: {reason}")]
    InvalidScript { line: usize, reason: String },

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
