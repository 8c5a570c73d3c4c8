use crate::browser::{BrowseRequest, ItemFilter};
use crate::types::{ApiConfig, ItemId, ItemObservation, ItemPage, ItemRecord, Result, TrackerError};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// HTTP client for the crowdsourcing service.
pub struct NestApiClient {
    client: Client,
    config: ApiConfig,
    base_url: Url,
}

impl NestApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        // Relative joins ("random") must extend the base path, not replace
        // its last segment.
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Posts a single observation. Never retried: a cycle yields at most
    /// one submission attempt.
    pub async fn submit(&self, observation: &ItemObservation) -> Result<()> {
        let url = self.base_url.clone();

        let response = match self.client.post(url.clone()).json(observation).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Error executing request: {}: {}", url, e);
                return Err(TrackerError::Http(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!("Server returned error code {} for URL: {}", status.as_u16(), url);
            return Err(TrackerError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        debug!("Request successful: {}", url);
        Ok(())
    }

    pub async fn load_items(&self) -> Result<ItemPage> {
        self.get_page(self.base_url.clone()).await
    }

    pub async fn load_items_by_id(&self, item_id: ItemId) -> Result<ItemPage> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("itemId", &item_id.to_string());
        self.get_page(url).await
    }

    /// One page of the listing. `ItemFilter::All` sends no state filter.
    pub async fn load_items_with_filter(&self, filter: ItemFilter, page: u32, size: u32) -> Result<ItemPage> {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &page.to_string());
            query.append_pair("size", &size.to_string());
            if let Some(state) = filter.transformed_state() {
                query.append_pair("transformedState", state);
            }
        }
        self.get_page(url).await
    }

    pub async fn load_random_unknown_items(&self, count: u32) -> Result<ItemPage> {
        let mut url = self.base_url.join("random")?;
        url.query_pairs_mut()
            .append_pair("count", &count.to_string())
            .append_pair("transformedState", "unknown");
        self.get_page(url).await
    }

    /// Issues whatever read the browser asked for.
    pub async fn load(&self, request: &BrowseRequest) -> Result<ItemPage> {
        match *request {
            BrowseRequest::Everything => self.load_items().await,
            BrowseRequest::Filtered { filter, page, size } => self.load_items_with_filter(filter, page, size).await,
            BrowseRequest::ById(item_id) => self.load_items_by_id(item_id).await,
            BrowseRequest::RandomUnknown { count } => self.load_random_unknown_items(count).await,
        }
    }

    async fn get_page(&self, url: Url) -> Result<ItemPage> {
        let delay = Duration::from_millis(self.config.retry_delay_ms);
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: delay,
            initial_interval: delay,
            max_interval: delay * 16,
            multiplier: 2.0,
            max_elapsed_time: Some(delay * 60),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let page = Self::read_page(response).await?;
                        info!("Loaded {} items ({} total) from {}", page.items.len(), page.total, url);
                        return Ok(page);
                    }

                    error!("Server returned error code {} for URL: {}", status.as_u16(), url);
                    last_error = Some(TrackerError::Status {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });

                    // Client errors will not go away on retry.
                    if !status.is_server_error() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Error executing request: {}: {}", url, e);
                    last_error = Some(TrackerError::Http(e));
                }
            }

            if attempt < self.config.max_retries {
                if let Some(wait) = backoff.next_backoff() {
                    warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, wait);
                    tokio::time::sleep(wait).await;
                    continue;
                }
            }
            break;
        }

        Err(last_error.unwrap_or_else(|| TrackerError::General(format!("Request to {} failed", url))))
    }

    async fn read_page(response: Response) -> Result<ItemPage> {
        let total = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);

        let body = response.text().await?;
        let items: Vec<ItemRecord> = serde_json::from_str(&body)?;

        Ok(ItemPage { total, items })
    }
}
