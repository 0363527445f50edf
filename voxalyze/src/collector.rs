use async_trait::async_trait;
use metrics::counter;
use reqwest::header;
use tracing::{debug, info};

use crate::api::CollectorError;
use crate::config::TrackerConfig;
use crate::event::AlexaRequest;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Destination for tracked payloads.
#[async_trait]
pub trait Collector {
    /// Resolves once the collector accepted the payload.
    async fn dispatch(&self, payload: AlexaRequest) -> Result<(), CollectorError>;
}

pub struct PrintCollector {}

#[async_trait]
impl Collector for PrintCollector {
    async fn dispatch(&self, payload: AlexaRequest) -> Result<(), CollectorError> {
        let body = serde_json::to_string(&payload)?;
        info!("tracked payload: {}", body);
        counter!("voxalyze_dispatch_total", "result" => "printed").increment(1);

        Ok(())
    }
}

/// Posts payloads as JSON to the Voxalyze collector.
#[derive(Clone)]
pub struct HttpCollector {
    client: reqwest::Client,
    url: url::Url,
}

impl HttpCollector {
    /// Initialize the collector client with the configured API key.
    pub fn new(config: &TrackerConfig) -> anyhow::Result<HttpCollector> {
        let url = url::Url::parse(&config.collector_url)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let mut api_key = header::HeaderValue::from_str(&config.api_key)?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent("Voxalyze Skill Tracker")
            .timeout(config.request_timeout.0)
            .build()?;

        info!("forwarding launch requests to {}", url);

        Ok(HttpCollector { client, url })
    }
}

#[async_trait]
impl Collector for HttpCollector {
    async fn dispatch(&self, payload: AlexaRequest) -> Result<(), CollectorError> {
        let body = serde_json::to_vec(&payload)?;
        debug!(len = body.len(), "dispatching payload");

        let response = self
            .client
            .post(self.url.clone())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(CollectorError::Rejected(status))
        }
    }
}
