//! HTTP client for the remote schema and data endpoints.

use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::types::parse_schema_columns;
use super::{ColumnSpec, PageSource};
use crate::config::ApiConfig;
use crate::error::{IngestError, Result};

pub const SCHEMA_PATH: &str = "/schema";
pub const DATA_PATH: &str = "/dados";
pub const API_KEY_HEADER: &str = "x-api-key";

pub struct ApiClient {
    http_client: Client,
    base_url: String,
    token: String,
    schema_timeout: Duration,
    data_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http_client = Client::builder().build()?;
        Ok(Self::with_client(config, http_client))
    }

    pub fn with_client(config: &ApiConfig, http_client: Client) -> Self {
        Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            schema_timeout: config.schema_timeout,
            data_timeout: config.data_timeout,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| IngestError::Configuration(format!("invalid API_BASE '{}': {}", raw, e)))
    }

    /// GET `url` and return the raw body, failing on any non-2xx status.
    async fn get_text(&self, url: Url, timeout: Duration) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url.clone())
            .header(API_KEY_HEADER, &self.token)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(IngestError::Transport {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    /// Fetch the column list from the schema endpoint. Single attempt.
    pub async fn fetch_schema(&self) -> Result<Vec<ColumnSpec>> {
        let url = self.endpoint(SCHEMA_PATH)?;
        let body = self.get_text(url.clone(), self.schema_timeout).await?;

        serde_json::from_str::<Value>(&body)
            .ok()
            .as_ref()
            .and_then(parse_schema_columns)
            .ok_or_else(|| IngestError::SchemaFormat {
                url: url.to_string(),
                body,
            })
    }
}

#[async_trait]
impl PageSource for ApiClient {
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Value> {
        let mut url = self.endpoint(DATA_PATH)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("page_size", &page_size.to_string());

        let body = self.get_text(url, self.data_timeout).await?;
        serde_json::from_str(&body).map_err(|_| IngestError::TransportFormat { page })
    }
}

impl Debug for ApiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}
