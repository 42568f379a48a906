use crate::error::CatalogError;
use crate::traits::Catalog;
use async_trait::async_trait;
use media_player_config::BackendConfig;
use media_player_models::{Episode, EpisodeListResponse, SeriesInfo};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;


pub fn create_http_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(concat!("swplay/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// REST client for `{base_url}/api/...`
#[derive(Clone)]
pub struct CatalogClient {
    client: Arc<Client>,
    api_base: String,
    episodes_per_page: u32,
    api_token: Option<String>,
}

impl CatalogClient {
    pub fn new(base_url: &str, episodes_per_page: u32) -> Result<Self, CatalogError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(CatalogError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client: Arc::new(create_http_client(Duration::from_secs(15))),
            api_base: format!("{}/api", trimmed),
            episodes_per_page,
            api_token: None,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, CatalogError> {
        let mut client = Self::new(&config.base_url, config.episodes_per_page)?;
        client.client = Arc::new(create_http_client(config.timeout()));
        client.api_token = config.api_token.clone();
        Ok(client)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, CatalogError> {
        debug!(url = %url, "GET");

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.api_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|source| CatalogError::Http { url: url.clone(), source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| CatalogError::Http { url: url.clone(), source })?;

        if !status.is_success() {
            return Err(CatalogError::Status { url, status, body });
        }

        serde_json::from_str(&body).map_err(|source| CatalogError::Decode { url, source })
    }
}

#[async_trait]
impl Catalog for CatalogClient {
    async fn episodes(&self, series_id: &str) -> Result<Vec<Episode>, CatalogError> {
        let url = format!(
            "{}/episodes?series_id={}&per_page={}",
            self.api_base,
            urlencoding::encode(series_id),
            self.episodes_per_page
        );
        let response: EpisodeListResponse = self.get_json(url).await?;
        let episodes = response.into_episodes();
        debug!(series_id, count = episodes.len(), "Fetched episodes");
        Ok(episodes)
    }

    async fn series(&self, series_id: &str) -> Result<SeriesInfo, CatalogError> {
        let url = format!("{}/series/{}", self.api_base, urlencoding::encode(series_id));
        self.get_json(url).await
    }
}
