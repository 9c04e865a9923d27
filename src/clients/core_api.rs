use anyhow::{Error, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    config::Config,
    models::{channel::Sector, template::Template},
};

const API_PREFIX: &str = "/core/v2/api";

#[derive(Debug, Deserialize)]
struct UserSectors {
    #[serde(default)]
    sectors: Vec<Sector>,
}

/// Lookups against the platform API, authenticated per channel with the
/// `access-token` header.
#[derive(Clone)]
pub struct CoreApiClient {
    http_client: Client,
    base_url: String,
}

impl CoreApiClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(base_url = %config.core_api_url, "Core API client initialized");

        Ok(Self {
            http_client,
            base_url: config.core_api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Origin forwarded to the webhook so it can call back into the
    /// platform.
    pub fn origin(&self) -> &str {
        &self.base_url
    }

    /// Sectors visible to `user_id`, or to the channel itself when the
    /// operator is unknown.
    pub async fn fetch_sectors(
        &self,
        channel_id: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<Sector>, Error> {
        let subject = user_id.filter(|id| !id.is_empty()).unwrap_or(channel_id);
        let url = format!("{}{}/users/{}", self.base_url, API_PREFIX, subject);

        debug!(channel_id, subject, "Fetching sectors");

        let response = self
            .http_client
            .get(&url)
            .header("access-token", channel_id)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Failed to fetch sectors: {}", status));
        }

        let user: UserSectors = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse sectors JSON: {}", e))?;

        Ok(user.sectors)
    }

    pub async fn fetch_templates(&self, channel_id: &str) -> Result<Vec<Template>, Error> {
        let url = format!("{}{}/action-cards/templates", self.base_url, API_PREFIX);

        debug!(channel_id, "Fetching templates");

        let response = self
            .http_client
            .get(&url)
            .header("access-token", channel_id)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Failed to fetch templates: {}", status));
        }

        let templates: Vec<Template> = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse templates JSON: {}", e))?;

        Ok(templates)
    }
}
