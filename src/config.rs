use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_webhook_base_url")]
    pub webhook_base_url: String,

    /// Platform API origin; also forwarded to the webhook as `enderecoApi`.
    #[serde(default = "default_core_api_url")]
    pub core_api_url: String,

    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_webhook_base_url() -> String {
    "https://dev.gruponfa.com".to_string()
}

fn default_core_api_url() -> String {
    "https://api.inovstar.com".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_server_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
