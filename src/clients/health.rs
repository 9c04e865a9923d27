use std::{collections::HashMap, time::Instant};

use chrono::Utc;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{
    config::Config,
    models::health::{HealthCheckResponse, HealthStatus, ServiceHealth},
};

const WEBHOOK_CHECK: &str = "webhook";
const CORE_API_CHECK: &str = "core_api";

pub struct HealthChecker {
    config: Config,
    http_client: Client,
}

impl HealthChecker {
    pub fn new(config: Config) -> Self {
        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_default();

        Self {
            config,
            http_client,
        }
    }

    pub async fn check_all(&self) -> HealthCheckResponse {
        let mut checks = HashMap::new();

        let webhook_health = self.check_reachable(WEBHOOK_CHECK, &self.config.webhook_base_url).await;
        checks.insert(WEBHOOK_CHECK.to_string(), webhook_health);

        let core_api_health = self.check_reachable(CORE_API_CHECK, &self.config.core_api_url).await;
        checks.insert(CORE_API_CHECK.to_string(), core_api_health);

        let overall_status = self.determine_overall_status(&checks);

        HealthCheckResponse {
            status: overall_status,
            timestamp: Utc::now(),
            checks,
        }
    }

    /// Any HTTP answer counts as reachable; only transport failures do not.
    async fn check_reachable(&self, service: &str, url: &str) -> ServiceHealth {
        let start = Instant::now();

        match self.http_client.get(url).send().await {
            Ok(response) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(
                    service,
                    status = %response.status(),
                    response_time_ms = elapsed,
                    "Health check passed"
                );
                ServiceHealth::healthy(elapsed)
            }
            Err(e) => {
                warn!(service, error = %e, "Health check failed");
                ServiceHealth::unhealthy(format!("Connection failed: {}", e))
            }
        }
    }

    /// The webhook is required to submit; the platform API only feeds
    /// lookups.
    fn determine_overall_status(&self, checks: &HashMap<String, ServiceHealth>) -> HealthStatus {
        let critical_unhealthy = checks
            .get(WEBHOOK_CHECK)
            .is_some_and(|health| health.status == HealthStatus::Unhealthy);

        let has_unhealthy = checks
            .values()
            .any(|health| health.status == HealthStatus::Unhealthy);

        if critical_unhealthy {
            HealthStatus::Unhealthy
        } else if has_unhealthy {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}
