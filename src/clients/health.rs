use std::{collections::HashMap, time::Instant};

use chrono::{SecondsFormat, Utc};
use tracing::{debug, warn};

use crate::{
    clients::recipients::RecipientRegistry,
    models::health::{HealthCheckResponse, HealthStatus, ServiceHealth},
};

pub struct HealthChecker {
    registry: RecipientRegistry,
}

impl HealthChecker {
    pub fn new(registry: RecipientRegistry) -> Self {
        Self { registry }
    }

    pub async fn check_all(&self) -> HealthCheckResponse {
        let mut checks = HashMap::new();

        let registry_health = self.check_registry().await;
        checks.insert("recipient_registry".to_string(), registry_health);

        let overall_status = Self::determine_overall_status(&checks);

        HealthCheckResponse {
            status: overall_status,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            checks,
        }
    }

    async fn check_registry(&self) -> ServiceHealth {
        let start = Instant::now();
        let backend = self.registry.backend();

        match self.registry.len().await {
            Ok(count) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(backend, response_time_ms = elapsed, "Recipient registry health check passed");
                ServiceHealth::healthy(elapsed)
                    .with_backend(backend)
                    .with_known_recipients(count)
            }
            Err(e) => {
                warn!(backend, error = %e, "Recipient registry health check failed");
                ServiceHealth::unhealthy(format!("Registry unavailable: {}", e)).with_backend(backend)
            }
        }
    }

    fn determine_overall_status(checks: &HashMap<String, ServiceHealth>) -> HealthStatus {
        let has_unhealthy = checks
            .values()
            .any(|health| health.status == HealthStatus::Unhealthy);

        if has_unhealthy {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        }
    }
}
