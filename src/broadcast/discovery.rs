use std::collections::HashSet;

use tracing::{info, warn};

use crate::{
    clients::telegram::{TelegramClient, TelegramError},
    config::Config,
    models::{recipient::RecipientId, retry::RetryConfig, telegram::Update},
    utils::retry_with_backoff,
};

/// Finds recipients in the bot's recent update feed.
#[derive(Debug, Clone)]
pub struct RecipientDiscovery {
    update_limit: u32,
    retry_config: RetryConfig,
}

impl RecipientDiscovery {
    pub fn new(update_limit: u32, retry_config: RetryConfig) -> Self {
        Self {
            update_limit,
            retry_config,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.discovery_update_limit, config.retry_config())
    }

    /// Best effort: any remote failure yields an empty set.
    pub async fn discover(&self, client: &TelegramClient) -> HashSet<RecipientId> {
        let limit = match retry_with_backoff(
            "getWebhookInfo",
            &self.retry_config,
            TelegramError::is_retryable,
            || client.get_webhook_info(),
        )
        .await
        {
            Ok(info) if !info.url.is_empty() => {
                info!(
                    pending_updates = info.pending_update_count,
                    "Webhook active, reading full update feed"
                );
                None
            }
            Ok(_) => Some(self.update_limit),
            Err(e) => {
                warn!(error = %e, "Webhook lookup failed, assuming polling mode");
                Some(self.update_limit)
            }
        };

        match retry_with_backoff(
            "getUpdates",
            &self.retry_config,
            TelegramError::is_retryable,
            || client.get_updates(limit),
        )
        .await
        {
            Ok(updates) => {
                let recipients = collect_senders(&updates);
                info!(
                    updates = updates.len(),
                    recipients = recipients.len(),
                    "Recipient discovery finished"
                );
                recipients
            }
            Err(e) => {
                warn!(error = %e, "Could not read update feed, discovery yields no recipients");
                HashSet::new()
            }
        }
    }
}

/// Distinct non-bot senders across `updates`.
pub fn collect_senders(updates: &[Update]) -> HashSet<RecipientId> {
    updates
        .iter()
        .flat_map(Update::senders)
        .filter(|user| !user.is_bot)
        .map(|user| RecipientId(user.id))
        .collect()
}
