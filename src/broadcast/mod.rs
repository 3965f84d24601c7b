//! Broadcast dispatch engine.
//!
//! A broadcast verifies the bot token, discovers recent senders, merges them into
//! the [`RecipientRegistry`], formats the payload and fans it out through the
//! [`Dispatcher`]. Only token verification can fail the whole broadcast.

pub mod discovery;
pub mod dispatcher;
pub mod formatter;
pub mod report;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    clients::{recipients::RecipientRegistry, telegram::TelegramClient},
    error::BroadcastError,
    models::broadcast::{BroadcastReport, BroadcastRequest},
};

use self::{
    discovery::RecipientDiscovery,
    dispatcher::Dispatcher,
    formatter::format_message,
    report::{build_report, empty_report},
};

const IN_MEMORY_SUGGESTION: &str =
    "Set RECIPIENT_STORE_URL to keep user IDs across restarts for better results";

pub struct BroadcastService {
    registry: RecipientRegistry,
    discovery: RecipientDiscovery,
    dispatcher: Dispatcher,
}

impl BroadcastService {
    pub fn new(
        registry: RecipientRegistry,
        discovery: RecipientDiscovery,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            registry,
            discovery,
            dispatcher,
        }
    }

    pub fn registry(&self) -> &RecipientRegistry {
        &self.registry
    }

    pub async fn broadcast(
        &self,
        client: &TelegramClient,
        request: &BroadcastRequest,
    ) -> Result<BroadcastReport, BroadcastError> {
        let broadcast_id = Uuid::new_v4();

        let bot = client
            .get_me()
            .await
            .map_err(BroadcastError::CredentialRejected)?;

        info!(
            %broadcast_id,
            bot_id = bot.id,
            bot_username = bot.username.as_deref().unwrap_or_default(),
            "Bot token verified"
        );

        let discovered = self.discovery.discover(client).await;

        let recipients = match self.registry.merge(&discovered).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    %broadcast_id,
                    error = %e,
                    "Recipient registry unavailable, sending to discovered recipients only"
                );
                let mut discovered: Vec<_> = discovered.into_iter().collect();
                discovered.sort_unstable();
                discovered
            }
        };

        if recipients.is_empty() {
            info!(%broadcast_id, "No recipients known, nothing to send");
            return Ok(empty_report(request.parse_mode));
        }

        let payload = format_message(&request.message, request.parse_mode);

        info!(
            %broadcast_id,
            total = recipients.len(),
            batch_size = self.dispatcher.config().batch_size,
            "Dispatching broadcast"
        );

        let run = self.dispatcher.dispatch(client, &recipients, &payload).await;

        info!(
            %broadcast_id,
            total = run.records.len(),
            successful = run.delivered(),
            failed = run.failed(),
            batches = run.batches,
            elapsed_ms = run.elapsed.as_millis() as u64,
            "Broadcast finished"
        );

        let report = build_report(&run, request.parse_mode);
        Ok(match self.registry {
            RecipientRegistry::InMemory(_) => report.with_suggestion(IN_MEMORY_SUGGESTION),
            RecipientRegistry::Redis(_) => report,
        })
    }
}
