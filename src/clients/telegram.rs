use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

use crate::{
    broadcast::dispatcher::DeliveryChannel,
    config::Config,
    models::{
        broadcast::{DispatchOutcome, Payload},
        recipient::RecipientId,
        telegram::{
            ApiEnvelope, Chat, ChatMember, ChatRef, GetChatMemberRequest, GetChatRequest,
            GetUpdatesRequest, SendMessageRequest, SentMessage, Update, User, WebhookInfo,
        },
    },
};

#[derive(Debug, Error)]
pub enum TelegramError {
    /// `ok: false` envelope returned by the Bot API.
    #[error("{description}")]
    Api { error_code: i64, description: String },

    /// Network or decoding failure. The request URL is stripped since it embeds the token.
    #[error("{0}")]
    Transport(reqwest::Error),
}

impl TelegramError {
    pub fn description(&self) -> String {
        match self {
            TelegramError::Api { description, .. } => description.clone(),
            TelegramError::Transport(e) => e.to_string(),
        }
    }

    /// Client errors other than 429 will fail the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelegramError::Api { error_code, .. } => {
                !(400..500).contains(error_code) || *error_code == 429
            }
            TelegramError::Transport(_) => true,
        }
    }

    fn transport(e: reqwest::Error) -> Self {
        TelegramError::Transport(e.without_url())
    }
}

/// Builds the HTTP client shared by every per-request `TelegramClient`.
pub fn build_http_client(config: &Config) -> Result<Client, Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .build()
        .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))
}

/// Bot API client bound to one bot token.
#[derive(Clone)]
pub struct TelegramClient {
    http_client: Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(http_client: Client, base_url: &str, token: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    pub async fn get_webhook_info(&self) -> Result<WebhookInfo, TelegramError> {
        self.call("getWebhookInfo", &serde_json::json!({})).await
    }

    pub async fn get_updates(&self, limit: Option<u32>) -> Result<Vec<Update>, TelegramError> {
        self.call("getUpdates", &GetUpdatesRequest { limit }).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: &str,
    ) -> Result<SentMessage, TelegramError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode,
            disable_web_page_preview: true,
        };

        self.call("sendMessage", &request).await
    }

    pub async fn get_chat(&self, chat: &ChatRef) -> Result<Chat, TelegramError> {
        self.call("getChat", &GetChatRequest { chat_id: chat }).await
    }

    pub async fn get_chat_member(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<ChatMember, TelegramError> {
        self.call("getChatMember", &GetChatMemberRequest { chat_id, user_id })
            .await
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);

        debug!(method, "Calling Telegram Bot API");

        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(TelegramError::transport)?;

        let status = response.status();
        let envelope: ApiEnvelope<T> = response.json().await.map_err(TelegramError::transport)?;

        match (envelope.ok, envelope.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::Api {
                error_code: envelope
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: envelope
                    .description
                    .unwrap_or_else(|| format!("Telegram returned status {}", status)),
            }),
        }
    }
}

impl DeliveryChannel for TelegramClient {
    async fn deliver(&self, recipient: RecipientId, payload: &Payload) -> DispatchOutcome {
        match self
            .send_message(
                recipient.as_i64(),
                &payload.text,
                payload.parse_mode.as_str(),
            )
            .await
        {
            Ok(_) => DispatchOutcome::Delivered,
            Err(e) => {
                debug!(recipient = %recipient, error = %e, "Delivery failed");
                DispatchOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(error_code: i64) -> TelegramError {
        TelegramError::Api {
            error_code,
            description: "error".to_string(),
        }
    }

    #[test]
    fn client_errors_are_final_except_rate_limits() {
        assert!(!api(400).is_retryable());
        assert!(!api(401).is_retryable());
        assert!(!api(409).is_retryable());
        assert!(api(429).is_retryable());
        assert!(api(500).is_retryable());
        assert!(api(502).is_retryable());
    }
}
