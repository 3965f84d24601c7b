use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::models::{dispatch::DispatchConfig, retry::RetryConfig};

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    #[serde(default = "default_telegram_api_base_url")]
    pub telegram_api_base_url: String,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    #[serde(default = "default_broadcast_batch_size")]
    pub broadcast_batch_size: usize,
    #[serde(default = "default_broadcast_batch_delay_ms")]
    pub broadcast_batch_delay_ms: u64,

    #[serde(default = "default_discovery_update_limit")]
    pub discovery_update_limit: u32,

    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    #[serde(default = "default_initial_retry_delay_ms")]
    pub initial_retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    #[serde(default = "default_retry_backoff_multiplier")]
    pub retry_backoff_multiplier: u64,

    /// Redis URL backing the recipient registry. In-memory when unset.
    #[serde(default)]
    pub recipient_store_url: Option<String>,
    #[serde(default = "default_recipient_store_key")]
    pub recipient_store_key: String,

    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid environmental variable: {}", e))?;
        Ok(config)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retry_attempts,
            initial_delay_ms: self.initial_retry_delay_ms,
            max_delay_ms: self.max_retry_delay_ms,
            backoff_multiplier: self.retry_backoff_multiplier,
        }
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig::new(self.broadcast_batch_size, self.broadcast_batch_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: default_server_port(),
            telegram_api_base_url: default_telegram_api_base_url(),
            request_timeout_seconds: default_request_timeout_seconds(),
            broadcast_batch_size: default_broadcast_batch_size(),
            broadcast_batch_delay_ms: default_broadcast_batch_delay_ms(),
            discovery_update_limit: default_discovery_update_limit(),
            max_retry_attempts: default_max_retry_attempts(),
            initial_retry_delay_ms: default_initial_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            retry_backoff_multiplier: default_retry_backoff_multiplier(),
            recipient_store_url: None,
            recipient_store_key: default_recipient_store_key(),
            log_format: default_log_format(),
        }
    }
}

fn default_server_port() -> u16 {
    3000
}

fn default_telegram_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_broadcast_batch_size() -> usize {
    20
}

fn default_broadcast_batch_delay_ms() -> u64 {
    1000
}

fn default_discovery_update_limit() -> u32 {
    100
}

fn default_max_retry_attempts() -> u32 {
    2
}

fn default_initial_retry_delay_ms() -> u64 {
    200
}

fn default_max_retry_delay_ms() -> u64 {
    2000
}

fn default_retry_backoff_multiplier() -> u64 {
    2
}

fn default_recipient_store_key() -> String {
    "broadcast:recipients".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
