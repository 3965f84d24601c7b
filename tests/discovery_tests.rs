use std::collections::HashSet;

use anyhow::Result;
use broadcast_service::{
    broadcast::discovery::RecipientDiscovery,
    clients::{recipients::RecipientRegistry, telegram::TelegramClient},
    models::{recipient::RecipientId, retry::RetryConfig},
};
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::{
    Mock, MockServer,
    matchers::{body_json, body_partial_json, method, path},
};

use crate::support::{TOKEN, api_error, bot_path, message_update, mount_polling_feed, ok};

fn retry_config(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_delay_ms: 10,
        max_delay_ms: 20,
        backoff_multiplier: 2,
    }
}

fn client(server: &MockServer) -> TelegramClient {
    TelegramClient::new(reqwest::Client::new(), &server.uri(), TOKEN)
}

/// Test: Polling mode reads a bounded feed and deduplicates senders
#[tokio::test]
async fn test_polling_mode_uses_update_limit() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(bot_path("getWebhookInfo")))
        .respond_with(ok(json!({ "url": "" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(bot_path("getUpdates")))
        .and(body_partial_json(json!({ "limit": 100 })))
        .respond_with(ok(json!([
            message_update(1, 11),
            message_update(2, 12),
            message_update(3, 11)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let discovery = RecipientDiscovery::new(100, retry_config(1));
    let found = discovery.discover(&client(&server)).await;

    assert_eq!(found, HashSet::from([RecipientId(11), RecipientId(12)]));

    Ok(())
}

/// Test: Webhook mode reads the feed without a limit
#[tokio::test]
async fn test_webhook_mode_reads_unbounded_feed() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(bot_path("getWebhookInfo")))
        .respond_with(ok(json!({ "url": "https://example.com/hook", "pending_update_count": 3 })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(bot_path("getUpdates")))
        .and(body_json(json!({})))
        .respond_with(ok(json!([message_update(1, 21)])))
        .expect(1)
        .mount(&server)
        .await;

    let discovery = RecipientDiscovery::new(100, retry_config(1));
    let found = discovery.discover(&client(&server)).await;

    assert_eq!(found, HashSet::from([RecipientId(21)]));

    Ok(())
}

/// Test: Server-side feed failures are retried up to the limit, then yield an empty set
#[tokio::test]
async fn test_feed_failure_is_retried_then_yields_empty_set() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(bot_path("getWebhookInfo")))
        .respond_with(ok(json!({ "url": "" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(bot_path("getUpdates")))
        .respond_with(api_error(502, "Bad Gateway"))
        .expect(3)
        .mount(&server)
        .await;

    let discovery = RecipientDiscovery::new(100, retry_config(3));
    let found = discovery.discover(&client(&server)).await;

    assert!(found.is_empty());

    Ok(())
}

/// Test: A conflicting feed read is not retried
#[tokio::test]
async fn test_feed_conflict_gives_up_after_one_attempt() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(bot_path("getWebhookInfo")))
        .respond_with(ok(json!({ "url": "" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(bot_path("getUpdates")))
        .respond_with(api_error(
            409,
            "Conflict: can't use getUpdates method while webhook is active",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let discovery = RecipientDiscovery::new(100, retry_config(3));
    let found = discovery.discover(&client(&server)).await;

    assert!(found.is_empty());

    Ok(())
}

/// Test: Rate-limited feed reads are retried
#[tokio::test]
async fn test_rate_limited_feed_is_retried() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(bot_path("getWebhookInfo")))
        .respond_with(ok(json!({ "url": "" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(bot_path("getUpdates")))
        .respond_with(api_error(429, "Too Many Requests: retry after 1"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(bot_path("getUpdates")))
        .respond_with(ok(json!([message_update(1, 51)])))
        .expect(1)
        .mount(&server)
        .await;

    let discovery = RecipientDiscovery::new(100, retry_config(2));
    let found = discovery.discover(&client(&server)).await;

    assert_eq!(found, HashSet::from([RecipientId(51)]));

    Ok(())
}

/// Test: A failed webhook lookup falls back to the bounded feed
#[tokio::test]
async fn test_webhook_lookup_failure_falls_back_to_polling() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(bot_path("getWebhookInfo")))
        .respond_with(api_error(500, "Internal Server Error"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(bot_path("getUpdates")))
        .and(body_partial_json(json!({ "limit": 50 })))
        .respond_with(ok(json!([message_update(1, 31)])))
        .expect(1)
        .mount(&server)
        .await;

    let discovery = RecipientDiscovery::new(50, retry_config(1));
    let found = discovery.discover(&client(&server)).await;

    assert_eq!(found, HashSet::from([RecipientId(31)]));

    Ok(())
}

/// Test: Rediscovering the same feed leaves the registry unchanged
#[tokio::test]
async fn test_repeated_discovery_is_idempotent() -> Result<()> {
    let server = MockServer::start().await;
    mount_polling_feed(
        &server,
        json!([message_update(1, 41), message_update(2, 42)]),
    )
    .await;

    let discovery = RecipientDiscovery::new(100, retry_config(1));
    let registry = RecipientRegistry::in_memory();
    let telegram = client(&server);

    let first = assert_ok!(registry.merge(&discovery.discover(&telegram).await).await);
    let second = assert_ok!(registry.merge(&discovery.discover(&telegram).await).await);

    assert_eq!(first, vec![RecipientId(41), RecipientId(42)]);
    assert_eq!(second, first);
    assert_eq!(registry.len().await?, 2);

    Ok(())
}
