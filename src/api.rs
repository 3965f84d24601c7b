use std::{any::Any, sync::Arc};

use anyhow::{Error, Result, anyhow};
use axum::{
    Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use reqwest::Client;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    broadcast::{
        BroadcastService, discovery::RecipientDiscovery, dispatcher::Dispatcher,
    },
    clients::{
        health::HealthChecker,
        recipients::RecipientRegistry,
        telegram::{TelegramClient, build_http_client},
    },
    config::Config,
    error::{BroadcastError, MembershipError},
    membership::check_membership,
    models::{
        broadcast::{BroadcastParams, BroadcastReport},
        health::HealthStatus,
        membership::{MembershipParams, MembershipResult},
        response::{ApiResponse, DataBody, MEMBERSHIP_API_VERSION},
        validation::{validate_broadcast, validate_membership},
    },
};

pub struct AppState {
    config: Config,
    http_client: Client,
    broadcaster: BroadcastService,
    health_checker: HealthChecker,
}

impl AppState {
    pub fn new(config: Config, registry: RecipientRegistry) -> Result<Self, Error> {
        let http_client = build_http_client(&config)?;

        let broadcaster = BroadcastService::new(
            registry.clone(),
            RecipientDiscovery::from_config(&config),
            Dispatcher::new(config.dispatch_config()),
        );

        Ok(Self {
            config,
            http_client,
            broadcaster,
            health_checker: HealthChecker::new(registry),
        })
    }

    pub fn registry(&self) -> &RecipientRegistry {
        self.broadcaster.registry()
    }

    fn telegram(&self, token: &str) -> TelegramClient {
        TelegramClient::new(
            self.http_client.clone(),
            &self.config.telegram_api_base_url,
            token,
        )
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_help))
        .route("/health", get(health_check))
        .route(
            "/api/broadcast",
            get(broadcast_query)
                .post(broadcast_json)
                .fallback(broadcast_method_not_allowed),
        )
        .route(
            "/api/check",
            get(check_query)
                .post(check_json)
                .fallback(check_method_not_allowed)
                .layer(CatchPanicLayer::custom(handle_check_panic)),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: Config) -> Result<(), Error> {
    let registry = RecipientRegistry::from_config(&config).await?;
    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = Arc::new(AppState::new(config, registry)?);

    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Broadcast API server started");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

type BroadcastResponse = Json<ApiResponse<DataBody<BroadcastReport>>>;

async fn root_help() -> Json<ApiResponse<Value>> {
    Json(
        ApiResponse::success(json!({
            "message": "Telegram Broadcast API",
            "endpoints": {
                "broadcast": "/api/broadcast",
                "membership_check": "/api/check"
            },
            "usage": {
                "broadcast": "Send a message to all bot users",
                "membership_check": "Check user membership in groups/channels"
            }
        }))
        .with_meta(),
    )
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all().await;

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn broadcast_query(
    State(state): State<Arc<AppState>>,
    params: Result<Query<BroadcastParams>, QueryRejection>,
) -> Result<BroadcastResponse, BroadcastError> {
    let Query(params) = params.map_err(|_| BroadcastError::MissingParameters)?;
    broadcast(&state, params).await
}

async fn broadcast_json(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BroadcastParams>, JsonRejection>,
) -> Result<BroadcastResponse, BroadcastError> {
    let Json(params) = payload.map_err(|e| BroadcastError::InvalidJson(e.body_text()))?;
    broadcast(&state, params).await
}

async fn broadcast(
    state: &AppState,
    params: BroadcastParams,
) -> Result<BroadcastResponse, BroadcastError> {
    let request = validate_broadcast(params)?;
    let client = state.telegram(&request.token);

    let report = state.broadcaster.broadcast(&client, &request).await?;

    Ok(Json(ApiResponse::success(DataBody { data: report }).with_meta()))
}

async fn broadcast_method_not_allowed() -> BroadcastError {
    BroadcastError::MethodNotAllowed
}

async fn check_query(
    State(state): State<Arc<AppState>>,
    params: Result<Query<MembershipParams>, QueryRejection>,
) -> Result<Response, MembershipError> {
    let Query(params) = params.map_err(|_| MembershipError::MissingParameters)?;

    if params.token.is_none() {
        return Ok(check_help().into_response());
    }

    let result = check(&state, params).await?;
    Ok(result.into_response())
}

async fn check_json(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MembershipParams>, JsonRejection>,
) -> Result<Json<ApiResponse<MembershipResult>>, MembershipError> {
    let Json(params) = payload.map_err(|e| MembershipError::InvalidJson(e.body_text()))?;
    check(&state, params).await
}

async fn check(
    state: &AppState,
    params: MembershipParams,
) -> Result<Json<ApiResponse<MembershipResult>>, MembershipError> {
    let request = validate_membership(params)?;
    let client = state.telegram(&request.token);

    let result = check_membership(&client, &request).await?;

    Ok(Json(ApiResponse::success(result).with_social()))
}

fn check_help() -> Json<ApiResponse<Value>> {
    Json(
        ApiResponse::success(json!({
            "message": "Telegram Membership Checker API",
            "usage": "/api/check?token=BOT_TOKEN&user_id=123456789&chat_id=JunnioMarket",
            "note": "Remove \"@\", it is handled automatically.",
            "method": ["GET", "POST"],
            "version": MEMBERSHIP_API_VERSION
        }))
        .with_social(),
    )
}

async fn check_method_not_allowed() -> MembershipError {
    MembershipError::MethodNotAllowed
}

/// Broadcast-style 500 for panics outside `/api/check`.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    BroadcastError::Internal(anyhow!(panic_detail(err))).into_response()
}

/// Membership-style 500 for panics inside `/api/check`.
fn handle_check_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    MembershipError::Internal(anyhow!(panic_detail(err))).into_response()
}

fn panic_detail(err: Box<dyn Any + Send + 'static>) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}
