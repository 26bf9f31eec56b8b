// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use colloquy_config::model::GatewayConfig;
use colloquy_core::{ColloquyError, StorageAdapter};
use colloquy_dialogue::{BroadcastDispatcher, DialogueEngine};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tower_http::trace::TraceLayer;

use crate::admin;
use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub engine: Arc<DialogueEngine>,
    pub storage: Arc<dyn StorageAdapter>,
    pub broadcaster: Arc<BroadcastDispatcher>,
    /// Webhook events being processed in the background.
    pub tasks: TaskTracker,
    pub auth: AuthConfig,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(
        engine: Arc<DialogueEngine>,
        storage: Arc<dyn StorageAdapter>,
        broadcaster: Arc<BroadcastDispatcher>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            engine,
            storage,
            broadcaster,
            tasks: TaskTracker::new(),
            auth,
            start_time: Instant::now(),
        }
    }
}

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl From<&GatewayConfig> for ServerConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Builds the application router.
///
/// - `GET /health` and `POST /webhook` (unauthenticated)
/// - `/admin/*` (bearer token)
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/webhook", post(handlers::post_webhook))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/admin/contacts", get(admin::get_contacts))
        .route("/admin/mode", get(admin::get_mode).post(admin::post_mode))
        .route("/admin/send", post(admin::post_send))
        .route("/admin/broadcast", post(admin::post_broadcast))
        .route(
            "/admin/personalized-broadcast",
            post(admin::post_personalized_broadcast),
        )
        .route("/admin/records", get(admin::get_records))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
}

/// Serves the gateway until `shutdown` fires, then waits for in-flight
/// webhook events to finish.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), ColloquyError> {
    let tasks = state.tasks.clone();
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ColloquyError::Transport {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| ColloquyError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tasks.close();
    tracing::info!(pending = tasks.len(), "draining webhook tasks");
    tasks.wait().await;
    tracing::info!("gateway stopped");
    Ok(())
}
