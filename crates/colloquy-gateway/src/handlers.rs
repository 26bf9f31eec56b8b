// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unauthenticated handlers: the gateway webhook and the liveness probe.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use colloquy_core::{ColloquyError, HealthStatus};
use colloquy_dialogue::recording;
use colloquy_whatsapp::{WebhookOutcome, parse_webhook};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Maps an engine error onto a status code and JSON body. Caller mistakes
/// are 400; anything else is 500 without internal detail.
pub fn error_response(err: &ColloquyError) -> Response {
    if err.is_client_error() {
        let message = match err {
            ColloquyError::InvalidInput(message) => message.clone(),
            other => other.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response()
    } else {
        warn!(error = %err, "admin request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "internal error".to_string(),
            }),
        )
            .into_response()
    }
}

/// Acknowledgement returned to the transport gateway.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// POST /webhook
///
/// Parses the gateway event and hands accepted messages to the engine on a
/// background task, so the gateway gets its acknowledgement immediately.
pub async fn post_webhook(State(state): State<GatewayState>, body: Bytes) -> Response {
    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "webhook body is not JSON");
            recording::record_ignored("invalid_body");
            return bad_request("request body must be a JSON object");
        }
    };

    let event = match parse_webhook(&payload) {
        Ok(WebhookOutcome::Event(event)) => event,
        Ok(WebhookOutcome::Ignored(reason)) => {
            debug!(reason = reason.as_str(), "webhook event ignored");
            recording::record_ignored(reason.as_str());
            return Json(WebhookAck {
                status: "ignored",
                reason: Some(reason.as_str()),
            })
            .into_response();
        }
        Err(e) => {
            debug!(error = %e, "webhook body rejected");
            recording::record_ignored("invalid_body");
            return bad_request("request body must be a JSON object");
        }
    };

    info!(
        contact = %event.contact,
        message_id = %event.message_id,
        "webhook event accepted"
    );
    let engine = state.engine.clone();
    state.tasks.spawn(async move {
        engine.handle_event(event).await;
    });

    Json(WebhookAck {
        status: "accepted",
        reason: None,
    })
    .into_response()
}

/// GET /health
///
/// 200 while storage answers, 503 otherwise.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let (code, status, storage) = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "ok", "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, "degraded", reason),
        Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(reason = %reason, "storage unhealthy");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable", reason)
        }
        Err(e) => {
            warn!(error = %e, "storage health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                "unreachable".to_string(),
            )
        }
    };
    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            storage,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.start_time.elapsed().as_secs(),
        }),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400() {
        let response = error_response(&ColloquyError::InvalidInput("bad".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn dependency_errors_map_to_500() {
        let response = error_response(&ColloquyError::Internal("db".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn ack_omits_missing_reason() {
        let json = serde_json::to_value(WebhookAck {
            status: "accepted",
            reason: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"status": "accepted"}));
    }
}
