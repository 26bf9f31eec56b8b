// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrative handlers (bearer token required).
//!
//! Handles contacts, mode, sends and broadcasts, and the paged records view.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use colloquy_core::ColloquyError;
use colloquy_core::types::InspectTable;
use colloquy_dialogue::{BroadcastReport, BroadcastStatus, current_mode, set_mode};
use serde::{Deserialize, Serialize};

use crate::handlers::error_response;
use crate::server::GatewayState;

/// Default and maximum page size for `/admin/records`.
pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 500;

#[derive(Debug, Serialize, Deserialize)]
pub struct ModeBody {
    #[serde(default)]
    pub mode: String,
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub numbers: Vec<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct PersonalizedRequest {
    #[serde(default)]
    pub template: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub table: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /admin/contacts
pub async fn get_contacts(
    State(state): State<GatewayState>,
) -> Json<BTreeMap<String, Option<String>>> {
    Json(state.engine.ledger().directory())
}

/// GET /admin/mode
pub async fn get_mode(State(state): State<GatewayState>) -> Response {
    match current_mode(state.storage.as_ref()).await {
        Ok(mode) => Json(ModeBody {
            mode: mode.to_string(),
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /admin/mode
pub async fn post_mode(State(state): State<GatewayState>, Json(body): Json<ModeBody>) -> Response {
    match set_mode(state.storage.as_ref(), &body.mode).await {
        Ok(mode) => Json(ModeBody {
            mode: mode.to_string(),
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /admin/send
pub async fn post_send(
    State(state): State<GatewayState>,
    Json(body): Json<SendRequest>,
) -> Response {
    report_response(state.broadcaster.send_to(&body.numbers, &body.message).await)
}

/// POST /admin/broadcast
pub async fn post_broadcast(
    State(state): State<GatewayState>,
    Json(body): Json<BroadcastRequest>,
) -> Response {
    report_response(state.broadcaster.broadcast(&body.message).await)
}

/// POST /admin/personalized-broadcast
pub async fn post_personalized_broadcast(
    State(state): State<GatewayState>,
    Json(body): Json<PersonalizedRequest>,
) -> Response {
    report_response(state.broadcaster.personalized(&body.template).await)
}

/// GET /admin/records?table=&limit=&offset=
pub async fn get_records(
    State(state): State<GatewayState>,
    Query(query): Query<RecordsQuery>,
) -> Response {
    let table = match query.table.as_deref().map(InspectTable::from_str) {
        Some(Ok(table)) => table,
        _ => {
            return error_response(&ColloquyError::InvalidInput(format!(
                "'table' must be one of: {}",
                [
                    InspectTable::Contacts,
                    InspectTable::DialogueTurns,
                    InspectTable::Settings,
                    InspectTable::ReceivedAttachments,
                    InspectTable::KnowledgeChunks,
                ]
                .map(|t| t.to_string())
                .join(", ")
            )));
        }
    };
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    match state.storage.inspect_table(table, limit, offset).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => error_response(&e),
    }
}

/// 200 for full success, 207 when some recipients failed, 500 when all did.
pub fn report_status(report: &BroadcastReport) -> StatusCode {
    match report.status {
        BroadcastStatus::Success => StatusCode::OK,
        BroadcastStatus::PartialSuccess => StatusCode::MULTI_STATUS,
        BroadcastStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn report_response(result: Result<BroadcastReport, ColloquyError>) -> Response {
    match result {
        Ok(report) => (report_status(&report), Json(report)).into_response(),
        Err(e) => error_response(&e),
    }
}
