// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON API over the same session the pages drive.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::session::chat::ChatTurn;
use crate::session::lifecycle::{chat_token, user_email};
use crate::session::{AuthState, ConversationState};
use crate::state::AppState;
use crate::token::epoch_secs;

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub state: AuthState,
}

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub state: AuthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Seconds until the broker token expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_error: Option<String>,
    pub conversation: ConversationState,
}

#[derive(Debug, Deserialize)]
pub struct ChatApiRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ChatApiResponse {
    #[serde(flatten)]
    pub turn: ChatTurn,
    /// Broker refresh failure from this cycle; the stale token was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: bool,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let session = s.session.lock().await;
    let state = AuthState::of(&session.tokens, epoch_secs());
    Json(HealthResponse { status: "running".to_owned(), state })
}

/// `GET /api/v1/session`
pub async fn session_summary(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let now = epoch_secs();
    let mut session = s.session.lock().await;
    let check = s.lifecycle.ensure_broker(&mut session, now).await;

    Json(SessionSummary {
        state: AuthState::of(&session.tokens, now),
        email: user_email(&session),
        broker_expires_in: session.tokens.broker().and_then(|b| b.remaining(now)),
        broker_error: check.error().map(Error::user_message),
        conversation: session.conversation.clone(),
    })
}

/// `POST /api/v1/chat`
pub async fn chat(
    State(s): State<Arc<AppState>>,
    Json(req): Json<ChatApiRequest>,
) -> impl IntoResponse {
    let now = epoch_secs();
    let mut session = s.session.lock().await;
    let check = s.lifecycle.ensure_broker(&mut session, now).await;

    let Some(token) = chat_token(&session).map(str::to_owned) else {
        let err = check.error().cloned().unwrap_or(Error::Unauthenticated);
        return err.code().to_http_response(err.to_string()).into_response();
    };

    match s.chat.send(&mut session.conversation, &req.prompt, &token).await {
        Ok(turn) => {
            let warning = check.error().map(Error::user_message);
            Json(ChatApiResponse { turn, warning }).into_response()
        }
        Err(e) => {
            tracing::warn!(err = %e, "chat turn failed");
            e.code().to_http_response(e.to_string()).into_response()
        }
    }
}

/// `POST /api/v1/chat/clear`
pub async fn chat_clear(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    s.session.lock().await.conversation.clear();
    Json(ClearResponse { cleared: true })
}
