// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport: server-rendered pages plus a small JSON API.

pub mod api;
pub mod auth;
pub mod http;
pub mod pages;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the axum `Router` with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(http::chat_page))
        .route("/chat", get(http::chat_page).post(http::chat_submit))
        .route("/chat/clear", post(http::chat_clear))
        .route("/auth", get(http::auth_page))
        .route("/auth/login", get(http::auth_login))
        .route("/auth/callback", get(http::auth_callback))
        .route("/auth/refresh", post(http::auth_refresh))
        .route("/auth/logout", post(http::auth_logout))
        .route("/profile", get(http::profile_page))
        .route("/about", get(http::about_page))
        // JSON API
        .route("/api/v1/health", get(api::health))
        .route("/api/v1/session", get(api::session_summary))
        .route("/api/v1/chat", post(api::chat))
        .route("/api/v1/chat/clear", post(api::chat_clear))
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_layer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
