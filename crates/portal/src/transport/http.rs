// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Browser-facing page and form handlers.
//!
//! Every user action is one render cycle: lock the session, bring the broker
//! token up to date, then render or act. The page a form post redirects to
//! belongs to the same action and makes no second broker attempt.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::error::{Error, ErrorCode};
use crate::session::lifecycle::{chat_token, user_email};
use crate::session::{AuthState, BrokerCheck, NoticeLevel, Session};
use crate::state::AppState;
use crate::token::epoch_secs;
use crate::token::oauth::AuthorizeCallback;
use crate::transport::pages::{self, Page, View};

// -- Form types ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PromptForm {
    pub prompt: String,
    #[serde(default)]
    pub return_to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturnTo {
    #[serde(default)]
    pub return_to: Option<String>,
}

// -- Render cycle -------------------------------------------------------------

/// Run the per-request broker check and queue its failure, if any, for
/// display.
pub async fn render_cycle(s: &AppState, session: &mut Session, now: u64) -> BrokerCheck {
    let check = s.lifecycle.ensure_broker(session, now).await;
    if let Some(err) = check.error() {
        session.notify_error(err);
    }
    check
}

/// Render a page. The broker check is skipped when the form post that
/// redirected here already made it.
async fn render(s: &AppState, page: Page) -> Response {
    let now = epoch_secs();
    let mut session = s.session.lock().await;
    if !session.take_checked(page.path()) {
        render_cycle(s, &mut session, now).await;
    }

    let notices = session.take_notices();
    let email = user_email(&session);
    let view = View {
        title: &s.config.title,
        notices: &notices,
        authenticated: AuthState::of(&session.tokens, now).is_authenticated(),
        email: email.as_deref(),
        conversation: &session.conversation,
    };
    match s.pages.render(page, &view) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(err = %e, "page render failed");
            ErrorCode::Internal.to_http_response("page render failed").into_response()
        }
    }
}

// -- Pages --------------------------------------------------------------------

/// `GET /` and `GET /chat`
pub async fn chat_page(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    render(&s, Page::Chat).await
}

/// `GET /auth`
pub async fn auth_page(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    render(&s, Page::Auth).await
}

/// `GET /profile`
pub async fn profile_page(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    render(&s, Page::Profile).await
}

/// `GET /about`
pub async fn about_page(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    render(&s, Page::About).await
}

// -- Chat forms ---------------------------------------------------------------

/// `POST /chat`: Send one prompt, then redirect back to the page it came from.
pub async fn chat_submit(
    State(s): State<Arc<AppState>>,
    Form(form): Form<PromptForm>,
) -> impl IntoResponse {
    let now = epoch_secs();
    let mut session = s.session.lock().await;
    render_cycle(&s, &mut session, now).await;

    let token = chat_token(&session).map(str::to_owned);
    match token {
        Some(token) => {
            let session = &mut *session;
            if let Err(e) = s.chat.send(&mut session.conversation, &form.prompt, &token).await {
                tracing::warn!(err = %e, "chat turn failed");
                session.notify_error(&e);
            }
        }
        None if AuthState::of(&session.tokens, now).is_authenticated() => {
            // Exchange failed this cycle and was already reported.
        }
        None => session.notify_error(&Error::Unauthenticated),
    }

    let target = pages::return_path(form.return_to.as_deref());
    session.mark_checked(target);
    Redirect::to(target)
}

/// `POST /chat/clear`: Drop the transcript and threading ids. Tokens stay.
pub async fn chat_clear(
    State(s): State<Arc<AppState>>,
    Form(form): Form<ReturnTo>,
) -> impl IntoResponse {
    s.session.lock().await.conversation.clear();
    tracing::debug!("conversation cleared");
    Redirect::to(pages::return_path(form.return_to.as_deref()))
}

// -- Authentication -----------------------------------------------------------

/// `GET /auth/login`: Start authorization and send the browser to the
/// provider.
pub async fn auth_login(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let mut session = s.session.lock().await;
    let redirect = s.lifecycle.begin_login(&mut session);
    tracing::info!("redirecting to authorization endpoint");
    Redirect::to(&redirect.url)
}

/// `GET /auth/callback`: Provider redirect target.
pub async fn auth_callback(
    State(s): State<Arc<AppState>>,
    Query(callback): Query<AuthorizeCallback>,
) -> impl IntoResponse {
    let now = epoch_secs();
    let mut session = s.session.lock().await;
    match s.lifecycle.complete_login(&mut session, &callback, now).await {
        Ok(check) => match check.error() {
            Some(err) => session.notify_error(err),
            None => session.notify(NoticeLevel::Info, "Authenticated successfully."),
        },
        Err(e) => session.notify_error(&e),
    }
    session.mark_checked(Page::Auth.path());
    Redirect::to(Page::Auth.path())
}

/// `POST /auth/refresh`: Forced OAuth refresh.
pub async fn auth_refresh(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let now = epoch_secs();
    let mut session = s.session.lock().await;
    match s.lifecycle.refresh_oauth(&mut session, now).await {
        Ok(()) => session.notify(NoticeLevel::Info, "Token refreshed."),
        Err(e) => session.notify_error(&e),
    }
    Redirect::to("/auth")
}

/// `POST /auth/logout`
pub async fn auth_logout(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let mut session = s.session.lock().await;
    s.lifecycle.logout(&mut session);
    session.notify(NoticeLevel::Info, "Logged out.");
    Redirect::to("/auth")
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
