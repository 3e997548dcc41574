// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-browser session state and the controllers that mutate it.
//!
//! [`Session`] is passed by `&mut` into every controller call; there is
//! no ambient state. Token lifecycle and conversation state are cleared
//! independently.

pub mod chat;
pub mod lifecycle;

use serde::Serialize;

use crate::token::oauth::PendingAuthorization;
use crate::token::TokenStore;

pub use chat::{ChatController, ChatMessage, ConversationState, Role};
pub use lifecycle::{AuthState, BrokerCheck, Lifecycle};

/// Severity of a message shown at the top of the next rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Everything one browser session owns.
#[derive(Debug, Default)]
pub struct Session {
    pub tokens: TokenStore,
    pub conversation: ConversationState,
    /// Authorization waiting for the provider redirect.
    pub pending_auth: Option<PendingAuthorization>,
    notices: Vec<Notice>,
    /// Page a form post redirected to after running its own broker check.
    checked_for: Option<&'static str>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notice. An identical notice already queued is not repeated.
    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        let notice = Notice { level, text: text.into() };
        if !self.notices.contains(&notice) {
            self.notices.push(notice);
        }
    }

    pub fn notify_error(&mut self, err: &crate::error::Error) {
        self.notify(NoticeLevel::Error, err.user_message());
    }

    /// Record that the action redirecting to `path` already made this
    /// cycle's broker attempt.
    pub fn mark_checked(&mut self, path: &'static str) {
        self.checked_for = Some(path);
    }

    /// Whether the page at `path` is the redirect target of an action that
    /// already checked the broker token. Consumes the mark either way.
    pub fn take_checked(&mut self, path: &str) -> bool {
        self.checked_for.take().is_some_and(|p| p == path)
    }

    /// Drain notices queued for the page being rendered.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
