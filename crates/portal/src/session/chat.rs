// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversation threading and transcript for one session.

use serde::{Deserialize, Serialize};

use crate::config::PortalConfig;
use crate::error::Error;
use crate::upstream::chat::{ChatClient, ChatRequest, ChatResponse};

/// Separator between an answer and its source references.
pub const SOURCES_SEPARATOR: &str = "\n\n---\n";

/// Marker appended when the backend returns no references.
pub const NO_SOURCES: &str = "No sources";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Threading ids and transcript. Empty ids mean "start a new conversation".
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationState {
    pub conversation_id: String,
    pub parent_message_id: String,
    pub transcript: Vec<ChatMessage>,
}

impl ConversationState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Result of one successful chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub text: String,
    pub conversation_id: String,
    pub parent_message_id: String,
}

/// Render a backend answer with its references, or the no-sources marker.
pub fn render_answer(resp: &ChatResponse) -> String {
    let sources = resp.references.as_deref().unwrap_or(NO_SOURCES);
    format!("{}{SOURCES_SEPARATOR}{sources}", resp.answer)
}

pub struct ChatController {
    client: ChatClient,
}

impl ChatController {
    pub fn new(config: &PortalConfig) -> Self {
        Self { client: ChatClient::new(config) }
    }

    /// Send one prompt on the current thread.
    ///
    /// On success the thread moves to the ids returned by the backend and
    /// both sides of the turn are appended to the transcript. On failure the
    /// conversation is left untouched.
    pub async fn send(
        &self,
        conversation: &mut ConversationState,
        prompt: &str,
        auth_token: &str,
    ) -> Result<ChatTurn, Error> {
        if prompt.trim().is_empty() {
            return Err(Error::BadRequest("prompt must not be empty".to_owned()));
        }

        let req = ChatRequest {
            prompt,
            conversation_id: non_empty(&conversation.conversation_id),
            parent_message_id: non_empty(&conversation.parent_message_id),
        };
        let resp = self
            .client
            .ask(&req, auth_token)
            .await
            .inspect_err(|e| tracing::warn!(err = %e, "chat backend call failed"))?;

        let text = render_answer(&resp);
        tracing::debug!(
            conversation_id = %resp.conversation_id,
            parent_message_id = %resp.parent_message_id,
            references = resp.references.is_some(),
            "chat turn completed"
        );

        conversation.conversation_id = resp.conversation_id;
        conversation.parent_message_id = resp.parent_message_id;
        conversation.transcript.push(ChatMessage { role: Role::User, content: prompt.to_owned() });
        conversation.transcript.push(ChatMessage { role: Role::Assistant, content: text.clone() });

        Ok(ChatTurn {
            text,
            conversation_id: conversation.conversation_id.clone(),
            parent_message_id: conversation.parent_message_id.clone(),
        })
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
