// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the external chat backend.

use serde::{Deserialize, Serialize};

use crate::config::PortalConfig;
use crate::error::Error;
use crate::upstream::{http_client, read_json};

/// Request body for one chat turn. Unset threading ids are omitted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest<'a> {
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<&'a str>,
}

/// Backend answer with the threading ids for the next turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
    pub conversation_id: String,
    pub parent_message_id: String,
}

pub struct ChatClient {
    url: String,
    http: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: &PortalConfig) -> Self {
        Self { url: config.chat_url.clone(), http: http_client(config.http_timeout()) }
    }

    /// Send one prompt, authorized with the broker token.
    pub async fn ask(&self, req: &ChatRequest<'_>, auth_token: &str) -> Result<ChatResponse, Error> {
        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(auth_token)
            .json(req)
            .send()
            .await
            .map_err(|e| Error::BackendCall(format!("request failed: {e}")))?;
        read_json(resp).await.map_err(Error::BackendCall)
    }
}
