// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identity broker client: trades the OIDC id token for a broker token.
//!
//! Failures are reported once and never retried here. A broker refresh
//! token that is permanently invalid would otherwise loop forever.

use serde::{Deserialize, Serialize};

use crate::config::PortalConfig;
use crate::error::Error;
use crate::upstream::{http_client, read_json};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Token triple returned by the broker for both exchange and refresh.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerGrant {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

impl std::fmt::Debug for BrokerGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerGrant").field("expires_in", &self.expires_in).finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GrantRequest<'a> {
    client_id: &'a str,
    grant_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    assertion: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

pub struct BrokerClient {
    url: String,
    client_id: String,
    http: reqwest::Client,
}

impl BrokerClient {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            url: config.broker_url.clone(),
            client_id: config.broker_client_id().to_owned(),
            http: http_client(config.http_timeout()),
        }
    }

    /// Exchange an OIDC id token for a broker token.
    pub async fn exchange(&self, id_token: &str) -> Result<BrokerGrant, Error> {
        let body = GrantRequest {
            client_id: &self.client_id,
            grant_type: JWT_BEARER_GRANT,
            assertion: Some(id_token),
            refresh_token: None,
        };
        let grant = self.post(&body).await.map_err(Error::BrokerExchange)?;
        tracing::info!(expires_in = grant.expires_in, "broker token acquired");
        Ok(grant)
    }

    /// Renew using the broker's own refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<BrokerGrant, Error> {
        let body = GrantRequest {
            client_id: &self.client_id,
            grant_type: "refresh_token",
            assertion: None,
            refresh_token: Some(refresh_token),
        };
        let grant = self.post(&body).await.map_err(Error::BrokerRefresh)?;
        tracing::info!(expires_in = grant.expires_in, "broker token refreshed");
        Ok(grant)
    }

    async fn post(&self, body: &GrantRequest<'_>) -> Result<BrokerGrant, String> {
        let resp = self
            .http
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;
        read_json(resp).await
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
