// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth client: two-phase authorization code + PKCE flow and refresh.

use serde::{Deserialize, Serialize};

use crate::config::PortalConfig;
use crate::error::Error;
use crate::token::pkce::{self, AuthorizeParams, PkceMethod};
use crate::token::OAuthTokenSet;
use crate::upstream::{http_client, read_json};

/// Standard OAuth2 token response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Where to send the browser to start authorization.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeRedirect {
    pub url: String,
    pub state: String,
}

/// In-flight authorization, held by the session until the browser comes
/// back through the redirect URI.
#[derive(Clone)]
pub struct PendingAuthorization {
    pub state: String,
    code_verifier: String,
    redirect_uri: String,
}

impl std::fmt::Debug for PendingAuthorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingAuthorization")
            .field("state", &self.state)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

/// Query parameters of the redirect back from the provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizeCallback {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Client for the OAuth provider's authorization and token endpoints.
pub struct OAuthClient {
    authorize_url: String,
    token_url: String,
    client_id: String,
    client_secret: Option<String>,
    http: reqwest::Client,
}

impl OAuthClient {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            authorize_url: config.authorize_url.clone(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            http: http_client(config.http_timeout()),
        }
    }

    /// First phase: build the provider URL and the verifier to keep.
    ///
    /// No token exists until [`complete_authorize`](Self::complete_authorize)
    /// runs with the callback parameters.
    pub fn begin_authorize(
        &self,
        scope: &str,
        method: PkceMethod,
        redirect_uri: &str,
    ) -> (AuthorizeRedirect, PendingAuthorization) {
        let code_verifier = pkce::generate_code_verifier();
        let code_challenge = method.challenge(&code_verifier);
        let state = pkce::generate_state();

        let url = pkce::build_auth_url(
            &self.authorize_url,
            &AuthorizeParams {
                client_id: &self.client_id,
                redirect_uri,
                scope,
                code_challenge: &code_challenge,
                method,
                state: &state,
            },
        );

        tracing::debug!(scope, method = method.as_str(), "authorization started");
        let pending = PendingAuthorization {
            state: state.clone(),
            code_verifier,
            redirect_uri: redirect_uri.to_owned(),
        };
        (AuthorizeRedirect { url, state }, pending)
    }

    /// Second phase: validate the callback against the pending
    /// authorization and exchange the code for tokens.
    pub async fn complete_authorize(
        &self,
        pending: &PendingAuthorization,
        callback: &AuthorizeCallback,
        now: u64,
    ) -> Result<OAuthTokenSet, Error> {
        if let Some(ref error) = callback.error {
            let detail = callback.error_description.as_deref().unwrap_or_default();
            return Err(Error::Auth(format!("provider returned {error} {detail}").trim().to_owned()));
        }
        let state = callback.state.as_deref().unwrap_or_default();
        if !pkce::constant_time_eq(state, &pending.state) {
            return Err(Error::Auth("authorization state mismatch".to_owned()));
        }
        let code = callback
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::Auth("callback carried no authorization code".to_owned()))?;

        let req = self.http.post(&self.token_url).form(&[
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("code", code),
            ("redirect_uri", pending.redirect_uri.as_str()),
            ("code_verifier", pending.code_verifier.as_str()),
        ]);
        let resp = self
            .apply_client_auth(req)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("token exchange request failed: {e}")))?;
        let token: TokenResponse = read_json(resp)
            .await
            .map_err(|e| Error::Auth(format!("token exchange failed ({e})")))?;

        tracing::info!(expires_in = ?token.expires_in, "authorization code exchanged");
        OAuthTokenSet::from_response(token, now)
    }

    /// Refresh the token set.
    ///
    /// Without `force`, an unexpired token set is returned unchanged. The
    /// previous refresh token is kept when the provider does not re-issue
    /// one.
    pub async fn refresh(
        &self,
        tokens: &OAuthTokenSet,
        force: bool,
        now: u64,
    ) -> Result<OAuthTokenSet, Error> {
        if !force && !tokens.is_expired(now) {
            return Ok(tokens.clone());
        }
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or_else(|| Error::Auth("no refresh token available".to_owned()))?;

        let req = self.http.post(&self.token_url).form(&[
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("refresh_token", refresh_token),
        ]);
        let resp = self
            .apply_client_auth(req)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("refresh request failed: {e}")))?;
        let token: TokenResponse =
            read_json(resp).await.map_err(|e| Error::Auth(format!("refresh failed ({e})")))?;

        tracing::info!(
            reissued_refresh_token = token.refresh_token.is_some(),
            "oauth tokens refreshed"
        );
        Ok(tokens.refreshed(token, now))
    }

    fn apply_client_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.client_secret {
            Some(secret) => req.basic_auth(&self.client_id, Some(secret)),
            None => req,
        }
    }
}

#[cfg(test)]
#[path = "oauth_tests.rs"]
mod tests;
