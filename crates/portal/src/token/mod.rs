// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token lifecycle: the primary OAuth token set and the identity broker
//! token derived from its id token.
//!
//! Both live in a per-session [`TokenStore`]. Expiry is stamped as epoch
//! seconds at assignment time and checked lazily by the caller.

pub mod broker;
pub mod claims;
pub mod oauth;
pub mod pkce;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::token::broker::BrokerGrant;
use crate::token::oauth::TokenResponse;

/// Access/id/refresh tokens issued by the OAuth provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokenSet {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: Option<String>,
    /// Epoch seconds. `None` when the provider did not send `expires_in`.
    pub expires_at: Option<u64>,
}

impl OAuthTokenSet {
    /// Build a token set from an authorization-code response.
    pub fn from_response(resp: TokenResponse, now: u64) -> Result<Self, crate::error::Error> {
        let id_token = resp.id_token.ok_or_else(|| {
            crate::error::Error::Auth("token response carried no id_token".to_owned())
        })?;
        Ok(Self {
            access_token: resp.access_token,
            id_token,
            refresh_token: resp.refresh_token,
            expires_at: resp.expires_in.map(|s| now.saturating_add(s)),
        })
    }

    /// Apply a refresh response on top of this token set.
    ///
    /// Providers may omit `refresh_token` (and `id_token`) from a refresh
    /// response; the previous values are carried over in that case.
    pub fn refreshed(&self, resp: TokenResponse, now: u64) -> Self {
        Self {
            access_token: resp.access_token,
            id_token: resp.id_token.unwrap_or_else(|| self.id_token.clone()),
            refresh_token: resp.refresh_token.or_else(|| self.refresh_token.clone()),
            expires_at: resp.expires_in.map(|s| now.saturating_add(s)),
        }
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

impl std::fmt::Debug for OAuthTokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthTokenSet")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Token issued by the identity broker for an OIDC id token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerToken {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    /// Epoch seconds, always `issued_at + expires_in`.
    pub expires_at: u64,
}

impl BrokerToken {
    /// Stamp a broker grant with its absolute expiry.
    pub fn issue(grant: BrokerGrant, now: u64) -> Self {
        Self {
            id_token: grant.id_token,
            refresh_token: grant.refresh_token,
            expires_in: grant.expires_in,
            expires_at: now.saturating_add(grant.expires_in),
        }
    }

    pub fn is_valid(&self, now: u64) -> bool {
        now < self.expires_at
    }

    /// Seconds until expiry, `None` once expired.
    pub fn remaining(&self, now: u64) -> Option<u64> {
        self.is_valid(now).then(|| self.expires_at - now)
    }
}

impl std::fmt::Debug for BrokerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerToken")
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// In-memory holder of one session's tokens.
#[derive(Debug, Default, Clone)]
pub struct TokenStore {
    oauth: Option<OAuthTokenSet>,
    broker: Option<BrokerToken>,
}

impl TokenStore {
    pub fn oauth(&self) -> Option<&OAuthTokenSet> {
        self.oauth.as_ref()
    }

    pub fn broker(&self) -> Option<&BrokerToken> {
        self.broker.as_ref()
    }

    /// Install the token set of a fresh login. Any broker token derived
    /// from a previous login is dropped.
    pub fn install_oauth(&mut self, tokens: OAuthTokenSet) {
        self.oauth = Some(tokens);
        self.broker = None;
    }

    /// Replace the token set after a refresh of the same login. The broker
    /// token keeps its own expiry.
    pub fn replace_oauth(&mut self, tokens: OAuthTokenSet) {
        self.oauth = Some(tokens);
    }

    pub fn set_broker(&mut self, token: BrokerToken) {
        self.broker = Some(token);
    }

    pub fn clear(&mut self) {
        self.oauth = None;
        self.broker = None;
    }
}

/// Return current epoch seconds.
pub fn epoch_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
