// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle: which token call, if any, a render cycle must make.
//!
//! ```text
//! Unauthenticated ──complete_login──▶ AuthenticatedNoBroker
//!        ▲                                   │ exchange
//!        │ logout / rejected refresh         ▼
//!        └────────────────────────── AuthenticatedValid ◀─┐
//!                                            │ time       │ refresh
//!                                            ▼            │
//!                                    AuthenticatedExpired ┘
//! ```
//!
//! Expiry is evaluated lazily on each call; there is no timer. Each broker
//! call is attempted once per render cycle and its failure reported.

use serde::Serialize;

use crate::config::PortalConfig;
use crate::error::Error;
use crate::session::Session;
use crate::token::broker::BrokerClient;
use crate::token::oauth::{AuthorizeCallback, AuthorizeRedirect, OAuthClient};
use crate::token::pkce::PkceMethod;
use crate::token::{claims, BrokerToken, TokenStore};

/// Authentication state derived from the token store and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Unauthenticated,
    AuthenticatedNoBroker,
    AuthenticatedValid,
    AuthenticatedExpired,
}

impl AuthState {
    pub fn of(tokens: &TokenStore, now: u64) -> Self {
        match (tokens.oauth(), tokens.broker()) {
            (None, _) => Self::Unauthenticated,
            (Some(_), None) => Self::AuthenticatedNoBroker,
            (Some(_), Some(broker)) if broker.is_valid(now) => Self::AuthenticatedValid,
            (Some(_), Some(_)) => Self::AuthenticatedExpired,
        }
    }

    pub fn is_authenticated(self) -> bool {
        self != Self::Unauthenticated
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::AuthenticatedNoBroker => "authenticated_no_broker",
            Self::AuthenticatedValid => "authenticated_valid",
            Self::AuthenticatedExpired => "authenticated_expired",
        }
    }
}

/// Outcome of [`Lifecycle::ensure_broker`] for one render cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerCheck {
    /// No OAuth token set; nothing to derive from.
    Unauthenticated,
    /// Broker token present and unexpired; no call made.
    Ready,
    /// Broker token obtained by exchanging the id token.
    Acquired,
    /// Expired broker token renewed.
    Refreshed,
    /// Exchange failed; no broker token exists.
    ExchangeFailed(Error),
    /// Refresh failed; the stale broker token is kept.
    RefreshFailed(Error),
}

impl BrokerCheck {
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::ExchangeFailed(e) | Self::RefreshFailed(e) => Some(e),
            _ => None,
        }
    }
}

/// Drives the OAuth and broker clients over a [`Session`].
pub struct Lifecycle {
    oauth: OAuthClient,
    broker: BrokerClient,
    scope: String,
    pkce_method: PkceMethod,
    redirect_uri: String,
}

impl Lifecycle {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            oauth: OAuthClient::new(config),
            broker: BrokerClient::new(config),
            scope: config.scope.clone(),
            pkce_method: config.pkce_method,
            redirect_uri: config.redirect_uri(),
        }
    }

    /// Start authorization. A previous pending authorization is replaced.
    pub fn begin_login(&self, session: &mut Session) -> AuthorizeRedirect {
        let (redirect, pending) =
            self.oauth.begin_authorize(&self.scope, self.pkce_method, &self.redirect_uri);
        session.pending_auth = Some(pending);
        redirect
    }

    /// Finish authorization from the provider redirect, then immediately
    /// derive the broker token.
    ///
    /// The pending authorization is consumed whether or not the exchange
    /// succeeds.
    pub async fn complete_login(
        &self,
        session: &mut Session,
        callback: &AuthorizeCallback,
        now: u64,
    ) -> Result<BrokerCheck, Error> {
        let pending = session
            .pending_auth
            .take()
            .ok_or_else(|| Error::Auth("no authorization in progress".to_owned()))?;

        let tokens = self
            .oauth
            .complete_authorize(&pending, callback, now)
            .await
            .inspect_err(|e| tracing::warn!(err = %e, "authorization failed"))?;
        session.tokens.install_oauth(tokens);
        tracing::info!("session authenticated");

        Ok(self.ensure_broker(session, now).await)
    }

    /// Make sure the session has a broker token, acquiring or refreshing it
    /// as the current state requires.
    pub async fn ensure_broker(&self, session: &mut Session, now: u64) -> BrokerCheck {
        let state = AuthState::of(&session.tokens, now);
        match state {
            AuthState::Unauthenticated => BrokerCheck::Unauthenticated,
            AuthState::AuthenticatedValid => BrokerCheck::Ready,
            AuthState::AuthenticatedNoBroker => {
                let Some(id_token) = session.tokens.oauth().map(|t| t.id_token.clone()) else {
                    return BrokerCheck::Unauthenticated;
                };
                match self.broker.exchange(&id_token).await {
                    Ok(grant) => {
                        session.tokens.set_broker(BrokerToken::issue(grant, now));
                        BrokerCheck::Acquired
                    }
                    Err(e) => {
                        tracing::warn!(err = %e, "broker exchange failed");
                        BrokerCheck::ExchangeFailed(e)
                    }
                }
            }
            AuthState::AuthenticatedExpired => {
                let Some(refresh_token) = session.tokens.broker().map(|t| t.refresh_token.clone())
                else {
                    return BrokerCheck::Unauthenticated;
                };
                match self.broker.refresh(&refresh_token).await {
                    Ok(grant) => {
                        session.tokens.set_broker(BrokerToken::issue(grant, now));
                        BrokerCheck::Refreshed
                    }
                    Err(e) => {
                        tracing::warn!(err = %e, "broker refresh failed, keeping stale token");
                        BrokerCheck::RefreshFailed(e)
                    }
                }
            }
        }
    }

    /// Force an OAuth refresh of the current login.
    ///
    /// A rejected refresh ends the session: only a full re-authorization
    /// recovers from it.
    pub async fn refresh_oauth(&self, session: &mut Session, now: u64) -> Result<(), Error> {
        let current = session.tokens.oauth().cloned().ok_or(Error::Unauthenticated)?;
        match self.oauth.refresh(&current, true, now).await {
            Ok(next) => {
                session.tokens.replace_oauth(next);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(err = %e, "oauth refresh rejected, session cleared");
                session.tokens.clear();
                Err(e)
            }
        }
    }

    /// End the session: tokens, pending authorization and conversation.
    pub fn logout(&self, session: &mut Session) {
        session.tokens.clear();
        session.pending_auth = None;
        session.conversation.clear();
        tracing::info!("session logged out");
    }
}

/// Broker token to authorize chat calls with, stale or not.
pub fn chat_token(session: &Session) -> Option<&str> {
    session.tokens.broker().map(|t| t.id_token.as_str())
}

/// Email of the signed-in user, read from the id token.
pub fn user_email(session: &Session) -> Option<String> {
    session.tokens.oauth().and_then(|t| claims::email(&t.id_token))
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
