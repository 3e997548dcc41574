// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failures of the token lifecycle and the chat backend.
///
/// Nothing is retried automatically; each variant names the user action
/// that recovers from it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The OAuth provider rejected an exchange or refresh. Requires a full
    /// re-authorization.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// The identity broker rejected the OIDC id token.
    #[error("identity broker exchange failed: {0}")]
    BrokerExchange(String),
    /// The identity broker rejected its own refresh token. Requires a
    /// manual reload.
    #[error("identity broker refresh failed: {0}")]
    BrokerRefresh(String),
    /// The chat backend call failed.
    #[error("chat backend call failed: {0}")]
    BackendCall(String),
    #[error("not authenticated")]
    Unauthenticated,
    #[error("{0}")]
    BadRequest(String),
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Auth(_) => ErrorCode::AuthFailed,
            Self::BrokerExchange(_) => ErrorCode::BrokerExchangeFailed,
            Self::BrokerRefresh(_) => ErrorCode::BrokerRefreshFailed,
            Self::BackendCall(_) => ErrorCode::BackendError,
            Self::Unauthenticated => ErrorCode::Unauthenticated,
            Self::BadRequest(_) => ErrorCode::BadRequest,
        }
    }

    /// Message shown inline in the UI for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::BrokerRefresh(_) => {
                format!("Error refreshing identity broker token: {self}. Please reload the page.")
            }
            Self::Auth(_) => format!("{self}. Please authenticate again."),
            _ => self.to_string(),
        }
    }
}

/// Error codes for the JSON API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Unauthenticated,
    AuthFailed,
    BrokerExchangeFailed,
    BrokerRefreshFailed,
    BackendError,
    BadRequest,
    Internal,
}

impl ErrorCode {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::AuthFailed => 401,
            Self::BrokerExchangeFailed => 502,
            Self::BrokerRefreshFailed => 502,
            Self::BackendError => 502,
            Self::BadRequest => 400,
            Self::Internal => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::AuthFailed => "AUTH_FAILED",
            Self::BrokerExchangeFailed => "BROKER_EXCHANGE_FAILED",
            Self::BrokerRefreshFailed => "BROKER_REFRESH_FAILED",
            Self::BackendError => "BACKEND_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::Internal => "INTERNAL",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { code: self.as_str().to_owned(), message: message.into() }
    }

    pub fn to_http_response(
        &self,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: self.to_error_body(message) };
        (status, Json(body))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
