// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Display-only access to OIDC id token claims.
//!
//! The payload is decoded without verifying the signature. The token came
//! straight from the provider's token endpoint over TLS; nothing read here
//! is used for an authorization decision.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Decode the claims segment of a compact JWT.
pub fn decode_unverified(jwt: &str) -> Option<IdClaims> {
    let payload = jwt.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Email claim of an id token, if present.
pub fn email(jwt: &str) -> Option<String> {
    decode_unverified(jwt)?.email
}
