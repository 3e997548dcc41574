// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound HTTP plumbing shared by the OAuth, broker and chat clients.

pub mod chat;

use std::sync::Once;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

static CRYPTO_PROVIDER: Once = Once::new();

/// Build the HTTP client used for one upstream service.
pub fn http_client(timeout: Duration) -> Client {
    CRYPTO_PROVIDER.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
    Client::builder().timeout(timeout).build().unwrap_or_default()
}

/// Read a JSON body from a response, turning non-2xx statuses and decode
/// failures into a message suitable for an error variant.
pub async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, String> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(format!("{status}: {}", text.trim()));
    }
    resp.json::<T>().await.map_err(|e| format!("invalid response body: {e}"))
}
