// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chatgate: browser chat front-end that authenticates with OAuth, trades
//! the OIDC id token at an identity broker and forwards prompts to a chat
//! backend.

pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod token;
pub mod transport;
pub mod upstream;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::PortalConfig;
use crate::state::AppState;
use crate::transport::build_router;

/// Run the server until SIGINT or SIGTERM.
pub async fn run(config: PortalConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    tracing::info!(
        redirect_uri = %config.redirect_uri(),
        api_auth = config.api_token.is_some(),
        "chatgate listening on {addr}"
    );
    let state = Arc::new(AppState::new(config)?);
    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    tracing::info!("chatgate stopped");
    Ok(())
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                tracing::info!("received SIGTERM");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received SIGINT");
            }
        }
        shutdown.cancel();
    });
}
