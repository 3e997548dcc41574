// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use crate::token::pkce::PkceMethod;

/// Configuration for the chatgate front-end.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "chatgate", version, about = "Browser chat front-end with OAuth and identity broker token lifecycle")]
pub struct PortalConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "CHATGATE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8501, env = "CHATGATE_PORT")]
    pub port: u16,

    /// OAuth client ID registered with the provider.
    #[arg(long, env = "CHATGATE_CLIENT_ID")]
    pub client_id: String,

    /// OAuth client secret. Omit for public clients.
    #[arg(long, env = "CHATGATE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// OAuth authorization endpoint.
    #[arg(long, env = "CHATGATE_AUTHORIZE_URL")]
    pub authorize_url: String,

    /// OAuth token endpoint.
    #[arg(long, env = "CHATGATE_TOKEN_URL")]
    pub token_url: String,

    /// Scope requested during authorization.
    #[arg(long, default_value = "openid", env = "CHATGATE_SCOPE")]
    pub scope: String,

    /// PKCE code challenge method sent with the authorization request.
    #[arg(long, value_enum, default_value_t = PkceMethod::S256, env = "CHATGATE_PKCE_METHOD")]
    pub pkce_method: PkceMethod,

    /// External DNS name the browser reaches us on (redirect URI host).
    #[arg(long, env = "CHATGATE_EXTERNAL_DNS")]
    pub external_dns: String,

    /// Identity broker token endpoint.
    #[arg(long, env = "CHATGATE_BROKER_URL")]
    pub broker_url: String,

    /// Client ID presented to the identity broker. Defaults to `--client-id`.
    #[arg(long, env = "CHATGATE_BROKER_CLIENT_ID")]
    pub broker_client_id: Option<String>,

    /// Chat backend endpoint.
    #[arg(long, env = "CHATGATE_CHAT_URL")]
    pub chat_url: String,

    /// Title shown in the page header and welcome text.
    #[arg(long, default_value = "Custom Chat", env = "CHATGATE_TITLE")]
    pub title: String,

    /// Bearer token for the JSON API. If unset, API auth is disabled.
    #[arg(long, env = "CHATGATE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Timeout for outbound HTTP calls in milliseconds.
    #[arg(long, default_value_t = 30000, env = "CHATGATE_HTTP_TIMEOUT_MS")]
    pub http_timeout_ms: u64,

    /// Log format (json or text).
    #[arg(long, env = "CHATGATE_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "CHATGATE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl PortalConfig {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.client_id.trim().is_empty() {
            anyhow::bail!("--client-id must not be empty");
        }
        for (flag, url) in [
            ("--authorize-url", &self.authorize_url),
            ("--token-url", &self.token_url),
            ("--broker-url", &self.broker_url),
            ("--chat-url", &self.chat_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("{flag} must be an http(s) URL, got {url:?}");
            }
        }
        let dns = self.external_dns.trim();
        if dns.is_empty() || dns.contains("://") || dns.contains('/') {
            anyhow::bail!("--external-dns must be a bare host name, got {:?}", self.external_dns);
        }
        if self.scope.split_whitespace().next().is_none() {
            anyhow::bail!("--scope must name at least one scope");
        }
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("--log-format must be json or text, got {other:?}"),
        }
        Ok(())
    }

    /// Redirect URI registered with the OAuth provider.
    pub fn redirect_uri(&self) -> String {
        format!("https://{}/auth/callback", self.external_dns.trim())
    }

    pub fn broker_client_id(&self) -> &str {
        self.broker_client_id.as_deref().unwrap_or(&self.client_id)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
