// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted stand-ins for the OAuth provider, identity broker and chat
//! backend, served from one throwaway axum listener.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::config::PortalConfig;
use crate::token::pkce::PkceMethod;

/// One request seen by a scripted route.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub body: String,
    pub authorization: Option<String>,
}

/// A route that replays its responses in order, repeating the last one.
#[derive(Clone)]
pub struct Route {
    responses: Arc<Vec<(u16, Value)>>,
    calls: Arc<AtomicU32>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Route {
    fn new(responses: Vec<(u16, Value)>) -> Self {
        Self {
            responses: Arc::new(responses),
            calls: Arc::new(AtomicU32::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }

    pub async fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().await.clone()
    }

    /// Request bodies parsed as JSON (chat and broker routes).
    pub async fn json_bodies(&self) -> Vec<Value> {
        self.requests()
            .await
            .iter()
            .map(|r| serde_json::from_str(&r.body).unwrap_or(Value::Null))
            .collect()
    }

    async fn respond(&self, headers: HeaderMap, body: String) -> (StatusCode, axum::Json<Value>) {
        let idx = self.calls.fetch_add(1, Ordering::Relaxed) as usize;
        let authorization =
            headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_owned);
        self.requests.lock().await.push(Recorded { body, authorization });
        let (status, value) = self
            .responses
            .get(idx)
            .or_else(|| self.responses.last())
            .cloned()
            .unwrap_or((500, json!({})));
        (StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), axum::Json(value))
    }
}

/// Mock upstream services on `127.0.0.1:0`.
pub struct MockUpstream {
    pub addr: SocketAddr,
    pub token: Route,
    pub broker: Route,
    pub chat: Route,
}

impl MockUpstream {
    pub async fn start(
        token: Vec<(u16, Value)>,
        broker: Vec<(u16, Value)>,
        chat: Vec<(u16, Value)>,
    ) -> anyhow::Result<Self> {
        let token = Route::new(token);
        let broker = Route::new(broker);
        let chat = Route::new(chat);

        let app = Router::new()
            .route("/token", scripted(&token))
            .route("/broker", scripted(&broker))
            .route("/chat", scripted(&chat));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        Ok(Self { addr, token, broker, chat })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn config(&self) -> PortalConfig {
        PortalConfig {
            host: "127.0.0.1".into(),
            port: 0,
            client_id: "web-client".into(),
            client_secret: None,
            authorize_url: self.url("/authorize"),
            token_url: self.url("/token"),
            scope: "openid".into(),
            pkce_method: PkceMethod::S256,
            external_dns: "chat.example.com".into(),
            broker_url: self.url("/broker"),
            broker_client_id: None,
            chat_url: self.url("/chat"),
            title: "Test Chat".into(),
            api_token: None,
            http_timeout_ms: 5000,
            log_format: "text".into(),
            log_level: "debug".into(),
        }
    }
}

fn scripted(route: &Route) -> axum::routing::MethodRouter {
    let route = route.clone();
    post(move |headers: HeaderMap, body: String| {
        let route = route.clone();
        async move { route.respond(headers, body).await }
    })
}

/// Unsigned JWT carrying the given email claim.
pub fn fake_id_token(email: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "user-1", "email": email }).to_string());
    format!("{header}.{payload}.sig")
}

pub fn token_reply(refresh_token: Option<&str>, expires_in: u64) -> Value {
    let mut body = json!({
        "access_token": "access-token",
        "id_token": fake_id_token("user@example.com"),
        "expires_in": expires_in,
        "token_type": "Bearer",
    });
    if let Some(rt) = refresh_token {
        body["refresh_token"] = json!(rt);
    }
    body
}

pub fn broker_reply(id_token: &str, expires_in: u64) -> Value {
    json!({ "idToken": id_token, "refreshToken": format!("{id_token}-refresh"), "expiresIn": expires_in })
}

pub fn chat_reply(answer: &str, references: Option<&str>, conversation: &str, parent: &str) -> Value {
    let mut body = json!({
        "answer": answer,
        "conversationId": conversation,
        "parentMessageId": parent,
    });
    if let Some(refs) = references {
        body["references"] = json!(refs);
    }
    body
}
