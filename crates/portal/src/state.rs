// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tokio::sync::Mutex;

use crate::config::PortalConfig;
use crate::session::{ChatController, Lifecycle, Session};
use crate::transport::pages::Pages;

/// Shared server state.
///
/// One browser session per process. The session mutex is held for a whole
/// render cycle, so cycles (and chat prompts) never overlap.
pub struct AppState {
    pub config: PortalConfig,
    pub lifecycle: Lifecycle,
    pub chat: ChatController,
    pub pages: Pages,
    pub session: Mutex<Session>,
}

impl AppState {
    pub fn new(config: PortalConfig) -> anyhow::Result<Self> {
        Ok(Self {
            lifecycle: Lifecycle::new(&config),
            chat: ChatController::new(&config),
            pages: Pages::new()?,
            session: Mutex::new(Session::new()),
            config,
        })
    }
}
