// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server-side HTML rendering with handlebars templates under `src/web/`.
//! Handlers collect a [`View`] while holding the session lock.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use crate::session::{ConversationState, Notice};

/// Greeting shown in place of an empty transcript.
pub const GREETING: &str = "How can I help you?";

const LAYOUT_HTML: &str = include_str!("../web/layout.html");
const WELCOME_HTML: &str = include_str!("../web/welcome.html");
const CHAT_PANEL_HTML: &str = include_str!("../web/chat_panel.html");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Chat,
    Auth,
    Profile,
    About,
}

impl Page {
    const NAV: [Page; 4] = [Self::Chat, Self::Profile, Self::About, Self::Auth];

    pub fn path(self) -> &'static str {
        match self {
            Self::Chat => "/chat",
            Self::Auth => "/auth",
            Self::Profile => "/profile",
            Self::About => "/about",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Chat => "Chat",
            Self::Auth => "Authenticate",
            Self::Profile => "Profile",
            Self::About => "About",
        }
    }

    fn template(self) -> (&'static str, &'static str) {
        match self {
            Self::Chat => ("chat", include_str!("../web/chat.html")),
            Self::Auth => ("auth", include_str!("../web/auth.html")),
            Self::Profile => ("profile", include_str!("../web/profile.html")),
            Self::About => ("about", include_str!("../web/about.html")),
        }
    }
}

/// Snapshot of the session needed to render one page.
#[derive(Debug, Serialize)]
pub struct View<'a> {
    pub title: &'a str,
    pub notices: &'a [Notice],
    pub authenticated: bool,
    pub email: Option<&'a str>,
    pub conversation: &'a ConversationState,
}

#[derive(Debug, Serialize)]
struct NavLink {
    path: &'static str,
    label: &'static str,
    active: bool,
}

#[derive(Debug, Serialize)]
struct PageContext<'a> {
    #[serde(flatten)]
    view: &'a View<'a>,
    nav: Vec<NavLink>,
    greeting: &'static str,
    return_to: &'static str,
}

/// Registry of page templates. Values are HTML-escaped on render.
pub struct Pages {
    registry: Handlebars<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_partial("layout", LAYOUT_HTML)?;
        registry.register_partial("welcome", WELCOME_HTML)?;
        registry.register_partial("chat_panel", CHAT_PANEL_HTML)?;
        for page in Page::NAV {
            let (name, source) = page.template();
            registry.register_template_string(name, source)?;
        }
        Ok(Self { registry })
    }

    pub fn render(&self, page: Page, view: &View<'_>) -> Result<String, RenderError> {
        let nav = Page::NAV
            .iter()
            .map(|&p| NavLink { path: p.path(), label: p.label(), active: p == page })
            .collect();
        let ctx = PageContext { view, nav, greeting: GREETING, return_to: page.path() };
        self.registry.render(page.template().0, &ctx)
    }
}

/// Redirect target for form posts. Only the pages that embed the chat.
pub fn return_path(requested: Option<&str>) -> &'static str {
    match requested {
        Some("/auth") => Page::Auth.path(),
        _ => Page::Chat.path(),
    }
}

#[cfg(test)]
#[path = "pages_tests.rs"]
mod tests;
