// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::session::{ChatMessage, NoticeLevel, Role};

use super::*;

fn view<'a>(conversation: &'a ConversationState, notices: &'a [Notice], authenticated: bool) -> View<'a> {
    View {
        title: "Custom Chat",
        notices,
        authenticated,
        email: authenticated.then_some("user@example.com"),
        conversation,
    }
}

#[test]
fn unauthenticated_chat_page_shows_welcome_not_chat() -> anyhow::Result<()> {
    let conversation = ConversationState::default();
    let html = Pages::new()?.render(Page::Chat, &view(&conversation, &[], false))?;
    assert!(html.contains("Welcome to Custom Chat!"));
    assert!(html.contains("Please authenticate to access the chat feature."));
    assert!(!html.contains("name=\"prompt\""));
    Ok(())
}

#[test]
fn empty_transcript_renders_greeting() -> anyhow::Result<()> {
    let conversation = ConversationState::default();
    let html = Pages::new()?.render(Page::Chat, &view(&conversation, &[], true))?;
    assert!(html.contains(GREETING));
    assert!(html.contains("name=\"prompt\""));
    assert!(html.contains("value=\"/chat\""));
    Ok(())
}

#[test]
fn user_content_is_escaped() -> anyhow::Result<()> {
    let conversation = ConversationState {
        transcript: vec![ChatMessage { role: Role::User, content: "<script>x</script>".into() }],
        ..Default::default()
    };
    let notices = [Notice { level: NoticeLevel::Error, text: "<b>bad</b>".into() }];
    let mut v = view(&conversation, &notices, true);
    v.title = "{{nav}} <i>";
    let html = Pages::new()?.render(Page::Chat, &v)?;
    assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
    assert!(!html.contains("<script>x"));
    assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
    assert!(html.contains("<title>{{nav}} &lt;i&gt;</title>"));
    assert!(!html.contains(GREETING));
    Ok(())
}

#[test]
fn error_notices_render_as_banners() -> anyhow::Result<()> {
    let conversation = ConversationState::default();
    let notices = [Notice { level: NoticeLevel::Error, text: "backend down".into() }];
    let html = Pages::new()?.render(Page::Chat, &view(&conversation, &notices, true))?;
    assert!(html.contains("<div class=\"notice error\">backend down</div>"));
    Ok(())
}

#[test]
fn auth_page_switches_on_sign_in() -> anyhow::Result<()> {
    let pages = Pages::new()?;
    let conversation = ConversationState::default();
    let signed_out = pages.render(Page::Auth, &view(&conversation, &[], false))?;
    assert!(signed_out.contains("action=\"/auth/login\""));
    assert!(!signed_out.contains("/auth/logout"));

    let signed_in = pages.render(Page::Auth, &view(&conversation, &[], true))?;
    assert!(signed_in.contains("Welcome: user@example.com"));
    assert!(signed_in.contains("action=\"/auth/refresh\""));
    assert!(signed_in.contains("action=\"/auth/logout\""));
    assert!(signed_in.contains("value=\"/auth\""));
    Ok(())
}

#[test]
fn active_page_is_highlighted_in_nav() -> anyhow::Result<()> {
    let conversation = ConversationState::default();
    let html = Pages::new()?.render(Page::About, &view(&conversation, &[], false))?;
    assert!(html.contains("<a href=\"/about\" class=\"active\">About</a>"));
    assert!(html.contains("<a href=\"/chat\">Chat</a>"));
    Ok(())
}

#[test]
fn profile_shows_signed_in_email() -> anyhow::Result<()> {
    let pages = Pages::new()?;
    let conversation = ConversationState::default();
    let html = pages.render(Page::Profile, &view(&conversation, &[], true))?;
    assert!(html.contains("Signed in as user@example.com."));
    let html = pages.render(Page::Profile, &view(&conversation, &[], false))?;
    assert!(html.contains("Not signed in."));
    Ok(())
}

#[yare::parameterized(
    chat = { Some("/chat"), "/chat" },
    auth = { Some("/auth"), "/auth" },
    missing = { None, "/chat" },
    foreign = { Some("https://evil.example"), "/chat" },
)]
fn return_path_only_allows_chat_pages(requested: Option<&str>, expected: &str) {
    assert_eq!(return_path(requested), expected);
}
