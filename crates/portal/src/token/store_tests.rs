// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use proptest::prelude::*;

use super::*;

fn grant(expires_in: u64) -> BrokerGrant {
    BrokerGrant {
        id_token: "broker-id".to_owned(),
        refresh_token: "broker-refresh".to_owned(),
        expires_in,
    }
}

fn token_set() -> OAuthTokenSet {
    OAuthTokenSet {
        access_token: "access-1".to_owned(),
        id_token: "id-1".to_owned(),
        refresh_token: Some("refresh-1".to_owned()),
        expires_at: Some(1_000),
    }
}

fn refresh_response(refresh_token: Option<&str>) -> TokenResponse {
    TokenResponse {
        access_token: "access-2".to_owned(),
        id_token: Some("id-2".to_owned()),
        refresh_token: refresh_token.map(str::to_owned),
        expires_in: Some(3600),
        token_type: Some("Bearer".to_owned()),
    }
}

#[test]
fn broker_token_expiry_is_stamped_at_issue() -> anyhow::Result<()> {
    let token = BrokerToken::issue(grant(900), 10_000);
    assert_eq!(token.expires_at, 10_900);
    assert!(token.is_valid(10_899));
    assert!(!token.is_valid(10_900));
    assert_eq!(token.remaining(10_000), Some(900));
    assert_eq!(token.remaining(11_000), None);
    Ok(())
}

#[test]
fn install_oauth_drops_broker_token() -> anyhow::Result<()> {
    let mut store = TokenStore::default();
    store.install_oauth(token_set());
    store.set_broker(BrokerToken::issue(grant(60), 0));
    assert!(store.broker().is_some());

    store.install_oauth(token_set());
    assert!(store.oauth().is_some());
    assert!(store.broker().is_none());
    Ok(())
}

#[test]
fn replace_oauth_keeps_broker_token() -> anyhow::Result<()> {
    let mut store = TokenStore::default();
    store.install_oauth(token_set());
    store.set_broker(BrokerToken::issue(grant(60), 0));

    let refreshed = token_set().refreshed(refresh_response(None), 500);
    store.replace_oauth(refreshed);
    assert!(store.broker().is_some());
    assert_eq!(store.oauth().map(|t| t.access_token.as_str()), Some("access-2"));
    Ok(())
}

#[test]
fn clear_removes_everything() -> anyhow::Result<()> {
    let mut store = TokenStore::default();
    store.install_oauth(token_set());
    store.set_broker(BrokerToken::issue(grant(60), 0));
    store.clear();
    assert!(store.oauth().is_none());
    assert!(store.broker().is_none());
    Ok(())
}

#[test]
fn from_response_requires_id_token() -> anyhow::Result<()> {
    let mut resp = refresh_response(Some("r"));
    resp.id_token = None;
    let err = OAuthTokenSet::from_response(resp, 0).err();
    assert!(matches!(err, Some(crate::error::Error::Auth(_))));
    Ok(())
}

#[test]
fn refreshed_keeps_id_token_when_omitted() -> anyhow::Result<()> {
    let mut resp = refresh_response(None);
    resp.id_token = None;
    let next = token_set().refreshed(resp, 100);
    assert_eq!(next.id_token, "id-1");
    assert_eq!(next.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(next.expires_at, Some(3700));
    Ok(())
}

#[test]
fn oauth_expiry_without_expires_in_never_expires() -> anyhow::Result<()> {
    let mut set = token_set();
    set.expires_at = None;
    assert!(!set.is_expired(u64::MAX));
    Ok(())
}

#[yare::parameterized(
    from_login = { true },
    from_refresh = { false },
)]
fn huge_expires_in_saturates(login: bool) {
    let mut resp = refresh_response(Some("refresh-2"));
    resp.expires_in = Some(u64::MAX);
    let set = if login {
        OAuthTokenSet::from_response(resp, 1_700_000_000).ok()
    } else {
        Some(token_set().refreshed(resp, 1_700_000_000))
    };
    let set = set.unwrap_or_else(token_set);
    assert_eq!(set.expires_at, Some(u64::MAX));
    assert!(!set.is_expired(1_700_000_000));
}

#[test]
fn broker_expiry_saturates() -> anyhow::Result<()> {
    let token = BrokerToken::issue(grant(u64::MAX), 1_700_000_000);
    assert_eq!(token.expires_at, u64::MAX);
    assert!(token.is_valid(1_700_000_000));
    Ok(())
}

#[test]
fn debug_output_hides_token_values() -> anyhow::Result<()> {
    let rendered = format!("{:?} {:?}", token_set(), BrokerToken::issue(grant(60), 0));
    assert!(!rendered.contains("access-1"));
    assert!(!rendered.contains("refresh-1"));
    assert!(!rendered.contains("broker-id"));
    Ok(())
}

proptest! {
    #[test]
    fn broker_validity_matches_expiry(issued in 0u64..1_000_000_000, ttl in 0u64..100_000, at in 0u64..2_000_000_000) {
        let token = BrokerToken::issue(grant(ttl), issued);
        prop_assert_eq!(token.expires_at, issued + ttl);
        prop_assert_eq!(token.is_valid(at), at < issued + ttl);
    }

    #[test]
    fn refresh_sequences_never_lose_refresh_token(reissued in proptest::collection::vec(proptest::option::of("[a-z]{4,8}"), 1..12)) {
        let mut set = token_set();
        let mut expected = set.refresh_token.clone();
        for (i, rt) in reissued.iter().enumerate() {
            set = set.refreshed(refresh_response(rt.as_deref()), i as u64);
            if rt.is_some() {
                expected = rt.clone();
            }
            prop_assert_eq!(&set.refresh_token, &expected);
        }
        prop_assert!(set.refresh_token.is_some());
    }
}
