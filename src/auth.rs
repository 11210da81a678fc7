//! Spotify login and token upkeep
//!
//! Tokens live in the session store so the HTTP client picks up a refreshed
//! access token on its next request.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use librespot_oauth::{OAuthClient, OAuthClientBuilder, OAuthToken};

use crate::config::SpotifyConfig;
use crate::storage::{SessionStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_EXPIRES_AT_KEY};

pub const SCOPES: &str = "streaming user-read-playback-state user-modify-playback-state user-library-read \
     user-library-modify playlist-read-private user-follow-read";

const RESPONSE: &str = r#"
<!doctype html>
<html>
<head><title>tunebox</title></head>
<body><h1>Logged in. You can close this tab.</h1><script>window.close();</script></body>
</html>
"#;

/// Refresh once fewer than this many seconds of validity remain
const REFRESH_MARGIN_SECS: i64 = 300;
const REFRESH_CHECK_INTERVAL: Duration = Duration::from_secs(60);

fn oauth_client(config: &SpotifyConfig, interactive: bool) -> Result<OAuthClient> {
    let builder = OAuthClientBuilder::new(&config.client_id, &config.redirect_uri, SCOPES.split_whitespace().collect());
    let builder = if interactive {
        builder.open_in_browser().with_custom_message(RESPONSE)
    } else {
        builder
    };
    builder.build().context("Failed to build OAuth client")
}

fn expiry_from(expires_at: Instant) -> DateTime<Utc> {
    let remaining = expires_at.saturating_duration_since(Instant::now());
    Utc::now() + chrono::Duration::from_std(remaining).unwrap_or_else(|_| chrono::Duration::seconds(3600))
}

/// Write a token set into the session store
pub fn store_token(store: &SessionStore, access_token: &str, refresh_token: &str, expires_at: DateTime<Utc>) -> Result<()> {
    store.set(ACCESS_TOKEN_KEY, access_token)?;
    if !refresh_token.is_empty() {
        store.set(REFRESH_TOKEN_KEY, refresh_token)?;
    }
    store.set(TOKEN_EXPIRES_AT_KEY, expires_at.to_rfc3339())?;
    Ok(())
}

fn save(store: &SessionStore, token: &OAuthToken) -> Result<String> {
    store_token(store, &token.access_token, &token.refresh_token, expiry_from(token.expires_at))?;
    Ok(token.access_token.clone())
}

async fn browser_login(config: &SpotifyConfig, store: &SessionStore) -> Result<String> {
    tracing::info!("Starting browser-based OAuth flow");
    let token = oauth_client(config, true)?
        .get_access_token_async()
        .await
        .context("Browser login failed")?;
    tracing::info!("Browser authentication completed successfully");
    save(store, &token)
}

/// Log in, reusing the stored refresh token when it still works.
///
/// Returns the access token.
pub async fn login(config: &SpotifyConfig, store: &SessionStore) -> Result<String> {
    let Some(refresh_token) = store.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty()) else {
        tracing::info!("No stored refresh token, starting browser authentication");
        return browser_login(config, store).await;
    };

    match oauth_client(config, false)?.refresh_token_async(&refresh_token).await {
        Ok(token) => {
            tracing::debug!("Stored refresh token accepted");
            save(store, &token)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Stored refresh token failed, re-authenticating");
            browser_login(config, store).await
        }
    }
}

/// Whether the stored access token is close to expiry. An unknown expiry never triggers a refresh.
pub fn token_needs_refresh(store: &SessionStore, now: DateTime<Utc>) -> bool {
    store
        .get(TOKEN_EXPIRES_AT_KEY)
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .is_some_and(|expires_at| (expires_at.with_timezone(&Utc) - now).num_seconds() < REFRESH_MARGIN_SECS)
}

pub async fn refresh_if_needed(config: &SpotifyConfig, store: &SessionStore) -> Result<bool> {
    if !token_needs_refresh(store, Utc::now()) {
        return Ok(false);
    }
    let refresh_token = store
        .get(REFRESH_TOKEN_KEY)
        .context("No refresh token stored")?;

    tracing::info!("Token expiring soon, refreshing...");
    let token = oauth_client(config, false)?
        .refresh_token_async(&refresh_token)
        .await
        .context("Token refresh failed")?;
    save(store, &token)?;
    tracing::info!("Token refreshed successfully");
    Ok(true)
}

/// Check the token every minute for the rest of the session
pub fn spawn_refresh_task(config: SpotifyConfig, store: SessionStore) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(REFRESH_CHECK_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(e) = refresh_if_needed(&config, &store).await {
                tracing::warn!(error = %e, "Token refresh check failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("storage.json"));
        (dir, store)
    }

    #[test]
    fn stores_all_token_parts() {
        let (_dir, store) = store();
        let expires = Utc::now() + chrono::Duration::hours(1);
        store_token(&store, "access", "refresh", expires).unwrap();

        assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("access"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).as_deref(), Some("refresh"));
        assert!(store.get(TOKEN_EXPIRES_AT_KEY).is_some());
    }

    #[test]
    fn empty_refresh_token_keeps_previous_one() {
        let (_dir, store) = store();
        let expires = Utc::now() + chrono::Duration::hours(1);
        store_token(&store, "a1", "r1", expires).unwrap();
        store_token(&store, "a2", "", expires).unwrap();

        assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("a2"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).as_deref(), Some("r1"));
    }

    #[test]
    fn refresh_is_due_inside_five_minutes() {
        let (_dir, store) = store();
        let now = Utc::now();

        assert!(!token_needs_refresh(&store, now));

        store_token(&store, "a", "r", now + chrono::Duration::minutes(30)).unwrap();
        assert!(!token_needs_refresh(&store, now));

        store_token(&store, "a", "r", now + chrono::Duration::minutes(2)).unwrap();
        assert!(token_needs_refresh(&store, now));
    }
}
