use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use crate::error::{BitwireError, Result};
use crate::http_client::BitwireHttpClient;

use super::grant;
use super::types::{Credentials, LoginCredentials, Token};

/// Refresh this many seconds before the server-side expiry
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 30;

/// Current session: a token plus the credentials able to refresh it
#[derive(Debug, Clone, Default)]
struct Session {
    token: Option<Token>,
    credentials: Option<Credentials>,
}

/// Bearer token for one request, plus the new token if it had to be refreshed
#[derive(Debug, Clone)]
pub struct Bearer {
    pub access_token: String,
    pub refreshed: Option<Token>,
}

/// Token manager
/// Owns the session and performs check-then-refresh before authenticated calls
pub struct TokenManager {
    /// Held across the whole check/refresh/store sequence
    session: Mutex<Session>,

    /// How long before expiry a token is considered stale
    refresh_margin: Duration,
}

impl TokenManager {
    /// Create an unauthenticated manager
    pub fn new(refresh_margin: Duration) -> Self {
        Self {
            session: Mutex::new(Session::default()),
            refresh_margin,
        }
    }

    /// Create a manager resuming a previously stored session
    pub fn with_session(
        token: Token,
        credentials: Option<Credentials>,
        refresh_margin: Duration,
    ) -> Self {
        Self {
            session: Mutex::new(Session {
                token: Some(token),
                credentials,
            }),
            refresh_margin,
        }
    }

    pub fn refresh_margin(&self) -> Duration {
        self.refresh_margin
    }

    pub async fn token(&self) -> Option<Token> {
        self.session.lock().await.token.clone()
    }

    pub async fn credentials(&self) -> Option<Credentials> {
        self.session.lock().await.credentials.clone()
    }

    /// Password grant; stores the token and refresh credentials on success
    /// On failure the session is left as it was
    pub async fn authenticate(
        &self,
        http: &BitwireHttpClient,
        login: &LoginCredentials,
    ) -> Result<Token> {
        let mut session = self.session.lock().await;

        let response = grant::password_grant(http, login).await.map_err(|e| {
            tracing::error!("Authentication failed: {}", e);
            e
        })?;
        let token = Token::from_response(response, Utc::now())?;

        session.token = Some(token.clone());
        session.credentials = Some(login.refresh_credentials());

        tracing::info!(
            "Authenticated, token valid until {}",
            token.valid_until.to_rfc3339()
        );
        Ok(token)
    }

    /// Force a refresh grant and replace the stored token
    pub async fn refresh(&self, http: &BitwireHttpClient) -> Result<Token> {
        let mut session = self.session.lock().await;
        Self::refresh_locked(&mut session, http).await
    }

    /// Get a bearer token for an authenticated call, refreshing it first if it
    /// expires within the margin
    pub async fn bearer(&self, http: &BitwireHttpClient) -> Result<Bearer> {
        let mut session = self.session.lock().await;

        let token = session.token.as_ref().ok_or_else(|| {
            BitwireError::Unauthenticated("no access token; authenticate first".to_string())
        })?;

        if !token.expires_within(self.refresh_margin, Utc::now()) {
            return Ok(Bearer {
                access_token: token.access_token.clone(),
                refreshed: None,
            });
        }

        tracing::debug!(
            "Token expires at {}, refreshing before request",
            token.valid_until.to_rfc3339()
        );
        let refreshed = Self::refresh_locked(&mut session, http).await?;

        Ok(Bearer {
            access_token: refreshed.access_token.clone(),
            refreshed: Some(refreshed),
        })
    }

    /// Refresh while holding the session lock
    /// The stored token is only replaced once the refresh grant succeeds
    async fn refresh_locked(session: &mut Session, http: &BitwireHttpClient) -> Result<Token> {
        let credentials = session.credentials.as_ref().ok_or_else(|| {
            BitwireError::Unauthenticated(
                "no refresh credentials; authenticate with username and password first"
                    .to_string(),
            )
        })?;
        let current = session.token.as_ref().ok_or_else(|| {
            BitwireError::Unauthenticated("no refresh token; authenticate first".to_string())
        })?;

        let response = grant::refresh_grant(http, credentials, &current.refresh_token)
            .await
            .map_err(|e| {
                tracing::error!("Token refresh failed: {}", e);
                e
            })?;

        let mut token = Token::from_response(response, Utc::now())?;
        if token.refresh_token.is_empty() {
            token.refresh_token = current.refresh_token.clone();
        }

        tracing::info!(
            "Token refreshed, valid until {}",
            token.valid_until.to_rfc3339()
        );
        session.token = Some(token.clone());
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::types::GrantType;
    use proptest::prelude::*;

    fn token_valid_for(seconds: i64) -> Token {
        Token {
            token_type: "Bearer".to_string(),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_in: 3600,
            valid_until: Utc::now() + Duration::seconds(seconds),
        }
    }

    fn unreachable_http() -> BitwireHttpClient {
        BitwireHttpClient::new(
            "http://127.0.0.1:9/",
            std::time::Duration::from_millis(200),
            std::time::Duration::from_millis(200),
        )
        .unwrap()
    }

    #[test]
    fn test_token_expiration_check() {
        let margin = Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS);

        // Ten minutes left: no refresh needed
        assert!(!token_valid_for(600).expires_within(margin, Utc::now()));

        // Ten seconds left: inside the margin
        assert!(token_valid_for(10).expires_within(margin, Utc::now()));

        // Already expired
        assert!(token_valid_for(-60).expires_within(margin, Utc::now()));
    }

    proptest! {
        #[test]
        fn prop_refresh_iff_inside_margin(remaining in -7200i64..7200, margin in 0i64..600) {
            let now = Utc::now();
            let token = Token {
                token_type: "Bearer".to_string(),
                access_token: "a".to_string(),
                refresh_token: "r".to_string(),
                expires_in: 3600,
                valid_until: now + Duration::seconds(remaining),
            };
            prop_assert_eq!(
                token.expires_within(Duration::seconds(margin), now),
                remaining <= margin
            );
        }
    }

    #[tokio::test]
    async fn test_bearer_without_token_is_unauthenticated() {
        let manager = TokenManager::new(Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS));
        let err = manager.bearer(&unreachable_http()).await.unwrap_err();

        assert!(matches!(err, BitwireError::Unauthenticated(_)));
        assert!(manager.token().await.is_none());
    }

    #[tokio::test]
    async fn test_bearer_with_fresh_token_skips_refresh() {
        let manager = TokenManager::with_session(
            token_valid_for(600),
            None,
            Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS),
        );
        let bearer = manager.bearer(&unreachable_http()).await.unwrap();

        assert_eq!(bearer.access_token, "access");
        assert!(bearer.refreshed.is_none());
    }

    #[tokio::test]
    async fn test_expiring_token_without_credentials_cannot_refresh() {
        let token = token_valid_for(5);
        let manager = TokenManager::with_session(
            token.clone(),
            None,
            Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS),
        );
        let err = manager.bearer(&unreachable_http()).await.unwrap_err();

        assert!(matches!(err, BitwireError::Unauthenticated(_)));
        assert_eq!(manager.token().await, Some(token));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_stored_token() {
        let token = token_valid_for(5);
        let credentials = Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            grant_type: GrantType::RefreshToken,
        };
        let manager = TokenManager::with_session(
            token.clone(),
            Some(credentials),
            Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS),
        );
        let err = manager.refresh(&unreachable_http()).await.unwrap_err();

        assert!(matches!(err, BitwireError::Transport(_)));
        assert_eq!(manager.token().await, Some(token));
    }
}
