// Authentication types

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BitwireError, Result};

/// OAuth grant flow requested from the token endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    Password,
    RefreshToken,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::Password => "password",
            GrantType::RefreshToken => "refresh_token",
        }
    }
}

/// API consumer identity plus the grant flow to use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub grant_type: GrantType,
}

/// Username/password login for the initial password grant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    /// Credentials used for every refresh after this login succeeds
    pub fn refresh_credentials(&self) -> Credentials {
        Credentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            grant_type: GrantType::RefreshToken,
        }
    }
}

/// Token endpoint response (token fields are flattened into the envelope)
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub token_type: String,
    pub access_token: String,
    /// May be omitted on refresh, in which case the previous one stays valid
    #[serde(default)]
    pub refresh_token: String,
    pub expires_in: u64,
}

/// Access/refresh token pair with its local expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    /// `received_at + expires_in`, stored as a unix timestamp
    #[serde(with = "chrono::serde::ts_seconds")]
    pub valid_until: DateTime<Utc>,
}

impl Token {
    /// Build a token from a response received at `received_at`
    ///
    /// Fails when `expires_in` puts the expiry outside the representable range.
    pub fn from_response(response: TokenResponse, received_at: DateTime<Utc>) -> Result<Self> {
        let valid_until = i64::try_from(response.expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| received_at.trunc_subsecs(0).checked_add_signed(lifetime))
            .ok_or_else(|| BitwireError::InvalidResponse {
                resource: "token",
                message: format!("expires_in out of range: {}", response.expires_in),
            })?;

        Ok(Self {
            token_type: response.token_type,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
            valid_until,
        })
    }

    /// Whether the token is expired or will expire within `margin` of `now`
    pub fn expires_within(&self, margin: Duration, now: DateTime<Utc>) -> bool {
        now >= self.valid_until - margin
    }
}
