// Token endpoint requests (password and refresh grants)

use crate::error::Result;
use crate::http_client::BitwireHttpClient;

use super::types::{Credentials, GrantType, LoginCredentials, TokenResponse};

const TOKEN_PATH: &str = "oauth/tokens";

/// Exchange username/password for a token pair
pub async fn password_grant(
    http: &BitwireHttpClient,
    login: &LoginCredentials,
) -> Result<TokenResponse> {
    tracing::info!("Requesting Bitwire token via password grant...");

    let form = [
        ("grant_type", GrantType::Password.as_str()),
        ("client_id", login.client_id.as_str()),
        ("client_secret", login.client_secret.as_str()),
        ("username", login.username.as_str()),
        ("password", login.password.as_str()),
    ];

    let response: TokenResponse = http.post_form(TOKEN_PATH, &form, "token").await?;
    tracing::debug!(expires_in = response.expires_in, "Password grant succeeded");
    Ok(response)
}

/// Exchange a refresh token for a new token pair
pub async fn refresh_grant(
    http: &BitwireHttpClient,
    creds: &Credentials,
    refresh_token: &str,
) -> Result<TokenResponse> {
    tracing::info!("Refreshing Bitwire token...");
    tracing::debug!(
        "Refresh grant request: client_id={}...",
        creds.client_id.chars().take(8).collect::<String>()
    );

    let form = [
        ("grant_type", GrantType::RefreshToken.as_str()),
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("refresh_token", refresh_token),
    ];

    let response: TokenResponse = http.post_form(TOKEN_PATH, &form, "token").await?;
    tracing::debug!(expires_in = response.expires_in, "Refresh grant succeeded");
    Ok(response)
}
