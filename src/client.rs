// Bitwire API client
// One method per endpoint; authenticated calls go through the token manager

use chrono::Duration;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::auth::{Credentials, LoginCredentials, Token, TokenManager, DEFAULT_REFRESH_MARGIN_SECS};
use crate::error::{BitwireError, Result};
use crate::http_client::BitwireHttpClient;
use crate::models::responses::{
    AllRatesResponse, BanksResponse, LimitsResponse, RatesResponse, RecipientsResponse,
    TransferResponse, TransfersResponse,
};
use crate::models::{AllRates, Bank, CreateTransfer, Limits, Rates, Recipient, Transfer};

pub const PRODUCTION_BASE_URL: &str = "https://www.bitwire.co/api/v1/";
pub const SANDBOX_BASE_URL: &str = "https://sandbox.bitwire.co/api/v1/";

/// API environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Production,
    Sandbox,
}

impl Mode {
    pub fn base_url(&self) -> &'static str {
        match self {
            Mode::Production => PRODUCTION_BASE_URL,
            Mode::Sandbox => SANDBOX_BASE_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Production => "production",
            Mode::Sandbox => "sandbox",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = BitwireError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "production" => Ok(Mode::Production),
            "sandbox" => Ok(Mode::Sandbox),
            _ => Err(BitwireError::Config("Invalid mode".to_string())),
        }
    }
}

/// Tunables for a client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Overrides the mode's base URL (local test servers)
    pub base_url: Option<String>,
    pub connect_timeout: std::time::Duration,
    pub request_timeout: std::time::Duration,
    pub refresh_margin: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            connect_timeout: std::time::Duration::from_secs(10),
            request_timeout: std::time::Duration::from_secs(30),
            refresh_margin: Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS),
        }
    }
}

/// Result of an authenticated call
/// `refreshed` holds the new token when the call had to refresh first
#[derive(Debug, Clone)]
pub struct Authed<T> {
    pub value: T,
    pub refreshed: Option<Token>,
}

impl<T> Authed<T> {
    pub fn token_refreshed(&self) -> bool {
        self.refreshed.is_some()
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Bitwire API client
pub struct BitwireClient {
    mode: Mode,
    http: BitwireHttpClient,
    auth: TokenManager,
}

impl BitwireClient {
    /// Create a client for `mode` ("production" or "sandbox") with default options
    pub fn new(mode: &str) -> Result<Self> {
        Self::with_options(mode.parse()?, ClientOptions::default())
    }

    pub fn with_options(mode: Mode, options: ClientOptions) -> Result<Self> {
        let base_url = options.base_url.as_deref().unwrap_or(mode.base_url());
        let http =
            BitwireHttpClient::new(base_url, options.connect_timeout, options.request_timeout)?;
        tracing::debug!("Bitwire client in {} mode ({})", mode, http.base_url());

        Ok(Self {
            mode,
            http,
            auth: TokenManager::new(options.refresh_margin),
        })
    }

    /// Resume a stored session
    /// Without `credentials` the token is used until it expires but cannot be refreshed
    pub fn restore(mut self, token: Token, credentials: Option<Credentials>) -> Self {
        let margin = self.auth.refresh_margin();
        self.auth = TokenManager::with_session(token, credentials, margin);
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    pub async fn token(&self) -> Option<Token> {
        self.auth.token().await
    }

    pub async fn credentials(&self) -> Option<Credentials> {
        self.auth.credentials().await
    }

    // ==============================================================================================
    // Authentication
    // ==============================================================================================

    /// Exchange username/password for a token and keep it for later calls
    pub async fn authenticate(&self, login: &LoginCredentials) -> Result<Token> {
        self.auth.authenticate(&self.http, login).await
    }

    /// Refresh the stored token now, regardless of its expiry
    pub async fn refresh_token(&self) -> Result<Token> {
        self.auth.refresh(&self.http).await
    }

    // ==============================================================================================
    // Public endpoints
    // ==============================================================================================

    pub async fn get_all_rates(&self) -> Result<AllRates> {
        tracing::info!("Fetching all rates");
        let res: AllRatesResponse = self.http.get("rates", None, "rates").await?;
        Ok(res.rates)
    }

    pub async fn get_fx_rates(&self) -> Result<Rates> {
        tracing::info!("Fetching FX rates");
        let res: RatesResponse = self.http.get("rates/fx", None, "rates").await?;
        Ok(res.rates)
    }

    pub async fn get_btc_rates(&self) -> Result<Rates> {
        tracing::info!("Fetching BTC rates");
        let res: RatesResponse = self.http.get("rates/btc", None, "rates").await?;
        Ok(res.rates)
    }

    pub async fn get_banks(&self) -> Result<Vec<Bank>> {
        tracing::info!("Fetching banks");
        let res: BanksResponse = self.http.get("banks", None, "banks").await?;
        Ok(res.banks)
    }

    // ==============================================================================================
    // Authenticated endpoints
    // ==============================================================================================

    pub async fn get_recipients(&self) -> Result<Authed<Vec<Recipient>>> {
        tracing::info!("Fetching recipients");
        let bearer = self.auth.bearer(&self.http).await?;
        let res: RecipientsResponse = self
            .http
            .get("recipients", Some(&bearer.access_token), "recipients")
            .await?;
        Ok(Authed {
            value: res.recipients,
            refreshed: bearer.refreshed,
        })
    }

    pub async fn get_transfers(&self) -> Result<Authed<Vec<Transfer>>> {
        tracing::info!("Fetching transfers");
        let bearer = self.auth.bearer(&self.http).await?;
        let res: TransfersResponse = self
            .http
            .get("transfers", Some(&bearer.access_token), "transfers")
            .await?;
        Ok(Authed {
            value: res.transfers,
            refreshed: bearer.refreshed,
        })
    }

    pub async fn get_transfer(&self, id: &str) -> Result<Authed<Transfer>> {
        let path = transfer_path(id)?;
        tracing::info!("Fetching transfer {}", id);
        let bearer = self.auth.bearer(&self.http).await?;
        let res: TransferResponse = self
            .http
            .get(&path, Some(&bearer.access_token), "transfer")
            .await?;
        Ok(Authed {
            value: res.transfer,
            refreshed: bearer.refreshed,
        })
    }

    pub async fn create_transfer(&self, transfer: &CreateTransfer) -> Result<Authed<Transfer>> {
        tracing::info!(
            "Creating transfer of {} {} to recipient {}",
            transfer.amount,
            transfer.currency,
            transfer.recipient_id
        );
        let bearer = self.auth.bearer(&self.http).await?;
        let res: TransferResponse = self
            .http
            .post_json("transfers", transfer, Some(&bearer.access_token), "transfer")
            .await?;
        Ok(Authed {
            value: res.transfer,
            refreshed: bearer.refreshed,
        })
    }

    pub async fn cancel_transfer(&self, id: &str) -> Result<Authed<Transfer>> {
        let path = transfer_path(id)?;
        tracing::info!("Cancelling transfer {}", id);
        let bearer = self.auth.bearer(&self.http).await?;
        let res: TransferResponse = self
            .http
            .delete(&path, Some(&bearer.access_token), "transfer")
            .await?;
        Ok(Authed {
            value: res.transfer,
            refreshed: bearer.refreshed,
        })
    }

    pub async fn get_limits(&self) -> Result<Authed<Limits>> {
        tracing::info!("Fetching limits");
        let bearer = self.auth.bearer(&self.http).await?;
        let res: LimitsResponse = self
            .http
            .get("users/limits", Some(&bearer.access_token), "limits")
            .await?;
        Ok(Authed {
            value: res.limits,
            refreshed: bearer.refreshed,
        })
    }
}

/// `transfers/{id}` with the id as a single percent-encoded path segment
fn transfer_path(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() || id == "." || id == ".." || id.contains('/') {
        return Err(BitwireError::InvalidArgument(format!(
            "invalid transfer id: {:?}",
            id
        )));
    }

    let mut url = Url::parse("bitwire:/transfers")
        .map_err(|e| BitwireError::Config(format!("Failed to build transfer path: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| BitwireError::Config("Failed to build transfer path".to_string()))?
        .push(id);

    Ok(url.path().trim_start_matches('/').to_string())
}
