// Response envelopes returned by the Bitwire API
// Every body carries a numeric `code` and a payload keyed by resource name

use serde::Deserialize;

use super::resources::{AllRates, Bank, Limits, Rates, Recipient, Transfer};
use crate::error::BitwireError;

/// Error fields that may accompany any envelope
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "errorType")]
    pub error_type: Option<String>,
}

impl ApiErrorBody {
    /// Convert into an API error if the body describes one
    ///
    /// `errorType` always marks a failure. A bare `message` only counts on a
    /// non-success status, since some success bodies carry informational text.
    pub fn into_error(self, status: u16) -> Option<BitwireError> {
        let error_type = self.error_type.filter(|t| !t.is_empty());
        let message = self.message.filter(|m| !m.is_empty());
        let success = (200..300).contains(&status);

        match (error_type, message) {
            (Some(error_type), message) => Some(BitwireError::Api {
                status,
                error_type,
                message: message.unwrap_or_default(),
            }),
            (None, Some(message)) if !success => Some(BitwireError::Api {
                status,
                error_type: "Error".to_string(),
                message,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AllRatesResponse {
    #[serde(default)]
    pub code: i64,
    pub rates: AllRates,
}

#[derive(Debug, Deserialize)]
pub struct RatesResponse {
    #[serde(default)]
    pub code: i64,
    pub rates: Rates,
}

#[derive(Debug, Deserialize)]
pub struct BanksResponse {
    #[serde(default)]
    pub code: i64,
    pub banks: Vec<Bank>,
}

#[derive(Debug, Deserialize)]
pub struct RecipientsResponse {
    #[serde(default)]
    pub code: i64,
    pub recipients: Vec<Recipient>,
}

#[derive(Debug, Deserialize)]
pub struct TransfersResponse {
    #[serde(default)]
    pub code: i64,
    pub transfers: Vec<Transfer>,
}

#[derive(Debug, Deserialize)]
pub struct TransferResponse {
    #[serde(default)]
    pub code: i64,
    pub transfer: Transfer,
}

#[derive(Debug, Deserialize)]
pub struct LimitsResponse {
    #[serde(default)]
    pub code: i64,
    pub limits: Limits,
}
