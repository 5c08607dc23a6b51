use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==================================================================================================
// Rates
// ==================================================================================================

/// Currency pair → rate, e.g. `"BTCKRW" → "612000.00"`
pub type Rates = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllRates {
    #[serde(default)]
    pub btc: Rates,
    #[serde(default)]
    pub fx: Rates,
}

// ==================================================================================================
// Banks & Recipients
// ==================================================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bank {
    pub id: i64,
    pub number: String,
    pub display_name: String,
    pub name: String,
    pub name_ko: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipientBank {
    #[serde(flatten)]
    pub bank: Bank,
    pub account_number: String,
    pub account_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipient {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub bank: RecipientBank,
}

// ==================================================================================================
// Transfers
// ==================================================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sender {
    pub amount: String,
    pub currency: String,
}

/// Bitcoin payment instructions for a pending transfer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BtcPayment {
    pub address: String,
    pub link: String,
    /// Unix timestamp after which the address no longer accepts payment
    pub expiration: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferRecipient {
    #[serde(flatten)]
    pub recipient: Recipient,
    pub currency: String,
    pub amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transfer {
    pub id: String,
    pub sender: Sender,
    #[serde(rename = "type")]
    pub kind: String,
    pub memo: String,
    pub amount: String,
    #[serde(alias = "currecny")]
    pub currency: String,
    pub status: String,
    pub date: String,
    pub btc: BtcPayment,
    pub recipient: TransferRecipient,
}

/// Payload for creating a transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTransfer {
    pub amount: String,
    pub currency: String,
    pub recipient_id: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub memo: String,
    #[serde(rename = "type")]
    pub kind: String,
}

// ==================================================================================================
// Limits
// ==================================================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountLimit {
    pub used: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingLimits {
    pub total: CountLimit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletedLimits {
    pub daily: CountLimit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferLimits {
    pub pending: PendingLimits,
    pub completed: CompletedLimits,
}

/// Amount-based limit window (KRW)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountLimit {
    pub used: String,
    pub left: String,
    pub limit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KrwLimits {
    pub min: String,
    pub daily: AmountLimit,
    pub weekly: AmountLimit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BtcLimits {
    pub min: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub transfers: TransferLimits,
    pub krw: KrwLimits,
    pub btc: BtcLimits,
}
