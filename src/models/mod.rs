// Data models for the Bitwire API

pub mod resources;
pub mod responses;

pub use resources::{
    AllRates, AmountLimit, Bank, BtcLimits, BtcPayment, CompletedLimits, CountLimit,
    CreateTransfer, KrwLimits, Limits, PendingLimits, Rates, Recipient, RecipientBank, Sender,
    Transfer, TransferLimits, TransferRecipient,
};
