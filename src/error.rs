//! Error types for rejected commands and bad configuration
//!
//! None of these are fatal: the engine stays live after every one of them.

use thiserror::Error;

/// Why a shop operation was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    #[error("shop is not open")]
    ShopClosed,
    #[error("no merchant is present this break")]
    NotAvailable,
    #[error("purchase limit for this visit reached")]
    LimitReached,
    #[error("entry `{0}` is not part of the current offer")]
    NotOffered(String),
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u32, available: u32 },
}

/// Why an engine command was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown upgrade id `{0}`")]
    UnknownUpgrade(String),
    #[error("invalid upgrade tier {0} (expected 1-3)")]
    InvalidTier(u8),
    #[error("upgrade `{0}` is not one of the pending choices")]
    NotOffered(String),
    #[error("no level-up is pending")]
    NoPendingLevelUp,
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u32, available: u32 },
}

/// Tuning file could not be used
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}
