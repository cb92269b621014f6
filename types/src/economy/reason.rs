use serde::Serialize;
use thiserror::Error;

use super::{Currency, UpgradeKind};

/// Malformed input, reported before any state is read or written.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum ValidationError {
    #[error("amount must be positive")]
    NonPositiveAmount,
    #[error("display name must be 1-32 bytes")]
    NameLength,
    #[error("display name must start with a letter A-Z")]
    NameFirstChar,
    #[error("phone number must be at least {min} digits")]
    PhoneTooShort { min: usize },
    #[error("phone number may only contain digits and a leading +")]
    PhoneFormat,
    #[error("upgrade {0:?} is not offered in this deployment")]
    UpgradeNotOffered(UpgradeKind),
}

/// Precondition did not hold at the moment of application. Nothing was
/// mutated.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum PreconditionFailed {
    #[error("insufficient {currency}: have {have}, need {need}")]
    InsufficientFunds {
        currency: Currency,
        have: u64,
        need: u64,
    },
    #[error("no tickets remaining")]
    NoTickets,
    #[error("upgrade {0:?} already installed")]
    AlreadyInstalled(UpgradeKind),
    #[error("upgrade {kind:?} already at max level {max}")]
    MaxLevel { kind: UpgradeKind, max: u8 },
    #[error("balance {have} below withdrawal threshold {threshold}")]
    BelowWithdrawalThreshold { have: u64, threshold: u64 },
    #[error("withdrawal request {0} is not pending")]
    NotPending(u64),
}

/// Registration collision on a unique index.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Serialize)]
pub enum DuplicateKey {
    #[error("display name already registered")]
    DisplayName,
    #[error("account number {0} already assigned")]
    AccountNumber(u64),
}
