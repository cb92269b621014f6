//! Common types for the overdrive account ledger.
//!
//! Defines the account and withdrawal records persisted by the ledger engine,
//! the storage key/value enums and their canonical binary encodings, the
//! economy rules table, and the error reasons surfaced to callers.

pub mod economy;

pub use economy::{
    derive_account_number, Account, AccountId, AccountView, Currency, DuplicateKey, EconomyRules,
    GameVariant, Key, PreconditionFailed, RimTier, TicketBundle, UpgradeKind, UpgradeState,
    ValidationError, Value, WagerOutcome, WithdrawalBook, WithdrawalReceipt, WithdrawalRequest,
    WithdrawalStatus, MAX_NAME_LENGTH, MAX_PHONE_LENGTH,
};
