//! Economy operation handlers.
//!
//! Each handler is one conditional delta: lock, load, validate, mutate a
//! local copy, buffer the writes, commit. Returning an error before commit
//! leaves no trace.

use overdrive_types::{Account, AccountId, Currency, Key, PreconditionFailed, Value, WithdrawalBook};

use super::{LedgerError, Txn};
use crate::store::Store;

mod accounts;
mod funds;
mod racing;
mod tickets;
mod upgrades;
mod withdrawals;

pub use withdrawals::WithdrawalResolution;

/// Load an account or fail with NotFound.
pub(crate) async fn load_account<S: Store>(
    txn: &Txn<'_, S>,
    id: &AccountId,
) -> Result<Account, LedgerError> {
    match txn.get(&Key::Account(id.clone())).await? {
        Some(Value::Account(account)) => Ok(account),
        _ => Err(LedgerError::NotFound),
    }
}

/// Buffer an account write under its own key.
pub(crate) fn store_account<S: Store>(txn: &mut Txn<'_, S>, account: Account) {
    txn.insert(Key::Account(account.id.clone()), Value::Account(account));
}

/// Load the withdrawal book, empty on first use.
pub(crate) async fn load_book<S: Store>(txn: &Txn<'_, S>) -> Result<WithdrawalBook, LedgerError> {
    Ok(match txn.get(&Key::WithdrawalBook).await? {
        Some(Value::WithdrawalBook(book)) => book,
        _ => WithdrawalBook::default(),
    })
}

/// Debit `amount` of `currency` after checking it is covered.
pub(crate) fn debit(
    account: &mut Account,
    currency: Currency,
    amount: u64,
) -> Result<(), LedgerError> {
    let have = match currency {
        Currency::Cash => account.real_balance,
        Currency::Coins => account.game_currency,
    };
    if have < amount {
        return Err(PreconditionFailed::InsufficientFunds {
            currency,
            have,
            need: amount,
        }
        .into());
    }
    match currency {
        Currency::Cash => account.real_balance = account.real_balance.saturating_sub(amount),
        Currency::Coins => account.game_currency = account.game_currency.saturating_sub(amount),
    }
    Ok(())
}
