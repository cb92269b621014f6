use commonware_runtime::Clock;
use overdrive_types::{
    AccountId, AccountView, Key, PreconditionFailed, ValidationError, Value, WithdrawalReceipt,
    WithdrawalRequest, WithdrawalStatus, MAX_PHONE_LENGTH,
};
use tracing::debug;

use super::super::{Ledger, LedgerError};
use super::{load_account, load_book, store_account};
use crate::store::Store;

/// Terminal statuses the administrative collaborator may advance a Pending
/// request to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WithdrawalResolution {
    Completed,
    Rejected,
}

impl From<WithdrawalResolution> for WithdrawalStatus {
    fn from(resolution: WithdrawalResolution) -> Self {
        match resolution {
            WithdrawalResolution::Completed => Self::Completed,
            WithdrawalResolution::Rejected => Self::Rejected,
        }
    }
}

/// Digits with an optional leading `+`, at least `min` digits, bounded above.
fn validate_phone(phone: &str, min: usize) -> Result<(), ValidationError> {
    if phone.len() > MAX_PHONE_LENGTH {
        return Err(ValidationError::PhoneFormat);
    }
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::PhoneFormat);
    }
    if digits.len() < min {
        return Err(ValidationError::PhoneTooShort { min });
    }
    Ok(())
}

impl<E: Clock, S: Store> Ledger<E, S> {
    /// Request a withdrawal to the given phone number.
    ///
    /// Requires the balance to be at or above the withdrawal threshold at
    /// the moment of application; debits the (smaller) fixed payout amount
    /// and appends a Pending request in the same atomic unit, so a request
    /// existing implies the debit happened and vice versa.
    pub async fn withdraw(
        &self,
        id: &AccountId,
        phone_number: &str,
    ) -> Result<WithdrawalReceipt, LedgerError> {
        validate_phone(phone_number, self.rules.min_phone_digits)?;

        let keys = vec![Key::Account(id.clone()), Key::WithdrawalBook];
        let (_guards, mut txn) = self.exclusive(keys).await;

        let mut account = load_account(&txn, id).await?;
        if account.real_balance < self.rules.withdrawal_threshold {
            return Err(PreconditionFailed::BelowWithdrawalThreshold {
                have: account.real_balance,
                threshold: self.rules.withdrawal_threshold,
            }
            .into());
        }
        account.real_balance = account
            .real_balance
            .saturating_sub(self.rules.withdrawal_payout);

        let mut book = load_book(&txn).await?;
        let request_id = book.allocate();
        let request = WithdrawalRequest {
            id: request_id,
            account: id.clone(),
            phone_number: phone_number.to_string(),
            amount: self.rules.withdrawal_payout,
            status: WithdrawalStatus::Pending,
            created_at: self.now(),
        };

        let view = AccountView::from(&account);
        store_account(&mut txn, account);
        txn.insert(Key::Withdrawal(request_id), Value::Withdrawal(request.clone()));
        txn.insert(Key::WithdrawalBook, Value::WithdrawalBook(book));
        txn.commit().await?;

        debug!(
            account = %id,
            request = request_id,
            amount = self.rules.withdrawal_payout,
            "withdrawal requested"
        );
        Ok(WithdrawalReceipt {
            request,
            account: view,
        })
    }

    /// A withdrawal request by id.
    pub async fn withdrawal(&self, request_id: u64) -> Result<WithdrawalRequest, LedgerError> {
        let (_guards, txn) = self.exclusive(vec![Key::Withdrawal(request_id)]).await;
        match txn.get(&Key::Withdrawal(request_id)).await? {
            Some(Value::Withdrawal(request)) => Ok(request),
            _ => Err(LedgerError::NotFound),
        }
    }

    /// Pending requests in creation order, for the administrative
    /// collaborator.
    pub async fn pending_withdrawals(&self) -> Result<Vec<WithdrawalRequest>, LedgerError> {
        let (_guards, txn) = self.exclusive(vec![Key::WithdrawalBook]).await;
        let book = load_book(&txn).await?;
        let mut requests = Vec::with_capacity(book.pending.len());
        for request_id in &book.pending {
            match txn.get(&Key::Withdrawal(*request_id)).await? {
                Some(Value::Withdrawal(request)) => requests.push(request),
                _ => return Err(LedgerError::NotFound),
            }
        }
        Ok(requests)
    }

    /// Advance a Pending request to its terminal status, exactly once.
    ///
    /// This is the narrow interface for the administrative collaborator; the
    /// core never advances a request itself, and a rejected request does not
    /// refund the payout debit.
    pub async fn advance_withdrawal(
        &self,
        request_id: u64,
        resolution: WithdrawalResolution,
    ) -> Result<WithdrawalRequest, LedgerError> {
        let keys = vec![Key::Withdrawal(request_id), Key::WithdrawalBook];
        let (_guards, mut txn) = self.exclusive(keys).await;

        let mut request = match txn.get(&Key::Withdrawal(request_id)).await? {
            Some(Value::Withdrawal(request)) => request,
            _ => return Err(LedgerError::NotFound),
        };
        if request.status != WithdrawalStatus::Pending {
            return Err(PreconditionFailed::NotPending(request_id).into());
        }
        request.status = resolution.into();

        let mut book = load_book(&txn).await?;
        book.settle(request_id);

        txn.insert(Key::Withdrawal(request_id), Value::Withdrawal(request.clone()));
        txn.insert(Key::WithdrawalBook, Value::WithdrawalBook(book));
        txn.commit().await?;

        debug!(request = request_id, ?resolution, "withdrawal advanced");
        Ok(request)
    }
}
