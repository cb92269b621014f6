use commonware_runtime::Clock;
use overdrive_types::{
    derive_account_number, Account, AccountId, AccountView, DuplicateKey, Key, ValidationError,
    Value, MAX_NAME_LENGTH,
};
use tracing::debug;

use super::super::{Ledger, LedgerError};
use crate::store::Store;

impl<E: Clock, S: Store> Ledger<E, S> {
    /// Create an account under `display_name`.
    ///
    /// The account number is derived from the name's first letter, so both
    /// unique indexes (name and number) are claimed here, under locks on both
    /// keys; the existence checks and the inserts are one atomic unit.
    pub async fn register(&self, display_name: &str) -> Result<AccountView, LedgerError> {
        if display_name.is_empty() || display_name.len() > MAX_NAME_LENGTH {
            return Err(ValidationError::NameLength.into());
        }
        let Some(account_number) = derive_account_number(display_name) else {
            return Err(ValidationError::NameFirstChar.into());
        };
        let id = AccountId::derive(display_name);

        let keys = vec![Key::Account(id.clone()), Key::AccountNumber(account_number)];
        let (_guards, mut txn) = self.exclusive(keys).await;
        if txn.get(&Key::Account(id.clone())).await?.is_some() {
            return Err(DuplicateKey::DisplayName.into());
        }
        if txn.get(&Key::AccountNumber(account_number)).await?.is_some() {
            return Err(DuplicateKey::AccountNumber(account_number).into());
        }

        let account = Account::new(
            display_name.to_string(),
            account_number,
            self.rules.variant,
            self.now(),
        );
        let view = AccountView::from(&account);
        txn.insert(
            Key::AccountNumber(account_number),
            Value::AccountRef(id.clone()),
        );
        txn.insert(Key::Account(id), Value::Account(account));
        txn.commit().await?;

        debug!(name = display_name, number = account_number, "registered");
        Ok(view)
    }
}
