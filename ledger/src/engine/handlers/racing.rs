use commonware_runtime::Clock;
use overdrive_types::{AccountId, AccountView, Key};
use tracing::debug;

use super::super::{Ledger, LedgerError};
use super::{load_account, store_account};
use crate::store::Store;

impl<E: Clock, S: Store> Ledger<E, S> {
    /// Credit the prize for a finishing rank (1-based; ranks outside 1..=3
    /// pay nothing and still succeed).
    ///
    /// The rank is supplied by the (external) game layer and trusted here;
    /// computing it server-side is that layer's job.
    pub async fn race_complete(&self, id: &AccountId, rank: u8) -> Result<AccountView, LedgerError> {
        let payout = self.rules.race_payout(rank);

        let (_guards, mut txn) = self.exclusive(vec![Key::Account(id.clone())]).await;
        let mut account = load_account(&txn, id).await?;
        account.real_balance = account.real_balance.saturating_add(payout);
        let view = AccountView::from(&account);
        store_account(&mut txn, account);
        txn.commit().await?;

        debug!(account = %id, rank, payout, "race completed");
        Ok(view)
    }
}
