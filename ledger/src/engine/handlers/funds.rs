use commonware_runtime::Clock;
use overdrive_types::{
    AccountId, AccountView, Currency, Key, PreconditionFailed, ValidationError, WagerOutcome,
};
use tracing::debug;

use super::super::{Ledger, LedgerError};
use super::{load_account, store_account};
use crate::store::Store;

impl<E: Clock, S: Store> Ledger<E, S> {
    /// Credit a reload of real currency, plus coins at the configured
    /// conversion rate.
    pub async fn reload(&self, id: &AccountId, amount: u64) -> Result<AccountView, LedgerError> {
        if amount == 0 {
            return Err(ValidationError::NonPositiveAmount.into());
        }

        let (_guards, mut txn) = self.exclusive(vec![Key::Account(id.clone())]).await;
        let mut account = load_account(&txn, id).await?;
        account.real_balance = account.real_balance.saturating_add(amount);
        account.game_currency = account
            .game_currency
            .saturating_add(amount.saturating_mul(self.rules.reload_conversion_rate));
        let view = AccountView::from(&account);
        store_account(&mut txn, account);
        txn.commit().await?;

        debug!(account = %id, amount, "reloaded");
        Ok(view)
    }

    /// Settle a wager already staked elsewhere.
    ///
    /// The outcome is supplied by the (external) game layer and trusted here;
    /// verifying it is that layer's job. A win credits the winnings; a loss
    /// debits the bet and credits the house its commission in the same pair
    /// transaction, so no reader ever observes the debit without the
    /// commission or vice versa.
    pub async fn resolve_wager(
        &self,
        id: &AccountId,
        bet: u64,
        outcome: WagerOutcome,
    ) -> Result<AccountView, LedgerError> {
        if bet == 0 {
            return Err(ValidationError::NonPositiveAmount.into());
        }

        match outcome {
            WagerOutcome::Won => {
                let (_guards, mut txn) = self.exclusive(vec![Key::Account(id.clone())]).await;
                let mut account = load_account(&txn, id).await?;
                if account.real_balance < bet {
                    return Err(PreconditionFailed::InsufficientFunds {
                        currency: Currency::Cash,
                        have: account.real_balance,
                        need: bet,
                    }
                    .into());
                }
                account.real_balance = account.real_balance.saturating_add(bet);
                let view = AccountView::from(&account);
                store_account(&mut txn, account);
                txn.commit().await?;

                debug!(account = %id, bet, "wager won");
                Ok(view)
            }
            WagerOutcome::Lost => {
                let commission = self.rules.commission(bet);

                // The house betting against itself collapses to one account:
                // one lock, both deltas netted locally.
                if *id == self.house {
                    let (_guards, mut txn) = self.exclusive(vec![Key::Account(id.clone())]).await;
                    let mut account = load_account(&txn, id).await?;
                    if account.real_balance < bet {
                        return Err(PreconditionFailed::InsufficientFunds {
                            currency: Currency::Cash,
                            have: account.real_balance,
                            need: bet,
                        }
                        .into());
                    }
                    account.real_balance =
                        account.real_balance.saturating_sub(bet).saturating_add(commission);
                    let view = AccountView::from(&account);
                    store_account(&mut txn, account);
                    txn.commit().await?;

                    debug!(account = %id, bet, commission, "house wager lost");
                    return Ok(view);
                }

                let keys = vec![
                    Key::Account(id.clone()),
                    Key::Account(self.house.clone()),
                ];
                let (_guards, mut txn) = self.exclusive(keys).await;

                let mut bettor = load_account(&txn, id).await?;
                if bettor.real_balance < bet {
                    return Err(PreconditionFailed::InsufficientFunds {
                        currency: Currency::Cash,
                        have: bettor.real_balance,
                        need: bet,
                    }
                    .into());
                }
                // Bootstrapped at init; absence is storage corruption, not a
                // caller error.
                let mut house = load_account(&txn, &self.house)
                    .await
                    .map_err(|_| LedgerError::Storage(anyhow::anyhow!("house account missing")))?;

                bettor.real_balance = bettor.real_balance.saturating_sub(bet);
                house.real_balance = house.real_balance.saturating_add(commission);
                let view = AccountView::from(&bettor);
                store_account(&mut txn, bettor);
                store_account(&mut txn, house);
                txn.commit().await?;

                debug!(account = %id, bet, commission, "wager lost");
                Ok(view)
            }
        }
    }
}
