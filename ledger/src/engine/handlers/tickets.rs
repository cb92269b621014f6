use commonware_runtime::Clock;
use overdrive_types::{AccountId, AccountView, Currency, Key, PreconditionFailed};
use tracing::debug;

use super::super::{Ledger, LedgerError};
use super::{debit, load_account, store_account};
use crate::store::Store;

impl<E: Clock, S: Store> Ledger<E, S> {
    /// Buy one ticket bundle: debit the bundle cost from real currency,
    /// credit the bundled tickets.
    pub async fn buy_ticket_bundle(&self, id: &AccountId) -> Result<AccountView, LedgerError> {
        let bundle = self.rules.ticket_bundle;

        let (_guards, mut txn) = self.exclusive(vec![Key::Account(id.clone())]).await;
        let mut account = load_account(&txn, id).await?;
        debit(&mut account, Currency::Cash, bundle.cost)?;
        account.tickets = account.tickets.saturating_add(bundle.tickets);
        let view = AccountView::from(&account);
        store_account(&mut txn, account);
        txn.commit().await?;

        debug!(account = %id, cost = bundle.cost, tickets = bundle.tickets, "bundle purchased");
        Ok(view)
    }

    /// Consume one ticket.
    pub async fn spend_ticket(&self, id: &AccountId) -> Result<AccountView, LedgerError> {
        let (_guards, mut txn) = self.exclusive(vec![Key::Account(id.clone())]).await;
        let mut account = load_account(&txn, id).await?;
        if account.tickets == 0 {
            return Err(PreconditionFailed::NoTickets.into());
        }
        account.tickets -= 1;
        let view = AccountView::from(&account);
        store_account(&mut txn, account);
        txn.commit().await?;

        debug!(account = %id, remaining = view.tickets, "ticket spent");
        Ok(view)
    }

    /// Credit the configured ticket award. No cost check; the caller's
    /// identity is the only precondition.
    pub async fn earn_tickets(&self, id: &AccountId) -> Result<AccountView, LedgerError> {
        let (_guards, mut txn) = self.exclusive(vec![Key::Account(id.clone())]).await;
        let mut account = load_account(&txn, id).await?;
        account.tickets = account.tickets.saturating_add(self.rules.ticket_award);
        let view = AccountView::from(&account);
        store_account(&mut txn, account);
        txn.commit().await?;

        debug!(account = %id, awarded = self.rules.ticket_award, "tickets earned");
        Ok(view)
    }
}
