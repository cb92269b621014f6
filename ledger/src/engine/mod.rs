use anyhow::{Context as _, Result};
use commonware_runtime::Clock;
use overdrive_types::{AccountId, AccountView, DuplicateKey, EconomyRules, Key};
use std::time::UNIX_EPOCH;
use tokio::sync::{OwnedMutexGuard, RwLock};
use tracing::info;

use crate::store::Store;

mod error;
mod handlers;
#[cfg(test)]
mod integration_tests;
mod locks;
mod txn;

pub use error::LedgerError;
pub use handlers::WithdrawalResolution;

use locks::KeyLocks;
use txn::Txn;

/// The account ledger and economy engine.
///
/// All account state flows through the per-key lock discipline: an operation
/// acquires every key it may touch (in the key space's total order), reads,
/// validates, buffers its writes, and commits them as one batch before the
/// locks release. Callers never read-then-write outside it.
pub struct Ledger<E: Clock, S: Store> {
    context: E,
    rules: EconomyRules,
    store: RwLock<S>,
    locks: KeyLocks,
    house: AccountId,
}

impl<E: Clock, S: Store> Ledger<E, S> {
    /// Validate the rules, wrap the store, and bootstrap the house account
    /// under the configured reserved name (a no-op when it already exists
    /// from an earlier run).
    pub async fn init(context: E, rules: EconomyRules, store: S) -> Result<Self> {
        rules.validate().context("invalid economy rules")?;
        let house = AccountId::derive(&rules.house_name);
        let ledger = Self {
            context,
            rules,
            store: RwLock::new(store),
            locks: KeyLocks::default(),
            house,
        };
        match ledger.register(&ledger.rules.house_name).await {
            Ok(view) => {
                info!(
                    name = %ledger.rules.house_name,
                    number = view.account_number,
                    "bootstrapped house account"
                );
            }
            Err(LedgerError::Duplicate(DuplicateKey::DisplayName)) => {}
            Err(err) => {
                return Err(anyhow::Error::new(err).context("bootstrap house account"));
            }
        }
        Ok(ledger)
    }

    /// The economy rules this deployment runs under.
    pub fn rules(&self) -> &EconomyRules {
        &self.rules
    }

    /// Id of the house account collecting wager commissions.
    pub fn house(&self) -> &AccountId {
        &self.house
    }

    /// Public fields of an account. Takes the account's lock briefly, so a
    /// reader never observes a half-applied pair transaction.
    pub async fn account(&self, id: &AccountId) -> Result<AccountView, LedgerError> {
        let (_guards, txn) = self.exclusive(vec![Key::Account(id.clone())]).await;
        let account = handlers::load_account(&txn, id).await?;
        Ok(AccountView::from(&account))
    }

    /// Lock the given keys (sorted, deduped) and open a write buffer over the
    /// store. The guards must outlive the commit.
    pub(crate) async fn exclusive(
        &self,
        keys: Vec<Key>,
    ) -> (Vec<OwnedMutexGuard<()>>, Txn<'_, S>) {
        let guards = self.locks.acquire(keys).await;
        (guards, Txn::new(&self.store))
    }

    /// Unix seconds from the runtime clock.
    fn now(&self) -> u64 {
        self.context
            .current()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}
