use commonware_runtime::Clock;
use overdrive_types::{
    AccountId, AccountView, Key, PreconditionFailed, RimTier, UpgradeKind, UpgradeState,
    ValidationError,
};
use tracing::debug;

use super::super::{Ledger, LedgerError};
use super::{debit, load_account, store_account};
use crate::store::Store;

impl<E: Clock, S: Store> Ledger<E, S> {
    /// Purchase one upgrade of the given kind.
    ///
    /// Flag upgrades (rims, turbo) are idempotent: a repeat purchase is
    /// rejected before any charge. Leveled upgrades (engine, car speed)
    /// advance one level per purchase up to the catalog's maximum. The tier
    /// check and the debit are one conditional delta, so two concurrent
    /// purchases of the same flag can only debit once.
    pub async fn buy_upgrade(
        &self,
        id: &AccountId,
        kind: UpgradeKind,
    ) -> Result<AccountView, LedgerError> {
        if !self.rules.variant.offers(kind) {
            return Err(ValidationError::UpgradeNotOffered(kind).into());
        }
        let cost = self.rules.upgrade_cost(kind);

        let (_guards, mut txn) = self.exclusive(vec![Key::Account(id.clone())]).await;
        let mut account = load_account(&txn, id).await?;

        let advanced = match (kind, &account.upgrades) {
            (
                UpgradeKind::Engine,
                &UpgradeState::Circuit {
                    engine_level,
                    rims,
                    turbo,
                },
            ) => {
                let max = self.rules.upgrades.engine.max_level;
                if engine_level >= max {
                    return Err(PreconditionFailed::MaxLevel { kind, max }.into());
                }
                UpgradeState::Circuit {
                    engine_level: engine_level + 1,
                    rims,
                    turbo,
                }
            }
            (
                UpgradeKind::Rims,
                &UpgradeState::Circuit {
                    engine_level,
                    rims,
                    turbo,
                },
            ) => {
                if rims != RimTier::Stock {
                    return Err(PreconditionFailed::AlreadyInstalled(kind).into());
                }
                UpgradeState::Circuit {
                    engine_level,
                    rims: RimTier::Spinner,
                    turbo,
                }
            }
            (
                UpgradeKind::Turbo,
                &UpgradeState::Circuit {
                    engine_level,
                    rims,
                    turbo,
                },
            ) => {
                if turbo {
                    return Err(PreconditionFailed::AlreadyInstalled(kind).into());
                }
                UpgradeState::Circuit {
                    engine_level,
                    rims,
                    turbo: true,
                }
            }
            (UpgradeKind::CarSpeed, &UpgradeState::Sprint { car_speed }) => {
                let max = self.rules.upgrades.car_speed.max_level;
                if car_speed >= max {
                    return Err(PreconditionFailed::MaxLevel { kind, max }.into());
                }
                UpgradeState::Sprint {
                    car_speed: car_speed + 1,
                }
            }
            // Offered kinds always match the variant-shaped record accounts
            // are created with; anything else is an unoffered kind.
            _ => return Err(ValidationError::UpgradeNotOffered(kind).into()),
        };

        debit(&mut account, cost.currency, cost.amount)?;
        account.upgrades = advanced;
        let view = AccountView::from(&account);
        store_account(&mut txn, account);
        txn.commit().await?;

        debug!(account = %id, ?kind, cost = cost.amount, "upgrade purchased");
        Ok(view)
    }
}
