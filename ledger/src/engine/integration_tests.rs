//! Engine-level scenarios: straight-line economy flows and the concurrency
//! properties the lock discipline exists for.

use std::sync::Arc;

use commonware_runtime::{deterministic, Runner as _, Spawner};
use overdrive_types::{
    AccountId, DuplicateKey, EconomyRules, GameVariant, PreconditionFailed, RimTier, UpgradeKind,
    UpgradeState, ValidationError, WagerOutcome, WithdrawalStatus,
};

use crate::mocks::{create_memory_ledger, create_store, test_rules};
use crate::store::Memory;
use crate::{Ledger, LedgerError, WithdrawalResolution};

type TestLedger = Ledger<deterministic::Context, Memory>;

async fn ledger_with(context: deterministic::Context, rules: EconomyRules) -> Arc<TestLedger> {
    Arc::new(create_memory_ledger(context, rules).await)
}

/// Register an account and reload it to the given balance.
async fn funded(ledger: &TestLedger, name: &str, balance: u64) -> AccountId {
    let view = ledger.register(name).await.expect("register");
    if balance > 0 {
        ledger.reload(&view.id, balance).await.expect("reload");
    }
    view.id
}

#[test]
fn test_reload_bundle_spend_scenario() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context, test_rules()).await;
        let alice = ledger.register("Alice").await.expect("register");
        assert_eq!(alice.account_number, 101_052);
        assert_eq!(alice.real_balance, 0);

        let view = ledger.reload(&alice.id, 1_000).await.expect("reload");
        assert_eq!(view.real_balance, 1_000);
        assert_eq!(view.game_currency, 10_000);

        let view = ledger.buy_ticket_bundle(&alice.id).await.expect("bundle");
        assert_eq!(view.real_balance, 500);
        assert_eq!(view.tickets, 5);

        for remaining in (0..5).rev() {
            let view = ledger.spend_ticket(&alice.id).await.expect("spend");
            assert_eq!(view.tickets, remaining);
        }
        let err = ledger.spend_ticket(&alice.id).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Precondition(PreconditionFailed::NoTickets)
        ));
    });
}

#[test]
fn test_withdraw_scenario() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context, test_rules()).await;
        let alice = funded(&ledger, "Alice", 100_000).await;

        let receipt = ledger.withdraw(&alice, "0771234567").await.expect("withdraw");
        assert_eq!(receipt.account.real_balance, 99_900);
        assert_eq!(receipt.request.amount, 100);
        assert_eq!(receipt.request.status, WithdrawalStatus::Pending);
        assert_eq!(receipt.request.account, alice);

        // Balance is now below the threshold, so an immediate repeat fails.
        let err = ledger.withdraw(&alice, "0771234567").await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Precondition(PreconditionFailed::BelowWithdrawalThreshold {
                have: 99_900,
                threshold: 100_000,
            })
        ));

        let pending = ledger.pending_withdrawals().await.expect("pending");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, receipt.request.id);
    });
}

#[test]
fn test_withdrawal_status_advances_exactly_once() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context, test_rules()).await;
        let alice = funded(&ledger, "Alice", 100_000).await;
        let receipt = ledger.withdraw(&alice, "0771234567").await.expect("withdraw");
        let request_id = receipt.request.id;

        let advanced = ledger
            .advance_withdrawal(request_id, WithdrawalResolution::Completed)
            .await
            .expect("advance");
        assert_eq!(advanced.status, WithdrawalStatus::Completed);
        assert!(ledger.pending_withdrawals().await.expect("pending").is_empty());

        // Terminal; a second advance (even to Rejected) is refused.
        let err = ledger
            .advance_withdrawal(request_id, WithdrawalResolution::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Precondition(PreconditionFailed::NotPending(id)) if id == request_id
        ));

        // The record keeps its terminal status; rejection never refunds.
        let request = ledger.withdrawal(request_id).await.expect("lookup");
        assert_eq!(request.status, WithdrawalStatus::Completed);
        let view = ledger.account(&alice).await.expect("account");
        assert_eq!(view.real_balance, 99_900);
    });
}

#[test]
fn test_registration_unique_indexes() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context, test_rules()).await;
        ledger.register("Alice").await.expect("register");

        let err = ledger.register("Alice").await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Duplicate(DuplicateKey::DisplayName)
        ));

        // Same first letter claims the same derived number slot.
        let err = ledger.register("Avery").await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Duplicate(DuplicateKey::AccountNumber(101_052))
        ));

        let err = ledger.register("9lives").await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::NameFirstChar)
        ));
    });
}

#[test]
fn test_race_payouts_by_rank() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context, test_rules()).await;
        let alice = funded(&ledger, "Alice", 0).await;

        let view = ledger.race_complete(&alice, 1).await.expect("rank 1");
        assert_eq!(view.real_balance, 500);
        let view = ledger.race_complete(&alice, 3).await.expect("rank 3");
        assert_eq!(view.real_balance, 600);

        // Off the podium pays nothing but still succeeds.
        let view = ledger.race_complete(&alice, 4).await.expect("rank 4");
        assert_eq!(view.real_balance, 600);
        let view = ledger.race_complete(&alice, 0).await.expect("rank 0");
        assert_eq!(view.real_balance, 600);
    });
}

#[test]
fn test_wager_won_and_insufficient_stake() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context, test_rules()).await;
        let alice = funded(&ledger, "Alice", 1_000).await;

        let view = ledger
            .resolve_wager(&alice, 400, WagerOutcome::Won)
            .await
            .expect("won");
        assert_eq!(view.real_balance, 1_400);

        let err = ledger
            .resolve_wager(&alice, 2_000, WagerOutcome::Won)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Precondition(PreconditionFailed::InsufficientFunds { .. })
        ));

        let err = ledger
            .resolve_wager(&alice, 0, WagerOutcome::Won)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::NonPositiveAmount)
        ));
    });
}

#[test]
fn test_wager_lost_pays_house_commission() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context, test_rules()).await;
        let alice = funded(&ledger, "Alice", 1_000).await;
        let house_before = ledger.account(ledger.house()).await.expect("house").real_balance;

        let view = ledger
            .resolve_wager(&alice, 100, WagerOutcome::Lost)
            .await
            .expect("lost");
        assert_eq!(view.real_balance, 900);

        // 2% of 100, rounded to the nearest unit.
        let house = ledger.account(ledger.house()).await.expect("house");
        assert_eq!(house.real_balance, house_before + 2);
    });
}

#[test]
fn test_house_wager_against_itself_nets_locally() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context, test_rules()).await;
        let house = ledger.house().clone();
        ledger.reload(&house, 1_000).await.expect("reload");

        let view = ledger
            .resolve_wager(&house, 100, WagerOutcome::Lost)
            .await
            .expect("lost");
        assert_eq!(view.real_balance, 1_000 - 100 + 2);
    });
}

#[test]
fn test_upgrade_purchases_and_idempotence() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context, test_rules()).await;
        let alice = funded(&ledger, "Alice", 2_000).await;
        // Reload granted 20_000 coins at the default 1:10 rate.

        let view = ledger
            .buy_upgrade(&alice, UpgradeKind::Rims)
            .await
            .expect("rims");
        assert_eq!(view.game_currency, 19_000);
        assert!(matches!(
            view.upgrades,
            UpgradeState::Circuit {
                rims: RimTier::Spinner,
                ..
            }
        ));

        // Repeat purchase of a flag upgrade is rejected, not double-charged.
        let err = ledger.buy_upgrade(&alice, UpgradeKind::Rims).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Precondition(PreconditionFailed::AlreadyInstalled(UpgradeKind::Rims))
        ));
        let view = ledger.account(&alice).await.expect("account");
        assert_eq!(view.game_currency, 19_000);

        // Engine advances one level per purchase up to the catalog max.
        for level in 2..=5u8 {
            let view = ledger
                .buy_upgrade(&alice, UpgradeKind::Engine)
                .await
                .expect("engine");
            assert!(matches!(
                view.upgrades,
                UpgradeState::Circuit { engine_level, .. } if engine_level == level
            ));
        }
        let err = ledger.buy_upgrade(&alice, UpgradeKind::Engine).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Precondition(PreconditionFailed::MaxLevel {
                kind: UpgradeKind::Engine,
                max: 5,
            })
        ));

        // Kinds the deployment variant never offers are rejected up front.
        let err = ledger
            .buy_upgrade(&alice, UpgradeKind::CarSpeed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::UpgradeNotOffered(UpgradeKind::CarSpeed))
        ));
    });
}

#[test]
fn test_sprint_variant_car_speed() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let rules = EconomyRules {
            variant: GameVariant::Sprint,
            ..test_rules()
        };
        let ledger = ledger_with(context, rules).await;
        let alice = funded(&ledger, "Alice", 1_000).await;

        let view = ledger
            .buy_upgrade(&alice, UpgradeKind::CarSpeed)
            .await
            .expect("car speed");
        assert_eq!(view.real_balance, 800);
        assert!(matches!(view.upgrades, UpgradeState::Sprint { car_speed: 2 }));

        let err = ledger.buy_upgrade(&alice, UpgradeKind::Turbo).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::UpgradeNotOffered(UpgradeKind::Turbo))
        ));
    });
}

#[test]
fn test_earn_tickets_unconditional() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context, test_rules()).await;
        let alice = funded(&ledger, "Alice", 0).await;
        let view = ledger.earn_tickets(&alice).await.expect("earn");
        assert_eq!(view.tickets, 1);
        let view = ledger.earn_tickets(&alice).await.expect("earn");
        assert_eq!(view.tickets, 2);
    });
}

#[test]
fn test_unknown_account_and_request() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context, test_rules()).await;
        let ghost = AccountId::derive("Ghost");
        assert!(matches!(
            ledger.reload(&ghost, 100).await.unwrap_err(),
            LedgerError::NotFound
        ));
        assert!(matches!(
            ledger.account(&ghost).await.unwrap_err(),
            LedgerError::NotFound
        ));
        assert!(matches!(
            ledger.withdrawal(7).await.unwrap_err(),
            LedgerError::NotFound
        ));
    });
}

#[test]
fn test_concurrent_flag_purchase_single_debit() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context.clone(), test_rules()).await;
        let alice = funded(&ledger, "Alice", 1_000).await;

        let mut handles = Vec::new();
        for _ in 0..2 {
            let ledger = ledger.clone();
            let alice = alice.clone();
            handles.push(context.clone().spawn(move |_| async move {
                ledger.buy_upgrade(&alice, UpgradeKind::Turbo).await.is_ok()
            }));
        }
        let mut successes = 0;
        for handle in handles {
            if handle.await.expect("task") {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);

        // Exactly one debit of the 50-cash turbo flag.
        let view = ledger.account(&alice).await.expect("account");
        assert_eq!(view.real_balance, 950);
        assert!(matches!(
            view.upgrades,
            UpgradeState::Circuit { turbo: true, .. }
        ));
    });
}

#[test]
fn test_concurrent_wagers_never_overdraft() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context.clone(), test_rules()).await;
        let alice = funded(&ledger, "Alice", 100).await;
        let house_before = ledger.account(ledger.house()).await.expect("house").real_balance;

        // 100 of balance covers at most three 30-unit losses.
        let mut handles = Vec::new();
        for _ in 0..5 {
            let ledger = ledger.clone();
            let alice = alice.clone();
            handles.push(context.clone().spawn(move |_| async move {
                ledger
                    .resolve_wager(&alice, 30, WagerOutcome::Lost)
                    .await
                    .is_ok()
            }));
        }
        let mut successes: u64 = 0;
        for handle in handles {
            if handle.await.expect("task") {
                successes += 1;
            }
        }
        assert_eq!(successes, 3);

        let view = ledger.account(&alice).await.expect("account");
        assert_eq!(view.real_balance, 100 - 30 * successes);

        // Commission credited exactly once per applied debit: 2% of 30
        // rounds half away from zero to 1.
        let house = ledger.account(ledger.house()).await.expect("house");
        assert_eq!(house.real_balance, house_before + successes);
    });
}

#[test]
fn test_concurrent_withdraw_checks_at_commit() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let ledger = ledger_with(context.clone(), test_rules()).await;
        let alice = funded(&ledger, "Alice", 100_000).await;

        // A concurrent loss drops the balance below the threshold; whichever
        // order the lock admits, the withdrawal's precondition must hold at
        // the moment it applies, never just at an earlier read.
        let withdraw = {
            let ledger = ledger.clone();
            let alice = alice.clone();
            context.clone().spawn(move |_| async move {
                ledger.withdraw(&alice, "0771234567").await.is_ok()
            })
        };
        let wager = {
            let ledger = ledger.clone();
            let alice = alice.clone();
            context.clone().spawn(move |_| async move {
                ledger
                    .resolve_wager(&alice, 50_000, WagerOutcome::Lost)
                    .await
                    .is_ok()
            })
        };
        let withdrew = withdraw.await.expect("task");
        let wagered = wager.await.expect("task");
        assert!(wagered, "the balance covers the bet in either order");

        let view = ledger.account(&alice).await.expect("account");
        let pending = ledger.pending_withdrawals().await.expect("pending");
        if withdrew {
            assert_eq!(view.real_balance, 100_000 - 100 - 50_000);
            assert_eq!(pending.len(), 1);
        } else {
            assert_eq!(view.real_balance, 100_000 - 50_000);
            assert!(pending.is_empty());
        }
    });
}

#[test]
fn test_adb_store_smoke() {
    let executor = deterministic::Runner::default();
    executor.start(|context| async move {
        let store = create_store(&context).await;
        let ledger = Ledger::init(context, test_rules(), store)
            .await
            .expect("init");

        let alice = ledger.register("Alice").await.expect("register");
        let view = ledger.reload(&alice.id, 1_000).await.expect("reload");
        assert_eq!(view.real_balance, 1_000);

        let view = ledger.account(&alice.id).await.expect("account");
        assert_eq!(view.real_balance, 1_000);
        assert_eq!(view.game_currency, 10_000);
    });
}
