use super::*;
use commonware_codec::{Encode, EncodeSize, ReadExt};

#[test]
fn test_account_number_derivation() {
    assert_eq!(derive_account_number("Alice"), Some(101_052));
    assert_eq!(derive_account_number("zeta"), Some(101_077));
    assert_eq!(derive_account_number("bob"), Some(101_053));
    assert_eq!(derive_account_number("9lives"), None);
    assert_eq!(derive_account_number("_race"), None);
    assert_eq!(derive_account_number(""), None);
}

#[test]
fn test_account_id_tracks_display_name() {
    let account = Account::new("Alice".to_string(), 101_052, GameVariant::Circuit, 0);
    assert_eq!(account.id, AccountId::derive("Alice"));
    assert_ne!(account.id, AccountId::derive("alice"));
    assert_eq!(account.id.to_hex().len(), 64);
}

#[test]
fn test_new_account_defaults() {
    let account = Account::new("Bob".to_string(), 101_053, GameVariant::Circuit, 7);
    assert_eq!(account.real_balance, 0);
    assert_eq!(account.game_currency, 0);
    assert_eq!(account.tickets, 0);
    assert_eq!(account.created_at, 7);
    assert_eq!(
        account.upgrades,
        UpgradeState::Circuit {
            engine_level: 1,
            rims: RimTier::Stock,
            turbo: false,
        }
    );

    let sprint = Account::new("Cara".to_string(), 101_054, GameVariant::Sprint, 0);
    assert_eq!(sprint.upgrades, UpgradeState::Sprint { car_speed: 1 });

    let arena = Account::new("Drew".to_string(), 101_055, GameVariant::Arena, 0);
    assert_eq!(arena.upgrades, UpgradeState::Arena);
}

#[test]
fn test_account_roundtrip() {
    let mut account = Account::new("Alice".to_string(), 101_052, GameVariant::Circuit, 1_700_000);
    account.real_balance = 12_345;
    account.game_currency = 9_000;
    account.tickets = 3;
    account.upgrades = UpgradeState::Circuit {
        engine_level: 4,
        rims: RimTier::Spinner,
        turbo: true,
    };
    let encoded = account.encode();
    assert_eq!(encoded.len(), account.encode_size());
    let decoded = Account::read(&mut &encoded[..]).unwrap();
    assert_eq!(account, decoded);
}

#[test]
fn test_withdrawal_roundtrip() {
    let request = WithdrawalRequest {
        id: 9,
        account: AccountId::derive("Alice"),
        phone_number: "0771234567".to_string(),
        amount: 100,
        status: WithdrawalStatus::Pending,
        created_at: 1_700_000,
    };
    let encoded = request.encode();
    assert_eq!(encoded.len(), request.encode_size());
    let decoded = WithdrawalRequest::read(&mut &encoded[..]).unwrap();
    assert_eq!(request, decoded);
}

#[test]
fn test_key_value_roundtrip() {
    let keys = [
        Key::Account(AccountId::derive("Alice")),
        Key::AccountNumber(101_052),
        Key::Withdrawal(3),
        Key::WithdrawalBook,
    ];
    for key in keys {
        let encoded = key.encode();
        assert_eq!(encoded.len(), key.encode_size());
        assert_eq!(Key::read(&mut &encoded[..]).unwrap(), key);
    }

    let value = Value::WithdrawalBook(WithdrawalBook {
        next_id: 4,
        pending: vec![1, 3],
    });
    let encoded = value.encode();
    assert_eq!(Value::read(&mut &encoded[..]).unwrap(), value);
}

#[test]
fn test_key_order_groups_accounts_first() {
    let mut keys = vec![
        Key::WithdrawalBook,
        Key::AccountNumber(101_052),
        Key::Account(AccountId::derive("Zoe")),
        Key::Account(AccountId::derive("Alice")),
    ];
    keys.sort();
    assert!(matches!(keys[0], Key::Account(_)));
    assert!(matches!(keys[1], Key::Account(_)));
    assert_eq!(keys[2], Key::AccountNumber(101_052));
    assert_eq!(keys[3], Key::WithdrawalBook);
}

#[test]
fn test_commission_rounds_half_away_from_zero() {
    let rules = EconomyRules::default();
    assert_eq!(rules.wager_commission_bps, 200);
    // 2% of 99 = 1.98 -> 2
    assert_eq!(rules.commission(99), 2);
    // 2% of 25 = 0.50 -> 1
    assert_eq!(rules.commission(25), 1);
    // 2% of 24 = 0.48 -> 0
    assert_eq!(rules.commission(24), 0);
    assert_eq!(rules.commission(0), 0);
    // No overflow at the extreme.
    assert_eq!(rules.commission(u64::MAX), u64::MAX / 50);
}

#[test]
fn test_race_payouts() {
    let rules = EconomyRules::default();
    assert_eq!(rules.race_payout(1), 500);
    assert_eq!(rules.race_payout(2), 250);
    assert_eq!(rules.race_payout(3), 100);
    assert_eq!(rules.race_payout(0), 0);
    assert_eq!(rules.race_payout(4), 0);
    assert_eq!(rules.race_payout(200), 0);
}

#[test]
fn test_variant_offers() {
    assert!(GameVariant::Circuit.offers(UpgradeKind::Rims));
    assert!(GameVariant::Circuit.offers(UpgradeKind::Turbo));
    assert!(GameVariant::Circuit.offers(UpgradeKind::Engine));
    assert!(!GameVariant::Circuit.offers(UpgradeKind::CarSpeed));
    assert!(GameVariant::Sprint.offers(UpgradeKind::CarSpeed));
    assert!(!GameVariant::Sprint.offers(UpgradeKind::Rims));
    assert!(!GameVariant::Arena.offers(UpgradeKind::Turbo));
}

#[test]
fn test_rules_validation() {
    assert!(EconomyRules::default().validate().is_ok());

    let mut rules = EconomyRules::default();
    rules.house_name = "7heaven".to_string();
    assert!(matches!(rules.validate(), Err(RulesError::HouseName(_))));

    let mut rules = EconomyRules::default();
    rules.wager_commission_bps = 10_001;
    assert_eq!(rules.validate(), Err(RulesError::CommissionTooHigh(10_001)));

    let mut rules = EconomyRules::default();
    rules.withdrawal_payout = rules.withdrawal_threshold + 1;
    assert_eq!(rules.validate(), Err(RulesError::WithdrawalAmounts));

    let mut rules = EconomyRules::default();
    rules.ticket_bundle.tickets = 0;
    assert_eq!(rules.validate(), Err(RulesError::EmptyTicketBundle));
}

#[test]
fn test_rules_partial_yaml_overrides() {
    let rules: EconomyRules =
        serde_json::from_str(r#"{"variant":"sprint","withdrawal_threshold":50000}"#).unwrap();
    assert_eq!(rules.variant, GameVariant::Sprint);
    assert_eq!(rules.withdrawal_threshold, 50_000);
    // Untouched fields keep their defaults.
    assert_eq!(rules.withdrawal_payout, 100);
    assert_eq!(rules.ticket_bundle.cost, 500);
}

#[test]
fn test_withdrawal_book_allocate_and_settle() {
    let mut book = WithdrawalBook::default();
    assert_eq!(book.allocate(), 0);
    assert_eq!(book.allocate(), 1);
    assert_eq!(book.allocate(), 2);
    assert_eq!(book.pending, vec![0, 1, 2]);

    assert!(book.settle(1));
    assert_eq!(book.pending, vec![0, 2]);
    assert!(!book.settle(1), "already settled");
    assert_eq!(book.next_id, 3);
}
