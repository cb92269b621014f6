use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{derive_account_number, GameVariant, UpgradeKind, MAX_NAME_LENGTH, MAX_PHONE_LENGTH};

/// Which balance an upgrade cost is denominated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Cash,
    Coins,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::Coins => write!(f, "coins"),
        }
    }
}

/// Price of a single upgrade purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCost {
    pub currency: Currency,
    pub amount: u64,
}

/// Price and ceiling of a leveled upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieredCost {
    pub cost: UpgradeCost,
    pub max_level: u8,
}

/// Upgrade price list across all kinds. Kinds not offered by the deployment
/// variant are simply never purchasable; their entries are inert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCatalog {
    #[serde(default = "default_rims_cost")]
    pub rims: UpgradeCost,
    #[serde(default = "default_turbo_cost")]
    pub turbo: UpgradeCost,
    #[serde(default = "default_engine_cost")]
    pub engine: TieredCost,
    #[serde(default = "default_car_speed_cost")]
    pub car_speed: TieredCost,
}

impl Default for UpgradeCatalog {
    fn default() -> Self {
        Self {
            rims: default_rims_cost(),
            turbo: default_turbo_cost(),
            engine: default_engine_cost(),
            car_speed: default_car_speed_cost(),
        }
    }
}

/// Ticket bundle terms: cost in real currency, tickets granted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketBundle {
    pub cost: u64,
    pub tickets: u64,
}

/// Rules table rejected at construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("house name {0:?} does not derive an account number")]
    HouseName(String),
    #[error("wager commission {0} exceeds 10000 basis points")]
    CommissionTooHigh(u16),
    #[error("ticket bundle must cost a positive amount and grant tickets")]
    EmptyTicketBundle,
    #[error("withdrawal payout must be positive and not exceed the threshold")]
    WithdrawalAmounts,
    #[error("minimum phone digits must be between 1 and {max}", max = MAX_PHONE_LENGTH)]
    PhoneDigits,
    #[error("leveled upgrade max level must be at least 1")]
    ZeroMaxLevel,
}

/// Immutable, process-wide economy configuration.
///
/// Deserialized once at startup (partial files override only the fields they
/// name) and passed to the engine by value; nothing mutates it afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconomyRules {
    /// Deployment variant; selects upgrade record shape and offered kinds.
    #[serde(default = "default_variant")]
    pub variant: GameVariant,
    /// Reserved display name of the house account.
    #[serde(default = "default_house_name")]
    pub house_name: String,
    /// Coins granted per real-currency unit reloaded (0 = none).
    #[serde(default = "default_reload_conversion_rate")]
    pub reload_conversion_rate: u64,
    #[serde(default)]
    pub upgrades: UpgradeCatalog,
    #[serde(default = "default_ticket_bundle")]
    pub ticket_bundle: TicketBundle,
    /// Tickets granted by one EarnTickets call.
    #[serde(default = "default_ticket_award")]
    pub ticket_award: u64,
    /// Real-currency prizes for finishing ranks 1, 2, 3. Other ranks pay 0.
    #[serde(default = "default_race_payouts")]
    pub race_payouts: [u64; 3],
    /// Basis points of a lost bet credited to the house.
    #[serde(default = "default_wager_commission_bps")]
    pub wager_commission_bps: u16,
    /// Minimum real balance required to request a withdrawal.
    #[serde(default = "default_withdrawal_threshold")]
    pub withdrawal_threshold: u64,
    /// Fixed amount debited and recorded per withdrawal request.
    #[serde(default = "default_withdrawal_payout")]
    pub withdrawal_payout: u64,
    /// Minimum digits in a withdrawal phone number.
    #[serde(default = "default_min_phone_digits")]
    pub min_phone_digits: usize,
}

impl Default for EconomyRules {
    fn default() -> Self {
        Self {
            variant: default_variant(),
            house_name: default_house_name(),
            reload_conversion_rate: default_reload_conversion_rate(),
            upgrades: UpgradeCatalog::default(),
            ticket_bundle: default_ticket_bundle(),
            ticket_award: default_ticket_award(),
            race_payouts: default_race_payouts(),
            wager_commission_bps: default_wager_commission_bps(),
            withdrawal_threshold: default_withdrawal_threshold(),
            withdrawal_payout: default_withdrawal_payout(),
            min_phone_digits: default_min_phone_digits(),
        }
    }
}

impl EconomyRules {
    /// Check internal consistency. Run once at engine construction.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.house_name.len() > MAX_NAME_LENGTH
            || derive_account_number(&self.house_name).is_none()
        {
            return Err(RulesError::HouseName(self.house_name.clone()));
        }
        if self.wager_commission_bps > 10_000 {
            return Err(RulesError::CommissionTooHigh(self.wager_commission_bps));
        }
        if self.ticket_bundle.cost == 0 || self.ticket_bundle.tickets == 0 {
            return Err(RulesError::EmptyTicketBundle);
        }
        if self.withdrawal_payout == 0 || self.withdrawal_payout > self.withdrawal_threshold {
            return Err(RulesError::WithdrawalAmounts);
        }
        if self.min_phone_digits == 0 || self.min_phone_digits > MAX_PHONE_LENGTH {
            return Err(RulesError::PhoneDigits);
        }
        if self.upgrades.engine.max_level == 0 || self.upgrades.car_speed.max_level == 0 {
            return Err(RulesError::ZeroMaxLevel);
        }
        Ok(())
    }

    /// House commission on a lost bet: nearest smallest unit, ties away from
    /// zero. Intermediate math in u128 so no bet can overflow.
    pub fn commission(&self, bet: u64) -> u64 {
        let numerator = bet as u128 * self.wager_commission_bps as u128 + 5_000;
        (numerator / 10_000) as u64
    }

    /// Prize for a finishing rank (1-based). Ranks outside 1..=3 pay nothing.
    pub fn race_payout(&self, rank: u8) -> u64 {
        match rank {
            1..=3 => self.race_payouts[rank as usize - 1],
            _ => 0,
        }
    }

    /// Price of one purchase of the given kind.
    pub fn upgrade_cost(&self, kind: UpgradeKind) -> UpgradeCost {
        match kind {
            UpgradeKind::Rims => self.upgrades.rims,
            UpgradeKind::Turbo => self.upgrades.turbo,
            UpgradeKind::Engine => self.upgrades.engine.cost,
            UpgradeKind::CarSpeed => self.upgrades.car_speed.cost,
        }
    }
}

fn default_variant() -> GameVariant {
    GameVariant::Circuit
}

fn default_house_name() -> String {
    "House".to_string()
}

fn default_reload_conversion_rate() -> u64 {
    10
}

fn default_rims_cost() -> UpgradeCost {
    UpgradeCost {
        currency: Currency::Coins,
        amount: 1_000,
    }
}

fn default_turbo_cost() -> UpgradeCost {
    UpgradeCost {
        currency: Currency::Cash,
        amount: 50,
    }
}

fn default_engine_cost() -> TieredCost {
    TieredCost {
        cost: UpgradeCost {
            currency: Currency::Coins,
            amount: 2_500,
        },
        max_level: 5,
    }
}

fn default_car_speed_cost() -> TieredCost {
    TieredCost {
        cost: UpgradeCost {
            currency: Currency::Cash,
            amount: 200,
        },
        max_level: 5,
    }
}

fn default_ticket_bundle() -> TicketBundle {
    TicketBundle {
        cost: 500,
        tickets: 5,
    }
}

fn default_ticket_award() -> u64 {
    1
}

fn default_race_payouts() -> [u64; 3] {
    [500, 250, 100]
}

fn default_wager_commission_bps() -> u16 {
    200
}

fn default_withdrawal_threshold() -> u64 {
    100_000
}

fn default_withdrawal_payout() -> u64 {
    100
}

fn default_min_phone_digits() -> usize {
    9
}
