//! Overdrive account ledger and economy engine.
//!
//! This crate contains the transaction executor ([`Ledger`]) and the economy
//! operations built on it: reloads, upgrade purchases, ticket
//! purchase/spend/award, race payouts, wager resolution, and the withdrawal
//! queue.
//!
//! ## Concurrency invariants
//! - Every mutation runs as a conditional delta: per-key locks are acquired in
//!   the key space's total order before the first read and held through
//!   commit, so a precondition always holds at the moment its delta applies.
//! - Pair transactions (wager commissions) lock both accounts in that same
//!   order; no interleaving can observe one side applied without the other.
//! - Balances are unsigned and only debited after their precondition held
//!   under the lock; no operation can drive a balance negative.
//!
//! ## Storage invariants
//! An operation's writes are buffered and applied to the store as one batch
//! after its checks pass. Uniqueness of display names and account numbers is
//! enforced under the same locks that guard the writes, never by a bare
//! pre-check.
//!
//! The primary entrypoint is [`Ledger`].

mod engine;

pub mod store;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use engine::{Ledger, LedgerError, WithdrawalResolution};
pub use store::{Adb, Store};

#[cfg(any(test, feature = "mocks"))]
pub use store::Memory;
