//! Economy domain types.
//!
//! Defines account/withdrawal records, the storage key space, the rules table,
//! and the caller-facing error reasons used by the ledger engine.

mod account;
mod codec;
mod reason;
mod rules;
mod state;
mod upgrade;
mod withdrawal;

pub use account::*;
pub use codec::{read_string, string_encode_size, write_string};
pub use reason::*;
pub use rules::*;
pub use state::*;
pub use upgrade::*;
pub use withdrawal::*;

#[cfg(test)]
mod tests;
