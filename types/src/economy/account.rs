use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{
    sha256::{Digest, Sha256},
    Hasher,
};
use commonware_utils::hex;
use serde::{Serialize, Serializer};
use std::fmt;

use super::{read_string, string_encode_size, write_string, GameVariant, UpgradeState};

/// Maximum display name length in bytes.
pub const MAX_NAME_LENGTH: usize = 32;

/// Base offset for derived account numbers. A name whose first letter is 'A'
/// maps to `ACCOUNT_NUMBER_BASE + 1`, 'Z' to `ACCOUNT_NUMBER_BASE + 26`.
pub const ACCOUNT_NUMBER_BASE: u64 = 101_051;

/// Derive the account number from a display name.
///
/// The first character is uppercased; names not starting with A-Z have no
/// account number and must be rejected at registration.
pub fn derive_account_number(display_name: &str) -> Option<u64> {
    let first = display_name.chars().next()?.to_ascii_uppercase();
    if !first.is_ascii_uppercase() {
        return None;
    }
    Some(ACCOUNT_NUMBER_BASE + (first as u64 - 'A' as u64 + 1))
}

/// Opaque account identifier: the SHA-256 digest of the display name.
///
/// Display names are unique, so the digest is too, and looking an account up
/// by name is the same operation as looking it up by id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(Digest);

impl AccountId {
    pub fn derive(display_name: &str) -> Self {
        Self(Sha256::hash(display_name.as_bytes()))
    }

    /// Hex rendering for logs and transport payloads.
    pub fn to_hex(&self) -> String {
        hex(self.0.as_ref())
    }
}

impl AsRef<[u8]> for AccountId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl Write for AccountId {
    fn write(&self, writer: &mut impl BufMut) {
        self.0.write(writer);
    }
}

impl Read for AccountId {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self(Digest::read(reader)?))
    }
}

impl FixedSize for AccountId {
    const SIZE: usize = Digest::SIZE;
}

/// Persistent account record.
///
/// The three numeric balances exist on every account regardless of variant;
/// only the upgrade record is variant-shaped. Balances never go negative: a
/// debit is applied only after its precondition held under the account's lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub display_name: String,
    pub account_number: u64,
    /// Real-currency balance, in smallest units. Subject to withdrawal.
    pub real_balance: u64,
    /// Coins balance. Non-withdrawable; 0 where the variant grants none.
    pub game_currency: u64,
    /// Ticket count. Consumed one per race/fight entry.
    pub tickets: u64,
    pub upgrades: UpgradeState,
    /// Unix seconds at registration.
    pub created_at: u64,
}

impl Account {
    /// New account with documented defaults: zero balances, zero tickets,
    /// variant-default upgrade record.
    pub fn new(
        display_name: String,
        account_number: u64,
        variant: GameVariant,
        created_at: u64,
    ) -> Self {
        let id = AccountId::derive(&display_name);
        Self {
            id,
            display_name,
            account_number,
            real_balance: 0,
            game_currency: 0,
            tickets: 0,
            upgrades: UpgradeState::for_variant(variant),
            created_at,
        }
    }
}

impl Write for Account {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        write_string(&self.display_name, writer);
        self.account_number.write(writer);
        self.real_balance.write(writer);
        self.game_currency.write(writer);
        self.tickets.write(writer);
        self.upgrades.write(writer);
        self.created_at.write(writer);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let id = AccountId::read(reader)?;
        let display_name = read_string(reader, MAX_NAME_LENGTH)?;
        let account_number = u64::read(reader)?;
        let real_balance = u64::read(reader)?;
        let game_currency = u64::read(reader)?;
        let tickets = u64::read(reader)?;
        let upgrades = UpgradeState::read(reader)?;
        let created_at = u64::read(reader)?;
        Ok(Self {
            id,
            display_name,
            account_number,
            real_balance,
            game_currency,
            tickets,
            upgrades,
            created_at,
        })
    }
}

impl EncodeSize for Account {
    fn encode_size(&self) -> usize {
        AccountId::SIZE
            + string_encode_size(&self.display_name)
            + self.account_number.encode_size()
            + self.real_balance.encode_size()
            + self.game_currency.encode_size()
            + self.tickets.encode_size()
            + self.upgrades.encode_size()
            + self.created_at.encode_size()
    }
}

/// Public fields of an account, returned from every operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub id: AccountId,
    pub display_name: String,
    pub account_number: u64,
    pub real_balance: u64,
    pub game_currency: u64,
    pub tickets: u64,
    pub upgrades: UpgradeState,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            display_name: account.display_name.clone(),
            account_number: account.account_number,
            real_balance: account.real_balance,
            game_currency: account.game_currency,
            tickets: account.tickets,
            upgrades: account.upgrades.clone(),
        }
    }
}
