use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

use super::{Account, AccountId, WithdrawalBook, WithdrawalRequest};

/// Storage key space for the ledger.
///
/// The derived `Ord` is the fixed total order the transaction executor
/// acquires locks in; every multi-key operation sorts its keys through it, so
/// two operations touching the same keys can never deadlock.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// Account record, keyed by derived id.
    Account(AccountId),
    /// Uniqueness index: account number to owning account id.
    AccountNumber(u64),
    /// Withdrawal request by id.
    Withdrawal(u64),
    /// Singleton withdrawal queue head.
    WithdrawalBook,
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(id) => {
                0u8.write(writer);
                id.write(writer);
            }
            Self::AccountNumber(number) => {
                1u8.write(writer);
                number.write(writer);
            }
            Self::Withdrawal(id) => {
                2u8.write(writer);
                id.write(writer);
            }
            Self::WithdrawalBook => {
                3u8.write(writer);
            }
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Account(AccountId::read(reader)?)),
            1 => Ok(Self::AccountNumber(u64::read(reader)?)),
            2 => Ok(Self::Withdrawal(u64::read(reader)?)),
            3 => Ok(Self::WithdrawalBook),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Account(id) => id.encode_size(),
            Self::AccountNumber(number) => number.encode_size(),
            Self::Withdrawal(id) => id.encode_size(),
            Self::WithdrawalBook => 0,
        }
    }
}

/// Values stored under [Key], one variant per key kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Account(Account),
    /// Owning account id for an [Key::AccountNumber] index entry.
    AccountRef(AccountId),
    Withdrawal(WithdrawalRequest),
    WithdrawalBook(WithdrawalBook),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(account) => {
                0u8.write(writer);
                account.write(writer);
            }
            Self::AccountRef(id) => {
                1u8.write(writer);
                id.write(writer);
            }
            Self::Withdrawal(request) => {
                2u8.write(writer);
                request.write(writer);
            }
            Self::WithdrawalBook(book) => {
                3u8.write(writer);
                book.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Account(Account::read(reader)?)),
            1 => Ok(Self::AccountRef(AccountId::read(reader)?)),
            2 => Ok(Self::Withdrawal(WithdrawalRequest::read(reader)?)),
            3 => Ok(Self::WithdrawalBook(WithdrawalBook::read(reader)?)),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Account(account) => account.encode_size(),
            Self::AccountRef(id) => id.encode_size(),
            Self::Withdrawal(request) => request.encode_size(),
            Self::WithdrawalBook(book) => book.encode_size(),
        }
    }
}
