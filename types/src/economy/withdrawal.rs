use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use serde::Serialize;

use super::{read_string, string_encode_size, write_string, AccountId, AccountView};

/// Maximum phone number length accepted on a withdrawal request.
pub const MAX_PHONE_LENGTH: usize = 20;

/// Upper bound on pending requests tracked by the book. Requests are settled
/// by the administrative process long before this is approached.
pub const MAX_PENDING_WITHDRAWALS: usize = 1 << 20;

/// Withdrawal request lifecycle. Starts Pending; advanced exactly once by the
/// administrative collaborator, never by the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending = 0,
    Completed = 1,
    Rejected = 2,
}

impl Write for WithdrawalStatus {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for WithdrawalStatus {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Completed),
            2 => Ok(Self::Rejected),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for WithdrawalStatus {
    const SIZE: usize = 1;
}

/// A recorded withdrawal request.
///
/// Created only after the payout debit succeeded, in the same atomic unit, so
/// a request existing implies the debit happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WithdrawalRequest {
    pub id: u64,
    pub account: AccountId,
    /// Contact number the payout is routed to.
    pub phone_number: String,
    /// Amount debited and owed, in smallest real-currency units.
    pub amount: u64,
    pub status: WithdrawalStatus,
    /// Unix seconds at creation.
    pub created_at: u64,
}

impl Write for WithdrawalRequest {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.account.write(writer);
        write_string(&self.phone_number, writer);
        self.amount.write(writer);
        self.status.write(writer);
        self.created_at.write(writer);
    }
}

impl Read for WithdrawalRequest {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let id = u64::read(reader)?;
        let account = AccountId::read(reader)?;
        let phone_number = read_string(reader, MAX_PHONE_LENGTH)?;
        let amount = u64::read(reader)?;
        let status = WithdrawalStatus::read(reader)?;
        let created_at = u64::read(reader)?;
        Ok(Self {
            id,
            account,
            phone_number,
            amount,
            status,
            created_at,
        })
    }
}

impl EncodeSize for WithdrawalRequest {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + AccountId::SIZE
            + string_encode_size(&self.phone_number)
            + self.amount.encode_size()
            + WithdrawalStatus::SIZE
            + self.created_at.encode_size()
    }
}

/// Result of a successful withdrawal: the appended request and the debited
/// account's public fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WithdrawalReceipt {
    pub request: WithdrawalRequest,
    pub account: AccountView,
}

/// Head of the withdrawal queue: the id sequence plus the Pending index the
/// administrative collaborator reads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WithdrawalBook {
    pub next_id: u64,
    /// Ids of requests still Pending, in creation order.
    pub pending: Vec<u64>,
}

impl WithdrawalBook {
    /// Allocate the next request id and index it as Pending.
    pub fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.pending.push(id);
        id
    }

    /// Drop a request from the Pending index. Returns false when the id was
    /// not pending.
    pub fn settle(&mut self, id: u64) -> bool {
        match self.pending.iter().position(|pending| *pending == id) {
            Some(index) => {
                self.pending.remove(index);
                true
            }
            None => false,
        }
    }
}

impl Write for WithdrawalBook {
    fn write(&self, writer: &mut impl BufMut) {
        self.next_id.write(writer);
        self.pending.write(writer);
    }
}

impl Read for WithdrawalBook {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let next_id = u64::read(reader)?;
        let pending = Vec::<u64>::read_range(reader, 0..=MAX_PENDING_WITHDRAWALS)?;
        Ok(Self { next_id, pending })
    }
}

impl EncodeSize for WithdrawalBook {
    fn encode_size(&self) -> usize {
        self.next_id.encode_size() + self.pending.encode_size()
    }
}
