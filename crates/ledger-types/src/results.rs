//! # Creation Results
//!
//! The engine answers `create_accounts` / `create_transfers` with one
//! 8-byte record per *failed* event: the event's index in the batch and a
//! result code. Events absent from the reply were created. These records are
//! ordinary data, never bridge errors.

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Result code of a failed account creation.
///
/// Codes the client does not know are preserved in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateAccountResult {
    Ok,
    LinkedEventFailed,
    LinkedEventChainOpen,
    TimestampMustBeZero,
    ReservedField,
    ReservedFlag,
    IdMustNotBeZero,
    IdMustNotBeIntMax,
    FlagsAreMutuallyExclusive,
    DebitsPendingMustBeZero,
    DebitsPostedMustBeZero,
    CreditsPendingMustBeZero,
    CreditsPostedMustBeZero,
    LedgerMustNotBeZero,
    CodeMustNotBeZero,
    ExistsWithDifferentFlags,
    ExistsWithDifferentUserData128,
    ExistsWithDifferentUserData64,
    ExistsWithDifferentUserData32,
    ExistsWithDifferentLedger,
    ExistsWithDifferentCode,
    Exists,
    Other(u32),
}

impl CreateAccountResult {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::LinkedEventFailed,
            2 => Self::LinkedEventChainOpen,
            3 => Self::TimestampMustBeZero,
            4 => Self::ReservedField,
            5 => Self::ReservedFlag,
            6 => Self::IdMustNotBeZero,
            7 => Self::IdMustNotBeIntMax,
            8 => Self::FlagsAreMutuallyExclusive,
            9 => Self::DebitsPendingMustBeZero,
            10 => Self::DebitsPostedMustBeZero,
            11 => Self::CreditsPendingMustBeZero,
            12 => Self::CreditsPostedMustBeZero,
            13 => Self::LedgerMustNotBeZero,
            14 => Self::CodeMustNotBeZero,
            15 => Self::ExistsWithDifferentFlags,
            16 => Self::ExistsWithDifferentUserData128,
            17 => Self::ExistsWithDifferentUserData64,
            18 => Self::ExistsWithDifferentUserData32,
            19 => Self::ExistsWithDifferentLedger,
            20 => Self::ExistsWithDifferentCode,
            21 => Self::Exists,
            other => Self::Other(other),
        }
    }

    /// `Exists` is the idempotent-retry outcome: the account is there with
    /// identical fields.
    pub fn is_benign(self) -> bool {
        matches!(self, Self::Ok | Self::Exists)
    }
}

/// Result code of a failed transfer creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateTransferResult {
    Ok,
    LinkedEventFailed,
    LinkedEventChainOpen,
    TimestampMustBeZero,
    ReservedFlag,
    IdMustNotBeZero,
    IdMustNotBeIntMax,
    FlagsAreMutuallyExclusive,
    DebitAccountIdMustNotBeZero,
    DebitAccountIdMustNotBeIntMax,
    CreditAccountIdMustNotBeZero,
    CreditAccountIdMustNotBeIntMax,
    AccountsMustBeDifferent,
    PendingIdMustBeZero,
    PendingIdMustNotBeZero,
    PendingIdMustNotBeIntMax,
    PendingIdMustBeDifferent,
    TimeoutReservedForPendingTransfer,
    LedgerMustNotBeZero,
    CodeMustNotBeZero,
    DebitAccountNotFound,
    CreditAccountNotFound,
    AccountsMustHaveTheSameLedger,
    TransferMustHaveTheSameLedgerAsAccounts,
    Exists,
    ExceedsCredits,
    ExceedsDebits,
    Other(u32),
}

impl CreateTransferResult {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::LinkedEventFailed,
            2 => Self::LinkedEventChainOpen,
            3 => Self::TimestampMustBeZero,
            4 => Self::ReservedFlag,
            5 => Self::IdMustNotBeZero,
            6 => Self::IdMustNotBeIntMax,
            7 => Self::FlagsAreMutuallyExclusive,
            8 => Self::DebitAccountIdMustNotBeZero,
            9 => Self::DebitAccountIdMustNotBeIntMax,
            10 => Self::CreditAccountIdMustNotBeZero,
            11 => Self::CreditAccountIdMustNotBeIntMax,
            12 => Self::AccountsMustBeDifferent,
            13 => Self::PendingIdMustBeZero,
            14 => Self::PendingIdMustNotBeZero,
            15 => Self::PendingIdMustNotBeIntMax,
            16 => Self::PendingIdMustBeDifferent,
            17 => Self::TimeoutReservedForPendingTransfer,
            18 => Self::LedgerMustNotBeZero,
            19 => Self::CodeMustNotBeZero,
            20 => Self::DebitAccountNotFound,
            21 => Self::CreditAccountNotFound,
            22 => Self::AccountsMustHaveTheSameLedger,
            23 => Self::TransferMustHaveTheSameLedgerAsAccounts,
            46 => Self::Exists,
            54 => Self::ExceedsCredits,
            55 => Self::ExceedsDebits,
            other => Self::Other(other),
        }
    }

    pub fn is_benign(self) -> bool {
        matches!(self, Self::Ok | Self::Exists)
    }
}

/// One failed event of a `create_accounts` batch (8 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct CreateAccountsResult {
    pub index: u32,
    pub result: u32,
}

impl CreateAccountsResult {
    pub fn result(&self) -> CreateAccountResult {
        CreateAccountResult::from_code(self.result)
    }
}

/// One failed event of a `create_transfers` batch (8 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct CreateTransfersResult {
    pub index: u32,
    pub result: u32,
}

impl CreateTransfersResult {
    pub fn result(&self) -> CreateTransferResult {
        CreateTransferResult::from_code(self.result)
    }
}

const _: () = assert!(std::mem::size_of::<CreateAccountsResult>() == 8);
const _: () = assert!(std::mem::size_of::<CreateTransfersResult>() == 8);

/// A per-event failure surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationError<C> {
    /// Index of the event inside the submitted batch.
    pub index: u32,
    pub code: C,
}

impl<C: fmt::Debug> fmt::Display for OperationError<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event {} failed: {:?}", self.index, self.code)
    }
}

/// A creation batch partitioned into created and failed events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSummary<C> {
    /// Indices of created events, in batch order.
    pub created: Vec<u32>,
    /// Failed events, in batch order.
    pub failed: Vec<OperationError<C>>,
}

impl<C> CreateSummary<C> {
    pub fn all_created(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Records that report a failure for one event of a creation batch.
pub trait CreationFailure: Copy {
    type Code: Copy;

    fn index(&self) -> u32;
    fn code(&self) -> Self::Code;
}

impl CreationFailure for CreateAccountsResult {
    type Code = CreateAccountResult;

    fn index(&self) -> u32 {
        self.index
    }

    fn code(&self) -> CreateAccountResult {
        self.result()
    }
}

impl CreationFailure for CreateTransfersResult {
    type Code = CreateTransferResult;

    fn index(&self) -> u32 {
        self.index
    }

    fn code(&self) -> CreateTransferResult {
        self.result()
    }
}

impl<C: Copy> CreateSummary<C> {
    /// Partition a batch of `batch_len` events given the engine's failure
    /// records. Failure records pointing past the batch are ignored.
    pub fn from_results<R>(batch_len: usize, results: &[R]) -> Self
    where
        R: CreationFailure<Code = C>,
    {
        let mut failed_at = vec![None; batch_len];
        for record in results {
            if let Some(slot) = failed_at.get_mut(record.index() as usize) {
                *slot = Some(record.code());
            }
        }

        let mut created = Vec::with_capacity(batch_len);
        let mut failed = Vec::new();
        for (index, slot) in failed_at.into_iter().enumerate() {
            match slot {
                Some(code) => failed.push(OperationError {
                    index: index as u32,
                    code,
                }),
                None => created.push(index as u32),
            }
        }

        Self { created, failed }
    }
}
