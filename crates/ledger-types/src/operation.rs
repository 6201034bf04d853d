//! Operation codes understood by the engine.

use crate::records::{Account, AccountBalance, AccountFilter, Transfer};
use crate::results::{CreateAccountsResult, CreateTransfersResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem::size_of;
use thiserror::Error;

/// An engine operation, carried in the packet's `operation` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Operation {
    CreateAccounts = 129,
    CreateTransfers = 130,
    LookupAccounts = 131,
    LookupTransfers = 132,
    GetAccountTransfers = 133,
    GetAccountBalances = 134,
}

/// Raised when a byte does not name a known operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown operation code {0}")]
pub struct UnknownOperation(pub u8);

impl Operation {
    /// All client-visible operations.
    pub const ALL: [Operation; 6] = [
        Operation::CreateAccounts,
        Operation::CreateTransfers,
        Operation::LookupAccounts,
        Operation::LookupTransfers,
        Operation::GetAccountTransfers,
        Operation::GetAccountBalances,
    ];

    /// Wire code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Size of one request event for this operation.
    pub const fn event_size(self) -> usize {
        match self {
            Operation::CreateAccounts => size_of::<Account>(),
            Operation::CreateTransfers => size_of::<Transfer>(),
            Operation::LookupAccounts | Operation::LookupTransfers => size_of::<u128>(),
            Operation::GetAccountTransfers | Operation::GetAccountBalances => {
                size_of::<AccountFilter>()
            }
        }
    }

    /// Size of one result record for this operation.
    pub const fn result_size(self) -> usize {
        match self {
            Operation::CreateAccounts => size_of::<CreateAccountsResult>(),
            Operation::CreateTransfers => size_of::<CreateTransfersResult>(),
            Operation::LookupAccounts => size_of::<Account>(),
            Operation::LookupTransfers | Operation::GetAccountTransfers => size_of::<Transfer>(),
            Operation::GetAccountBalances => size_of::<AccountBalance>(),
        }
    }

    /// Whether a request carries a batch of events (as opposed to a single
    /// query filter).
    pub const fn is_batched(self) -> bool {
        matches!(
            self,
            Operation::CreateAccounts
                | Operation::CreateTransfers
                | Operation::LookupAccounts
                | Operation::LookupTransfers
        )
    }

    /// Snake-case name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Operation::CreateAccounts => "create_accounts",
            Operation::CreateTransfers => "create_transfers",
            Operation::LookupAccounts => "lookup_accounts",
            Operation::LookupTransfers => "lookup_transfers",
            Operation::GetAccountTransfers => "get_account_transfers",
            Operation::GetAccountBalances => "get_account_balances",
        }
    }
}

impl TryFrom<u8> for Operation {
    type Error = UnknownOperation;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Operation::ALL
            .into_iter()
            .find(|op| op.code() == code)
            .ok_or(UnknownOperation(code))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
