//! # Ledger Records
//!
//! Event and result records exchanged with the engine. Every struct here is
//! laid out exactly like the engine's C definition: `#[repr(C)]`, no padding,
//! little-endian integers. Sizes are asserted at compile time.

use bytemuck::{Pod, Zeroable};
use std::ops::BitOr;

// =============================================================================
// FLAGS
// =============================================================================

macro_rules! flag_set {
    ($(#[$meta:meta])* $name:ident($repr:ty) { $($(#[$fmeta:meta])* $flag:ident = $bit:expr;)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
        #[repr(transparent)]
        pub struct $name(pub $repr);

        impl $name {
            /// No flags set.
            pub const NONE: Self = Self(0);
            $($(#[$fmeta])* pub const $flag: Self = Self($bit);)*

            /// Whether every bit in `other` is set in `self`.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Raw bits.
            pub const fn bits(self) -> $repr {
                self.0
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }
    };
}

flag_set! {
    /// Account behaviour flags.
    AccountFlags(u16) {
        /// Chain this event with the next; all succeed or fail together.
        LINKED = 1 << 0;
        DEBITS_MUST_NOT_EXCEED_CREDITS = 1 << 1;
        CREDITS_MUST_NOT_EXCEED_DEBITS = 1 << 2;
        /// Keep balance history for `get_account_balances`.
        HISTORY = 1 << 3;
        IMPORTED = 1 << 4;
        CLOSED = 1 << 5;
    }
}

flag_set! {
    /// Transfer behaviour flags.
    TransferFlags(u16) {
        LINKED = 1 << 0;
        PENDING = 1 << 1;
        POST_PENDING_TRANSFER = 1 << 2;
        VOID_PENDING_TRANSFER = 1 << 3;
        BALANCING_DEBIT = 1 << 4;
        BALANCING_CREDIT = 1 << 5;
        CLOSING_DEBIT = 1 << 6;
        CLOSING_CREDIT = 1 << 7;
        IMPORTED = 1 << 8;
    }
}

flag_set! {
    /// Account history query flags.
    AccountFilterFlags(u32) {
        DEBITS = 1 << 0;
        CREDITS = 1 << 1;
        /// Newest first.
        REVERSED = 1 << 2;
    }
}

// =============================================================================
// ACCOUNTS
// =============================================================================

/// A ledger account (128 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Account {
    pub id: u128,
    pub debits_pending: u128,
    pub debits_posted: u128,
    pub credits_pending: u128,
    pub credits_posted: u128,
    pub user_data_128: u128,
    pub user_data_64: u64,
    pub user_data_32: u32,
    pub reserved: u32,
    pub ledger: u32,
    pub code: u16,
    pub flags: AccountFlags,
    /// Assigned by the engine; must be zero on creation.
    pub timestamp: u64,
}

impl Account {
    /// A new account event with the fields the engine requires.
    pub fn new(id: u128, ledger: u32, code: u16) -> Self {
        Self {
            id,
            ledger,
            code,
            ..Self::default()
        }
    }

    pub fn with_flags(mut self, flags: AccountFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_user_data_128(mut self, user_data: u128) -> Self {
        self.user_data_128 = user_data;
        self
    }

    /// Signed net balance from the debit side (posted only).
    pub fn posted_balance(&self) -> i128 {
        self.debits_posted as i128 - self.credits_posted as i128
    }
}

// =============================================================================
// TRANSFERS
// =============================================================================

/// A transfer between two accounts (128 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Transfer {
    pub id: u128,
    pub debit_account_id: u128,
    pub credit_account_id: u128,
    pub amount: u128,
    /// For posting or voiding a pending transfer.
    pub pending_id: u128,
    pub user_data_128: u128,
    pub user_data_64: u64,
    pub user_data_32: u32,
    /// Seconds before a pending transfer expires.
    pub timeout: u32,
    pub ledger: u32,
    pub code: u16,
    pub flags: TransferFlags,
    pub timestamp: u64,
}

impl Transfer {
    /// A new transfer event.
    pub fn new(
        id: u128,
        debit_account_id: u128,
        credit_account_id: u128,
        amount: u128,
        ledger: u32,
        code: u16,
    ) -> Self {
        Self {
            id,
            debit_account_id,
            credit_account_id,
            amount,
            ledger,
            code,
            ..Self::default()
        }
    }

    pub fn with_flags(mut self, flags: TransferFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_pending_id(mut self, pending_id: u128) -> Self {
        self.pending_id = pending_id;
        self
    }

    pub fn with_user_data_128(mut self, user_data: u128) -> Self {
        self.user_data_128 = user_data;
        self
    }
}

// =============================================================================
// ACCOUNT HISTORY
// =============================================================================

/// Query over one account's transfers or balance history (128 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct AccountFilter {
    pub account_id: u128,
    pub user_data_128: u128,
    pub user_data_64: u64,
    pub user_data_32: u32,
    pub code: u16,
    pub reserved: [u8; 58],
    /// Inclusive; zero means unbounded.
    pub timestamp_min: u64,
    /// Inclusive; zero means unbounded.
    pub timestamp_max: u64,
    pub limit: u32,
    pub flags: AccountFilterFlags,
}

impl AccountFilter {
    /// Debits and credits of `account_id`, oldest first, up to `limit` rows.
    pub fn for_account(account_id: u128, limit: u32) -> Self {
        Self {
            account_id,
            limit,
            flags: AccountFilterFlags::DEBITS | AccountFilterFlags::CREDITS,
            ..Self::zeroed()
        }
    }

    pub fn reversed(mut self) -> Self {
        self.flags = self.flags | AccountFilterFlags::REVERSED;
        self
    }

    pub fn between(mut self, timestamp_min: u64, timestamp_max: u64) -> Self {
        self.timestamp_min = timestamp_min;
        self.timestamp_max = timestamp_max;
        self
    }
}

impl Default for AccountFilter {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// One point of an account's balance history (128 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct AccountBalance {
    pub debits_pending: u128,
    pub debits_posted: u128,
    pub credits_pending: u128,
    pub credits_posted: u128,
    pub timestamp: u64,
    pub reserved: [u8; 56],
}

impl Default for AccountBalance {
    fn default() -> Self {
        Self::zeroed()
    }
}

const _: () = assert!(std::mem::size_of::<Account>() == 128);
const _: () = assert!(std::mem::size_of::<Transfer>() == 128);
const _: () = assert!(std::mem::size_of::<AccountFilter>() == 128);
const _: () = assert!(std::mem::size_of::<AccountBalance>() == 128);
