//! Correlation tags for matching completions to requests.
//!
//! A tag travels through the engine in the packet's `user_data` pointer
//! slot. Tags come from a per-client monotonic counter, so they are unique
//! among registered requests for the lifetime of a session.

use serde::{Deserialize, Serialize};
use std::ffi::c_void;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Correlation tag for one submitted packet.
///
/// Zero is never issued: a null `user_data` decodes to the zero tag and is
/// therefore always unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationTag(u64);

impl CorrelationTag {
    /// Create from a raw value
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Encode into a packet's `user_data` slot.
    pub fn to_user_data(self) -> *mut c_void {
        self.0 as usize as *mut c_void
    }

    /// Decode from a packet's `user_data` slot.
    pub fn from_user_data(user_data: *mut c_void) -> Self {
        Self(user_data as usize as u64)
    }
}

impl fmt::Display for CorrelationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for CorrelationTag {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Monotonic tag source.
#[derive(Debug)]
pub struct TagGenerator {
    next: AtomicU64,
}

impl TagGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Issue the next tag.
    pub fn next_tag(&self) -> CorrelationTag {
        CorrelationTag(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new()
    }
}
