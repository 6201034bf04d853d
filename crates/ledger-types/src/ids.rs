//! Identifier helpers.
//!
//! Ledger ids are 128-bit. The engine indexes ids best when they are
//! time-ordered, so [`id`] derives them from UUID v7.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Generate a new time-ordered, unique 128-bit id (UUID v7).
pub fn id() -> u128 {
    Uuid::now_v7().as_u128()
}

/// Monotonic id source for deterministic batches (tests, probes).
///
/// Ids start at `start` and never repeat for the lifetime of the generator.
/// Zero and `u128::MAX` are rejected by the engine, so a generator never
/// hands them out.
#[derive(Debug)]
pub struct IdGenerator {
    high: u64,
    next: AtomicU64,
}

impl IdGenerator {
    /// Create a generator whose ids share the `high` 64 bits.
    pub fn new(high: u64, start: u64) -> Self {
        Self {
            high,
            next: AtomicU64::new(start.max(1)),
        }
    }

    /// Create a generator seeded from the current time so separate runs
    /// against the same cluster do not collide.
    pub fn time_seeded() -> Self {
        Self::new((id() >> 64) as u64, 1)
    }

    /// Next id.
    pub fn next_id(&self) -> u128 {
        let low = self.next.fetch_add(1, Ordering::Relaxed);
        let value = ((self.high as u128) << 64) | low as u128;
        if value == u128::MAX {
            // Skip the reserved sentinel.
            return self.next_id();
        }
        value
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::time_seeded()
    }
}
