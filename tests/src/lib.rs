//! # Ledger Bridge Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures/        # Scripted engines implementing the boundary ABI
//! │   ├── mod.rs       # Shared engine core and entry points
//! │   └── scripts.rs   # Delayed, scrambling, counting, holding, faulty
//! │
//! └── integration/     # End-to-end scenarios through the public client
//!     ├── round_trip.rs
//!     ├── concurrency.rs
//!     ├── shutdown.rs
//!     └── abort.rs     # Contract breaches, run in a child process
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ledger-tests
//!
//! # By category
//! cargo test -p ledger-tests integration::concurrency::
//! cargo test -p ledger-tests integration::abort::
//!
//! # Benchmarks
//! cargo bench -p ledger-tests
//! ```

#![allow(dead_code)]

pub mod integration;
