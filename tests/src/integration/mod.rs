//! # Integration Scenarios
//!
//! End-to-end runs through the public client against the echo engine and
//! the fixture engines.

pub mod abort;
pub mod concurrency;
pub mod round_trip;
pub mod shutdown;
