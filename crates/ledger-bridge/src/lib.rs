//! # Ledger Bridge - Client bridge to the embedded ledger engine.
//!
//! Dispatches typed requests to an engine reached through a C ABI and
//! matches the engine's completion callbacks, fired on engine threads in any
//! order, back to the caller that submitted each packet.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                          Client (typed)                            │
//! │   create_accounts / lookup_transfers / ... , blocking and _async   │
//! └───────────────┬───────────────────────────────────┬────────────────┘
//!                 │                                   │
//!        ┌────────┴────────┐                 ┌────────┴────────┐
//!        │ BlockingRequest │                 │  AsyncRequest   │
//!        │  (park thread)  │                 │ (oneshot + fut) │
//!        └────────┬────────┘                 └────────┬────────┘
//!                 │  register(tag)  ┌──────────────┐  │
//!                 ├────────────────→│   Pending    │←─┤
//!                 │                 │ RequestTable │  │
//!        ┌────────┴─────────────────┴──────┬───────┴──┴──────┐
//!        │          ClientHandle           │  resolve(tag)   │
//!        │  session lock, pinned session   │                 │
//!        └────────┬────────────────────────┘  ┌──────────────┴──┐
//!                 │ submit(packet)            │   Completion    │
//!                 ▼                           │   Dispatcher    │
//!        ┌──────────────────────┐  callback   │ (catch / abort) │
//!        │   Engine (C ABI)     │────────────→│ + ResultDecoder │
//!        │  echo | tb_client    │             └─────────────────┘
//!        └──────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use ledger_bridge::{Client, ClientConfig, EngineMode};
//! use ledger_types::{Account, id};
//!
//! let client = Client::new(ClientConfig::new(0, vec!["3000".into()], EngineMode::Native))?;
//! let failed = client.create_accounts(&[Account::new(id(), 1, 1)])?;
//! client.shutdown();
//! ```
//!
//! # Guarantees
//!
//! - Each submitted packet resolves exactly one caller, with its own result
//! - No panic or engine contract breach unwinds across the boundary: the
//!   dispatcher logs it and aborts the process
//! - Packets, request bodies and the session memory stay at fixed addresses
//!   for as long as the engine may read them

#![warn(clippy::all)]
#![warn(clippy::unwrap_used, clippy::expect_used)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod client;
pub mod domain;
pub mod ffi;
pub mod request;
pub mod session;

pub use client::Client;
pub use domain::{
    ClientConfig, ConfigError, CorrelationTag, DecodedBatch, EngineMode, InitializationError,
    PacketStatus, ProtocolViolation, Record, RequestError, StatsSnapshot, SubmissionError,
};
pub use ffi::EngineApi;
pub use request::{AsyncRequest, BlockingRequest, Reply};
pub use session::ClientHandle;
