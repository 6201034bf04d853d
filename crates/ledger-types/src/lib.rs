//! # Ledger Types Crate
//!
//! Fixed-layout records and operation codes exchanged with the ledger engine.
//!
//! ## Design Principles
//!
//! - **Wire Layout Is the Type**: every record is `#[repr(C)]` and
//!   `bytemuck::Pod`, so a batch is a plain byte slice on the way in and a
//!   length-checked reinterpretation on the way out.
//! - **Single Source of Truth**: record sizes used by the bridge's decoder
//!   come from [`Operation::event_size`] and [`Operation::result_size`].
//! - **Failures Are Data**: per-event creation failures are records
//!   ([`CreateAccountsResult`], [`CreateTransfersResult`]), not errors.

pub mod ids;
pub mod operation;
pub mod records;
pub mod results;

pub use ids::{id, IdGenerator};
pub use operation::{Operation, UnknownOperation};
pub use records::*;
pub use results::*;

/// Maximum size of a single request body accepted by the engine.
///
/// One message is 1 MiB including a 256-byte header.
pub const MESSAGE_BODY_SIZE_MAX: usize = (1 << 20) - 256;

/// Maximum number of 128-byte events that fit in one request.
pub const BATCH_EVENTS_MAX: usize = MESSAGE_BODY_SIZE_MAX / 128;
