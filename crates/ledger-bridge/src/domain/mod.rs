//! Domain layer for the ledger bridge.
//!
//! Pure request bookkeeping: tags, packet leases, the pending table, result
//! decoding, configuration and errors. Nothing here calls into the engine.

pub mod config;
pub mod correlation;
pub mod decoder;
pub mod error;
pub mod packet;
pub mod pending;
pub mod status;

pub use config::{ClientConfig, EngineMode, ADDRESSES_MAX};
pub use correlation::{CorrelationTag, TagGenerator};
pub use decoder::{DecodedBatch, Record, ResultDecoder};
pub use error::{
    ConfigError, InitializationError, ProtocolViolation, RequestError, SubmissionError,
};
pub use packet::{PacketLease, PacketState};
pub use pending::{
    BlockingSlot, Completed, Continuation, Outcome, PendingRequest, PendingRequestTable,
    PendingStats, StatsSnapshot,
};
pub use status::{ClientStatus, InitStatus, PacketStatus};
