//! # Client Session
//!
//! [`ClientHandle`] owns one engine session: the pinned session memory, the
//! completion context, and the pending request table.
//!
//! ## Lifetime
//!
//! ```text
//! initialize ──→ [Open] ──shutdown──→ [Closed]
//!                  │                     │
//!                submit               submit → ClientClosed (no engine call)
//! ```
//!
//! Submissions hold the read side of the session lock across the engine
//! call; shutdown takes the write side. A submit therefore either reaches
//! the engine before `deinit` or observes `Closed`.

use crate::adapters;
use crate::domain::config::ClientConfig;
use crate::domain::correlation::{CorrelationTag, TagGenerator};
use crate::domain::error::{InitializationError, RequestError, SubmissionError};
use crate::domain::packet::PacketLease;
use crate::domain::pending::{Continuation, PendingRequest, PendingRequestTable, StatsSnapshot};
use crate::domain::status::{ClientStatus, InitStatus};
use crate::ffi::abi::{EngineApi, RawClient};
use crate::ffi::dispatcher::{abort_on_violation, on_completion, CompletionDispatcher};
use ledger_types::Operation;
use parking_lot::RwLock;
use std::ptr::NonNull;
use std::sync::Arc;
use tracing::{debug, info, warn};

enum SessionState {
    Open {
        raw: NonNull<RawClient>,
        /// Leaked `Arc<CompletionDispatcher>`.
        ctx: usize,
    },
    Closed,
}

/// An open session with the ledger engine.
pub struct ClientHandle {
    engine: EngineApi,
    config: ClientConfig,
    table: Arc<PendingRequestTable>,
    tags: TagGenerator,
    state: RwLock<SessionState>,
}

// SAFETY: the raw session pointer is only dereferenced by the engine. The
// bridge passes it to `submit` under the read lock and to `deinit` under the
// write lock, and the engine's entry points are thread-safe.
unsafe impl Send for ClientHandle {}
// SAFETY: see above; all other fields are `Sync`.
unsafe impl Sync for ClientHandle {}

impl ClientHandle {
    /// Open a session with the engine selected by `config.mode`.
    pub fn initialize(config: ClientConfig) -> Result<Self, InitializationError> {
        config.validate()?;
        let engine = adapters::engine_for(config.mode)?;
        Self::with_engine(engine, config)
    }

    /// Open a session with a caller-supplied engine.
    pub fn with_engine(engine: EngineApi, config: ClientConfig) -> Result<Self, InitializationError> {
        config.validate()?;
        let addresses = config.encoded_addresses()?;
        let cluster_id = config.cluster_id_bytes();

        let table = Arc::new(PendingRequestTable::new());
        let ctx = Arc::new(CompletionDispatcher::new(Arc::clone(&table))).into_context();
        let raw = NonNull::from(Box::leak(Box::new(RawClient::zeroed())));

        // SAFETY: every pointer is valid for the call; `raw` and `ctx` stay
        // alive until after `deinit` (or are reclaimed right below on failure).
        let code = unsafe {
            (engine.init)(
                raw.as_ptr(),
                cluster_id.as_ptr(),
                addresses.as_ptr(),
                addresses.as_bytes().len() as u32,
                ctx,
                on_completion,
            )
        };

        if let Some(error) = init_error(code) {
            // SAFETY: init failed, so the engine holds neither pointer.
            unsafe {
                drop(CompletionDispatcher::reclaim_context(ctx));
                drop(Box::from_raw(raw.as_ptr()));
            }
            warn!(
                engine = engine.name,
                code = code,
                error = %error,
                "Engine initialization failed"
            );
            return Err(error);
        }

        info!(
            engine = engine.name,
            cluster_id = %config.cluster_id,
            addresses = %addresses.to_string_lossy(),
            "Client session opened"
        );

        Ok(Self {
            engine,
            config,
            table,
            tags: TagGenerator::new(),
            state: RwLock::new(SessionState::Open { raw, ctx }),
        })
    }

    /// Hand a request to the engine.
    ///
    /// The entry is registered before the engine sees the packet. If the
    /// engine refuses the packet, the entry is withdrawn and the caller gets
    /// `ClientClosed`; the continuation is never resumed.
    pub fn submit(
        &self,
        operation: Operation,
        body: Vec<u8>,
        record_size: usize,
        continuation: Continuation,
    ) -> Result<CorrelationTag, SubmissionError> {
        let state = self.state.read();
        let SessionState::Open { raw, .. } = &*state else {
            return Err(SubmissionError::ClientClosed);
        };

        if body.len() > u32::MAX as usize {
            return Err(SubmissionError::BatchTooLarge {
                len: body.len(),
                max: u32::MAX as usize,
            });
        }

        let tag = self.tags.next_tag();
        let mut lease = PacketLease::new(tag, operation.code(), body);
        let packet = match lease.submit() {
            Ok(packet) => packet,
            Err(violation) => abort_on_violation(&violation),
        };

        let request = PendingRequest::new(continuation, operation.code(), record_size, lease);
        if let Err(violation) = self.table.register(tag, request) {
            abort_on_violation(&violation);
        }

        // SAFETY: the session is open (read lock held) and the packet is owned
        // by the registered entry until its completion.
        let code = unsafe { (self.engine.submit)(raw.as_ptr(), packet) };

        match ClientStatus::from_code(code) {
            ClientStatus::Ok => Ok(tag),
            ClientStatus::Invalid => {
                drop(self.table.cancel(tag));
                warn!(tag = %tag, operation = %operation, "Engine refused packet");
                Err(SubmissionError::ClientClosed)
            }
        }
    }

    /// Release the engine session. Idempotent.
    ///
    /// `deinit` completes every outstanding packet before returning. Any
    /// request still registered afterwards fails with
    /// [`RequestError::ClientClosed`].
    pub fn shutdown(&self) {
        let mut state = self.state.write();
        let SessionState::Open { raw, ctx } = std::mem::replace(&mut *state, SessionState::Closed)
        else {
            return;
        };

        // SAFETY: no submit can run (write lock held); the pointer came from
        // `Box::leak` in `with_engine`.
        unsafe { (self.engine.deinit)(raw.as_ptr()) };

        let leftovers = self.table.drain();
        if !leftovers.is_empty() {
            warn!(
                count = leftovers.len(),
                "Requests still pending after engine deinit"
            );
        }
        for (tag, request) in leftovers {
            self.table.fulfil(tag, request, Err(RequestError::ClientClosed));
        }

        // SAFETY: the engine no longer calls back after `deinit` returned.
        unsafe {
            drop(CompletionDispatcher::reclaim_context(ctx));
            drop(Box::from_raw(raw.as_ptr()));
        }

        info!(engine = self.engine.name, "Client session closed");
    }

    pub fn is_closed(&self) -> bool {
        matches!(*self.state.read(), SessionState::Closed)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name
    }

    pub fn pending_count(&self) -> usize {
        self.table.pending_count()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.table.snapshot()
    }
}

impl Drop for ClientHandle {
    fn drop(&mut self) {
        if !self.is_closed() {
            debug!("Client dropped without shutdown");
            self.shutdown();
        }
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientHandle")
            .field("engine", &self.engine.name)
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .field("pending", &self.table.pending_count())
            .finish()
    }
}

fn init_error(code: u32) -> Option<InitializationError> {
    match InitStatus::from_code(code) {
        Some(InitStatus::Success) => None,
        Some(InitStatus::AddressInvalid) => Some(InitializationError::AddressInvalid),
        Some(InitStatus::AddressLimitExceeded) => Some(InitializationError::AddressLimitExceeded),
        Some(InitStatus::OutOfMemory) => Some(InitializationError::OutOfMemory),
        Some(InitStatus::SystemResources) => Some(InitializationError::SystemResources),
        Some(InitStatus::NetworkSubsystem) => Some(InitializationError::NetworkSubsystem),
        Some(InitStatus::Unexpected) | None => Some(InitializationError::Unexpected(code)),
    }
}
