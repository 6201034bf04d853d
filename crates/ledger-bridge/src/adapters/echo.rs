//! # Echo Engine
//!
//! An in-process engine implementing the boundary ABI. Every accepted
//! packet completes with its own request body as the result, on one of a
//! small pool of worker threads, after a random delay. Completion order
//! across packets is therefore arbitrary, like the real engine's.
//!
//! Used for `EngineMode::Echo`, for diagnostics and for tests that need a
//! realistic completion pattern without a cluster.

use crate::domain::status::{ClientStatus, InitStatus, PacketStatus};
use crate::ffi::abi::{CompletionFn, EngineApi, RawClient, RawPacket};
use ledger_types::{Operation, MESSAGE_BODY_SIZE_MAX};
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use std::ffi::c_char;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use std::{mem, ptr, slice};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Worker threads per echo session.
pub const ECHO_WORKERS: usize = 4;

/// Upper bound of the per-packet completion delay.
const JITTER_MAX_MICROS: u64 = 200;

/// Replica limit enforced on the address list.
const REPLICAS_MAX: usize = 6;

/// Echo engine entry points.
pub const ECHO_ENGINE: EngineApi = EngineApi {
    name: "echo",
    init: echo_init,
    submit: echo_submit,
    deinit: echo_deinit,
};

struct PacketPtr(*mut RawPacket);

// SAFETY: the engine owns the packet between submit and completion; only
// the worker holding the job touches it.
unsafe impl Send for PacketPtr {}

struct Job {
    packet: PacketPtr,
    status: PacketStatus,
}

struct Shared {
    ctx: usize,
    completion: CompletionFn,
    shutting_down: AtomicBool,
}

impl Shared {
    /// Write the status and invoke the completion callback.
    ///
    /// # Safety
    ///
    /// `packet` must be a submitted packet not yet completed.
    unsafe fn complete(&self, packet: *mut RawPacket, status: PacketStatus) {
        (*packet).status = status.code();
        let (result_ptr, result_len) = if status.is_ok() {
            ((*packet).data as *const u8, (*packet).data_size)
        } else {
            (ptr::null(), 0)
        };
        (self.completion)(self.ctx, packet, now_nanos(), result_ptr, result_len);
    }
}

struct EchoEngine {
    shared: Arc<Shared>,
    senders: RwLock<Vec<mpsc::UnboundedSender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl EchoEngine {
    fn start(ctx: usize, completion: CompletionFn) -> Result<Self, InitStatus> {
        let shared = Arc::new(Shared {
            ctx,
            completion,
            shutting_down: AtomicBool::new(false),
        });

        let mut senders = Vec::with_capacity(ECHO_WORKERS);
        let mut workers = Vec::with_capacity(ECHO_WORKERS);
        for index in 0..ECHO_WORKERS {
            let (tx, rx) = mpsc::unbounded_channel();
            let worker_shared = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name(format!("ledger-echo-{index}"))
                .spawn(move || run_worker(worker_shared, rx));

            match spawned {
                Ok(handle) => {
                    senders.push(tx);
                    workers.push(handle);
                }
                Err(error) => {
                    warn!(error = %error, "Failed to spawn echo worker");
                    drop(senders);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(InitStatus::SystemResources);
                }
            }
        }

        Ok(Self {
            shared,
            senders: RwLock::new(senders),
            workers: Mutex::new(workers),
        })
    }

    /// # Safety
    ///
    /// `packet` must stay valid until its completion.
    unsafe fn submit(&self, packet: *mut RawPacket) -> ClientStatus {
        if self.shared.shutting_down.load(Ordering::Acquire) {
            return ClientStatus::Invalid;
        }

        let status = {
            let packet = &*packet;
            if Operation::try_from(packet.operation).is_err() {
                PacketStatus::InvalidOperation
            } else if packet.data_size as usize > MESSAGE_BODY_SIZE_MAX {
                PacketStatus::TooMuchData
            } else {
                PacketStatus::Ok
            }
        };

        let senders = self.senders.read();
        if senders.is_empty() {
            return ClientStatus::Invalid;
        }
        let worker = rand::thread_rng().gen_range(0..senders.len());
        let job = Job {
            packet: PacketPtr(packet),
            status,
        };
        match senders[worker].send(job) {
            Ok(()) => ClientStatus::Ok,
            Err(_) => ClientStatus::Invalid,
        }
    }

    /// Stop accepting packets, let workers complete what is queued, and
    /// join them. No completion runs after this returns.
    fn shutdown(&self) {
        self.shared.shutting_down.store(true, Ordering::Release);
        drop(mem::take(&mut *self.senders.write()));

        let workers = mem::take(&mut *self.workers.lock());
        for handle in workers {
            if handle.join().is_err() {
                warn!("Echo worker panicked");
            }
        }
        info!("Echo engine stopped");
    }
}

fn run_worker(shared: Arc<Shared>, mut jobs: mpsc::UnboundedReceiver<Job>) {
    let mut rng = rand::thread_rng();
    while let Some(job) = jobs.blocking_recv() {
        let status = if shared.shutting_down.load(Ordering::Acquire) {
            PacketStatus::ClientShutdown
        } else {
            job.status
        };

        if status.is_ok() {
            let jitter = rng.gen_range(0..=JITTER_MAX_MICROS);
            if jitter > 0 {
                thread::sleep(Duration::from_micros(jitter));
            }
        }

        // SAFETY: the packet was accepted by `submit` and is completed once,
        // here.
        unsafe { shared.complete(job.packet.0, status) };
    }
}

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}

/// Check an encoded address list: comma-separated `host:port` or bare port
/// entries, at most [`REPLICAS_MAX`].
fn validate_addresses(raw: &[u8]) -> Result<usize, InitStatus> {
    let text = std::str::from_utf8(raw).map_err(|_| InitStatus::AddressInvalid)?;
    if text.is_empty() {
        return Err(InitStatus::AddressInvalid);
    }

    let entries: Vec<&str> = text.split(',').collect();
    if entries.len() > REPLICAS_MAX {
        return Err(InitStatus::AddressLimitExceeded);
    }

    for entry in &entries {
        let port = match entry.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() => port,
            Some(_) => return Err(InitStatus::AddressInvalid),
            None => entry,
        };
        if port.parse::<u16>().is_err() {
            return Err(InitStatus::AddressInvalid);
        }
    }

    Ok(entries.len())
}

unsafe extern "C" fn echo_init(
    client_out: *mut RawClient,
    cluster_id: *const u8,
    address_ptr: *const c_char,
    address_len: u32,
    completion_ctx: usize,
    completion_fn: CompletionFn,
) -> u32 {
    if client_out.is_null() || cluster_id.is_null() {
        return InitStatus::Unexpected.code();
    }
    if address_ptr.is_null() {
        return InitStatus::AddressInvalid.code();
    }

    let addresses = slice::from_raw_parts(address_ptr as *const u8, address_len as usize);
    let replicas = match validate_addresses(addresses) {
        Ok(count) => count,
        Err(status) => return status.code(),
    };
    let cluster = u128::from_le_bytes(ptr::read_unaligned(cluster_id as *const [u8; 16]));

    match EchoEngine::start(completion_ctx, completion_fn) {
        Ok(engine) => {
            (*client_out).opaque = [Box::into_raw(Box::new(engine)) as usize, 0, 0, 0];
            debug!(cluster = %cluster, replicas = replicas, "Echo engine started");
            InitStatus::Success.code()
        }
        Err(status) => status.code(),
    }
}

unsafe extern "C" fn echo_submit(client: *mut RawClient, packet: *mut RawPacket) -> u32 {
    if client.is_null() || packet.is_null() {
        return ClientStatus::Invalid.code();
    }
    let engine = (*client).opaque[0] as *const EchoEngine;
    if engine.is_null() {
        return ClientStatus::Invalid.code();
    }
    (*engine).submit(packet).code()
}

unsafe extern "C" fn echo_deinit(client: *mut RawClient) {
    if client.is_null() {
        return;
    }
    let engine = (*client).opaque[0] as *mut EchoEngine;
    if engine.is_null() {
        return;
    }
    (*client).opaque[0] = 0;
    let engine = Box::from_raw(engine);
    engine.shutdown();
}
