//! Scripted engine behaviours.

use super::{Core, Packet, Script};
use dashmap::DashMap;
use ledger_bridge::domain::PacketStatus;
use ledger_bridge::ffi::RawPacket;
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use std::ffi::c_void;
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

fn join_all(handles: &Mutex<Vec<JoinHandle<()>>>) {
    for handle in mem::take(&mut *handles.lock()) {
        let _ = handle.join();
    }
}

// =============================================================================
// DELAYED
// =============================================================================

/// Completes every packet from its own thread after [`Delayed::DELAY`].
pub struct Delayed {
    core: Core,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl Delayed {
    pub const DELAY: Duration = Duration::from_millis(40);
}

impl Script for Delayed {
    const NAME: &'static str = "delayed";

    fn start(core: Core, _cluster_id: u128) -> Self {
        Self {
            core,
            threads: Mutex::new(Vec::new()),
        }
    }

    fn accept(&self, packet: Packet) -> bool {
        let core = self.core;
        let handle = thread::spawn(move || {
            thread::sleep(Self::DELAY);
            // SAFETY: completed exactly once, here.
            unsafe { core.echo(packet, PacketStatus::Ok) };
        });
        self.threads.lock().push(handle);
        true
    }

    fn stop(&self) {
        join_all(&self.threads);
    }
}

// =============================================================================
// SCRAMBLING
// =============================================================================

/// Buffers packets and completes each burst in shuffled order from a single
/// flusher thread.
pub struct Scrambling {
    buffer: Arc<Mutex<Vec<Packet>>>,
    stopping: Arc<AtomicBool>,
    flusher: Mutex<Option<JoinHandle<()>>>,
}

impl Scrambling {
    const FLUSH_INTERVAL: Duration = Duration::from_micros(300);
}

impl Script for Scrambling {
    const NAME: &'static str = "scrambling";

    fn start(core: Core, _cluster_id: u128) -> Self {
        let buffer: Arc<Mutex<Vec<Packet>>> = Arc::new(Mutex::new(Vec::new()));
        let stopping = Arc::new(AtomicBool::new(false));

        let flusher = {
            let buffer = Arc::clone(&buffer);
            let stopping = Arc::clone(&stopping);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                loop {
                    let stop = stopping.load(Ordering::Acquire);
                    let mut burst = mem::take(&mut *buffer.lock());
                    burst.shuffle(&mut rng);
                    for packet in burst {
                        // SAFETY: each buffered packet is completed once.
                        unsafe { core.echo(packet, PacketStatus::Ok) };
                    }
                    if stop {
                        break;
                    }
                    thread::sleep(Self::FLUSH_INTERVAL);
                }
            })
        };

        Self {
            buffer,
            stopping,
            flusher: Mutex::new(Some(flusher)),
        }
    }

    fn accept(&self, packet: Packet) -> bool {
        self.buffer.lock().push(packet);
        true
    }

    fn stop(&self) {
        self.stopping.store(true, Ordering::Release);
        if let Some(handle) = self.flusher.lock().take() {
            let _ = handle.join();
        }
    }
}

// =============================================================================
// COUNTING
// =============================================================================

/// Entry point call counts for one session, keyed by cluster id.
#[derive(Debug, Default)]
pub struct Counters {
    pub inits: AtomicUsize,
    pub submits: AtomicUsize,
    pub deinits: AtomicUsize,
}

impl Counters {
    pub fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn deinits(&self) -> usize {
        self.deinits.load(Ordering::SeqCst)
    }
}

static COUNTERS: OnceLock<DashMap<u128, Arc<Counters>>> = OnceLock::new();

/// Completes every packet inline, before `submit` returns, and counts calls.
pub struct Counting {
    core: Core,
    counters: Arc<Counters>,
}

impl Counting {
    /// Counters of the session opened with `cluster_id`.
    pub fn counters(cluster_id: u128) -> Arc<Counters> {
        let registry = COUNTERS.get_or_init(DashMap::new);
        Arc::clone(&registry.entry(cluster_id).or_default())
    }
}

impl Script for Counting {
    const NAME: &'static str = "counting";

    fn start(core: Core, cluster_id: u128) -> Self {
        let counters = Self::counters(cluster_id);
        counters.inits.fetch_add(1, Ordering::SeqCst);
        Self { core, counters }
    }

    fn accept(&self, packet: Packet) -> bool {
        self.counters.submits.fetch_add(1, Ordering::SeqCst);
        // SAFETY: completed exactly once, here.
        unsafe { self.core.echo(packet, PacketStatus::Ok) };
        true
    }

    fn stop(&self) {
        self.counters.deinits.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// HOLDING
// =============================================================================

/// Accepts packets and never completes them, not even in `deinit`.
pub struct Holding {
    held: Mutex<Vec<Packet>>,
}

impl Script for Holding {
    const NAME: &'static str = "holding";

    fn start(_core: Core, _cluster_id: u128) -> Self {
        Self {
            held: Mutex::new(Vec::new()),
        }
    }

    fn accept(&self, packet: Packet) -> bool {
        self.held.lock().push(packet);
        true
    }

    fn stop(&self) {
        self.held.lock().clear();
    }
}

// =============================================================================
// FAULTY
// =============================================================================

/// Contract breach injected by [`Faulty`], selected by cluster id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Result one byte short of the echoed body.
    TruncatedResult,
    /// Completion carrying a tag that was never submitted.
    UnknownTag,
    /// Same tag completed twice.
    DoubleCompletion,
}

impl Fault {
    pub const fn cluster_id(self) -> u128 {
        match self {
            Fault::TruncatedResult => 0xFA01,
            Fault::UnknownTag => 0xFA02,
            Fault::DoubleCompletion => 0xFA03,
        }
    }

    fn from_cluster_id(cluster_id: u128) -> Option<Self> {
        [Fault::TruncatedResult, Fault::UnknownTag, Fault::DoubleCompletion]
            .into_iter()
            .find(|fault| fault.cluster_id() == cluster_id)
    }
}

/// Breaks the engine contract on the first packet it receives.
pub struct Faulty {
    core: Core,
    fault: Option<Fault>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl Faulty {
    /// A blank packet carrying `packet`'s tag.
    ///
    /// # Safety
    ///
    /// `packet` must not have been completed yet.
    unsafe fn forge(packet: &Packet, tag_offset: usize) -> RawPacket {
        let submitted = &*packet.0;
        let mut forged = RawPacket::new(
            (submitted.user_data as usize).wrapping_add(tag_offset) as *mut c_void,
            submitted.operation,
            std::ptr::null_mut(),
            0,
        );
        forged.status = PacketStatus::Ok.code();
        forged
    }

    /// # Safety
    ///
    /// `packet` must be submitted and not yet completed.
    unsafe fn misbehave(core: Core, fault: Option<Fault>, packet: Packet) {
        match fault {
            None => core.echo(packet, PacketStatus::Ok),
            Some(Fault::TruncatedResult) => {
                let (data, len) = packet.body();
                core.complete(packet, PacketStatus::Ok, data, len.saturating_sub(1));
            }
            Some(Fault::UnknownTag) => {
                let mut forged = Self::forge(&packet, 1 << 40);
                core.complete_forged(&mut forged);
            }
            Some(Fault::DoubleCompletion) => {
                let mut forged = Self::forge(&packet, 0);
                core.echo(packet, PacketStatus::Ok);
                core.complete_forged(&mut forged);
            }
        }
    }
}

impl Script for Faulty {
    const NAME: &'static str = "faulty";

    fn start(core: Core, cluster_id: u128) -> Self {
        Self {
            core,
            fault: Fault::from_cluster_id(cluster_id),
            threads: Mutex::new(Vec::new()),
        }
    }

    fn accept(&self, packet: Packet) -> bool {
        let (core, fault) = (self.core, self.fault);
        let handle = thread::spawn(move || {
            // SAFETY: the packet was just accepted and is handled once.
            unsafe { Self::misbehave(core, fault, packet) };
        });
        self.threads.lock().push(handle);
        true
    }

    fn stop(&self) {
        join_all(&self.threads);
    }
}
