//! Batch generation and reply verification.

use anyhow::{bail, ensure, Context, Result};
use ledger_bridge::{Client, EngineMode};
use ledger_types::{Account, IdGenerator, Operation};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::debug;

/// One probe run's shape.
#[derive(Debug, Clone, Copy)]
pub struct Workload {
    pub mode: EngineMode,
    pub batch_size: usize,
    pub ledger: u32,
}

/// Counters shared by every worker.
#[derive(Debug, Default)]
pub struct Tally {
    batches: AtomicU64,
    records: AtomicU64,
    micros: AtomicU64,
}

/// Printed at the end of a run.
#[derive(Debug, Serialize)]
pub struct TallySnapshot {
    pub batches: u64,
    pub records: u64,
    pub mean_batch_micros: u64,
}

impl Tally {
    fn record(&self, records: usize, started: Instant) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.records.fetch_add(records as u64, Ordering::Relaxed);
        self.micros
            .fetch_add(started.elapsed().as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TallySnapshot {
        let batches = self.batches.load(Ordering::Relaxed);
        TallySnapshot {
            batches,
            records: self.records.load(Ordering::Relaxed),
            mean_batch_micros: self.micros.load(Ordering::Relaxed) / batches.max(1),
        }
    }
}

impl Workload {
    /// Fresh accounts with ids unique across all workers.
    pub fn accounts(&self, ids: &IdGenerator) -> Vec<Account> {
        (0..self.batch_size)
            .map(|_| {
                let id = ids.next_id();
                Account::new(id, self.ledger, 1).with_user_data_128(id)
            })
            .collect()
    }

    /// One batch on the calling thread.
    pub fn run_blocking(&self, client: &Client, ids: &IdGenerator, tally: &Tally) -> Result<()> {
        let accounts = self.accounts(ids);
        let started = Instant::now();
        match self.mode {
            EngineMode::Echo => {
                let reply = client
                    .echo(Operation::CreateAccounts, &accounts)
                    .context("echo batch failed")?;
                verify_echo(&accounts, &reply)?;
            }
            EngineMode::Native => {
                let failed = client
                    .create_accounts(&accounts)
                    .context("create_accounts failed")?;
                ensure!(failed.is_empty(), "{} accounts rejected", failed.len());
                let ids: Vec<u128> = accounts.iter().map(|a| a.id).collect();
                let found = client
                    .lookup_accounts(&ids)
                    .context("lookup_accounts failed")?;
                verify_lookup(&accounts, &found)?;
            }
        }
        tally.record(accounts.len(), started);
        Ok(())
    }

    /// One batch through the async path.
    pub async fn run_async(&self, client: &Client, ids: &IdGenerator, tally: &Tally) -> Result<()> {
        let accounts = self.accounts(ids);
        let started = Instant::now();
        match self.mode {
            EngineMode::Echo => {
                let reply = client
                    .echo_async(Operation::CreateAccounts, &accounts)
                    .await
                    .context("async echo batch failed")?;
                verify_echo(&accounts, &reply)?;
            }
            EngineMode::Native => {
                let failed = client
                    .create_accounts_async(&accounts)
                    .await
                    .context("async create_accounts failed")?;
                ensure!(failed.is_empty(), "{} accounts rejected", failed.len());
                let ids: Vec<u128> = accounts.iter().map(|a| a.id).collect();
                let found = client
                    .lookup_accounts_async(&ids)
                    .await
                    .context("async lookup_accounts failed")?;
                verify_lookup(&accounts, &found)?;
            }
        }
        tally.record(accounts.len(), started);
        Ok(())
    }
}

fn verify_echo(sent: &[Account], reply: &[Account]) -> Result<()> {
    ensure!(
        sent.len() == reply.len(),
        "sent {} records, got {} back",
        sent.len(),
        reply.len()
    );
    if let Some((index, (a, b))) = sent.iter().zip(reply).enumerate().find(|(_, (a, b))| a != b) {
        bail!(
            "record {index} crossed over: sent id {:#x}, got id {:#x}",
            a.id,
            b.id
        );
    }
    debug!(records = sent.len(), "Echo batch verified");
    Ok(())
}

fn verify_lookup(sent: &[Account], found: &[Account]) -> Result<()> {
    ensure!(
        sent.len() == found.len(),
        "created {} accounts, found {}",
        sent.len(),
        found.len()
    );
    for (a, b) in sent.iter().zip(found) {
        ensure!(
            a.id == b.id && b.user_data_128 == a.id,
            "account {:#x} came back as {:#x}",
            a.id,
            b.id
        );
    }
    Ok(())
}
