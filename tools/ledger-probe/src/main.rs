//! ledger-probe: exercise the ledger bridge from many threads at once.
//!
//! Blocking workers run on plain threads while async workers run on a tokio
//! runtime, all sharing one client. Every reply is checked against the
//! batch that produced it.
//!
//! ## Usage
//!
//! ```bash
//! # Echo engine, 8 blocking threads and 8 async tasks
//! ledger-probe --threads 8 --batches 100 --batch-size 64
//!
//! # Against a running cluster (build with --features native)
//! ledger-probe --mode native --cluster-id 0 --addresses 3000
//! ```

mod workload;

use anyhow::{Context, Result};
use clap::Parser;
use ledger_bridge::domain::config::{parse_cluster_id, split_addresses};
use ledger_bridge::{Client, ClientConfig, EngineMode, StatsSnapshot};
use ledger_telemetry::{init_logging, log_event, TelemetryConfig};
use ledger_types::IdGenerator;
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use tracing::{error, info};
use workload::{Tally, TallySnapshot, Workload};

/// Ledger bridge load and correctness probe
#[derive(Parser, Debug)]
#[command(name = "ledger-probe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cluster id, decimal or 0x-prefixed hex
    #[arg(long, default_value = "0")]
    cluster_id: String,

    /// Comma-separated replica addresses
    #[arg(long, default_value = "3000")]
    addresses: String,

    /// Engine backing the session (echo, native)
    #[arg(long, default_value = "echo")]
    mode: EngineMode,

    /// Blocking worker threads; as many async tasks run alongside
    #[arg(long, default_value = "4")]
    threads: usize,

    /// Batches per worker
    #[arg(long, default_value = "50")]
    batches: usize,

    /// Accounts per batch
    #[arg(long, default_value = "32")]
    batch_size: usize,

    /// Ledger the generated accounts belong to
    #[arg(long, default_value = "1")]
    ledger: u32,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Log level override
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Serialize)]
struct Summary {
    engine: &'static str,
    blocking: TallySnapshot,
    asynchronous: TallySnapshot,
    requests: StatsSnapshot,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::for_service("ledger-probe");
    if let Some(level) = &args.log_level {
        telemetry = telemetry.with_level(level);
    }
    let _logging = init_logging(&telemetry)?;

    let config = ClientConfig::new(
        parse_cluster_id(&args.cluster_id)?,
        split_addresses(&args.addresses),
        args.mode,
    );
    config.validate()?;
    let client = Arc::new(Client::new(config).context("failed to open session")?);
    let workload = Workload {
        mode: args.mode,
        batch_size: args.batch_size,
        ledger: args.ledger,
    };
    let ids = Arc::new(IdGenerator::time_seeded());

    log_event!(
        info,
        "probe",
        "Probe starting",
        engine = client.handle().engine_name(),
        threads = args.threads,
        batches = args.batches,
        batch_size = args.batch_size
    );

    let blocking = Arc::new(Tally::default());
    let asynchronous = Arc::new(Tally::default());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    let async_tasks: Vec<_> = (0..args.threads)
        .map(|_| {
            let client = Arc::clone(&client);
            let ids = Arc::clone(&ids);
            let tally = Arc::clone(&asynchronous);
            let batches = args.batches;
            runtime.spawn(async move {
                for _ in 0..batches {
                    workload.run_async(&client, &ids, &tally).await?;
                }
                Ok::<_, anyhow::Error>(())
            })
        })
        .collect();

    let blocking_result = thread::scope(|scope| {
        let workers: Vec<_> = (0..args.threads)
            .map(|index| {
                let client = &client;
                let ids = &ids;
                let tally = &blocking;
                thread::Builder::new()
                    .name(format!("probe-{index}"))
                    .spawn_scoped(scope, move || {
                        for _ in 0..args.batches {
                            workload.run_blocking(client, ids, tally)?;
                        }
                        Ok::<_, anyhow::Error>(())
                    })
            })
            .collect::<Result<_, _>>()
            .context("failed to spawn worker")?;

        workers.into_iter().try_for_each(|worker| {
            worker
                .join()
                .map_err(|_| anyhow::anyhow!("worker thread panicked"))?
        })
    });

    let async_result = runtime.block_on(async {
        for outcome in futures::future::join_all(async_tasks).await {
            outcome.context("async worker panicked")??;
        }
        Ok::<_, anyhow::Error>(())
    });

    let summary = Summary {
        engine: client.handle().engine_name(),
        blocking: blocking.snapshot(),
        asynchronous: asynchronous.snapshot(),
        requests: client.stats(),
    };
    client.shutdown();

    if let Err(e) = blocking_result.and(async_result) {
        error!(error = %e, "Probe failed");
        return Err(e);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            engine = summary.engine,
            blocking_batches = summary.blocking.batches,
            async_batches = summary.asynchronous.batches,
            completed = summary.requests.completed,
            failed = summary.requests.failed,
            "Probe finished"
        );
        println!(
            "{} engine: {} blocking + {} async batches verified ({} records), {} requests completed, mean batch {}us / {}us",
            summary.engine,
            summary.blocking.batches,
            summary.asynchronous.batches,
            summary.blocking.records + summary.asynchronous.records,
            summary.requests.completed,
            summary.blocking.mean_batch_micros,
            summary.asynchronous.mean_batch_micros,
        );
    }
    Ok(())
}
