//! # Concurrency Scenarios
//!
//! Many threads and tasks share one client while the engine completes
//! packets out of order on its own threads. Every caller must receive the
//! reply to its own packet.

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, Scrambling};
    use futures::future::join_all;
    use ledger_bridge::{Client, ClientConfig, EngineMode};
    use ledger_types::Operation;
    use rand::Rng;
    use std::sync::Arc;
    use std::thread;

    const THREADS: usize = 8;
    const REQUESTS_PER_THREAD: usize = 64;

    /// Body unique to (worker, request): the worker id in the high half.
    fn batch(worker: usize, request: usize) -> Vec<u128> {
        let len = 1 + (worker + request) % 5;
        (0..len)
            .map(|i| ((worker as u128) << 64) | ((request as u128) << 8) | i as u128)
            .collect()
    }

    fn hammer(client: &Client) {
        thread::scope(|scope| {
            for worker in 0..THREADS {
                scope.spawn(move || {
                    for request in 0..REQUESTS_PER_THREAD {
                        let sent = batch(worker, request);
                        let reply = client.echo(Operation::LookupAccounts, &sent).unwrap();
                        assert_eq!(reply, sent, "worker {worker} request {request} crossed over");
                    }
                });
            }
        });
    }

    #[test]
    fn test_no_cross_assignment_echo_engine() {
        let client = Client::new(ClientConfig::new(
            2,
            vec!["3000".into()],
            EngineMode::Echo,
        ))
        .unwrap();

        hammer(&client);

        let stats = client.stats();
        assert_eq!(stats.completed, (THREADS * REQUESTS_PER_THREAD) as u64);
        assert_eq!(stats.pending, 0);
    }

    #[test]
    fn test_no_cross_assignment_shuffled_bursts() {
        let client =
            Client::with_engine(fixtures::engine::<Scrambling>(), fixtures::config(20)).unwrap();

        hammer(&client);
        assert_eq!(client.stats().completed, (THREADS * REQUESTS_PER_THREAD) as u64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_async_requests() {
        let client = Arc::new(
            Client::with_engine(fixtures::engine::<Scrambling>(), fixtures::config(21)).unwrap(),
        );

        let tasks = (0..THREADS).map(|worker| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                for request in 0..REQUESTS_PER_THREAD {
                    let sent = batch(worker, request);
                    let reply = client
                        .echo_async(Operation::LookupTransfers, &sent)
                        .await
                        .unwrap();
                    assert_eq!(reply, sent);
                }
            })
        });

        for outcome in join_all(tasks).await {
            outcome.unwrap();
        }
        assert_eq!(client.stats().pending, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_mixed_blocking_and_async_callers() {
        let client = Arc::new(Client::new(ClientConfig::new(
            3,
            vec!["3000".into()],
            EngineMode::Echo,
        ))
        .unwrap());

        let blocking = {
            let client = Arc::clone(&client);
            thread::spawn(move || {
                for request in 0..REQUESTS_PER_THREAD {
                    let sent = batch(0, request);
                    assert_eq!(client.echo(Operation::LookupAccounts, &sent).unwrap(), sent);
                }
            })
        };

        let tasks = (1..THREADS).map(|worker| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                for request in 0..REQUESTS_PER_THREAD {
                    let sent = batch(worker, request);
                    let reply = client
                        .echo_async(Operation::LookupAccounts, &sent)
                        .await
                        .unwrap();
                    assert_eq!(reply, sent);
                }
            })
        });
        for outcome in join_all(tasks).await {
            outcome.unwrap();
        }
        tokio::task::spawn_blocking(move || blocking.join())
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_random_sizes_across_record_types() {
        let client = Client::new(ClientConfig::new(
            4,
            vec!["3000".into()],
            EngineMode::Echo,
        ))
        .unwrap();

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let mut rng = rand::thread_rng();
                    for _ in 0..32 {
                        let words: Vec<u64> = (0..rng.gen_range(0..200)).map(|_| rng.gen()).collect();
                        assert_eq!(client.echo(Operation::CreateTransfers, &words).unwrap(), words);

                        let ids: Vec<u128> = (0..rng.gen_range(0..50)).map(|_| rng.gen()).collect();
                        assert_eq!(client.echo(Operation::LookupTransfers, &ids).unwrap(), ids);
                    }
                });
            }
        });
    }
}
