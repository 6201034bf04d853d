//! # Shutdown Scenarios
//!
//! Closing a session: idempotence, rejection of later submissions without
//! touching the engine, and the fate of requests still in flight.

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, Counting, Delayed, Holding};
    use ledger_bridge::{
        AsyncRequest, BlockingRequest, Client, ClientConfig, EngineMode, PacketStatus, RequestError,
        SubmissionError,
    };
    use ledger_types::Operation;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_submit_after_shutdown_never_reaches_engine() {
        let cluster_id = 30;
        let client = Client::with_engine(
            fixtures::engine::<Counting>(),
            fixtures::config(cluster_id),
        )
        .unwrap();
        let counters = Counting::counters(cluster_id);

        client.echo(Operation::LookupAccounts, &[1u128]).unwrap();
        client.shutdown();
        assert_eq!(counters.submits(), 1);

        for _ in 0..3 {
            assert_eq!(
                client.lookup_accounts(&[1]).unwrap_err(),
                RequestError::Submission(SubmissionError::ClientClosed)
            );
        }
        assert_eq!(counters.submits(), 1);
        assert_eq!(client.stats().registered, 1);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let cluster_id = 31;
        let client = Client::with_engine(
            fixtures::engine::<Counting>(),
            fixtures::config(cluster_id),
        )
        .unwrap();

        client.shutdown();
        client.shutdown();
        assert!(client.handle().is_closed());
        drop(client);

        assert_eq!(Counting::counters(cluster_id).deinits(), 1);
    }

    #[test]
    fn test_drop_releases_session() {
        let cluster_id = 32;
        drop(
            Client::with_engine(fixtures::engine::<Counting>(), fixtures::config(cluster_id))
                .unwrap(),
        );
        assert_eq!(Counting::counters(cluster_id).deinits(), 1);
    }

    #[test]
    fn test_in_flight_requests_complete_before_shutdown_returns() {
        let client =
            Client::with_engine(fixtures::engine::<Delayed>(), fixtures::config(33)).unwrap();

        let requests: Vec<_> = (0..4u128)
            .map(|i| {
                BlockingRequest::<u128>::submit(client.handle(), Operation::LookupAccounts, &[i])
                    .unwrap()
            })
            .collect();
        client.shutdown();

        for (i, request) in requests.into_iter().enumerate() {
            assert_eq!(request.wait().unwrap().records, vec![i as u128]);
        }
        assert_eq!(client.stats().completed, 4);
        assert_eq!(client.stats().drained, 0);
    }

    #[test]
    fn test_uncompleted_requests_fail_with_client_closed() {
        let client =
            Client::with_engine(fixtures::engine::<Holding>(), fixtures::config(34)).unwrap();

        thread::scope(|scope| {
            let waiter = scope.spawn(|| client.lookup_transfers(&[7, 8]));

            while client.handle().pending_count() == 0 {
                thread::sleep(Duration::from_millis(1));
            }
            client.shutdown();

            assert_eq!(waiter.join().unwrap().unwrap_err(), RequestError::ClientClosed);
        });

        let stats = client.stats();
        assert_eq!(stats.drained, 1);
        assert_eq!(stats.pending, 0);
    }

    #[tokio::test]
    async fn test_pending_future_resolves_on_shutdown() {
        let client =
            Client::with_engine(fixtures::engine::<Holding>(), fixtures::config(35)).unwrap();

        let request =
            AsyncRequest::<u128>::submit(client.handle(), Operation::LookupAccounts, &[1u128])
                .unwrap();
        client.shutdown();

        assert_eq!(request.await.unwrap_err(), RequestError::ClientClosed);
    }

    #[test]
    fn test_shutdown_races_with_submitters() {
        let client = Client::new(ClientConfig::new(
            36,
            vec!["3000".into()],
            EngineMode::Echo,
        ))
        .unwrap();

        thread::scope(|scope| {
            for worker in 0..4u128 {
                let client = &client;
                scope.spawn(move || loop {
                    match client.echo(Operation::LookupAccounts, &[worker]) {
                        Ok(reply) => assert_eq!(reply, vec![worker]),
                        Err(RequestError::Submission(SubmissionError::ClientClosed)) => break,
                        // Queued when shutdown began.
                        Err(RequestError::PacketFailed(PacketStatus::ClientShutdown)) => break,
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                });
            }
            thread::sleep(Duration::from_millis(20));
            client.shutdown();
        });

        assert_eq!(client.stats().pending, 0);
    }
}
