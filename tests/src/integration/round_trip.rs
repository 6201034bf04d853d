//! # Round Trip Scenarios
//!
//! A request goes out, its completion comes back, and the caller sees
//! exactly its own records, whichever way it waits.

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, Counting, Delayed};
    use bytemuck::{Pod, Zeroable};
    use ledger_bridge::{
        BlockingRequest, Client, ClientConfig, EngineMode, PacketStatus, RequestError,
    };
    use ledger_types::{Account, AccountFilter, Operation, Transfer, MESSAGE_BODY_SIZE_MAX};
    use std::time::Instant;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
    #[repr(C)]
    struct Reading {
        sensor: u32,
        sequence: u32,
        value: u64,
    }

    fn echo_client() -> Client {
        Client::new(ClientConfig::new(
            1,
            vec!["127.0.0.1:3000".into()],
            EngineMode::Echo,
        ))
        .unwrap()
    }

    // =========================================================================
    // ECHO ENGINE
    // =========================================================================

    #[test]
    fn test_three_records_come_back_in_order() {
        let client = echo_client();
        let sent = [
            Reading { sensor: 1, sequence: 0, value: 100 },
            Reading { sensor: 2, sequence: 1, value: 200 },
            Reading { sensor: 3, sequence: 2, value: 300 },
        ];

        let reply = client.echo(Operation::LookupTransfers, &sent).unwrap();
        assert_eq!(reply, sent.to_vec());
        assert_eq!(client.stats().completed, 1);
        assert_eq!(client.stats().pending, 0);
    }

    #[test]
    fn test_reply_carries_engine_timestamp() {
        let client = echo_client();
        let request =
            BlockingRequest::<u128>::submit(client.handle(), Operation::LookupAccounts, &[1u128, 2])
                .unwrap();
        let reply = request.wait().unwrap();
        assert_eq!(reply.records, vec![1, 2]);
        assert!(reply.timestamp > 0);
    }

    #[test]
    fn test_full_size_records() {
        let client = echo_client();
        let accounts: Vec<Account> = (1..=8u128).map(|id| Account::new(id, 700, 10)).collect();
        let transfers: Vec<Transfer> = (1..=8u128)
            .map(|id| Transfer::new(id, 1, 2, id * 100, 700, 10))
            .collect();

        assert_eq!(client.echo(Operation::CreateAccounts, &accounts).unwrap(), accounts);
        assert_eq!(client.echo(Operation::CreateTransfers, &transfers).unwrap(), transfers);
    }

    #[test]
    fn test_filter_query_round_trip() {
        // The 128-byte filter comes back as one 128-byte transfer record.
        let client = echo_client();
        let filter = AccountFilter::for_account(42, 10);
        let transfers = client.get_account_transfers(filter).unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].id, 42);
    }

    #[test]
    fn test_too_much_data() {
        let client = echo_client();
        let oversized = vec![0u8; MESSAGE_BODY_SIZE_MAX + 1];
        let request =
            BlockingRequest::<u8>::submit(client.handle(), Operation::CreateTransfers, &oversized)
                .unwrap();
        assert_eq!(
            request.wait().unwrap_err(),
            RequestError::PacketFailed(PacketStatus::TooMuchData)
        );
        assert_eq!(client.stats().failed, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sync_and_async_agree() {
        let client = echo_client();
        let ids: Vec<u128> = (100..164).collect();

        let blocking = tokio::task::block_in_place(|| client.echo(Operation::LookupAccounts, &ids))
            .unwrap();
        let asynchronous = client
            .echo_async(Operation::LookupAccounts, &ids)
            .await
            .unwrap();

        assert_eq!(blocking, ids);
        assert_eq!(asynchronous, blocking);
    }

    // =========================================================================
    // FIXTURE ENGINES
    // =========================================================================

    #[test]
    fn test_blocking_wait_spans_engine_delay() {
        let client =
            Client::with_engine(fixtures::engine::<Delayed>(), fixtures::config(10)).unwrap();

        let started = Instant::now();
        let reply = client.echo(Operation::LookupAccounts, &[5u128, 6, 7]).unwrap();
        assert!(started.elapsed() >= Delayed::DELAY);
        assert_eq!(reply, vec![5, 6, 7]);
    }

    #[tokio::test]
    async fn test_async_wait_spans_engine_delay() {
        let client =
            Client::with_engine(fixtures::engine::<Delayed>(), fixtures::config(11)).unwrap();

        let started = Instant::now();
        let reply = client
            .echo_async(Operation::LookupTransfers, &[9u128])
            .await
            .unwrap();
        assert!(started.elapsed() >= Delayed::DELAY);
        assert_eq!(reply, vec![9]);
    }

    #[test]
    fn test_completion_before_submit_returns() {
        let cluster_id = 12;
        let client = Client::with_engine(
            fixtures::engine::<Counting>(),
            fixtures::config(cluster_id),
        )
        .unwrap();

        let reply = client.echo(Operation::LookupAccounts, &[1u128, 2, 3]).unwrap();
        assert_eq!(reply, vec![1, 2, 3]);
        assert_eq!(Counting::counters(cluster_id).submits(), 1);
    }
}
