//! # Typed Client
//!
//! One method per engine operation, each in a blocking and an `_async`
//! form. Batches are checked against `max_batch_size` before anything is
//! registered.

use crate::domain::config::ClientConfig;
use crate::domain::decoder::Record;
use crate::domain::error::{InitializationError, RequestError, SubmissionError};
use crate::domain::pending::StatsSnapshot;
use crate::ffi::abi::EngineApi;
use crate::request::{AsyncRequest, BlockingRequest};
use crate::session::ClientHandle;
use ledger_types::{
    Account, AccountBalance, AccountFilter, CreateAccountsResult, CreateTransfersResult,
    Operation, Transfer,
};

/// Ledger client over one engine session.
#[derive(Debug)]
pub struct Client {
    handle: ClientHandle,
}

impl Client {
    /// Open a session with the engine selected by `config.mode`.
    pub fn new(config: ClientConfig) -> Result<Self, InitializationError> {
        Ok(Self {
            handle: ClientHandle::initialize(config)?,
        })
    }

    /// Open a session with a caller-supplied engine.
    pub fn with_engine(engine: EngineApi, config: ClientConfig) -> Result<Self, InitializationError> {
        Ok(Self {
            handle: ClientHandle::with_engine(engine, config)?,
        })
    }

    pub fn handle(&self) -> &ClientHandle {
        &self.handle
    }

    /// Create accounts. The reply lists only the events that failed.
    pub fn create_accounts(
        &self,
        accounts: &[Account],
    ) -> Result<Vec<CreateAccountsResult>, RequestError> {
        self.request(Operation::CreateAccounts, accounts)
    }

    pub async fn create_accounts_async(
        &self,
        accounts: &[Account],
    ) -> Result<Vec<CreateAccountsResult>, RequestError> {
        self.request_async(Operation::CreateAccounts, accounts).await
    }

    /// Create transfers. The reply lists only the events that failed.
    pub fn create_transfers(
        &self,
        transfers: &[Transfer],
    ) -> Result<Vec<CreateTransfersResult>, RequestError> {
        self.request(Operation::CreateTransfers, transfers)
    }

    pub async fn create_transfers_async(
        &self,
        transfers: &[Transfer],
    ) -> Result<Vec<CreateTransfersResult>, RequestError> {
        self.request_async(Operation::CreateTransfers, transfers).await
    }

    /// Look up accounts by id. Missing ids are absent from the reply.
    pub fn lookup_accounts(&self, ids: &[u128]) -> Result<Vec<Account>, RequestError> {
        self.request(Operation::LookupAccounts, ids)
    }

    pub async fn lookup_accounts_async(&self, ids: &[u128]) -> Result<Vec<Account>, RequestError> {
        self.request_async(Operation::LookupAccounts, ids).await
    }

    /// Look up transfers by id. Missing ids are absent from the reply.
    pub fn lookup_transfers(&self, ids: &[u128]) -> Result<Vec<Transfer>, RequestError> {
        self.request(Operation::LookupTransfers, ids)
    }

    pub async fn lookup_transfers_async(
        &self,
        ids: &[u128],
    ) -> Result<Vec<Transfer>, RequestError> {
        self.request_async(Operation::LookupTransfers, ids).await
    }

    /// Transfers touching one account, as selected by `filter`.
    pub fn get_account_transfers(
        &self,
        filter: AccountFilter,
    ) -> Result<Vec<Transfer>, RequestError> {
        self.request(Operation::GetAccountTransfers, &[filter])
    }

    pub async fn get_account_transfers_async(
        &self,
        filter: AccountFilter,
    ) -> Result<Vec<Transfer>, RequestError> {
        self.request_async(Operation::GetAccountTransfers, &[filter])
            .await
    }

    /// Balance history of one account (requires `AccountFlags::HISTORY`).
    pub fn get_account_balances(
        &self,
        filter: AccountFilter,
    ) -> Result<Vec<AccountBalance>, RequestError> {
        self.request(Operation::GetAccountBalances, &[filter])
    }

    pub async fn get_account_balances_async(
        &self,
        filter: AccountFilter,
    ) -> Result<Vec<AccountBalance>, RequestError> {
        self.request_async(Operation::GetAccountBalances, &[filter])
            .await
    }

    /// Send `events` and decode the reply as the same record type.
    ///
    /// Meaningful against the echo engine, which returns every body as is.
    pub fn echo<R: Record>(&self, operation: Operation, events: &[R]) -> Result<Vec<R>, RequestError> {
        self.request(operation, events)
    }

    pub async fn echo_async<R: Record>(
        &self,
        operation: Operation,
        events: &[R],
    ) -> Result<Vec<R>, RequestError> {
        self.request_async(operation, events).await
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.handle.stats()
    }

    /// Release the session. Idempotent; also runs on drop.
    pub fn shutdown(&self) {
        self.handle.shutdown();
    }

    fn check_batch(&self, len: usize) -> Result<(), SubmissionError> {
        let max = self.handle.config().max_batch_size as usize;
        if len > max {
            return Err(SubmissionError::BatchTooLarge { len, max });
        }
        Ok(())
    }

    fn request<E: Record, R: Record>(
        &self,
        operation: Operation,
        events: &[E],
    ) -> Result<Vec<R>, RequestError> {
        self.check_batch(events.len())?;
        let reply = BlockingRequest::<R>::submit(&self.handle, operation, events)?.wait()?;
        Ok(reply.records)
    }

    async fn request_async<E: Record, R: Record>(
        &self,
        operation: Operation,
        events: &[E],
    ) -> Result<Vec<R>, RequestError> {
        self.check_batch(events.len())?;
        let reply = AsyncRequest::<R>::submit(&self.handle, operation, events)?.await?;
        Ok(reply.records)
    }
}
