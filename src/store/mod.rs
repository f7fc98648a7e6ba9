//! Persistent store port and its adapters.
//!
//! All shared mutable state lives behind the [`Store`] trait; core services
//! receive it by explicit argument, never through ambient lookup. Two
//! adapters are provided: [`PgStore`] (PostgreSQL, production) and
//! [`MemStore`] (in-memory, tests and demos).

pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query;

pub use error::StoreError;
pub use memory::MemStore;
pub use models::{Contract, ContractStatus, Job, Profile, ProfileType};
pub use postgres::PgStore;
pub use query::{ContractFilter, OwnerScope, RollupQuery, RollupSide, TimeWindow, UnpaidJobsFilter};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Typed join of a job and the contract it belongs to.
#[derive(Debug, Clone)]
pub struct JobWithContract {
    pub job: Job,
    pub contract: Contract,
}

/// Instruction for the atomic settlement unit.
///
/// The ids and price are the ones the transfer engine read during its
/// precondition phase; the adapter re-validates under its own locks.
#[derive(Debug, Clone, Copy)]
pub struct Settlement {
    pub job_id: i64,
    pub client_id: i64,
    pub contractor_id: i64,
    pub price: Decimal,
    pub paid_at: DateTime<Utc>,
}

/// Verdict of [`Store::settle_job`], decided inside the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Job marked paid, client debited, contractor credited.
    Settled,
    /// The job was already paid when the transaction re-checked it.
    AlreadyPaid,
    /// The client balance no longer covers the price.
    InsufficientFunds,
    /// The job vanished or no longer belongs to the expected client.
    JobMissing,
}

/// One row of a paid-job rollup: a profile and the sum it earned (contractor
/// side) or spent (client side) inside the window.
#[derive(Debug, Clone)]
pub struct PartyRevenue {
    pub profile_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub profession: String,
    pub total: Decimal,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn profile_by_id(&self, profile_id: i64) -> Result<Option<Profile>, StoreError>;

    /// Contract by id, restricted to the given ownership scope.
    async fn contract_by_id(
        &self,
        contract_id: i64,
        scope: &OwnerScope,
    ) -> Result<Option<Contract>, StoreError>;

    async fn contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>, StoreError>;

    async fn unpaid_jobs(&self, filter: &UnpaidJobsFilter) -> Result<Vec<Job>, StoreError>;

    /// An unpaid job joined with its contract, visible only when the given
    /// client owns the contract.
    async fn unpaid_job_for_client(
        &self,
        job_id: i64,
        client_id: i64,
    ) -> Result<Option<JobWithContract>, StoreError>;

    /// Sum of `price` over a client's unpaid jobs, zero when there are none.
    async fn unpaid_total(&self, client_id: i64) -> Result<Decimal, StoreError>;

    /// Execute a settlement as one atomic unit. The unpaid flag and the
    /// client balance are re-checked under the adapter's locks; the unpaid
    /// re-check is the serialization point against double payment.
    async fn settle_job(&self, settlement: &Settlement) -> Result<SettleOutcome, StoreError>;

    /// Atomically increment a profile balance.
    async fn credit_balance(&self, profile_id: i64, amount: Decimal) -> Result<(), StoreError>;

    async fn paid_job_rollup(&self, query: &RollupQuery) -> Result<Vec<PartyRevenue>, StoreError>;

    async fn health(&self) -> Result<(), StoreError>;
}
