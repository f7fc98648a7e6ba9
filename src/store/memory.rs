//! In-memory store adapter.
//!
//! Backs the test suite and the demo configuration. A single
//! `Arc<RwLock<MemState>>` guards all three tables, so the settlement unit
//! is atomic by holding the write lock for its whole duration. `BTreeMap`
//! tables give deterministic iteration order, which the rollup tie-break
//! relies on.

use super::error::StoreError;
use super::models::{Contract, Job, Profile};
use super::query::{ContractFilter, OwnerScope, RollupQuery, RollupSide, UnpaidJobsFilter};
use super::{JobWithContract, PartyRevenue, SettleOutcome, Settlement, Store};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemState {
    profiles: BTreeMap<i64, Profile>,
    contracts: BTreeMap<i64, Contract>,
    jobs: BTreeMap<i64, Job>,
}

#[derive(Default, Clone)]
pub struct MemStore {
    state: Arc<RwLock<MemState>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_profile(&self, profile: Profile) {
        let mut state = self.state.write().await;
        state.profiles.insert(profile.profile_id, profile);
    }

    pub async fn insert_contract(&self, contract: Contract) {
        let mut state = self.state.write().await;
        state.contracts.insert(contract.contract_id, contract);
    }

    pub async fn insert_job(&self, job: Job) {
        let mut state = self.state.write().await;
        state.jobs.insert(job.job_id, job);
    }
}

impl MemState {
    fn contract_of(&self, job: &Job) -> Option<&Contract> {
        self.contracts.get(&job.contract_id)
    }
}

#[async_trait]
impl Store for MemStore {
    async fn profile_by_id(&self, profile_id: i64) -> Result<Option<Profile>, StoreError> {
        let state = self.state.read().await;
        Ok(state.profiles.get(&profile_id).cloned())
    }

    async fn contract_by_id(
        &self,
        contract_id: i64,
        scope: &OwnerScope,
    ) -> Result<Option<Contract>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .contracts
            .get(&contract_id)
            .filter(|c| scope.matches(c))
            .cloned())
    }

    async fn contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .contracts
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn unpaid_jobs(&self, filter: &UnpaidJobsFilter) -> Result<Vec<Job>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .jobs
            .values()
            .filter(|j| !j.is_paid())
            .filter(|j| {
                state
                    .contract_of(j)
                    .map(|c| filter.contract_matches(c))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn unpaid_job_for_client(
        &self,
        job_id: i64,
        client_id: i64,
    ) -> Result<Option<JobWithContract>, StoreError> {
        let state = self.state.read().await;
        let Some(job) = state.jobs.get(&job_id) else {
            return Ok(None);
        };
        if job.is_paid() {
            return Ok(None);
        }
        Ok(state
            .contract_of(job)
            .filter(|c| c.client_id == client_id)
            .map(|c| JobWithContract {
                job: job.clone(),
                contract: c.clone(),
            }))
    }

    async fn unpaid_total(&self, client_id: i64) -> Result<Decimal, StoreError> {
        let state = self.state.read().await;
        let mut total = Decimal::ZERO;
        for job in state.jobs.values().filter(|j| !j.is_paid()) {
            if let Some(contract) = state.contract_of(job) {
                if contract.client_id == client_id {
                    total += job.price;
                }
            }
        }
        Ok(total)
    }

    async fn settle_job(&self, settlement: &Settlement) -> Result<SettleOutcome, StoreError> {
        // The write lock spans every check and mutation: the unit commits
        // fully or not at all, and concurrent settlements serialize here.
        let mut state = self.state.write().await;

        let Some(job) = state.jobs.get(&settlement.job_id) else {
            return Ok(SettleOutcome::JobMissing);
        };
        if job.is_paid() {
            return Ok(SettleOutcome::AlreadyPaid);
        }
        let owned = state
            .contract_of(job)
            .map(|c| c.client_id == settlement.client_id)
            .unwrap_or(false);
        if !owned {
            return Ok(SettleOutcome::JobMissing);
        }

        let Some(client) = state.profiles.get(&settlement.client_id) else {
            return Err(StoreError::Inconsistent(format!(
                "client profile {} missing",
                settlement.client_id
            )));
        };
        if client.balance < settlement.price {
            return Ok(SettleOutcome::InsufficientFunds);
        }
        if !state.profiles.contains_key(&settlement.contractor_id) {
            return Err(StoreError::Inconsistent(format!(
                "contractor profile {} missing",
                settlement.contractor_id
            )));
        }

        // All checks passed; mutate under the same lock. A contract with
        // client == contractor nets to a no-op on the shared balance.
        if let Some(job) = state.jobs.get_mut(&settlement.job_id) {
            job.paid = Some(true);
            job.payment_date = Some(settlement.paid_at);
        }
        if let Some(client) = state.profiles.get_mut(&settlement.client_id) {
            client.balance -= settlement.price;
        }
        if let Some(contractor) = state.profiles.get_mut(&settlement.contractor_id) {
            contractor.balance += settlement.price;
        }

        Ok(SettleOutcome::Settled)
    }

    async fn credit_balance(&self, profile_id: i64, amount: Decimal) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let Some(profile) = state.profiles.get_mut(&profile_id) else {
            return Err(StoreError::Inconsistent(format!(
                "profile {} missing on credit",
                profile_id
            )));
        };
        profile.balance += amount;
        Ok(())
    }

    async fn paid_job_rollup(&self, query: &RollupQuery) -> Result<Vec<PartyRevenue>, StoreError> {
        let state = self.state.read().await;

        let mut totals: BTreeMap<i64, Decimal> = BTreeMap::new();
        for job in state.jobs.values().filter(|j| j.is_paid()) {
            let Some(paid_at) = job.payment_date else {
                continue;
            };
            if !query.window.contains(paid_at) {
                continue;
            }
            let Some(contract) = state.contract_of(job) else {
                tracing::warn!(job_id = job.job_id, "paid job without contract, skipped");
                continue;
            };
            let party = match query.side {
                RollupSide::Client => contract.client_id,
                RollupSide::Contractor => contract.contractor_id,
            };
            *totals.entry(party).or_insert(Decimal::ZERO) += job.price;
        }

        let mut rows: Vec<PartyRevenue> = Vec::with_capacity(totals.len());
        for (profile_id, total) in totals {
            let Some(profile) = state.profiles.get(&profile_id) else {
                tracing::warn!(profile_id, "rollup party without profile, skipped");
                continue;
            };
            rows.push(PartyRevenue {
                profile_id,
                first_name: profile.first_name.clone(),
                last_name: profile.last_name.clone(),
                profession: profile.profession.clone(),
                total,
            });
        }

        // Total descending, profile id ascending on ties; BTreeMap iteration
        // already yields ascending ids, and the sort is stable.
        rows.sort_by(|a, b| b.total.cmp(&a.total));
        if let Some(limit) = query.limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
