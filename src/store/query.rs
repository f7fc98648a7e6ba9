//! Typed query specifications consumed by the store adapters.
//!
//! Filters are built by the access policy and passed to a [`Store`]
//! implementation; adapters translate them (to SQL, or to in-memory
//! predicates) instead of handlers assembling query fragments by hand.
//!
//! [`Store`]: crate::store::Store

use super::models::{Contract, ContractStatus};
use chrono::{DateTime, Utc};

/// Ownership scope: rows visible to a single profile.
///
/// A contract is in scope when the profile sits on either side of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope {
    pub profile_id: i64,
}

impl OwnerScope {
    pub fn new(profile_id: i64) -> Self {
        Self { profile_id }
    }

    pub fn matches(&self, contract: &Contract) -> bool {
        contract.involves(self.profile_id)
    }
}

/// Filter for contract listings: ownership scope plus an allowed status set.
///
/// An empty status set matches nothing.
#[derive(Debug, Clone)]
pub struct ContractFilter {
    pub scope: OwnerScope,
    pub statuses: Vec<ContractStatus>,
}

impl ContractFilter {
    pub fn matches(&self, contract: &Contract) -> bool {
        self.scope.matches(contract) && self.statuses.contains(&contract.status)
    }
}

/// Filter for a caller's unpaid jobs.
///
/// Only jobs under non-terminated contracts within the scope qualify.
#[derive(Debug, Clone, Copy)]
pub struct UnpaidJobsFilter {
    pub scope: OwnerScope,
}

impl UnpaidJobsFilter {
    pub fn contract_matches(&self, contract: &Contract) -> bool {
        self.scope.matches(contract) && contract.status != ContractStatus::Terminated
    }
}

/// Inclusive time window over job payment dates.
///
/// `start > end` is a valid, empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

/// Which side of the contract a rollup groups on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollupSide {
    Client,
    Contractor,
}

/// Aggregate specification: paid jobs inside `window`, summed per profile on
/// the requested contract side, ordered by total descending then profile id
/// ascending, optionally limited.
#[derive(Debug, Clone, Copy)]
pub struct RollupQuery {
    pub window: TimeWindow,
    pub side: RollupSide,
    pub limit: Option<i64>,
}
