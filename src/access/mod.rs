//! Caller identity and ownership filtering.
//!
//! The gateway resolves headers into a [`CallerIdentity`] once, at the
//! boundary; everything below works with this typed value. Policy functions
//! translate an identity into store filters and have no side effects.

use crate::store::models::{ContractStatus, ProfileType};
use crate::store::query::{ContractFilter, OwnerScope, UnpaidJobsFilter};

/// Authenticated caller, resolved from the `profile_id` header.
///
/// Admin is not a profile role: admin-only routes are gated by a separate
/// header check in the gateway and never carry an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub profile_id: i64,
    pub profile_type: ProfileType,
}

impl CallerIdentity {
    pub fn is_client(&self) -> bool {
        self.profile_type == ProfileType::Client
    }
}

pub struct AccessPolicy;

impl AccessPolicy {
    /// Rows visible to the caller: those where the caller sits on either
    /// side of the underlying contract.
    pub fn owner_scope(caller: &CallerIdentity) -> OwnerScope {
        OwnerScope::new(caller.profile_id)
    }

    /// Listing filter: the caller's contracts, excluding terminated ones.
    /// An explicit status request narrows the listing to that status, but
    /// terminated (or unknown) requests stay excluded and match nothing.
    pub fn contracts_filter(caller: &CallerIdentity, requested: Option<&str>) -> ContractFilter {
        let statuses = match requested {
            None => vec![ContractStatus::New, ContractStatus::InProgress],
            Some(raw) => match raw.parse::<ContractStatus>() {
                Ok(status) if status != ContractStatus::Terminated => vec![status],
                _ => vec![],
            },
        };
        ContractFilter {
            scope: Self::owner_scope(caller),
            statuses,
        }
    }

    /// The caller's unpaid jobs under non-terminated contracts.
    pub fn unpaid_jobs_filter(caller: &CallerIdentity) -> UnpaidJobsFilter {
        UnpaidJobsFilter {
            scope: Self::owner_scope(caller),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: i64) -> CallerIdentity {
        CallerIdentity {
            profile_id: id,
            profile_type: ProfileType::Client,
        }
    }

    #[test]
    fn test_default_listing_excludes_terminated() {
        let filter = AccessPolicy::contracts_filter(&client(1), None);
        assert_eq!(
            filter.statuses,
            vec![ContractStatus::New, ContractStatus::InProgress]
        );
        assert_eq!(filter.scope.profile_id, 1);
    }

    #[test]
    fn test_explicit_status_narrows_case_insensitively() {
        let filter = AccessPolicy::contracts_filter(&client(1), Some("In_Progress"));
        assert_eq!(filter.statuses, vec![ContractStatus::InProgress]);
    }

    #[test]
    fn test_terminated_and_unknown_requests_match_nothing() {
        assert!(
            AccessPolicy::contracts_filter(&client(1), Some("terminated"))
                .statuses
                .is_empty()
        );
        assert!(
            AccessPolicy::contracts_filter(&client(1), Some("archived"))
                .statuses
                .is_empty()
        );
    }
}
