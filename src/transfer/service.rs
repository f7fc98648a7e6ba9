//! Payment and deposit execution.
//!
//! Preconditions are checked in a fixed order before any mutation; the
//! mutation itself is a single atomic store unit, which re-validates the
//! critical facts (unpaid flag, balance) under its own locks. A job can
//! therefore be paid at most once even under concurrent calls, and money is
//! conserved: the client is debited exactly what the contractor is credited.

use super::error::TransferError;
use crate::access::CallerIdentity;
use crate::store::{SettleOutcome, Settlement, Store};
use chrono::Utc;
use rust_decimal::Decimal;

pub struct TransferService;

impl TransferService {
    /// Pay an unpaid job on behalf of the calling client.
    ///
    /// Check order: caller role, then job existence/ownership/unpaid state,
    /// then funds. An already-paid or foreign job is indistinguishable from
    /// a missing one.
    pub async fn pay_job(
        store: &dyn Store,
        caller: &CallerIdentity,
        job_id: i64,
    ) -> Result<(), TransferError> {
        if !caller.is_client() {
            return Err(TransferError::InvalidRole);
        }

        let visible = store
            .unpaid_job_for_client(job_id, caller.profile_id)
            .await?
            .ok_or(TransferError::NotFound)?;
        let job = visible.job;
        let contract = visible.contract;

        let client = store
            .profile_by_id(caller.profile_id)
            .await?
            .ok_or(TransferError::NotFound)?;
        if client.balance < job.price {
            return Err(TransferError::InsufficientFunds);
        }

        let outcome = store
            .settle_job(&Settlement {
                job_id: job.job_id,
                client_id: contract.client_id,
                contractor_id: contract.contractor_id,
                price: job.price,
                paid_at: Utc::now(),
            })
            .await?;

        match outcome {
            SettleOutcome::Settled => {
                tracing::info!(
                    job_id = job.job_id,
                    client_id = contract.client_id,
                    contractor_id = contract.contractor_id,
                    price = %job.price,
                    "job settled"
                );
                Ok(())
            }
            // Lost the race to another payment, or the job changed under us.
            SettleOutcome::AlreadyPaid | SettleOutcome::JobMissing => Err(TransferError::NotFound),
            SettleOutcome::InsufficientFunds => Err(TransferError::InsufficientFunds),
        }
    }

    /// Deposit funds into a client's balance.
    ///
    /// The deposit is capped at 125% of the target's outstanding unpaid job
    /// total, computed at this moment; with nothing outstanding every
    /// deposit is rejected. Any authenticated caller may fund any client.
    pub async fn deposit_funds(
        store: &dyn Store,
        target_profile_id: i64,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        if amount <= Decimal::ZERO {
            return Err(TransferError::InvalidAmount);
        }

        let target = store
            .profile_by_id(target_profile_id)
            .await?
            .ok_or(TransferError::NotFound)?;
        if !target.is_client() {
            return Err(TransferError::InvalidRole);
        }

        let total_unpaid = store.unpaid_total(target.profile_id).await?;
        let cap = total_unpaid * Decimal::new(125, 2);
        if total_unpaid <= Decimal::ZERO || amount > cap {
            return Err(TransferError::DepositCapExceeded);
        }

        store.credit_balance(target.profile_id, amount).await?;
        tracing::info!(
            profile_id = target.profile_id,
            amount = %amount,
            "deposit credited"
        );
        Ok(())
    }
}
