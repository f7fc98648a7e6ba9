//! Best-profession and best-clients reports.
//!
//! Both reports consume the store's paid-job rollup: per-profile sums over
//! the inclusive window, ordered by total descending then profile id
//! ascending. That ordering is the deterministic tie-break for equal
//! totals, on both store adapters.

use crate::store::query::{RollupQuery, RollupSide, TimeWindow};
use crate::store::{PartyRevenue, Store, StoreError};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("no paid jobs in range")]
    NotFound,
}

/// The profession that earned the most inside the window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BestProfessionReport {
    pub total_revenue: Decimal,
    /// First name of the top-earning contractor within the profession.
    pub contractor: String,
    pub profession: String,
}

/// One entry of the best-clients ranking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BestClientEntry {
    pub id: i64,
    pub total_spent: Decimal,
    pub client_name: String,
}

pub struct ReportingService;

impl ReportingService {
    /// Sum paid-job prices per contractor profession inside the window and
    /// return the largest group. Professions are folded in rollup order, so
    /// the first profession to reach the maximum total wins ties.
    pub async fn best_profession(
        store: &dyn Store,
        window: &TimeWindow,
    ) -> Result<BestProfessionReport, ReportError> {
        let rows = store
            .paid_job_rollup(&RollupQuery {
                window: *window,
                side: RollupSide::Contractor,
                limit: None,
            })
            .await?;
        if rows.is_empty() {
            return Err(ReportError::NotFound);
        }

        // Fold per-contractor sums into profession buckets. The rollup is
        // ordered by total descending (ids ascending on ties), so the first
        // row seen for a profession is also its top contributor.
        let mut order: Vec<String> = Vec::new();
        let mut buckets: HashMap<String, (Decimal, String)> = HashMap::new();
        for row in &rows {
            match buckets.get_mut(&row.profession) {
                Some((total, _)) => *total += row.total,
                None => {
                    order.push(row.profession.clone());
                    buckets.insert(row.profession.clone(), (row.total, row.first_name.clone()));
                }
            }
        }

        let mut winner: Option<(&str, Decimal)> = None;
        for profession in &order {
            let total = buckets[profession.as_str()].0;
            let beats = match winner {
                Some((_, best)) => total > best,
                None => true,
            };
            if beats {
                winner = Some((profession.as_str(), total));
            }
        }

        // rows was non-empty, so a winner exists.
        let (profession, total_revenue) = winner.ok_or(ReportError::NotFound)?;
        let contractor = buckets[profession].1.clone();
        Ok(BestProfessionReport {
            total_revenue,
            contractor,
            profession: profession.to_string(),
        })
    }

    /// The `limit` highest-spending clients inside the window, total
    /// descending, client id ascending on ties. `limit` defaults to 2 at
    /// the HTTP boundary and carries no upper bound; zero yields an empty
    /// ranking and therefore `NotFound`.
    pub async fn best_clients(
        store: &dyn Store,
        window: &TimeWindow,
        limit: u32,
    ) -> Result<Vec<BestClientEntry>, ReportError> {
        let rows = store
            .paid_job_rollup(&RollupQuery {
                window: *window,
                side: RollupSide::Client,
                limit: Some(i64::from(limit)),
            })
            .await?;
        if rows.is_empty() {
            return Err(ReportError::NotFound);
        }

        Ok(rows.into_iter().map(Self::client_entry).collect())
    }

    fn client_entry(row: PartyRevenue) -> BestClientEntry {
        BestClientEntry {
            id: row.profile_id,
            total_spent: row.total,
            client_name: format!("{} {}", row.first_name, row.last_name),
        }
    }
}
