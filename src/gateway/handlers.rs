//! HTTP handlers: thin adapters between the router and the core services.
//!
//! Handlers translate typed service errors into the HTTP contract. Store
//! failures are logged and surface as a generic 500; details never reach
//! the caller.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

use super::state::AppState;
use super::types::{ApiResponse, error_codes};
use crate::access::{AccessPolicy, CallerIdentity};
use crate::reporting::{BestClientEntry, BestProfessionReport, ReportError, ReportingService};
use crate::store::query::TimeWindow;
use crate::store::{Contract, Job};
use crate::transfer::{TransferError, TransferService};
use axum::Extension;

// --- Requests ---

#[derive(Debug, Deserialize)]
pub struct ContractListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub limit: Option<u32>,
}

type ErrorResponse = (StatusCode, Json<ApiResponse<()>>);

const DEFAULT_BEST_CLIENTS_LIMIT: u32 = 2;

// --- Error mapping ---

fn internal_error(e: impl fmt::Display) -> ErrorResponse {
    tracing::error!(error = %e, "internal failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(
            error_codes::INTERNAL_ERROR,
            "internal error",
        )),
    )
}

fn not_found() -> ErrorResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error(
            error_codes::NOT_FOUND,
            "not found",
        )),
    )
}

fn bad_request(msg: &str) -> ErrorResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(error_codes::INVALID_PARAMETER, msg)),
    )
}

fn transfer_error_response(e: TransferError) -> ErrorResponse {
    match e {
        TransferError::InvalidRole => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                error_codes::INVALID_ROLE,
                e.to_string(),
            )),
        ),
        TransferError::NotFound => not_found(),
        TransferError::InsufficientFunds => (
            StatusCode::NOT_ACCEPTABLE,
            Json(ApiResponse::<()>::error(
                error_codes::INSUFFICIENT_FUNDS,
                e.to_string(),
            )),
        ),
        TransferError::DepositCapExceeded => (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error(
                error_codes::DEPOSIT_CAP_EXCEEDED,
                e.to_string(),
            )),
        ),
        TransferError::InvalidAmount => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                error_codes::INVALID_PARAMETER,
                e.to_string(),
            )),
        ),
        TransferError::Store(err) => internal_error(err),
    }
}

fn report_error_response(e: ReportError) -> ErrorResponse {
    match e {
        ReportError::NotFound => not_found(),
        ReportError::Store(err) => internal_error(err),
    }
}

// --- Window parsing ---

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates; a bare end date
/// extends to the last instant of that day so the window stays inclusive.
fn parse_time_bound(raw: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?
    } else {
        NaiveTime::MIN
    };
    Some(DateTime::from_naive_utc_and_offset(date.and_time(time), Utc))
}

fn parse_window(query: &ReportQuery) -> Result<TimeWindow, ErrorResponse> {
    let start_raw = query
        .start
        .as_deref()
        .ok_or_else(|| bad_request("Missing start parameter"))?;
    let end_raw = query
        .end
        .as_deref()
        .ok_or_else(|| bad_request("Missing end parameter"))?;

    let start =
        parse_time_bound(start_raw, false).ok_or_else(|| bad_request("Invalid start parameter"))?;
    let end =
        parse_time_bound(end_raw, true).ok_or_else(|| bad_request("Invalid end parameter"))?;
    Ok(TimeWindow::new(start, end))
}

// --- Handlers ---

/// GET /contracts/{id}
pub async fn get_contract(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(contract_id): Path<i64>,
) -> Result<Json<ApiResponse<Contract>>, ErrorResponse> {
    let scope = AccessPolicy::owner_scope(&caller);
    match state.store.contract_by_id(contract_id, &scope).await {
        Ok(Some(contract)) => Ok(Json(ApiResponse::success(contract))),
        Ok(None) => Err(not_found()),
        Err(e) => Err(internal_error(e)),
    }
}

/// GET /contracts?status=
pub async fn list_contracts(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<ContractListQuery>,
) -> Result<Json<ApiResponse<Vec<Contract>>>, ErrorResponse> {
    let filter = AccessPolicy::contracts_filter(&caller, query.status.as_deref());
    match state.store.contracts(&filter).await {
        Ok(contracts) if contracts.is_empty() => Err(not_found()),
        Ok(contracts) => Ok(Json(ApiResponse::success(contracts))),
        Err(e) => Err(internal_error(e)),
    }
}

/// GET /jobs/unpaid
pub async fn list_unpaid_jobs(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<ApiResponse<Vec<Job>>>, ErrorResponse> {
    let filter = AccessPolicy::unpaid_jobs_filter(&caller);
    match state.store.unpaid_jobs(&filter).await {
        Ok(jobs) if jobs.is_empty() => Err(not_found()),
        Ok(jobs) => Ok(Json(ApiResponse::success(jobs))),
        Err(e) => Err(internal_error(e)),
    }
}

/// POST /jobs/{job_id}/pay
pub async fn pay_job(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(job_id): Path<i64>,
) -> Result<Json<ApiResponse<String>>, ErrorResponse> {
    match TransferService::pay_job(state.store.as_ref(), &caller, job_id).await {
        Ok(()) => Ok(Json(ApiResponse::success("job paid".to_string()))),
        Err(e) => Err(transfer_error_response(e)),
    }
}

/// POST /balances/deposit/{user_id}
///
/// The caller only needs to be authenticated; any profile may fund any
/// client, so the target comes from the path, not the identity.
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(request): Json<DepositRequest>,
) -> Result<Json<ApiResponse<String>>, ErrorResponse> {
    match TransferService::deposit_funds(state.store.as_ref(), user_id, request.amount).await {
        Ok(()) => Ok(Json(ApiResponse::success("deposit credited".to_string()))),
        Err(e) => Err(transfer_error_response(e)),
    }
}

/// POST /admin/best-profession?start=&end=
pub async fn best_profession(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<BestProfessionReport>>, ErrorResponse> {
    let window = parse_window(&query)?;
    match ReportingService::best_profession(state.store.as_ref(), &window).await {
        Ok(report) => Ok(Json(ApiResponse::success(report))),
        Err(e) => Err(report_error_response(e)),
    }
}

/// POST /admin/best-clients?start=&end=&limit=
pub async fn best_clients(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ApiResponse<Vec<BestClientEntry>>>, ErrorResponse> {
    let window = parse_window(&query)?;
    let limit = query.limit.unwrap_or(DEFAULT_BEST_CLIENTS_LIMIT);
    match ReportingService::best_clients(state.store.as_ref(), &window, limit).await {
        Ok(entries) => Ok(Json(ApiResponse::success(entries))),
        Err(e) => Err(report_error_response(e)),
    }
}

/// GET /health
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<String>>, ErrorResponse> {
    match state.store.health().await {
        Ok(()) => Ok(Json(ApiResponse::success("ok".to_string()))),
        Err(e) => Err(internal_error(e)),
    }
}
