//! End-to-end tests over the full router with the in-memory store.
//!
//! Each test builds its own seeded application; the `MemStore` handle is
//! kept around so balance and job state can be asserted directly after
//! driving the HTTP surface.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use gigpay::gateway::{AppState, router};
use gigpay::store::{Contract, ContractStatus, Job, MemStore, Profile, ProfileType, Store};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    app: Router,
    store: MemStore,
}

fn profile(id: i64, kind: ProfileType, first: &str, last: &str, prof: &str, bal: Decimal) -> Profile {
    Profile {
        profile_id: id,
        profile_type: kind,
        first_name: first.to_string(),
        last_name: last.to_string(),
        profession: prof.to_string(),
        balance: bal,
    }
}

fn contract(id: i64, client: i64, contractor: i64, status: ContractStatus) -> Contract {
    Contract {
        contract_id: id,
        client_id: client,
        contractor_id: contractor,
        terms: format!("contract {}", id),
        status,
    }
}

fn unpaid_job(id: i64, contract_id: i64, price: Decimal) -> Job {
    Job {
        job_id: id,
        contract_id,
        description: format!("job {}", id),
        price,
        paid: None,
        payment_date: None,
    }
}

fn paid_job(id: i64, contract_id: i64, price: Decimal, paid_at: DateTime<Utc>) -> Job {
    Job {
        payment_date: Some(paid_at),
        paid: Some(true),
        ..unpaid_job(id, contract_id, price)
    }
}

/// Clients 1-4, contractors 5-6, a terminated contract and a mix of unpaid
/// jobs. Client 4 has no contracts at all.
async fn seeded_app() -> TestApp {
    let store = MemStore::new();
    for p in [
        profile(1, ProfileType::Client, "Harry", "Potter", "wizard", dec!(100)),
        profile(2, ProfileType::Client, "Mr", "Robot", "hacker", dec!(500)),
        profile(3, ProfileType::Client, "John", "Snow", "knight", dec!(30)),
        profile(4, ProfileType::Client, "Ash", "Ketchum", "trainer", dec!(0)),
        profile(5, ProfileType::Contractor, "Linus", "Torvalds", "programmer", dec!(64)),
        profile(6, ProfileType::Contractor, "John", "Lenon", "musician", dec!(0)),
    ] {
        store.insert_profile(p).await;
    }
    for c in [
        contract(1, 1, 5, ContractStatus::Terminated),
        contract(2, 1, 6, ContractStatus::InProgress),
        contract(3, 2, 6, ContractStatus::InProgress),
        contract(4, 3, 5, ContractStatus::New),
    ] {
        store.insert_contract(c).await;
    }
    for j in [
        unpaid_job(1, 1, dec!(50)),
        unpaid_job(2, 2, dec!(80)),
        unpaid_job(3, 2, dec!(30)),
        unpaid_job(4, 3, dec!(600)),
        paid_job(5, 3, dec!(200), Utc.with_ymd_and_hms(2020, 8, 10, 12, 0, 0).unwrap()),
        unpaid_job(6, 4, dec!(25)),
    ] {
        store.insert_job(j).await;
    }

    let state = Arc::new(AppState::new(Arc::new(store.clone())));
    TestApp {
        app: router(state),
        store,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn as_user(profile_id: i64, method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("profile_id", profile_id.to_string())
        .body(Body::empty())
        .unwrap()
}

fn as_user_json(profile_id: i64, method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("profile_id", profile_id.to_string())
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn as_admin(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("admin", "1")
        .body(Body::empty())
        .unwrap()
}

fn ids(body: &Value, field: &str) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row[field].as_i64().unwrap())
        .collect()
}

// --- Authentication ---

#[tokio::test]
async fn missing_profile_header_is_unauthorized() {
    let t = seeded_app().await;
    let request = Request::builder()
        .method("GET")
        .uri("/contracts")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_or_garbled_profile_is_unauthorized() {
    let t = seeded_app().await;
    let (status, _) = send(&t.app, as_user(999, "GET", "/contracts")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("GET")
        .uri("/contracts")
        .header("profile_id", "not-a-number")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_require_admin_header() {
    let t = seeded_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/admin/best-profession?start=2020-08-01&end=2020-08-31")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A profile identity does not grant admin.
    let (status, _) = send(
        &t.app,
        as_user(1, "POST", "/admin/best-profession?start=2020-08-01&end=2020-08-31"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// --- Contracts ---

#[tokio::test]
async fn contract_by_id_respects_ownership() {
    let t = seeded_app().await;

    let (status, body) = send(&t.app, as_user(1, "GET", "/contracts/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["contractId"], json!(2));
    assert_eq!(body["data"]["status"], json!("in_progress"));

    // Contractor side sees it too.
    let (status, _) = send(&t.app, as_user(6, "GET", "/contracts/2")).await;
    assert_eq!(status, StatusCode::OK);

    // A third party does not.
    let (status, _) = send(&t.app, as_user(2, "GET", "/contracts/2")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn contract_by_id_includes_terminated() {
    let t = seeded_app().await;
    let (status, body) = send(&t.app, as_user(1, "GET", "/contracts/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("terminated"));
}

#[tokio::test]
async fn contract_listing_excludes_terminated() {
    let t = seeded_app().await;
    let (status, body) = send(&t.app, as_user(1, "GET", "/contracts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "contractId"), vec![2]);

    // Contractor 5: terminated contract 1 hidden, contract 4 visible.
    let (_, body) = send(&t.app, as_user(5, "GET", "/contracts")).await;
    assert_eq!(ids(&body, "contractId"), vec![4]);
}

#[tokio::test]
async fn contract_listing_status_narrowing() {
    let t = seeded_app().await;

    let (status, body) = send(&t.app, as_user(3, "GET", "/contracts?status=NEW")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "contractId"), vec![4]);

    let (status, _) = send(&t.app, as_user(3, "GET", "/contracts?status=in_progress")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Terminated stays excluded even when requested explicitly.
    let (status, _) = send(&t.app, as_user(1, "GET", "/contracts?status=terminated")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&t.app, as_user(4, "GET", "/contracts")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- Unpaid jobs ---

#[tokio::test]
async fn unpaid_jobs_cover_active_contracts_only() {
    let t = seeded_app().await;

    // Client 1: job 1 sits under the terminated contract, jobs 2/3 qualify.
    let (status, body) = send(&t.app, as_user(1, "GET", "/jobs/unpaid")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "jobId"), vec![2, 3]);

    // Contractor 6 sits on contracts 2 and 3; job 5 is already paid.
    let (_, body) = send(&t.app, as_user(6, "GET", "/jobs/unpaid")).await;
    assert_eq!(ids(&body, "jobId"), vec![2, 3, 4]);

    let (status, _) = send(&t.app, as_user(4, "GET", "/jobs/unpaid")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- Payments ---

#[tokio::test]
async fn payment_lifecycle() {
    let t = seeded_app().await;

    // Harry (100) pays job 2 (80) owed to the musician (0).
    let (status, _) = send(&t.app, as_user(1, "POST", "/jobs/2/pay")).await;
    assert_eq!(status, StatusCode::OK);

    let client = t.store.profile_by_id(1).await.unwrap().unwrap();
    let contractor = t.store.profile_by_id(6).await.unwrap().unwrap();
    assert_eq!(client.balance, dec!(20));
    assert_eq!(contractor.balance, dec!(80));

    // Paying the same job again is indistinguishable from a missing job.
    let (status, _) = send(&t.app, as_user(1, "POST", "/jobs/2/pay")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The remaining balance (20) no longer covers job 3 (30).
    let (status, _) = send(&t.app, as_user(1, "POST", "/jobs/3/pay")).await;
    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    let client = t.store.profile_by_id(1).await.unwrap().unwrap();
    assert_eq!(client.balance, dec!(20));
}

#[tokio::test]
async fn payment_precondition_failures() {
    let t = seeded_app().await;

    // Contractors cannot pay.
    let (status, _) = send(&t.app, as_user(5, "POST", "/jobs/2/pay")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Another client's job looks missing.
    let (status, _) = send(&t.app, as_user(1, "POST", "/jobs/4/pay")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&t.app, as_user(1, "POST", "/jobs/999/pay")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Mr Robot (500) cannot afford job 4 (600); nothing changes.
    let (status, _) = send(&t.app, as_user(2, "POST", "/jobs/4/pay")).await;
    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    let robot = t.store.profile_by_id(2).await.unwrap().unwrap();
    assert_eq!(robot.balance, dec!(500));
}

// --- Deposits ---

#[tokio::test]
async fn deposit_respects_the_cap() {
    let t = seeded_app().await;

    // John Snow owes 25 unpaid; the cap is 31.25.
    let (status, _) = send(
        &t.app,
        as_user_json(3, "POST", "/balances/deposit/3", &json!({"amount": "31.25"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let snow = t.store.profile_by_id(3).await.unwrap().unwrap();
    assert_eq!(snow.balance, dec!(61.25));

    let (status, _) = send(
        &t.app,
        as_user_json(3, "POST", "/balances/deposit/3", &json!({"amount": "31.26"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let snow = t.store.profile_by_id(3).await.unwrap().unwrap();
    assert_eq!(snow.balance, dec!(61.25));
}

#[tokio::test]
async fn any_caller_may_fund_a_client() {
    let t = seeded_app().await;

    // Harry funds John Snow.
    let (status, _) = send(
        &t.app,
        as_user_json(1, "POST", "/balances/deposit/3", &json!({"amount": "10"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let snow = t.store.profile_by_id(3).await.unwrap().unwrap();
    assert_eq!(snow.balance, dec!(40));
}

#[tokio::test]
async fn deposit_target_validation() {
    let t = seeded_app().await;

    let (status, _) = send(
        &t.app,
        as_user_json(1, "POST", "/balances/deposit/999", &json!({"amount": "10"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Contractors cannot receive deposits.
    let (status, _) = send(
        &t.app,
        as_user_json(1, "POST", "/balances/deposit/5", &json!({"amount": "10"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing outstanding means nothing can be deposited.
    let (status, _) = send(
        &t.app,
        as_user_json(4, "POST", "/balances/deposit/4", &json!({"amount": "10"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &t.app,
        as_user_json(1, "POST", "/balances/deposit/3", &json!({"amount": "-5"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// --- Admin reports ---

/// Two clients, three contractors (two programmers), paid jobs inside and
/// outside the August 2020 window.
async fn report_app() -> TestApp {
    let store = MemStore::new();
    for p in [
        profile(1, ProfileType::Client, "Harry", "Potter", "wizard", dec!(0)),
        profile(2, ProfileType::Client, "Mr", "Robot", "hacker", dec!(0)),
        profile(5, ProfileType::Contractor, "Linus", "Torvalds", "programmer", dec!(0)),
        profile(6, ProfileType::Contractor, "Anton", "Bruckner", "programmer", dec!(0)),
        profile(7, ProfileType::Contractor, "Wolfgang", "Mozart", "musician", dec!(0)),
    ] {
        store.insert_profile(p).await;
    }
    for c in [
        contract(1, 1, 5, ContractStatus::InProgress),
        contract(2, 1, 7, ContractStatus::InProgress),
        contract(3, 2, 6, ContractStatus::InProgress),
        contract(4, 2, 7, ContractStatus::InProgress),
    ] {
        store.insert_contract(c).await;
    }
    let aug = |d: u32| Utc.with_ymd_and_hms(2020, 8, d, 12, 0, 0).unwrap();
    for j in [
        paid_job(1, 1, dec!(150), aug(10)),
        paid_job(2, 2, dec!(200), aug(12)),
        paid_job(3, 3, dec!(120), aug(14)),
        paid_job(4, 4, dec!(90), Utc.with_ymd_and_hms(2020, 9, 5, 12, 0, 0).unwrap()),
    ] {
        store.insert_job(j).await;
    }

    let state = Arc::new(AppState::new(Arc::new(store.clone())));
    TestApp {
        app: router(state),
        store,
    }
}

#[tokio::test]
async fn best_profession_sums_within_the_window() {
    let t = report_app().await;

    // August: programmer 150 + 120 = 270 beats musician 200.
    let (status, body) = send(
        &t.app,
        as_admin("POST", "/admin/best-profession?start=2020-08-01&end=2020-08-31"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["profession"], json!("programmer"));
    assert_eq!(body["data"]["totalRevenue"], json!("270"));
    assert_eq!(body["data"]["contractor"], json!("Linus"));

    // September only contains the musician's job.
    let (_, body) = send(
        &t.app,
        as_admin("POST", "/admin/best-profession?start=2020-09-01&end=2020-09-30"),
    )
    .await;
    assert_eq!(body["data"]["profession"], json!("musician"));
    assert_eq!(body["data"]["totalRevenue"], json!("90"));
}

#[tokio::test]
async fn best_profession_empty_window_is_not_found() {
    let t = report_app().await;
    let (status, _) = send(
        &t.app,
        as_admin("POST", "/admin/best-profession?start=2021-01-01&end=2021-12-31"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn best_clients_orders_and_limits() {
    let t = report_app().await;

    // Default limit is 2: Harry 350, Mr Robot 120.
    let (status, body) = send(
        &t.app,
        as_admin("POST", "/admin/best-clients?start=2020-08-01&end=2020-08-31"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], json!(1));
    assert_eq!(entries[0]["totalSpent"], json!("350"));
    assert_eq!(entries[0]["clientName"], json!("Harry Potter"));
    assert_eq!(entries[1]["id"], json!(2));

    let (_, body) = send(
        &t.app,
        as_admin("POST", "/admin/best-clients?start=2020-08-01&end=2020-08-31&limit=1"),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["totalSpent"], json!("350"));
}

#[tokio::test]
async fn report_window_validation() {
    let t = report_app().await;

    let (status, _) = send(
        &t.app,
        as_admin("POST", "/admin/best-clients?start=yesterday&end=2020-08-31"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&t.app, as_admin("POST", "/admin/best-clients?end=2020-08-31")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// --- Health ---

#[tokio::test]
async fn health_endpoint_is_public() {
    let t = seeded_app().await;
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], json!(0));
}
