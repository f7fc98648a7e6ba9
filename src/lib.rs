//! gigpay - contracts, jobs and balance settlement backend
//!
//! A small HTTP backend moving money between clients and contractors. The
//! heart of the system is the settlement path: paying a job debits the
//! client and credits the contractor in one atomic store unit, deposits are
//! capped against the outstanding unpaid total, and admin reports aggregate
//! paid jobs over time windows.
//!
//! # Modules
//!
//! - [`store`] - Store port, domain records, query builder, Postgres and
//!   in-memory adapters
//! - [`access`] - Caller identity and ownership filtering
//! - [`transfer`] - Transfer engine (pay-job, deposit-funds)
//! - [`reporting`] - Aggregation engine (best-profession, best-clients)
//! - [`gateway`] - axum router, auth middleware, handlers
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing subscriber setup
//! - [`db`] - PostgreSQL pool and schema bootstrap

pub mod access;
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod reporting;
pub mod store;
pub mod transfer;

// Convenient re-exports at crate root
pub use access::{AccessPolicy, CallerIdentity};
pub use config::AppConfig;
pub use db::Database;
pub use gateway::{AppState, router, run_server};
pub use reporting::ReportingService;
pub use store::{
    Contract, ContractStatus, Job, MemStore, PgStore, Profile, ProfileType, Store, StoreError,
};
pub use transfer::{TransferError, TransferService};
