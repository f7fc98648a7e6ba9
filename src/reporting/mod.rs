//! Aggregation engine: time-windowed revenue reports over paid jobs.

pub mod service;

pub use service::{BestClientEntry, BestProfessionReport, ReportError, ReportingService};
