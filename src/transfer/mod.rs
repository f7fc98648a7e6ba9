//! Transfer engine: pay-job and deposit-funds operations.

pub mod error;
pub mod service;

pub use error::TransferError;
pub use service::TransferService;
