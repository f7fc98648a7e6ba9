use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("resource not found")]
    NotFound,

    #[error("operation not permitted for caller role")]
    InvalidRole,

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("deposit exceeds 125% of outstanding unpaid total")]
    DepositCapExceeded,

    #[error("invalid amount: must be positive")]
    InvalidAmount,
}
