//! Failure kinds reported by the load/unload capability checks.

use thiserror::Error;

/// Why a transporter cannot move cargo right now.
///
/// None of these are fatal: the gathering task branches on them, and a
/// caller that skips the check gets the same value back from `load`/`unload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("transporter is not at the requested location")]
    NotCoLocated,

    #[error("field has nothing left to load")]
    NothingToLoad,

    #[error("not enough free cargo space for the requested amount")]
    AlreadyFull,

    #[error("field holds less than the requested amount")]
    InsufficientResources,

    #[error("warehouse has no free space")]
    StorageFull,
}

pub type TransferResult<T> = Result<T, TransferError>;
