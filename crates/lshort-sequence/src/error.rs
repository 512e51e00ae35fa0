use thiserror::Error;

/// Errors returned by sequence allocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid lease size {0}; expected at least 1")]
    InvalidLeaseSize(u64),
    #[error("sequence exhausted at {current}")]
    Exhausted { current: u64 },
    #[error("unable to persist sequence lease: {0}")]
    Lease(String),
    #[error("sequence lease has been released")]
    Released,
    #[error("sequence state lock is poisoned")]
    StatePoisoned,
}
