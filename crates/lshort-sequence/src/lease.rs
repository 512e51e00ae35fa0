use crate::error::Error;

/// Persistent home of a leased sequence counter.
///
/// The stored value is the end (exclusive) of the most recent lease: every
/// number below it may already have been handed out.
pub trait LeaseStore: Send + Sync {
    /// Returns the persisted lease end, or `None` if no lease was ever taken.
    fn load(&self) -> Result<Option<u64>, Error>;
    /// Persists a new lease end. Must be durable once this returns.
    fn store(&self, lease_end: u64) -> Result<(), Error>;
}
