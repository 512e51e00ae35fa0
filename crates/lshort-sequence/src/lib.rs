//! Sequence allocation for short keys.
//!
//! Every store hands out strictly increasing sequence numbers that are never
//! reused. Transactional stores advance a persisted counter with [`advance`]
//! inside their write transaction; other stores draw numbers from a
//! [`LeasedSequence`], which reserves them from persistent storage in batches.

pub mod error;
mod lease;
mod sequence;

pub use error::Error;
pub use lease::LeaseStore;
pub use sequence::{advance, LeaseSettings, LeasedSequence, DEFAULT_LEASE_SIZE};
