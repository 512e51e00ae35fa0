//! Embedded storage backends for the link store.
//!
//! - [`RedbLinkStore`] keeps links and the sequence counter in one redb file
//!   and allocates inside the write transaction that stores the link.
//! - [`SledLinkStore`] keeps links in a sled directory and allocates from a
//!   leased counter, so writers never wait on each other.
//!
//! [`Store`] selects one of them at construction time.

mod error;
pub mod redb_store;
pub mod sled_store;
pub mod store;

pub use lshort_core::{LinkError, LinkStore, Result, ShortKey, StorageError};
pub use lshort_sequence::DEFAULT_LEASE_SIZE;
pub use redb_store::{RedbLinkStore, RedbOptions};
pub use sled_store::{SledLinkStore, SledMode, SledOptions};
pub use store::{BackendOptions, Store};
