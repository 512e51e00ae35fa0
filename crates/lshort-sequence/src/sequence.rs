use crate::{error::Error, lease::LeaseStore};
use std::sync::Mutex;
use tracing::debug;
use typed_builder::TypedBuilder;

/// Numbers reserved per lease unless configured otherwise.
pub const DEFAULT_LEASE_SIZE: u64 = 10;

/// Returns the number that follows `current` in a persisted counter.
///
/// `None` means the counter was never advanced, so the sequence starts at
/// `first`. Fails instead of wrapping once the counter reaches `u64::MAX`.
pub fn advance(current: Option<u64>, first: u64) -> Result<u64, Error> {
    match current {
        None => Ok(first),
        Some(current) => current
            .checked_add(1)
            .map(|next| next.max(first))
            .ok_or(Error::Exhausted { current }),
    }
}

/// Configures a [`LeasedSequence`].
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct LeaseSettings {
    /// How many numbers are reserved per storage round-trip.
    #[builder(default = DEFAULT_LEASE_SIZE)]
    pub lease_size: u64,
    /// The first number handed out by a fresh store.
    #[builder(default = 1)]
    pub first: u64,
}

impl Default for LeaseSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug)]
struct LeaseState {
    /// Next number to hand out.
    next: u64,
    /// End (exclusive) of the persisted lease.
    leased: u64,
    released: bool,
}

/// A sequence that reserves numbers from a [`LeaseStore`] in batches.
///
/// The end of every lease is persisted before any number from it is handed
/// out, so a crash can only skip numbers, never repeat them. Calling
/// [`release`](Self::release) writes the unused tail back.
pub struct LeasedSequence<S: LeaseStore> {
    store: S,
    lease_size: u64,
    state: Mutex<LeaseState>,
}

impl<S: LeaseStore> LeasedSequence<S> {
    /// Loads the persisted counter and takes the first lease.
    pub fn acquire(store: S, settings: LeaseSettings) -> Result<Self, Error> {
        if settings.lease_size == 0 {
            return Err(Error::InvalidLeaseSize(settings.lease_size));
        }

        let next = store
            .load()?
            .map_or(settings.first, |stored| stored.max(settings.first));
        let leased = Self::lease_end(next, settings.lease_size)?;
        store.store(leased)?;
        debug!(next, leased, "acquired sequence lease");

        Ok(Self {
            store,
            lease_size: settings.lease_size,
            state: Mutex::new(LeaseState {
                next,
                leased,
                released: false,
            }),
        })
    }

    /// Returns the next number, renewing the lease first when it is used up.
    pub fn next(&self) -> Result<u64, Error> {
        let mut state = self.state.lock().map_err(|_| Error::StatePoisoned)?;

        if state.released {
            return Err(Error::Released);
        }

        if state.next >= state.leased {
            let leased = Self::lease_end(state.next, self.lease_size)?;
            self.store.store(leased)?;
            debug!(next = state.next, leased, "renewed sequence lease");
            state.leased = leased;
        }

        let value = state.next;
        // value < leased, so this cannot overflow
        state.next += 1;
        Ok(value)
    }

    /// Writes the unused tail of the current lease back to the store.
    ///
    /// Further calls to [`next`](Self::next) fail with [`Error::Released`].
    /// Releasing twice is a no-op.
    pub fn release(&self) -> Result<(), Error> {
        let mut state = self.state.lock().map_err(|_| Error::StatePoisoned)?;

        if state.released {
            return Ok(());
        }

        self.store.store(state.next)?;
        debug!(next = state.next, "released sequence lease");
        state.leased = state.next;
        state.released = true;
        Ok(())
    }

    fn lease_end(next: u64, lease_size: u64) -> Result<u64, Error> {
        let leased = next.saturating_add(lease_size);
        if leased == next {
            return Err(Error::Exhausted { current: next });
        }
        Ok(leased)
    }
}
