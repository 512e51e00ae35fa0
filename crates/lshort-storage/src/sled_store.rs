use crate::error::sled_error;
use lshort_core::{codec, LinkError, LinkStore, Operation, Result, ShortKey, StorageError};
use lshort_sequence::{LeaseSettings, LeaseStore, LeasedSequence, DEFAULT_LEASE_SIZE};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

/// Reserved key holding the end of the current sequence lease.
///
/// `_` is not in the key alphabet, so no short key can ever shadow it.
const SEQUENCE_KEY: &[u8] = b"_links";

/// Mirrors [`sled::Mode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SledMode {
    #[default]
    LowSpace,
    HighThroughput,
}

impl From<SledMode> for sled::Mode {
    fn from(mode: SledMode) -> Self {
        match mode {
            SledMode::LowSpace => sled::Mode::LowSpace,
            SledMode::HighThroughput => sled::Mode::HighThroughput,
        }
    }
}

/// Options for [`SledLinkStore::open`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct SledOptions {
    /// Sequence numbers reserved per lease.
    #[builder(default = DEFAULT_LEASE_SIZE)]
    pub lease_size: u64,
    /// The first sequence number issued by a fresh store.
    #[builder(default = 1)]
    pub first_sequence: u64,
    /// Page cache size in bytes.
    #[builder(default = 64 * 1024 * 1024)]
    pub cache_capacity: u64,
    /// Background flush interval; `None` disables the flusher thread.
    #[builder(default = Some(500))]
    pub flush_every_ms: Option<u64>,
    /// Flush after every stored link before `shrink` returns.
    #[builder(default = true)]
    pub sync_writes: bool,
    #[builder(default)]
    pub mode: SledMode,
}

impl Default for SledOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Persists the sequence lease under [`SEQUENCE_KEY`] as a big-endian `u64`.
#[derive(Debug, Clone)]
pub struct SledLeaseStore {
    tree: sled::Tree,
}

impl SledLeaseStore {
    pub fn new(tree: sled::Tree) -> Self {
        Self { tree }
    }
}

fn lease_error(err: sled::Error) -> lshort_sequence::Error {
    lshort_sequence::Error::Lease(err.to_string())
}

impl LeaseStore for SledLeaseStore {
    fn load(&self) -> std::result::Result<Option<u64>, lshort_sequence::Error> {
        let Some(raw) = self.tree.get(SEQUENCE_KEY).map_err(lease_error)? else {
            return Ok(None);
        };

        let bytes: [u8; 8] = raw[..].try_into().map_err(|_| {
            lshort_sequence::Error::Lease(format!(
                "sequence counter has {} bytes, expected 8",
                raw.len()
            ))
        })?;
        Ok(Some(u64::from_be_bytes(bytes)))
    }

    fn store(&self, lease_end: u64) -> std::result::Result<(), lshort_sequence::Error> {
        self.tree
            .insert(SEQUENCE_KEY, lease_end.to_be_bytes().to_vec())
            .map_err(lease_error)?;
        self.tree.flush().map_err(lease_error)?;
        Ok(())
    }
}

/// Link store backed by a sled directory.
///
/// Sequence numbers come from a [`LeasedSequence`] and the link is written
/// in a separate step. A crash between the two burns a number without
/// writing a record; a record is never written under a number that was not
/// leased first. Writers only contend on the lease mutex, and reads are
/// lock-free.
///
/// With `sync_writes` on, a failed flush after the record was inserted makes
/// `shrink` return an error even though the record stays in the tree and may
/// still become durable; the issued key is logged at `warn` level. With
/// `sync_writes` off, records reach disk at the next background flush or at
/// [`close`](LinkStore::close).
pub struct SledLinkStore {
    db: sled::Db,
    sequence: LeasedSequence<SledLeaseStore>,
    sync_writes: bool,
    path: PathBuf,
}

impl SledLinkStore {
    /// Opens or creates the store directory and acquires the sequence lease.
    pub fn open(path: impl AsRef<Path>, options: SledOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let subject = path.display().to_string();

        let db = sled::Config::new()
            .path(&path)
            .cache_capacity(options.cache_capacity)
            .flush_every_ms(options.flush_every_ms)
            .mode(options.mode.into())
            .open()
            .map_err(sled_error(Operation::Open, &subject))?;

        let settings = LeaseSettings::builder()
            .lease_size(options.lease_size)
            .first(options.first_sequence)
            .build();
        let sequence = LeasedSequence::acquire(SledLeaseStore::new((*db).clone()), settings)
            .map_err(|e| LinkError::allocation(Operation::Open, e))?;

        info!(
            path = %subject,
            lease_size = options.lease_size,
            sync_writes = options.sync_writes,
            "opened sled link store"
        );

        Ok(Self {
            db,
            sequence,
            sync_writes: options.sync_writes,
            path,
        })
    }

    /// Returns the path of the store directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

}

#[cfg(test)]
impl SledLinkStore {
    /// Returns the number of stored links.
    fn len(&self) -> usize {
        // the lease entry lives in the same tree
        let has_lease = self.db.contains_key(SEQUENCE_KEY).unwrap();
        self.db.len() - usize::from(has_lease)
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LinkStore for SledLinkStore {
    fn shrink(&self, url: &str) -> Result<ShortKey> {
        let sequence = self
            .sequence
            .next()
            .map_err(|e| LinkError::allocation(Operation::Shrink, e))?;
        let key = codec::encode(sequence);

        // a leased number is never handed out twice; refuse to overwrite anyway
        self.db
            .compare_and_swap(key.as_bytes(), None::<&[u8]>, Some(url.as_bytes()))
            .map_err(sled_error(Operation::Shrink, url))?
            .map_err(|_| {
                warn!(key = %key, sequence, "short key already in use");
                LinkError::storage(
                    Operation::Shrink,
                    url,
                    StorageError::InvalidData(format!("short key {key} is already in use")),
                )
            })?;

        if self.sync_writes {
            self.db.flush().map_err(|e| {
                // the record is in the tree and may still reach disk
                warn!(key = %key, sequence, error = %e, "stored link but failed to flush it");
                sled_error(Operation::Shrink, url)(e)
            })?;
        }
        debug!(key = %key, sequence, "stored link");

        Ok(key)
    }

    fn expand(&self, key: &str) -> Result<String> {
        if !codec::is_valid_key(key) {
            return Err(LinkError::NotFound(key.to_string()));
        }

        let value = self
            .db
            .get(key.as_bytes())
            .map_err(sled_error(Operation::Expand, key))?
            .ok_or_else(|| LinkError::NotFound(key.to_string()))?;

        let url = String::from_utf8(value.to_vec()).map_err(|e| {
            LinkError::storage(
                Operation::Expand,
                key,
                StorageError::InvalidData(e.to_string()),
            )
        })?;
        debug!(key, "resolved link");
        Ok(url)
    }

    fn close(self) -> Result<()> {
        let subject = self.path.display().to_string();

        // release before the final flush so a later open sees the returned tail
        self.sequence
            .release()
            .map_err(|e| LinkError::allocation(Operation::Close, e))?;
        self.db
            .flush()
            .map_err(sled_error(Operation::Close, &subject))?;

        drop(self.sequence);
        drop(self.db);
        info!(path = %subject, "closed sled link store");
        Ok(())
    }
}

impl std::fmt::Debug for SledLinkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledLinkStore")
            .field("path", &self.path)
            .field("sync_writes", &self.sync_writes)
            .finish()
    }
}
