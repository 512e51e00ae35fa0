use crate::error::{map_io_error, redb_error};
use lshort_core::{codec, LinkError, LinkStore, Operation, Result, ShortKey};
use lshort_sequence::advance;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use typed_builder::TypedBuilder;

/// Short key → original url.
const LINKS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("links");
/// Counter name → last issued sequence number.
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence");
const LINKS_SEQUENCE: &str = "links";

/// Options for [`RedbLinkStore::open`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct RedbOptions {
    /// Page cache size in bytes; redb's default when unset.
    #[builder(default, setter(strip_option))]
    pub cache_size: Option<usize>,
    /// The first sequence number issued by a fresh database.
    #[builder(default = 1)]
    pub first_sequence: u64,
}

impl Default for RedbOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Link store backed by a single redb file.
///
/// `shrink` advances the counter and inserts the link in one write
/// transaction, so after a crash the counter and the links table always
/// agree. redb admits one writer at a time; readers run on snapshots and are
/// never blocked.
pub struct RedbLinkStore {
    db: Database,
    path: PathBuf,
    first_sequence: u64,
}

impl RedbLinkStore {
    /// Creates or opens the database at `path` and creates its tables if missing.
    pub fn open(path: impl AsRef<Path>, options: RedbOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let subject = path.display().to_string();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| LinkError::storage(Operation::Open, &subject, map_io_error(e)))?;
        }

        let mut builder = redb::Builder::new();
        if let Some(cache_size) = options.cache_size {
            builder.set_cache_size(cache_size);
        }
        let db = builder
            .create(&path)
            .map_err(redb_error(Operation::Open, &subject))?;

        let txn = db.begin_write().map_err(redb_error(Operation::Open, &subject))?;
        {
            txn.open_table(LINKS_TABLE)
                .map_err(redb_error(Operation::Open, &subject))?;
            txn.open_table(SEQUENCE_TABLE)
                .map_err(redb_error(Operation::Open, &subject))?;
        }
        txn.commit().map_err(redb_error(Operation::Open, &subject))?;

        info!(path = %subject, "opened redb link store");

        Ok(Self {
            db,
            path,
            first_sequence: options.first_sequence,
        })
    }

    /// Returns the path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the last sequence number issued, if any.
    pub fn last_sequence(&self) -> Result<Option<u64>> {
        let subject = self.path.display().to_string();
        let txn = self
            .db
            .begin_read()
            .map_err(redb_error(Operation::Expand, &subject))?;
        let sequence = txn
            .open_table(SEQUENCE_TABLE)
            .map_err(redb_error(Operation::Expand, &subject))?;
        let current = sequence
            .get(LINKS_SEQUENCE)
            .map_err(redb_error(Operation::Expand, &subject))?
            .map(|v| v.value());
        Ok(current)
    }
}

impl LinkStore for RedbLinkStore {
    fn shrink(&self, url: &str) -> Result<ShortKey> {
        let txn = self
            .db
            .begin_write()
            .map_err(redb_error(Operation::Shrink, url))?;

        // dropping `txn` on an early return aborts it
        let (key, sequence) = {
            let mut counters = txn
                .open_table(SEQUENCE_TABLE)
                .map_err(redb_error(Operation::Shrink, url))?;
            let current = counters
                .get(LINKS_SEQUENCE)
                .map_err(redb_error(Operation::Shrink, url))?
                .map(|v| v.value());
            let sequence = advance(current, self.first_sequence)
                .map_err(|e| LinkError::allocation(Operation::Shrink, e))?;
            counters
                .insert(LINKS_SEQUENCE, sequence)
                .map_err(redb_error(Operation::Shrink, url))?;

            let key = codec::encode(sequence);
            let mut links = txn
                .open_table(LINKS_TABLE)
                .map_err(redb_error(Operation::Shrink, url))?;
            links
                .insert(key.as_str(), url)
                .map_err(redb_error(Operation::Shrink, url))?;
            (key, sequence)
        };

        txn.commit().map_err(redb_error(Operation::Shrink, url))?;
        debug!(key = %key, sequence, "stored link");

        Ok(key)
    }

    fn expand(&self, key: &str) -> Result<String> {
        if !codec::is_valid_key(key) {
            return Err(LinkError::NotFound(key.to_string()));
        }

        let txn = self
            .db
            .begin_read()
            .map_err(redb_error(Operation::Expand, key))?;
        let links = txn
            .open_table(LINKS_TABLE)
            .map_err(redb_error(Operation::Expand, key))?;
        let url = links
            .get(key)
            .map_err(redb_error(Operation::Expand, key))?
            .map(|v| v.value().to_string());

        match url {
            Some(url) => {
                debug!(key, "resolved link");
                Ok(url)
            }
            None => Err(LinkError::NotFound(key.to_string())),
        }
    }

    fn close(self) -> Result<()> {
        // every shrink already committed durably; dropping releases the file lock
        drop(self.db);
        info!(path = %self.path.display(), "closed redb link store");
        Ok(())
    }
}

impl std::fmt::Debug for RedbLinkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbLinkStore")
            .field("path", &self.path)
            .field("first_sequence", &self.first_sequence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> RedbLinkStore {
        RedbLinkStore::open(dir.path().join("links.redb"), RedbOptions::default()).unwrap()
    }

    #[test]
    fn first_key_encodes_sequence_one() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let key = store.shrink("https://example.com").unwrap();
        assert_eq!(key.sequence(), 1);
        assert_eq!(store.last_sequence().unwrap(), Some(1));
    }

    #[test]
    fn sequence_is_dense_without_failures() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let sequences: Vec<u64> = (0..20)
            .map(|i| store.shrink(&format!("https://example.com/{i}")).unwrap().sequence())
            .collect();
        assert_eq!(sequences, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn custom_first_sequence() {
        let dir = TempDir::new().unwrap();
        let options = RedbOptions::builder().first_sequence(1_000_000).build();
        let store = RedbLinkStore::open(dir.path().join("links.redb"), options).unwrap();

        assert_eq!(store.last_sequence().unwrap(), None);
        let key = store.shrink("https://example.com").unwrap();
        assert_eq!(key.sequence(), 1_000_000);
    }

    #[test]
    fn opening_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("links.redb");

        let store = RedbLinkStore::open(&path, RedbOptions::default()).unwrap();
        let key = store.shrink("https://example.com").unwrap();
        store.close().unwrap();

        let store = RedbLinkStore::open(&path, RedbOptions::default()).unwrap();
        assert_eq!(store.expand(key.as_str()).unwrap(), "https://example.com");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("links.redb");

        let store = RedbLinkStore::open(&path, RedbOptions::default()).unwrap();
        assert_eq!(store.path(), path.as_path());
        assert!(path.exists());
    }

    #[test]
    fn exhausted_counter_fails_without_writing() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let txn = store.db.begin_write().unwrap();
        {
            let mut counters = txn.open_table(SEQUENCE_TABLE).unwrap();
            counters.insert(LINKS_SEQUENCE, u64::MAX).unwrap();
        }
        txn.commit().unwrap();

        let err = store.shrink("https://example.com").unwrap_err();
        assert!(matches!(
            err,
            LinkError::Allocation {
                operation: Operation::Shrink,
                source: lshort_sequence::Error::Exhausted { current: u64::MAX },
            }
        ));
        assert_eq!(store.last_sequence().unwrap(), Some(u64::MAX));
    }

    #[test]
    fn keys_outside_the_alphabet_are_not_found() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        store.shrink("https://example.com").unwrap();

        for key in ["", "links", "0", "_links"] {
            let err = store.expand(key).unwrap_err();
            assert!(err.is_not_found(), "{key:?} => {err}");
        }
    }
}
