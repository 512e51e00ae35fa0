use crate::redb_store::{RedbLinkStore, RedbOptions};
use crate::sled_store::{SledLinkStore, SledOptions};
use lshort_core::{LinkStore, Result, ShortKey};
use std::path::Path;

/// Backend selection and its backend-specific options.
#[derive(Debug, Clone)]
pub enum BackendOptions {
    /// Single-file redb database; `path` names the file.
    Redb(RedbOptions),
    /// sled directory with a leased counter; `path` names the directory.
    Sled(SledOptions),
}

impl BackendOptions {
    pub fn name(&self) -> &'static str {
        match self {
            BackendOptions::Redb(_) => "redb",
            BackendOptions::Sled(_) => "sled",
        }
    }
}

/// A link store whose backend is chosen when it is opened.
///
/// Open it once at startup, share it by reference (e.g. in an `Arc`) with
/// every request handler, and [`close`](LinkStore::close) it at shutdown.
#[derive(Debug)]
pub enum Store {
    Redb(RedbLinkStore),
    Sled(SledLinkStore),
}

impl Store {
    /// Opens the backend selected by `options` at `path`.
    pub fn open(path: impl AsRef<Path>, options: BackendOptions) -> Result<Self> {
        match options {
            BackendOptions::Redb(options) => RedbLinkStore::open(path, options).map(Store::Redb),
            BackendOptions::Sled(options) => SledLinkStore::open(path, options).map(Store::Sled),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Redb(_) => "redb",
            Store::Sled(_) => "sled",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Store::Redb(store) => store.path(),
            Store::Sled(store) => store.path(),
        }
    }
}

impl LinkStore for Store {
    fn shrink(&self, url: &str) -> Result<ShortKey> {
        match self {
            Store::Redb(store) => store.shrink(url),
            Store::Sled(store) => store.shrink(url),
        }
    }

    fn expand(&self, key: &str) -> Result<String> {
        match self {
            Store::Redb(store) => store.expand(key),
            Store::Sled(store) => store.expand(key),
        }
    }

    fn close(self) -> Result<()> {
        match self {
            Store::Redb(store) => store.close(),
            Store::Sled(store) => store.close(),
        }
    }
}

impl From<RedbLinkStore> for Store {
    fn from(store: RedbLinkStore) -> Self {
        Store::Redb(store)
    }
}

impl From<SledLinkStore> for Store {
    fn from(store: SledLinkStore) -> Self {
        Store::Sled(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn opens_selected_backend() {
        let dir = TempDir::new().unwrap();

        let redb = Store::open(
            dir.path().join("links.redb"),
            BackendOptions::Redb(RedbOptions::default()),
        )
        .unwrap();
        assert_eq!(redb.backend_name(), "redb");
        assert!(matches!(redb, Store::Redb(_)));

        let sled = Store::open(
            dir.path().join("links.sled"),
            BackendOptions::Sled(SledOptions::default()),
        )
        .unwrap();
        assert_eq!(sled.backend_name(), "sled");
        assert_eq!(sled.path(), dir.path().join("links.sled").as_path());

        redb.close().unwrap();
        sled.close().unwrap();
    }

    #[test]
    fn open_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        // a directory cannot be opened as a redb file
        let err = Store::open(dir.path(), BackendOptions::Redb(RedbOptions::default())).unwrap_err();
        assert!(matches!(
            err,
            lshort_core::LinkError::Storage {
                operation: lshort_core::Operation::Open,
                ..
            }
        ));
    }
}
