use crate::error::Result;
use crate::short_key::ShortKey;

/// A persistent mapping from short keys to the URLs they were issued for.
///
/// Both operations block on storage I/O and may be called from many threads
/// at once through a shared reference. Async callers should move calls onto a
/// blocking pool.
pub trait LinkStore: Send + Sync + 'static {
    /// Stores `url` under a freshly allocated key and returns that key.
    ///
    /// The url is stored verbatim; no validation or deduplication happens here,
    /// so shrinking the same url twice yields two distinct keys.
    fn shrink(&self, url: &str) -> Result<ShortKey>;

    /// Returns the url stored under `key`.
    ///
    /// Returns `Err(LinkError::NotFound)` if the key was never issued by this store.
    fn expand(&self, key: &str) -> Result<String>;

    /// Flushes pending state, releases allocator resources and closes the store.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
