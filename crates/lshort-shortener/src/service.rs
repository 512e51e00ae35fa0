use crate::error::{Result, ShortenerError};
use async_trait::async_trait;
use lshort_core::{LinkStore, ShortKey};
use std::sync::Arc;
use tracing::warn;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Stores `url` and returns the short key issued for it.
    async fn shrink(&self, url: &str) -> Result<ShortKey>;

    /// Resolves a short key to the url it was issued for.
    async fn expand(&self, key: &str) -> Result<String>;
}

/// A concrete implementation of the `Shortener` trait.
///
/// The wrapped store blocks on disk I/O, so every call runs on tokio's
/// blocking pool. Clones share the same store.
#[derive(Debug)]
pub struct ShortenerService<S> {
    store: Arc<S>,
}

impl<S> Clone for ShortenerService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LinkStore> ShortenerService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Closes the store once no other clone of this service is alive.
    pub async fn shutdown(self) -> Result<()> {
        let store = Arc::try_unwrap(self.store)
            .map_err(|store| ShortenerError::StoreInUse(Arc::strong_count(&store) - 1))?;
        tokio::task::spawn_blocking(move || store.close()).await??;
        Ok(())
    }

    /// Rejects input the store should never see. The store itself keeps urls verbatim.
    fn validate_url(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: LinkStore> Shortener for ShortenerService<S> {
    async fn shrink(&self, url: &str) -> Result<ShortKey> {
        Self::validate_url(url)?;

        let store = Arc::clone(&self.store);
        let url = url.to_owned();
        let key = tokio::task::spawn_blocking(move || store.shrink(&url))
            .await?
            .inspect_err(|e| warn!(error = %e, "failed to shrink url"))?;
        Ok(key)
    }

    async fn expand(&self, key: &str) -> Result<String> {
        let store = Arc::clone(&self.store);
        let key = key.to_owned();
        let url = tokio::task::spawn_blocking(move || store.expand(&key))
            .await?
            .inspect_err(|e| {
                if !e.is_not_found() {
                    warn!(error = %e, "failed to expand key");
                }
            })?;
        Ok(url)
    }
}
