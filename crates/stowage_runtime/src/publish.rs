//! Generating and persisting catalogs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use stowage_catalog::{
    AssetLoader, Catalog, CatalogCodec, CatalogError, CatalogGenerator, CodecError,
    IdentityResolver,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::StowageConfig;
use crate::store::{CatalogStore, StoreError};

/// Errors raised while publishing a catalog.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Generation failed.
    #[error("catalog generation failed: {0}")]
    Generate(#[from] CatalogError),

    /// Encoding failed.
    #[error("catalog encoding failed: {0}")]
    Encode(#[from] CodecError),

    /// The store rejected the write.
    #[error("catalog store failed: {0}")]
    Store(#[from] StoreError),
}

/// Writes catalogs to the configured store location.
pub struct CatalogPublisher {
    codec: CatalogCodec,
    store: Arc<dyn CatalogStore>,
    location: String,
}

impl std::fmt::Debug for CatalogPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogPublisher")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl CatalogPublisher {
    /// Creates a publisher writing to `config`'s catalog location.
    #[must_use]
    pub fn new(config: &StowageConfig, codec: CatalogCodec, store: Arc<dyn CatalogStore>) -> Self {
        Self {
            codec,
            store,
            location: config.catalog_location(),
        }
    }

    /// The store location catalogs are written to.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Encodes and writes `catalog`, returning the location written.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] if encoding or the write fails.
    pub async fn publish(&self, catalog: &Catalog) -> Result<&str, PublishError> {
        let bytes = self.codec.encode(catalog)?;
        self.store.write_async(&self.location, &bytes).await?;
        tracing::info!(
            location = %self.location,
            entries = catalog.len(),
            bytes = bytes.len(),
            "catalog published"
        );
        Ok(&self.location)
    }

    /// Generates a catalog and publishes it.
    ///
    /// Returns `Ok(None)` without writing anything if `cancel` fires before
    /// generation completes.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] if generation, encoding or the write fails.
    pub async fn generate_and_publish<L, I, P, K>(
        &self,
        generator: &CatalogGenerator<L, I>,
        paths: &[P],
        package_names: &[K],
        created_at: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Option<&str>, PublishError>
    where
        L: AssetLoader,
        I: IdentityResolver,
        P: AsRef<str> + Sync,
        K: AsRef<str> + Sync,
    {
        let Some(catalog) = generator
            .generate_cancelable(paths, package_names, created_at, cancel)
            .await?
        else {
            tracing::info!(location = %self.location, "publish skipped, generation cancelled");
            return Ok(None);
        };
        self.publish(&catalog).await.map(Some)
    }
}
