//! Catalog generation over a full path list.
//!
//! Every entry point converges on one cancellable core. Paths are classified
//! and built concurrently, bounded by [`GeneratorOptions::concurrency`], while
//! the output keeps input order: entries of earlier paths come first and the
//! sub-path order of each path is preserved.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use crate::builder::EntryBuilder;
use crate::catalog::Catalog;
use crate::entry::CatalogEntry;
use crate::error::CatalogError;
use crate::layout::{Classification, ResourceLayout};
use crate::loader::{Asset, AssetLoader, IdentityResolver};

/// Default number of source paths processed concurrently.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Tuning knobs for [`CatalogGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    concurrency: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl GeneratorOptions {
    /// Sets how many paths may be in flight at once. Clamped to at least 1.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Maximum number of paths in flight.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

#[derive(Debug, Clone, Copy)]
enum Fetch {
    Blocking,
    Deferred,
}

/// Builds [`Catalog`] snapshots from raw asset paths.
#[derive(Debug)]
pub struct CatalogGenerator<L, I> {
    layout: ResourceLayout,
    loader: L,
    identities: I,
    options: GeneratorOptions,
}

impl<L: AssetLoader, I: IdentityResolver> CatalogGenerator<L, I> {
    /// Creates a generator.
    #[must_use]
    pub fn new(layout: ResourceLayout, loader: L, identities: I) -> Self {
        Self {
            layout,
            loader,
            identities,
            options: GeneratorOptions::default(),
        }
    }

    /// Sets the generator options.
    #[must_use]
    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// The layout used to classify paths.
    #[must_use]
    pub fn layout(&self) -> &ResourceLayout {
        &self.layout
    }

    /// The loader consulted for capabilities.
    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Generates a catalog on the calling thread using the loader's blocking
    /// [`load`](AssetLoader::load).
    ///
    /// # Errors
    ///
    /// Fails on the first path whose identity or asset cannot be resolved.
    pub fn generate_blocking<P, K>(
        &self,
        paths: &[P],
        package_names: &[K],
        created_at: DateTime<Utc>,
    ) -> Result<Catalog, CatalogError>
    where
        P: AsRef<str> + Sync,
        K: AsRef<str> + Sync,
    {
        futures::executor::block_on(self.run(
            paths,
            package_names,
            created_at,
            None,
            Fetch::Blocking,
        ))
        .map(|catalog| catalog.unwrap_or_else(|| self.empty(created_at)))
    }

    /// Generates a catalog using the loader's
    /// [`load_async`](AssetLoader::load_async).
    ///
    /// # Errors
    ///
    /// Fails on the first path whose identity or asset cannot be resolved.
    pub async fn generate<P, K>(
        &self,
        paths: &[P],
        package_names: &[K],
        created_at: DateTime<Utc>,
    ) -> Result<Catalog, CatalogError>
    where
        P: AsRef<str> + Sync,
        K: AsRef<str> + Sync,
    {
        self.run(paths, package_names, created_at, None, Fetch::Deferred)
            .await
            .map(|catalog| catalog.unwrap_or_else(|| self.empty(created_at)))
    }

    /// Generates a catalog, giving up as soon as `cancel` fires.
    ///
    /// Returns `Ok(None)` when cancelled; partial work is discarded and never
    /// returned.
    ///
    /// # Errors
    ///
    /// Fails on the first path whose identity or asset cannot be resolved.
    pub async fn generate_cancelable<P, K>(
        &self,
        paths: &[P],
        package_names: &[K],
        created_at: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Option<Catalog>, CatalogError>
    where
        P: AsRef<str> + Sync,
        K: AsRef<str> + Sync,
    {
        self.run(paths, package_names, created_at, Some(cancel), Fetch::Deferred)
            .await
    }

    fn empty(&self, created_at: DateTime<Utc>) -> Catalog {
        Catalog::new(created_at, Vec::new(), self.layout.separator())
    }

    async fn run<P, K>(
        &self,
        paths: &[P],
        package_names: &[K],
        created_at: DateTime<Utc>,
        cancel: Option<&CancellationToken>,
        fetch: Fetch,
    ) -> Result<Option<Catalog>, CatalogError>
    where
        P: AsRef<str> + Sync,
        K: AsRef<str> + Sync,
    {
        let is_cancelled = move || cancel.is_some_and(CancellationToken::is_cancelled);
        if is_cancelled() {
            tracing::debug!("catalog generation cancelled before start");
            return Ok(None);
        }

        let candidates: Vec<&str> = paths
            .iter()
            .map(|path| path.as_ref())
            .filter(|path| self.layout.is_candidate(path))
            .collect();
        tracing::info!(
            paths = paths.len(),
            candidates = candidates.len(),
            concurrency = self.options.concurrency,
            "generating catalog"
        );

        let builder = EntryBuilder::new(&self.layout, package_names);
        let builder = &builder;
        let batches: Vec<Vec<CatalogEntry>> = stream::iter(candidates)
            .map(|raw_path| async move {
                if is_cancelled() {
                    return Ok(Vec::new());
                }
                self.process(builder, raw_path, fetch).await
            })
            .buffered(self.options.concurrency)
            .try_collect()
            .await?;

        if is_cancelled() {
            tracing::info!("catalog generation cancelled");
            return Ok(None);
        }

        let entries: Vec<CatalogEntry> = batches.into_iter().flatten().collect();
        tracing::info!(entries = entries.len(), "catalog generated");
        Ok(Some(Catalog::new(created_at, entries, self.layout.separator())))
    }

    async fn process<K: AsRef<str> + Sync>(
        &self,
        builder: &EntryBuilder<'_, K>,
        raw_path: &str,
        fetch: Fetch,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let sub_paths = match self.layout.classify(raw_path) {
            Classification::Asset(sub_paths) => sub_paths,
            Classification::Directory => {
                tracing::debug!(path = raw_path, "skipping directory");
                return Ok(Vec::new());
            }
            Classification::Outside => return Ok(Vec::new()),
        };
        let Some(shallowest) = sub_paths.first() else {
            return Ok(Vec::new());
        };
        let logical_path = self.layout.strip_extension(shallowest);

        let identity = self
            .identities
            .identity(raw_path)
            .map_err(|source| CatalogError::Identity {
                path: raw_path.to_string(),
                source,
            })?;

        let loaded = match fetch {
            Fetch::Blocking => self.loader.load(logical_path, None),
            Fetch::Deferred => self.loader.load_async(logical_path, None).await,
        }
        .map_err(|source| CatalogError::Load {
            path: logical_path.to_string(),
            source,
        })?;
        let asset = loaded.ok_or_else(|| CatalogError::UnresolvableAsset {
            path: logical_path.to_string(),
        })?;

        let entries = builder.build(&identity, raw_path, &sub_paths, &asset.shape())?;
        tracing::trace!(path = raw_path, entries = entries.len(), "built entries");
        Ok(entries)
    }
}
